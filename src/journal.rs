// src/journal.rs
//
// Journal : tracing-subscriber sur stderr, filtré par RUST_LOG (défaut "warn").
// stdout reste réservé aux résultats.

use tracing_subscriber::EnvFilter;

const FILTRE_DEFAUT: &str = "warn";

pub fn filtre() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(FILTRE_DEFAUT))
}

/// À appeler une fois, au démarrage du binaire. Un second appel est sans effet.
pub fn initialiser() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filtre())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
