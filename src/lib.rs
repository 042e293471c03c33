//! Calculatrice défilante
//!
//! - noyau   : évaluation en précision progressive + fenêtre de défilement
//! - app     : session (moteur + fenêtre + viewport), expansion sur un fil dédié
//! - config  : fichier TOML
//! - journal : initialisation de tracing

pub mod app;
pub mod config;
pub mod journal;
pub mod noyau;
