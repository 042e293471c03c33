//! Tests scientifiques (campagne) : scénarios de défilement + régressions.
//!
//! Chaque scénario passe par le vrai pipeline : moteur précision arbitraire,
//! texte d'affichage, forme canonique, puis fenêtre de largeur 18.
//! Aucune entrée n'est traitée à part : tout découle des trois dispositions
//! et de la règle "sonder jusqu'à une vue distincte".

use std::time::{Duration, Instant};

use super::fenetre::{Affichage, Copie, EtatVue};
use super::fournisseur::ModeAngle;
use super::moteur::{Moteur, Reglages};
use super::precision::Precision;
use super::ErreurCalcul;

fn moteur(chiffres: usize) -> Moteur<Precision> {
    Moteur::nouveau(Reglages::nouveau(chiffres, 120), ModeAngle::Rad)
}

fn evaluer(expr: &str, chiffres: usize) -> String {
    moteur(chiffres)
        .evaluate(expr)
        .unwrap_or_else(|e| panic!("expr={expr:?} err={e}"))
}

fn vue(expr: &str, chiffres: usize) -> EtatVue {
    let mut e = EtatVue::nouveau(Affichage::default());
    e.nouveau_resultat(&evaluer(expr, chiffres));
    e
}

/// Avance `pas` fois ; renvoie (texte final, textes distincts rencontrés).
fn marcher(expr: &str, pas: usize, chiffres: usize) -> (String, Vec<String>) {
    let mut e = vue(expr, chiffres);
    let mut etats = Vec::new();
    for _ in 0..pas {
        let avant = e.texte_courant().to_string();
        e.avancer();
        if e.texte_courant() != avant {
            etats.push(e.texte_courant().to_string());
        }
    }
    (e.texte_courant().to_string(), etats)
}

/// Budget global anti-gel.
fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Scénarios ------------------------ */

#[test]
fn sci_fenetre_decimale_terminale() {
    let (fin, etats) = marcher("25^25/10^10", 120, 240);
    assert_eq!(fin, "…389053.3447265625");
    // pas de sur-défilement dans la queue décimale
    assert!(!etats.iter().any(|t| t == "….3447265625"));
}

#[test]
fn sci_factorielles_sans_zeros_finaux() {
    assert_eq!(marcher("40!", 220, 420).0, "…69596115894272e+9");
    assert_eq!(marcher("60!", 260, 420).0, "…4492776964096e+14");
}

#[test]
fn sci_petit_nombre_sans_defilement() {
    let mut e = vue("3*10^-30", 18);
    assert_eq!(e.texte_courant(), "3e-30");
    assert!(!e.avancer());
    assert_eq!(e.texte_courant(), "3e-30");
    assert_eq!(e.copie(Copie::Verbatim), "3e-30");
    assert_eq!(e.copie(Copie::DecimalExacte), format!("0.{}3", "0".repeat(29)));

    let e = vue("1/10^20", 18);
    assert_eq!(e.copie(Copie::DecimalExacte), format!("0.{}1", "0".repeat(19)));
}

#[test]
fn sci_cinq_septiemes() {
    let mut e = vue("5/7", 120);
    assert!(e.avancer());
    assert!(e.texte_courant().starts_with("….714285"));

    assert!(e.avancer());
    assert!(!e.texte_courant().contains('…'));
    assert!(e.texte_courant().ends_with("e-13"));

    assert!(e.avancer());
    assert!(e.texte_courant().starts_with('…'));
    assert!(e.texte_courant().ends_with("e-14"));
}

/* ------------------------ Régressions ------------------------ */

#[test]
fn sci_transition_point_vers_scientifique() {
    let (_, etats) = marcher("12.34567^30", 100, 420);
    assert!(etats.iter().any(|t| t.contains("…1.748375202221210")));

    let i = etats
        .iter()
        .position(|t| t == "….7483752022212102")
        .unwrap_or_else(|| panic!("état de départ au point absent: {etats:?}"));
    assert_eq!(etats.get(i + 1).map(String::as_str), Some("…7483752022212e-13"));
}

#[test]
fn sci_entiers_sans_point_final() {
    for expr in ["25^25", "30!"] {
        let (fin, _) = marcher(expr, 150, 420);
        assert!(!fin.ends_with('.'), "{expr}: {fin}");
        assert!(!fin.contains('e'), "{expr}: {fin}");
    }
}

#[test]
fn sci_tiers_largeur_visible() {
    let mut e = vue("1/3", 16);
    assert_eq!(e.texte_courant().chars().count(), 17);
    e.avancer();
    assert_eq!(e.texte_courant().replace('…', "").chars().count(), 17);
}

/* ------------------------ Moteur ------------------------ */

#[test]
fn sci_expansion_revele_plus_de_chiffres() {
    let mut m = moteur(20);
    let t1 = m.evaluate("sqrt(2)").unwrap_or_default();
    let t2 = m.request_more_precision().unwrap_or_default();
    assert!(t2.starts_with(&t1[..t1.len() - 1]), "{t1} / {t2}");
    assert!(t2.len() > t1.len());
    assert!(t2.starts_with("1.41421356237309504880168872420969807856967187537694"));
}

#[test]
fn sci_valeurs_speciales() {
    assert_eq!(evaluer("sqrt(-4)", 20), "(0.0 + 2.0j)");
    assert_eq!(evaluer("ln(0)", 20), "-∞");
    assert_eq!(evaluer("10^(10^20)", 20), "∞");
    assert_eq!(evaluer("2^10", 20), "1024");
    assert_eq!(evaluer("50%", 20), "0.5");
}

#[test]
fn sci_erreurs() {
    let mut m = moteur(20);
    assert_eq!(m.evaluate("1/0"), Err(ErreurCalcul::DivisionParZero));
    assert!(matches!(m.evaluate(""), Err(ErreurCalcul::Entree(_))));
    assert!(matches!(m.evaluate("foo(2)"), Err(ErreurCalcul::IdentifiantInconnu(_))));
    assert!(matches!(m.evaluate("(-1)!"), Err(ErreurCalcul::Domaine(_))));
    assert!(matches!(m.evaluate("2**"), Err(ErreurCalcul::Syntaxe(_))));
    assert_eq!(m.request_more_precision(), Err(ErreurCalcul::EtatInvalide));
}

#[test]
fn sci_mode_degres() {
    let mut m = Moteur::<Precision>::nouveau(Reglages::nouveau(20, 20), ModeAngle::Deg);
    assert_eq!(m.evaluate("cos(60)").ok().as_deref(), Some("0.5"));
    let angle = m.evaluate("asin(1)").unwrap_or_default();
    assert!(angle == "90" || angle == "90.0", "{angle}");
}

/* ------------------------ Stress contrôlé ------------------------ */

#[test]
fn sci_stress_grande_factorielle() {
    let t0 = Instant::now();
    let max = Duration::from_secs(5);

    let texte = evaluer("1000!", 120);
    budget(t0, max);
    assert!(texte.starts_with("4.02387260077093773543702433923"), "{texte}");
    assert!(texte.ends_with("e+2567"), "{texte}");

    // au-delà du seuil exact : lgamma
    let texte = evaluer("100000!", 30);
    budget(t0, max);
    assert!(texte.starts_with("2.82422940796034"), "{texte}");
    assert!(texte.ends_with("e+456573"), "{texte}");
}

#[test]
fn sci_stress_somme_longue() {
    let t0 = Instant::now();
    let max = Duration::from_secs(2);

    let expr = vec!["1/2"; 300].join(" + ");
    budget(t0, max);
    assert_eq!(evaluer(&expr, 30), "150");
}
