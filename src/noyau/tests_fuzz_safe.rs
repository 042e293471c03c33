//! Tests fuzz safe : propriétés de la fenêtre + déterminisme + terminaison.
//!
//! But : marteler moteur et fenêtre sans brûler la machine.
//! - RNG déterministe (seed fixe)
//! - profondeur bornée
//! - budget temps global
//! - on accepte les erreurs attendues (division par zéro, domaine, etc.)
//! - invariants clés : vue initiale stable, vues consécutives distinctes,
//!   aller-retour symétrique, largeur ≤ W, copie exacte fidèle,
//!   expansion qui finit par s'épuiser

use std::time::{Duration, Instant};

use super::decimal::Decimal;
use super::erreur::ErreurCalcul;
use super::fenetre::{Affichage, Copie, EtatVue, LARGEUR_DEFAUT};
use super::fournisseur::ModeAngle;
use super::machine::Machine;
use super::moteur::{Application, Moteur, Reglages};
use super::numerique::Numerique;
use super::precision::Precision;

/* ------------------------ RNG déterministe minimal ------------------------ */

#[derive(Clone)]
struct Rng {
    state: u64,
}
impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }
    fn next_u32(&mut self) -> u32 {
        // LCG simple (déterministe)
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
    fn pick(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.next_u32() % n
        }
    }
    fn coin(&mut self) -> bool {
        (self.next_u32() & 1) == 1
    }
}

/* ------------------------ Budget anti-gel ------------------------ */

fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Helpers fuzz ------------------------ */

fn is_erreur_attendue(e: &ErreurCalcul) -> bool {
    matches!(
        e,
        ErreurCalcul::DivisionParZero | ErreurCalcul::Domaine(_) | ErreurCalcul::Debordement
    )
}

fn gen_nombre(rng: &mut Rng) -> String {
    match rng.pick(6) {
        0 => format!("{}", rng.pick(10)),
        1 => format!("{}", 1 + rng.pick(999_999)),
        2 => format!("{}.{}", rng.pick(100), 1 + rng.pick(9999)),
        3 => format!("0.000{}", 1 + rng.pick(99)),
        4 => format!("{}e{}", 1 + rng.pick(9), rng.pick(40)),
        _ => format!("{}/{}", 1 + rng.pick(99), 1 + rng.pick(29)),
    }
}

fn gen_atom(rng: &mut Rng) -> String {
    match rng.pick(7) {
        0 | 1 | 2 => gen_nombre(rng),
        3 => "pi".to_string(),
        4 => "e".to_string(),
        5 => format!("sqrt({})", gen_nombre(rng)),
        _ => format!("{}!", rng.pick(30)),
    }
}

fn gen_expr(rng: &mut Rng, depth: usize) -> String {
    if depth == 0 {
        return gen_atom(rng);
    }

    match rng.pick(10) {
        0 | 1 => gen_atom(rng),
        2 => format!("({}+{})", gen_expr(rng, depth - 1), gen_expr(rng, depth - 1)),
        3 => format!("({}-{})", gen_expr(rng, depth - 1), gen_expr(rng, depth - 1)),
        4 => format!("({}*{})", gen_expr(rng, depth - 1), gen_expr(rng, depth - 1)),
        5 => format!("({}/{})", gen_expr(rng, depth - 1), gen_expr(rng, depth - 1)),
        6 => format!("({})^{}", gen_expr(rng, depth - 1), rng.pick(6)),
        7 => format!("-{}", gen_expr(rng, depth - 1)),
        8 => {
            // argument borné : pas de réduction d'angle sur des milliers de chiffres
            let f = ["sin", "cos", "atan", "ln", "exp"][rng.pick(5) as usize];
            format!("{f}({})", gen_expr(rng, depth.min(2) - 1))
        }
        _ => {
            if rng.coin() {
                format!("{}*10^-{}", 1 + rng.pick(9), rng.pick(40))
            } else {
                format!("{}^{}", 2 + rng.pick(30), rng.pick(40))
            }
        }
    }
}

/// Textes d'affichage obtenus sur un échantillon d'expressions.
fn echantillon(seed: u64, n: usize, chiffres: usize) -> Vec<String> {
    let t0 = Instant::now();
    let max = Duration::from_secs(10);

    let mut rng = Rng::new(seed);
    let mut m: Moteur<Precision> = Moteur::nouveau(Reglages::nouveau(chiffres, 40), ModeAngle::Rad);
    let mut textes = Vec::new();
    for _ in 0..n {
        budget(t0, max);
        let expr = gen_expr(&mut rng, 3);
        match m.evaluate(&expr) {
            Ok(t) => textes.push(t),
            Err(e) => assert!(
                is_erreur_attendue(&e),
                "erreur non attendue: expr={expr:?} err={e}"
            ),
        }
    }
    textes
}

fn etat(texte: &str) -> EtatVue {
    let mut e = EtatVue::nouveau(Affichage::default());
    e.nouveau_resultat(texte);
    e
}

/* ------------------------ Tests ------------------------ */

#[test]
fn fuzz_safe_vues_distinctes_et_bornees() {
    let textes = echantillon(0xC0FFEE_u64, 120, 60);
    assert!(textes.len() > 60, "trop peu de succès: {}", textes.len());

    for texte in &textes {
        let mut e = etat(texte);
        let mut precedent = e.texte_courant().to_string();
        assert!(precedent.chars().count() <= LARGEUR_DEFAUT, "{texte}: {precedent}");

        while e.avancer() {
            let t = e.texte_courant().to_string();
            assert_ne!(t, precedent, "vues consécutives identiques pour {texte}");
            assert!(t.chars().count() <= LARGEUR_DEFAUT, "{texte}: {t}");
            precedent = t;
        }

        // terminal : avancer ne change plus rien
        let index = e.index();
        assert!(!e.avancer());
        assert_eq!(e.index(), index);
        assert_eq!(e.texte_courant(), precedent);
    }
}

#[test]
fn fuzz_safe_symetrie_et_determinisme() {
    let textes = echantillon(0xBADC0DE_u64, 80, 40);
    let mut rng = Rng::new(7);

    for texte in &textes {
        let mut e = etat(texte);
        let initial = e.texte_courant().to_string();

        let n = rng.pick(40) as usize;
        let mut faits = 0;
        for _ in 0..n {
            if e.avancer() {
                faits += 1;
            }
        }
        for _ in 0..faits {
            assert!(e.reculer());
        }
        assert_eq!(e.texte_courant(), initial, "{texte}");
        assert!(!e.reculer());

        // décalage 0 indépendant de l'historique
        e.avancer();
        e.nouveau_resultat(texte);
        assert_eq!(e.texte_courant(), initial);
        assert_eq!(etat(texte).texte_courant(), initial);
    }
}

#[test]
fn fuzz_safe_copie_exacte() {
    let textes = echantillon(0x5EED_u64, 100, 50);
    let mut rng = Rng::new(11);

    for texte in &textes {
        let mut e = etat(texte);
        let Some(valeur) = Decimal::parse(texte) else {
            // complexe, NaN, ∞ : copie = texte source
            assert_eq!(e.copie(Copie::DecimalExacte), *texte);
            continue;
        };
        for _ in 0..rng.pick(20) {
            e.avancer();
        }
        let copie = e.copie(Copie::DecimalExacte);
        assert!(!copie.contains(['e', '…']), "{copie}");
        assert_eq!(Decimal::parse(&copie), Some(valeur), "{texte} -> {copie}");
        assert!(!e.copie(Copie::Verbatim).contains('…'));
    }
}

#[test]
fn fuzz_safe_epuisement_termine() {
    let t0 = Instant::now();
    let max = Duration::from_secs(10);

    // valeurs à développement fini : l'expansion doit finir par s'épuiser
    let mut rng = Rng::new(0xF1A1);
    for _ in 0..25 {
        let expr = match rng.pick(4) {
            0 => format!("{}/{}", 1 + rng.pick(9999), 1u32 << rng.pick(12)),
            1 => format!("{}^{}", 2 + rng.pick(20), 20 + rng.pick(40)),
            2 => format!("{}!", 20 + rng.pick(60)),
            _ => format!("{}.{}^{}", 1 + rng.pick(99), 1 + rng.pick(999), 2 + rng.pick(12)),
        };

        let mut m: Moteur<Precision> = Moteur::nouveau(Reglages::nouveau(20, 40), ModeAngle::Rad);
        let mut e = etat(&m.evaluate(&expr).unwrap_or_else(|err| panic!("{expr}: {err}")));

        let mut demandes = 0;
        loop {
            budget(t0, max);
            while e.avancer() {}
            e.avancer();
            if !e.doit_precharger() {
                break;
            }
            demandes += 1;
            assert!(demandes < 50, "expansion sans fin pour {expr}");

            e.debut_chargement();
            let job = m.preparer_expansion().unwrap_or_else(|err| panic!("{expr}: {err}"));
            let fin = job.executer();
            e.fin_chargement();
            match m.appliquer_expansion(fin) {
                Ok(Application::Affinee(t)) => {
                    e.affiner(&t);
                }
                Ok(Application::Epuisee(_)) => e.marquer_epuise(),
                autre => panic!("{expr}: {autre:?}"),
            }
        }
        // plus aucune demande après épuisement
        assert!(e.est_epuise() || !e.doit_precharger());
    }
}

#[test]
fn fuzz_safe_backend_machine() {
    let t0 = Instant::now();
    let max = Duration::from_secs(5);

    let mut rng = Rng::new(0xACE);
    let mut m: Moteur<Machine> = Moteur::nouveau(Reglages::default(), ModeAngle::Rad);
    let mut vus = 0;
    for _ in 0..150 {
        budget(t0, max);
        let expr = gen_expr(&mut rng, 3);
        match m.evaluate(&expr) {
            Ok(t) => {
                vus += 1;
                let mut e = etat(&t);
                while e.avancer() {
                    assert!(e.texte_courant().chars().count() <= LARGEUR_DEFAUT);
                }
                // f64 : une expansion ne révèle jamais rien
                let job = m.preparer_expansion().unwrap_or_else(|err| panic!("{err}"));
                assert!(matches!(
                    m.appliquer_expansion(job.executer()),
                    Ok(Application::Epuisee(_))
                ));
            }
            Err(e) => assert!(is_erreur_attendue(&e), "expr={expr:?} err={e}"),
        }
    }
    assert!(vus > 30, "trop peu de succès: {vus}");
    assert!(!Machine::EXTENSIBLE);
}
