//! src/app/etat.rs
//!
//! État de saisie (sans vue, sans moteur).
//!
//! Rôle : garder ce que l'utilisateur a tapé, le dernier résultat complet,
//! l'erreur éventuelle et la démarche d'analyse, pour le terminal ou un futur écran.
//!
//! Contrats :
//! - Aucune évaluation ici (pas de parsing, pas de fenêtre).
//! - Une erreur conserve le dernier résultat mais efface la démarche.

use crate::noyau::DemarcheNoyau;

/// Trace affichable d'une analyse réussie.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct Demarche {
    pub jetons: String,
    pub rpn: String,
    pub arbre: String,
    /// chiffres du résultat affiché
    pub chiffres: usize,
}

impl From<DemarcheNoyau> for Demarche {
    fn from(d: DemarcheNoyau) -> Self {
        Demarche {
            jetons: d.jetons,
            rpn: d.rpn,
            arbre: d.arbre,
            chiffres: 0,
        }
    }
}

#[derive(Clone, Default, Debug)]
pub struct EtatCalc {
    // --- entrée utilisateur ---
    pub entree: String,

    // --- sorties ---
    pub resultat: String, // texte complet, avant fenêtrage
    pub erreur: String,   // "Error: ..." si l'évaluation échoue

    // --- démarche ---
    pub demarche: Demarche,
}

impl EtatCalc {
    /// AC : tout effacer.
    pub fn reset_total(&mut self) {
        self.entree.clear();
        self.clear_resultats();
    }

    /// CLR : résultats + erreur + démarche (l'entrée reste).
    pub fn clear_resultats(&mut self) {
        self.resultat.clear();
        self.erreur.clear();
        self.demarche = Demarche::default();
    }

    pub fn set_erreur(&mut self, msg: impl Into<String>) {
        self.erreur = msg.into();
        self.demarche = Demarche::default();
    }

    pub fn set_resultat(&mut self, texte: impl Into<String>, chiffres: usize, demarche: Option<Demarche>) {
        self.erreur.clear();
        self.resultat = texte.into();
        self.demarche = demarche.unwrap_or_default();
        self.demarche.chiffres = chiffres;
    }

    /// Résultat affiné par une expansion : même démarche, plus de chiffres.
    pub fn affiner(&mut self, texte: impl Into<String>, chiffres: usize) {
        self.resultat = texte.into();
        self.demarche.chiffres = chiffres;
    }

    pub fn a_erreur(&self) -> bool {
        !self.erreur.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erreur_garde_le_resultat() {
        let mut e = EtatCalc::default();
        let d = Demarche {
            jetons: "1 / 2".into(),
            ..Default::default()
        };
        e.set_resultat("0.5", 20, Some(d));
        assert_eq!(e.demarche.chiffres, 20);

        e.set_erreur("Error: division par zéro");
        assert!(e.a_erreur());
        assert_eq!(e.resultat, "0.5");
        assert_eq!(e.demarche, Demarche::default());

        e.set_resultat("2", 20, None);
        assert!(!e.a_erreur());
    }

    #[test]
    fn affiner_et_reset() {
        let mut e = EtatCalc {
            entree: "1/3".into(),
            ..Default::default()
        };
        e.set_resultat("0.333", 8, None);
        e.affiner("0.333333", 16);
        assert_eq!((e.resultat.as_str(), e.demarche.chiffres), ("0.333333", 16));

        e.clear_resultats();
        assert_eq!(e.entree, "1/3");
        e.reset_total();
        assert!(e.entree.is_empty() && e.resultat.is_empty());
    }
}
