// src/app.rs
//
// Calculatrice défilante — module App (racine)
// --------------------------------------------
// Rôle:
// - Déclarer les sous-modules (etat.rs + session.rs)
// - Définir la surface vers le collaborateur d'affichage : Viewport, Defilement
// - Fournir un viewport mémoire (terminal + tests)
//
// Important:
// - Aucun style, aucun widget : le viewport reçoit un texte de largeur ≤ capacité.
// - Le presse-papiers reste chez l'appelant : la session renvoie la chaîne à copier.

pub mod etat;
pub mod session;

// Ré-exports pratiques : `use crate::app::{Session, Copie};`
pub use crate::noyau::Copie;
pub use etat::{Demarche, EtatCalc};
pub use session::Session;

/// Zone d'affichage d'une ligne de texte à largeur fixe.
pub trait Viewport {
    /// Nombre de caractères visibles (ellipse comprise).
    fn capacite(&self) -> usize;

    /// `conserver_vue` : même résultat, seule la fenêtre a bougé.
    fn afficher(&mut self, texte: &str, conserver_vue: bool);
}

/// Pas de défilement demandé par l'utilisateur.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Defilement {
    Avant,
    Arriere,
}

/// Viewport sans écran : garde le dernier texte et l'historique des affichages.
#[derive(Clone, Debug, Default)]
pub struct ViewportMemoire {
    capacite: usize,
    texte: String,
    historique: Vec<(String, bool)>,
}

impl ViewportMemoire {
    pub fn nouveau(capacite: usize) -> Self {
        ViewportMemoire {
            capacite,
            ..Default::default()
        }
    }

    pub fn texte(&self) -> &str {
        &self.texte
    }

    pub fn historique(&self) -> &[(String, bool)] {
        &self.historique
    }
}

impl Viewport for ViewportMemoire {
    fn capacite(&self) -> usize {
        self.capacite
    }

    fn afficher(&mut self, texte: &str, conserver_vue: bool) {
        self.texte = texte.to_string();
        self.historique.push((self.texte.clone(), conserver_vue));
    }
}
