// src/noyau/erreur.rs
//
// Erreurs du noyau.
// Une seule enum pour tout le pipeline (pré-traitement -> parse -> calcul -> moteur).
// L'affichage utilisateur passe toujours par `ErreurCalcul::message_ecran`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErreurCalcul {
    /// Entrée vide, caractère interdit ou mode d'angle invalide.
    #[error("{0}")]
    Entree(String),

    #[error("identifiant non permis : {0}")]
    IdentifiantInconnu(String),

    #[error("erreur de syntaxe : {0}")]
    Syntaxe(String),

    #[error("{0}")]
    Domaine(String),

    #[error("division par zéro")]
    DivisionParZero,

    #[error("résultat trop grand")]
    Debordement,

    #[error("aucun calcul précédent")]
    EtatInvalide,
}

/// Catégorie (taxonomie stable, indépendante des messages).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Categorie {
    InputError,
    SyntaxError,
    DomainError,
    ZeroDivisionError,
    OverflowError,
    InvalidStateError,
}

impl ErreurCalcul {
    pub fn categorie(&self) -> Categorie {
        match self {
            ErreurCalcul::Entree(_) | ErreurCalcul::IdentifiantInconnu(_) => Categorie::InputError,
            ErreurCalcul::Syntaxe(_) => Categorie::SyntaxError,
            ErreurCalcul::Domaine(_) => Categorie::DomainError,
            ErreurCalcul::DivisionParZero => Categorie::ZeroDivisionError,
            ErreurCalcul::Debordement => Categorie::OverflowError,
            ErreurCalcul::EtatInvalide => Categorie::InvalidStateError,
        }
    }

    /// Texte affiché à la place du résultat.
    pub fn message_ecran(&self) -> String {
        format!("Error: {self}")
    }

    pub(crate) fn syntaxe(msg: impl Into<String>) -> Self {
        ErreurCalcul::Syntaxe(msg.into())
    }

    pub(crate) fn domaine(msg: impl Into<String>) -> Self {
        ErreurCalcul::Domaine(msg.into())
    }
}

pub type Resultat<T> = Result<T, ErreurCalcul>;
