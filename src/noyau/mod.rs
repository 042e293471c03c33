//! Noyau de la calculatrice défilante
//!
//! Organisation interne :
//! - erreur.rs        : taxonomie des erreurs de calcul
//! - jetons.rs        : tokenisation (avec adjacence)
//! - pretraitement.rs : validation brute + produit implicite + liste blanche
//! - rpn.rs           : shunting-yard + construction Expr
//! - expr.rs          : AST de la grammaire fermée + promotion
//! - numerique.rs     : capacité numérique commune aux deux backends
//! - decimal.rs       : décimal signé arbitraire (BigInt × 10^e)
//! - transcendantes.rs: π, ln, exp, trig, lgamma en précision arbitraire
//! - machine.rs       : backend f64 + entiers exacts
//! - precision.rs     : backend précision arbitraire (réels, complexes, ∞)
//! - fournisseur.rs   : table des fonctions + constantes + mode d'angle
//! - eval.rs          : évaluateur générique
//! - format.rs        : affichage + forme canonique
//! - moteur.rs        : machine à états Inactif/Evalue + expansion
//! - fenetre.rs       : fenêtre de défilement

pub mod decimal;
pub mod erreur;
pub mod eval;
pub mod expr;
pub mod fenetre;
pub mod format;
pub mod fournisseur;
pub mod jetons;
pub mod machine;
pub mod moteur;
pub mod numerique;
pub mod precision;
pub mod pretraitement;
pub mod rpn;
pub mod transcendantes;

#[cfg(test)]
mod tests_scientifiques;

#[cfg(test)]
mod tests_fuzz_safe;

// API publique minimale
pub use erreur::{ErreurCalcul, Resultat};
pub use eval::{analyser, demarche, evaluer_texte, DemarcheNoyau};
pub use fenetre::{Affichage, Copie, EtatVue, Vue};
pub use format::FormeCanonique;
pub use fournisseur::ModeAngle;
pub use machine::Machine;
pub use moteur::{Application, Moteur, Reglages};
pub use numerique::Numerique;
pub use precision::Precision;
