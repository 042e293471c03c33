//! Contrat numérique commun aux deux backends.
//!
//! Le fournisseur, l'évaluateur et le moteur sont écrits une seule fois,
//! génériques sur `N: Numerique`. Le backend choisit son type de valeur.

use num_bigint::BigInt;
use std::fmt::Debug;

use super::decimal::Decimal;
use super::erreur::Resultat;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NonFini {
    NaN,
    PlusInfini,
    MoinsInfini,
}

/// Valeur calculée, classée pour l'affichage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValeurCalculee {
    /// Entier exact sous le seuil d'affichage brut.
    Entier(BigInt),
    Reel(Decimal),
    /// (réel, imaginaire)
    Complexe(Decimal, Decimal),
    NonFini(NonFini),
}

/// Classement d'une valeur réelle entière ≥ 0 (argument de factorielle).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Naturel {
    Petit(u64),
    /// entier ≥ 0 trop grand pour u64
    Grand,
}

/// Règles de mise en forme propres au backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Style {
    /// double précision : `%.15g`, entiers bruts sous 1e15
    Machine,
    /// précision explicite : notation mpmath, entiers bruts sous 1e18
    Arbitraire,
}

pub trait Numerique: Clone + Debug + Send + Sync + 'static {
    type Valeur: Clone + Debug + Send;

    const STYLE: Style;

    /// Les littéraux sont promus (et les exposants entiers gardés natifs).
    const PROMOTION: bool;

    /// Une précision plus haute peut changer le résultat.
    const EXTENSIBLE: bool;

    /// Backend réglé pour calculer avec `chiffres` chiffres significatifs.
    fn pour_chiffres(chiffres: usize) -> Self;

    fn litteral(&self, texte: &str) -> Resultat<Self::Valeur>;
    fn entier(&self, n: &BigInt) -> Resultat<Self::Valeur>;
    fn pi(&self) -> Self::Valeur;
    fn e(&self) -> Self::Valeur;

    fn ajouter(&self, a: &Self::Valeur, b: &Self::Valeur) -> Resultat<Self::Valeur>;
    fn soustraire(&self, a: &Self::Valeur, b: &Self::Valeur) -> Resultat<Self::Valeur>;
    fn multiplier(&self, a: &Self::Valeur, b: &Self::Valeur) -> Resultat<Self::Valeur>;
    fn diviser(&self, a: &Self::Valeur, b: &Self::Valeur) -> Resultat<Self::Valeur>;
    fn opposer(&self, a: &Self::Valeur) -> Resultat<Self::Valeur>;
    fn puissance(&self, a: &Self::Valeur, b: &Self::Valeur) -> Resultat<Self::Valeur>;
    fn puissance_entiere(&self, a: &Self::Valeur, n: &BigInt) -> Resultat<Self::Valeur>;

    fn sin(&self, x: &Self::Valeur) -> Resultat<Self::Valeur>;
    fn cos(&self, x: &Self::Valeur) -> Resultat<Self::Valeur>;
    fn tan(&self, x: &Self::Valeur) -> Resultat<Self::Valeur>;
    fn asin(&self, x: &Self::Valeur) -> Resultat<Self::Valeur>;
    fn acos(&self, x: &Self::Valeur) -> Resultat<Self::Valeur>;
    fn atan(&self, x: &Self::Valeur) -> Resultat<Self::Valeur>;
    fn ln(&self, x: &Self::Valeur) -> Resultat<Self::Valeur>;
    fn log10(&self, x: &Self::Valeur) -> Resultat<Self::Valeur>;
    fn racine(&self, x: &Self::Valeur) -> Resultat<Self::Valeur>;
    fn exp(&self, x: &Self::Valeur) -> Resultat<Self::Valeur>;
    fn abs(&self, x: &Self::Valeur) -> Resultat<Self::Valeur>;
    fn lgamma(&self, x: &Self::Valeur) -> Resultat<Self::Valeur>;

    fn est_fini(&self, x: &Self::Valeur) -> bool;

    /// Some(..) si x est un réel entier ≥ 0.
    fn naturel(&self, x: &Self::Valeur) -> Option<Naturel>;

    fn calculee(&self, x: &Self::Valeur) -> ValeurCalculee;
}
