// src/noyau/fournisseur.rs
//
// Table des noms permis (fonctions + constantes) et mode d'angle.
// Rien d'autre n'est résolu par l'évaluateur.
//
// - sin/cos/tan : entrée en degrés convertie en radians (mode deg)
// - asin/acos/atan : sortie convertie en degrés (mode deg)
// - factorial : produit exact jusqu'à SEUIL_FACTORIELLE_EXACTE, sinon exp(lgamma(n+1))

use num_bigint::BigInt;
use num_traits::One;
use std::fmt;
use std::str::FromStr;

use super::erreur::{ErreurCalcul, Resultat};
use super::numerique::{Naturel, Numerique};

pub const SEUIL_FACTORIELLE_EXACTE: u64 = 5000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Fonction {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Ln,
    Log,
    Sqrt,
    Exp,
    Abs,
    Factorial,
}

impl Fonction {
    pub const TOUTES: [Fonction; 12] = [
        Fonction::Sin,
        Fonction::Cos,
        Fonction::Tan,
        Fonction::Asin,
        Fonction::Acos,
        Fonction::Atan,
        Fonction::Ln,
        Fonction::Log,
        Fonction::Sqrt,
        Fonction::Exp,
        Fonction::Abs,
        Fonction::Factorial,
    ];

    pub fn nom(self) -> &'static str {
        match self {
            Fonction::Sin => "sin",
            Fonction::Cos => "cos",
            Fonction::Tan => "tan",
            Fonction::Asin => "asin",
            Fonction::Acos => "acos",
            Fonction::Atan => "atan",
            Fonction::Ln => "ln",
            Fonction::Log => "log",
            Fonction::Sqrt => "sqrt",
            Fonction::Exp => "exp",
            Fonction::Abs => "abs",
            Fonction::Factorial => "factorial",
        }
    }

    /// Noms sensibles à la casse ("SIN" n'est pas permis).
    pub fn depuis_nom(nom: &str) -> Option<Self> {
        Self::TOUTES.into_iter().find(|f| f.nom() == nom)
    }

    /// Toutes les fonctions permises sont unaires.
    pub fn arite(self) -> usize {
        1
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Constante {
    Pi,
    E,
}

impl Constante {
    pub fn depuis_nom(nom: &str) -> Option<Self> {
        match nom {
            "pi" | "π" => Some(Constante::Pi),
            "e" => Some(Constante::E),
            _ => None,
        }
    }

    pub fn nom(self) -> &'static str {
        match self {
            Constante::Pi => "pi",
            Constante::E => "e",
        }
    }
}

/// Nom permis par la liste blanche.
pub fn est_identifiant(nom: &str) -> bool {
    Fonction::depuis_nom(nom).is_some() || Constante::depuis_nom(nom).is_some()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ModeAngle {
    #[default]
    Rad,
    Deg,
}

impl FromStr for ModeAngle {
    type Err = ErreurCalcul;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rad" => Ok(ModeAngle::Rad),
            "deg" => Ok(ModeAngle::Deg),
            autre => Err(ErreurCalcul::Entree(format!(
                "mode d'angle inconnu : {autre} (attendu : rad ou deg)"
            ))),
        }
    }
}

impl fmt::Display for ModeAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ModeAngle::Rad => "rad",
            ModeAngle::Deg => "deg",
        })
    }
}

/// Espace de noms de l'évaluateur, lié à un backend et un mode d'angle.
#[derive(Clone, Debug)]
pub struct Fournisseur<N: Numerique> {
    num: N,
    mode: ModeAngle,
}

impl<N: Numerique> Fournisseur<N> {
    pub fn nouveau(num: N, mode: ModeAngle) -> Self {
        Fournisseur { num, mode }
    }

    pub fn num(&self) -> &N {
        &self.num
    }

    pub fn mode(&self) -> ModeAngle {
        self.mode
    }

    pub fn constante(&self, c: Constante) -> N::Valeur {
        match c {
            Constante::Pi => self.num.pi(),
            Constante::E => self.num.e(),
        }
    }

    fn cent_quatre_vingts(&self) -> Resultat<N::Valeur> {
        self.num.entier(&BigInt::from(180))
    }

    fn vers_radians(&self, x: &N::Valeur) -> Resultat<N::Valeur> {
        match self.mode {
            ModeAngle::Rad => Ok(x.clone()),
            ModeAngle::Deg => {
                let t = self.num.multiplier(x, &self.num.pi())?;
                self.num.diviser(&t, &self.cent_quatre_vingts()?)
            }
        }
    }

    fn depuis_radians(&self, x: N::Valeur) -> Resultat<N::Valeur> {
        match self.mode {
            ModeAngle::Rad => Ok(x),
            ModeAngle::Deg => {
                let t = self.num.multiplier(&x, &self.cent_quatre_vingts()?)?;
                self.num.diviser(&t, &self.num.pi())
            }
        }
    }

    pub fn appeler(&self, f: Fonction, args: &[N::Valeur]) -> Resultat<N::Valeur> {
        let [x] = args else {
            return Err(ErreurCalcul::syntaxe(format!(
                "{}() attend {} argument(s), {} reçu(s)",
                f.nom(),
                f.arite(),
                args.len()
            )));
        };
        let n = &self.num;
        match f {
            Fonction::Sin => n.sin(&self.vers_radians(x)?),
            Fonction::Cos => n.cos(&self.vers_radians(x)?),
            Fonction::Tan => n.tan(&self.vers_radians(x)?),
            Fonction::Asin => self.depuis_radians(n.asin(x)?),
            Fonction::Acos => self.depuis_radians(n.acos(x)?),
            Fonction::Atan => self.depuis_radians(n.atan(x)?),
            Fonction::Ln => n.ln(x),
            Fonction::Log => n.log10(x),
            Fonction::Sqrt => n.racine(x),
            Fonction::Exp => n.exp(x),
            Fonction::Abs => n.abs(x),
            Fonction::Factorial => self.factorielle(x),
        }
    }

    pub fn factorielle(&self, x: &N::Valeur) -> Resultat<N::Valeur> {
        let n = &self.num;
        if !n.est_fini(x) {
            return Err(ErreurCalcul::domaine("factorielle d'une valeur non finie"));
        }
        match n.naturel(x) {
            Some(Naturel::Petit(k)) if k <= SEUIL_FACTORIELLE_EXACTE => {
                let mut produit = BigInt::one();
                for i in 2..=k {
                    produit *= i;
                }
                n.entier(&produit)
            }
            Some(_) => {
                let x1 = n.ajouter(x, &n.entier(&BigInt::one())?)?;
                n.exp(&n.lgamma(&x1)?)
            }
            None => Err(ErreurCalcul::domaine(
                "factorielle définie seulement pour les entiers positifs",
            )),
        }
    }

    /// x% = x·0.01
    pub fn pourcent(&self, x: &N::Valeur) -> Resultat<N::Valeur> {
        self.num.multiplier(x, &self.num.litteral("0.01")?)
    }
}
