// src/noyau/machine.rs
//
// Backend "machine" : f64, précision fixe, plus des entiers exacts.
//
// - littéral entier, factorielle, + - * et puissance naturelle entre entiers :
//   résultat entier exact (chiffres bruts à l'affichage)
// - division, fonctions, constantes, littéral décimal : f64
// - un entier mêlé à un flottant est converti ; trop grand pour f64 => Debordement
// Seul backend qui déborde : tout résultat infini issu d'opérandes finis
// devient ErreurCalcul::Debordement.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{FromPrimitive, Signed, ToPrimitive, Zero};
use std::f64::consts::{E, PI};

use super::decimal::Decimal;
use super::erreur::{ErreurCalcul, Resultat};
use super::numerique::{Naturel, NonFini, Numerique, Style, ValeurCalculee};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Machine;

#[derive(Clone, Debug, PartialEq)]
pub enum ValeurMachine {
    Entier(BigInt),
    Flottant(f64),
}

use ValeurMachine::{Entier, Flottant};

const DOMAINE: &str = "erreur de domaine mathématique";

/// Au-delà, a^n entre entiers passe par f64 (et déborde).
const LIMITE_BITS_EXACTS: u64 = 1 << 16;

fn verifier(x: f64) -> Resultat<f64> {
    if x.is_infinite() {
        Err(ErreurCalcul::Debordement)
    } else if x.is_nan() {
        Err(ErreurCalcul::domaine(DOMAINE))
    } else {
        Ok(x)
    }
}

fn flottant(x: f64) -> Resultat<ValeurMachine> {
    verifier(x).map(Flottant)
}

impl ValeurMachine {
    fn reel(&self) -> Resultat<f64> {
        match self {
            Flottant(x) => Ok(*x),
            Entier(n) => verifier(n.to_f64().unwrap_or(f64::INFINITY)),
        }
    }

    fn est_zero(&self) -> bool {
        match self {
            Flottant(x) => *x == 0.0,
            Entier(n) => n.is_zero(),
        }
    }
}

/// ln Γ(x), x > 0 : décalage jusqu'à x ≥ 10 puis Stirling (4 termes).
fn lgamma_f64(mut x: f64) -> f64 {
    let mut decal = 0.0;
    while x < 10.0 {
        decal -= x.ln();
        x += 1.0;
    }
    let inv = 1.0 / x;
    let inv2 = inv * inv;
    let serie = inv * (1.0 / 12.0 - inv2 * (1.0 / 360.0 - inv2 * (1.0 / 1260.0 - inv2 / 1680.0)));
    (x - 0.5) * x.ln() - x + 0.5 * (2.0 * PI).ln() + serie + decal
}

fn puissance_reelle(a: f64, b: f64) -> Resultat<ValeurMachine> {
    if a == 0.0 && b < 0.0 {
        return Err(ErreurCalcul::DivisionParZero);
    }
    if a < 0.0 && b.fract() != 0.0 {
        return Err(ErreurCalcul::domaine(
            "puissance non entière d'un nombre négatif",
        ));
    }
    flottant(a.powf(b))
}

impl Machine {
    fn reelle(
        &self,
        x: &ValeurMachine,
        f: impl FnOnce(f64) -> f64,
    ) -> Resultat<ValeurMachine> {
        flottant(f(x.reel()?))
    }

    fn exacte_ou_reelle(
        &self,
        a: &ValeurMachine,
        b: &ValeurMachine,
        exacte: impl FnOnce(&BigInt, &BigInt) -> BigInt,
        reelle: impl FnOnce(f64, f64) -> f64,
    ) -> Resultat<ValeurMachine> {
        match (a, b) {
            (Entier(x), Entier(y)) => Ok(Entier(exacte(x, y))),
            _ => flottant(reelle(a.reel()?, b.reel()?)),
        }
    }
}

impl Numerique for Machine {
    type Valeur = ValeurMachine;

    const STYLE: Style = Style::Machine;
    const PROMOTION: bool = false;
    const EXTENSIBLE: bool = false;

    fn pour_chiffres(_chiffres: usize) -> Self {
        Machine
    }

    fn litteral(&self, texte: &str) -> Resultat<ValeurMachine> {
        let invalide = || ErreurCalcul::syntaxe(format!("nombre invalide : {texte}"));
        if !texte.is_empty() && texte.bytes().all(|b| b.is_ascii_digit()) {
            return texte.parse::<BigInt>().map(Entier).map_err(|_| invalide());
        }
        flottant(texte.parse::<f64>().map_err(|_| invalide())?)
    }

    fn entier(&self, n: &BigInt) -> Resultat<ValeurMachine> {
        Ok(Entier(n.clone()))
    }

    fn pi(&self) -> ValeurMachine {
        Flottant(PI)
    }

    fn e(&self) -> ValeurMachine {
        Flottant(E)
    }

    fn ajouter(&self, a: &ValeurMachine, b: &ValeurMachine) -> Resultat<ValeurMachine> {
        self.exacte_ou_reelle(a, b, |x, y| x + y, |x, y| x + y)
    }

    fn soustraire(&self, a: &ValeurMachine, b: &ValeurMachine) -> Resultat<ValeurMachine> {
        self.exacte_ou_reelle(a, b, |x, y| x - y, |x, y| x - y)
    }

    fn multiplier(&self, a: &ValeurMachine, b: &ValeurMachine) -> Resultat<ValeurMachine> {
        self.exacte_ou_reelle(a, b, |x, y| x * y, |x, y| x * y)
    }

    /// Toujours flottante, même entre entiers.
    fn diviser(&self, a: &ValeurMachine, b: &ValeurMachine) -> Resultat<ValeurMachine> {
        if b.est_zero() {
            return Err(ErreurCalcul::DivisionParZero);
        }
        match (a, b) {
            (Entier(x), Entier(y)) => {
                let q = BigRational::new(x.clone(), y.clone());
                flottant(q.to_f64().unwrap_or(f64::INFINITY))
            }
            _ => flottant(a.reel()? / b.reel()?),
        }
    }

    fn opposer(&self, a: &ValeurMachine) -> Resultat<ValeurMachine> {
        Ok(match a {
            Entier(n) => Entier(-n),
            Flottant(x) => Flottant(-x),
        })
    }

    fn puissance(&self, a: &ValeurMachine, b: &ValeurMachine) -> Resultat<ValeurMachine> {
        match b {
            Entier(n) => self.puissance_entiere(a, n),
            Flottant(y) => puissance_reelle(a.reel()?, *y),
        }
    }

    fn puissance_entiere(&self, a: &ValeurMachine, n: &BigInt) -> Resultat<ValeurMachine> {
        if let Entier(base) = a {
            let exacte = n
                .to_u32()
                .filter(|k| base.bits().saturating_mul(u64::from(*k)) <= LIMITE_BITS_EXACTS);
            if let Some(k) = exacte {
                return Ok(Entier(base.pow(k)));
            }
        }
        if a.est_zero() && n.is_negative() {
            return Err(ErreurCalcul::DivisionParZero);
        }
        let x = a.reel()?;
        match n.to_i32() {
            Some(k) => flottant(x.powi(k)),
            None => puissance_reelle(x, n.to_f64().unwrap_or(f64::INFINITY)),
        }
    }

    fn sin(&self, x: &ValeurMachine) -> Resultat<ValeurMachine> {
        self.reelle(x, f64::sin)
    }

    fn cos(&self, x: &ValeurMachine) -> Resultat<ValeurMachine> {
        self.reelle(x, f64::cos)
    }

    fn tan(&self, x: &ValeurMachine) -> Resultat<ValeurMachine> {
        self.reelle(x, f64::tan)
    }

    fn asin(&self, x: &ValeurMachine) -> Resultat<ValeurMachine> {
        let x = x.reel()?;
        if x.abs() > 1.0 {
            return Err(ErreurCalcul::domaine(DOMAINE));
        }
        Ok(Flottant(x.asin()))
    }

    fn acos(&self, x: &ValeurMachine) -> Resultat<ValeurMachine> {
        let x = x.reel()?;
        if x.abs() > 1.0 {
            return Err(ErreurCalcul::domaine(DOMAINE));
        }
        Ok(Flottant(x.acos()))
    }

    fn atan(&self, x: &ValeurMachine) -> Resultat<ValeurMachine> {
        self.reelle(x, f64::atan)
    }

    fn ln(&self, x: &ValeurMachine) -> Resultat<ValeurMachine> {
        let x = x.reel()?;
        if x <= 0.0 {
            return Err(ErreurCalcul::domaine(DOMAINE));
        }
        Ok(Flottant(x.ln()))
    }

    fn log10(&self, x: &ValeurMachine) -> Resultat<ValeurMachine> {
        let x = x.reel()?;
        if x <= 0.0 {
            return Err(ErreurCalcul::domaine(DOMAINE));
        }
        Ok(Flottant(x.log10()))
    }

    fn racine(&self, x: &ValeurMachine) -> Resultat<ValeurMachine> {
        let x = x.reel()?;
        if x < 0.0 {
            return Err(ErreurCalcul::domaine(DOMAINE));
        }
        Ok(Flottant(x.sqrt()))
    }

    fn exp(&self, x: &ValeurMachine) -> Resultat<ValeurMachine> {
        self.reelle(x, f64::exp)
    }

    fn abs(&self, x: &ValeurMachine) -> Resultat<ValeurMachine> {
        Ok(match x {
            Entier(n) => Entier(n.abs()),
            Flottant(v) => Flottant(v.abs()),
        })
    }

    fn lgamma(&self, x: &ValeurMachine) -> Resultat<ValeurMachine> {
        let x = x.reel()?;
        if x <= 0.0 {
            return Err(ErreurCalcul::domaine(DOMAINE));
        }
        flottant(lgamma_f64(x))
    }

    fn est_fini(&self, x: &ValeurMachine) -> bool {
        match x {
            Entier(_) => true,
            Flottant(v) => v.is_finite(),
        }
    }

    fn naturel(&self, x: &ValeurMachine) -> Option<Naturel> {
        match x {
            Entier(n) if n.is_negative() => None,
            Entier(n) => Some(n.to_u64().map_or(Naturel::Grand, Naturel::Petit)),
            Flottant(v) => {
                if !(v.is_finite() && *v >= 0.0 && v.fract() == 0.0) {
                    return None;
                }
                Some(if *v < u64::MAX as f64 {
                    Naturel::Petit(*v as u64)
                } else {
                    Naturel::Grand
                })
            }
        }
    }

    fn calculee(&self, x: &ValeurMachine) -> ValeurCalculee {
        let x = match x {
            Entier(n) => return ValeurCalculee::Entier(n.clone()),
            Flottant(v) => *v,
        };
        if x.is_nan() {
            return ValeurCalculee::NonFini(NonFini::NaN);
        }
        if x.is_infinite() {
            return ValeurCalculee::NonFini(if x > 0.0 {
                NonFini::PlusInfini
            } else {
                NonFini::MoinsInfini
            });
        }
        if x.fract() == 0.0 && x.abs() < 1e15 {
            if let Some(n) = BigInt::from_f64(x) {
                return ValeurCalculee::Entier(n);
            }
        }
        match Decimal::depuis_f64(x) {
            Some(d) => ValeurCalculee::Reel(d),
            None => ValeurCalculee::NonFini(NonFini::NaN),
        }
    }
}
