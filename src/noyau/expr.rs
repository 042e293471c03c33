// src/noyau/expr.rs
//
// AST de la grammaire fermée.
// - Litteral   : nombre tel qu'écrit, converti par le backend à l'évaluation
// - EntierNatif: entier exact (exposant de ** après promotion)
// - Constante  : pi / e
// - Appel      : fonction de la liste blanche uniquement
//
// Aucun nom libre : tout identifiant a été résolu en Constante ou Fonction.

use num_bigint::BigInt;
use std::fmt;

use super::fournisseur::{Constante, Fonction};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    Litteral(String),
    EntierNatif(BigInt),
    Constante(Constante),

    Neg(Box<Expr>),
    Pos(Box<Expr>),

    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),

    Pourcent(Box<Expr>),    // x% = x·0.01
    Factorielle(Box<Expr>), // x!

    Appel(Fonction, Vec<Expr>),
}

fn est_entier_ecrit(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

impl Expr {
    /// Promotion des littéraux (mode précision arbitraire).
    ///
    /// Un entier écrit en opérande droit direct de `**` reste natif, pour que
    /// la puissance soit calculée exactement ; les autres littéraux restent des
    /// `Litteral` que le backend convertit à sa précision.
    pub fn promouvoir(self) -> Expr {
        use Expr::*;

        let b = |e: Box<Expr>| Box::new(e.promouvoir());
        match self {
            Litteral(_) | EntierNatif(_) | Constante(_) => self,

            Pow(a, e) => match *e {
                Litteral(s) if est_entier_ecrit(&s) => match BigInt::parse_bytes(s.as_bytes(), 10) {
                    Some(n) => Pow(b(a), Box::new(EntierNatif(n))),
                    None => Pow(b(a), Box::new(Litteral(s))),
                },
                autre => Pow(b(a), Box::new(autre.promouvoir())),
            },

            Neg(x) => Neg(b(x)),
            Pos(x) => Pos(b(x)),
            Pourcent(x) => Pourcent(b(x)),
            Factorielle(x) => Factorielle(b(x)),

            Add(x, y) => Add(b(x), b(y)),
            Sub(x, y) => Sub(b(x), b(y)),
            Mul(x, y) => Mul(b(x), b(y)),
            Div(x, y) => Div(b(x), b(y)),

            Appel(f, args) => Appel(f, args.into_iter().map(Expr::promouvoir).collect()),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Expr::*;
        match self {
            Litteral(s) => write!(f, "{s}"),
            EntierNatif(n) => write!(f, "{n}"),
            Constante(c) => write!(f, "{}", c.nom()),
            Neg(x) => write!(f, "-{x}"),
            Pos(x) => write!(f, "+{x}"),
            Add(a, b) => write!(f, "({a} + {b})"),
            Sub(a, b) => write!(f, "({a} - {b})"),
            Mul(a, b) => write!(f, "({a} * {b})"),
            Div(a, b) => write!(f, "({a} / {b})"),
            Pow(a, b) => write!(f, "({a} ** {b})"),
            Pourcent(x) => write!(f, "{x}%"),
            Factorielle(x) => write!(f, "{x}!"),
            Appel(fonction, args) => {
                write!(f, "{}(", fonction.nom())?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{a}")?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(s: &str) -> Box<Expr> {
        Box::new(Expr::Litteral(s.into()))
    }

    #[test]
    fn exposant_entier_reste_natif() {
        let e = Expr::Pow(lit("2"), lit("10")).promouvoir();
        assert_eq!(
            e,
            Expr::Pow(lit("2"), Box::new(Expr::EntierNatif(BigInt::from(10))))
        );
    }

    #[test]
    fn autres_exposants_inchanges() {
        for s in ["0.5", "1e3", "5."] {
            let e = Expr::Pow(lit("2"), lit(s)).promouvoir();
            assert_eq!(e, Expr::Pow(lit("2"), lit(s)));
        }
        // exposant signé : pas un opérande direct
        let neg = Expr::Pow(lit("2"), Box::new(Expr::Neg(lit("3"))));
        assert_eq!(neg.clone().promouvoir(), neg);
    }

    #[test]
    fn promotion_recursive() {
        let e = Expr::Appel(
            Fonction::Sqrt,
            vec![Expr::Pow(lit("3"), lit("2"))],
        )
        .promouvoir();
        assert_eq!(e.to_string(), "sqrt((3 ** 2))");
        assert!(matches!(
            e,
            Expr::Appel(_, ref a) if matches!(&a[0], Expr::Pow(_, n) if matches!(**n, Expr::EntierNatif(_)))
        ));
    }
}
