// src/noyau/precision.rs
//
// Backend "arbitraire" : décimal à précision explicite (chiffres significatifs).
//
// Règles:
// - chaque opération arrondit à `chiffres`
// - jamais de débordement : au-delà de EXPOSANT_MAX, ±∞ ou 0
// - racine/ln/log de négatifs et puissance non entière d'un négatif => complexe
// - trig/factorielle d'un complexe => erreur de domaine
// - un non-fini mêlé à un complexe donne NaN

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};

use super::decimal::{Decimal, EXPOSANT_MAX};
use super::erreur::{ErreurCalcul, Resultat};
use super::numerique::{Naturel, NonFini, Numerique, Style, ValeurCalculee};
use super::transcendantes as tr;

/// Au-delà, sin/cos refusent (la réduction modulo π coûterait autant de chiffres).
const EXPOSANT_TRIG_MAX: i64 = 100_000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Nombre {
    Fini(Decimal),
    /// true = -∞
    Infini(bool),
    NaN,
    Complexe(Decimal, Decimal),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Precision {
    chiffres: usize,
}

fn borner(d: Decimal) -> Nombre {
    let x = d.exposant();
    if x > EXPOSANT_MAX {
        Nombre::Infini(d.is_negative())
    } else if x < -EXPOSANT_MAX {
        Nombre::Fini(Decimal::zero())
    } else {
        Nombre::Fini(d)
    }
}

fn borner_complexe(re: Decimal, im: Decimal) -> Nombre {
    if re.exposant() > EXPOSANT_MAX || im.exposant() > EXPOSANT_MAX {
        return Nombre::NaN;
    }
    let plancher = |d: Decimal| {
        if d.exposant() < -EXPOSANT_MAX {
            Decimal::zero()
        } else {
            d
        }
    };
    Nombre::Complexe(plancher(re), plancher(im))
}

/// log10|d| approché (d ≠ 0), sans passer par f64 pour l'exposant.
fn log10_approche(d: &Decimal) -> f64 {
    let chiffres = d.chiffres();
    let tete: String = chiffres.chars().take(17).collect();
    let m: f64 = tete.parse().unwrap_or(1.0);
    let lead = m / 10f64.powi(tete.len() as i32 - 1);
    d.exposant() as f64 + lead.log10()
}

fn est_pair(d: &Decimal) -> bool {
    d.exposant_brut() > 0 || (d.mantisse() % 2u32).is_zero()
}

impl Precision {
    pub fn chiffres(&self) -> usize {
        self.chiffres
    }

    fn un(&self) -> Decimal {
        Decimal::un()
    }

    // wp pour les étapes intermédiaires
    fn wp(&self) -> usize {
        self.chiffres + 10
    }

    /* ---------- complexes ---------- */

    fn c_mul(&self, a: (&Decimal, &Decimal), b: (&Decimal, &Decimal), p: usize) -> (Decimal, Decimal) {
        let re = a.0.multiplier(b.0, p).soustraire(&a.1.multiplier(b.1, p), p);
        let im = a.0.multiplier(b.1, p).ajouter(&a.1.multiplier(b.0, p), p);
        (re, im)
    }

    fn c_div(
        &self,
        a: (&Decimal, &Decimal),
        b: (&Decimal, &Decimal),
        p: usize,
    ) -> Resultat<(Decimal, Decimal)> {
        let den = b.0.multiplier(b.0, p).ajouter(&b.1.multiplier(b.1, p), p);
        if den.is_zero() {
            return Err(ErreurCalcul::DivisionParZero);
        }
        let re = a.0.multiplier(b.0, p).ajouter(&a.1.multiplier(b.1, p), p);
        let im = a.1.multiplier(b.0, p).soustraire(&a.0.multiplier(b.1, p), p);
        Ok((re.diviser(&den, p), im.diviser(&den, p)))
    }

    fn module(&self, re: &Decimal, im: &Decimal, p: usize) -> Decimal {
        re.multiplier(re, p).ajouter(&im.multiplier(im, p), p).racine(p)
    }

    /// Argument de re + i·im (re, im non tous deux nuls).
    fn atan2(&self, im: &Decimal, re: &Decimal, p: usize) -> Decimal {
        let pi = tr::pi(p);
        if re.is_zero() {
            let demi = pi.diviser(&Decimal::depuis_entier(2), p);
            return if im.is_negative() { demi.neg() } else { demi };
        }
        let base = tr::atan(&im.diviser(re, p), p);
        if !re.is_negative() {
            base
        } else if im.is_negative() {
            base.soustraire(&pi, p)
        } else {
            base.ajouter(&pi, p)
        }
    }

    fn c_ln(&self, re: &Decimal, im: &Decimal) -> Nombre {
        if re.is_zero() && im.is_zero() {
            return Nombre::Infini(true);
        }
        let p = self.wp();
        let carre = re.multiplier(re, p + 5).ajouter(&im.multiplier(im, p + 5), p + 5);
        let demi = Decimal::nouveau(BigInt::from(5), -1);
        let partie_re = tr::ln(&carre, p).multiplier(&demi, p);
        let partie_im = self.atan2(im, re, p);
        borner_complexe(partie_re.arrondi(self.chiffres), partie_im.arrondi(self.chiffres))
    }

    fn c_exp(&self, re: &Decimal, im: &Decimal) -> Nombre {
        let p = self.wp();
        let module = match tr::exp(re, p) {
            Some(m) => m,
            None if re.is_negative() => return Nombre::Complexe(Decimal::zero(), Decimal::zero()),
            None => return Nombre::NaN,
        };
        if im.exposant() > EXPOSANT_TRIG_MAX {
            return Nombre::NaN;
        }
        let (s, c) = tr::sin_cos(im, p);
        borner_complexe(
            module.multiplier(&c, p).arrondi(self.chiffres),
            module.multiplier(&s, p).arrondi(self.chiffres),
        )
    }

    fn c_sqrt(&self, re: &Decimal, im: &Decimal) -> Nombre {
        let p = self.wp();
        let r = self.module(re, im, p);
        let deux = Decimal::depuis_entier(2);
        let a = r.ajouter(re, p).diviser(&deux, p).racine(p);
        let mut b = r.soustraire(re, p).diviser(&deux, p).racine(p);
        if im.is_negative() {
            b = b.neg();
        }
        borner_complexe(a.arrondi(self.chiffres), b.arrondi(self.chiffres))
    }

    fn en_complexe(v: &Nombre) -> Option<(Decimal, Decimal)> {
        match v {
            Nombre::Fini(d) => Some((d.clone(), Decimal::zero())),
            Nombre::Complexe(a, b) => Some((a.clone(), b.clone())),
            _ => None,
        }
    }

    /// z^w = exp(w·ln z), z ≠ 0.
    fn c_pow(&self, z: (Decimal, Decimal), w: (Decimal, Decimal)) -> Nombre {
        let p = self.wp();
        let ln_z = match self.c_ln(&z.0, &z.1) {
            Nombre::Complexe(a, b) => (a, b),
            _ => return Nombre::NaN,
        };
        let (a, b) = self.c_mul((&w.0, &w.1), (&ln_z.0, &ln_z.1), p);
        self.c_exp(&a, &b)
    }

    /* ---------- réels ---------- */

    /// a^b pour a > 0 : exp(b·ln a), précision relevée selon l'ordre de b·ln a.
    fn puissance_reelle(&self, a: &Decimal, b: &Decimal) -> Nombre {
        let approx = b.multiplier(&tr::ln(a, 20), 20);
        let wp = self.wp() + approx.exposant().max(0) as usize;
        let t = b.multiplier(&tr::ln(a, wp), wp);
        match tr::exp(&t, wp) {
            Some(v) => borner(v.arrondi(self.chiffres)),
            None if t.is_negative() => Nombre::Fini(Decimal::zero()),
            None => Nombre::Infini(false),
        }
    }

    fn puissance_decimal(&self, x: &Decimal, n: &BigInt) -> Resultat<Nombre> {
        if n.is_zero() {
            return Ok(Nombre::Fini(self.un()));
        }
        if x.is_zero() {
            return if n.is_negative() {
                Err(ErreurCalcul::DivisionParZero)
            } else {
                Ok(Nombre::Fini(Decimal::zero()))
            };
        }
        let impair = !(n % 2u32).is_zero();
        let negatif = x.is_negative() && impair;
        if x.abs() == self.un() {
            let un = self.un();
            return Ok(Nombre::Fini(if negatif { un.neg() } else { un }));
        }

        let ordre = log10_approche(x) * n.to_f64().unwrap_or(f64::INFINITY);
        if ordre > EXPOSANT_MAX as f64 + 1.0 {
            return Ok(Nombre::Infini(negatif));
        }
        if ordre < -(EXPOSANT_MAX as f64) - 1.0 {
            return Ok(Nombre::Fini(Decimal::zero()));
        }

        match n.abs().to_u64() {
            Some(k) => {
                let p = self.chiffres + 5;
                let v = x.puissance(k, p);
                if v.exposant().abs() > EXPOSANT_MAX {
                    return Ok(borner(v));
                }
                let v = if n.is_negative() {
                    self.un().diviser(&v, self.chiffres)
                } else {
                    v.arrondi(self.chiffres)
                };
                Ok(borner(v))
            }
            None => {
                // |x| très proche de 1 : passage par exp/ln
                let b = Decimal::depuis_entier(n.clone());
                let v = self.puissance_reelle(&x.abs(), &b);
                Ok(match v {
                    Nombre::Fini(d) if negatif => Nombre::Fini(d.neg()),
                    Nombre::Infini(_) => Nombre::Infini(negatif),
                    autre => autre,
                })
            }
        }
    }

    fn verifier_trig(&self, x: &Nombre) -> Resultat<Option<Decimal>> {
        match x {
            Nombre::Fini(d) => {
                if d.exposant() > EXPOSANT_TRIG_MAX {
                    return Err(ErreurCalcul::domaine("argument trigonométrique trop grand"));
                }
                Ok(Some(d.clone()))
            }
            Nombre::Complexe(..) => Err(ErreurCalcul::domaine(
                "fonction trigonométrique d'un complexe",
            )),
            _ => Ok(None),
        }
    }

    fn verifier_arc(&self, x: &Nombre) -> Resultat<Option<Decimal>> {
        match x {
            Nombre::Fini(d) if d.abs() <= self.un() => Ok(Some(d.clone())),
            Nombre::NaN => Ok(None),
            _ => Err(ErreurCalcul::domaine("argument hors de [-1, 1]")),
        }
    }
}

impl Numerique for Precision {
    type Valeur = Nombre;

    const STYLE: Style = Style::Arbitraire;
    const PROMOTION: bool = true;
    const EXTENSIBLE: bool = true;

    fn pour_chiffres(chiffres: usize) -> Self {
        Precision {
            chiffres: chiffres.max(1),
        }
    }

    fn litteral(&self, texte: &str) -> Resultat<Nombre> {
        let d = Decimal::parse(texte)
            .ok_or_else(|| ErreurCalcul::syntaxe(format!("nombre invalide : {texte}")))?;
        Ok(borner(d.arrondi(self.chiffres)))
    }

    fn entier(&self, n: &BigInt) -> Resultat<Nombre> {
        Ok(borner(Decimal::depuis_entier(n.clone()).arrondi(self.chiffres)))
    }

    fn pi(&self) -> Nombre {
        Nombre::Fini(tr::pi(self.chiffres))
    }

    fn e(&self) -> Nombre {
        Nombre::Fini(tr::exp(&self.un(), self.chiffres).unwrap_or_else(Decimal::zero))
    }

    fn ajouter(&self, a: &Nombre, b: &Nombre) -> Resultat<Nombre> {
        let p = self.chiffres;
        Ok(match (a, b) {
            (Nombre::NaN, _) | (_, Nombre::NaN) => Nombre::NaN,
            (Nombre::Fini(x), Nombre::Fini(y)) => borner(x.ajouter(y, p)),
            (Nombre::Infini(s), Nombre::Infini(t)) => {
                if s == t {
                    Nombre::Infini(*s)
                } else {
                    Nombre::NaN
                }
            }
            (Nombre::Infini(s), Nombre::Fini(_)) | (Nombre::Fini(_), Nombre::Infini(s)) => {
                Nombre::Infini(*s)
            }
            (Nombre::Infini(_), Nombre::Complexe(..)) | (Nombre::Complexe(..), Nombre::Infini(_)) => {
                Nombre::NaN
            }
            _ => match (Self::en_complexe(a), Self::en_complexe(b)) {
                (Some((ar, ai)), Some((br, bi))) => borner_complexe(ar.ajouter(&br, p), ai.ajouter(&bi, p)),
                _ => Nombre::NaN,
            },
        })
    }

    fn soustraire(&self, a: &Nombre, b: &Nombre) -> Resultat<Nombre> {
        let nb = self.opposer(b)?;
        self.ajouter(a, &nb)
    }

    fn multiplier(&self, a: &Nombre, b: &Nombre) -> Resultat<Nombre> {
        let p = self.chiffres;
        Ok(match (a, b) {
            (Nombre::NaN, _) | (_, Nombre::NaN) => Nombre::NaN,
            (Nombre::Fini(x), Nombre::Fini(y)) => borner(x.multiplier(y, p)),
            (Nombre::Infini(s), Nombre::Infini(t)) => Nombre::Infini(s != t),
            (Nombre::Infini(s), Nombre::Fini(x)) | (Nombre::Fini(x), Nombre::Infini(s)) => {
                if x.is_zero() {
                    Nombre::NaN
                } else {
                    Nombre::Infini(*s != x.is_negative())
                }
            }
            (Nombre::Infini(_), _) | (_, Nombre::Infini(_)) => Nombre::NaN,
            _ => match (Self::en_complexe(a), Self::en_complexe(b)) {
                (Some(za), Some(zb)) => {
                    let (re, im) = self.c_mul((&za.0, &za.1), (&zb.0, &zb.1), p);
                    borner_complexe(re, im)
                }
                _ => Nombre::NaN,
            },
        })
    }

    fn diviser(&self, a: &Nombre, b: &Nombre) -> Resultat<Nombre> {
        let p = self.chiffres;
        match (a, b) {
            (Nombre::NaN, _) | (_, Nombre::NaN) => Ok(Nombre::NaN),
            (_, Nombre::Fini(y)) if y.is_zero() => Err(ErreurCalcul::DivisionParZero),
            (Nombre::Fini(x), Nombre::Fini(y)) => Ok(borner(x.diviser(y, p))),
            (Nombre::Infini(_), Nombre::Infini(_)) => Ok(Nombre::NaN),
            (Nombre::Fini(_), Nombre::Infini(_)) => Ok(Nombre::Fini(Decimal::zero())),
            (Nombre::Infini(s), Nombre::Fini(y)) => Ok(Nombre::Infini(*s != y.is_negative())),
            (Nombre::Infini(_), _) | (_, Nombre::Infini(_)) => Ok(Nombre::NaN),
            _ => match (Self::en_complexe(a), Self::en_complexe(b)) {
                (Some(za), Some(zb)) => {
                    let (re, im) = self.c_div((&za.0, &za.1), (&zb.0, &zb.1), p + 5)?;
                    Ok(borner_complexe(re.arrondi(p), im.arrondi(p)))
                }
                _ => Ok(Nombre::NaN),
            },
        }
    }

    fn opposer(&self, a: &Nombre) -> Resultat<Nombre> {
        Ok(match a {
            Nombre::Fini(d) => Nombre::Fini(d.neg()),
            Nombre::Infini(s) => Nombre::Infini(!s),
            Nombre::NaN => Nombre::NaN,
            Nombre::Complexe(re, im) => Nombre::Complexe(re.neg(), im.neg()),
        })
    }

    fn puissance(&self, a: &Nombre, b: &Nombre) -> Resultat<Nombre> {
        match (a, b) {
            (Nombre::NaN, _) | (_, Nombre::NaN) => Ok(Nombre::NaN),
            (_, Nombre::Fini(y)) if y.est_entier() && y.exposant() < 19 => {
                let n = y.vers_bigint().unwrap_or_default();
                self.puissance_entiere(a, &n)
            }
            (Nombre::Fini(x), Nombre::Fini(y)) => {
                if x.is_zero() {
                    return if y.is_negative() {
                        Err(ErreurCalcul::DivisionParZero)
                    } else {
                        Ok(Nombre::Fini(Decimal::zero()))
                    };
                }
                if !x.is_negative() {
                    return Ok(self.puissance_reelle(x, y));
                }
                if y.est_entier() {
                    // entier énorme : |x|^y avec la parité de y
                    let v = self.puissance_reelle(&x.abs(), y);
                    return Ok(match v {
                        Nombre::Fini(d) if !est_pair(y) => Nombre::Fini(d.neg()),
                        Nombre::Infini(_) => Nombre::Infini(!est_pair(y)),
                        autre => autre,
                    });
                }
                Ok(self.c_pow((x.clone(), Decimal::zero()), (y.clone(), Decimal::zero())))
            }
            (Nombre::Infini(s), Nombre::Fini(y)) => Ok(if y.is_negative() {
                Nombre::Fini(Decimal::zero())
            } else if *s {
                Nombre::NaN
            } else {
                Nombre::Infini(false)
            }),
            (Nombre::Fini(x), Nombre::Infini(t)) => {
                let un = self.un();
                let ax = x.abs();
                Ok(if ax == un {
                    Nombre::NaN
                } else if (ax > un) != *t {
                    if x.is_negative() {
                        Nombre::NaN
                    } else {
                        Nombre::Infini(false)
                    }
                } else {
                    Nombre::Fini(Decimal::zero())
                })
            }
            (Nombre::Infini(_), _) | (_, Nombre::Infini(_)) => Ok(Nombre::NaN),
            _ => match (Self::en_complexe(a), Self::en_complexe(b)) {
                (Some(z), Some(w)) => {
                    if z.0.is_zero() && z.1.is_zero() {
                        return if w.0.is_negative() {
                            Err(ErreurCalcul::DivisionParZero)
                        } else {
                            Ok(Nombre::Complexe(Decimal::zero(), Decimal::zero()))
                        };
                    }
                    Ok(self.c_pow(z, w))
                }
                _ => Ok(Nombre::NaN),
            },
        }
    }

    fn puissance_entiere(&self, a: &Nombre, n: &BigInt) -> Resultat<Nombre> {
        match a {
            Nombre::NaN => Ok(Nombre::NaN),
            Nombre::Fini(x) => self.puissance_decimal(x, n),
            Nombre::Infini(s) => Ok(if n.is_zero() {
                Nombre::Fini(self.un())
            } else if n.is_negative() {
                Nombre::Fini(Decimal::zero())
            } else {
                Nombre::Infini(*s && !(n % 2u32).is_zero())
            }),
            Nombre::Complexe(re, im) => {
                if n.is_zero() {
                    return Ok(Nombre::Complexe(self.un(), Decimal::zero()));
                }
                let k = match n.abs().to_u64() {
                    Some(k) if k <= 1 << 20 => k,
                    _ => {
                        let w = (Decimal::depuis_entier(n.clone()), Decimal::zero());
                        return Ok(self.c_pow((re.clone(), im.clone()), w));
                    }
                };
                let p = self.wp() + 20;
                let mut acc = (self.un(), Decimal::zero());
                let mut base = (re.clone(), im.clone());
                let mut reste = k;
                while reste > 0 {
                    if reste & 1 == 1 {
                        acc = self.c_mul((&acc.0, &acc.1), (&base.0, &base.1), p);
                    }
                    reste >>= 1;
                    if reste > 0 {
                        base = self.c_mul((&base.0, &base.1), (&base.0, &base.1), p);
                    }
                }
                if n.is_negative() {
                    acc = self.c_div((&self.un(), &Decimal::zero()), (&acc.0, &acc.1), p)?;
                }
                Ok(borner_complexe(acc.0.arrondi(self.chiffres), acc.1.arrondi(self.chiffres)))
            }
        }
    }

    fn sin(&self, x: &Nombre) -> Resultat<Nombre> {
        Ok(match self.verifier_trig(x)? {
            Some(d) => Nombre::Fini(tr::sin_cos(&d, self.chiffres).0),
            None => Nombre::NaN,
        })
    }

    fn cos(&self, x: &Nombre) -> Resultat<Nombre> {
        Ok(match self.verifier_trig(x)? {
            Some(d) => Nombre::Fini(tr::sin_cos(&d, self.chiffres).1),
            None => Nombre::NaN,
        })
    }

    fn tan(&self, x: &Nombre) -> Resultat<Nombre> {
        match self.verifier_trig(x)? {
            Some(d) => {
                let (s, c) = tr::sin_cos(&d, self.wp());
                if c.is_zero() {
                    return Err(ErreurCalcul::DivisionParZero);
                }
                Ok(borner(s.diviser(&c, self.chiffres)))
            }
            None => Ok(Nombre::NaN),
        }
    }

    fn asin(&self, x: &Nombre) -> Resultat<Nombre> {
        Ok(match self.verifier_arc(x)? {
            Some(d) => Nombre::Fini(tr::asin(&d, self.chiffres)),
            None => Nombre::NaN,
        })
    }

    fn acos(&self, x: &Nombre) -> Resultat<Nombre> {
        Ok(match self.verifier_arc(x)? {
            Some(d) => Nombre::Fini(tr::acos(&d, self.chiffres)),
            None => Nombre::NaN,
        })
    }

    fn atan(&self, x: &Nombre) -> Resultat<Nombre> {
        match x {
            Nombre::Fini(d) => Ok(Nombre::Fini(tr::atan(d, self.chiffres))),
            Nombre::Infini(s) => {
                let demi = tr::pi(self.chiffres).diviser(&Decimal::depuis_entier(2), self.chiffres);
                Ok(Nombre::Fini(if *s { demi.neg() } else { demi }))
            }
            Nombre::NaN => Ok(Nombre::NaN),
            Nombre::Complexe(..) => Err(ErreurCalcul::domaine(
                "fonction trigonométrique d'un complexe",
            )),
        }
    }

    fn ln(&self, x: &Nombre) -> Resultat<Nombre> {
        Ok(match x {
            Nombre::Fini(d) if d.is_zero() => Nombre::Infini(true),
            Nombre::Fini(d) if !d.is_negative() => borner(tr::ln(d, self.chiffres)),
            Nombre::Fini(d) => self.c_ln(d, &Decimal::zero()),
            Nombre::Complexe(re, im) => self.c_ln(re, im),
            Nombre::Infini(false) => Nombre::Infini(false),
            Nombre::Infini(true) | Nombre::NaN => Nombre::NaN,
        })
    }

    fn log10(&self, x: &Nombre) -> Resultat<Nombre> {
        if let Nombre::Fini(d) = x {
            // puissance de 10 exacte
            if d.mantisse() == &BigInt::from(1) {
                return Ok(Nombre::Fini(Decimal::depuis_entier(d.exposant_brut())));
            }
        }
        let p = self.wp();
        let ln10 = tr::ln10(p);
        let ln = Precision::pour_chiffres(p).ln(x)?;
        Ok(match ln {
            Nombre::Fini(d) => borner(d.diviser(&ln10, self.chiffres)),
            Nombre::Complexe(re, im) => {
                borner_complexe(re.diviser(&ln10, self.chiffres), im.diviser(&ln10, self.chiffres))
            }
            autre => autre,
        })
    }

    fn racine(&self, x: &Nombre) -> Resultat<Nombre> {
        Ok(match x {
            Nombre::Fini(d) if !d.is_negative() => Nombre::Fini(d.racine(self.chiffres)),
            Nombre::Fini(d) => Nombre::Complexe(Decimal::zero(), d.neg().racine(self.chiffres)),
            Nombre::Complexe(re, im) => self.c_sqrt(re, im),
            Nombre::Infini(false) => Nombre::Infini(false),
            Nombre::Infini(true) | Nombre::NaN => Nombre::NaN,
        })
    }

    fn exp(&self, x: &Nombre) -> Resultat<Nombre> {
        Ok(match x {
            Nombre::Fini(d) => match tr::exp(d, self.chiffres) {
                Some(v) => borner(v),
                None if d.is_negative() => Nombre::Fini(Decimal::zero()),
                None => Nombre::Infini(false),
            },
            Nombre::Complexe(re, im) => self.c_exp(re, im),
            Nombre::Infini(false) => Nombre::Infini(false),
            Nombre::Infini(true) => Nombre::Fini(Decimal::zero()),
            Nombre::NaN => Nombre::NaN,
        })
    }

    fn abs(&self, x: &Nombre) -> Resultat<Nombre> {
        Ok(match x {
            Nombre::Fini(d) => Nombre::Fini(d.abs()),
            Nombre::Infini(_) => Nombre::Infini(false),
            Nombre::NaN => Nombre::NaN,
            Nombre::Complexe(re, im) => {
                borner(self.module(re, im, self.wp()).arrondi(self.chiffres))
            }
        })
    }

    fn lgamma(&self, x: &Nombre) -> Resultat<Nombre> {
        match x {
            Nombre::Fini(d) if d.signum() > 0 => {
                // ln Γ(x) > 1e16 : exp déborde de toute façon
                if d.exposant() > 14 {
                    return Ok(Nombre::Infini(false));
                }
                Ok(borner(tr::lgamma(d, self.chiffres)))
            }
            Nombre::Infini(false) => Ok(Nombre::Infini(false)),
            Nombre::NaN => Ok(Nombre::NaN),
            _ => Err(ErreurCalcul::domaine("lgamma hors domaine")),
        }
    }

    fn est_fini(&self, x: &Nombre) -> bool {
        matches!(x, Nombre::Fini(_) | Nombre::Complexe(..))
    }

    fn naturel(&self, x: &Nombre) -> Option<Naturel> {
        match x {
            Nombre::Fini(d) if !d.is_negative() && d.est_entier() => {
                if d.exposant() >= 19 {
                    return Some(Naturel::Grand);
                }
                Some(match d.vers_bigint().and_then(|n| n.to_u64()) {
                    Some(k) => Naturel::Petit(k),
                    None => Naturel::Grand,
                })
            }
            _ => None,
        }
    }

    fn calculee(&self, x: &Nombre) -> ValeurCalculee {
        match x {
            Nombre::Fini(d) => {
                if d.est_entier() && d.exposant() < 18 {
                    if let Some(n) = d.vers_bigint() {
                        return ValeurCalculee::Entier(n);
                    }
                }
                ValeurCalculee::Reel(d.clone())
            }
            Nombre::Infini(false) => ValeurCalculee::NonFini(NonFini::PlusInfini),
            Nombre::Infini(true) => ValeurCalculee::NonFini(NonFini::MoinsInfini),
            Nombre::NaN => ValeurCalculee::NonFini(NonFini::NaN),
            Nombre::Complexe(re, im) => ValeurCalculee::Complexe(re.clone(), im.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p() -> Precision {
        Precision::pour_chiffres(50)
    }

    fn fini(s: &str) -> Nombre {
        Nombre::Fini(Decimal::parse(s).unwrap())
    }

    fn decimal(n: &Nombre) -> Decimal {
        match n {
            Nombre::Fini(d) => d.clone(),
            autre => panic!("pas fini : {autre:?}"),
        }
    }

    #[test]
    fn division_et_zero() {
        let p = p();
        assert_eq!(
            p.diviser(&fini("1"), &fini("0")),
            Err(ErreurCalcul::DivisionParZero)
        );
        let v = decimal(&p.diviser(&fini("1"), &fini("4")).unwrap());
        assert_eq!(v, Decimal::parse("0.25").unwrap());
    }

    #[test]
    fn puissances_entieres_exactes() {
        let p = Precision::pour_chiffres(250);
        let v = p
            .puissance_entiere(&fini("25"), &BigInt::from(25))
            .unwrap();
        assert_eq!(
            decimal(&v).vers_bigint(),
            Some(BigInt::from(25).pow(25u32))
        );
        assert_eq!(
            p.puissance_entiere(&fini("0"), &BigInt::from(-1)),
            Err(ErreurCalcul::DivisionParZero)
        );
        let inv = decimal(&p.puissance_entiere(&fini("10"), &BigInt::from(-30)).unwrap());
        assert_eq!(inv, Decimal::parse("1e-30").unwrap());
    }

    #[test]
    fn hors_bornes_sans_debordement() {
        let p = p();
        let grand = BigInt::from(10).pow(20u32);
        assert_eq!(
            p.puissance_entiere(&fini("10"), &grand).unwrap(),
            Nombre::Infini(false)
        );
        assert_eq!(
            p.puissance_entiere(&fini("-10"), &(grand.clone() + 1)).unwrap(),
            Nombre::Infini(true)
        );
        assert_eq!(
            p.puissance_entiere(&fini("0.1"), &grand).unwrap(),
            Nombre::Fini(Decimal::zero())
        );
        assert_eq!(p.exp(&fini("1e20")).unwrap(), Nombre::Infini(false));
        assert_eq!(p.exp(&fini("-1e20")).unwrap(), Nombre::Fini(Decimal::zero()));
    }

    #[test]
    fn negatifs_donnent_des_complexes() {
        let p = p();
        assert_eq!(
            p.racine(&fini("-4")).unwrap(),
            Nombre::Complexe(Decimal::zero(), Decimal::depuis_entier(2))
        );
        match p.ln(&fini("-1")).unwrap() {
            Nombre::Complexe(re, im) => {
                assert!(re.is_zero());
                assert_eq!(im, tr::pi(50));
            }
            autre => panic!("{autre:?}"),
        }
        match p.puissance(&fini("-8"), &fini("0.5")).unwrap() {
            Nombre::Complexe(re, im) => {
                assert!(re.abs() < Decimal::parse("1e-45").unwrap());
                let attendu = Decimal::depuis_entier(8).racine(50);
                assert!(im.soustraire(&attendu, 50).abs() < Decimal::parse("1e-45").unwrap());
            }
            autre => panic!("{autre:?}"),
        }
        assert_eq!(p.ln(&fini("0")).unwrap(), Nombre::Infini(true));
    }

    #[test]
    fn domaines() {
        let p = p();
        assert!(matches!(p.asin(&fini("2")), Err(ErreurCalcul::Domaine(_))));
        assert!(matches!(
            p.sin(&Nombre::Complexe(Decimal::un(), Decimal::un())),
            Err(ErreurCalcul::Domaine(_))
        ));
        assert!(matches!(p.sin(&fini("1e100001")), Err(ErreurCalcul::Domaine(_))));
        assert!(matches!(p.lgamma(&fini("-1")), Err(ErreurCalcul::Domaine(_))));
    }

    #[test]
    fn log10_exact() {
        let p = p();
        assert_eq!(decimal(&p.log10(&fini("1000")).unwrap()), Decimal::depuis_entier(3));
        assert_eq!(decimal(&p.log10(&fini("0.01")).unwrap()), Decimal::depuis_entier(-2));
    }

    #[test]
    fn infinis() {
        let p = p();
        let inf = Nombre::Infini(false);
        let moins = Nombre::Infini(true);
        assert_eq!(p.ajouter(&inf, &moins).unwrap(), Nombre::NaN);
        assert_eq!(p.multiplier(&inf, &fini("-2")).unwrap(), moins);
        assert_eq!(p.multiplier(&inf, &fini("0")).unwrap(), Nombre::NaN);
        assert_eq!(p.diviser(&fini("3"), &inf).unwrap(), Nombre::Fini(Decimal::zero()));
    }

    #[test]
    fn classement() {
        let p = p();
        assert_eq!(
            p.calculee(&fini("120")),
            ValeurCalculee::Entier(BigInt::from(120))
        );
        assert!(matches!(p.calculee(&fini("1e18")), ValeurCalculee::Reel(_)));
        assert_eq!(p.naturel(&fini("5000")), Some(Naturel::Petit(5000)));
        assert_eq!(p.naturel(&fini("1e30")), Some(Naturel::Grand));
        assert_eq!(p.naturel(&fini("2.5")), None);
    }
}
