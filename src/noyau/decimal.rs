// src/noyau/decimal.rs
//
// Décimal à précision explicite : valeur = m · 10^e (m entier signé).
//
// Invariants:
// - forme normalisée : m == 0 => e == 0, sinon m n'est pas multiple de 10
//   (donc l'égalité structurelle est l'égalité des valeurs)
// - chaque opération prend `prec` (chiffres significatifs) et arrondit
//   au plus proche, demi vers l'extérieur
// - aucune précision globale
//
// Les exposants saturent au lieu de déborder ; c'est à l'appelant de
// comparer `exposant()` à EXPOSANT_MAX.

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Signed, Zero};
use std::cmp::Ordering;
use std::fmt;

/// Au-delà, le backend arbitraire considère la valeur infinie (ou nulle).
pub const EXPOSANT_MAX: i64 = 1 << 50;

const LOG10_2: f64 = std::f64::consts::LOG10_2;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Decimal {
    m: BigInt,
    e: i64,
}

/// Exposant de `pow`, saturé à u32::MAX (les appelants bornent bien avant).
fn exposant_u32(n: u64) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

pub(crate) fn pow10(n: u64) -> BigInt {
    BigInt::from(10u32).pow(exposant_u32(n))
}

/// Nombre de chiffres décimaux de |m| (1 pour zéro).
pub(crate) fn nb_chiffres(m: &BigInt) -> u64 {
    if m.is_zero() {
        return 1;
    }
    let bits = m.bits();
    let estime = ((bits - 1) as f64 * LOG10_2).floor() as u64 + 1;
    if *m.magnitude() >= BigUint::from(10u32).pow(estime as u32) {
        estime + 1
    } else {
        estime
    }
}

/// Racine entière par défaut (Newton), floor(√x).
pub(crate) fn int_sqrt_floor(x: &BigInt) -> BigInt {
    if x.is_zero() || x.is_negative() {
        return BigInt::zero();
    }

    // départ au-dessus de la racine : 2^ceil(bits/2)
    let mut y = BigInt::one() << (x.bits().div_ceil(2) as usize);
    loop {
        let y_next = (&y + (x / &y)) >> 1;
        if y_next >= y {
            let mut z = y;
            while (&z + 1u32) * (&z + 1u32) <= *x {
                z += 1u32;
            }
            while &z * &z > *x {
                z -= 1u32;
            }
            return z;
        }
        y = y_next;
    }
}

fn normaliser(mut m: BigInt, mut e: i64) -> Decimal {
    if m.is_zero() {
        return Decimal::zero();
    }
    let dix = BigInt::from(10u32);
    loop {
        if !(&m % &dix).is_zero() {
            break;
        }
        m /= &dix;
        e = e.saturating_add(1);
    }
    Decimal { m, e }
}

/// Arrondi à `prec` chiffres significatifs (demi vers l'extérieur).
fn arrondi(m: BigInt, e: i64, prec: usize) -> Decimal {
    let prec = prec.max(1) as u64;
    let n = nb_chiffres(&m);
    if n <= prec {
        return normaliser(m, e);
    }
    let k = n - prec;
    let p = pow10(k);
    let neg = m.is_negative();
    let mag = m.abs();
    let mut q = &mag / &p;
    let r = &mag % &p;
    if r * 2u32 >= p {
        q += 1u32;
    }
    normaliser(if neg { -q } else { q }, e.saturating_add(k as i64))
}

impl Decimal {
    pub fn zero() -> Self {
        Decimal {
            m: BigInt::zero(),
            e: 0,
        }
    }

    pub fn un() -> Self {
        Decimal {
            m: BigInt::one(),
            e: 0,
        }
    }

    pub fn depuis_entier(n: impl Into<BigInt>) -> Self {
        normaliser(n.into(), 0)
    }

    /// Construit m·10^e (normalisé, sans arrondi).
    pub fn nouveau(m: BigInt, e: i64) -> Self {
        normaliser(m, e)
    }

    /// Lit un littéral décimal : "12", "-0.5", ".5", "5.", "1e-3", "2.5E+10".
    pub fn parse(texte: &str) -> Option<Self> {
        let (neg, texte) = match texte.strip_prefix('-') {
            Some(reste) => (true, reste),
            None => (false, texte.strip_prefix('+').unwrap_or(texte)),
        };

        let (mantisse, exp) = match texte.find(['e', 'E']) {
            Some(i) => (&texte[..i], texte[i + 1..].parse::<i64>().ok()?),
            None => (texte, 0),
        };
        let (ent, frac) = match mantisse.find('.') {
            Some(i) => (&mantisse[..i], &mantisse[i + 1..]),
            None => (mantisse, ""),
        };
        if ent.is_empty() && frac.is_empty() {
            return None;
        }
        if !ent.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }

        let chiffres = format!("{ent}{frac}");
        let m = BigInt::parse_bytes(chiffres.as_bytes(), 10)?;
        let e = exp.checked_sub(frac.len() as i64)?;
        Some(normaliser(if neg { -m } else { m }, e))
    }

    /// Conversion EXACTE d'un f64 fini (mantisse binaire · 2^k = m·5^-k·10^k).
    pub fn depuis_f64(x: f64) -> Option<Self> {
        if !x.is_finite() {
            return None;
        }
        if x == 0.0 {
            return Some(Decimal::zero());
        }
        let bits = x.to_bits();
        let negatif = (bits >> 63) == 1;
        let exp_bits = ((bits >> 52) & 0x7ff) as i64;
        let frac = bits & ((1u64 << 52) - 1);
        let (mant, exp2) = if exp_bits == 0 {
            (frac, -1074)
        } else {
            (frac | (1u64 << 52), exp_bits - 1075)
        };

        let mut m = BigInt::from(mant);
        if negatif {
            m = -m;
        }
        if exp2 >= 0 {
            Some(normaliser(m << (exp2 as usize), 0))
        } else {
            let k = -exp2;
            Some(normaliser(m * BigInt::from(5u32).pow(k as u32), -k))
        }
    }

    pub fn vers_f64(&self) -> f64 {
        format!("{}e{}", self.m, self.e)
            .parse::<f64>()
            .unwrap_or(f64::NAN)
    }

    pub fn is_zero(&self) -> bool {
        self.m.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.m.is_negative()
    }

    /// Entier (valeur exacte) ?
    pub fn est_entier(&self) -> bool {
        self.e >= 0
    }

    /// Valeur entière exacte (None si non entière).
    pub fn vers_bigint(&self) -> Option<BigInt> {
        if !self.est_entier() {
            return None;
        }
        Some(&self.m * pow10(self.e as u64))
    }

    /// Entier le plus proche (demi vers l'extérieur).
    pub fn entier_proche(&self) -> BigInt {
        if self.e >= 0 {
            return &self.m * pow10(self.e as u64);
        }
        let k = (-self.e) as u64;
        let neg = self.m.is_negative();
        let mag = self.m.abs();
        let p = pow10(k);
        let mut q = &mag / &p;
        if (&mag % &p) * 2u32 >= p {
            q += 1u32;
        }
        if neg {
            -q
        } else {
            q
        }
    }

    /// Position décimale du chiffre le plus significatif (0 pour zéro).
    pub fn exposant(&self) -> i64 {
        if self.is_zero() {
            return 0;
        }
        self.e.saturating_add(nb_chiffres(&self.m) as i64 - 1)
    }

    /// Chiffres significatifs de |valeur| (sans zéros de fin).
    pub fn chiffres(&self) -> String {
        self.m.magnitude().to_string()
    }

    pub fn mantisse(&self) -> &BigInt {
        &self.m
    }

    /// e dans m·10^e.
    pub fn exposant_brut(&self) -> i64 {
        self.e
    }

    pub fn arrondi(&self, prec: usize) -> Decimal {
        arrondi(self.m.clone(), self.e, prec)
    }

    pub fn neg(&self) -> Decimal {
        Decimal {
            m: -&self.m,
            e: self.e,
        }
    }

    pub fn abs(&self) -> Decimal {
        Decimal {
            m: self.m.abs(),
            e: self.e,
        }
    }

    /// Multiplie par 10^k exactement.
    pub fn decale(&self, k: i64) -> Decimal {
        if self.is_zero() {
            return Decimal::zero();
        }
        Decimal {
            m: self.m.clone(),
            e: self.e.saturating_add(k),
        }
    }

    // Ramène les chiffres sous `plancher - 1` à un seul chiffre collant.
    fn tronque_a(&self, plancher: i64) -> (BigInt, i64) {
        let coupe = plancher - 1;
        if self.e >= coupe {
            return (self.m.clone(), self.e);
        }
        if self.exposant() < coupe {
            // entièrement sous la coupe : il ne reste que le chiffre collant
            return (self.m.signum(), coupe - 1);
        }
        let k = (coupe - self.e) as u64;
        let p = pow10(k);
        let q = &self.m / &p;
        if (&self.m % &p).is_zero() {
            (q, coupe)
        } else {
            (q * 10u32 + self.m.signum(), coupe - 1)
        }
    }

    pub fn ajouter(&self, autre: &Decimal, prec: usize) -> Decimal {
        if self.is_zero() {
            return autre.arrondi(prec);
        }
        if autre.is_zero() {
            return self.arrondi(prec);
        }
        let haut = self.exposant().max(autre.exposant());
        let plancher = haut - prec as i64 - 3;
        let (ma, ea) = self.tronque_a(plancher);
        let (mb, eb) = autre.tronque_a(plancher);
        let e = ea.min(eb);
        let m = ma * pow10((ea - e) as u64) + mb * pow10((eb - e) as u64);
        arrondi(m, e, prec)
    }

    pub fn soustraire(&self, autre: &Decimal, prec: usize) -> Decimal {
        self.ajouter(&autre.neg(), prec)
    }

    pub fn multiplier(&self, autre: &Decimal, prec: usize) -> Decimal {
        arrondi(&self.m * &autre.m, self.e.saturating_add(autre.e), prec)
    }

    /// Division ; `autre` doit être non nul (vérifié par l'appelant).
    pub fn diviser(&self, autre: &Decimal, prec: usize) -> Decimal {
        if self.is_zero() || autre.is_zero() {
            return Decimal::zero();
        }
        let na = nb_chiffres(&self.m) as i64;
        let nb = nb_chiffres(&autre.m) as i64;
        let k = (prec as i64 + 2 + nb - na).max(0);
        let num = &self.m * pow10(k as u64);
        let q = &num / &autre.m;
        let r = &num % &autre.m;
        let e = self.e.saturating_sub(autre.e).saturating_sub(k);
        if r.is_zero() {
            arrondi(q, e, prec)
        } else {
            let collant = q.signum();
            arrondi(q * 10u32 + collant, e.saturating_sub(1), prec)
        }
    }

    /// Racine carrée d'une valeur positive ou nulle.
    pub fn racine(&self, prec: usize) -> Decimal {
        if self.is_zero() || self.is_negative() {
            return Decimal::zero();
        }
        let n = nb_chiffres(&self.m) as i64;
        let mut k = (2 * (prec as i64 + 2) - n).max(0);
        if (self.e - k).rem_euclid(2) != 0 {
            k += 1;
        }
        let x = &self.m * pow10(k as u64);
        let r = int_sqrt_floor(&x);
        let e = (self.e - k) / 2;
        if &r * &r == x {
            arrondi(r, e, prec)
        } else {
            arrondi(r * 10u32 + 1u32, e - 1, prec)
        }
    }

    /// x^n (n ≥ 0) par carrés successifs ; exact tant que le résultat tient dans la précision.
    pub fn puissance(&self, n: u64, prec: usize) -> Decimal {
        let wp = prec + 10 + nb_chiffres(&BigInt::from(n)) as usize;
        let mut acc = Decimal::un();
        let mut base = self.clone();
        let mut reste = n;
        while reste > 0 {
            if reste & 1 == 1 {
                acc = acc.multiplier(&base, wp);
            }
            reste >>= 1;
            if reste > 0 {
                base = base.multiplier(&base, wp);
                if base.exposant().abs() > EXPOSANT_MAX {
                    // hors limites : on garde l'ordre de grandeur, l'appelant tranche
                    acc = acc.multiplier(&base, wp);
                    break;
                }
            }
        }
        acc.arrondi(prec)
    }

    pub fn signum(&self) -> i32 {
        if self.is_zero() {
            0
        } else if self.is_negative() {
            -1
        } else {
            1
        }
    }
}

impl Ord for Decimal {
    fn cmp(&self, autre: &Self) -> Ordering {
        let (sa, sb) = (self.signum(), autre.signum());
        if sa != sb {
            return sa.cmp(&sb);
        }
        if sa == 0 {
            return Ordering::Equal;
        }
        let par_exposant = self.exposant().cmp(&autre.exposant());
        if par_exposant != Ordering::Equal {
            return if sa > 0 {
                par_exposant
            } else {
                par_exposant.reverse()
            };
        }
        // même exposant : l'alignement est borné par la longueur des mantisses
        let e = self.e.min(autre.e);
        let ma = &self.m * pow10((self.e - e) as u64);
        let mb = &autre.m * pow10((autre.e - e) as u64);
        ma.cmp(&mb)
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, autre: &Self) -> Option<Ordering> {
        Some(self.cmp(autre))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}e{}", self.m, self.e)
    }
}
