// src/noyau/transcendantes.rs
//
// Fonctions transcendantes sur Decimal, précision explicite.
// Règle commune : calcul interne à `wp` = prec + marge, arrondi final à `prec`.
//
// - π        : Machin, entier scalé, cache par précision
// - ln 10    : cache par précision
// - exp      : réduction x/2^k (exacte en décimal) + Taylor + k carrés
// - ln       : réduction par racines successives + série atanh
// - sin/cos  : réduction modulo π/2 + Taylor
// - atan     : réduction par demi-angle + série
// - lgamma   : Stirling + nombres de Bernoulli (rationnels exacts, cache)

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, ToPrimitive, Zero};
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use super::decimal::{nb_chiffres, pow10, Decimal, EXPOSANT_MAX};

/* ------------------------ π (Machin) + cache ------------------------ */

/// arctan(1/q) en entier scalé (troncature) via série:
/// atan(z) = z - z^3/3 + z^5/5 - ...
fn arctan_inv_q_scaled(q: i64, scale: &BigInt) -> BigInt {
    let q = BigInt::from(q);
    let q2 = &q * &q;

    let mut k: u64 = 0;
    let mut q_pow = q.clone();
    let mut sum = BigInt::zero();

    loop {
        let term = scale / (&q_pow * BigInt::from(2 * k + 1));
        if term.is_zero() {
            break;
        }
        if k % 2 == 0 {
            sum += &term;
        } else {
            sum -= &term;
        }
        q_pow *= &q2;
        k += 1;
    }

    sum
}

fn pi_compute(prec: usize) -> Decimal {
    // extra pour amortir les erreurs de troncature
    let extra = 10u64;
    let places = prec as u64 + extra;
    let scale = pow10(places);

    // Machin : π = 16*atan(1/5) - 4*atan(1/239)
    let a = arctan_inv_q_scaled(5, &scale);
    let b = arctan_inv_q_scaled(239, &scale);
    let pi = BigInt::from(16) * a - BigInt::from(4) * b;

    Decimal::nouveau(pi, -(places as i64)).arrondi(prec)
}

static PI_CACHE: OnceLock<Mutex<HashMap<usize, Decimal>>> = OnceLock::new();
static LN10_CACHE: OnceLock<Mutex<HashMap<usize, Decimal>>> = OnceLock::new();

fn depuis_cache(
    cache: &'static OnceLock<Mutex<HashMap<usize, Decimal>>>,
    prec: usize,
    calcul: impl FnOnce(usize) -> Decimal,
) -> Decimal {
    let m = cache.get_or_init(|| Mutex::new(HashMap::new()));
    if let Some(v) = m.lock().unwrap_or_else(|p| p.into_inner()).get(&prec) {
        return v.clone();
    }
    // calcul hors verrou : deux threads peuvent calculer la même entrée, sans gravité
    let v = calcul(prec);
    m.lock()
        .unwrap_or_else(|p| p.into_inner())
        .insert(prec, v.clone());
    v
}

pub fn pi(prec: usize) -> Decimal {
    depuis_cache(&PI_CACHE, prec, pi_compute)
}

pub fn ln10(prec: usize) -> Decimal {
    depuis_cache(&LN10_CACHE, prec, |p| ln_reduit(&Decimal::depuis_entier(10), p + 5).arrondi(p))
}

fn deux_puissance(k: u32) -> Decimal {
    Decimal::depuis_entier(BigInt::one() << (k as usize))
}

/* ------------------------ exp ------------------------ */

/// e^x ; None si le résultat sort des exposants représentables
/// (l'appelant choisit ∞ ou 0 selon le signe de x).
pub fn exp(x: &Decimal, prec: usize) -> Option<Decimal> {
    if x.is_zero() {
        return Some(Decimal::un());
    }
    if x.exposant() > 16 {
        return None;
    }
    let xf = x.vers_f64();
    if (xf * std::f64::consts::LOG10_E).abs() > EXPOSANT_MAX as f64 {
        return None;
    }

    // |r| < 2^-10 ; r = x·5^k·10^-k est exact
    let k: u32 = if xf.abs() > 1e-3 {
        (xf.abs().log2().ceil() as i64 + 10).max(0) as u32
    } else {
        0
    };
    let wp = prec + 10 + (k as usize * 3) / 10 + 1;
    let r = Decimal::nouveau(
        x.mantisse() * BigInt::from(5u32).pow(k),
        x.exposant_brut() - k as i64,
    );

    let mut somme = Decimal::un();
    let mut terme = Decimal::un();
    let mut n: u64 = 1;
    loop {
        terme = terme
            .multiplier(&r, wp)
            .diviser(&Decimal::depuis_entier(n), wp);
        if terme.is_zero() || terme.exposant() < somme.exposant() - wp as i64 - 2 {
            break;
        }
        somme = somme.ajouter(&terme, wp);
        n += 1;
    }

    for _ in 0..k {
        somme = somme.multiplier(&somme, wp);
    }
    Some(somme.arrondi(prec))
}

/* ------------------------ ln ------------------------ */

// ln(y) pour y > 0 proche de [0.5, 10) : racines successives puis atanh.
fn ln_reduit(y: &Decimal, prec: usize) -> Decimal {
    let un = Decimal::un();
    if *y == un {
        return Decimal::zero();
    }
    let wp = prec + 16;
    let seuil = Decimal::nouveau(BigInt::one(), -3);

    let mut y = y.clone();
    let mut k: u32 = 0;
    while y.soustraire(&un, wp).abs() > seuil {
        y = y.racine(wp);
        k += 1;
    }

    // ln(y) = 2·atanh(z), z = (y-1)/(y+1)
    let z = y.soustraire(&un, wp).diviser(&y.ajouter(&un, wp), wp);
    let z2 = z.multiplier(&z, wp);
    let mut somme = z.clone();
    let mut puissance = z;
    let mut n: u64 = 3;
    loop {
        puissance = puissance.multiplier(&z2, wp);
        let terme = puissance.diviser(&Decimal::depuis_entier(n), wp);
        if terme.is_zero() || terme.exposant() < somme.exposant() - wp as i64 - 2 {
            break;
        }
        somme = somme.ajouter(&terme, wp);
        n += 2;
    }

    somme
        .multiplier(&deux_puissance(k + 1), wp)
        .arrondi(prec)
}

/// ln(x) pour x > 0.
pub fn ln(x: &Decimal, prec: usize) -> Decimal {
    let big_x = x.exposant();
    let y = x.decale(-big_x); // 1 ≤ y < 10

    // près de 1 : pas de décomposition (évite l'annulation y·10^-1)
    if big_x == 0 || (big_x == -1 && y >= Decimal::depuis_entier(5)) {
        return ln_reduit(x, prec);
    }

    let wp = prec + 10 + nb_chiffres(&BigInt::from(big_x)) as usize;
    let partie = ln_reduit(&y, wp);
    let dizaines = ln10(wp).multiplier(&Decimal::depuis_entier(big_x), wp);
    partie.ajouter(&dizaines, wp).arrondi(prec)
}

/* ------------------------ sin / cos / tan ------------------------ */

fn serie_sin(r: &Decimal, wp: usize) -> Decimal {
    let r2 = r.multiplier(r, wp);
    let mut somme = r.clone();
    let mut terme = r.clone();
    let mut n: u64 = 1;
    loop {
        terme = terme
            .multiplier(&r2, wp)
            .diviser(&Decimal::depuis_entier((n + 1) * (n + 2)), wp)
            .neg();
        if terme.is_zero() || terme.exposant() < somme.exposant() - wp as i64 - 2 {
            break;
        }
        somme = somme.ajouter(&terme, wp);
        n += 2;
    }
    somme
}

fn serie_cos(r: &Decimal, wp: usize) -> Decimal {
    let r2 = r.multiplier(r, wp);
    let mut somme = Decimal::un();
    let mut terme = Decimal::un();
    let mut n: u64 = 0;
    loop {
        terme = terme
            .multiplier(&r2, wp)
            .diviser(&Decimal::depuis_entier((n + 1) * (n + 2)), wp)
            .neg();
        if terme.is_zero() || terme.exposant() < somme.exposant() - wp as i64 - 2 {
            break;
        }
        somme = somme.ajouter(&terme, wp);
        n += 2;
    }
    somme
}

/// (sin x, cos x).
pub fn sin_cos(x: &Decimal, prec: usize) -> (Decimal, Decimal) {
    if x.is_zero() {
        return (Decimal::zero(), Decimal::un());
    }
    let wp = prec + 10 + x.exposant().max(0) as usize;
    let demi_pi = pi(wp).diviser(&Decimal::depuis_entier(2), wp);

    let n = x.diviser(&demi_pi, wp).entier_proche();
    let r = x.soustraire(&demi_pi.multiplier(&Decimal::depuis_entier(n.clone()), wp), wp);

    let s = serie_sin(&r, wp);
    let c = serie_cos(&r, wp);
    let quadrant = (n % BigInt::from(4) + BigInt::from(4)) % BigInt::from(4);
    let (s, c) = match quadrant.to_u8() {
        Some(0) => (s, c),
        Some(1) => (c, s.neg()),
        Some(2) => (s.neg(), c.neg()),
        _ => (c.neg(), s),
    };
    (s.arrondi(prec), c.arrondi(prec))
}

/* ------------------------ atan / asin / acos ------------------------ */

pub fn atan(x: &Decimal, prec: usize) -> Decimal {
    if x.is_zero() {
        return Decimal::zero();
    }
    let wp = prec + 12;
    let un = Decimal::un();

    if x.abs() > un {
        // atan(x) = ±π/2 - atan(1/x)
        let demi_pi = pi(wp).diviser(&Decimal::depuis_entier(2), wp);
        let inv = un.diviser(x, wp);
        let base = if x.is_negative() { demi_pi.neg() } else { demi_pi };
        return base.soustraire(&atan(&inv, wp), wp).arrondi(prec);
    }

    // demi-angle : atan(x) = 2·atan(x / (1 + √(1+x²)))
    let seuil = Decimal::nouveau(BigInt::one(), -2);
    let mut y = x.clone();
    let mut k: u32 = 0;
    while y.abs() > seuil {
        let rac = un.ajouter(&y.multiplier(&y, wp), wp).racine(wp);
        y = y.diviser(&un.ajouter(&rac, wp), wp);
        k += 1;
    }

    let y2 = y.multiplier(&y, wp);
    let mut somme = y.clone();
    let mut puissance = y;
    let mut n: u64 = 3;
    loop {
        puissance = puissance.multiplier(&y2, wp).neg();
        let terme = puissance.diviser(&Decimal::depuis_entier(n), wp);
        if terme.is_zero() || terme.exposant() < somme.exposant() - wp as i64 - 2 {
            break;
        }
        somme = somme.ajouter(&terme, wp);
        n += 2;
    }

    somme.multiplier(&deux_puissance(k), wp).arrondi(prec)
}

/// asin(x) pour |x| ≤ 1 (vérifié par l'appelant).
pub fn asin(x: &Decimal, prec: usize) -> Decimal {
    let wp = prec + 10;
    let un = Decimal::un();
    if x.abs() == un {
        let demi_pi = pi(wp).diviser(&Decimal::depuis_entier(2), wp);
        let v = if x.is_negative() { demi_pi.neg() } else { demi_pi };
        return v.arrondi(prec);
    }
    // 1 - x² = (1-x)(1+x) : pas d'annulation près de ±1
    let c = un
        .soustraire(x, wp)
        .multiplier(&un.ajouter(x, wp), wp)
        .racine(wp);
    atan(&x.diviser(&c, wp), wp).arrondi(prec)
}

/// acos(x) = 2·atan(√((1-x)/(1+x))) pour |x| ≤ 1.
pub fn acos(x: &Decimal, prec: usize) -> Decimal {
    let wp = prec + 10;
    let un = Decimal::un();
    if *x == un.neg() {
        return pi(prec);
    }
    let q = un.soustraire(x, wp).diviser(&un.ajouter(x, wp), wp).racine(wp);
    atan(&q, wp)
        .multiplier(&Decimal::depuis_entier(2), wp)
        .arrondi(prec)
}

/* ------------------------ lgamma (Stirling) ------------------------ */

static BERNOULLI: OnceLock<Mutex<Vec<BigRational>>> = OnceLock::new();

/// B_n (convention B_1 = -1/2), par la récurrence
/// Σ_{k=0}^{m} C(m+1, k)·B_k = 0.
fn bernoulli(n: usize) -> BigRational {
    let verrou = BERNOULLI.get_or_init(|| Mutex::new(vec![BigRational::one()]));
    let mut b = verrou.lock().unwrap_or_else(|p| p.into_inner());

    while b.len() <= n {
        let m = b.len();
        if m >= 3 && m % 2 == 1 {
            b.push(BigRational::zero());
            continue;
        }
        // C(m+1, k) construit au fil de k
        let mut binom = BigInt::one();
        let mut somme = BigRational::zero();
        for (k, bk) in b.iter().enumerate() {
            if !bk.is_zero() {
                somme += BigRational::from_integer(binom.clone()) * bk;
            }
            binom = binom * BigInt::from(m + 1 - k) / BigInt::from(k + 1);
        }
        let bm = -somme / BigRational::from_integer(BigInt::from(m + 1));
        b.push(bm);
    }

    b[n].clone()
}

fn rationnel(r: &BigRational, prec: usize) -> Decimal {
    Decimal::depuis_entier(r.numer().clone()).diviser(&Decimal::depuis_entier(r.denom().clone()), prec)
}

/// ln Γ(z) pour z réel > 0.
pub fn lgamma(z: &Decimal, prec: usize) -> Decimal {
    let wp = prec + 10 + 2 * z.exposant().max(0) as usize;
    let un = Decimal::un();

    // Stirling n'est précis qu'au-delà de ~0.37·wp : on décale z vers le haut
    let seuil = Decimal::depuis_entier(wp as u64 / 2 + 10);
    let mut z = z.clone();
    let mut produit = Decimal::un();
    while z < seuil {
        produit = produit.multiplier(&z, wp);
        z = z.ajouter(&un, wp);
    }

    let ln_z = ln(&z, wp);
    let demi = Decimal::nouveau(BigInt::from(5), -1);
    let deux_pi = pi(wp).multiplier(&Decimal::depuis_entier(2), wp);

    let mut somme = z
        .soustraire(&demi, wp)
        .multiplier(&ln_z, wp)
        .soustraire(&z, wp)
        .ajouter(&ln(&deux_pi, wp).multiplier(&demi, wp), wp);

    let z2 = z.multiplier(&z, wp);
    let mut z_puiss = z.clone(); // z^(2k-1)
    let mut precedent: Option<i64> = None;
    let mut k: usize = 1;
    loop {
        let coef = bernoulli(2 * k) / BigRational::from_integer(BigInt::from((2 * k) * (2 * k - 1)));
        let terme = rationnel(&coef, wp).diviser(&z_puiss, wp);
        let ex = terme.exposant();
        if terme.is_zero() || ex < somme.exposant() - wp as i64 - 2 {
            break;
        }
        // série asymptotique : on s'arrête si les termes remontent
        if precedent.is_some_and(|p| ex > p) {
            break;
        }
        somme = somme.ajouter(&terme, wp);
        precedent = Some(ex);
        z_puiss = z_puiss.multiplier(&z2, wp);
        k += 1;
    }

    if produit != un {
        somme = somme.soustraire(&ln(&produit, wp), wp);
    }
    somme.arrondi(prec)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::parse(s).unwrap()
    }

    fn assert_prefixe(v: &Decimal, attendu: &str, chiffres: usize) {
        let s = v.arrondi(chiffres).chiffres();
        assert!(
            attendu.starts_with(&s) || s.starts_with(attendu),
            "attendu {attendu}, obtenu {s}"
        );
    }

    #[test]
    fn pi_50() {
        assert_prefixe(&pi(60), "31415926535897932384626433832795028841971693993751", 50);
    }

    #[test]
    fn exp_ln() {
        // e
        assert_prefixe(
            &exp(&Decimal::un(), 50).unwrap(),
            "27182818284590452353602874713526624977572470937",
            47,
        );
        // ln 2
        assert_prefixe(&ln(&d("2"), 50), "6931471805599453094172321214581765680755", 40);
        // ln 10
        assert_prefixe(&ln10(50), "2302585092994045684017991454684364207601", 40);
        // ln(1000) = 3·ln 10
        assert_prefixe(&ln(&d("1000"), 50), "69077552789821370520539743640530926", 35);
        assert_eq!(ln(&Decimal::un(), 30), Decimal::zero());
        // e^-x petit
        assert!(exp(&d("-1e20"), 30).is_none());
    }

    #[test]
    fn trig() {
        let (s, c) = sin_cos(&d("1"), 40);
        assert_prefixe(&s, "84147098480789650665250232163029899962", 38);
        assert_prefixe(&c, "54030230586813971740093660744297660373", 38);
        let (s, _) = sin_cos(&d("-4"), 30);
        // sin(-4) = 0.7568024953079282513726390945...
        assert!(!s.is_negative());
        assert_prefixe(&s, "75680249530792825137263909", 26);
    }

    #[test]
    fn arcs() {
        // atan(1) = π/4
        assert_prefixe(&atan(&d("1"), 40), "7853981633974483096156608458198757210", 37);
        assert_prefixe(&atan(&d("-3"), 30), "1249045772398254425829917", 25);
        assert_prefixe(&asin(&d("0.5"), 40), "52359877559829887307710723054658381403", 38);
        assert_prefixe(&acos(&d("0.5"), 40), "1047197551196597746154214461093167628", 37);
        assert_eq!(acos(&d("1"), 20), Decimal::zero());
    }

    #[test]
    fn bernoulli_premiers() {
        assert_eq!(bernoulli(1), BigRational::new((-1).into(), 2.into()));
        assert_eq!(bernoulli(2), BigRational::new(1.into(), 6.into()));
        assert_eq!(bernoulli(4), BigRational::new((-1).into(), 30.into()));
        assert_eq!(bernoulli(6), BigRational::new(1.into(), 42.into()));
        assert!(bernoulli(7).is_zero());
        assert_eq!(bernoulli(8), BigRational::new((-1).into(), 30.into()));
    }

    #[test]
    fn lgamma_petit_et_grand() {
        // lnΓ(5) = ln 24
        assert_prefixe(&lgamma(&d("5"), 30), "317805383034794561964694160", 27);
        // lnΓ(0.5) = ln √π
        assert_prefixe(&lgamma(&d("0.5"), 30), "57236494292470008707171", 23);
    }
}
