// src/noyau/format.rs
//
// Valeur calculée -> texte d'affichage -> forme canonique.
//
// Backend arbitraire (`Style::Arbitraire`):
// - entier exact < 1e18 : chiffres bruts
// - |exposant| < 12     : nstr (bornes fixes min(-(n/3), -5) < X < n)
// - sinon               : scientifique ; une mantisse "d.0" pour une valeur
//                         qui n'est pas multiple de 10^(X-1) garde ses n chiffres
// Backend machine (`Style::Machine`) : entier exact brut (tous les chiffres), sinon %.15g.

use super::decimal::Decimal;
use super::numerique::{NonFini, Style, ValeurCalculee};

pub const LIMITE_EXPOSANT_SCI: i64 = 12;

/* ------------------------ nstr ------------------------ */

fn retirer_zeros_finaux(s: &mut String) {
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.push('0');
    }
}

/// Rendu à `n` chiffres significatifs, arrondi demi vers l'extérieur.
///
/// `bornes` = (min_fixe, max_fixe) : notation fixe si min_fixe < X < max_fixe ;
/// par défaut (min(-(n/3), -5), n). `(0, 0)` force le scientifique.
pub fn nstr(d: &Decimal, n: usize, bornes: Option<(i64, i64)>, retirer_zeros: bool) -> String {
    let n = n.max(1);
    if d.is_zero() {
        return "0.0".into();
    }
    let r = d.arrondi(n);
    let signe = if r.is_negative() { "-" } else { "" };
    let x = r.exposant();

    let mut chiffres = r.chiffres();
    chiffres.push_str(&"0".repeat(n.saturating_sub(chiffres.len())));

    let ni = n as i64;
    let (min_fixe, max_fixe) = bornes.unwrap_or(((-(ni / 3)).min(-5), ni));
    let fixe = min_fixe < x && x < max_fixe;

    let coupe = if fixe {
        if x < 0 {
            chiffres.insert_str(0, &"0".repeat((-x) as usize));
            1
        } else {
            let coupe = (x + 1) as usize;
            if coupe > chiffres.len() {
                chiffres.push_str(&"0".repeat(coupe - chiffres.len()));
            }
            coupe
        }
    } else {
        1
    };

    let mut s = format!("{}.{}", &chiffres[..coupe], &chiffres[coupe..]);
    if retirer_zeros {
        retirer_zeros_finaux(&mut s);
    }

    if fixe || x == 0 {
        format!("{signe}{s}")
    } else {
        format!("{signe}{s}e{x:+}")
    }
}

/* ------------------------ %.15g ------------------------ */

/// Équivalent de `%.15g` (C / Python) sur une valeur décimale exacte.
pub fn format_g15(d: &Decimal) -> String {
    const P: i64 = 15;
    if d.is_zero() {
        return "0".into();
    }
    let r = d.arrondi(P as usize);
    let signe = if r.is_negative() { "-" } else { "" };
    let x = r.exposant();
    let chiffres = r.chiffres();

    if (-4..P).contains(&x) {
        let corps = if x < 0 {
            format!("0.{}{}", "0".repeat((-x - 1) as usize), chiffres)
        } else {
            let coupe = (x + 1) as usize;
            if chiffres.len() <= coupe {
                format!("{}{}", chiffres, "0".repeat(coupe - chiffres.len()))
            } else {
                format!("{}.{}", &chiffres[..coupe], &chiffres[coupe..])
            }
        };
        format!("{signe}{corps}")
    } else {
        let mantisse = if chiffres.len() > 1 {
            format!("{}.{}", &chiffres[..1], &chiffres[1..])
        } else {
            chiffres
        };
        let e_signe = if x < 0 { '-' } else { '+' };
        format!("{signe}{mantisse}e{e_signe}{:02}", x.abs())
    }
}

/* ------------------------ affichage ------------------------ */

fn afficher_reel(d: &Decimal, chiffres: usize) -> String {
    if d.is_zero() {
        return "0".into();
    }
    let x = d.exposant();
    if x.abs() < LIMITE_EXPOSANT_SCI {
        return nstr(d, chiffres, None, true);
    }

    let sci = nstr(d, chiffres, Some((0, 0)), true);
    // multiple exact de 10^(X-1) <=> exposant brut normalisé ≥ X-1
    let multiple = d.exposant_brut() >= x - 1;
    if sci.contains(".0e") && !multiple {
        return nstr(d, chiffres, Some((0, 0)), false);
    }
    sci
}

/// Texte d'affichage d'une valeur calculée.
pub fn afficher(v: &ValeurCalculee, chiffres: usize, style: Style) -> String {
    match v {
        ValeurCalculee::Entier(n) => n.to_string(),
        ValeurCalculee::NonFini(NonFini::NaN) => "NaN".into(),
        ValeurCalculee::NonFini(NonFini::PlusInfini) => "∞".into(),
        ValeurCalculee::NonFini(NonFini::MoinsInfini) => "-∞".into(),
        ValeurCalculee::Complexe(re, im) => {
            let signe = if im.is_negative() { '-' } else { '+' };
            format!(
                "({} {} {}j)",
                nstr(re, chiffres, None, true),
                signe,
                nstr(&im.abs(), chiffres, None, true)
            )
        }
        ValeurCalculee::Reel(d) => match style {
            Style::Machine => format_g15(d),
            Style::Arbitraire => afficher_reel(d, chiffres),
        },
    }
}

/* ------------------------ forme canonique ------------------------ */

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Provenance {
    Scientifique,
    Decimal,
}

/// (signe, chiffres, exposant du chiffre de tête, provenance).
///
/// `chiffres` n'a jamais de zéro de tête, sauf pour la valeur "0".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormeCanonique {
    pub negatif: bool,
    pub chiffres: String,
    pub exposant: i64,
    pub provenance: Provenance,
}

fn que_des_chiffres(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

fn separer_signe(texte: &str) -> (bool, &str) {
    match texte.strip_prefix('-') {
        Some(reste) => (true, reste),
        None => (false, texte.strip_prefix('+').unwrap_or(texte)),
    }
}

impl FormeCanonique {
    /// Lit un texte d'affichage numérique ; None pour tout autre texte
    /// (erreur, complexe, NaN, ∞).
    pub fn analyser(texte: &str) -> Option<Self> {
        let texte = texte.trim();
        Self::analyser_scientifique(texte).or_else(|| Self::analyser_decimal(texte))
    }

    fn analyser_scientifique(texte: &str) -> Option<Self> {
        let (negatif, reste) = separer_signe(texte);
        let i = reste.find(['e', 'E'])?;
        let (mantisse, exp) = (&reste[..i], &reste[i + 1..]);
        let exposant: i64 = {
            let (neg, corps) = separer_signe(exp);
            if corps.is_empty() || !que_des_chiffres(corps) {
                return None;
            }
            let v: i64 = corps.parse().ok()?;
            if neg {
                -v
            } else {
                v
            }
        };

        let (tete, frac) = match mantisse.split_once('.') {
            Some((t, f)) => {
                if f.is_empty() {
                    return None;
                }
                (t, f)
            }
            None => (mantisse, ""),
        };
        if tete.len() != 1 || !que_des_chiffres(tete) || !que_des_chiffres(frac) {
            return None;
        }

        // ".0" seul : artefact d'affichage, pas un chiffre significatif
        let frac = if frac == "0" { "" } else { frac };
        Some(FormeCanonique {
            negatif,
            chiffres: format!("{tete}{frac}"),
            exposant,
            provenance: Provenance::Scientifique,
        })
    }

    fn analyser_decimal(texte: &str) -> Option<Self> {
        let (negatif, reste) = separer_signe(texte);
        let (ent, frac) = match reste.split_once('.') {
            Some((e, f)) => (e, f),
            None => (reste, ""),
        };
        if ent.is_empty() && frac.is_empty() {
            return None;
        }
        if !que_des_chiffres(ent) || !que_des_chiffres(frac) {
            return None;
        }
        let frac = if frac == "0" { "" } else { frac };

        let zero = || FormeCanonique {
            negatif,
            chiffres: "0".into(),
            exposant: 0,
            provenance: Provenance::Decimal,
        };

        let (chiffres, exposant) = match ent.find(|c| c != '0') {
            Some(i) => (format!("{}{}", &ent[i..], frac), (ent.len() - i - 1) as i64),
            None => match frac.find(|c| c != '0') {
                Some(j) => (frac[j..].to_string(), -(j as i64 + 1)),
                None => return Some(zero()),
            },
        };

        Some(FormeCanonique {
            negatif,
            chiffres,
            exposant,
            provenance: Provenance::Decimal,
        })
    }

    pub fn signe(&self) -> &'static str {
        if self.negatif {
            "-"
        } else {
            ""
        }
    }

    /// Décimal exact reconstruit, sans notation scientifique.
    pub fn copie_decimale_exacte(&self) -> String {
        let d = &self.chiffres;
        let n = d.len() as i64;
        let x = self.exposant;
        let corps = if x >= n - 1 {
            format!("{d}{}", "0".repeat((x - (n - 1)) as usize))
        } else if x < 0 {
            format!("0.{}{d}", "0".repeat((-x - 1) as usize))
        } else {
            let coupe = (x + 1) as usize;
            format!("{}.{}", &d[..coupe], &d[coupe..])
        };
        format!("{}{corps}", self.signe())
    }
}
