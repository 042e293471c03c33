// src/noyau/jetons.rs

use super::erreur::{ErreurCalcul, Resultat};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Tok {
    /// Littéral tel qu'écrit (ex: "12", "0.5", ".5", "1e-3").
    Num(String),

    // Suite maximale de lettres ASCII / π. Le pré-traitement décide si c'est
    // une fonction, une constante ou un identifiant refusé.
    Ident(String),

    Plus,
    Minus,
    Star,
    Slash,
    Pow, // ^ ou **

    Bang,    // ! postfixé
    Percent, // % postfixé
    Comma,

    LPar,
    RPar,

    // Produits par rpn.rs seulement (jamais par tokenize).
    Neg,
    Pos,
    Appel(String, usize),
}

/// Jeton + contiguïté : `colle` = aucun espace entre ce jeton et le précédent.
/// La multiplication implicite ne s'applique qu'entre jetons collés.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Jeton {
    pub tok: Tok,
    pub colle: bool,
}

impl Tok {
    pub fn texte(&self) -> String {
        match self {
            Tok::Num(s) | Tok::Ident(s) => s.clone(),
            Tok::Plus => "+".into(),
            Tok::Minus => "-".into(),
            Tok::Star => "*".into(),
            Tok::Slash => "/".into(),
            Tok::Pow => "**".into(),
            Tok::Bang => "!".into(),
            Tok::Percent => "%".into(),
            Tok::Comma => ",".into(),
            Tok::LPar => "(".into(),
            Tok::RPar => ")".into(),
            Tok::Neg => "neg".into(),
            Tok::Pos => "pos".into(),
            Tok::Appel(nom, n) => format!("{nom}/{n}"),
        }
    }
}

fn est_lettre(c: char) -> bool {
    c.is_ascii_alphabetic() || c == 'π'
}

/// Tokenize une chaîne en jetons (une seule passe, sans réécriture de texte).
/// Supporte:
/// - nombres décimaux avec exposant optionnel (12, 1.5, .5, 5., 2e10, 3E-4)
/// - opérateurs + - * / ^ ** et leurs glyphes × ÷ −
/// - postfixés ! et %
/// - parenthèses et virgule
/// - suites de lettres / π (identifiants, sensibles à la casse)
/// - √ (équivaut à ident("sqrt"))
pub fn tokenize(s: &str) -> Resultat<Vec<Jeton>> {
    let mut out: Vec<Jeton> = Vec::new();
    let chars: Vec<char> = s.chars().collect();
    let mut i: usize = 0;
    let mut colle = false;

    let pousser = |out: &mut Vec<Jeton>, tok: Tok, colle: &mut bool| {
        out.push(Jeton { tok, colle: *colle });
        *colle = true;
    };

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            colle = false;
            i += 1;
            continue;
        }

        let simple = match c {
            '(' => Some(Tok::LPar),
            ')' => Some(Tok::RPar),
            '+' => Some(Tok::Plus),
            '-' | '−' => Some(Tok::Minus),
            '/' | '÷' => Some(Tok::Slash),
            '×' => Some(Tok::Star),
            '^' => Some(Tok::Pow),
            '!' => Some(Tok::Bang),
            '%' => Some(Tok::Percent),
            ',' => Some(Tok::Comma),
            '√' => Some(Tok::Ident("sqrt".to_string())),
            _ => None,
        };
        if let Some(tok) = simple {
            pousser(&mut out, tok, &mut colle);
            i += 1;
            continue;
        }

        // '*' ou '**'
        if c == '*' {
            if i + 1 < chars.len() && chars[i + 1] == '*' {
                pousser(&mut out, Tok::Pow, &mut colle);
                i += 2;
            } else {
                pousser(&mut out, Tok::Star, &mut colle);
                i += 1;
            }
            continue;
        }

        if est_lettre(c) {
            let start = i;
            while i < chars.len() && est_lettre(chars[i]) {
                i += 1;
            }
            let mot: String = chars[start..i].iter().collect();
            pousser(&mut out, Tok::Ident(mot), &mut colle);
            continue;
        }

        let debut_nombre = c.is_ascii_digit()
            || (c == '.' && i + 1 < chars.len() && chars[i + 1].is_ascii_digit());
        if debut_nombre {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            if i < chars.len() && chars[i] == '.' {
                i += 1;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
            }

            // exposant : seulement si suivi d'un chiffre (signe optionnel),
            // sinon "2e" reste 2 puis la constante e.
            if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                let mut j = i + 1;
                if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                    j += 1;
                }
                if j < chars.len() && chars[j].is_ascii_digit() {
                    i = j;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                }
            }

            let lit: String = chars[start..i].iter().collect();
            pousser(&mut out, Tok::Num(lit), &mut colle);
            continue;
        }

        return Err(ErreurCalcul::Entree(format!("caractère inattendu : '{c}'")));
    }

    Ok(out)
}

/// Format utilitaire (debug/“démarche”) : liste de jetons en texte.
pub fn format_tokens(tokens: &[Tok]) -> String {
    tokens.iter().map(Tok::texte).collect::<Vec<_>>().join(" ")
}
