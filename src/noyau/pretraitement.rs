// src/noyau/pretraitement.rs
//
// Texte brut -> suite de jetons normalisée, prête pour rpn.rs.
//
// - validation des caractères (liste blanche)
// - identifiants : liste blanche stricte (fonctions + pi, π, e)
// - multiplication implicite, seulement entre jetons collés :
//     ) ! %   devant  (  nombre  identifiant
//     nombre  devant  (  identifiant
//     π, e    devant  nombre  (        (e collé à un nombre exclu : "2e(3)")
// - une fonction doit être suivie de '(' ; une constante ne peut pas l'être

use super::erreur::{ErreurCalcul, Resultat};
use super::fournisseur::{est_identifiant, Constante, Fonction};
use super::jetons::{tokenize, Jeton, Tok};

const INTERDITS: [char; 6] = ['[', ']', '{', '}', ';', ':'];

fn caractere_permis(c: char) -> bool {
    c.is_ascii_digit()
        || c.is_ascii_alphabetic()
        || c.is_whitespace()
        || "+-*/^().,!%".contains(c)
        || "×÷−√π".contains(c)
}

/// Refuse tout texte hors de l'alphabet de la calculatrice.
pub fn valider_brut(expr: &str) -> Resultat<()> {
    if expr.trim().is_empty() {
        return Err(ErreurCalcul::Entree("expression vide".into()));
    }
    if expr.contains("__") {
        return Err(ErreurCalcul::Entree("séquence non permise : __".into()));
    }
    if let Some(c) = expr.chars().find(|c| INTERDITS.contains(c)) {
        return Err(ErreurCalcul::Entree(format!("caractère non permis : '{c}'")));
    }
    if let Some(c) = expr.chars().find(|c| !caractere_permis(*c)) {
        return Err(ErreurCalcul::Entree(format!("caractère non permis : '{c}'")));
    }
    Ok(())
}

fn termine_valeur(t: &Tok) -> bool {
    matches!(t, Tok::RPar | Tok::Bang | Tok::Percent)
}

fn est_fonction(t: &Tok) -> bool {
    matches!(t, Tok::Ident(nom) if Fonction::depuis_nom(nom).is_some())
}

fn est_constante(t: &Tok) -> bool {
    matches!(t, Tok::Ident(nom) if Constante::depuis_nom(nom).is_some())
}

/// Faut-il un '*' entre `precedent` et `courant` (collés) ?
/// `e_apres_nombre` : le précédent est un `e` collé derrière un nombre.
fn produit_implicite(precedent: &Tok, courant: &Tok, e_apres_nombre: bool) -> Resultat<bool> {
    let courant_valeur = matches!(courant, Tok::LPar | Tok::Num(_) | Tok::Ident(_));
    if termine_valeur(precedent) {
        return Ok(courant_valeur);
    }
    match (precedent, courant) {
        (Tok::Num(a), Tok::Num(b)) => Err(ErreurCalcul::syntaxe(format!(
            "nombres adjacents : {a} {b}"
        ))),
        (Tok::Num(_), Tok::LPar | Tok::Ident(_)) => Ok(true),
        (Tok::Ident(nom), Tok::Num(_) | Tok::LPar) => {
            Ok((nom == "π" || nom == "e") && !e_apres_nombre)
        }
        _ => Ok(false),
    }
}

/// Pipeline de pré-traitement complet.
pub fn pretraiter(expr: &str) -> Resultat<Vec<Tok>> {
    valider_brut(expr)?;
    let jetons = tokenize(expr)?;

    for j in &jetons {
        if let Tok::Ident(nom) = &j.tok {
            if !est_identifiant(nom) {
                return Err(ErreurCalcul::IdentifiantInconnu(nom.clone()));
            }
        }
    }

    let mut out: Vec<Tok> = Vec::with_capacity(jetons.len() * 2);
    let mut precedent: Option<&Jeton> = None;
    let mut e_apres_nombre = false;

    for (i, j) in jetons.iter().enumerate() {
        if let Some(p) = precedent {
            if j.colle && produit_implicite(&p.tok, &j.tok, e_apres_nombre)? {
                out.push(Tok::Star);
            } else if est_constante(&p.tok) && j.tok == Tok::LPar {
                return Err(ErreurCalcul::syntaxe(format!(
                    "{} n'est pas une fonction",
                    p.tok.texte()
                )));
            }
        }

        if est_fonction(&j.tok) && jetons.get(i + 1).map(|s| &s.tok) != Some(&Tok::LPar) {
            return Err(ErreurCalcul::syntaxe(format!(
                "{} doit être suivi de '('",
                j.tok.texte()
            )));
        }

        e_apres_nombre = j.colle
            && j.tok == Tok::Ident("e".into())
            && matches!(precedent.map(|p| &p.tok), Some(Tok::Num(_)));
        out.push(j.tok.clone());
        precedent = Some(j);
    }

    Ok(out)
}

/// Jetons normalisés rendus en texte compact ("2*(3)").
pub fn format_jetons(jetons: &[Tok]) -> String {
    jetons.iter().map(Tok::texte).collect()
}
