// src/noyau/rpn.rs
//
// Shunting-yard -> RPN -> AST
//
// Précédences (plus fort = plus serré):
//   postfixés ! %   : sortis immédiatement (opérande le plus proche)
//   **              : 4, associatif à droite
//   unaires neg/pos : 3, préfixes (empilés sans dépiler)
//   * /             : 2
//   + -             : 1
//
// Appels : Ident(fonction) reste sur la pile jusqu'à sa ')' puis sort en
// Appel(nom, nb_arguments). L'arité est vérifiée à la construction de l'AST.

use super::erreur::{ErreurCalcul, Resultat};
use super::expr::Expr;
use super::fournisseur::{Constante, Fonction};
use super::jetons::Tok;

/// Au-delà, l'AST deviendrait trop profond pour une évaluation récursive.
pub const MAX_JETONS: usize = 2000;

fn precedence(t: &Tok) -> i32 {
    match t {
        Tok::Plus | Tok::Minus => 1,
        Tok::Star | Tok::Slash => 2,
        Tok::Neg | Tok::Pos => 3,
        Tok::Pow => 4,
        _ => 0,
    }
}

fn is_right_associative(t: &Tok) -> bool {
    matches!(t, Tok::Pow)
}

fn is_fonction_ident(t: &Tok) -> bool {
    matches!(t, Tok::Ident(nom) if Fonction::depuis_nom(nom).is_some())
}

// Une paire de parenthèses ouverte ; `appel` si elle suit un nom de fonction.
struct Groupe {
    appel: bool,
    virgules: usize,
}

fn inattendu(t: &Tok) -> ErreurCalcul {
    ErreurCalcul::syntaxe(format!("'{}' inattendu", t.texte()))
}

/// Convertit une suite de jetons en RPN (notation polonaise inversée).
///
/// Exemple:
///   tokens: [Ident("sin"), LPar, Ident("pi"), Slash, Num("2"), RPar]
///   rpn:    [Ident("pi"), Num("2"), Slash, Appel("sin", 1)]
pub fn to_rpn(tokens: &[Tok]) -> Resultat<Vec<Tok>> {
    if tokens.is_empty() {
        return Err(ErreurCalcul::syntaxe("expression vide"));
    }
    if tokens.len() > MAX_JETONS {
        return Err(ErreurCalcul::syntaxe("expression trop longue"));
    }

    let mut out: Vec<Tok> = Vec::with_capacity(tokens.len());
    let mut ops: Vec<Tok> = Vec::new();
    let mut groupes: Vec<Groupe> = Vec::new();

    // “valeur” = un atome ou une expression fermée.
    // Sert à distinguer unaire/binaire et à refuser deux opérandes de suite.
    let mut prev_was_value = false;

    for tok in tokens.iter().cloned() {
        match tok {
            Tok::Num(_) => {
                if prev_was_value {
                    return Err(inattendu(&tok));
                }
                out.push(tok);
                prev_was_value = true;
            }

            Tok::Ident(_) => {
                if prev_was_value {
                    return Err(inattendu(&tok));
                }
                if is_fonction_ident(&tok) {
                    ops.push(tok);
                    prev_was_value = false;
                } else {
                    out.push(tok);
                    prev_was_value = true;
                }
            }

            Tok::LPar => {
                if prev_was_value {
                    return Err(inattendu(&tok));
                }
                let appel = ops.last().is_some_and(is_fonction_ident);
                groupes.push(Groupe { appel, virgules: 0 });
                ops.push(tok);
                prev_was_value = false;
            }

            Tok::Comma => {
                let dans_appel = groupes.last().is_some_and(|g| g.appel);
                if !dans_appel || !prev_was_value {
                    return Err(inattendu(&tok));
                }
                while let Some(top) = ops.last() {
                    if matches!(top, Tok::LPar) {
                        break;
                    }
                    if let Some(op) = ops.pop() {
                        out.push(op);
                    }
                }
                if let Some(g) = groupes.last_mut() {
                    g.virgules += 1;
                }
                prev_was_value = false;
            }

            Tok::RPar => {
                let groupe = groupes
                    .pop()
                    .ok_or_else(|| ErreurCalcul::syntaxe("parenthèse fermante sans ouvrante"))?;
                let vide = !prev_was_value;
                if vide && !(groupe.appel && groupe.virgules == 0) {
                    return Err(inattendu(&tok));
                }

                // dépile jusqu’à '('
                while let Some(top) = ops.pop() {
                    if matches!(top, Tok::LPar) {
                        break;
                    }
                    out.push(top);
                }

                if groupe.appel {
                    if let Some(Tok::Ident(nom)) = ops.pop() {
                        let n = if vide { 0 } else { groupe.virgules + 1 };
                        out.push(Tok::Appel(nom, n));
                    }
                }

                prev_was_value = true;
            }

            // Un postfixé s'applique à l'opérande complet qui le précède, résultat
            // d'appel compris : sin(30)% = sin(30)·0.01, 2^3! = 2^(3!).
            Tok::Bang | Tok::Percent => {
                if !prev_was_value {
                    return Err(inattendu(&tok));
                }
                out.push(tok);
            }

            Tok::Plus | Tok::Minus if !prev_was_value => {
                // unaire : préfixe, rien à dépiler
                ops.push(if tok == Tok::Minus { Tok::Neg } else { Tok::Pos });
            }

            Tok::Plus | Tok::Minus | Tok::Star | Tok::Slash | Tok::Pow => {
                if !prev_was_value {
                    return Err(inattendu(&tok));
                }
                // dépile tant que:
                // - on n'est pas bloqué par '(' (ni par une fonction en attente)
                // - et la précédence/associativité exige de sortir l'opérateur du haut
                while let Some(top) = ops.last() {
                    if matches!(top, Tok::LPar) || is_fonction_ident(top) {
                        break;
                    }

                    let p_top = precedence(top);
                    let p_tok = precedence(&tok);

                    let doit_pop = if is_right_associative(&tok) {
                        p_top > p_tok
                    } else {
                        p_top >= p_tok
                    };

                    if !doit_pop {
                        break;
                    }
                    if let Some(op) = ops.pop() {
                        out.push(op);
                    }
                }

                ops.push(tok);
                prev_was_value = false;
            }

            Tok::Neg | Tok::Pos | Tok::Appel(..) => return Err(inattendu(&tok)),
        }
    }

    if !prev_was_value {
        return Err(ErreurCalcul::syntaxe("expression incomplète"));
    }

    // vide la pile ops
    while let Some(op) = ops.pop() {
        if matches!(op, Tok::LPar) || is_fonction_ident(&op) {
            return Err(ErreurCalcul::syntaxe("parenthèses non fermées"));
        }
        out.push(op);
    }

    Ok(out)
}

fn depile(st: &mut Vec<Expr>) -> Resultat<Box<Expr>> {
    st.pop()
        .map(Box::new)
        .ok_or_else(|| ErreurCalcul::syntaxe("expression invalide"))
}

/// Construit une Expr à partir d’une RPN.
pub fn from_rpn(rpn: &[Tok]) -> Resultat<Expr> {
    let mut st: Vec<Expr> = Vec::new();

    for tok in rpn.iter().cloned() {
        let e = match tok {
            Tok::Num(s) => Expr::Litteral(s),

            Tok::Ident(nom) => match Constante::depuis_nom(&nom) {
                Some(c) => Expr::Constante(c),
                None => return Err(ErreurCalcul::IdentifiantInconnu(nom)),
            },

            Tok::Plus | Tok::Minus | Tok::Star | Tok::Slash | Tok::Pow => {
                let b = depile(&mut st)?;
                let a = depile(&mut st)?;
                match tok {
                    Tok::Plus => Expr::Add(a, b),
                    Tok::Minus => Expr::Sub(a, b),
                    Tok::Star => Expr::Mul(a, b),
                    Tok::Slash => Expr::Div(a, b),
                    _ => Expr::Pow(a, b),
                }
            }

            Tok::Neg => Expr::Neg(depile(&mut st)?),
            Tok::Pos => Expr::Pos(depile(&mut st)?),
            Tok::Bang => Expr::Factorielle(depile(&mut st)?),
            Tok::Percent => Expr::Pourcent(depile(&mut st)?),

            Tok::Appel(nom, n) => {
                let f = Fonction::depuis_nom(&nom)
                    .ok_or_else(|| ErreurCalcul::IdentifiantInconnu(nom.clone()))?;
                if n != f.arite() || st.len() < n {
                    return Err(ErreurCalcul::syntaxe(format!(
                        "{nom}() attend {} argument(s), {n} reçu(s)",
                        f.arite()
                    )));
                }
                let args = st.split_off(st.len() - n);
                Expr::Appel(f, args)
            }

            Tok::LPar | Tok::RPar | Tok::Comma => {
                return Err(ErreurCalcul::syntaxe("parenthèse inattendue en RPN"))
            }
        };
        st.push(e);
    }

    match (st.pop(), st.is_empty()) {
        (Some(e), true) => Ok(e),
        _ => Err(ErreurCalcul::syntaxe("expression invalide")),
    }
}
