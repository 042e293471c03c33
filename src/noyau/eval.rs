//! Noyau — évaluation (pipeline réel)
//!
//! texte -> pré-traitement -> RPN -> Expr -> (promotion) -> valeur du backend
//!
//! L'évaluateur ne connaît que les noeuds de `Expr` et le `Fournisseur` :
//! aucun autre nom n'est résolu.

use super::erreur::Resultat;
use super::expr::Expr;
use super::fournisseur::Fournisseur;
use super::jetons::format_tokens;
use super::numerique::Numerique;
use super::pretraitement::{format_jetons, pretraiter};
use super::rpn::{from_rpn, to_rpn};

/// Trace des étapes d'analyse (affichée par `--demarche`).
#[derive(Default, Clone, Debug)]
pub struct DemarcheNoyau {
    pub jetons: String,
    pub rpn: String,
    pub arbre: String,
}

/// Texte -> AST, sans évaluation.
pub fn analyser(texte: &str) -> Resultat<Expr> {
    let jetons = pretraiter(texte)?;
    let rpn = to_rpn(&jetons)?;
    from_rpn(&rpn)
}

pub fn demarche(texte: &str) -> Resultat<DemarcheNoyau> {
    let jetons = pretraiter(texte)?;
    let rpn = to_rpn(&jetons)?;
    let arbre = from_rpn(&rpn)?;
    Ok(DemarcheNoyau {
        jetons: format_jetons(&jetons),
        rpn: format_tokens(&rpn),
        arbre: arbre.to_string(),
    })
}

/// Évalue un AST contre le fournisseur.
pub fn evaluer<N: Numerique>(expr: &Expr, f: &Fournisseur<N>) -> Resultat<N::Valeur> {
    use Expr::*;

    let n = f.num();
    match expr {
        Litteral(s) => n.litteral(s),
        EntierNatif(k) => n.entier(k),
        Constante(c) => Ok(f.constante(*c)),

        Neg(x) => n.opposer(&evaluer(x, f)?),
        Pos(x) => evaluer(x, f),

        Add(a, b) => n.ajouter(&evaluer(a, f)?, &evaluer(b, f)?),
        Sub(a, b) => n.soustraire(&evaluer(a, f)?, &evaluer(b, f)?),
        Mul(a, b) => n.multiplier(&evaluer(a, f)?, &evaluer(b, f)?),
        Div(a, b) => n.diviser(&evaluer(a, f)?, &evaluer(b, f)?),
        Pow(a, b) => {
            let base = evaluer(a, f)?;
            match b.as_ref() {
                EntierNatif(k) => n.puissance_entiere(&base, k),
                autre => n.puissance(&base, &evaluer(autre, f)?),
            }
        }

        Pourcent(x) => f.pourcent(&evaluer(x, f)?),
        Factorielle(x) => f.factorielle(&evaluer(x, f)?),

        Appel(fonction, args) => {
            let valeurs = args
                .iter()
                .map(|a| evaluer(a, f))
                .collect::<Resultat<Vec<_>>>()?;
            f.appeler(*fonction, &valeurs)
        }
    }
}

/// Pipeline complet : analyse, promotion si le backend la demande, évaluation.
pub fn evaluer_texte<N: Numerique>(texte: &str, f: &Fournisseur<N>) -> Resultat<N::Valeur> {
    let mut expr = analyser(texte)?;
    if N::PROMOTION {
        expr = expr.promouvoir();
    }
    evaluer(&expr, f)
}
