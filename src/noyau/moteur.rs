// src/noyau/moteur.rs
//
// Moteur à précision progressive : Inactif -> Evalue(expression, chiffres, texte, forme).
//
// - evaluate() repart des chiffres initiaux et incrémente la génération
// - request_more_precision() ré-évalue tout à chiffres + pas
// - forme scindée pour un fil de calcul : preparer_expansion() / executer() /
//   appliquer_expansion() ; un résultat d'une autre génération est ignoré
// - la précision appliquée ne fait que monter

use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, info};

use super::erreur::{ErreurCalcul, Resultat};
use super::eval::evaluer_texte;
use super::format::{afficher, FormeCanonique};
use super::fournisseur::{Fournisseur, ModeAngle};
use super::numerique::Numerique;

pub const CHIFFRES_MIN: usize = 8;

/// Précision interne de calcul pour `chiffres` chiffres affichés.
pub fn precision_de_garde(chiffres: usize) -> usize {
    (2 * chiffres + 10).max(40)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reglages {
    chiffres_initiaux: usize,
    pas_precision: usize,
}

impl Default for Reglages {
    fn default() -> Self {
        Reglages::nouveau(120, 120)
    }
}

impl Reglages {
    /// Les deux valeurs sont relevées à CHIFFRES_MIN au besoin.
    pub fn nouveau(chiffres_initiaux: usize, pas_precision: usize) -> Self {
        Reglages {
            chiffres_initiaux: chiffres_initiaux.max(CHIFFRES_MIN),
            pas_precision: pas_precision.max(CHIFFRES_MIN),
        }
    }

    pub fn chiffres_initiaux(&self) -> usize {
        self.chiffres_initiaux
    }

    pub fn pas_precision(&self) -> usize {
        self.pas_precision
    }
}

/// Un résultat affichable, à une précision donnée.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Evaluation {
    pub expression: Arc<str>,
    pub chiffres: usize,
    pub texte: String,
    /// None si le texte n'est pas numérique (complexe, NaN, ∞)
    pub forme: Option<FormeCanonique>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EtatMoteur {
    Inactif,
    Evalue(Evaluation),
}

fn calculer<N: Numerique>(expression: Arc<str>, chiffres: usize, mode: ModeAngle) -> Resultat<Evaluation> {
    let garde = precision_de_garde(chiffres);
    let f = Fournisseur::nouveau(N::pour_chiffres(garde), mode);
    let v = evaluer_texte(&expression, &f)?;
    let texte = afficher(&f.num().calculee(&v), chiffres, N::STYLE);
    let forme = FormeCanonique::analyser(&texte);
    Ok(Evaluation {
        expression,
        chiffres,
        texte,
        forme,
    })
}

/// Travail d'expansion autonome : peut s'exécuter sur n'importe quel fil.
#[derive(Debug)]
pub struct Expansion<N> {
    generation: u64,
    expression: Arc<str>,
    chiffres: usize,
    mode: ModeAngle,
    _backend: PhantomData<fn() -> N>,
}

#[derive(Debug)]
pub struct ExpansionTerminee {
    pub generation: u64,
    pub chiffres: usize,
    pub resultat: Resultat<Evaluation>,
}

impl<N: Numerique> Expansion<N> {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn chiffres(&self) -> usize {
        self.chiffres
    }

    pub fn executer(self) -> ExpansionTerminee {
        let resultat = calculer::<N>(self.expression, self.chiffres, self.mode);
        ExpansionTerminee {
            generation: self.generation,
            chiffres: self.chiffres,
            resultat,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Application {
    /// la forme canonique a changé
    Affinee(String),
    /// plus rien à gagner : même forme canonique
    Epuisee(String),
    /// autre génération (ou précision déjà dépassée) : ignorée
    Perimee,
}

#[derive(Debug)]
pub struct Moteur<N> {
    reglages: Reglages,
    mode: ModeAngle,
    etat: EtatMoteur,
    generation: u64,
    _backend: PhantomData<fn() -> N>,
}

impl<N: Numerique> Moteur<N> {
    pub fn nouveau(reglages: Reglages, mode: ModeAngle) -> Self {
        Moteur {
            reglages,
            mode,
            etat: EtatMoteur::Inactif,
            generation: 0,
            _backend: PhantomData,
        }
    }

    pub fn reglages(&self) -> Reglages {
        self.reglages
    }

    pub fn mode_angle(&self) -> ModeAngle {
        self.mode
    }

    /// "rad" ou "deg", sinon ErreurCalcul::Entree.
    pub fn set_mode_angle(&mut self, mode: &str) -> Resultat<()> {
        self.mode = mode.parse()?;
        Ok(())
    }

    pub fn definir_mode(&mut self, mode: ModeAngle) {
        self.mode = mode;
    }

    pub fn etat(&self) -> &EtatMoteur {
        &self.etat
    }

    pub fn evaluation(&self) -> Option<&Evaluation> {
        match &self.etat {
            EtatMoteur::Evalue(ev) => Some(ev),
            EtatMoteur::Inactif => None,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn peut_etendre(&self) -> bool {
        matches!(self.etat, EtatMoteur::Evalue(_))
    }

    pub fn evaluate(&mut self, expression: &str) -> Resultat<String> {
        self.generation += 1;
        let chiffres = self.reglages.chiffres_initiaux;
        debug!(generation = self.generation, chiffres, expression, "évaluation");

        match calculer::<N>(Arc::from(expression), chiffres, self.mode) {
            Ok(ev) => {
                let texte = ev.texte.clone();
                self.etat = EtatMoteur::Evalue(ev);
                Ok(texte)
            }
            Err(e) => {
                debug!(generation = self.generation, erreur = %e, "évaluation refusée");
                self.etat = EtatMoteur::Inactif;
                Err(e)
            }
        }
    }

    /// Prépare la ré-évaluation à chiffres + pas, sans la lancer.
    pub fn preparer_expansion(&self) -> Resultat<Expansion<N>> {
        let EtatMoteur::Evalue(ev) = &self.etat else {
            return Err(ErreurCalcul::EtatInvalide);
        };
        Ok(Expansion {
            generation: self.generation,
            expression: Arc::clone(&ev.expression),
            chiffres: ev.chiffres + self.reglages.pas_precision,
            mode: self.mode,
            _backend: PhantomData,
        })
    }

    pub fn appliquer_expansion(&mut self, fin: ExpansionTerminee) -> Resultat<Application> {
        if fin.generation != self.generation {
            debug!(
                recue = fin.generation,
                courante = self.generation,
                "expansion périmée ignorée"
            );
            return Ok(Application::Perimee);
        }
        let EtatMoteur::Evalue(actuel) = &self.etat else {
            return Ok(Application::Perimee);
        };
        if fin.chiffres <= actuel.chiffres {
            return Ok(Application::Perimee);
        }

        let ev = fin.resultat?;
        let change = match (&ev.forme, &actuel.forme) {
            (Some(a), Some(b)) => a != b,
            _ => ev.texte != actuel.texte,
        };
        let texte = ev.texte.clone();
        let chiffres = ev.chiffres;
        self.etat = EtatMoteur::Evalue(ev);

        if change {
            info!(generation = self.generation, chiffres, "précision étendue");
            Ok(Application::Affinee(texte))
        } else {
            info!(generation = self.generation, chiffres, "précision épuisée");
            Ok(Application::Epuisee(texte))
        }
    }

    /// Forme synchrone : prépare, exécute, applique.
    pub fn request_more_precision(&mut self) -> Resultat<String> {
        let job = self.preparer_expansion()?;
        match self.appliquer_expansion(job.executer())? {
            Application::Affinee(t) | Application::Epuisee(t) => Ok(t),
            Application::Perimee => self
                .evaluation()
                .map(|ev| ev.texte.clone())
                .ok_or(ErreurCalcul::EtatInvalide),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::machine::Machine;
    use crate::noyau::precision::Precision;

    fn moteur() -> Moteur<Precision> {
        Moteur::nouveau(Reglages::nouveau(20, 20), ModeAngle::Rad)
    }

    #[test]
    fn garde_et_reglages() {
        assert_eq!(precision_de_garde(10), 40);
        assert_eq!(precision_de_garde(120), 250);
        let r = Reglages::nouveau(3, 0);
        assert_eq!((r.chiffres_initiaux(), r.pas_precision()), (8, 8));
    }

    #[test]
    fn inactif_refuse_l_expansion() {
        let mut m = moteur();
        assert!(!m.peut_etendre());
        assert_eq!(m.request_more_precision(), Err(ErreurCalcul::EtatInvalide));
    }

    #[test]
    fn expansion_progressive() {
        let mut m = moteur();
        assert_eq!(m.evaluate("1/3").unwrap(), format!("0.{}", "3".repeat(20)));
        assert!(m.peut_etendre());
        assert_eq!(m.request_more_precision().unwrap(), format!("0.{}", "3".repeat(40)));
        assert_eq!(m.evaluation().map(|e| e.chiffres), Some(40));

        // nouvelle expression : retour aux chiffres initiaux
        m.evaluate("2/3").unwrap();
        assert_eq!(m.evaluation().map(|e| e.chiffres), Some(20));
    }

    #[test]
    fn erreur_ramene_a_inactif() {
        let mut m = moteur();
        m.evaluate("1+1").unwrap();
        assert_eq!(m.evaluate("1/0"), Err(ErreurCalcul::DivisionParZero));
        assert_eq!(m.etat(), &EtatMoteur::Inactif);
    }

    #[test]
    fn resultat_perime_ignore() {
        let mut m = moteur();
        m.evaluate("1/7").unwrap();
        let job = m.preparer_expansion().unwrap();
        m.evaluate("1/9").unwrap();
        let fin = job.executer();
        assert_eq!(m.appliquer_expansion(fin), Ok(Application::Perimee));
        assert_eq!(m.evaluation().map(|e| e.expression.as_ref()), Some("1/9"));
    }

    #[test]
    fn exact_s_epuise() {
        let mut m = moteur();
        m.evaluate("1/8").unwrap();
        let job = m.preparer_expansion().unwrap();
        assert_eq!(
            m.appliquer_expansion(job.executer()),
            Ok(Application::Epuisee("0.125".into()))
        );

        let mut mm: Moteur<Machine> = Moteur::nouveau(Reglages::default(), ModeAngle::Rad);
        mm.evaluate("2/3").unwrap();
        let job = mm.preparer_expansion().unwrap();
        assert!(matches!(
            mm.appliquer_expansion(job.executer()),
            Ok(Application::Epuisee(_))
        ));
    }

    #[test]
    fn mode_angle() {
        let mut m = moteur();
        assert!(m.set_mode_angle("deg").is_ok());
        assert_eq!(m.mode_angle(), ModeAngle::Deg);
        let un = m.evaluate("sin(90)").unwrap();
        assert!(un == "1" || un == "1.0", "{un}");
        assert!(matches!(m.set_mode_angle("gon"), Err(ErreurCalcul::Entree(_))));
        assert_eq!(m.mode_angle(), ModeAngle::Deg);
    }
}
