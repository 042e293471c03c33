// src/app/session.rs
//
// Session : moteur + fenêtre + viewport, côté fil d'affichage.
//
// - evaluate() affiche le résultat (ou "Error: ...") à partir du décalage 0
// - defiler() déplace la fenêtre, puis précharge si la marge est entamée
// - l'expansion tourne sur un fil dédié ; les résultats reviennent par un canal
//   flume et ne sont appliqués qu'au drainage (traiter_messages / attendre_expansion)
// - une expansion demandée par résultat affiché ; un résultat d'une autre
//   génération est ignoré
// - un échec d'expansion est journalisé et laisse l'affichage intact

use std::thread;
use std::time::{Duration, Instant};

use flume::{Receiver, Sender};
use tracing::{debug, warn};

use super::etat::{Demarche, EtatCalc};
use super::{Defilement, Viewport};
use crate::noyau::moteur::{Expansion, ExpansionTerminee};
use crate::noyau::{
    demarche, Affichage, Application, Copie, EtatVue, ModeAngle, Moteur, Numerique, Resultat,
};

fn lancer_fil<N: Numerique>() -> (Sender<Expansion<N>>, Receiver<ExpansionTerminee>) {
    let (tx_travaux, rx_travaux) = flume::unbounded::<Expansion<N>>();
    let (tx_fins, rx_fins) = flume::unbounded();

    thread::spawn(move || {
        for travail in rx_travaux.iter() {
            let generation = travail.generation();
            let chiffres = travail.chiffres();
            debug!(generation, chiffres, "expansion démarrée");
            if tx_fins.send(travail.executer()).is_err() {
                break;
            }
        }
    });

    (tx_travaux, rx_fins)
}

pub struct Session<N: Numerique, V: Viewport> {
    moteur: Moteur<N>,
    vue: EtatVue,
    viewport: V,
    etat: EtatCalc,
    travaux: Sender<Expansion<N>>,
    fins: Receiver<ExpansionTerminee>,
}

impl<N: Numerique, V: Viewport> Session<N, V> {
    /// La largeur de fenêtre est celle du viewport.
    pub fn nouvelle(moteur: Moteur<N>, affichage: Affichage, viewport: V) -> Self {
        let affichage = Affichage {
            largeur: viewport.capacite(),
            ..affichage
        };
        let (travaux, fins) = lancer_fil::<N>();
        Session {
            moteur,
            vue: EtatVue::nouveau(affichage),
            viewport,
            etat: EtatCalc::default(),
            travaux,
            fins,
        }
    }

    /* ------------------------ Accès ------------------------ */

    pub fn moteur(&self) -> &Moteur<N> {
        &self.moteur
    }

    pub fn vue(&self) -> &EtatVue {
        &self.vue
    }

    pub fn viewport(&self) -> &V {
        &self.viewport
    }

    pub fn etat(&self) -> &EtatCalc {
        &self.etat
    }

    pub fn texte_affiche(&self) -> &str {
        self.vue.texte_courant()
    }

    pub fn mode_angle(&self) -> ModeAngle {
        self.moteur.mode_angle()
    }

    /// Vaut pour la prochaine évaluation.
    pub fn set_mode_angle(&mut self, mode: &str) -> Resultat<()> {
        self.moteur.set_mode_angle(mode)
    }

    /* ------------------------ Actions ------------------------ */

    /// Évalue et affiche au décalage 0. Renvoie le texte complet.
    pub fn evaluate(&mut self, expression: &str) -> String {
        self.etat.entree = expression.to_string();

        let texte = match self.moteur.evaluate(expression) {
            Ok(texte) => {
                let chiffres = self.moteur.evaluation().map_or(0, |ev| ev.chiffres);
                let trace = demarche(expression).ok().map(Demarche::from);
                self.etat.set_resultat(texte.as_str(), chiffres, trace);
                texte
            }
            Err(e) => {
                let msg = e.message_ecran();
                self.etat.set_erreur(msg.as_str());
                msg
            }
        };

        self.vue.nouveau_resultat(&texte);
        self.viewport.afficher(self.vue.texte_courant(), false);
        texte
    }

    /// Expansion synchrone, hors fil (bouton "plus de chiffres").
    /// Même traitement qu'un retour du fil : un résultat inchangé épuise la vue.
    pub fn request_more_precision(&mut self) -> String {
        let application = self
            .moteur
            .preparer_expansion()
            .and_then(|travail| self.moteur.appliquer_expansion(travail.executer()));
        match application {
            Ok(application) => {
                self.reporter(application);
                self.moteur
                    .evaluation()
                    .map_or_else(String::new, |ev| ev.texte.clone())
            }
            Err(e) => {
                let msg = e.message_ecran();
                self.etat.set_erreur(msg.as_str());
                msg
            }
        }
    }

    /// Renvoie true si la fenêtre a bougé.
    pub fn defiler(&mut self, sens: Defilement) -> bool {
        let bouge = match sens {
            Defilement::Avant => self.vue.avancer(),
            Defilement::Arriere => self.vue.reculer(),
        };
        if bouge {
            self.viewport.afficher(self.vue.texte_courant(), true);
        }
        if sens == Defilement::Avant {
            self.precharger();
        }
        bouge
    }

    pub fn copier(&self, mode: Copie) -> String {
        self.vue.copie(mode)
    }

    /// Applique les expansions arrivées, sans bloquer. Renvoie leur nombre.
    pub fn traiter_messages(&mut self) -> usize {
        let fins: Vec<ExpansionTerminee> = self.fins.try_iter().collect();
        let n = fins.len();
        for fin in fins {
            self.appliquer(fin);
        }
        n
    }

    /// Bloque jusqu'au retour de l'expansion en vol (ou jusqu'au délai).
    /// Renvoie false si le délai est écoulé avant.
    pub fn attendre_expansion(&mut self, delai: Duration) -> bool {
        let limite = Instant::now() + delai;
        while self.vue.en_chargement() {
            match self.fins.recv_deadline(limite) {
                Ok(fin) => self.appliquer(fin),
                Err(_) => return false,
            }
        }
        true
    }

    /* ------------------------ Interne ------------------------ */

    fn affiner(&mut self, texte: &str) {
        let chiffres = self.moteur.evaluation().map_or(0, |ev| ev.chiffres);
        self.etat.affiner(texte, chiffres);
        if self.vue.affiner(texte) {
            self.viewport.afficher(self.vue.texte_courant(), true);
        }
    }

    fn precharger(&mut self) {
        if !self.vue.doit_precharger() || !self.moteur.peut_etendre() {
            return;
        }
        if !N::EXTENSIBLE {
            self.vue.marquer_epuise();
            return;
        }

        let travail = match self.moteur.preparer_expansion() {
            Ok(t) => t,
            Err(e) => {
                warn!(erreur = %e, "expansion impossible");
                return;
            }
        };
        debug!(
            generation = travail.generation(),
            chiffres = travail.chiffres(),
            "expansion demandée"
        );
        if self.travaux.send(travail).is_ok() {
            self.vue.debut_chargement();
        } else {
            warn!("fil d'expansion arrêté");
            self.vue.marquer_epuise();
        }
    }

    // Seul un retour de la génération courante libère le drapeau : celui d'une
    // évaluation précédente peut précéder le travail en cours dans la file.
    fn appliquer(&mut self, fin: ExpansionTerminee) {
        if fin.generation == self.moteur.generation() {
            self.vue.fin_chargement();
        }
        match self.moteur.appliquer_expansion(fin) {
            Ok(application) => self.reporter(application),
            Err(e) => warn!(erreur = %e, "échec d'expansion ignoré"),
        }
    }

    fn reporter(&mut self, application: Application) {
        match application {
            Application::Affinee(texte) => self.affiner(&texte),
            Application::Epuisee(texte) => {
                let chiffres = self.moteur.evaluation().map_or(0, |ev| ev.chiffres);
                self.etat.affiner(texte, chiffres);
                self.vue.marquer_epuise();
            }
            Application::Perimee => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ViewportMemoire;
    use crate::noyau::{Machine, Precision, Reglages};

    const DELAI: Duration = Duration::from_secs(20);

    fn session(chiffres: usize) -> Session<Precision, ViewportMemoire> {
        Session::nouvelle(
            Moteur::nouveau(Reglages::nouveau(chiffres, 20), ModeAngle::Rad),
            Affichage::default(),
            ViewportMemoire::nouveau(18),
        )
    }

    #[test]
    fn evaluation_affichee_au_debut() {
        let mut s = session(20);
        let texte = s.evaluate("1/3");
        assert_eq!(texte, format!("0.{}", "3".repeat(20)));
        assert_eq!(s.etat().resultat, texte);
        assert!(!s.etat().demarche.rpn.is_empty());
        assert_eq!(s.etat().demarche.chiffres, 20);

        let affiche = s.viewport().texte();
        assert!(affiche.starts_with("0.333"), "{affiche}");
        assert!(affiche.chars().count() <= 18);
        assert_eq!(s.viewport().historique().last().map(|h| h.1), Some(false));
    }

    #[test]
    fn erreur_en_texte() {
        let mut s = session(20);
        assert_eq!(s.evaluate("1/0"), "Error: division par zéro");
        assert_eq!(s.viewport().texte(), "Error: division pa");
        assert!(s.etat().a_erreur());
        assert_eq!(s.copier(Copie::Verbatim), "Error: division par zéro");

        // aucune expansion sur une erreur
        while s.defiler(Defilement::Avant) {}
        assert!(!s.vue().en_chargement());
        assert_eq!(s.viewport().texte(), " division par zéro");
    }

    #[test]
    fn arriere_au_debut_sans_effet() {
        let mut s = session(20);
        s.evaluate("5/7");
        let n = s.viewport().historique().len();
        assert!(!s.defiler(Defilement::Arriere));
        assert_eq!(s.viewport().historique().len(), n);

        assert!(s.defiler(Defilement::Avant));
        assert!(s.viewport().texte().starts_with("…"));
        assert!(s.defiler(Defilement::Arriere));
        assert!(s.viewport().texte().starts_with("0.714285"));
    }

    #[test]
    fn expansion_asynchrone() {
        let mut s = session(20);
        s.evaluate("1/7");
        assert!(s.defiler(Defilement::Avant));
        assert!(s.vue().en_chargement());

        assert!(s.attendre_expansion(DELAI));
        assert!(!s.vue().en_chargement());
        assert_eq!(s.moteur().evaluation().map(|ev| ev.chiffres), Some(40));
        assert!(s.etat().resultat.starts_with("0.142857142857142857142857"));
        assert_eq!(s.etat().demarche.chiffres, 40);
        assert!(s.viewport().texte().chars().count() <= 18);
    }

    #[test]
    fn expansion_perimee_ignoree() {
        let mut s = session(20);
        s.evaluate("1/7");
        s.defiler(Defilement::Avant);
        assert!(s.vue().en_chargement());

        s.evaluate("1/9");
        let perimee = s.fins.recv_timeout(DELAI).unwrap();
        assert_eq!(perimee.generation + 1, s.moteur().generation());
        s.appliquer(perimee);

        let ev = s.moteur().evaluation().cloned();
        assert_eq!(ev.as_ref().map(|e| e.expression.as_ref()), Some("1/9"));
        assert_eq!(ev.map(|e| e.chiffres), Some(20));
        assert_eq!(s.vue().source(), format!("0.{}", "1".repeat(20)));
        assert_eq!(s.vue().index(), 0);
        assert!(!s.vue().est_epuise());
    }

    #[test]
    fn nouveau_resultat_libere_le_chargement() {
        let mut s = session(20);
        s.evaluate("1/7");
        s.defiler(Defilement::Avant);
        assert!(s.vue().en_chargement());

        s.evaluate("1/9");
        assert!(!s.vue().en_chargement());

        // le nouveau résultat précharge aussitôt ; le retour périmé ne le libère pas
        s.defiler(Defilement::Avant);
        assert!(s.vue().en_chargement());
        assert!(s.attendre_expansion(DELAI));
        let ev = s.moteur().evaluation().cloned();
        assert_eq!(ev.as_ref().map(|e| e.expression.as_ref()), Some("1/9"));
        assert_eq!(ev.map(|e| e.chiffres), Some(40));
        assert!(s.etat().resultat.starts_with(&format!("0.{}", "1".repeat(39))));
    }

    #[test]
    fn exact_s_epuise_puis_plus_de_demande() {
        let mut s = session(20);
        s.evaluate("25^25/10^10");
        let mut demandes = 0;
        for _ in 0..200 {
            s.defiler(Defilement::Avant);
            if s.vue().en_chargement() {
                demandes += 1;
                assert!(s.attendre_expansion(DELAI));
            }
        }
        assert!(demandes < 20, "{demandes}");
        assert_eq!(s.viewport().texte(), "…389053.3447265625");
        assert_eq!(s.traiter_messages(), 0);
    }

    #[test]
    fn precision_synchrone() {
        let mut s = session(20);
        assert_eq!(s.request_more_precision(), "Error: aucun calcul précédent");

        s.evaluate("sqrt(2)");
        let t = s.request_more_precision();
        assert!(t.starts_with("1.41421356237309504880168872420969807"), "{t}");
        assert_eq!(s.etat().resultat, t);
    }

    #[test]
    fn precision_synchrone_epuisee() {
        let mut s = session(20);
        s.evaluate("2^10");
        assert_eq!(s.request_more_precision(), "1024");
        assert_eq!(s.request_more_precision(), "1024");
        assert!(s.vue().est_epuise());
        assert_eq!(s.moteur().evaluation().map(|ev| ev.chiffres), Some(60));

        while s.defiler(Defilement::Avant) {}
        assert!(!s.vue().en_chargement());
        assert_eq!(s.traiter_messages(), 0);
    }

    #[test]
    fn mode_angle_et_copie() {
        let mut s = session(20);
        assert!(s.set_mode_angle("deg").is_ok());
        assert_eq!(s.mode_angle(), ModeAngle::Deg);
        assert_eq!(s.evaluate("cos(60)"), "0.5");
        assert!(s.set_mode_angle("grad").is_err());

        s.evaluate("3*10^-30");
        assert_eq!(s.copier(Copie::Verbatim), "3e-30");
        assert_eq!(
            s.copier(Copie::DecimalExacte),
            format!("0.{}3", "0".repeat(29))
        );
    }

    #[test]
    fn backend_machine_jamais_etendu() {
        let mut s = Session::<Machine, _>::nouvelle(
            Moteur::nouveau(Reglages::default(), ModeAngle::Rad),
            Affichage::default(),
            ViewportMemoire::nouveau(18),
        );
        s.evaluate("1/7*10^-5");
        s.defiler(Defilement::Avant);
        assert!(!s.vue().en_chargement());
        assert!(s.vue().est_epuise());
        assert_eq!(s.moteur().evaluation().map(|ev| ev.chiffres), Some(120));
    }
}
