// src/noyau/fenetre.rs
//
// Fenêtre de défilement sur une forme canonique.
//
// Largeur W (défaut 18) : une case est réservée à l'ellipse '…', les
// dispositions de chiffres comptent donc sur cap = W-1 caractères.
//
// Trois dispositions numériques, choisies par décalage :
// - queue entière   : entier exact avec peu de zéros finaux, état terminal
//                     seulement ; chiffres virtuels complétés par les zéros
// - fenêtre décimale: le point est encore dans la fenêtre (exposant décalé ≤ 3)
// - scientifique    : '…' + mantisse + "e±X" (disposition par défaut)
//
// La suite des vues distinctes est calculée d'avance, une fois par résultat :
// avancer = vue suivante (ou rien à l'état terminal), reculer = vue précédente.
// Texte non numérique (erreur, complexe, NaN, ∞) : fenêtre de W caractères.

use super::format::{FormeCanonique, Provenance};

pub const LARGEUR_DEFAUT: usize = 18;
pub const LARGEUR_MIN: usize = 8;
pub const MARGE_PRECHARGEMENT: usize = 15;
pub const FENETRE_FRACTION: usize = 30;

/// Au-delà, la vue décalée n'est plus une fenêtre décimale.
const DERNIER_EXPOSANT_DECIMAL: i64 = 3;
const ELLIPSE: char = '…';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Affichage {
    pub largeur: usize,
    pub marge_prechargement: usize,
    pub fenetre_fraction: usize,
}

impl Default for Affichage {
    fn default() -> Self {
        Affichage {
            largeur: LARGEUR_DEFAUT,
            marge_prechargement: MARGE_PRECHARGEMENT,
            fenetre_fraction: FENETRE_FRACTION,
        }
    }
}

impl Affichage {
    pub fn largeur(&self) -> usize {
        self.largeur.max(LARGEUR_MIN)
    }

    /// Caractères de chiffres disponibles (hors ellipse).
    pub fn capacite(&self) -> usize {
        self.largeur() - 1
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    Initiale,
    Scientifique,
    DecimalFenetre,
    QueueEntiere,
    Texte,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vue {
    pub texte: String,
    pub decalage: usize,
    pub disposition: Disposition,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Copie {
    /// vue courante sans '…'
    Verbatim,
    /// décimal exact reconstruit depuis la forme canonique
    DecimalExacte,
}

fn texte_exposant(e: i64) -> String {
    format!("e{e:+}")
}

fn zeros_finaux(s: &str) -> usize {
    s.bytes().rev().take_while(|&b| b == b'0').count()
}

/* ------------------------ fenêtre numérique ------------------------ */

/// Rendu pur d'une forme canonique, pour tout décalage.
#[derive(Clone, Debug)]
pub struct Fenetre {
    forme: FormeCanonique,
    initial: String,
    virtuels: String,
    cap: usize,
}

struct Mantisse {
    debut: usize,
    montres: usize,
    exposant: i64,
}

impl Fenetre {
    /// None si le texte n'est pas numérique, ou si son exposant ne tient pas
    /// dans la largeur.
    pub fn nouvelle(texte: &str, affichage: &Affichage) -> Option<Self> {
        let forme = FormeCanonique::analyser(texte)?;
        let cap = affichage.capacite();

        let pire = forme.exposant.unsigned_abs() + forme.chiffres.len() as u64;
        let largeur_exp = 2 + pire.to_string().len();
        if forme.signe().len() + 2 + largeur_exp > affichage.largeur() {
            return None;
        }

        let mut f = Fenetre {
            forme,
            initial: String::new(),
            virtuels: String::new(),
            cap,
        };
        f.virtuels = f.chiffres_virtuels();
        f.initial = match f.forme.provenance {
            Provenance::Decimal => texte.trim().to_string(),
            Provenance::Scientifique => f.initiale_scientifique(),
        };
        Some(f)
    }

    pub fn forme(&self) -> &FormeCanonique {
        &self.forme
    }

    fn signe(&self) -> &'static str {
        self.forme.signe()
    }

    fn budget_coeur(&self) -> usize {
        self.cap.saturating_sub(self.signe().len()).max(1)
    }

    fn nb_virtuels(&self) -> usize {
        self.virtuels.len()
    }

    fn decalage_effectif(&self, s: usize) -> usize {
        if self.forme.provenance == Provenance::Decimal && self.forme.exposant < 0 {
            s.saturating_sub(1)
        } else {
            s
        }
    }

    fn debut_borne(&self, s: usize) -> usize {
        self.decalage_effectif(s).min(self.nb_virtuels().saturating_sub(1))
    }

    /// Écart entre l'exposant et la position du dernier chiffre.
    fn echelle(&self) -> i64 {
        self.forme.exposant - (self.forme.chiffres.len() as i64 - 1)
    }

    /// Zéros finaux de la partie entière ; None si la valeur n'est pas entière.
    fn zeros_entiers(&self) -> Option<i64> {
        let tz = zeros_finaux(&self.forme.chiffres) as i64;
        let echelle = self.echelle();
        if echelle < 0 && tz < -echelle {
            return None;
        }
        Some((tz + echelle).max(0))
    }

    fn queue_possible(&self) -> bool {
        self.zeros_entiers()
            .is_some_and(|z| z <= (self.cap / 2) as i64)
    }

    fn chiffres_virtuels(&self) -> String {
        let echelle = self.echelle();
        let mut v = self.forme.chiffres.clone();
        if echelle > 0 && self.queue_possible() {
            v.push_str(&"0".repeat(echelle as usize));
        }
        v
    }

    fn entier_exact(&self) -> bool {
        self.echelle() >= 0
    }

    fn initiale_scientifique(&self) -> String {
        let d = &self.forme.chiffres;
        let exp = texte_exposant(self.forme.exposant);
        let budget = self
            .cap
            .saturating_sub(self.signe().len() + exp.len())
            .max(1);
        let mantisse = match budget {
            1 => d[..1].to_string(),
            2 => d[..d.len().min(2)].to_string(),
            _ => {
                let frac = &d[1..d.len().min(budget - 1)];
                if frac.is_empty() {
                    d[..1].to_string()
                } else {
                    format!("{}.{frac}", &d[..1])
                }
            }
        };
        format!("{}{mantisse}{exp}", self.signe())
    }

    fn initiale_visible(&self) -> String {
        match self.forme.provenance {
            Provenance::Scientifique => self.initial.clone(),
            Provenance::Decimal => self.initial.chars().take(self.cap).collect(),
        }
    }

    pub fn initiale_tient(&self) -> bool {
        self.forme.provenance == Provenance::Decimal && self.initial.chars().count() <= self.cap
    }

    /* ---- disposition scientifique ---- */

    fn mesurer_mantisse(&self, s: usize) -> Mantisse {
        let x = self.forme.exposant;
        let budget = self.budget_coeur();
        let debut = self.debut_borne(s);

        let mut largeur = budget;
        for _ in 0..4 {
            let e = x - (debut + largeur) as i64 + 1;
            let suivante = budget.saturating_sub(texte_exposant(e).len()).max(1);
            if suivante == largeur {
                break;
            }
            largeur = suivante;
        }

        let disponibles = self.nb_virtuels().saturating_sub(debut).max(1);
        let mut montres = disponibles.min(largeur);
        let e = x - (debut + montres) as i64 + 1;
        let max_montres = budget.saturating_sub(texte_exposant(e).len()).max(1);
        montres = montres.min(max_montres);

        Mantisse {
            debut,
            montres,
            exposant: x - (debut + montres) as i64 + 1,
        }
    }

    fn exposant_decale(&self, s: usize) -> i64 {
        self.mesurer_mantisse(s).exposant
    }

    /// (texte, pleine largeur)
    fn construire_sci(&self, s: usize, preferer_queue: bool) -> (String, bool) {
        let budget = self.budget_coeur();
        let v = &self.virtuels;

        if preferer_queue && self.queue_possible() {
            let mut debut = self.debut_borne(s);
            let reste = v.len() - debut;
            if reste < budget && debut > 0 {
                debut = debut.saturating_sub(budget - reste);
            }
            let tout = &v[debut..];
            let (coeur, plein) = if tout.len() >= budget {
                (&tout[tout.len() - budget..], true)
            } else {
                (tout, false)
            };
            return (format!("{}{ELLIPSE}{coeur}", self.signe()), plein);
        }

        let m = self.mesurer_mantisse(s);
        let coeur = format!(
            "{}{}",
            &v[m.debut..m.debut + m.montres],
            texte_exposant(m.exposant)
        );
        let plein = coeur.len() >= budget;
        // aucun chiffre de tête masqué : pas d'ellipse
        let texte = if m.debut == 0 {
            format!("{}{coeur}", self.signe())
        } else {
            format!("{}{ELLIPSE}{coeur}", self.signe())
        };
        (texte, plein)
    }

    fn doit_queue(&self, s: usize) -> bool {
        s > 0 && self.queue_possible() && self.exposant_decale(s) <= DERNIER_EXPOSANT_DECIMAL
    }

    fn position_point_brute(&self, s: usize) -> i64 {
        self.forme.exposant + 1 - self.decalage_effectif(s) as i64
    }

    fn doit_decimal(&self, s: usize) -> bool {
        s > 0
            && !self.entier_exact()
            && self.exposant_decale(s) <= DERNIER_EXPOSANT_DECIMAL
            && self.position_point_brute(s) >= 0
    }

    fn position_point(&self, s: usize) -> Option<i64> {
        self.doit_decimal(s).then(|| self.position_point_brute(s))
    }

    /* ---- fenêtre décimale ---- */

    /// (début, nombre de chiffres, position du point) de la fenêtre décimale.
    fn geometrie_decimale(&self, s: usize) -> Option<(usize, usize, i64)> {
        if !self.doit_decimal(s) {
            return None;
        }
        let debut = self.debut_borne(s);
        let corps = self.budget_coeur();
        let point = self.forme.exposant + 1 - debut as i64;
        let besoin = if point >= corps as i64 {
            corps
        } else {
            corps.saturating_sub(1).max(1)
        };
        Some((debut, besoin, point))
    }

    fn bord_droit(&self, s: usize) -> Option<usize> {
        self.geometrie_decimale(s)
            .map(|(debut, besoin, _)| self.nb_virtuels().min(debut + besoin))
    }

    fn texte_decimal(&self, s: usize) -> Option<String> {
        let (debut, besoin, point) = self.geometrie_decimale(s)?;
        let fin = self.nb_virtuels().min(debut + besoin);
        let bloc = &self.virtuels[debut..fin];
        if bloc.is_empty() {
            return None;
        }
        let coeur = if point >= self.budget_coeur() as i64 {
            bloc.to_string()
        } else {
            let i = (point.max(0) as usize).min(bloc.len());
            format!("{}.{}", &bloc[..i], &bloc[i..])
        };
        Some(format!("{}{ELLIPSE}{coeur}", self.signe()))
    }

    fn sous_rempli_permis(&self, s: usize) -> bool {
        s > 0 && self.queue_possible()
    }

    fn est_terminal_sci(&self, s: usize) -> bool {
        if self.queue_possible() {
            self.doit_queue(s)
        } else {
            !self.construire_sci(s + 1, false).1
        }
    }

    fn est_depart_point(&self, s: usize) -> bool {
        self.position_point(s) == Some(0)
    }

    /* ---- rendu ---- */

    /// Texte qu'afficherait le décalage `s` (texte initial complet à 0).
    pub fn apercu(&self, s: usize) -> String {
        if s == 0 {
            return self.initial.clone();
        }
        if let Some(t) = self.texte_decimal(s) {
            return t;
        }
        self.construire_sci(s, self.est_terminal_sci(s)).0
    }

    /// Vue au décalage `s` ; `forcer_sci` écarte la fenêtre décimale.
    pub fn rendre(&self, s: usize, forcer_sci: bool) -> Vue {
        let mut s = s;
        if !(self.sous_rempli_permis(s) || self.doit_decimal(s)) {
            while s > 0 && !self.construire_sci(s, false).1 {
                s -= 1;
            }
        }

        if s == 0 {
            return Vue {
                texte: self.initiale_visible(),
                decalage: 0,
                disposition: Disposition::Initiale,
            };
        }
        if !forcer_sci {
            if let Some(texte) = self.texte_decimal(s) {
                return Vue {
                    texte,
                    decalage: s,
                    disposition: Disposition::DecimalFenetre,
                };
            }
        }
        let (texte, _) = self.construire_sci(s, self.est_terminal_sci(s));
        let disposition = if texte.contains('e') {
            Disposition::Scientifique
        } else {
            Disposition::QueueEntiere
        };
        Vue {
            texte,
            decalage: s,
            disposition,
        }
    }

    /// Vue suivante distincte, ou None à l'état terminal.
    pub fn suivante(&self, courante: &Vue) -> Option<Vue> {
        let s = courante.decalage;
        if s == 0 && self.initiale_tient() {
            return None;
        }

        // point en bord gauche : passage au scientifique au même décalage
        if self.est_depart_point(s) {
            let sci = self.rendre(s, true);
            if sci.texte != courante.texte {
                return Some(sci);
            }
        }

        let corps = self.budget_coeur() as i64;
        let bord = self.bord_droit(s);
        let point = self.position_point(s);
        let max = self.nb_virtuels().saturating_sub(1);

        for c in s + 1..=max {
            let plein = self.construire_sci(c, false).1;
            let decimal = self.doit_decimal(c);
            if !(plein || decimal || self.doit_queue(c) || self.sous_rempli_permis(c)) {
                continue;
            }
            if decimal {
                if let (Some(b0), Some(p0), Some(b1), Some(p1)) =
                    (bord, point, self.bord_droit(c), self.position_point(c))
                {
                    // le bord droit n'avance plus : fin de la fenêtre décimale
                    if p0 < corps && p1 < corps && b1 <= b0 {
                        return None;
                    }
                }
            }
            if self.apercu(c) != courante.texte {
                return Some(self.rendre(c, false));
            }
        }
        None
    }

    /// Toutes les vues atteignables, de la vue initiale à l'état terminal.
    pub fn vues(&self) -> Vec<Vue> {
        let mut vues = vec![self.rendre(0, false)];
        while let Some(v) = vues.last().and_then(|d| self.suivante(d)) {
            vues.push(v);
        }
        vues
    }

    /// Chiffres significatifs pas encore révélés au décalage `s`.
    fn marge_restante(&self, s: usize, fraction: usize) -> i64 {
        self.forme.chiffres.len() as i64 - 1 - (s + fraction) as i64
    }
}

/* ------------------------ état de la vue ------------------------ */

fn vues_texte(texte: &str, largeur: usize) -> Vec<Vue> {
    let car: Vec<char> = texte.chars().collect();
    let dernier = car.len().saturating_sub(largeur);
    (0..=dernier)
        .map(|o| Vue {
            texte: car[o..car.len().min(o + largeur)].iter().collect(),
            decalage: o,
            disposition: Disposition::Texte,
        })
        .collect()
}

/// État d'affichage d'un résultat : vues, position, drapeaux de préchargement.
#[derive(Clone, Debug)]
pub struct EtatVue {
    affichage: Affichage,
    source: String,
    fenetre: Option<Fenetre>,
    vues: Vec<Vue>,
    index: usize,
    epuise: bool,
    chargement: bool,
}

impl EtatVue {
    pub fn nouveau(affichage: Affichage) -> Self {
        EtatVue {
            affichage,
            source: String::new(),
            fenetre: None,
            vues: vues_texte("", affichage.largeur()),
            index: 0,
            epuise: false,
            chargement: false,
        }
    }

    pub fn affichage(&self) -> &Affichage {
        &self.affichage
    }

    fn reconstruire(&mut self, texte: &str) {
        self.source = texte.to_string();
        self.fenetre = Fenetre::nouvelle(texte, &self.affichage);
        self.vues = match &self.fenetre {
            Some(f) => f.vues(),
            None => vues_texte(texte, self.affichage.largeur()),
        };
    }

    /// Nouveau résultat : retour au début, drapeaux d'épuisement et de chargement levés.
    pub fn nouveau_resultat(&mut self, texte: &str) {
        self.epuise = false;
        self.chargement = false;
        self.reconstruire(texte);
        self.index = 0;
    }

    /// Même résultat à plus haute précision, en gardant la position.
    /// Renvoie true si le texte affiché a changé.
    pub fn affiner(&mut self, texte: &str) -> bool {
        let avant = self.vue_courante().clone();
        self.reconstruire(texte);

        self.index = self
            .vues
            .iter()
            .position(|v| v.decalage == avant.decalage && v.disposition == avant.disposition)
            .or_else(|| self.vues.iter().rposition(|v| v.decalage <= avant.decalage))
            .unwrap_or(0);
        self.vue_courante().texte != avant.texte
    }

    pub fn avancer(&mut self) -> bool {
        if self.index + 1 < self.vues.len() {
            self.index += 1;
            true
        } else {
            false
        }
    }

    pub fn reculer(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            true
        } else {
            false
        }
    }

    pub fn vue_courante(&self) -> &Vue {
        &self.vues[self.index.min(self.vues.len() - 1)]
    }

    pub fn texte_courant(&self) -> &str {
        &self.vue_courante().texte
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn nb_vues(&self) -> usize {
        self.vues.len()
    }

    pub fn est_terminal(&self) -> bool {
        self.index + 1 >= self.vues.len()
    }

    pub fn est_numerique(&self) -> bool {
        self.fenetre.is_some()
    }

    pub fn forme(&self) -> Option<&FormeCanonique> {
        self.fenetre.as_ref().map(Fenetre::forme)
    }

    pub fn marquer_epuise(&mut self) {
        self.epuise = true;
    }

    pub fn est_epuise(&self) -> bool {
        self.epuise
    }

    pub fn debut_chargement(&mut self) {
        self.chargement = true;
    }

    pub fn fin_chargement(&mut self) {
        self.chargement = false;
    }

    pub fn en_chargement(&self) -> bool {
        self.chargement
    }

    /// À appeler après un pas en avant : faut-il demander plus de précision ?
    pub fn doit_precharger(&self) -> bool {
        if self.epuise || self.chargement || self.source.is_empty() {
            return false;
        }
        let marge = self.affichage.marge_prechargement as i64;
        let vue = self.vue_courante();
        match &self.fenetre {
            Some(f) => {
                if vue.decalage == 0 && f.initiale_tient() {
                    return false;
                }
                f.marge_restante(vue.decalage, self.affichage.fenetre_fraction) <= marge
            }
            None => {
                let reste = self.source.chars().count() as i64
                    - (vue.decalage + self.affichage.largeur()) as i64;
                reste <= marge
            }
        }
    }

    pub fn copie(&self, mode: Copie) -> String {
        match (&self.fenetre, mode) {
            (Some(f), Copie::DecimalExacte) => f.forme().copie_decimale_exacte(),
            (Some(_), Copie::Verbatim) => self.texte_courant().replace(ELLIPSE, ""),
            (None, _) => self.source.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn etat(texte: &str) -> EtatVue {
        let mut e = EtatVue::nouveau(Affichage::default());
        e.nouveau_resultat(texte);
        e
    }

    fn parcours(texte: &str) -> Vec<String> {
        let mut e = etat(texte);
        let mut textes = vec![e.texte_courant().to_string()];
        while e.avancer() {
            textes.push(e.texte_courant().to_string());
        }
        textes
    }

    fn cinq_septiemes() -> String {
        format!("0.{}", "714285".repeat(20))
    }

    #[test]
    fn cinq_septiemes_passe_par_le_point() {
        let t = parcours(&cinq_septiemes());
        assert_eq!(t[0], "0.714285714285714");
        assert_eq!(t[1], "….7142857142857142");
        assert_eq!(t[2], "7142857142857e-13");
        assert_eq!(t[3], "…1428571428571e-14");
    }

    #[test]
    fn tiers_largeur_17() {
        let t = parcours("0.3333333333333333");
        assert_eq!(t[0].chars().count(), 17);
        assert_eq!(t[1], "….3333333333333333");
        assert_eq!(t[1].replace('…', "").chars().count(), 17);
    }

    #[test]
    fn quarante_factorielle() {
        let t = parcours("8.15915283247897734345611269596115894272e+47");
        assert_eq!(t[0], "8.15915283247e+47");
        assert_eq!(t.last().map(String::as_str), Some("…69596115894272e+9"));
    }

    #[test]
    fn fenetre_decimale_bornee_a_droite() {
        let t = parcours("8.8817841970012523233890533447265625e+24");
        assert_eq!(t.last().map(String::as_str), Some("…389053.3447265625"));
        assert!(!t.iter().any(|s| s == "….3447265625"));
    }

    #[test]
    fn queue_entiere() {
        let t = parcours("123456789012345678");
        assert_eq!(t, ["12345678901234567", "…23456789012345678"]);
    }

    #[test]
    fn sans_defilement() {
        for texte in ["3.0e-30", "42", "0", "-0.125", "1.0e+20"] {
            let mut e = etat(texte);
            let avant = e.texte_courant().to_string();
            assert!(!e.avancer(), "{texte}");
            assert_eq!(e.texte_courant(), avant);
        }
        assert_eq!(etat("3.0e-30").texte_courant(), "3e-30");
        assert_eq!(etat("1.0e+20").texte_courant(), "1e+20");
    }

    #[test]
    fn negatifs() {
        let t = parcours(&format!("-{}", cinq_septiemes()));
        assert_eq!(t[0], "-0.71428571428571");
        assert_eq!(t[1], "-….714285714285714");
        for s in &t {
            assert!(s.starts_with('-'));
            assert!(s.chars().count() <= LARGEUR_DEFAUT);
        }
    }

    #[test]
    fn mode_texte() {
        let mut e = etat("Error: division par zéro");
        assert!(!e.est_numerique());
        assert_eq!(e.texte_courant(), "Error: division pa");
        assert!(e.avancer());
        assert_eq!(e.texte_courant(), "rror: division par");
        while e.avancer() {}
        assert_eq!(e.texte_courant(), " division par zéro");
        assert_eq!(e.nb_vues(), 7);
        assert_eq!(e.copie(Copie::Verbatim), "Error: division par zéro");
        assert_eq!(e.copie(Copie::DecimalExacte), "Error: division par zéro");
    }

    #[test]
    fn symetrie() {
        let mut e = etat(&cinq_septiemes());
        let depart = e.texte_courant().to_string();
        let mut n = 0;
        while n < 10 && e.avancer() {
            n += 1;
        }
        for _ in 0..n {
            assert!(e.reculer());
        }
        assert_eq!(e.texte_courant(), depart);
        assert!(!e.reculer());
    }

    #[test]
    fn copies() {
        let mut e = etat("3.0e-30");
        assert_eq!(e.copie(Copie::Verbatim), "3e-30");
        assert_eq!(e.copie(Copie::DecimalExacte), format!("0.{}3", "0".repeat(29)));

        e.nouveau_resultat(&cinq_septiemes());
        e.avancer();
        e.avancer();
        e.avancer();
        assert_eq!(e.copie(Copie::Verbatim), "1428571428571e-14");
        assert_eq!(e.copie(Copie::DecimalExacte), cinq_septiemes());
    }

    #[test]
    fn prechargement() {
        let mut e = etat(&format!("0.{}", "3".repeat(40)));
        // vue initiale : ne tient pas, mais pas encore de pas en avant
        assert!(e.avancer());
        assert!(e.doit_precharger());

        e.debut_chargement();
        assert!(!e.doit_precharger());
        e.fin_chargement();
        e.marquer_epuise();
        assert!(!e.doit_precharger());

        // nouveau résultat : épuisement oublié
        e.nouveau_resultat(&format!("0.{}", "3".repeat(120)));
        assert!(!e.est_epuise());
        assert!(e.avancer());
        assert!(!e.doit_precharger());

        let court = etat("0.125");
        assert!(!court.doit_precharger());
    }

    #[test]
    fn nouveau_resultat_oublie_le_chargement() {
        let mut e = etat(&format!("0.{}", "3".repeat(40)));
        e.avancer();
        e.debut_chargement();
        e.nouveau_resultat(&format!("0.{}", "6".repeat(40)));
        assert!(!e.en_chargement());
        assert!(e.avancer());
        assert!(e.doit_precharger());
    }

    #[test]
    fn affiner_garde_la_position() {
        let mut e = etat(&format!("0.{}", "3".repeat(40)));
        for _ in 0..5 {
            e.avancer();
        }
        let avant = e.vue_courante().clone();
        let change = e.affiner(&format!("0.{}", "3".repeat(160)));
        assert!(!change);
        assert_eq!(e.vue_courante(), &avant);
        assert!(e.nb_vues() > 100);
    }

    #[test]
    fn exposant_trop_large() {
        let e = etat("1.5e-1125899906842624");
        assert!(!e.est_numerique());
        assert!(e.texte_courant().chars().count() <= LARGEUR_DEFAUT);
    }
}
