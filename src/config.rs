// src/config.rs
//
// Configuration (TOML) : précision, mode d'angle, backend, fenêtre.
// Fichier absent -> valeurs par défaut ; fichier illisible ou invalide -> erreur.
// Les options de ligne de commande priment ensuite (voir main.rs).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::noyau::fenetre::{FENETRE_FRACTION, LARGEUR_DEFAUT, MARGE_PRECHARGEMENT};
use crate::noyau::{Affichage, ModeAngle, Reglages};

const DOSSIER: &str = "calculatrice-defilante";
const FICHIER: &str = "config.toml";

/// Backend numérique.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MoteurChoisi {
    #[default]
    Arbitraire,
    Machine,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub chiffres_initiaux: usize,
    pub pas_precision: usize,
    pub mode_angle: String,
    pub moteur: MoteurChoisi,
    pub affichage: AffichageConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AffichageConfig {
    pub largeur: usize,
    pub marge_prechargement: usize,
    pub fenetre_fraction: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chiffres_initiaux: 120,
            pas_precision: 120,
            mode_angle: "rad".to_string(),
            moteur: MoteurChoisi::default(),
            affichage: AffichageConfig::default(),
        }
    }
}

impl Default for AffichageConfig {
    fn default() -> Self {
        Self {
            largeur: LARGEUR_DEFAUT,
            marge_prechargement: MARGE_PRECHARGEMENT,
            fenetre_fraction: FENETRE_FRACTION,
        }
    }
}

impl Config {
    /// <config_dir>/calculatrice-defilante/config.toml
    pub fn chemin_defaut() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(DOSSIER).join(FICHIER))
    }

    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let Some(path) = config_path.or_else(Self::chemin_defaut) else {
            return Ok(Config::default());
        };
        Self::lire(&path)
    }

    fn lire(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("lecture impossible : {}", path.display()))?;
        Self::depuis_texte(&content)
            .with_context(|| format!("configuration invalide : {}", path.display()))
    }

    pub fn depuis_texte(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("TOML invalide")?;
        config.mode()?;
        Ok(config)
    }

    pub fn mode(&self) -> Result<ModeAngle> {
        self.mode_angle
            .parse()
            .with_context(|| format!("mode_angle = {:?}", self.mode_angle))
    }

    pub fn reglages(&self) -> Reglages {
        Reglages::nouveau(self.chiffres_initiaux, self.pas_precision)
    }

    pub fn affichage(&self) -> Affichage {
        Affichage {
            largeur: self.affichage.largeur,
            marge_prechargement: self.affichage.marge_prechargement,
            fenetre_fraction: self.affichage.fenetre_fraction,
        }
    }
}
