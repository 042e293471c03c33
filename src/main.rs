// src/main.rs
//
// Calculatrice défilante — point d'entrée terminal
// ------------------------------------------------
// But:
// - évaluer une expression (argument) ou une expression par ligne (stdin)
// - afficher chaque vue dans une ligne de largeur fixe, comme un écran de calculatrice
// - rejouer N pas de défilement avant, en laissant l'expansion de précision se faire
// - imprimer la copie demandée (verbatim ou décimale exacte) et, sur demande, la démarche
//
// Les journaux vont sur stderr (RUST_LOG), les résultats sur stdout.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::warn;

use calculatrice_defilante::app::{Copie, Defilement, Session, Viewport};
use calculatrice_defilante::config::{Config, MoteurChoisi};
use calculatrice_defilante::journal;
use calculatrice_defilante::noyau::{Machine, Moteur, Numerique, Precision};

/// Attente maximale d'une expansion entre deux pas.
const ATTENTE_EXPANSION: Duration = Duration::from_secs(30);

#[derive(Parser, Debug)]
#[command(name = "calculatrice", version, about = "Calculatrice à précision progressive et affichage défilant")]
struct Args {
    /// Expression à évaluer (sinon : une par ligne sur stdin)
    expression: Option<String>,

    /// Fichier de configuration TOML
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Largeur de l'écran, ellipse comprise
    #[arg(short, long)]
    largeur: Option<usize>,

    /// Chiffres de la première évaluation
    #[arg(long)]
    chiffres: Option<usize>,

    /// Chiffres ajoutés à chaque expansion
    #[arg(long)]
    pas: Option<usize>,

    /// Pas de défilement vers la droite après l'évaluation
    #[arg(short = 'n', long, default_value_t = 0)]
    defilements: usize,

    /// Copie imprimée après le défilement
    #[arg(long, value_enum)]
    copie: Option<ModeCopie>,

    #[arg(long, value_enum)]
    moteur: Option<MoteurChoisi>,

    /// Mode d'angle : rad ou deg
    #[arg(short, long)]
    mode: Option<String>,

    /// Imprime jetons, RPN et arbre
    #[arg(long)]
    demarche: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeCopie {
    Verbatim,
    Exacte,
}

impl From<ModeCopie> for Copie {
    fn from(m: ModeCopie) -> Self {
        match m {
            ModeCopie::Verbatim => Copie::Verbatim,
            ModeCopie::Exacte => Copie::DecimalExacte,
        }
    }
}

impl Args {
    /// Les options explicites priment sur le fichier.
    fn surcharger(&self, config: &mut Config) {
        if let Some(l) = self.largeur {
            config.affichage.largeur = l;
        }
        if let Some(c) = self.chiffres {
            config.chiffres_initiaux = c;
        }
        if let Some(p) = self.pas {
            config.pas_precision = p;
        }
        if let Some(m) = self.moteur {
            config.moteur = m;
        }
        if let Some(m) = &self.mode {
            config.mode_angle = m.clone();
        }
    }
}

/* ------------------------ Viewport terminal ------------------------ */

/// Une ligne de stdout par affichage.
struct ViewportTerminal {
    capacite: usize,
}

impl Viewport for ViewportTerminal {
    fn capacite(&self) -> usize {
        self.capacite
    }

    fn afficher(&mut self, texte: &str, _conserver_vue: bool) {
        let mut sortie = io::stdout().lock();
        if let Err(e) = writeln!(sortie, "{texte}") {
            warn!(erreur = %e, "écriture sur stdout impossible");
        }
    }
}

/* ------------------------ Exécution ------------------------ */

fn lire_expressions(expression: Option<&str>) -> Result<Vec<String>> {
    if let Some(e) = expression {
        return Ok(vec![e.to_string()]);
    }
    let mut lignes = Vec::new();
    for ligne in io::stdin().lock().lines() {
        let ligne = ligne.context("lecture de stdin")?;
        let ligne = ligne.trim();
        if !ligne.is_empty() {
            lignes.push(ligne.to_string());
        }
    }
    Ok(lignes)
}

fn executer<N: Numerique>(args: &Args, config: &Config, expressions: &[String]) -> Result<()> {
    let affichage = config.affichage();
    let moteur = Moteur::<N>::nouveau(config.reglages(), config.mode()?);
    let viewport = ViewportTerminal {
        capacite: affichage.largeur(),
    };
    let mut session = Session::nouvelle(moteur, affichage, viewport);

    for (i, expression) in expressions.iter().enumerate() {
        if i > 0 {
            println!();
        }
        session.evaluate(expression);

        for _ in 0..args.defilements {
            session.defiler(Defilement::Avant);
            if !session.attendre_expansion(ATTENTE_EXPANSION) {
                warn!(expression = expression.as_str(), "expansion trop lente, défilement poursuivi");
            }
        }

        if let Some(mode) = args.copie {
            println!("{}", session.copier(mode.into()));
        }

        let etat = session.etat();
        if args.demarche && !etat.a_erreur() {
            println!("jetons  : {}", etat.demarche.jetons);
            println!("rpn     : {}", etat.demarche.rpn);
            println!("arbre   : {}", etat.demarche.arbre);
            println!("chiffres: {}", etat.demarche.chiffres);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    journal::initialiser();

    let args = Args::parse();
    let mut config = Config::load(args.config.clone())?;
    args.surcharger(&mut config);

    let expressions = lire_expressions(args.expression.as_deref())?;
    match config.moteur {
        MoteurChoisi::Arbitraire => executer::<Precision>(&args, &config, &expressions),
        MoteurChoisi::Machine => executer::<Machine>(&args, &config, &expressions),
    }
}
