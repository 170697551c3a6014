//! Command-line definitions and handlers

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::{path::PathBuf, process::ExitCode};

use crate::{bayes::LanguageClassifier, check, letters};

/// Parse and validate a prior probability in (0, 1]
fn parse_prior(s: &str) -> Result<f64, String> {
    let p: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if !p.is_finite() || p <= 0.0 || p > 1.0 {
        Err(format!("prior must be in (0, 1], got {}", s))
    } else {
        Ok(p)
    }
}

/// Naive Bayes English-vs-Spanish letter-frequency classifier
#[derive(Parser, Debug)]
#[command(name = "lang_bayes", version)]
pub struct Cli {
    /// Log level used when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the Q1/Q2/Q3 answers for a document
    Classify {
        /// Text document to classify
        document: PathBuf,

        /// Prior probability of English
        #[arg(value_parser = parse_prior)]
        prior_english: f64,

        /// Prior probability of Spanish
        #[arg(value_parser = parse_prior)]
        prior_spanish: f64,

        /// English character-probability table
        #[arg(long, env = "LANG_BAYES_ENGLISH", default_value = "e.txt")]
        english: PathBuf,

        /// Spanish character-probability table
        #[arg(long, env = "LANG_BAYES_SPANISH", default_value = "s.txt")]
        spanish: PathBuf,
    },

    /// Print the A-Z letter counts of a document
    Counts {
        /// Text document to shred
        document: PathBuf,
    },

    /// Strictly compare a classifier output against an answer key
    Check {
        /// Output to grade
        student: PathBuf,

        /// Answer key
        key: PathBuf,
    },
}

pub fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Classify {
            document,
            prior_english,
            prior_spanish,
            english,
            spanish,
        } => {
            let classifier =
                LanguageClassifier::from_paths(english, spanish, prior_english, prior_spanish)?;
            let counts = letters::read_counts(&document)?;
            print!("{}", classifier.predict(&counts));
        }
        Commands::Counts { document } => {
            let counts = letters::read_counts(&document)?;
            for (index, count) in counts.iter().enumerate() {
                println!("{} {}", letters::letter_from_index(index), count);
            }
        }
        Commands::Check { student, key } => {
            println!(
                "Strict Checking: '{}' vs '{}'",
                student.display(),
                key.display()
            );
            println!("{}", "-".repeat(60));

            let report = check::check_files(&student, &key)?;
            println!("{}", report);
            if !report.passed() {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
