//! Command-line parsing for the indicators pipeline.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the fetch/derivation code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "tripwires", version, about = "Economic indicator tripwires (FRED + external tabular sources)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch every configured indicator and write the indicators document.
    Run(RunArgs),
    /// Print the status table of a previously written document.
    Show(ShowArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// Path to the indicators configuration file.
    #[arg(short, long, default_value = "indicators.toml")]
    pub config: PathBuf,

    /// Where to write the indicators JSON document.
    #[arg(short, long, default_value = "public-data/indicators.json")]
    pub out: PathBuf,

    /// Override the configured years of history to request.
    #[arg(long)]
    pub years: Option<u32>,
}

#[derive(Debug, Parser, Clone)]
pub struct ShowArgs {
    /// Path to a previously written indicators document.
    #[arg(short, long, default_value = "public-data/indicators.json")]
    pub doc: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_with_overrides() {
        let cli = Cli::try_parse_from([
            "tripwires",
            "run",
            "--config",
            "cfg.toml",
            "--out",
            "out.json",
            "--years",
            "3",
        ])
        .unwrap();
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.config, PathBuf::from("cfg.toml"));
        assert_eq!(args.out, PathBuf::from("out.json"));
        assert_eq!(args.years, Some(3));
    }

    #[test]
    fn show_defaults_to_standard_document_path() {
        let cli = Cli::try_parse_from(["tripwires", "show"]).unwrap();
        let Command::Show(args) = cli.command else {
            panic!("expected show");
        };
        assert_eq!(args.doc, PathBuf::from("public-data/indicators.json"));
    }
}
