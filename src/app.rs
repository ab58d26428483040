//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the indicator configuration
//! - runs the per-indicator pipeline
//! - writes the indicators document / prints the status table

use clap::Parser;

use crate::cli::{Cli, Command, RunArgs, ShowArgs};
use crate::error::PipelineError;

pub mod pipeline;

/// Entry point for the `tripwires` binary.
pub fn run() -> Result<(), PipelineError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Show(args) => handle_show(args),
    }
}

fn handle_run(args: RunArgs) -> Result<(), PipelineError> {
    let mut cfg = crate::config::load(&args.config)?;
    if let Some(years) = args.years {
        cfg.start_years_back = years;
    }

    let doc = pipeline::run(&cfg);
    crate::io::write_document(&args.out, &doc)?;

    println!("Wrote {}", args.out.display());
    println!("{}", crate::report::format_document_summary(&doc));
    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), PipelineError> {
    let doc = crate::io::read_document(&args.doc)?;
    println!("{}", crate::report::format_document_summary(&doc));
    Ok(())
}
