//! tikbake CLI - Exports BPE vocabularies as static C headers.
//!
//! Two independent batch steps: `extract` writes the canonical store from a
//! vocabulary source, `header` renders that store as a C header.

mod commands;

use clap::{Parser, Subcommand};
use commands::{ExtractCommand, HeaderCommand};
use std::io::IsTerminal;
use std::process::ExitCode;
use tracing::error;

#[derive(Parser)]
#[command(name = "tikbake")]
#[command(about = "Bake BPE tokenizer vocabularies into static C headers", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract special tokens, vocabulary and merges into the canonical store
    Extract(ExtractCommand),
    /// Generate a C header from the canonical store
    Header(HeaderCommand),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Progress and diagnostics go to stdout, one line per event.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stdout)
        .with_ansi(std::io::stdout().is_terminal())
        .with_target(false)
        .without_time()
        .init();

    let result = match cli.command {
        Commands::Extract(cmd) => commands::extract::run(cmd),
        Commands::Header(cmd) => commands::header::run(cmd),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
