//! Header command implementation.

use clap::Parser;
use std::path::{Path, PathBuf};

/// Header command arguments.
#[derive(Parser)]
pub struct HeaderCommand {
    /// Canonical store written by `tikbake extract`
    #[arg(short, long, default_value = "src/tiktoken_data/cl100k_base_data.json")]
    pub input: PathBuf,

    /// Header file to write
    #[arg(short, long, default_value = "src/tiktoken_data.h")]
    pub output: PathBuf,

    /// Prefix for generated type, array and macro names
    #[arg(short, long, default_value = "tiktoken")]
    pub prefix: String,
}

use anyhow::Result as AnyhowResult;
use tikbake_header::{HeaderConfig, HeaderGenerator};
use tracing::info;

pub fn run(cmd: HeaderCommand) -> AnyhowResult<()> {
    let config = HeaderConfig::builder()
        .symbol_prefix(cmd.prefix)
        .provenance(provenance(&cmd.input))
        .build()?;

    HeaderGenerator::new(config).generate(&cmd.input, &cmd.output)?;

    info!("Conversion completed successfully");
    Ok(())
}

/// Banner text naming the store the header was rendered from.
fn provenance(input: &Path) -> String {
    input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string())
}
