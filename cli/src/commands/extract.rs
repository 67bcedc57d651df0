//! Extract command implementation.

use clap::Parser;
use std::path::PathBuf;

/// Extract command arguments.
#[derive(Parser)]
pub struct ExtractCommand {
    /// Encoding to extract
    #[arg(short, long, default_value = "cl100k_base")]
    pub encoding: String,

    /// Directory holding `<encoding>.tiktoken` rank files
    #[arg(short, long, default_value = "assets")]
    pub source_dir: PathBuf,

    /// Read a HuggingFace directory (vocab.json, merges.txt) instead of a rank file
    #[arg(long, conflicts_with = "source_dir")]
    pub huggingface: Option<PathBuf>,

    /// Special token string to pick out of a HuggingFace vocab.json
    /// (repeatable, defaults to <|endoftext|>)
    #[arg(long = "special-token")]
    pub special_tokens: Vec<String>,

    /// Directory receiving the canonical store and sample encodings
    #[arg(short, long, default_value = "src/tiktoken_data")]
    pub output_dir: PathBuf,
}

use anyhow::Result as AnyhowResult;
use tikbake_extract::source::encodings::ENDOFTEXT;
use tikbake_extract::{run_extraction, ExtractConfig};
use tracing::info;

pub fn run(cmd: ExtractCommand) -> AnyhowResult<()> {
    let mut builder = ExtractConfig::builder()
        .encoding(cmd.encoding)
        .output_dir(cmd.output_dir);
    builder = match cmd.huggingface {
        Some(dir) => {
            let special_tokens = if cmd.special_tokens.is_empty() {
                vec![ENDOFTEXT.to_string()]
            } else {
                cmd.special_tokens
            };
            builder.huggingface_dir(dir, special_tokens)
        }
        None => builder.tiktoken_dir(cmd.source_dir),
    };
    let config = builder.build()?;

    let outcome = run_extraction(&config)?;

    info!("Saved data to {}", outcome.store_path.display());
    if !outcome.report.is_clean() {
        info!("Extraction finished with warnings");
    }
    info!("Extraction completed successfully");
    Ok(())
}
