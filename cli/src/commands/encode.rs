//! Encode command implementation.

use anyhow::{Context, Result as AnyhowResult};
use bytepair_tokenizer::Tokenizer;
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;
use std::time::Instant;

/// Encode command arguments.
#[derive(Parser)]
pub struct EncodeCommand {
    /// Directory of the trained tokenizer
    #[arg(short, long)]
    pub tokenizer: PathBuf,

    /// Text to encode, or "-" to read stdin
    #[arg(short, long)]
    pub input: String,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(cmd: EncodeCommand) -> AnyhowResult<()> {
    let tokenizer = Tokenizer::load(&cmd.tokenizer)
        .with_context(|| format!("loading tokenizer from {}", cmd.tokenizer.display()))?;

    // Read input text (from stdin if "-")
    let input_text = if cmd.input == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        cmd.input
    };

    let start = Instant::now();
    let ids = tokenizer.encode(&input_text)?;
    log::info!(
        "Encoded {} bytes into {} tokens in {:.2?}",
        input_text.len(),
        ids.len(),
        start.elapsed()
    );

    let output = ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(" ");

    match &cmd.output {
        Some(path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("writing {}", path.display()))?;
            log::info!("Wrote {} tokens to {}", ids.len(), path.display());
        }
        None => {
            println!("{}", output);
        }
    }

    Ok(())
}
