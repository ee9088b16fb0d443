//! Decode command implementation.

use anyhow::{Context, Result as AnyhowResult};
use bytepair_tokenizer::Tokenizer;
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;

/// Decode command arguments.
#[derive(Parser)]
pub struct DecodeCommand {
    /// Directory of the trained tokenizer
    #[arg(short, long)]
    pub tokenizer: PathBuf,

    /// Whitespace separated token IDs, or "-" to read stdin
    #[arg(short, long)]
    pub input: String,
}

pub fn run(cmd: DecodeCommand) -> AnyhowResult<()> {
    let tokenizer = Tokenizer::load(&cmd.tokenizer)
        .with_context(|| format!("loading tokenizer from {}", cmd.tokenizer.display()))?;

    let input = if cmd.input == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        cmd.input
    };

    let ids = parse_ids(&input)?;
    let text = tokenizer.decode(&ids)?;
    print!("{}", text);

    Ok(())
}

fn parse_ids(input: &str) -> AnyhowResult<Vec<u32>> {
    input
        .split_whitespace()
        .map(|s| {
            s.parse::<u32>()
                .with_context(|| format!("invalid token id {s:?}"))
        })
        .collect()
}
