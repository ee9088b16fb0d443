//! Train command implementation.

use anyhow::{Context, Result as AnyhowResult};
use bytepair_tokenizer::{Tokenizer, Utf8Policy};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;

/// Train command arguments.
#[derive(Parser)]
pub struct TrainCommand {
    /// Corpus file to train on
    #[arg(short, long)]
    pub input: PathBuf,

    /// Directory to write tokenizer.json into
    #[arg(short, long)]
    pub output: PathBuf,

    /// Target vocabulary size
    #[arg(long, default_value_t = 30_000)]
    pub vocab_size: usize,

    /// Number of pretokenization shards (defaults to the thread count)
    #[arg(long)]
    pub shards: Option<usize>,

    /// Document delimiter
    #[arg(long, default_value = "<|endoftext|>")]
    pub delimiter: String,

    /// Handling of invalid UTF-8: "replace" or "ignore"
    #[arg(long, default_value = "replace")]
    pub utf8: Utf8Policy,
}

pub fn run(cmd: TrainCommand) -> AnyhowResult<()> {
    let start = Instant::now();

    let mut builder = Tokenizer::builder()
        .vocab_size(cmd.vocab_size)
        .delimiter(cmd.delimiter)
        .utf8_policy(cmd.utf8);
    if let Some(shards) = cmd.shards {
        builder = builder.num_shards(shards);
    }

    let tokenizer = builder
        .train_from_file(&cmd.input)
        .with_context(|| format!("training on {}", cmd.input.display()))?;
    tokenizer.save(&cmd.output)?;

    let stats = tokenizer.stats();
    log::info!(
        "Trained {} tokens ({} merges, longest {} bytes) in {:.2?}",
        stats.vocab_size,
        stats.merges.count,
        stats.longest_token,
        start.elapsed()
    );

    Ok(())
}
