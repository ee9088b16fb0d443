//! Main tokenizer implementation.
//!
//! This module provides the high-level `Tokenizer` struct that ties a trained
//! vocabulary and merge list to an encoder, plus the builder used to train
//! one.

use crate::io::{TokenizerLoader, TokenizerSaver};
use bytepair_core::{
    ByteLevelEncoder, EncodeIter, MergeRules, MergeStats, Result, Symbol, Utf8Policy, Vocabulary,
};
use bytepair_training::{BpeTrainer, LearnStrategy, TrainingConfig};
use rayon::prelude::*;
use std::path::Path;
use std::sync::Arc;

/// Builder for training a tokenizer.
#[derive(Debug, Clone, Default)]
pub struct TokenizerBuilder {
    config: TrainingConfig,
}

impl TokenizerBuilder {
    /// Create a new tokenizer builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target vocabulary size.
    pub fn vocab_size(mut self, size: usize) -> Self {
        self.config.vocab_size = size;
        self
    }

    /// Set the document delimiter.
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.config.delimiter = delimiter.into();
        self
    }

    /// Set the number of pretokenization shards.
    pub fn num_shards(mut self, num_shards: usize) -> Self {
        self.config.num_shards = num_shards;
        self
    }

    /// Set the boundary probe window in bytes.
    pub fn probe_window(mut self, probe_window: usize) -> Self {
        self.config.probe_window = probe_window;
        self
    }

    /// Set the UTF-8 policy used for both training and decoding.
    pub fn utf8_policy(mut self, policy: Utf8Policy) -> Self {
        self.config.utf8_policy = policy;
        self
    }

    /// Set the merge selection strategy.
    pub fn strategy(mut self, strategy: LearnStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// Train on a corpus file.
    pub fn train_from_file(self, path: &Path) -> Result<Tokenizer> {
        Tokenizer::train_from_file(path, self.config)
    }

    /// Train on in-memory text.
    pub fn train_from_text(self, text: &str) -> Result<Tokenizer> {
        Tokenizer::train_from_text(text, self.config)
    }
}

/// Vocabulary and merge statistics.
#[derive(Debug, Clone, Default)]
pub struct TokenizerStats {
    /// Number of ids
    pub vocab_size: usize,
    /// Length in bytes of the longest symbol
    pub longest_token: usize,
    pub merges: MergeStats,
}

/// Main tokenizer struct.
///
/// Immutable once built; encoding and decoding only read shared state, so a
/// tokenizer can be used from many threads at once.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    vocab: Arc<Vocabulary>,
    merges: Arc<MergeRules>,
    encoder: ByteLevelEncoder,
    utf8_policy: Utf8Policy,
    delimiter: String,
}

impl Tokenizer {
    /// Create a tokenizer builder.
    pub fn builder() -> TokenizerBuilder {
        TokenizerBuilder::new()
    }

    /// Assemble a tokenizer from a trained vocabulary and merge list.
    pub fn from_parts(
        vocab: Vocabulary,
        merges: MergeRules,
        utf8_policy: Utf8Policy,
        delimiter: impl Into<String>,
    ) -> Result<Self> {
        let vocab = Arc::new(vocab);
        let merges = Arc::new(merges);
        let encoder = ByteLevelEncoder::new(vocab.clone(), merges.clone(), utf8_policy)?;

        Ok(Self {
            vocab,
            merges,
            encoder,
            utf8_policy,
            delimiter: delimiter.into(),
        })
    }

    /// Train a tokenizer on a corpus file.
    pub fn train_from_file(path: &Path, config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        let (merges, vocab) = BpeTrainer::new(config.clone()).train_file(path)?;
        Self::from_parts(vocab, merges, config.utf8_policy, config.delimiter)
    }

    /// Train a tokenizer on in-memory text.
    pub fn train_from_text(text: &str, config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        let (merges, vocab) = BpeTrainer::new(config.clone()).train_text(text)?;
        Self::from_parts(vocab, merges, config.utf8_policy, config.delimiter)
    }

    /// Encode text to token IDs.
    pub fn encode(&self, text: &str) -> Result<Vec<u32>> {
        self.encoder.encode(text)
    }

    /// Lazily encode texts one after another.
    ///
    /// Yields exactly what concatenating `encode` over the inputs would.
    pub fn encode_iterable<I>(&self, texts: I) -> EncodeIter<'_, I::IntoIter>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.encoder.encode_iterable(texts)
    }

    /// Encode a batch of texts (parallelized).
    ///
    /// Output order follows input order.
    pub fn encode_batch<S>(&self, texts: &[S]) -> Result<Vec<Vec<u32>>>
    where
        S: AsRef<str> + Sync,
    {
        texts
            .par_iter()
            .map(|text| self.encode(text.as_ref()))
            .collect::<Result<Vec<_>>>()
    }

    /// Decode token IDs back to text.
    pub fn decode(&self, ids: &[u32]) -> Result<String> {
        self.encoder.decode(ids)
    }

    /// Concatenated bytes of the given ids, without UTF-8 decoding.
    pub fn decode_bytes(&self, ids: &[u32]) -> Result<Vec<u8>> {
        self.encoder.decoder().decode_bytes(ids)
    }

    /// Id of a symbol's bytes.
    pub fn token_to_id(&self, bytes: &[u8]) -> Option<u32> {
        self.vocab.get_id(bytes)
    }

    /// Symbol for an id.
    pub fn id_to_token(&self, id: u32) -> Option<&Symbol> {
        self.vocab.get_symbol(id)
    }

    /// Get the vocabulary size.
    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    /// Get a reference to the vocabulary.
    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn merges(&self) -> &MergeRules {
        &self.merges
    }

    pub fn utf8_policy(&self) -> Utf8Policy {
        self.utf8_policy
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    pub fn stats(&self) -> TokenizerStats {
        TokenizerStats {
            vocab_size: self.vocab.len(),
            longest_token: self.vocab.symbols().iter().map(Symbol::len).max().unwrap_or(0),
            merges: self.merges.stats(),
        }
    }

    /// Save the tokenizer to a directory.
    pub fn save(&self, path: &Path) -> Result<()> {
        TokenizerSaver::new(&self.vocab, &self.merges, self.utf8_policy, &self.delimiter)
            .save(path)
    }

    /// Load a tokenizer from a directory.
    pub fn load(path: &Path) -> Result<Self> {
        let data = TokenizerLoader::load(path)?;
        Self::from_parts(data.vocab, data.merges, data.utf8_policy, data.delimiter)
    }
}
