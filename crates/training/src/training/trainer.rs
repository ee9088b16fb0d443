//! BPE trainer implementation.
//!
//! The trainer repeatedly merges the most frequent adjacent symbol pair of
//! the pretoken frequency table until the vocabulary reaches its target size
//! or no pair is left. Equal counts go to the lexicographically greatest
//! `(left, right)` pair of byte strings, which makes the result independent
//! of hash or heap iteration order.

use super::chunk::DEFAULT_PROBE_WINDOW;
use super::counter::PairCounter;
use super::frequency::FrequencyTable;
use super::pretokenize::Pretokenizer;
use ahash::AHashSet;
use bytepair_core::{
    MergeRule, MergeRules, PairPriorityQueue, Result, Symbol, TokenizerError, Utf8Policy,
    Vocabulary,
};
use log::{debug, info, trace};
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Instant;

/// Default document delimiter.
pub const DEFAULT_DELIMITER: &str = "<|endoftext|>";

/// How the next merge is found.
///
/// Both strategies produce identical merges; `Naive` recounts every pair
/// after each merge and exists as a reference for the incremental one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LearnStrategy {
    /// Priority queue over exact, incrementally maintained pair counts
    #[default]
    Incremental,
    /// Full recount and rewrite after every merge
    Naive,
}

/// Configuration for BPE training.
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    /// Target vocabulary size
    pub vocab_size: usize,
    /// Document delimiter; never merged across
    pub delimiter: String,
    /// Number of pretokenization shards
    pub num_shards: usize,
    /// Bytes read per shard boundary probe
    pub probe_window: usize,
    /// Handling of undecodable corpus bytes
    pub utf8_policy: Utf8Policy,
    /// Merge selection strategy
    pub strategy: LearnStrategy,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            vocab_size: 30_000,
            delimiter: DEFAULT_DELIMITER.to_string(),
            num_shards: rayon::current_num_threads(),
            probe_window: DEFAULT_PROBE_WINDOW,
            utf8_policy: Utf8Policy::default(),
            strategy: LearnStrategy::default(),
        }
    }
}

impl TrainingConfig {
    pub fn builder() -> TrainingConfigBuilder {
        TrainingConfigBuilder::default()
    }

    /// Check that every field is usable.
    pub fn validate(&self) -> Result<()> {
        if self.vocab_size == 0 {
            return Err(TokenizerError::InvalidConfig(
                "vocab_size must be positive".to_string(),
            ));
        }
        if self.delimiter.is_empty() {
            return Err(TokenizerError::InvalidConfig(
                "delimiter must not be empty".to_string(),
            ));
        }
        if self.num_shards == 0 {
            return Err(TokenizerError::InvalidConfig(
                "num_shards must be positive".to_string(),
            ));
        }
        if self.probe_window == 0 {
            return Err(TokenizerError::InvalidConfig(
                "probe_window must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`TrainingConfig`].
#[derive(Debug, Clone, Default)]
pub struct TrainingConfigBuilder {
    config: TrainingConfig,
}

impl TrainingConfigBuilder {
    pub fn vocab_size(mut self, vocab_size: usize) -> Self {
        self.config.vocab_size = vocab_size;
        self
    }

    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.config.delimiter = delimiter.into();
        self
    }

    pub fn num_shards(mut self, num_shards: usize) -> Self {
        self.config.num_shards = num_shards;
        self
    }

    pub fn probe_window(mut self, probe_window: usize) -> Self {
        self.config.probe_window = probe_window;
        self
    }

    pub fn utf8_policy(mut self, policy: Utf8Policy) -> Self {
        self.config.utf8_policy = policy;
        self
    }

    pub fn strategy(mut self, strategy: LearnStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> Result<TrainingConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// BPE trainer.
///
/// Learns an ordered list of merge rules and a dense vocabulary from a
/// corpus file, a string, or a prepared [`FrequencyTable`].
#[derive(Debug, Clone)]
pub struct BpeTrainer {
    config: TrainingConfig,
}

impl BpeTrainer {
    /// Create a new BPE trainer with the given configuration.
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    /// Create a trainer with default settings and the given vocabulary size.
    pub fn with_vocab_size(vocab_size: usize) -> Self {
        Self::new(TrainingConfig {
            vocab_size,
            ..Default::default()
        })
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    fn pretokenizer(&self) -> Result<Pretokenizer> {
        self.config.validate()?;
        Ok(
            Pretokenizer::new(self.config.delimiter.as_str(), self.config.utf8_policy)?
                .with_probe_window(self.config.probe_window),
        )
    }

    /// Train on a corpus file.
    pub fn train_file(&self, path: &Path) -> Result<(MergeRules, Vocabulary)> {
        let table = self
            .pretokenizer()?
            .count_file(path, self.config.num_shards)?;
        self.learn(&table)
    }

    /// Train on in-memory text.
    pub fn train_text(&self, text: &str) -> Result<(MergeRules, Vocabulary)> {
        let table = self.pretokenizer()?.count_text(text)?;
        self.learn(&table)
    }

    /// Learn merges from a frequency table whose sequences are single bytes.
    ///
    /// An empty table yields no merges and an empty vocabulary. Training
    /// stops early, without error, when no adjacent pair remains.
    pub fn learn(&self, table: &FrequencyTable) -> Result<(MergeRules, Vocabulary)> {
        self.config.validate()?;
        let start = Instant::now();

        let initial = table.symbols();
        if let Some(symbol) = initial.iter().find(|s| s.single_byte().is_none()) {
            return Err(TokenizerError::Training(format!(
                "frequency table contains multi-byte symbol {symbol:?}"
            )));
        }

        info!(
            "Learning merges from {} distinct pretokens ({} initial symbols, target vocab {})",
            table.len(),
            initial.len(),
            self.config.vocab_size
        );

        let merges = match self.config.strategy {
            LearnStrategy::Incremental => self.learn_incremental(table, &initial),
            LearnStrategy::Naive => self.learn_naive(table, &initial),
        };

        let vocab = build_vocabulary(&initial, &merges);

        if vocab.len() < self.config.vocab_size {
            info!(
                "No mergeable pairs left; stopped at vocab size {} of {}",
                vocab.len(),
                self.config.vocab_size
            );
        }
        info!(
            "Learned {} merges, vocab size {} in {:.2?}",
            merges.len(),
            vocab.len(),
            start.elapsed()
        );

        Ok((merges, vocab))
    }

    fn learn_incremental(&self, table: &FrequencyTable, initial: &BTreeSet<Symbol>) -> MergeRules {
        let mut seen: AHashSet<Symbol> = initial.iter().cloned().collect();
        let budget = self.config.vocab_size.saturating_sub(seen.len());
        let mut merges = MergeRules::with_capacity(budget);

        let mut counter = PairCounter::from_table(table);
        let mut queue = PairPriorityQueue::with_capacity(counter.pair_counts().len());
        for candidate in counter.candidates() {
            queue.push(candidate);
        }

        while seen.len() < self.config.vocab_size {
            let Some(best) = queue.pop() else {
                break;
            };

            let rule = MergeRule::new(best.left, best.right);
            self.record(&mut merges, &mut seen, rule, best.count);

            let (_, changed) = counter.merge_pair(best.pair);
            for pair in changed {
                queue.push(counter.candidate(pair));
            }
        }

        merges
    }

    fn learn_naive(&self, table: &FrequencyTable, initial: &BTreeSet<Symbol>) -> MergeRules {
        let mut seen: AHashSet<Symbol> = initial.iter().cloned().collect();
        let mut merges = MergeRules::new();
        let mut table = table.clone();

        while seen.len() < self.config.vocab_size {
            let best = table
                .pair_counts()
                .into_iter()
                .max_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
            let Some(((left, right), count)) = best else {
                break;
            };

            let rule = MergeRule::new(left, right);
            table = table.apply_merge(&rule);
            self.record(&mut merges, &mut seen, rule, count);
        }

        merges
    }

    fn record(
        &self,
        merges: &mut MergeRules,
        seen: &mut AHashSet<Symbol>,
        rule: MergeRule,
        count: u64,
    ) {
        trace!("merge {:?} + {:?} (count {})", rule.left, rule.right, count);

        seen.insert(rule.merged());
        let rank = merges.push(rule);

        if (rank + 1) % 1000 == 0 {
            debug!("{} merges learned, vocab size {}", rank + 1, seen.len());
        }
    }
}

/// Assign dense ids: initial single bytes in byte order, then each merge
/// product in merge order. A product already present keeps its first id.
pub fn build_vocabulary(initial: &BTreeSet<Symbol>, merges: &MergeRules) -> Vocabulary {
    let mut vocab = Vocabulary::with_capacity(initial.len() + merges.len());

    for symbol in initial {
        vocab.add_symbol(symbol.clone());
    }
    for rule in merges.iter() {
        vocab.add_symbol(rule.merged());
    }

    vocab
}
