//! Bytepair-training - BPE training infrastructure
//!
//! This crate learns byte-level BPE merge rules from a text corpus.
//!
//! # Features
//!
//! - Delimiter-aligned sharding so documents never straddle two workers
//! - Parallel pretokenization with a deterministic reduction
//! - Exact incremental pair counts driving a stale-tolerant priority queue
//! - Deterministic tie-breaking on symbol bytes
//!
//! # Example
//!
//! ```rust
//! use bytepair_training::{BpeTrainer, TrainingConfig};
//!
//! let config = TrainingConfig::builder()
//!     .vocab_size(300)
//!     .num_shards(1)
//!     .build()?;
//!
//! let trainer = BpeTrainer::new(config);
//! let (merges, vocab) = trainer.train_text("low lower lowest<|endoftext|>newer newest")?;
//! assert_eq!(vocab.len(), vocab.symbols().len());
//! assert!(!merges.is_empty());
//! # Ok::<(), bytepair_training::TokenizerError>(())
//! ```

pub use bytepair_core::{Result, TokenizerError};

// Training infrastructure
pub mod training;
pub use training::{
    build_vocabulary, shard_ranges, BpeTrainer, ChunkSplitter, FrequencyTable, LearnStrategy,
    PairCounter, Pretokenizer, TrainingConfig, TrainingConfigBuilder, DEFAULT_DELIMITER,
    DEFAULT_PROBE_WINDOW,
};
