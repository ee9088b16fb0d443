//! Training infrastructure for BPE tokenizers.
//!
//! The pipeline runs in three stages: shard boundary search, parallel
//! pretokenization into frequency tables, and sequential merge learning.

pub mod chunk;
pub mod counter;
pub mod frequency;
pub mod pretokenize;
pub mod trainer;

pub use chunk::{shard_ranges, ChunkSplitter, DEFAULT_PROBE_WINDOW};
pub use counter::PairCounter;
pub use frequency::{merge_sequence, FrequencyTable};
pub use pretokenize::{reduce, Pretokenizer};
pub use trainer::{
    build_vocabulary, BpeTrainer, LearnStrategy, TrainingConfig, TrainingConfigBuilder,
    DEFAULT_DELIMITER,
};
