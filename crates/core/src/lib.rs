//! Bytepair-core - Core byte-pair encoding types
//!
//! This crate provides the data structures shared by training and encoding:
//! immutable byte-string symbols, ordered merge rules, the dense vocabulary,
//! and the encoder/decoder that apply a trained model to text.
//!
//! # Features
//!
//! - Reference-counted symbols so sequences, rules and vocabulary share bytes
//! - Merge rules projected onto vocabulary ids for integer pair lookups
//! - Stale-tolerant heaps for both merge selection and merge application
//! - Lossy UTF-8 handling that never fails on malformed input
//!
//! # Example
//!
//! ```rust
//! use bytepair_core::{ByteLevelEncoder, MergeRule, MergeRules, Symbol, Utf8Policy, Vocabulary};
//! use std::sync::Arc;
//!
//! let mut vocab = Vocabulary::new();
//! for b in 0..=255u8 {
//!     vocab.add_symbol(Symbol::from_byte(b));
//! }
//! let rule = MergeRule::new(Symbol::from_byte(b'h'), Symbol::from_byte(b'i'));
//! vocab.add_symbol(rule.merged());
//! let merges = MergeRules::from(vec![rule]);
//!
//! let encoder = ByteLevelEncoder::new(Arc::new(vocab), Arc::new(merges), Utf8Policy::Replace)?;
//! assert_eq!(encoder.encode("hi")?, vec![256]);
//! assert_eq!(encoder.decode(&[256])?, "hi");
//! # Ok::<(), bytepair_core::TokenizerError>(())
//! ```

pub mod error;
pub use error::{Result, TokenizerError};

// Core BPE data structures
pub mod core;
pub use crate::core::{
    byte_sequence, MergeCandidate, MergeMap, MergeRule, MergeRules, MergeStats, Pair,
    PairPriorityQueue, Sequence, Symbol, Utf8Policy, Vocab, VocabR, Vocabulary, WordSplitter,
    WORD_PATTERN,
};

// Encoding and decoding
pub mod encoding;
pub use encoding::{ByteLevelEncoder, Decoder, EncodeIter};
