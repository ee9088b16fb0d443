//! Core BPE data structures.
//!
//! This module contains the symbol, merge rule and vocabulary types shared by
//! training and encoding, independent of how the corpus is read.

pub mod merges;
pub mod pattern;
pub mod priority;
pub mod symbol;
pub mod utf8;
pub mod vocab;

pub use merges::{MergeMap, MergeRule, MergeRules, MergeStats, Pair};
pub use pattern::{WordSplitter, WORD_PATTERN};
pub use priority::{MergeCandidate, PairPriorityQueue};
pub use symbol::{byte_sequence, Sequence, Symbol};
pub use utf8::Utf8Policy;
pub use vocab::{Vocab, VocabR, Vocabulary};
