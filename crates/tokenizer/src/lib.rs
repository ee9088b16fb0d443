//! Bytepair-tokenizer - High-level tokenizer API
//!
//! This crate ties training, encoding, decoding and persistence together
//! behind a single [`Tokenizer`] type.
//!
//! # Features
//!
//! - Builder for training from a corpus file or an in-memory string
//! - Encoding of single texts, lazy streams of texts and parallel batches
//! - Lossless `tokenizer.json` persistence, validated on load
//!
//! # Example
//!
//! ```rust
//! use bytepair_tokenizer::Tokenizer;
//!
//! let tokenizer = Tokenizer::builder()
//!     .vocab_size(280)
//!     .num_shards(1)
//!     .train_from_text("hello world<|endoftext|>hello there")?;
//!
//! let ids = tokenizer.encode("hello world")?;
//! assert_eq!(tokenizer.decode(&ids)?, "hello world");
//! # Ok::<(), bytepair_tokenizer::TokenizerError>(())
//! ```

// Re-export core types
pub use bytepair_core::{
    MergeRule, MergeRules, Result, Symbol, TokenizerError, Utf8Policy, Vocabulary,
};
pub use bytepair_training::{LearnStrategy, TrainingConfig};

// Tokenizer API
pub mod tokenizer;
pub use tokenizer::{Tokenizer, TokenizerBuilder, TokenizerStats};

// IO/Serialization
pub mod io;
pub use io::{SerializedTokenizer, TokenizerLoader, TokenizerSaver};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
