//! Format definitions for tokenizer serialization.
//!
//! A trained tokenizer is stored as a single `tokenizer.json`. Symbols are
//! written as arrays of byte values so merge products that are not valid
//! UTF-8 on their own survive the round trip.

use bytepair_core::{MergeRules, Result, TokenizerError, Utf8Policy, Vocabulary};
use serde::{Deserialize, Serialize};

/// File name used inside a model directory.
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Current format version.
pub const FORMAT_VERSION: u32 = 1;

/// Complete tokenizer serialization format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedTokenizer {
    /// Format version
    pub version: u32,
    /// Handling of undecodable bytes on decode
    pub utf8_policy: Utf8Policy,
    /// Document delimiter used during training
    pub delimiter: String,
    /// Symbols in id order
    pub vocab: Vocabulary,
    /// Merge rules in rank order
    pub merges: MergeRules,
}

impl SerializedTokenizer {
    /// Check the version and that every merge refers to known symbols.
    ///
    /// Id uniqueness is enforced when the vocabulary is deserialized.
    pub fn validate(&self) -> Result<()> {
        if self.version != FORMAT_VERSION {
            return Err(TokenizerError::Load(format!(
                "Unsupported format version {} (expected {})",
                self.version, FORMAT_VERSION
            )));
        }

        for (rank, rule) in self.merges.iter().enumerate() {
            for symbol in [&rule.left, &rule.right] {
                if !self.vocab.contains(symbol.as_bytes()) {
                    return Err(TokenizerError::InvalidMerge(format!(
                        "merge {rank} uses {symbol:?}, which is not in the vocabulary"
                    )));
                }
            }
            let merged = rule.merged();
            if !self.vocab.contains(merged.as_bytes()) {
                return Err(TokenizerError::InvalidMerge(format!(
                    "merge {rank} produces {merged:?}, which is not in the vocabulary"
                )));
            }
        }

        Ok(())
    }
}
