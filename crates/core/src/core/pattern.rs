//! Word-boundary pattern used to split text into pretokens.
//!
//! The same pattern is applied by the training pretokenizer and by the
//! encoder, so it lives here rather than in either crate.

use crate::error::{Result, TokenizerError};
use fancy_regex::Regex;

/// GPT-2 style word-boundary pattern.
///
/// Alternatives are tried in order: contractions, letter runs, digit runs,
/// runs of other non-space characters (each optionally preceded by a single
/// space), whitespace not followed by a non-space, then any whitespace.
pub const WORD_PATTERN: &str =
    r"'(?:[sdmt]|ll|ve|re)| ?\p{L}+| ?\p{N}+| ?[^\s\p{L}\p{N}]+|\s+(?!\S)|\s+";

/// Splits text into pretokens using [`WORD_PATTERN`].
#[derive(Debug, Clone)]
pub struct WordSplitter {
    regex: Regex,
}

impl WordSplitter {
    /// Compile the word-boundary pattern.
    pub fn new() -> Result<Self> {
        let regex = Regex::new(WORD_PATTERN)
            .map_err(|e| TokenizerError::InvalidConfig(format!("word pattern: {e}")))?;
        Ok(Self { regex })
    }

    /// Iterate over the pretokens of `text`, leftmost match first.
    ///
    /// Yields an error if the regex engine gives up (backtrack limit).
    pub fn split<'t>(&'t self, text: &'t str) -> impl Iterator<Item = Result<&'t str>> + 't {
        self.regex.find_iter(text).map(|m| {
            m.map(|m| m.as_str())
                .map_err(|e| TokenizerError::Tokenization(format!("regex match failed: {e}")))
        })
    }

    /// Collect all pretokens of `text`.
    pub fn split_all<'t>(&'t self, text: &'t str) -> Result<Vec<&'t str>> {
        self.split(text).collect()
    }
}
