//! Vocabulary storage and lookup.
//!
//! The vocabulary is a bijection between symbols and dense ids in `[0, N)`.
//! The reverse mapping is the id-indexed symbol list itself; the forward map
//! is derived from it once and never mutated on its own.

use crate::core::symbol::Symbol;
use crate::error::{Result, TokenizerError};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Forward mapping: symbol -> ID
pub type Vocab = AHashMap<Symbol, u32>;

/// Reverse mapping: ID -> symbol (indexed by ID)
pub type VocabR = Vec<Symbol>;

/// Vocabulary with forward and reverse mappings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Symbol>", into = "Vec<Symbol>")]
pub struct Vocabulary {
    /// Forward mapping: symbol -> ID
    vocab: Vocab,
    /// Reverse mapping: ID -> symbol
    vocab_r: VocabR,
}

impl Vocabulary {
    /// Create a new empty vocabulary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new vocabulary with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            vocab: Vocab::with_capacity(capacity),
            vocab_r: VocabR::with_capacity(capacity),
        }
    }

    /// Build a vocabulary whose ids follow the order of `symbols`.
    ///
    /// Returns an error if a symbol appears twice.
    pub fn from_symbols(symbols: impl IntoIterator<Item = Symbol>) -> Result<Self> {
        let mut vocab = Self::new();

        for symbol in symbols {
            if vocab.vocab.contains_key(&symbol) {
                return Err(TokenizerError::InvalidConfig(format!(
                    "Symbol {:?} appears more than once in vocabulary",
                    symbol
                )));
            }
            vocab.add_symbol(symbol);
        }

        Ok(vocab)
    }

    /// Add a symbol to the vocabulary.
    ///
    /// Returns the ID assigned to the symbol, or its existing ID.
    pub fn add_symbol(&mut self, symbol: Symbol) -> u32 {
        if let Some(&id) = self.vocab.get(&symbol) {
            return id;
        }

        let id = self.vocab_r.len() as u32;
        self.vocab_r.push(symbol.clone());
        self.vocab.insert(symbol, id);

        id
    }

    /// Get the ID for a symbol's bytes.
    #[inline]
    pub fn get_id(&self, bytes: &[u8]) -> Option<u32> {
        self.vocab.get(bytes).copied()
    }

    /// Get the symbol for an ID.
    #[inline]
    pub fn get_symbol(&self, id: u32) -> Option<&Symbol> {
        self.vocab_r.get(id as usize)
    }

    /// Check whether the symbol's bytes have an ID.
    #[inline]
    pub fn contains(&self, bytes: &[u8]) -> bool {
        self.vocab.contains_key(bytes)
    }

    /// Get the size of the vocabulary.
    #[inline]
    pub fn len(&self) -> usize {
        self.vocab_r.len()
    }

    /// Check if the vocabulary is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vocab_r.is_empty()
    }

    /// Iterate over `(id, symbol)` in id order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Symbol)> {
        self.vocab_r
            .iter()
            .enumerate()
            .map(|(id, symbol)| (id as u32, symbol))
    }

    /// Symbols in id order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.vocab_r
    }
}

impl PartialEq for Vocabulary {
    fn eq(&self, other: &Self) -> bool {
        self.vocab_r == other.vocab_r
    }
}

impl Eq for Vocabulary {}

impl TryFrom<Vec<Symbol>> for Vocabulary {
    type Error = TokenizerError;

    fn try_from(symbols: Vec<Symbol>) -> Result<Self> {
        Self::from_symbols(symbols)
    }
}

impl From<Vocabulary> for Vec<Symbol> {
    fn from(vocab: Vocabulary) -> Self {
        vocab.vocab_r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_symbol() {
        let mut vocab = Vocabulary::new();
        let id1 = vocab.add_symbol(Symbol::new(b"hello"));
        let id2 = vocab.add_symbol(Symbol::new(b"world"));

        assert_eq!(id1, 0);
        assert_eq!(id2, 1);
        assert_eq!(vocab.get_id(b"hello"), Some(0));
        assert_eq!(vocab.get_id(b"world"), Some(1));
        assert_eq!(vocab.get_symbol(0).unwrap().as_bytes(), b"hello");
        assert_eq!(vocab.get_symbol(2), None);
    }

    #[test]
    fn test_add_duplicate_symbol() {
        let mut vocab = Vocabulary::new();
        let id1 = vocab.add_symbol(Symbol::new(b"hello"));
        let id2 = vocab.add_symbol(Symbol::new(b"hello"));

        assert_eq!(id1, id2);
        assert_eq!(vocab.len(), 1);
    }

    #[test]
    fn test_from_symbols_rejects_duplicates() {
        let result = Vocabulary::from_symbols(vec![Symbol::new(b"a"), Symbol::new(b"a")]);
        assert!(matches!(result, Err(TokenizerError::InvalidConfig(_))));
    }

    #[test]
    fn test_ids_are_dense() {
        let vocab = Vocabulary::from_symbols((0u8..10).map(Symbol::from_byte)).unwrap();
        let ids: Vec<u32> = vocab.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_serde_roundtrip() {
        let vocab =
            Vocabulary::from_symbols(vec![Symbol::new(b"\x00"), Symbol::new(b"ab\xff")]).unwrap();
        let json = serde_json::to_string(&vocab).unwrap();
        let back: Vocabulary = serde_json::from_str(&json).unwrap();

        assert_eq!(back, vocab);
        assert_eq!(back.get_id(b"ab\xff"), Some(1));
    }

    #[test]
    fn test_deserialize_rejects_duplicates() {
        let result: std::result::Result<Vocabulary, _> = serde_json::from_str("[[97],[97]]");
        assert!(result.is_err());
    }
}
