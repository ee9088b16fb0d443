//! Immutable byte-string symbols.
//!
//! A symbol is either one of the 256 single bytes or the concatenation of two
//! symbols produced by a merge. Symbols are never mutated; merging creates a
//! new one. The backing storage is reference counted so that sequences,
//! merge rules and the vocabulary can share the same bytes.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// An atomic byte string in the vocabulary.
///
/// Ordering is lexicographic over the raw bytes, which is the order used to
/// break ties between equally frequent pairs during training.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(Arc<[u8]>);

impl Symbol {
    /// Create a symbol from raw bytes.
    pub fn new(bytes: &[u8]) -> Self {
        Self(Arc::from(bytes))
    }

    /// Create a single-byte symbol.
    #[inline]
    pub fn from_byte(byte: u8) -> Self {
        Self::new(&[byte])
    }

    /// Concatenate two symbols into a new one.
    pub fn concat(&self, other: &Symbol) -> Self {
        let mut bytes = Vec::with_capacity(self.len() + other.len());
        bytes.extend_from_slice(&self.0);
        bytes.extend_from_slice(&other.0);
        Self(Arc::from(bytes))
    }

    /// Raw bytes of this symbol.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the byte if this is one of the 256 base symbols.
    #[inline]
    pub fn single_byte(&self) -> Option<u8> {
        match *self.0 {
            [b] => Some(b),
            _ => None,
        }
    }
}

impl Borrow<[u8]> for Symbol {
    fn borrow(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for Symbol {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<&[u8]> for Symbol {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes)
    }
}

impl From<Vec<u8>> for Symbol {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Arc::from(bytes))
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b\"{}\"", self.0.escape_ascii())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.escape_ascii())
    }
}

/// An ordered list of symbols representing one pretoken.
pub type Sequence = Vec<Symbol>;

/// Split UTF-8 bytes into a sequence of single-byte symbols.
pub fn byte_sequence(bytes: &[u8]) -> Sequence {
    bytes.iter().map(|&b| Symbol::from_byte(b)).collect()
}
