//! Token id to text decoding.

use crate::core::utf8::Utf8Policy;
use crate::core::vocab::Vocabulary;
use crate::error::{Result, TokenizerError};
use std::sync::Arc;

/// Maps token ids back to text. Depends only on the vocabulary.
#[derive(Debug, Clone)]
pub struct Decoder {
    vocab: Arc<Vocabulary>,
    policy: Utf8Policy,
}

impl Decoder {
    pub fn new(vocab: Arc<Vocabulary>, policy: Utf8Policy) -> Self {
        Self { vocab, policy }
    }

    /// Concatenate the bytes of every id, in order.
    ///
    /// Fails with [`TokenizerError::UnknownTokenId`] on an id the vocabulary
    /// does not contain (e.g. one from a different vocabulary).
    pub fn decode_bytes(&self, ids: &[u32]) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(ids.len() * 4);

        for &id in ids {
            let symbol = self
                .vocab
                .get_symbol(id)
                .ok_or(TokenizerError::UnknownTokenId(id))?;
            bytes.extend_from_slice(symbol.as_bytes());
        }

        Ok(bytes)
    }

    /// Decode ids to text under the configured UTF-8 policy.
    pub fn decode(&self, ids: &[u32]) -> Result<String> {
        let bytes = self.decode_bytes(ids)?;
        Ok(self.policy.decode(&bytes))
    }

    pub fn policy(&self) -> Utf8Policy {
        self.policy
    }
}
