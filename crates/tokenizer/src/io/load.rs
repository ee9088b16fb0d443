//! Load functionality for pre-trained tokenizers.

use super::format::{SerializedTokenizer, TOKENIZER_FILE};
use bytepair_core::{Result, TokenizerError};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Tokenizer loader - handles loading trained models.
pub struct TokenizerLoader;

impl TokenizerLoader {
    /// Load a tokenizer from a directory.
    ///
    /// Expects a `tokenizer.json` file in the given directory. The result is
    /// validated before it is returned.
    pub fn load(path: &Path) -> Result<SerializedTokenizer> {
        let file_path = path.join(TOKENIZER_FILE);
        let file = File::open(&file_path).map_err(|e| {
            TokenizerError::Load(format!(
                "Failed to open file {}: {}",
                file_path.display(),
                e
            ))
        })?;

        let reader = BufReader::new(file);
        let serialized: SerializedTokenizer = serde_json::from_reader(reader)
            .map_err(|e| TokenizerError::Load(format!("Failed to deserialize tokenizer: {}", e)))?;

        serialized.validate()?;

        log::debug!(
            "Loaded {} symbols and {} merges from {}",
            serialized.vocab.len(),
            serialized.merges.len(),
            file_path.display()
        );

        Ok(serialized)
    }
}
