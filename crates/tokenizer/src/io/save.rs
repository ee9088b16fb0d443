//! Save functionality for trained tokenizers.

use super::format::{SerializedTokenizer, FORMAT_VERSION, TOKENIZER_FILE};
use bytepair_core::{MergeRules, Result, TokenizerError, Utf8Policy, Vocabulary};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Tokenizer saver - handles saving trained models.
pub struct TokenizerSaver<'a> {
    /// Vocabulary reference
    vocab: &'a Vocabulary,
    /// Merge rules reference
    merges: &'a MergeRules,
    utf8_policy: Utf8Policy,
    delimiter: &'a str,
}

impl<'a> TokenizerSaver<'a> {
    /// Create a new tokenizer saver.
    pub fn new(
        vocab: &'a Vocabulary,
        merges: &'a MergeRules,
        utf8_policy: Utf8Policy,
        delimiter: &'a str,
    ) -> Self {
        Self {
            vocab,
            merges,
            utf8_policy,
            delimiter,
        }
    }

    /// Save the tokenizer to a directory.
    ///
    /// Creates the directory if needed and writes a single `tokenizer.json`.
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path).map_err(|e| {
            TokenizerError::Save(format!(
                "Failed to create directory {}: {}",
                path.display(),
                e
            ))
        })?;

        let file_path = path.join(TOKENIZER_FILE);
        let file = File::create(&file_path).map_err(|e| {
            TokenizerError::Save(format!(
                "Failed to create file {}: {}",
                file_path.display(),
                e
            ))
        })?;

        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &self.serialize())
            .map_err(|e| TokenizerError::Save(format!("Failed to serialize tokenizer: {}", e)))?;
        writer
            .flush()
            .map_err(|e| TokenizerError::io(&file_path, e))?;

        log::info!(
            "Saved tokenizer ({} symbols, {} merges) to {}",
            self.vocab.len(),
            self.merges.len(),
            file_path.display()
        );

        Ok(())
    }

    /// Serialize the tokenizer to a structure.
    pub fn serialize(&self) -> SerializedTokenizer {
        SerializedTokenizer {
            version: FORMAT_VERSION,
            utf8_policy: self.utf8_policy,
            delimiter: self.delimiter.to_string(),
            vocab: self.vocab.clone(),
            merges: self.merges.clone(),
        }
    }
}
