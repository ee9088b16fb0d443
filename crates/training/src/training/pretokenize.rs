//! Corpus pretokenization.
//!
//! Each shard is read independently, decoded lossily, split into documents on
//! the delimiter and then into pretokens with the word pattern. Shard tables
//! are reduced into one global [`FrequencyTable`] once every worker is done.

use crate::training::chunk::{shard_ranges, ChunkSplitter, DEFAULT_PROBE_WINDOW};
use crate::training::frequency::FrequencyTable;
use ahash::AHashMap;
use bytepair_core::{byte_sequence, Result, TokenizerError, Utf8Policy, WordSplitter};
use compact_str::CompactString;
use log::{debug, info};
use rayon::prelude::*;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::ops::Range;
use std::path::Path;
use std::time::Instant;

/// Turns corpus text into pretoken frequency tables.
#[derive(Debug, Clone)]
pub struct Pretokenizer {
    delimiter: String,
    splitter: WordSplitter,
    policy: Utf8Policy,
    probe_window: usize,
}

impl Pretokenizer {
    /// Create a pretokenizer for documents separated by `delimiter`.
    pub fn new(delimiter: impl Into<String>, policy: Utf8Policy) -> Result<Self> {
        let delimiter = delimiter.into();
        if delimiter.is_empty() {
            return Err(TokenizerError::InvalidConfig(
                "delimiter must not be empty".to_string(),
            ));
        }

        Ok(Self {
            delimiter,
            splitter: WordSplitter::new()?,
            policy,
            probe_window: DEFAULT_PROBE_WINDOW,
        })
    }

    /// Set the number of bytes read per boundary probe.
    pub fn with_probe_window(mut self, probe_window: usize) -> Self {
        self.probe_window = probe_window;
        self
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Count pretokens of already-decoded text.
    ///
    /// The text is split on the delimiter; each document is trimmed and
    /// skipped if empty, so no pretoken ever spans two documents.
    pub fn count_text(&self, text: &str) -> Result<FrequencyTable> {
        let mut counts: AHashMap<CompactString, u64> = AHashMap::new();

        for document in text.split(self.delimiter.as_str()) {
            let document = document.trim();
            if document.is_empty() {
                continue;
            }
            for piece in self.splitter.split(document) {
                *counts.entry(CompactString::from(piece?)).or_insert(0) += 1;
            }
        }

        let mut table = FrequencyTable::with_capacity(counts.len());
        for (piece, count) in counts {
            table.add(byte_sequence(piece.as_bytes()), count);
        }

        Ok(table)
    }

    /// Count pretokens of one byte range of a file.
    ///
    /// Opens its own handle so shards can run concurrently.
    pub fn count_shard(&self, path: &Path, range: Range<u64>) -> Result<FrequencyTable> {
        let mut file = File::open(path).map_err(|e| TokenizerError::io(path, e))?;
        file.seek(SeekFrom::Start(range.start))
            .map_err(|e| TokenizerError::io(path, e))?;

        let mut bytes = vec![0u8; (range.end - range.start) as usize];
        file.read_exact(&mut bytes)
            .map_err(|e| TokenizerError::io(path, e))?;

        let text = self.policy.decode(&bytes);
        let table = self.count_text(&text)?;

        debug!(
            "shard {}..{}: {} distinct pretokens",
            range.start,
            range.end,
            table.len()
        );

        Ok(table)
    }

    /// Pretokenize a whole file using up to `num_shards` parallel workers.
    ///
    /// All shards must succeed before reduction starts; the first error is
    /// returned otherwise.
    pub fn count_file(&self, path: &Path, num_shards: usize) -> Result<FrequencyTable> {
        let start = Instant::now();

        let splitter =
            ChunkSplitter::with_probe_window(self.delimiter.as_bytes(), self.probe_window)?;
        let boundaries = splitter.find_file_boundaries(path, num_shards)?;
        let ranges = shard_ranges(&boundaries);

        info!(
            "Pretokenizing {} in {} shards",
            path.display(),
            ranges.len()
        );

        let tables = ranges
            .into_par_iter()
            .map(|range| self.count_shard(path, range))
            .collect::<Result<Vec<_>>>()?;

        let table = reduce(tables);

        info!(
            "Pretokenized {} occurrences of {} distinct pretokens in {:.2?}",
            table.total(),
            table.len(),
            start.elapsed()
        );

        Ok(table)
    }
}

/// Sum shard tables into one.
pub fn reduce(tables: impl IntoIterator<Item = FrequencyTable>) -> FrequencyTable {
    tables
        .into_iter()
        .fold(FrequencyTable::new(), |mut acc, table| {
            acc.merge(table);
            acc
        })
}
