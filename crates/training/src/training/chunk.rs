//! Shard boundary search.
//!
//! The corpus is cut into roughly even byte ranges whose interior boundaries
//! are moved forward to the start of the next delimiter, so no document is
//! split between two shards.

use bytepair_core::{Result, TokenizerError};
use memchr::memmem;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::ops::Range;
use std::path::Path;

/// Default number of bytes read per probe.
pub const DEFAULT_PROBE_WINDOW: usize = 4096;

/// Computes delimiter-aligned shard boundaries.
#[derive(Debug, Clone)]
pub struct ChunkSplitter {
    delimiter: Vec<u8>,
    probe_window: usize,
}

impl ChunkSplitter {
    /// Create a splitter for the given delimiter.
    pub fn new(delimiter: impl Into<Vec<u8>>) -> Result<Self> {
        Self::with_probe_window(delimiter, DEFAULT_PROBE_WINDOW)
    }

    /// Create a splitter with a custom probe window size.
    pub fn with_probe_window(delimiter: impl Into<Vec<u8>>, probe_window: usize) -> Result<Self> {
        let delimiter = delimiter.into();
        if delimiter.is_empty() {
            return Err(TokenizerError::InvalidConfig(
                "delimiter must not be empty".to_string(),
            ));
        }
        if probe_window == 0 {
            return Err(TokenizerError::InvalidConfig(
                "probe window must be positive".to_string(),
            ));
        }
        Ok(Self {
            delimiter,
            probe_window,
        })
    }

    /// Find boundaries for up to `num_shards` shards of the file at `path`.
    pub fn find_file_boundaries(&self, path: &Path, num_shards: usize) -> Result<Vec<u64>> {
        let mut file = File::open(path).map_err(|e| TokenizerError::io(path, e))?;
        self.find_boundaries(&mut file, num_shards)
            .map_err(|e| TokenizerError::io(path, e))
    }

    /// Find boundaries for up to `num_shards` shards of `reader`.
    ///
    /// Returns sorted, distinct offsets starting at 0 and ending at the
    /// stream length. Each interior candidate `i * (len / num_shards)` is
    /// moved to the start of the first delimiter at or after it, or to the
    /// end of the stream if there is none; in that case the last shard
    /// absorbs the remainder. `num_shards == 0` is treated as one shard.
    pub fn find_boundaries<R: Read + Seek>(
        &self,
        reader: &mut R,
        num_shards: usize,
    ) -> io::Result<Vec<u64>> {
        let num_shards = num_shards.max(1) as u64;
        let file_size = reader.seek(SeekFrom::End(0))?;
        let chunk_size = file_size / num_shards;

        let mut boundaries: Vec<u64> = (0..=num_shards).map(|i| i * chunk_size).collect();
        if let Some(last) = boundaries.last_mut() {
            *last = file_size;
        }

        let finder = memmem::Finder::new(&self.delimiter);
        let overlap = self.delimiter.len() - 1;
        let mut buf = Vec::with_capacity(self.probe_window + overlap);

        let interior = boundaries.len() - 1;
        for boundary in boundaries.iter_mut().take(interior).skip(1) {
            reader.seek(SeekFrom::Start(*boundary))?;
            buf.clear();
            // File offset of buf[0]
            let mut base = *boundary;

            *boundary = loop {
                let read = reader
                    .by_ref()
                    .take(self.probe_window as u64)
                    .read_to_end(&mut buf)?;
                if read == 0 {
                    break file_size;
                }
                if let Some(found) = finder.find(&buf) {
                    break base + found as u64;
                }
                // Keep a tail so a delimiter straddling two windows is found
                let keep = overlap.min(buf.len());
                let consumed = buf.len() - keep;
                buf.drain(..consumed);
                base += consumed as u64;
            };
        }

        boundaries.sort_unstable();
        boundaries.dedup();

        log::debug!(
            "split {} bytes into {} shards (requested {})",
            file_size,
            boundaries.len().saturating_sub(1),
            num_shards
        );

        Ok(boundaries)
    }

    pub fn delimiter(&self) -> &[u8] {
        &self.delimiter
    }
}

/// Consecutive boundary pairs as byte ranges.
pub fn shard_ranges(boundaries: &[u64]) -> Vec<Range<u64>> {
    boundaries.windows(2).map(|w| w[0]..w[1]).collect()
}
