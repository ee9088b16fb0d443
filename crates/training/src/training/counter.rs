//! Pair counting for BPE training.
//!
//! Words are interned as symbol ids so pair bookkeeping compares integers.
//! Counts are kept exact across merges: only the words containing the merged
//! pair are rewritten, and the pair counts of each such word are replaced by
//! those of its rewritten form.

use crate::training::frequency::FrequencyTable;
use ahash::{AHashMap, AHashSet};
use bytepair_core::{MergeCandidate, Pair, Symbol};

/// Counter for BPE pair frequencies.
pub struct PairCounter {
    /// Symbol id -> symbol
    symbols: Vec<Symbol>,
    /// Symbol -> symbol id
    symbol_ids: AHashMap<Symbol, u32>,
    /// Word -> current symbol ids
    words: Vec<Vec<u32>>,
    /// Word -> frequency count
    word_counts: Vec<u64>,
    /// Pair -> frequency count
    pair_counts: AHashMap<Pair, u64>,
    /// Pair -> words containing it
    pair_words: AHashMap<Pair, AHashSet<usize>>,
}

impl PairCounter {
    /// Create a new pair counter.
    pub fn new() -> Self {
        Self {
            symbols: Vec::new(),
            symbol_ids: AHashMap::new(),
            words: Vec::new(),
            word_counts: Vec::new(),
            pair_counts: AHashMap::new(),
            pair_words: AHashMap::new(),
        }
    }

    /// Build a counter over every sequence of a frequency table.
    pub fn from_table(table: &FrequencyTable) -> Self {
        let mut counter = Self::new();
        counter.words.reserve(table.len());
        counter.word_counts.reserve(table.len());

        for (sequence, count) in table.iter() {
            let word = sequence
                .iter()
                .map(|symbol| counter.intern(symbol.clone()))
                .collect();
            counter.words.push(word);
            counter.word_counts.push(count);
        }

        counter.pair_counts = counter.count_pairs_parallel();
        counter.index_pairs();
        counter
    }

    /// Id for `symbol`, assigning a new one if needed.
    pub fn intern(&mut self, symbol: Symbol) -> u32 {
        if let Some(&id) = self.symbol_ids.get(&symbol) {
            return id;
        }
        let id = self.symbols.len() as u32;
        self.symbols.push(symbol.clone());
        self.symbol_ids.insert(symbol, id);
        id
    }

    /// Symbol for an interned id.
    pub fn symbol(&self, id: u32) -> &Symbol {
        &self.symbols[id as usize]
    }

    fn index_pairs(&mut self) {
        for (idx, word) in self.words.iter().enumerate() {
            for window in word.windows(2) {
                self.pair_words
                    .entry((window[0], window[1]))
                    .or_default()
                    .insert(idx);
            }
        }
    }

    /// Count all pairs in parallel.
    ///
    /// This returns a map of pair -> frequency count across all words.
    pub fn count_pairs_parallel(&self) -> AHashMap<Pair, u64> {
        use rayon::prelude::*;

        self.words
            .par_iter()
            .zip(self.word_counts.par_iter())
            .map(|(word, &count)| {
                let mut pair_counts: AHashMap<Pair, u64> = AHashMap::new();

                for window in word.windows(2) {
                    let pair = (window[0], window[1]);
                    *pair_counts.entry(pair).or_insert(0) += count;
                }

                pair_counts
            })
            .reduce(AHashMap::new, |mut acc, pair_counts| {
                for (pair, count) in pair_counts {
                    *acc.entry(pair).or_insert(0) += count;
                }
                acc
            })
    }

    /// Count all pairs sequentially.
    #[cfg(test)]
    fn count_pairs_sequential(&self) -> AHashMap<Pair, u64> {
        let mut pair_counts: AHashMap<Pair, u64> = AHashMap::new();

        for (word, &count) in self.words.iter().zip(self.word_counts.iter()) {
            for window in word.windows(2) {
                let pair = (window[0], window[1]);
                *pair_counts.entry(pair).or_insert(0) += count;
            }
        }

        pair_counts
    }

    /// Current count of a pair.
    pub fn pair_count(&self, pair: Pair) -> u64 {
        self.pair_counts.get(&pair).copied().unwrap_or(0)
    }

    /// Current pair counts.
    pub fn pair_counts(&self) -> &AHashMap<Pair, u64> {
        &self.pair_counts
    }

    /// Queue entry for a pair at its current count.
    pub fn candidate(&self, pair: Pair) -> MergeCandidate {
        MergeCandidate::new(
            pair,
            self.pair_count(pair),
            self.symbol(pair.0).clone(),
            self.symbol(pair.1).clone(),
        )
    }

    /// Queue entries for every pair with a positive count.
    pub fn candidates(&self) -> impl Iterator<Item = MergeCandidate> + '_ {
        self.pair_counts.keys().map(|&pair| self.candidate(pair))
    }

    /// Merge a pair in every word containing it.
    ///
    /// Returns the id of the merged symbol and the pairs whose counts changed.
    /// Pairs that drop to zero are removed from the count map, and each
    /// rewritten word is dropped from the index of every pair it lost.
    pub fn merge_pair(&mut self, pair: Pair) -> (u32, Vec<Pair>) {
        let merged = self.symbol(pair.0).concat(self.symbol(pair.1));
        let new_id = self.intern(merged);

        let Some(word_ids) = self.pair_words.remove(&pair) else {
            return (new_id, Vec::new());
        };

        let mut deltas: AHashMap<Pair, i64> = AHashMap::new();

        for idx in word_ids {
            let word = &mut self.words[idx];
            let count = self.word_counts[idx] as i64;

            let before: AHashSet<Pair> = word.windows(2).map(|w| (w[0], w[1])).collect();
            for window in word.windows(2) {
                *deltas.entry((window[0], window[1])).or_insert(0) -= count;
            }

            merge_ids(word, pair, new_id);

            let mut after: AHashSet<Pair> = AHashSet::with_capacity(word.len());
            for window in word.windows(2) {
                let p = (window[0], window[1]);
                *deltas.entry(p).or_insert(0) += count;
                after.insert(p);
                if p.0 == new_id || p.1 == new_id {
                    self.pair_words.entry(p).or_default().insert(idx);
                }
            }

            for lost in before.difference(&after) {
                if *lost == pair {
                    continue;
                }
                if let Some(indexed) = self.pair_words.get_mut(lost) {
                    indexed.remove(&idx);
                    if indexed.is_empty() {
                        self.pair_words.remove(lost);
                    }
                }
            }
        }

        let mut changed = Vec::with_capacity(deltas.len());
        for (p, delta) in deltas {
            if delta == 0 {
                continue;
            }
            let current = self.pair_counts.get(&p).copied().unwrap_or(0) as i64;
            let updated = current + delta;
            if updated > 0 {
                self.pair_counts.insert(p, updated as u64);
            } else {
                self.pair_counts.remove(&p);
            }
            changed.push(p);
        }

        (new_id, changed)
    }
}

/// Replace non-overlapping occurrences of `pair` with `new_id`, left to right.
fn merge_ids(word: &mut Vec<u32>, pair: Pair, new_id: u32) {
    let mut read = 0;
    let mut write = 0;

    while read < word.len() {
        if read + 1 < word.len() && word[read] == pair.0 && word[read + 1] == pair.1 {
            word[write] = new_id;
            read += 2;
        } else {
            word[write] = word[read];
            read += 1;
        }
        write += 1;
    }

    word.truncate(write);
}

impl Default for PairCounter {
    fn default() -> Self {
        Self::new()
    }
}
