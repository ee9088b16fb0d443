//! Pretoken frequency tables.
//!
//! A table maps each distinct pretoken, held as its current symbol sequence,
//! to the number of times it occurred in the corpus. Shard tables are merged
//! by summing counts; the merge learner consumes the combined table.

use ahash::AHashMap;
use bytepair_core::{MergeRule, Sequence, Symbol};
use std::collections::BTreeSet;

/// Pretoken sequence -> occurrence count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: AHashMap<Sequence, u64>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            counts: AHashMap::with_capacity(capacity),
        }
    }

    /// Add `count` occurrences of `sequence`. Zero counts and empty
    /// sequences are ignored.
    pub fn add(&mut self, sequence: Sequence, count: u64) {
        if count == 0 || sequence.is_empty() {
            return;
        }
        *self.counts.entry(sequence).or_insert(0) += count;
    }

    /// Fold another table into this one, summing counts per key.
    pub fn merge(&mut self, other: FrequencyTable) {
        if self.counts.is_empty() {
            self.counts = other.counts;
            return;
        }
        self.counts.reserve(other.counts.len());
        for (sequence, count) in other.counts {
            *self.counts.entry(sequence).or_insert(0) += count;
        }
    }

    /// Count for a sequence, or 0.
    pub fn get(&self, sequence: &[Symbol]) -> u64 {
        self.counts.get(sequence).copied().unwrap_or(0)
    }

    /// Number of distinct sequences.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total pretoken occurrences.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Sequence, u64)> {
        self.counts.iter().map(|(seq, &count)| (seq, count))
    }

    /// Every symbol that occurs in some sequence, in byte order.
    pub fn symbols(&self) -> BTreeSet<Symbol> {
        self.counts.keys().flatten().cloned().collect()
    }

    /// Weighted count of every adjacent pair.
    ///
    /// Overlapping occurrences are all counted, so `a a a` contributes two
    /// to `(a, a)`.
    pub fn pair_counts(&self) -> AHashMap<(Symbol, Symbol), u64> {
        let mut pairs: AHashMap<(Symbol, Symbol), u64> = AHashMap::new();

        for (sequence, &count) in &self.counts {
            for window in sequence.windows(2) {
                *pairs
                    .entry((window[0].clone(), window[1].clone()))
                    .or_insert(0) += count;
            }
        }

        pairs
    }

    /// Rewrite every sequence with `rule` applied, returning the new table.
    ///
    /// Sequences that become identical after the rewrite have their counts
    /// summed.
    pub fn apply_merge(&self, rule: &MergeRule) -> FrequencyTable {
        let merged = rule.merged();
        let mut table = FrequencyTable::with_capacity(self.counts.len());

        for (sequence, &count) in &self.counts {
            let rewritten = merge_sequence(sequence, &rule.left, &rule.right, &merged);
            table.add(rewritten, count);
        }

        table
    }
}

impl FromIterator<(Sequence, u64)> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = (Sequence, u64)>>(iter: I) -> Self {
        let mut table = FrequencyTable::new();
        for (sequence, count) in iter {
            table.add(sequence, count);
        }
        table
    }
}

/// Replace non-overlapping `left right` occurrences with `merged`, scanning
/// left to right.
pub fn merge_sequence(
    sequence: &[Symbol],
    left: &Symbol,
    right: &Symbol,
    merged: &Symbol,
) -> Sequence {
    let mut out = Vec::with_capacity(sequence.len());
    let mut i = 0;

    while i < sequence.len() {
        if i + 1 < sequence.len() && &sequence[i] == left && &sequence[i + 1] == right {
            out.push(merged.clone());
            i += 2;
        } else {
            out.push(sequence[i].clone());
            i += 1;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytepair_core::byte_sequence;

    fn sym(bytes: &[u8]) -> Symbol {
        Symbol::new(bytes)
    }

    #[test]
    fn test_add_and_merge() {
        let mut a = FrequencyTable::new();
        a.add(byte_sequence(b"low"), 2);
        a.add(byte_sequence(b"low"), 3);
        a.add(byte_sequence(b""), 9);
        a.add(byte_sequence(b"x"), 0);

        let mut b = FrequencyTable::new();
        b.add(byte_sequence(b"low"), 1);
        b.add(byte_sequence(b"new"), 4);

        a.merge(b);
        assert_eq!(a.len(), 2);
        assert_eq!(a.get(&byte_sequence(b"low")), 6);
        assert_eq!(a.get(&byte_sequence(b"new")), 4);
        assert_eq!(a.total(), 10);
    }

    #[test]
    fn test_pair_counts_are_weighted() {
        let table: FrequencyTable = vec![
            (byte_sequence(b"low"), 5),
            (byte_sequence(b"lower"), 2),
            (byte_sequence(b"aaa"), 1),
        ]
        .into_iter()
        .collect();

        let pairs = table.pair_counts();
        assert_eq!(pairs[&(sym(b"l"), sym(b"o"))], 7);
        assert_eq!(pairs[&(sym(b"e"), sym(b"r"))], 2);
        assert_eq!(pairs[&(sym(b"a"), sym(b"a"))], 2);
    }

    #[test]
    fn test_merge_sequence_is_non_overlapping() {
        let a = sym(b"a");
        let aa = sym(b"aa");
        let out = merge_sequence(&byte_sequence(b"aaa"), &a, &a, &aa);
        assert_eq!(out, vec![aa.clone(), a.clone()]);

        let out = merge_sequence(&byte_sequence(b"aaaa"), &a, &a, &aa);
        assert_eq!(out, vec![aa.clone(), aa]);
    }

    #[test]
    fn test_apply_merge_combines_identical_results() {
        let table: FrequencyTable = vec![
            (vec![sym(b"a"), sym(b"b")], 2),
            (vec![sym(b"ab")], 3),
        ]
        .into_iter()
        .collect();

        let rule = MergeRule::new(sym(b"a"), sym(b"b"));
        let merged = table.apply_merge(&rule);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged.get(&[sym(b"ab")]), 5);
    }

    #[test]
    fn test_symbols_sorted() {
        let table: FrequencyTable = vec![(byte_sequence(b"cab"), 1)].into_iter().collect();
        let symbols: Vec<Symbol> = table.symbols().into_iter().collect();
        assert_eq!(symbols, vec![sym(b"a"), sym(b"b"), sym(b"c")]);
    }
}
