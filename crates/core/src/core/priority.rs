//! Priority queue for BPE merge candidates during training.
//!
//! Candidates are ordered by aggregate count; equal counts are broken by the
//! lexicographically greatest pair of symbol bytes. Entries go stale when a
//! pair's count changes and are skipped lazily on pop.

use crate::core::merges::Pair;
use crate::core::symbol::Symbol;
use ahash::AHashMap;
use dary_heap::OctonaryHeap;
use std::cmp::Ordering;

/// A merge candidate during BPE training.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeCandidate {
    /// The pair of symbol IDs to merge
    pub pair: Pair,
    /// The weighted frequency of this pair
    pub count: u64,
    /// Left symbol, used for tie-breaking
    pub left: Symbol,
    /// Right symbol, used for tie-breaking
    pub right: Symbol,
}

impl MergeCandidate {
    /// Create a new merge candidate.
    pub fn new(pair: Pair, count: u64, left: Symbol, right: Symbol) -> Self {
        Self {
            pair,
            count,
            left,
            right,
        }
    }
}

// Higher count first, then the greater pair of byte strings
impl Ord for MergeCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.count
            .cmp(&other.count)
            .then_with(|| self.left.cmp(&other.left))
            .then_with(|| self.right.cmp(&other.right))
            .then_with(|| self.pair.cmp(&other.pair))
    }
}

impl PartialOrd for MergeCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Priority queue for BPE merge selection.
///
/// Uses an 8-ary heap for better cache locality than a binary heap.
pub struct PairPriorityQueue {
    /// The heap storing merge candidates
    heap: OctonaryHeap<MergeCandidate>,
    /// Track current counts to detect stale entries
    current_counts: AHashMap<Pair, u64>,
}

impl PairPriorityQueue {
    /// Create a new priority queue with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: OctonaryHeap::with_capacity(capacity),
            current_counts: AHashMap::with_capacity(capacity),
        }
    }

    /// Create a new empty priority queue.
    pub fn new() -> Self {
        Self {
            heap: OctonaryHeap::new(),
            current_counts: AHashMap::new(),
        }
    }

    /// Push a candidate, superseding any earlier entry for the same pair.
    ///
    /// A zero count withdraws the pair entirely.
    pub fn push(&mut self, candidate: MergeCandidate) {
        if candidate.count == 0 {
            self.current_counts.remove(&candidate.pair);
            return;
        }
        self.current_counts.insert(candidate.pair, candidate.count);
        self.heap.push(candidate);
    }

    /// Pop the highest priority merge candidate.
    ///
    /// Returns None if the queue is empty or only contains stale entries.
    pub fn pop(&mut self) -> Option<MergeCandidate> {
        while let Some(candidate) = self.heap.pop() {
            if self.current_counts.get(&candidate.pair) == Some(&candidate.count) {
                self.current_counts.remove(&candidate.pair);
                return Some(candidate);
            }
        }
        None
    }

    /// Get the number of (potentially stale) entries in the queue.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Check if the queue has no entries at all.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl Default for PairPriorityQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(pair: Pair, count: u64, left: &[u8], right: &[u8]) -> MergeCandidate {
        MergeCandidate::new(pair, count, Symbol::new(left), Symbol::new(right))
    }

    #[test]
    fn test_push_pop() {
        let mut queue = PairPriorityQueue::new();

        queue.push(candidate((0, 1), 10, b"a", b"b"));
        queue.push(candidate((1, 2), 20, b"b", b"c"));
        queue.push(candidate((2, 3), 15, b"c", b"d"));

        assert_eq!(queue.pop().unwrap().pair, (1, 2));
        assert_eq!(queue.pop().unwrap().pair, (2, 3));
        assert_eq!(queue.pop().unwrap().pair, (0, 1));
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_tie_break_prefers_greatest_bytes() {
        let mut queue = PairPriorityQueue::new();

        // Ids are deliberately in the opposite order of the bytes
        queue.push(candidate((5, 6), 7, b"a", b"z"));
        queue.push(candidate((0, 1), 7, b"b", b"a"));
        queue.push(candidate((2, 3), 7, b"b", b" "));

        let first = queue.pop().unwrap();
        assert_eq!((first.left.as_bytes(), first.right.as_bytes()), (&b"b"[..], &b"a"[..]));
        let second = queue.pop().unwrap();
        assert_eq!(second.pair, (2, 3));
        let third = queue.pop().unwrap();
        assert_eq!(third.pair, (5, 6));
    }

    #[test]
    fn test_stale_entry_detection() {
        let mut queue = PairPriorityQueue::new();

        queue.push(candidate((0, 1), 10, b"a", b"b"));
        queue.push(candidate((1, 2), 20, b"b", b"c"));

        // Update count for (0, 1), making first entry stale
        queue.push(candidate((0, 1), 25, b"a", b"b"));

        let first = queue.pop().unwrap();
        assert_eq!(first.pair, (0, 1));
        assert_eq!(first.count, 25);

        let second = queue.pop().unwrap();
        assert_eq!(second.pair, (1, 2));

        // The stale (0, 1) entry with count 10 is discarded
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_zero_count_withdraws_pair() {
        let mut queue = PairPriorityQueue::new();

        queue.push(candidate((0, 1), 10, b"a", b"b"));
        queue.push(candidate((1, 2), 5, b"b", b"c"));
        queue.push(candidate((0, 1), 0, b"a", b"b"));

        // The withdrawn entry stays in the heap but is never returned
        assert_eq!(queue.len(), 2);
        assert!(!queue.current_counts.contains_key(&(0, 1)));
        assert_eq!(queue.pop().unwrap().pair, (1, 2));
        assert!(queue.pop().is_none());
    }
}
