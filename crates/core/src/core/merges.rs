//! Merge rule management for BPE.
//!
//! Merge rules are learned as ordered pairs of symbols; a rule's rank is its
//! position in the learned order. For encoding, the rules are projected onto
//! vocabulary ids so that pair lookups compare integers rather than bytes.

use crate::core::symbol::Symbol;
use crate::core::vocab::Vocabulary;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// A pair of token IDs that can be merged.
pub type Pair = (u32, u32);

/// Merge rule mapping: pair -> (rank, new_token_id).
///
/// The rank indicates the priority of this merge rule (lower rank = higher priority).
/// The new_token_id is the ID of the token created by merging this pair.
pub type MergeMap = AHashMap<Pair, (u32, u32)>;

/// A single learned merge: `left` followed by `right` becomes `left ++ right`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MergeRule {
    pub left: Symbol,
    pub right: Symbol,
}

impl MergeRule {
    pub fn new(left: Symbol, right: Symbol) -> Self {
        Self { left, right }
    }

    /// The symbol this merge produces.
    pub fn merged(&self) -> Symbol {
        self.left.concat(&self.right)
    }
}

impl From<(Symbol, Symbol)> for MergeRule {
    fn from((left, right): (Symbol, Symbol)) -> Self {
        Self::new(left, right)
    }
}

/// Ordered collection of merge rules.
///
/// Immutable once training completes. Rank lookups go through [`id_map`],
/// which projects the list onto a vocabulary.
///
/// [`id_map`]: MergeRules::id_map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<MergeRule>", into = "Vec<MergeRule>")]
pub struct MergeRules {
    rules: Vec<MergeRule>,
}

impl MergeRules {
    /// Create a new empty collection of merge rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new collection with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rules: Vec::with_capacity(capacity),
        }
    }

    /// Append a rule and return its rank.
    ///
    /// If the same pair was learned before, [`id_map`](Self::id_map) keeps
    /// the earlier rank.
    pub fn push(&mut self, rule: MergeRule) -> u32 {
        let rank = self.rules.len() as u32;
        self.rules.push(rule);
        rank
    }

    /// Rule at the given rank.
    #[inline]
    pub fn get(&self, rank: u32) -> Option<&MergeRule> {
        self.rules.get(rank as usize)
    }

    /// Rules in rank order.
    pub fn iter(&self) -> impl Iterator<Item = &MergeRule> {
        self.rules.iter()
    }

    /// Get the number of merge rules.
    #[inline]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if there are no merge rules.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Project the rules onto vocabulary ids.
    ///
    /// A rule is kept only when both operands and the merged symbol have ids,
    /// so every pair in the returned map is eligible for merging.
    pub fn id_map(&self, vocab: &Vocabulary) -> MergeMap {
        let mut map = MergeMap::with_capacity(self.rules.len());

        for (rank, rule) in self.rules.iter().enumerate() {
            let ids = (
                vocab.get_id(rule.left.as_bytes()),
                vocab.get_id(rule.right.as_bytes()),
                vocab.get_id(rule.merged().as_bytes()),
            );
            if let (Some(left), Some(right), Some(merged)) = ids {
                map.entry((left, right)).or_insert((rank as u32, merged));
            }
        }

        map
    }
}

impl From<Vec<MergeRule>> for MergeRules {
    fn from(rules: Vec<MergeRule>) -> Self {
        Self { rules }
    }
}

impl From<MergeRules> for Vec<MergeRule> {
    fn from(merges: MergeRules) -> Self {
        merges.rules
    }
}

/// Statistics about merge rules.
#[derive(Debug, Clone, Default)]
pub struct MergeStats {
    /// Number of merge rules
    pub count: usize,
    /// Length in bytes of the longest merged symbol
    pub longest_symbol: usize,
}

impl MergeRules {
    /// Get statistics about the merge rules.
    pub fn stats(&self) -> MergeStats {
        let longest_symbol = self
            .rules
            .iter()
            .map(|r| r.left.len() + r.right.len())
            .max()
            .unwrap_or(0);

        MergeStats {
            count: self.len(),
            longest_symbol,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(a: &[u8], b: &[u8]) -> MergeRule {
        MergeRule::new(Symbol::new(a), Symbol::new(b))
    }

    fn vocab(symbols: &[&str]) -> Vocabulary {
        Vocabulary::from_symbols(symbols.iter().map(|s| Symbol::new(s.as_bytes()))).unwrap()
    }

    #[test]
    fn test_push_assigns_ranks_in_order() {
        let mut rules = MergeRules::new();
        assert_eq!(rules.push(rule(b"l", b"o")), 0);
        assert_eq!(rules.push(rule(b"lo", b"w")), 1);

        assert_eq!(rules.get(0), Some(&rule(b"l", b"o")));
        assert_eq!(rules.get(1).unwrap().merged().as_bytes(), b"low");
        assert!(rules.get(2).is_none());
    }

    #[test]
    fn test_duplicate_pair_keeps_first_rank() {
        let mut rules = MergeRules::new();
        rules.push(rule(b"a", b"b"));
        rules.push(rule(b"c", b"d"));
        rules.push(rule(b"a", b"b"));

        assert_eq!(rules.len(), 3);
        let map = rules.id_map(&vocab(&["a", "b", "c", "d", "ab", "cd"]));
        assert_eq!(map.get(&(0, 1)), Some(&(0, 4)));
        assert_eq!(map.get(&(2, 3)), Some(&(1, 5)));
    }

    #[test]
    fn test_id_map_requires_vocabulary_closure() {
        let vocab = vocab(&["a", "b", "c", "ab"]);

        let rules = MergeRules::from(vec![rule(b"a", b"b"), rule(b"b", b"c")]);
        let map = rules.id_map(&vocab);

        assert_eq!(map.get(&(0, 1)), Some(&(0, 3)));
        // "bc" has no id, so the rule is not eligible
        assert_eq!(map.get(&(1, 2)), None);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_stats() {
        let rules = MergeRules::from(vec![rule(b"t", b"h"), rule(b"th", b"e"), rule(b" ", b"the")]);

        let stats = rules.stats();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.longest_symbol, 4);
    }

    #[test]
    fn test_serde_preserves_order() {
        let rules = MergeRules::from(vec![rule(b"x", b"y"), rule(b"\xff", b"\x00")]);
        let json = serde_json::to_string(&rules).unwrap();
        let back: MergeRules = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rules);
        assert_eq!(back.get(1), Some(&rule(b"\xff", b"\x00")));
    }
}
