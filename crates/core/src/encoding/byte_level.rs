//! Byte-level BPE encoding.
//!
//! Text is split into pretokens with the word-boundary pattern, each pretoken
//! becomes a sequence of single-byte ids, and learned merges are applied
//! greedily by rank. The merge loop keeps the sequence as an index-linked list
//! so a merge never shifts positions, and queues candidates in a heap that may
//! hold stale entries; each popped entry is re-validated before it is applied.

use crate::core::merges::{MergeMap, MergeRules};
use crate::core::pattern::WordSplitter;
use crate::core::utf8::Utf8Policy;
use crate::core::vocab::Vocabulary;
use crate::encoding::decoder::Decoder;
use crate::error::{Result, TokenizerError};
use dary_heap::OctonaryHeap;
use std::cmp::Ordering;
use std::sync::Arc;

const NONE: usize = usize::MAX;

/// A queued merge at a list position.
#[derive(Debug, Clone, PartialEq, Eq)]
struct MergeOp {
    rank: u32,
    pos: usize,
}

// Lower rank first, then leftmost position
impl Ord for MergeOp {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .rank
            .cmp(&self.rank)
            .then_with(|| other.pos.cmp(&self.pos))
    }
}

impl PartialOrd for MergeOp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Byte-level BPE encoder.
///
/// Holds read-only shared views of the vocabulary and merge rules; any number
/// of threads may encode with the same encoder concurrently.
#[derive(Debug, Clone)]
pub struct ByteLevelEncoder {
    /// Learned merge rules in rank order
    merges: Arc<MergeRules>,
    /// Eligible merges: id pair -> (rank, merged id)
    merge_map: MergeMap,
    /// Id of each single-byte symbol, if the vocabulary has one
    byte_ids: [Option<u32>; 256],
    splitter: WordSplitter,
    decoder: Decoder,
}

impl ByteLevelEncoder {
    /// Create an encoder over a trained vocabulary and merge list.
    pub fn new(
        vocab: Arc<Vocabulary>,
        merges: Arc<MergeRules>,
        policy: Utf8Policy,
    ) -> Result<Self> {
        let merge_map = merges.id_map(&vocab);

        let mut byte_ids = [None; 256];
        for (byte, slot) in byte_ids.iter_mut().enumerate() {
            *slot = vocab.get_id(&[byte as u8]);
        }

        log::debug!(
            "encoder ready: {} symbols, {} of {} merges eligible",
            vocab.len(),
            merge_map.len(),
            merges.len()
        );

        Ok(Self {
            merges,
            merge_map,
            byte_ids,
            splitter: WordSplitter::new()?,
            decoder: Decoder::new(vocab, policy),
        })
    }

    /// Encode text to token IDs.
    ///
    /// The word-boundary pattern is applied to the whole text; delimiter
    /// strings receive no special treatment here.
    pub fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let mut ids = Vec::with_capacity(text.len() / 3);

        for token in self.splitter.split(text) {
            self.encode_pretoken(token?.as_bytes(), &mut ids)?;
        }

        Ok(ids)
    }

    /// Lazily encode a sequence of texts, one after another.
    ///
    /// Yields exactly the concatenation of [`encode`](Self::encode) over the
    /// inputs. No state is carried between inputs; calling this again with
    /// a fresh iterator starts over.
    pub fn encode_iterable<I>(&self, texts: I) -> EncodeIter<'_, I::IntoIter>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        EncodeIter {
            encoder: self,
            texts: texts.into_iter(),
            current: Vec::new().into_iter(),
            failed: false,
        }
    }

    /// Decode token IDs back to text.
    pub fn decode(&self, ids: &[u32]) -> Result<String> {
        self.decoder.decode(ids)
    }

    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    pub fn merges(&self) -> &MergeRules {
        &self.merges
    }

    /// Encode one pretoken's bytes, appending ids to `out`.
    fn encode_pretoken(&self, bytes: &[u8], out: &mut Vec<u32>) -> Result<()> {
        let mut tokens = Vec::with_capacity(bytes.len());
        for &b in bytes {
            let id = self.byte_ids[b as usize].ok_or_else(|| {
                TokenizerError::Tokenization(format!(
                    "byte 0x{b:02x} has no id in the vocabulary"
                ))
            })?;
            tokens.push(id);
        }

        if tokens.len() > 1 {
            self.apply_bpe_merges(&mut tokens);
        }
        out.extend_from_slice(&tokens);

        Ok(())
    }

    /// Apply merges lowest rank first until no eligible pair remains.
    fn apply_bpe_merges(&self, tokens: &mut Vec<u32>) {
        let n = tokens.len();
        let mut prev: Vec<usize> = (0..n).map(|i| i.checked_sub(1).unwrap_or(NONE)).collect();
        let mut next: Vec<usize> = (1..=n).map(|i| if i < n { i } else { NONE }).collect();
        let mut alive = vec![true; n];

        let mut heap = OctonaryHeap::with_capacity(n);
        for pos in 0..n - 1 {
            if let Some(&(rank, _)) = self.merge_map.get(&(tokens[pos], tokens[pos + 1])) {
                heap.push(MergeOp { rank, pos });
            }
        }

        while let Some(op) = heap.pop() {
            if !alive[op.pos] {
                continue;
            }
            let right = next[op.pos];
            if right == NONE {
                continue;
            }

            // The pair at this position may have changed since it was queued
            let new_id = match self.merge_map.get(&(tokens[op.pos], tokens[right])) {
                Some(&(rank, new_id)) if rank == op.rank => new_id,
                _ => continue,
            };

            tokens[op.pos] = new_id;
            alive[right] = false;
            next[op.pos] = next[right];
            if next[right] != NONE {
                prev[next[right]] = op.pos;
            }

            let left = prev[op.pos];
            if left != NONE {
                if let Some(&(rank, _)) = self.merge_map.get(&(tokens[left], new_id)) {
                    heap.push(MergeOp { rank, pos: left });
                }
            }
            let after = next[op.pos];
            if after != NONE {
                if let Some(&(rank, _)) = self.merge_map.get(&(new_id, tokens[after])) {
                    heap.push(MergeOp { rank, pos: op.pos });
                }
            }
        }

        let mut write = 0;
        let mut pos = 0;
        while pos != NONE {
            tokens[write] = tokens[pos];
            write += 1;
            pos = next[pos];
        }
        tokens.truncate(write);
    }
}

/// Lazy id stream produced by [`ByteLevelEncoder::encode_iterable`].
///
/// After an encoding error is yielded, the stream ends.
#[derive(Debug, Clone)]
pub struct EncodeIter<'a, I> {
    encoder: &'a ByteLevelEncoder,
    texts: I,
    current: std::vec::IntoIter<u32>,
    failed: bool,
}

impl<I> Iterator for EncodeIter<'_, I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    type Item = Result<u32>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(id) = self.current.next() {
                return Some(Ok(id));
            }
            if self.failed {
                return None;
            }
            let text = self.texts.next()?;
            match self.encoder.encode(text.as_ref()) {
                Ok(ids) => self.current = ids.into_iter(),
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::merges::MergeRule;
    use crate::core::symbol::Symbol;

    /// All 256 bytes, then the products of `rules` in order.
    fn encoder_with(rules: &[(&[u8], &[u8])]) -> ByteLevelEncoder {
        let mut vocab = Vocabulary::with_capacity(256 + rules.len());
        for b in 0..=255u8 {
            vocab.add_symbol(Symbol::from_byte(b));
        }
        let mut merges = MergeRules::new();
        for &(a, b) in rules {
            let rule = MergeRule::new(Symbol::new(a), Symbol::new(b));
            vocab.add_symbol(rule.merged());
            merges.push(rule);
        }
        ByteLevelEncoder::new(Arc::new(vocab), Arc::new(merges), Utf8Policy::Replace).unwrap()
    }

    #[test]
    fn test_encode_without_merges_is_bytes() {
        let encoder = encoder_with(&[]);
        let ids = encoder.encode("Hi!").unwrap();
        assert_eq!(ids, vec![b'H' as u32, b'i' as u32, b'!' as u32]);
    }

    #[test]
    fn test_lowest_rank_applied_first() {
        // "the": (h,e) outranks (t,h), so "t" + "he" then "the"
        let encoder = encoder_with(&[(b"h", b"e"), (b"t", b"h"), (b"t", b"he")]);
        let ids = encoder.encode("the").unwrap();
        assert_eq!(ids, vec![258]);

        // Without (t, he) the early (h,e) merge blocks (t,h)
        let encoder = encoder_with(&[(b"h", b"e"), (b"t", b"h")]);
        let ids = encoder.encode("the").unwrap();
        assert_eq!(ids, vec![b't' as u32, 256]);
    }

    #[test]
    fn test_repeated_pair_merges_leftmost_first() {
        let encoder = encoder_with(&[(b"a", b"a")]);
        assert_eq!(encoder.encode("aaa").unwrap(), vec![256, b'a' as u32]);
        assert_eq!(encoder.encode("aaaa").unwrap(), vec![256, 256]);
    }

    #[test]
    fn test_stale_candidates_are_discarded() {
        // (b,c) is queued at position 1, but (a,b) at position 0 wins first
        // and consumes the 'b'; the queued (b,c) must not fire afterwards.
        let encoder = encoder_with(&[(b"a", b"b"), (b"b", b"c"), (b"ab", b"c")]);
        assert_eq!(encoder.encode("abc").unwrap(), vec![258]);

        let encoder = encoder_with(&[(b"a", b"b"), (b"b", b"c")]);
        assert_eq!(encoder.encode("abc").unwrap(), vec![256, b'c' as u32]);
    }

    #[test]
    fn test_merges_do_not_cross_pretokens() {
        let encoder = encoder_with(&[(b"o", b" ")]);
        // "go now" splits into "go" and " now"; "o " never shares a pretoken
        let ids = encoder.encode("go now").unwrap();
        assert!(!ids.contains(&256));
    }

    #[test]
    fn test_missing_byte_is_tokenization_error() {
        let vocab = Vocabulary::from_symbols(vec![Symbol::new(b"a")]).unwrap();
        let encoder = ByteLevelEncoder::new(
            Arc::new(vocab),
            Arc::new(MergeRules::new()),
            Utf8Policy::Replace,
        )
        .unwrap();

        assert_eq!(encoder.encode("aa").unwrap(), vec![0, 0]);
        assert!(matches!(
            encoder.encode("ab"),
            Err(TokenizerError::Tokenization(_))
        ));
    }

    #[test]
    fn test_roundtrip() {
        let encoder = encoder_with(&[(b" ", b"w"), (b"o", b"r"), (b" w", b"or")]);
        let text = "Hello, world! It's 42 héllo\n\n  wörld  ";
        let ids = encoder.encode(text).unwrap();
        assert_eq!(encoder.decode(&ids).unwrap(), text);
    }

    #[test]
    fn test_encode_iterable_concatenates() {
        let encoder = encoder_with(&[(b"a", b"b")]);
        let texts = ["ab", "", "cab ab"];

        let streamed: Vec<u32> = encoder
            .encode_iterable(texts.iter())
            .collect::<Result<_>>()
            .unwrap();

        let mut expected = Vec::new();
        for text in &texts {
            expected.extend(encoder.encode(text).unwrap());
        }
        assert_eq!(streamed, expected);

        // A fresh call starts over
        let again: Vec<u32> = encoder
            .encode_iterable(texts.iter())
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(again, expected);
    }

    #[test]
    fn test_encode_iterable_stops_after_error() {
        let vocab = Vocabulary::from_symbols(vec![Symbol::new(b"a")]).unwrap();
        let encoder = ByteLevelEncoder::new(
            Arc::new(vocab),
            Arc::new(MergeRules::new()),
            Utf8Policy::Replace,
        )
        .unwrap();

        let mut iter = encoder.encode_iterable(vec!["a", "b", "a"]);
        assert_eq!(iter.next().unwrap().unwrap(), 0);
        assert!(iter.next().unwrap().is_err());
        assert!(iter.next().is_none());
    }
}
