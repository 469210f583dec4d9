//! Positional inverted index over the word pool: answers pattern queries
//! like "5-letter words with S in position 0 and T in position 4" without
//! scanning the whole bucket.

use std::collections::{HashMap, HashSet};

use crate::types::WordId;
use crate::word_list::{is_alphabet_char, Pool};

/// Result ordering for `candidates_for_pattern`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Alphabetical by word (the default).
    Alphabetical,
    /// Whatever order the intersection produced; cheaper, used when the
    /// caller doesn't care (e.g. counting).
    AsIs,
}

/// `by_len[L]` (alphabetically sorted words of length `L`) plus
/// `pos_index[L][i][ch]` (ids, into `by_len[L]`, of words with `ch` at
/// position `i`). Rebuilt from scratch via `build` on a fresh pool; grown
/// in place via `append_words` when a mid-solve mutation must preserve
/// existing `WordId`s, at the cost of `by_len`'s tail no longer being
/// alphabetically ordered relative to the appended words.
#[derive(Debug, Default)]
pub struct PatternIndex {
    by_len: HashMap<usize, Vec<String>>,
    pos_index: HashMap<usize, Vec<HashMap<char, Vec<WordId>>>>,
}

impl PatternIndex {
    /// Build the index from `pool`, for every length present in it.
    #[must_use]
    pub fn build(pool: &Pool) -> PatternIndex {
        let mut by_len = HashMap::new();
        let mut pos_index = HashMap::new();

        for (&length, words) in &pool.by_length {
            let mut sorted = words.clone();
            sorted.sort();
            sorted.dedup();

            let mut buckets: Vec<HashMap<char, Vec<WordId>>> =
                (0..length).map(|_| HashMap::new()).collect();
            for (word_id, word) in sorted.iter().enumerate() {
                for (pos, ch) in word.chars().enumerate() {
                    buckets[pos].entry(ch).or_default().push(word_id);
                }
            }

            by_len.insert(length, sorted);
            pos_index.insert(length, buckets);
        }

        PatternIndex { by_len, pos_index }
    }

    /// Append `words` (assumed new at this length, i.e. not already present
    /// in `by_len(length)`) to the index without touching any existing
    /// `WordId`. Used by the Hydrator so domains computed before a pool
    /// mutation keep pointing at the same words afterward — a full
    /// `build` re-sorts each bucket and silently reassigns every id at or
    /// after the insertion point.
    pub fn append_words(&mut self, length: usize, words: &[String]) {
        if words.is_empty() {
            return;
        }
        let by_len = self.by_len.entry(length).or_default();
        let buckets = self
            .pos_index
            .entry(length)
            .or_insert_with(|| (0..length).map(|_| HashMap::new()).collect());

        for word in words {
            if word.chars().count() != length {
                continue;
            }
            let word_id = by_len.len();
            by_len.push(word.clone());
            for (pos, ch) in word.chars().enumerate() {
                buckets[pos].entry(ch).or_default().push(word_id);
            }
        }
    }

    #[must_use]
    pub fn word_at(&self, length: usize, id: WordId) -> Option<&str> {
        self.by_len.get(&length)?.get(id).map(String::as_str)
    }

    #[must_use]
    pub fn by_len(&self, length: usize) -> &[String] {
        self.by_len.get(&length).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Query words of length `length` matching `pattern`, a string of that
    /// same length over `{A-Z, 0-9, _, unknown_char}`.
    ///
    /// Invalid characters and length mismatches yield an empty result, not
    /// an error. Fixed positions are intersected in ascending order of
    /// bucket size, short-circuiting on the first empty intersection.
    #[must_use]
    pub fn candidates_for_pattern(
        &self,
        length: usize,
        pattern: &str,
        unknown_char: char,
        order: Order,
        limit: Option<usize>,
    ) -> Vec<WordId> {
        if pattern.chars().count() != length {
            return Vec::new();
        }
        if pattern
            .chars()
            .any(|ch| ch != unknown_char && !is_alphabet_char(ch))
        {
            return Vec::new();
        }

        let Some(buckets) = self.pos_index.get(&length) else {
            return Vec::new();
        };

        let mut fixed: Vec<(usize, char)> = pattern
            .chars()
            .enumerate()
            .filter(|&(_, ch)| ch != unknown_char)
            .collect();

        if fixed.is_empty() {
            let total = self.by_len(length).len();
            let n = limit.map_or(total, |l| l.min(total));
            return (0..n).collect();
        }

        fixed.sort_by_key(|&(pos, ch)| {
            buckets[pos].get(&ch).map_or(0, Vec::len)
        });

        let mut current: Option<HashSet<WordId>> = None;
        for (pos, ch) in fixed {
            let bucket = buckets[pos].get(&ch);
            let next_set: HashSet<WordId> = match bucket {
                Some(ids) => ids.iter().copied().collect(),
                None => HashSet::new(),
            };
            current = Some(match current {
                None => next_set,
                Some(prev) => prev.intersection(&next_set).copied().collect(),
            });
            if current.as_ref().is_some_and(HashSet::is_empty) {
                break;
            }
        }

        let mut result: Vec<WordId> = current.unwrap_or_default().into_iter().collect();
        if order == Order::Alphabetical {
            result.sort_unstable();
        }
        if let Some(limit) = limit {
            result.truncate(limit);
        }
        result
    }
}
