//! Word pool: normalization, validation, and atomic on-disk persistence.
//!
//! The pool itself is just `length -> set of words`; this module also owns
//! the single-character alphabet check shared by `grid` and `pattern_index`,
//! since "is this a legal crossword character" is a pool-level concept.

use std::collections::BTreeMap;
use std::io::Write as _;
use std::path::Path;
use std::sync::OnceLock;

use fancy_regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Matches a normalized word: one or more of A-Z, 0-9, or underscore.
fn word_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z0-9_]+$").expect("static regex is valid"))
}

/// Is `ch` a legal crossword-grid character (a fixed letter, not a block or
/// empty marker)?
#[must_use]
pub fn is_alphabet_char(ch: char) -> bool {
    ch.is_ascii_uppercase() || ch.is_ascii_digit() || ch == '_'
}

/// Normalize a raw word: trim, uppercase, and validate against the
/// alphabet. Returns `None` for empty or invalid input rather than erroring,
/// since callers (pool loading, hydration results) routinely see junk they
/// should just skip.
#[must_use]
pub fn normalize_word(raw: &str) -> Option<String> {
    let upper = raw.trim().to_uppercase();
    if upper.is_empty() {
        return None;
    }
    match word_regex().is_match(&upper) {
        Ok(true) => Some(upper),
        _ => None,
    }
}

/// `length -> sorted, deduplicated words of that length`.
///
/// Lengths below 3 are never populated; `minEntryLen` is enforced by
/// `slots::build_slots`, not here, since the pool may legitimately be
/// queried by other consumers with a different minimum.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pool {
    #[serde(flatten, with = "length_key_map")]
    pub by_length: BTreeMap<usize, Vec<String>>,
}

/// Serde adapter for `BTreeMap<usize, Vec<String>>` that reads/writes the
/// pool file's string-keyed object (`"3": [...], "4": [...]`) while keeping
/// the in-memory representation numerically keyed, per `spec.md` §9's note
/// that the string keys are only a serialization detail.
mod length_key_map {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<usize, Vec<String>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let stringified: BTreeMap<String, &Vec<String>> =
            map.iter().map(|(k, v)| (k.to_string(), v)).collect();
        stringified.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<usize, Vec<String>>, D::Error> {
        let stringified: BTreeMap<String, Vec<String>> = BTreeMap::deserialize(deserializer)?;
        stringified
            .into_iter()
            .map(|(k, v)| {
                k.parse::<usize>()
                    .map(|len| (len, v))
                    .map_err(serde::de::Error::custom)
            })
            .collect()
    }
}

impl Pool {
    #[must_use]
    pub fn words_of_length(&self, length: usize) -> &[String] {
        self.by_length
            .get(&length)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Normalize, validate, and bucket `words` by length (restricted to
    /// `3..=max_length`); append any word not already present, then dedupe
    /// and sort any bucket that was touched. Returns the number of words
    /// actually added per length, matching `spec.md` §6's `add_words`
    /// contract.
    pub fn add_words(&mut self, words: &[String], max_length: usize) -> BTreeMap<usize, usize> {
        let mut added_counts = BTreeMap::new();
        let mut touched = std::collections::BTreeSet::new();

        for raw in words {
            let Some(word) = normalize_word(raw) else {
                continue;
            };
            let len = word.chars().count();
            if !(3..=max_length).contains(&len) {
                continue;
            }
            let bucket = self.by_length.entry(len).or_default();
            if !bucket.contains(&word) {
                bucket.push(word);
                *added_counts.entry(len).or_insert(0) += 1;
                touched.insert(len);
            }
        }

        for len in touched {
            if let Some(bucket) = self.by_length.get_mut(&len) {
                bucket.sort();
                bucket.dedup();
            }
        }

        added_counts
    }
}

/// Loads and atomically persists a `Pool` to a JSON file on disk.
#[derive(Debug, Clone)]
pub struct PoolStore {
    pub path: std::path::PathBuf,
}

impl PoolStore {
    #[must_use]
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        PoolStore { path: path.into() }
    }

    /// Read the pool file. A missing or unreadable file is not an error —
    /// callers get an empty pool and can hydrate from there.
    #[must_use]
    pub fn load(&self) -> Pool {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|contents| serde_json::from_str(&contents).ok())
            .unwrap_or_default()
    }

    /// Write `pool` to disk atomically: serialize to a temp file in the same
    /// directory, rename the previous file to `.bak` (best-effort), then
    /// rename the temp file into place.
    pub fn save_atomic(&self, pool: &Pool) -> Result<(), ConfigError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .map_err(|e| ConfigError::PoolIo(e.to_string()))?;
        let serialized =
            serde_json::to_string_pretty(pool).map_err(|e| ConfigError::PoolIo(e.to_string()))?;
        tmp.write_all(serialized.as_bytes())
            .map_err(|e| ConfigError::PoolIo(e.to_string()))?;
        tmp.flush().map_err(|e| ConfigError::PoolIo(e.to_string()))?;

        if self.path.exists() {
            let backup = self.path.with_extension("bak");
            let _ = std::fs::rename(&self.path, backup);
        }

        tmp.persist(&self.path)
            .map_err(|e| ConfigError::PoolIo(e.error.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_word_uppercases_and_trims() {
        assert_eq!(normalize_word("  cat "), Some("CAT".to_string()));
        assert_eq!(normalize_word("a-b"), None);
        assert_eq!(normalize_word(""), None);
    }

    #[test]
    fn add_words_dedupes_and_buckets_by_length() {
        let mut pool = Pool::default();
        let added = pool.add_words(
            &["cat".to_string(), "CAT".to_string(), "dog".to_string()],
            10,
        );
        assert_eq!(pool.words_of_length(3), &["CAT".to_string(), "DOG".to_string()]);
        assert_eq!(added.get(&3), Some(&2));
    }

    #[test]
    fn add_words_rejects_out_of_range_lengths() {
        let mut pool = Pool::default();
        pool.add_words(&["ab".to_string(), "toolongforthispool".to_string()], 5);
        assert!(pool.by_length.is_empty());
    }

    #[test]
    fn save_atomic_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = PoolStore::new(dir.path().join("pool.json"));
        let mut pool = Pool::default();
        pool.add_words(&["cat".to_string(), "dog".to_string()], 10);

        store.save_atomic(&pool).unwrap();
        let loaded = store.load();
        assert_eq!(loaded.words_of_length(3), pool.words_of_length(3));
    }

    #[test]
    fn load_missing_file_returns_empty_pool() {
        let store = PoolStore::new("/nonexistent/path/pool.json");
        assert!(store.load().by_length.is_empty());
    }
}
