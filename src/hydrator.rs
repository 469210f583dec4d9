//! On-the-fly domain expansion via an external pattern-lookup provider.
//!
//! The Hydrator is the one place in the solver that can block on network
//! I/O; everywhere else (`backtracker`, `domain`, `heuristics`) is pure
//! CPU-bound work. Failures here are soft: a failed fetch just means zero
//! new words, logged and moved on from.

use std::collections::{HashMap, HashSet};

use crate::domain::DomainManager;
use crate::grid::Grid;
use crate::pattern_index::PatternIndex;
use crate::slots::Slot;
use crate::types::SlotId;
use crate::word_list::{normalize_word, Pool, PoolStore};

/// Anything that can answer "give me up to `max` words matching `pattern`",
/// where `pattern` uses `?` as the wildcard. Implemented over HTTP by
/// `HttpWordLookupProvider`; tests use an in-memory fake.
pub trait WordLookupProvider {
    fn fetch(&self, pattern: &str, max: usize) -> Vec<String>;
}

/// Blocking HTTP provider: `GET {endpoint}?pattern=...&max=...`. Non-2xx or
/// network errors return an empty list rather than erroring, per
/// `spec.md` §4.7.
pub struct HttpWordLookupProvider {
    pub endpoint: String,
    client: reqwest::blocking::Client,
}

impl HttpWordLookupProvider {
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        HttpWordLookupProvider {
            endpoint: endpoint.into(),
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl WordLookupProvider for HttpWordLookupProvider {
    fn fetch(&self, pattern: &str, max: usize) -> Vec<String> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("pattern", pattern), ("max", &max.to_string())])
            .send();

        match response {
            Ok(resp) if resp.status().is_success() => {
                resp.json::<Vec<String>>().unwrap_or_default()
            }
            Ok(resp) => {
                log::warn!("word lookup provider returned status {}", resp.status());
                Vec::new()
            }
            Err(err) => {
                log::warn!("word lookup provider request failed: {err}");
                Vec::new()
            }
        }
    }
}

/// Bounded per-run cache plus nogood tracking for the Hydrator.
pub struct Hydrator<'a> {
    provider: &'a dyn WordLookupProvider,
    pool_store: &'a PoolStore,
    cache: HashMap<(usize, String), Vec<String>>,
    nogoods: HashSet<(SlotId, String)>,
    wildcard: char,
    max_results: usize,
}

impl<'a> Hydrator<'a> {
    #[must_use]
    pub fn new(provider: &'a dyn WordLookupProvider, pool_store: &'a PoolStore, max_results: usize) -> Self {
        Hydrator {
            provider,
            pool_store,
            cache: HashMap::new(),
            nogoods: HashSet::new(),
            wildcard: '?',
            max_results,
        }
    }

    /// Should we try to hydrate a slot whose live domain has `domain_size`
    /// candidates, given `hydrate_if_below`?
    #[must_use]
    pub fn should_hydrate(domain_size: usize, hydrate_if_below: usize) -> bool {
        domain_size < hydrate_if_below
    }

    /// Render `slot`'s current cells as a pattern using the provider's
    /// wildcard character.
    #[must_use]
    pub fn pattern_for_slot(&self, grid: &Grid, slot: &Slot) -> String {
        slot.pattern(grid, self.wildcard)
    }

    /// Has this `(slot, pattern)` already been exhausted unsuccessfully in
    /// this run?
    #[must_use]
    pub fn is_nogood(&self, slot_id: SlotId, pattern: &str) -> bool {
        self.nogoods.contains(&(slot_id, pattern.to_string()))
    }

    /// Record that a frame for `(slot_id, pattern)` ran out of candidates,
    /// so a later dead-domain rescue doesn't re-fetch the same pattern.
    pub fn mark_exhausted(&mut self, slot_id: SlotId, pattern: String) {
        self.nogoods.insert((slot_id, pattern));
    }

    /// Fetch, filter, merge, and extend. Returns `true` if the slot's domain
    /// grew. On a cache hit or provider miss, records a nogood so this run
    /// doesn't retry the same pattern.
    pub fn hydrate_slot(
        &mut self,
        pool: &mut Pool,
        index: &mut PatternIndex,
        domains: &mut DomainManager,
        slots: &[Slot],
        grid: &Grid,
        slot: &Slot,
        used: &HashSet<String>,
        max_length: usize,
    ) -> bool {
        let pattern = self.pattern_for_slot(grid, slot);
        let key = (slot.length, pattern.clone());

        let fetched = if let Some(cached) = self.cache.get(&key) {
            cached.clone()
        } else {
            let fetched = self.provider.fetch(&pattern, self.max_results);
            self.cache.insert(key, fetched.clone());
            fetched
        };

        let new_words: Vec<String> = fetched
            .into_iter()
            .filter_map(|raw| normalize_word(&raw))
            .filter(|w| w.chars().count() == slot.length && !used.contains(w))
            .collect();

        if new_words.is_empty() {
            self.nogoods.insert((slot.id, pattern));
            return false;
        }

        let existing: HashSet<&str> = index.by_len(slot.length).iter().map(String::as_str).collect();
        let genuinely_new: Vec<String> = new_words
            .iter()
            .filter(|w| !existing.contains(w.as_str()))
            .cloned()
            .collect();

        if !genuinely_new.is_empty() {
            pool.add_words(&genuinely_new, max_length);
            // Append rather than rebuild: a full `PatternIndex::build` would
            // re-sort each length bucket and reassign every `WordId` at or
            // after the insertion point, silently invalidating every other
            // slot's already-computed domain for this word length.
            index.append_words(slot.length, &genuinely_new);
            if let Err(err) = self.pool_store.save_atomic(pool) {
                log::warn!("failed to persist hydrated pool: {err}");
            }
        }

        let recomputed = DomainManager::compute_domain_for(slot, grid, index, used, self.wildcard);
        let grew = recomputed.len() > domains.domain(slot.id).len();
        domains.set_domain(slot.id, recomputed);

        if !grew {
            self.nogoods.insert((slot.id, pattern));
        }

        // Crossing neighbors may also have gained options from the newly
        // hydrated words sharing letters with them, though only this
        // slot's own domain is guaranteed non-empty by this call.
        let _ = slots;
        grew
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slots::build_slots;

    struct FakeProvider(Vec<String>);
    impl WordLookupProvider for FakeProvider {
        fn fetch(&self, _pattern: &str, max: usize) -> Vec<String> {
            self.0.iter().take(max).cloned().collect()
        }
    }

    #[test]
    fn should_hydrate_threshold() {
        assert!(Hydrator::should_hydrate(2, 5));
        assert!(!Hydrator::should_hydrate(5, 5));
    }

    #[test]
    fn hydrate_slot_extends_domain_on_success() {
        let grid = Grid::make_empty(3, 3);
        let slots = build_slots(&grid);
        let mut pool = Pool::default();
        let mut index = PatternIndex::build(&pool);
        let used = HashSet::new();
        let mut domains = DomainManager::init_domains(&slots, &grid, &index, &used, '_');

        let provider = FakeProvider(vec!["CAT".to_string()]);
        let dir = tempfile::tempdir().unwrap();
        let store = PoolStore::new(dir.path().join("pool.json"));
        let mut hydrator = Hydrator::new(&provider, &store, 10);

        assert_eq!(domains.domain(0).len(), 0);
        let grew = hydrator.hydrate_slot(
            &mut pool,
            &mut index,
            &mut domains,
            &slots,
            &grid,
            &slots[0],
            &used,
            10,
        );
        assert!(grew);
        assert_eq!(domains.domain(0).len(), 1);
    }

    #[test]
    fn hydrate_slot_records_nogood_on_empty_result() {
        let grid = Grid::make_empty(3, 3);
        let slots = build_slots(&grid);
        let mut pool = Pool::default();
        let mut index = PatternIndex::build(&pool);
        let used = HashSet::new();
        let mut domains = DomainManager::init_domains(&slots, &grid, &index, &used, '_');

        let provider = FakeProvider(vec![]);
        let dir = tempfile::tempdir().unwrap();
        let store = PoolStore::new(dir.path().join("pool.json"));
        let mut hydrator = Hydrator::new(&provider, &store, 10);

        let grew = hydrator.hydrate_slot(
            &mut pool, &mut index, &mut domains, &slots, &grid, &slots[0], &used, 10,
        );
        assert!(!grew);
        assert!(hydrator.is_nogood(0, &"___".to_string()));
    }
}
