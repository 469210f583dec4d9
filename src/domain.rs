//! Domain manager: the live, per-slot candidate lists that the backtracker
//! and heuristics read from.
//!
//! A domain is recomputed — not incrementally patched — whenever the grid
//! changes in a way that could affect it. This keeps the invariant in
//! `spec.md` §4.4 trivially true at the cost of some redundant pattern
//! queries, which is the right trade given `lcvDepth` is capped at 1 and
//! slots rarely have more than four crossings.

use std::collections::{HashMap, HashSet};

use crate::grid::Grid;
use crate::pattern_index::{Order, PatternIndex};
use crate::slots::Slot;
use crate::types::{SlotId, WordId};

/// A full copy of every slot's domain, for undo on backtrack.
pub type DomainSnapshot = HashMap<SlotId, Vec<WordId>>;

/// Per-slot candidate lists, kept consistent with the grid and the Used set.
#[derive(Debug, Default)]
pub struct DomainManager {
    domains: HashMap<SlotId, Vec<WordId>>,
}

impl DomainManager {
    /// Compute every slot's domain from scratch against the current grid
    /// and Used set.
    #[must_use]
    pub fn init_domains(
        slots: &[Slot],
        grid: &Grid,
        index: &PatternIndex,
        used: &HashSet<String>,
        unknown_char: char,
    ) -> DomainManager {
        let mut domains = HashMap::with_capacity(slots.len());
        for slot in slots {
            domains.insert(
                slot.id,
                Self::compute_domain_for(slot, grid, index, used, unknown_char),
            );
        }
        DomainManager { domains }
    }

    /// Recompute one slot's domain: words of its length matching its
    /// current grid pattern, minus anything already in `used`. Always
    /// alphabetically ordered.
    #[must_use]
    pub fn compute_domain_for(
        slot: &Slot,
        grid: &Grid,
        index: &PatternIndex,
        used: &HashSet<String>,
        unknown_char: char,
    ) -> Vec<WordId> {
        let pattern = slot.pattern(grid, unknown_char);
        index
            .candidates_for_pattern(slot.length, &pattern, unknown_char, Order::Alphabetical, None)
            .into_iter()
            .filter(|&id| {
                index
                    .word_at(slot.length, id)
                    .is_some_and(|w| !used.contains(w))
            })
            .collect()
    }

    #[must_use]
    pub fn domain(&self, slot_id: SlotId) -> &[WordId] {
        self.domains.get(&slot_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn set_domain(&mut self, slot_id: SlotId, domain: Vec<WordId>) {
        self.domains.insert(slot_id, domain);
    }

    /// Recompute the domain of every slot crossing `placed_slot_id`.
    /// Returns `(emptied, affected)`.
    pub fn recompute_after_placement(
        &mut self,
        placed_slot_id: SlotId,
        slots: &[Slot],
        grid: &Grid,
        index: &PatternIndex,
        used: &HashSet<String>,
        unknown_char: char,
    ) -> (Vec<SlotId>, Vec<SlotId>) {
        let mut emptied = Vec::new();
        let mut affected = Vec::new();

        for crossing in &slots[placed_slot_id].crossings {
            let neighbor_id = crossing.other_slot_id;
            let domain =
                Self::compute_domain_for(&slots[neighbor_id], grid, index, used, unknown_char);
            let is_empty = domain.is_empty();
            self.set_domain(neighbor_id, domain);
            affected.push(neighbor_id);
            if is_empty {
                emptied.push(neighbor_id);
            }
        }

        (emptied, affected)
    }

    #[must_use]
    pub fn snapshot_domains(&self) -> DomainSnapshot {
        self.domains.clone()
    }

    pub fn restore_domains_snapshot(&mut self, snapshot: DomainSnapshot) {
        self.domains = snapshot;
    }

    /// Remove `word` from every slot's domain whose length matches it.
    /// Returns the ids of slots whose domain actually changed.
    pub fn remove_word_from_all_domains(
        &mut self,
        word: &str,
        slots: &[Slot],
        index: &PatternIndex,
    ) -> Vec<SlotId> {
        let length = word.chars().count();
        let Some(word_id) = index.by_len(length).iter().position(|w| w == word) else {
            return Vec::new();
        };

        let mut affected = Vec::new();
        for slot in slots {
            if slot.length != length {
                continue;
            }
            if let Some(domain) = self.domains.get_mut(&slot.id) {
                let before = domain.len();
                domain.retain(|&id| id != word_id);
                if domain.len() != before {
                    affected.push(slot.id);
                }
            }
        }
        affected
    }
}
