//! MRV slot selection and LCV candidate ordering.

use std::collections::HashSet;

use crate::domain::DomainManager;
use crate::grid::Grid;
use crate::pattern_index::{Order, PatternIndex};
use crate::slots::Slot;
use crate::types::{SlotId, WordId};

/// A single MRV tie-break rule, applied in list order until one rule
/// distinguishes the candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TieBreak {
    /// More crossings first (more constraint propagation per placement).
    CrossingsDesc,
    /// Longer slots first (fewer long-word candidates tend to exist).
    LenDesc,
    /// Slot id ascending, for determinism as a last resort.
    AlphaAsc,
}

/// Default tie-break order per `spec.md` §4.5.
#[must_use]
pub fn default_tie_breaks() -> Vec<TieBreak> {
    vec![TieBreak::CrossingsDesc, TieBreak::LenDesc, TieBreak::AlphaAsc]
}

/// Choose the unassigned slot with the smallest domain, applying
/// `tie_breaks` in order to break ties. If `frontier_only` is set and at
/// least one unassigned slot crosses an already-assigned one, restrict the
/// search to that frontier; otherwise consider all unassigned slots.
#[must_use]
pub fn select_next_slot(
    slots: &[Slot],
    domains: &DomainManager,
    assigned: &HashSet<SlotId>,
    tie_breaks: &[TieBreak],
    frontier_only: bool,
) -> Option<SlotId> {
    let unassigned: Vec<SlotId> = (0..slots.len())
        .filter(|id| !assigned.contains(id))
        .collect();
    if unassigned.is_empty() {
        return None;
    }

    let candidates: Vec<SlotId> = if frontier_only {
        let frontier: Vec<SlotId> = unassigned
            .iter()
            .copied()
            .filter(|&id| {
                slots[id]
                    .crossings
                    .iter()
                    .any(|c| assigned.contains(&c.other_slot_id))
            })
            .collect();
        if frontier.is_empty() {
            unassigned
        } else {
            frontier
        }
    } else {
        unassigned
    };

    candidates.into_iter().min_by(|&a, &b| {
        let a_size = domains.domain(a).len();
        let b_size = domains.domain(b).len();
        a_size.cmp(&b_size).then_with(|| {
            for tb in tie_breaks {
                let ord = match tb {
                    TieBreak::CrossingsDesc => {
                        slots[b].crossings.len().cmp(&slots[a].crossings.len())
                    }
                    TieBreak::LenDesc => slots[b].length.cmp(&slots[a].length),
                    TieBreak::AlphaAsc => slots[a].label().cmp(&slots[b].label()),
                };
                if ord != std::cmp::Ordering::Equal {
                    return ord;
                }
            }
            std::cmp::Ordering::Equal
        })
    })
}

/// Cap on how many remaining candidates a single neighbor contributes to an
/// LCV score, so one very open crossing can't dominate the ranking.
pub const LCV_NEIGHBOR_CAP: usize = 50;

/// Order `domain`'s candidates for `slot`. At `lcv_depth == 0` this is
/// simply alphabetical; at `lcv_depth == 1`, each candidate is scored by
/// the (capped) number of options it would leave each crossing neighbor,
/// and higher-scoring (less constraining) candidates are tried first.
#[must_use]
pub fn order_candidates(
    slot: &Slot,
    domain: &[WordId],
    slots: &[Slot],
    grid: &Grid,
    index: &PatternIndex,
    unknown_char: char,
    lcv_depth: u8,
) -> Vec<WordId> {
    let mut words: Vec<(WordId, &str)> = domain
        .iter()
        .filter_map(|&id| index.word_at(slot.length, id).map(|w| (id, w)))
        .collect();

    if lcv_depth == 0 {
        words.sort_by_key(|&(_, w)| w);
        return words.into_iter().map(|(id, _)| id).collect();
    }

    let mut scored: Vec<(WordId, &str, usize)> = words
        .drain(..)
        .map(|(id, word)| {
            let score = lcv_score(slot, word, slots, grid, index, unknown_char);
            (id, word, score)
        })
        .collect();

    scored.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.1.cmp(b.1)));
    scored.into_iter().map(|(id, _, _)| id).collect()
}

fn lcv_score(
    slot: &Slot,
    candidate: &str,
    slots: &[Slot],
    grid: &Grid,
    index: &PatternIndex,
    unknown_char: char,
) -> usize {
    let candidate_chars: Vec<char> = candidate.chars().collect();
    let mut score = 0;

    for crossing in &slot.crossings {
        let neighbor = &slots[crossing.other_slot_id];
        let mut projected: Vec<char> = neighbor
            .pattern(grid, unknown_char)
            .chars()
            .collect();
        projected[crossing.at_other] = candidate_chars[crossing.at_this];
        let pattern: String = projected.into_iter().collect();

        let count = index
            .candidates_for_pattern(
                neighbor.length,
                &pattern,
                unknown_char,
                Order::AsIs,
                Some(LCV_NEIGHBOR_CAP),
            )
            .len();
        score += count.min(LCV_NEIGHBOR_CAP);
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slots::build_slots;
    use crate::word_list::Pool;
    use std::collections::HashSet;

    #[test]
    fn mrv_picks_smallest_domain() {
        let grid = Grid::make_empty(3, 3);
        let slots = build_slots(&grid);
        let mut pool = Pool::default();
        pool.add_words(&["CAT".into(), "DOG".into()], 3);
        let index = PatternIndex::build(&pool);
        let used = HashSet::new();
        let mut domains = crate::domain::DomainManager::init_domains(&slots, &grid, &index, &used, '_');
        domains.set_domain(0, vec![0]); // force slot 0 to the smallest domain

        let assigned = HashSet::new();
        let chosen = select_next_slot(&slots, &domains, &assigned, &default_tie_breaks(), false);
        assert_eq!(chosen, Some(0));
    }

    #[test]
    fn lcv_depth_zero_is_alphabetical() {
        let grid = Grid::make_empty(3, 3);
        let slots = build_slots(&grid);
        let mut pool = Pool::default();
        pool.add_words(&["DOG".into(), "CAT".into()], 3);
        let index = PatternIndex::build(&pool);
        let domain = index.candidates_for_pattern(3, "___", '_', Order::AsIs, None);
        let ordered = order_candidates(&slots[0], &domain, &slots, &grid, &index, '_', 0);
        let words: Vec<&str> = ordered.iter().map(|&id| index.word_at(3, id).unwrap()).collect();
        assert_eq!(words, vec!["CAT", "DOG"]);
    }

    #[test]
    fn frontier_falls_back_when_empty() {
        let grid = Grid::make_empty(3, 3);
        let slots = build_slots(&grid);
        let mut pool = Pool::default();
        pool.add_words(&["CAT".into()], 3);
        let index = PatternIndex::build(&pool);
        let used = HashSet::new();
        let domains = crate::domain::DomainManager::init_domains(&slots, &grid, &index, &used, '_');
        let assigned = HashSet::new();
        // No slot assigned yet, so frontier is empty and it must fall back.
        let chosen = select_next_slot(&slots, &domains, &assigned, &default_tie_breaks(), true);
        assert!(chosen.is_some());
    }
}
