//! Difficulty configuration: a base plus an exact-level override.
//!
//! `spec.md` §9 notes the source had at least two merge policies for this
//! ("nearest level below" vs. "exact level"); this crate implements exact
//! level with fallback to a default level, per the spec's resolution.

use std::collections::HashMap;

use crate::heuristics::{default_tie_breaks, TieBreak};
use crate::layout::BlockBudget;

/// A fully merged configuration for one solve attempt.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DifficultyConfig {
    pub block_budget: BlockBudget,
    pub timeout_ms: u64,
    pub max_backtracks: usize,
    pub lcv_depth: u8,
    pub tie_break: Vec<TieBreak>,
    pub shuffle_candidates: bool,
    pub hydrate_if_below: usize,
    pub onelook_max: usize,
    pub allow_rescue_blocks: bool,
    pub max_rescue_pairs: usize,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        DifficultyConfig {
            block_budget: BlockBudget { min: 18, max: 24 },
            timeout_ms: 5_000,
            max_backtracks: 50_000,
            lcv_depth: 1,
            tie_break: default_tie_breaks(),
            shuffle_candidates: false,
            hydrate_if_below: 3,
            onelook_max: 25,
            allow_rescue_blocks: true,
            max_rescue_pairs: 3,
        }
    }
}

/// The default difficulty level used when a requested level is missing
/// from the override table.
pub const DEFAULT_LEVEL: u8 = 4;

/// A difficulty override: any subset of `DifficultyConfig`'s fields,
/// layered on top of the base config for one level.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct DifficultyOverride {
    pub block_budget: Option<BlockBudget>,
    pub timeout_ms: Option<u64>,
    pub max_backtracks: Option<usize>,
    pub lcv_depth: Option<u8>,
    pub tie_break: Option<Vec<TieBreak>>,
    pub shuffle_candidates: Option<bool>,
    pub hydrate_if_below: Option<usize>,
    pub onelook_max: Option<usize>,
    pub allow_rescue_blocks: Option<bool>,
    pub max_rescue_pairs: Option<usize>,
}

impl DifficultyOverride {
    fn apply_to(&self, base: &mut DifficultyConfig) {
        if let Some(v) = self.block_budget {
            base.block_budget = v;
        }
        if let Some(v) = self.timeout_ms {
            base.timeout_ms = v;
        }
        if let Some(v) = self.max_backtracks {
            base.max_backtracks = v;
        }
        if let Some(v) = self.lcv_depth {
            base.lcv_depth = v;
        }
        if let Some(v) = self.tie_break.clone() {
            base.tie_break = v;
        }
        if let Some(v) = self.shuffle_candidates {
            base.shuffle_candidates = v;
        }
        if let Some(v) = self.hydrate_if_below {
            base.hydrate_if_below = v;
        }
        if let Some(v) = self.onelook_max {
            base.onelook_max = v;
        }
        if let Some(v) = self.allow_rescue_blocks {
            base.allow_rescue_blocks = v;
        }
        if let Some(v) = self.max_rescue_pairs {
            base.max_rescue_pairs = v;
        }
    }
}

/// `base` plus per-level overrides, keyed `1..=7`.
#[derive(Debug, Clone, Default)]
pub struct DifficultyTable {
    pub base: DifficultyConfig,
    pub levels: HashMap<u8, DifficultyOverride>,
}

impl DifficultyTable {
    /// Resolve the config for `level`: the base merged with that exact
    /// level's override. If `level` has no entry, fall back to
    /// `DEFAULT_LEVEL`'s override (or the bare base, if even that is
    /// missing) — never "nearest level below".
    #[must_use]
    pub fn resolve(&self, level: u8) -> DifficultyConfig {
        let mut config = self.base.clone();
        let chosen = self
            .levels
            .get(&level)
            .or_else(|| self.levels.get(&DEFAULT_LEVEL));
        if let Some(over) = chosen {
            over.apply_to(&mut config);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_level_falls_back_to_default_level() {
        let mut table = DifficultyTable {
            base: DifficultyConfig::default(),
            levels: HashMap::new(),
        };
        table.levels.insert(
            DEFAULT_LEVEL,
            DifficultyOverride {
                max_backtracks: Some(42),
                ..Default::default()
            },
        );
        let resolved = table.resolve(99);
        assert_eq!(resolved.max_backtracks, 42);
    }

    #[test]
    fn exact_level_match_wins_over_default() {
        let mut table = DifficultyTable {
            base: DifficultyConfig::default(),
            levels: HashMap::new(),
        };
        table.levels.insert(
            DEFAULT_LEVEL,
            DifficultyOverride {
                max_backtracks: Some(1),
                ..Default::default()
            },
        );
        table.levels.insert(
            2,
            DifficultyOverride {
                max_backtracks: Some(2),
                ..Default::default()
            },
        );
        assert_eq!(table.resolve(2).max_backtracks, 2);
    }

    #[test]
    fn no_matching_level_at_all_returns_base() {
        let table = DifficultyTable {
            base: DifficultyConfig::default(),
            levels: HashMap::new(),
        };
        let resolved = table.resolve(3);
        assert_eq!(resolved.max_backtracks, table.base.max_backtracks);
    }
}
