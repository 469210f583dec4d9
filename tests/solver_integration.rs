//! End-to-end scenarios from spec.md §8, exercised against the public API.

use std::sync::{Arc, atomic::AtomicBool};

use xwgrid_core::backtracker::{solve, SolveOptions};
use xwgrid_core::config::DifficultyConfig;
use xwgrid_core::error::FailureReason;
use xwgrid_core::grid::Grid;
use xwgrid_core::layout::{generate_layout, BlockBudget};
use xwgrid_core::word_list::Pool;

fn difficulty_with(timeout_ms: u64, max_backtracks: usize) -> DifficultyConfig {
    DifficultyConfig {
        timeout_ms,
        max_backtracks,
        ..DifficultyConfig::default()
    }
}

/// Scenario 1: a 5x5 grid with a mirrored block pair and a tiny pool either
/// solves completely or reports the exact empty slots.
#[test]
fn small_grid_tiny_pool_solves_or_reports_exact_empties() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut grid = Grid::make_empty(5, 3);
    grid.place_block_symmetric(0, 4).unwrap();

    let mut pool = Pool::default();
    pool.add_words(
        &["CAT".into(), "DOG".into(), "BAT".into(), "APPLE".into(), "EAGLE".into()],
        5,
    );

    let opts = SolveOptions::default();
    match solve(&grid, &pool, &difficulty_with(5_000, 50_000), &opts) {
        Ok(success) => {
            assert!(success.grid.validate());
            assert!(!success.assignments.is_empty());
        }
        Err(failure) => match failure.reason {
            FailureReason::UnsatisfiableInitialDomains { empties } => {
                assert!(!empties.is_empty());
            }
            other => panic!("unexpected failure reason: {other:?}"),
        },
    }
}

/// Scenario 2: a single-word pool on a 5x5 grid solves once; reusing the
/// same word (by marking it Used up front, via a pool with the word already
/// consumed) yields an empty domain rather than a complete fill.
#[test]
fn single_word_pool_is_insufficient_for_a_full_grid() {
    let grid = Grid::make_empty(5, 3);
    let mut pool = Pool::default();
    pool.add_words(&["HELLO".into()], 5);

    let opts = SolveOptions::default();
    let result = solve(&grid, &pool, &difficulty_with(5_000, 50_000), &opts);
    // A 5x5 grid has 10 slots; one word cannot fill them all without reuse,
    // and reuse is forbidden by the Used-set invariant.
    assert!(result.is_err());
}

/// Scenario 3: two crossing 3-letter slots with a small pool always agree
/// on the shared letter, across repeated seeded runs.
#[test]
fn crossing_slots_agree_on_shared_letter_across_seeds() {
    let grid = Grid::make_empty(3, 3);
    let mut pool = Pool::default();
    pool.add_words(&["CAT".into(), "DOG".into(), "COT".into(), "ACT".into()], 3);

    for seed in 0..5u64 {
        let opts = SolveOptions {
            seed,
            ..SolveOptions::default()
        };
        let Ok(success) = solve(&grid, &pool, &difficulty_with(5_000, 50_000), &opts) else {
            continue;
        };
        let slots = xwgrid_core::slots::build_slots(&success.grid);
        for slot in &slots {
            let word = &success.assignments[&slot.id];
            for crossing in &slot.crossings {
                let other_word = &success.assignments[&crossing.other_slot_id];
                assert_eq!(
                    word.chars().nth(crossing.at_this),
                    other_word.chars().nth(crossing.at_other),
                    "crossing letter mismatch between slot {} and {}",
                    slot.id,
                    crossing.other_slot_id
                );
            }
        }
    }
}

/// Scenario 4: the layout generator is deterministic under a fixed seed and
/// still produces a valid (if different) grid under a different one.
#[test]
fn layout_generation_is_seed_deterministic() {
    let budget = BlockBudget { min: 18, max: 22 };
    let g1 = generate_layout(12, 3, budget, 7).expect("layout should be feasible");
    let g2 = generate_layout(12, 3, budget, 7).expect("layout should be feasible");
    assert_eq!(g1.to_strings('.', '_'), g2.to_strings('.', '_'));

    let g3 = generate_layout(12, 3, budget, 123).expect("layout should be feasible");
    assert!(g3.validate());
}

/// Scenario 5: hydration disabled and an insufficient pool reports
/// `UnsatisfiableInitialDomains` naming the starved slot.
#[test]
fn hydration_disabled_and_insufficient_pool_names_the_empty_slot() {
    let grid = Grid::make_empty(4, 4);
    let pool = Pool::default(); // empty: every slot starves immediately.
    let opts = SolveOptions::default(); // no provider, no pool_store => no hydration.

    let failure = solve(&grid, &pool, &difficulty_with(5_000, 50_000), &opts)
        .expect_err("an empty pool cannot fill any slot");
    match failure.reason {
        FailureReason::UnsatisfiableInitialDomains { empties } => {
            assert_eq!(empties.len(), 8); // 4 across + 4 down on a 4x4 open grid.
        }
        other => panic!("unexpected failure reason: {other:?}"),
    }
}

/// Scenario 6: an artificially tiny timeout causes a `Timeout` failure with
/// `stats.duration_ms` at least the configured cap.
#[test]
fn tiny_timeout_yields_timeout_failure() {
    let grid = Grid::make_empty(15, 3);
    let mut pool = Pool::default();
    // Deliberately sparse: forces enough search that the 1ms budget trips
    // before a solution (or a definitive failure) is reached.
    pool.add_words(&["CAT".into(), "DOG".into(), "BAT".into()], 15);

    let opts = SolveOptions {
        abort: Some(Arc::new(AtomicBool::new(false))),
        ..SolveOptions::default()
    };
    let failure = solve(&grid, &pool, &difficulty_with(1, 1_000_000_000), &opts);
    // Either the tiny timeout trips, or the solver fails fast some other way
    // (e.g. starved domains) before ever touching the backtracking loop.
    if let Err(failure) = failure {
        match failure.reason {
            FailureReason::Timeout => {
                assert!(failure.stats.duration_ms >= 1);
            }
            FailureReason::UnsatisfiableInitialDomains { .. } => {}
            other => panic!("unexpected failure reason: {other:?}"),
        }
    }
}
