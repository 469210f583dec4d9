//! Layout generator: produces a symmetric block pattern within a block
//! count budget via repeated "center-split" of the longest available run.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::grid::{Grid, Run};
use crate::types::Direction;

/// Target range for the total number of block cells in the generated grid.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct BlockBudget {
    pub min: usize,
    pub max: usize,
}

impl BlockBudget {
    fn target(&self) -> usize {
        let mid = (self.min + self.max) / 2;
        mid + (mid % 2)
    }
}

/// A run considered for splitting, tagged with its direction so we can
/// convert a split index back to grid coordinates.
struct CandidateRun {
    run: Run,
    direction: Direction,
}

/// Generate a grid of `size x size` satisfying symmetry, minimum-run, and
/// connectivity invariants, with a block count inside `budget`. Returns
/// `None` if no legal placement sequence reaches a valid grid — the caller
/// may retry with a different seed.
#[must_use]
pub fn generate_layout(
    size: usize,
    min_entry_len: usize,
    budget: BlockBudget,
    seed: u64,
) -> Option<Grid> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut grid = Grid::make_empty(size, min_entry_len);
    let target = budget.target();

    loop {
        let current = block_count(&grid);
        if current >= target {
            break;
        }

        let mut candidate_runs = splittable_runs(&grid);
        if candidate_runs.is_empty() {
            break;
        }

        // Longest run first; shuffle ties for variety.
        candidate_runs.shuffle(&mut rng);
        candidate_runs.sort_by_key(|c| std::cmp::Reverse(c.run.len));

        let mut placed = false;
        for candidate in &candidate_runs {
            if try_split_run(&mut grid, candidate, &mut rng) {
                placed = true;
                break;
            }
        }
        if !placed {
            break;
        }
    }

    if grid.validate() {
        Some(grid)
    } else {
        None
    }
}

/// Add one more symmetric block pair via a single center-split iteration,
/// for the Backtracker's rescue mechanism on repeated dead-ends.
#[must_use]
pub fn add_rescue_block_pair(grid: &mut Grid, seed: u64) -> bool {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut candidate_runs = splittable_runs(grid);
    if candidate_runs.is_empty() {
        return false;
    }
    candidate_runs.shuffle(&mut rng);
    candidate_runs.sort_by_key(|c| std::cmp::Reverse(c.run.len));

    for candidate in &candidate_runs {
        if try_split_run(grid, candidate, &mut rng) {
            return true;
        }
    }
    false
}

fn block_count(grid: &Grid) -> usize {
    (0..grid.size)
        .flat_map(|r| (0..grid.size).map(move |c| (r, c)))
        .filter(|&(r, c)| grid.get(r, c).is_block())
        .count()
}

/// Runs long enough that a single block split still leaves two legal
/// entries: length >= 2 * min_entry_len + 1.
fn splittable_runs(grid: &Grid) -> Vec<CandidateRun> {
    let mut runs = Vec::new();
    let threshold = 2 * grid.min_entry_len + 1;

    for run in grid.horizontal_runs() {
        if run.len >= threshold {
            runs.push(CandidateRun {
                run,
                direction: Direction::Across,
            });
        }
    }
    for run in grid.vertical_runs() {
        if run.len >= threshold {
            runs.push(CandidateRun {
                run,
                direction: Direction::Down,
            });
        }
    }
    runs
}

/// Try every legal split index within `candidate`, centers first and
/// alternating outward, until one yields a valid symmetric block placement.
fn try_split_run(grid: &mut Grid, candidate: &CandidateRun, rng: &mut SmallRng) -> bool {
    let low = grid.min_entry_len;
    let high = candidate.run.len.saturating_sub(grid.min_entry_len + 1);
    if low > high {
        return false;
    }

    for i in center_out_order(low, high, rng) {
        let (r, c) = match candidate.direction {
            Direction::Across => (candidate.run.start.row, candidate.run.start.col + i),
            Direction::Down => (candidate.run.start.row + i, candidate.run.start.col),
        };
        if grid.place_block_symmetric(r, c).is_ok() {
            return true;
        }
    }
    false
}

/// Indices `low..=high` ordered by distance from the center, ties between
/// equidistant neighbors broken randomly.
fn center_out_order(low: usize, high: usize, rng: &mut SmallRng) -> Vec<usize> {
    let center = (low as f64 + high as f64) / 2.0;
    let mut indices: Vec<usize> = (low..=high).collect();
    indices.shuffle(rng); // randomize equidistant ties
    indices.sort_by(|&a, &b| {
        let da = (a as f64 - center).abs();
        let db = (b as f64 - center).abs();
        da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
    });
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_layout_validates_and_respects_budget() {
        let budget = BlockBudget { min: 18, max: 22 };
        let grid = generate_layout(12, 3, budget, 1).expect("layout should be feasible");
        assert!(grid.validate());
        let count = block_count(&grid);
        // The center-split process may stop short of the target if no more
        // legal splits exist, and the last accepted pair can push it one
        // pair past the target, but it should stay in the budget's vicinity.
        assert!(count <= budget.max + 2);
    }

    #[test]
    fn same_seed_is_deterministic() {
        let budget = BlockBudget { min: 18, max: 22 };
        let g1 = generate_layout(12, 3, budget, 42).unwrap();
        let g2 = generate_layout(12, 3, budget, 42).unwrap();
        assert_eq!(g1.to_strings('.', '_'), g2.to_strings('.', '_'));
    }

    #[test]
    fn different_seed_still_validates() {
        let budget = BlockBudget { min: 18, max: 22 };
        let g2 = generate_layout(12, 3, budget, 99).unwrap();
        assert!(g2.validate());
    }

    #[test]
    fn rescue_block_pair_preserves_validity() {
        let budget = BlockBudget { min: 10, max: 12 };
        let mut grid = generate_layout(9, 3, budget, 7).unwrap();
        let before = grid.clone();
        if add_rescue_block_pair(&mut grid, 8) {
            assert!(grid.validate());
        } else {
            assert_eq!(grid.to_strings('.', '_'), before.to_strings('.', '_'));
        }
    }
}
