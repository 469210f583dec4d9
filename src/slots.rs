//! Slot extraction: scan a validated grid into Across/Down slots and the
//! crossing map between them.

use smallvec::SmallVec;

use crate::grid::{Cell, Grid};
use crate::types::{Coord, Direction, SlotId};

/// The expected maximum length for a single slot; grids longer than this
/// still work, they just spill `Slot::cells` onto the heap.
pub const MAX_SLOT_LENGTH: usize = 21;

/// Typical number of crossings a slot has, inline before spilling.
const TYPICAL_CROSSINGS: usize = 8;

/// A crossing between this slot and another, at a shared cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crossing {
    pub other_slot_id: SlotId,
    /// Position within *this* slot's cell list.
    pub at_this: usize,
    /// Position within the *other* slot's cell list.
    pub at_other: usize,
}

/// A maximal run of non-block cells in one direction.
#[derive(Debug, Clone)]
pub struct Slot {
    pub id: SlotId,
    pub direction: Direction,
    pub start: Coord,
    pub length: usize,
    pub cells: SmallVec<[Coord; MAX_SLOT_LENGTH]>,
    pub crossings: SmallVec<[Crossing; TYPICAL_CROSSINGS]>,
}

impl Slot {
    /// Human-readable id of the form `A0,4` / `D2,1`, stable for a given
    /// grid layout (direction + start coordinate).
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}{},{}", self.direction, self.start.row, self.start.col)
    }

    /// Render the slot's current pattern from the grid, using `unknown_char`
    /// for cells that are not yet fixed.
    #[must_use]
    pub fn pattern(&self, grid: &Grid, unknown_char: char) -> String {
        self.cells
            .iter()
            .map(|coord| match grid.get(coord.row, coord.col) {
                Cell::Letter(ch) => ch,
                _ => unknown_char,
            })
            .collect()
    }
}

/// Scan `grid` into Across and Down slots (in that order, Across first,
/// each direction scanned in reading order), filtering out runs shorter
/// than `grid.min_entry_len`, and compute the crossing map between them.
#[must_use]
pub fn build_slots(grid: &Grid) -> Vec<Slot> {
    let mut slots: Vec<Slot> = Vec::new();

    for run in grid.horizontal_runs() {
        if run.len < grid.min_entry_len {
            continue;
        }
        let cells = (0..run.len)
            .map(|i| Coord::new(run.start.row, run.start.col + i))
            .collect();
        slots.push(Slot {
            id: slots.len(),
            direction: Direction::Across,
            start: run.start,
            length: run.len,
            cells,
            crossings: SmallVec::new(),
        });
    }

    for run in grid.vertical_runs() {
        if run.len < grid.min_entry_len {
            continue;
        }
        let cells = (0..run.len)
            .map(|i| Coord::new(run.start.row + i, run.start.col))
            .collect();
        slots.push(Slot {
            id: slots.len(),
            direction: Direction::Down,
            start: run.start,
            length: run.len,
            cells,
            crossings: SmallVec::new(),
        });
    }

    compute_crossings(&mut slots);
    slots
}

/// Fill in each slot's `crossings` by intersecting cell coordinates between
/// Across and Down slots. Crossings are always symmetric: a recorded
/// `(A, D)` pair on `A` always has a matching `(D, A)` pair on `D`.
fn compute_crossings(slots: &mut [Slot]) {
    let across_ids: Vec<SlotId> = slots
        .iter()
        .filter(|s| s.direction == Direction::Across)
        .map(|s| s.id)
        .collect();
    let down_ids: Vec<SlotId> = slots
        .iter()
        .filter(|s| s.direction == Direction::Down)
        .map(|s| s.id)
        .collect();

    let mut pairs = Vec::new();
    for &a_id in &across_ids {
        for &d_id in &down_ids {
            let a_cells = &slots[a_id].cells;
            let d_cells = &slots[d_id].cells;
            for (at_this, a_coord) in a_cells.iter().enumerate() {
                if let Some(at_other) = d_cells.iter().position(|d_coord| d_coord == a_coord) {
                    pairs.push((a_id, at_this, d_id, at_other));
                }
            }
        }
    }

    for (a_id, at_this, d_id, at_other) in pairs {
        slots[a_id].crossings.push(Crossing {
            other_slot_id: d_id,
            at_this,
            at_other,
        });
        slots[d_id].crossings.push(Crossing {
            other_slot_id: a_id,
            at_this: at_other,
            at_other: at_this,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    #[test]
    fn no_blocks_yields_one_slot_per_row_and_column() {
        let grid = Grid::make_empty(5, 3);
        let slots = build_slots(&grid);
        assert_eq!(slots.len(), 10);
        assert!(slots.iter().all(|s| s.length == 5));
    }

    #[test]
    fn crossings_are_symmetric() {
        let grid = Grid::make_empty(5, 3);
        let slots = build_slots(&grid);
        for slot in &slots {
            for crossing in &slot.crossings {
                let other = &slots[crossing.other_slot_id];
                let back = other
                    .crossings
                    .iter()
                    .find(|c| c.other_slot_id == slot.id && c.at_this == crossing.at_other);
                assert!(back.is_some(), "missing reciprocal crossing");
                assert_eq!(back.unwrap().at_other, crossing.at_this);
            }
        }
    }

    #[test]
    fn short_runs_are_excluded() {
        let mut grid = Grid::make_empty(7, 4);
        grid.place_block_symmetric(0, 3).unwrap();
        let slots = build_slots(&grid);
        // Row 0 was split into two runs of length 3, below min_entry_len 4.
        assert!(slots
            .iter()
            .all(|s| !(s.direction == Direction::Across && s.start.row == 0)));
    }

    #[test]
    fn cell_belongs_to_exactly_one_across_and_one_down_slot() {
        let grid = Grid::make_empty(5, 3);
        let slots = build_slots(&grid);
        for r in 0..5 {
            for c in 0..5 {
                let coord = Coord::new(r, c);
                let across_count = slots
                    .iter()
                    .filter(|s| s.direction == Direction::Across && s.cells.contains(&coord))
                    .count();
                let down_count = slots
                    .iter()
                    .filter(|s| s.direction == Direction::Down && s.cells.contains(&coord))
                    .count();
                assert_eq!(across_count, 1);
                assert_eq!(down_count, 1);
            }
        }
    }
}
