//! Grid model: cells, symmetric block placement, and the invariants every
//! other component assumes hold (symmetry, minimum run length,
//! connectivity).
//!
//! All mutating operations either succeed and leave the grid in a valid
//! state, or fail and leave the grid byte-identical to before the call —
//! there is no partial-failure state to clean up.

use std::collections::VecDeque;

use crate::error::ConfigError;
use crate::types::Coord;
use crate::word_list::is_alphabet_char;

/// Contents of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Cell {
    /// Opaque, unusable cell.
    Block,
    /// Usable cell with no letter assigned yet.
    Empty,
    /// Usable cell with a fixed letter (prefill or a placed answer).
    Letter(char),
}

impl Cell {
    #[must_use]
    pub fn is_block(self) -> bool {
        matches!(self, Cell::Block)
    }
}

/// A maximal run of non-block cells, found by `horizontal_runs`/`vertical_runs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub start: Coord,
    pub len: usize,
}

/// Square grid of `Cell`s with a configurable minimum entry length.
#[derive(Debug, Clone)]
pub struct Grid {
    pub size: usize,
    pub min_entry_len: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Build an `size x size` grid with every cell empty.
    #[must_use]
    pub fn make_empty(size: usize, min_entry_len: usize) -> Grid {
        Grid {
            size,
            min_entry_len,
            cells: vec![Cell::Empty; size * size],
        }
    }

    fn index(&self, r: usize, c: usize) -> usize {
        r * self.size + c
    }

    fn mirror(&self, r: usize, c: usize) -> (usize, usize) {
        (self.size - 1 - r, self.size - 1 - c)
    }

    #[must_use]
    pub fn get(&self, r: usize, c: usize) -> Cell {
        self.cells[self.index(r, c)]
    }

    fn set(&mut self, r: usize, c: usize, cell: Cell) {
        let idx = self.index(r, c);
        self.cells[idx] = cell;
    }

    #[must_use]
    pub fn in_bounds(&self, r: usize, c: usize) -> bool {
        r < self.size && c < self.size
    }

    /// Place a block at `(r, c)` and its 180-degree mirror. Fails, leaving
    /// the grid unchanged, if either target cell holds a fixed letter, if
    /// the placement would leave a run of length 1 or 2 in either
    /// direction, or if it would disconnect the remaining non-block cells.
    pub fn place_block_symmetric(&mut self, r: usize, c: usize) -> Result<(), ConfigError> {
        if !self.in_bounds(r, c) {
            return Err(ConfigError::UnknownGridSize(self.size));
        }
        let (mr, mc) = self.mirror(r, c);

        if matches!(self.get(r, c), Cell::Letter(_)) || matches!(self.get(mr, mc), Cell::Letter(_))
        {
            return Err(ConfigError::BlockPlacementRejected(r, c));
        }
        if self.get(r, c).is_block() && self.get(mr, mc).is_block() {
            // Already blocks; nothing to do, and re-placing can't change
            // validity, but treat as a no-op success rather than failure.
            return Ok(());
        }

        let mut trial = self.clone();
        trial.set(r, c, Cell::Block);
        trial.set(mr, mc, Cell::Block);

        if trial.has_short_run() || !trial.is_connected() {
            return Err(ConfigError::BlockPlacementRejected(r, c));
        }

        *self = trial;
        Ok(())
    }

    /// Inverse of `place_block_symmetric`: set both `(r, c)` and its mirror
    /// back to `Empty`.
    pub fn remove_block_symmetric(&mut self, r: usize, c: usize) -> Result<(), ConfigError> {
        if !self.in_bounds(r, c) {
            return Err(ConfigError::UnknownGridSize(self.size));
        }
        let (mr, mc) = self.mirror(r, c);
        self.set(r, c, Cell::Empty);
        self.set(mr, mc, Cell::Empty);
        Ok(())
    }

    /// Set a single non-block cell to a fixed letter.
    pub fn place_letter(&mut self, r: usize, c: usize, ch: char) -> Result<(), ConfigError> {
        let ch = ch.to_ascii_uppercase();
        if !is_alphabet_char(ch) {
            return Err(ConfigError::InvalidCharacterConstants);
        }
        if !self.in_bounds(r, c) || self.get(r, c).is_block() {
            return Err(ConfigError::InvalidCharacterConstants);
        }
        self.set(r, c, Cell::Letter(ch));
        Ok(())
    }

    /// Clear a single non-block cell back to `Empty`.
    pub fn clear_cell(&mut self, r: usize, c: usize) -> Result<(), ConfigError> {
        if !self.in_bounds(r, c) || self.get(r, c).is_block() {
            return Err(ConfigError::InvalidCharacterConstants);
        }
        self.set(r, c, Cell::Empty);
        Ok(())
    }

    /// Does the block pattern hold under 180-degree rotation?
    #[must_use]
    pub fn is_symmetric(&self) -> bool {
        for r in 0..self.size {
            for c in 0..self.size {
                let (mr, mc) = self.mirror(r, c);
                if self.get(r, c).is_block() != self.get(mr, mc).is_block() {
                    return false;
                }
            }
        }
        true
    }

    /// Does any maximal horizontal or vertical run fall below `min_entry_len`?
    #[must_use]
    pub fn has_short_run(&self) -> bool {
        self.horizontal_runs()
            .iter()
            .chain(self.vertical_runs().iter())
            .any(|run| run.len > 0 && run.len < self.min_entry_len)
    }

    /// Do the non-block cells form a single 4-connected component?
    #[must_use]
    pub fn is_connected(&self) -> bool {
        let total_non_block = self.cells.iter().filter(|c| !c.is_block()).count();
        if total_non_block == 0 {
            return true;
        }

        let start = (0..self.size * self.size).find(|&i| !self.cells[i].is_block());
        let Some(start) = start else {
            return true;
        };

        let mut seen = vec![false; self.size * self.size];
        let mut queue = VecDeque::new();
        queue.push_back(start);
        seen[start] = true;
        let mut visited = 0;

        while let Some(idx) = queue.pop_front() {
            visited += 1;
            let r = idx / self.size;
            let c = idx % self.size;
            let neighbors = [
                (r.checked_sub(1), Some(c)),
                (Some(r + 1).filter(|&r| r < self.size), Some(c)),
                (Some(r), c.checked_sub(1)),
                (Some(r), Some(c + 1).filter(|&c| c < self.size)),
            ];
            for (nr, nc) in neighbors {
                if let (Some(nr), Some(nc)) = (nr, nc) {
                    let nidx = self.index(nr, nc);
                    if !seen[nidx] && !self.cells[nidx].is_block() {
                        seen[nidx] = true;
                        queue.push_back(nidx);
                    }
                }
            }
        }

        visited == total_non_block
    }

    /// Do symmetry, minimum-run, and connectivity all hold?
    #[must_use]
    pub fn validate(&self) -> bool {
        self.is_symmetric() && !self.has_short_run() && self.is_connected()
    }

    /// Enumerate maximal horizontal (left-to-right) non-block runs.
    #[must_use]
    pub fn horizontal_runs(&self) -> Vec<Run> {
        let mut runs = Vec::new();
        for r in 0..self.size {
            let mut c = 0;
            while c < self.size {
                if self.get(r, c).is_block() {
                    c += 1;
                    continue;
                }
                let start = c;
                while c < self.size && !self.get(r, c).is_block() {
                    c += 1;
                }
                runs.push(Run {
                    start: Coord::new(r, start),
                    len: c - start,
                });
            }
        }
        runs
    }

    /// Enumerate maximal vertical (top-to-bottom) non-block runs.
    #[must_use]
    pub fn vertical_runs(&self) -> Vec<Run> {
        let mut runs = Vec::new();
        for c in 0..self.size {
            let mut r = 0;
            while r < self.size {
                if self.get(r, c).is_block() {
                    r += 1;
                    continue;
                }
                let start = r;
                while r < self.size && !self.get(r, c).is_block() {
                    r += 1;
                }
                runs.push(Run {
                    start: Coord::new(start, c),
                    len: r - start,
                });
            }
        }
        runs
    }

    /// Render the grid to `size` strings, using `block_char` and
    /// `unknown_char` for block and empty cells respectively, per
    /// `spec.md` §6.
    #[must_use]
    pub fn to_strings(&self, block_char: char, unknown_char: char) -> Vec<String> {
        (0..self.size)
            .map(|r| {
                (0..self.size)
                    .map(|c| match self.get(r, c) {
                        Cell::Block => block_char,
                        Cell::Empty => unknown_char,
                        Cell::Letter(ch) => ch,
                    })
                    .collect()
            })
            .collect()
    }

    /// Parse a grid back from `size` strings of length `size`, the inverse
    /// of `to_strings`.
    pub fn from_strings(
        rows: &[String],
        block_char: char,
        unknown_char: char,
        min_entry_len: usize,
    ) -> Result<Grid, ConfigError> {
        let size = rows.len();
        if size == 0 || rows.iter().any(|row| row.chars().count() != size) {
            return Err(ConfigError::UnknownGridSize(size));
        }
        let mut grid = Grid::make_empty(size, min_entry_len);
        for (r, row) in rows.iter().enumerate() {
            for (c, ch) in row.chars().enumerate() {
                if ch == block_char {
                    grid.set(r, c, Cell::Block);
                } else if ch == unknown_char {
                    grid.set(r, c, Cell::Empty);
                } else {
                    grid.place_letter(r, c, ch)?;
                }
            }
        }
        Ok(grid)
    }
}
