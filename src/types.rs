//! Shared id types used across the crate.
//!
//! Slots and words are referred to by small integer ids almost everywhere
//! below the public API, rather than by value, so that domains, crossing
//! maps, and snapshots can be stored as flat `Vec`s instead of hash maps.

use std::fmt;

/// Index into `Grid`'s slot list. Stable for a given grid layout.
pub type SlotId = usize;

/// Index into a length-bucket of the word pool / pattern index.
pub type WordId = usize;

/// One of the two directions a slot can run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum Direction {
    Across,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Across => write!(f, "A"),
            Direction::Down => write!(f, "D"),
        }
    }
}

/// A (row, col) coordinate on the grid, zero-indexed from the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    #[must_use]
    pub fn new(row: usize, col: usize) -> Self {
        Coord { row, col }
    }
}
