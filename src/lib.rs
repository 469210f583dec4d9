#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::comparison_chain)]
#![allow(clippy::implicit_hasher)]
#![allow(clippy::match_on_vec_items)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

//! Crossword grid generator and constraint-based filler.
//!
//! [`layout`] produces a symmetric block pattern, [`slots`] scans it into
//! Across/Down slots, [`domain`] (backed by [`pattern_index`]) tracks live
//! per-slot candidates, and [`backtracker`] drives [`heuristics`] and the
//! optional [`hydrator`] to fill the grid. [`config`] resolves a difficulty
//! level into the knobs the backtracker and layout generator read.

pub mod backtracker;
pub mod config;
pub mod domain;
pub mod error;
pub mod grid;
pub mod heuristics;
pub mod hydrator;
pub mod layout;
pub mod pattern_index;
pub mod slots;
pub mod types;
pub mod word_list;

pub use backtracker::{solve, SolveFailure, SolveOptions, SolveOutcome, SolveSuccess, Stats};
pub use config::{DifficultyConfig, DifficultyOverride, DifficultyTable, DEFAULT_LEVEL};
pub use error::{ConfigError, FailureDetails, FailureReason};
pub use grid::{Cell, Grid, Run};
pub use layout::{add_rescue_block_pair, generate_layout, BlockBudget};
pub use slots::{build_slots, Slot, MAX_SLOT_LENGTH};
pub use types::{Coord, Direction, SlotId, WordId};
pub use word_list::{Pool, PoolStore};
