//! Crate-wide error types.
//!
//! `spec.md` §7 distinguishes fatal configuration errors from recoverable,
//! in-solver control flow. Only the former are `std::error::Error` values;
//! the latter (placement rejection, hydration soft failure) never leave the
//! solver and are represented as plain booleans/`Option`s at their call
//! sites, not as errors.

use crate::types::SlotId;
use thiserror::Error;

/// Fatal at startup: bad grid size, bad character constants, pool I/O.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("grid size {0} is not supported")]
    UnknownGridSize(usize),
    #[error("block character and unknown character must differ and must not be alphabet characters")]
    InvalidCharacterConstants,
    #[error("cannot place a symmetric block pair at ({0}, {1}): blocked by a fixed letter, a short run, or a disconnected grid")]
    BlockPlacementRejected(usize, usize),
    #[error("pool file I/O error: {0}")]
    PoolIo(String),
}

/// Why a `Backtracker::solve` call did not return a filled grid.
///
/// Mirrors `spec.md` §4.8's termination reasons exactly; this is a data
/// value, not a `std::error::Error`, since a failed solve is an ordinary,
/// expected outcome the caller branches on rather than propagates.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub enum FailureReason {
    /// The grid has no slots at all (e.g. every cell is a block).
    NoSlots,
    /// One or more slots had an empty domain after `init_domains` and one
    /// hydration pass; `empties` lists the offending slot ids.
    UnsatisfiableInitialDomains { empties: Vec<SlotId> },
    /// `timeoutMs` elapsed before a solution was found.
    Timeout,
    /// `maxBacktracks` logical steps were taken without a solution.
    BacktrackLimit,
    /// No unassigned slot could be selected (should only coincide with
    /// an empty search stack when nothing is left to assign).
    NoSelectableSlot,
    /// The top frame ran out of candidates and the stack unwound to empty.
    ExhaustedAllCandidates,
    /// Backtracking reached the bottom of the stack with no more choices
    /// anywhere above it.
    DeadEndNoMoreChoices,
    /// The layout generator could not produce a valid grid within its
    /// attempt budget.
    LayoutInfeasible,
}

/// Context carried alongside a `FailureReason`: what had been assigned when
/// the solver gave up.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct FailureDetails {
    pub last_slot: Option<SlotId>,
    pub assigned_count: usize,
}
