//! Inputs to the session reducer and the ways they can be refused.
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::block::{Block, BlockId, PlacementError};
use crate::session::state::Phase;

/// Host-initiated input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Start,
    PlaceBlock { block: BlockId, slot: u8 },
    RemoveBlock { block: BlockId },
    CheckSolution,
    Tick,
    Reset,
}

impl Action {
    #[must_use]
    pub const fn kind(self) -> EventKind {
        match self {
            Self::Start => EventKind::Start,
            Self::PlaceBlock { .. } => EventKind::PlaceBlock,
            Self::RemoveBlock { .. } => EventKind::RemoveBlock,
            Self::CheckSolution => EventKind::CheckSolution,
            Self::Tick => EventKind::Tick,
            Self::Reset => EventKind::Reset,
        }
    }
}

/// Fully-resolved reducer input. Randomness is drawn before the reducer runs,
/// so level blocks travel inside the event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Start { blocks: Vec<Block> },
    PlaceBlock { block: BlockId, slot: u8 },
    RemoveBlock { block: BlockId },
    CheckSolution,
    Tick,
    /// The scheduled auto-advance fired. `next_blocks` is `None` after the last level.
    Advance { next_blocks: Option<Vec<Block>> },
    Reset,
}

impl SessionEvent {
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Start { .. } => EventKind::Start,
            Self::PlaceBlock { .. } => EventKind::PlaceBlock,
            Self::RemoveBlock { .. } => EventKind::RemoveBlock,
            Self::CheckSolution => EventKind::CheckSolution,
            Self::Tick => EventKind::Tick,
            Self::Advance { .. } => EventKind::Advance,
            Self::Reset => EventKind::Reset,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Start,
    PlaceBlock,
    RemoveBlock,
    CheckSolution,
    Tick,
    Advance,
    Reset,
}

impl EventKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::PlaceBlock => "place_block",
            Self::RemoveBlock => "remove_block",
            Self::CheckSolution => "check_solution",
            Self::Tick => "tick",
            Self::Advance => "advance",
            Self::Reset => "reset",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an input left the session unchanged.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ActionRejected {
    #[error("{event} is ignored while the session is {phase}")]
    WrongPhase { event: EventKind, phase: Phase },
    #[error(transparent)]
    Placement(#[from] PlacementError),
    #[error("level {level_index} has no successor blocks to advance into")]
    MissingNextLevel { level_index: usize },
}
