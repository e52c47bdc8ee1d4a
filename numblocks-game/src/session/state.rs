//! Session data model.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::block::{Block, placed_in_slot_order};

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    LevelActive,
    LevelCleared,
    TimedOut,
    SessionComplete,
}

impl Phase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::LevelActive => "level_active",
            Self::LevelCleared => "level_cleared",
            Self::TimedOut => "timed_out",
            Self::SessionComplete => "session_complete",
        }
    }

    /// Phases that wait on a scheduled auto-advance.
    #[must_use]
    pub const fn is_awaiting_advance(self) -> bool {
        matches!(self, Self::LevelCleared | Self::TimedOut)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(Self::Idle),
            "level_active" => Ok(Self::LevelActive),
            "level_cleared" => Ok(Self::LevelCleared),
            "timed_out" => Ok(Self::TimedOut),
            "session_complete" => Ok(Self::SessionComplete),
            _ => Err(()),
        }
    }
}

/// Complete state of one play session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionState {
    pub phase: Phase,
    pub level_index: usize,
    pub score: u32,
    pub streak: u32,
    pub best_streak: u32,
    pub time_remaining_seconds: u32,
    pub blocks: Vec<Block>,
    pub levels_cleared: u32,
    /// Engine clock reading when the session started.
    pub started_at_ms: u64,
}

impl SessionState {
    #[must_use]
    pub fn current_sum(&self) -> u32 {
        self.blocks
            .iter()
            .filter(|block| block.is_placed())
            .fold(0u32, |sum, block| sum.saturating_add(block.value))
    }

    #[must_use]
    pub fn placed(&self) -> Vec<&Block> {
        placed_in_slot_order(&self.blocks)
    }

    #[must_use]
    pub fn unplaced(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(|block| !block.is_placed())
    }

    #[must_use]
    pub const fn is_playing(&self) -> bool {
        matches!(self.phase, Phase::LevelActive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{BlockId, Placement};

    #[test]
    fn phase_round_trips_through_str() {
        for phase in [
            Phase::Idle,
            Phase::LevelActive,
            Phase::LevelCleared,
            Phase::TimedOut,
            Phase::SessionComplete,
        ] {
            assert_eq!(phase.as_str().parse::<Phase>(), Ok(phase));
        }
        assert!("paused".parse::<Phase>().is_err());
    }

    #[test]
    fn current_sum_counts_placed_blocks_only() {
        let mut state = SessionState {
            blocks: vec![
                Block::new(BlockId(0), 7),
                Block::new(BlockId(1), 8),
                Block::new(BlockId(2), 4),
            ],
            ..SessionState::default()
        };
        state.blocks[0].placement = Placement::Slot(1);
        state.blocks[2].placement = Placement::Slot(0);
        assert_eq!(state.current_sum(), 11);
        let order: Vec<u32> = state.placed().iter().map(|b| b.value).collect();
        assert_eq!(order, vec![4, 7]);
        assert_eq!(state.unplaced().count(), 1);
    }
}
