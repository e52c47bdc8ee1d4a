//! Player-facing messages produced by session transitions.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::MIN_SOLUTION_BLOCKS;

/// Message the host shows after a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Feedback {
    LevelStarted {
        level_number: u32,
        concept: String,
        target_sum: u32,
    },
    /// A failed check. `offset` is `current_sum - target`.
    Miss { offset: i64, placed: usize },
    LevelCleared { level_number: u32, points: u32 },
    TimedOut { level_number: u32 },
    SessionComplete { final_score: u32, completed: bool },
}

impl Feedback {
    /// Signed distance to the target for a failed check with enough blocks placed.
    #[must_use]
    pub const fn hint(&self) -> Option<i64> {
        match self {
            Self::Miss { offset, placed } if *placed >= MIN_SOLUTION_BLOCKS => Some(*offset),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(
            self,
            Self::LevelCleared { .. }
                | Self::SessionComplete {
                    completed: true,
                    ..
                }
        )
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LevelStarted {
                level_number,
                concept,
                target_sum,
            } => write!(f, "Level {level_number}: {concept}. Make {target_sum}!"),
            Self::Miss { placed, .. } if *placed < MIN_SOLUTION_BLOCKS => {
                write!(f, "Place at least {MIN_SOLUTION_BLOCKS} blocks")
            }
            Self::Miss { offset, .. } if *offset < 0 => {
                write!(f, "You need {} more", offset.unsigned_abs())
            }
            Self::Miss { offset, .. } => write!(f, "Too high by {offset}"),
            Self::LevelCleared { level_number, .. } => {
                write!(f, "Perfect! Level {level_number} complete!")
            }
            Self::TimedOut { .. } => f.write_str("Time's up!"),
            Self::SessionComplete {
                final_score,
                completed: true,
            } => write!(f, "All levels complete! Final score {final_score}"),
            Self::SessionComplete { final_score, .. } => {
                write!(f, "Session over. Final score {final_score}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miss_messages_point_toward_target() {
        let under = Feedback::Miss {
            offset: -4,
            placed: 2,
        };
        assert_eq!(under.to_string(), "You need 4 more");
        assert_eq!(under.hint(), Some(-4));

        let over = Feedback::Miss {
            offset: 3,
            placed: 3,
        };
        assert_eq!(over.to_string(), "Too high by 3");
    }

    #[test]
    fn lone_block_asks_for_more_blocks() {
        let lone = Feedback::Miss {
            offset: 0,
            placed: 1,
        };
        assert_eq!(lone.to_string(), "Place at least 2 blocks");
        assert_eq!(lone.hint(), None);
    }

    #[test]
    fn clear_and_timeout_texts() {
        let clear = Feedback::LevelCleared {
            level_number: 3,
            points: 90,
        };
        assert_eq!(clear.to_string(), "Perfect! Level 3 complete!");
        assert!(clear.is_success());
        let timeout = Feedback::TimedOut { level_number: 2 };
        assert_eq!(timeout.to_string(), "Time's up!");
        assert!(!timeout.is_success());
    }
}
