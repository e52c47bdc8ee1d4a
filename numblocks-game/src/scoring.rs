//! Level-clear scoring.
//!
//! A clear earns `level_number * 20` for progression, one point per second
//! spent on the level, and `streak * 5` where `streak` is the count of clears
//! leading into this one. Timeouts and failed checks score nothing.
use serde::{Deserialize, Serialize};

use crate::constants::{LEVEL_NUMBER_WEIGHT, STREAK_BONUS_PER_CLEAR};

/// Itemised points awarded for one level clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub progression: u32,
    pub speed: u32,
    pub streak: u32,
}

impl ScoreBreakdown {
    /// Level-clear bonus: progression plus speed.
    #[must_use]
    pub const fn level_bonus(&self) -> u32 {
        self.progression.saturating_add(self.speed)
    }

    #[must_use]
    pub const fn total(&self) -> u32 {
        self.level_bonus().saturating_add(self.streak)
    }
}

/// `level_number * 20 + (time_limit - time_remaining)`.
#[must_use]
pub const fn level_clear_bonus(level_number: u32, time_limit: u32, time_remaining: u32) -> u32 {
    level_number
        .saturating_mul(LEVEL_NUMBER_WEIGHT)
        .saturating_add(time_limit.saturating_sub(time_remaining))
}

/// `streak * 5`, using the streak before this clear is counted.
#[must_use]
pub const fn streak_bonus(streak_before: u32) -> u32 {
    streak_before.saturating_mul(STREAK_BONUS_PER_CLEAR)
}

/// Full breakdown for clearing `level_number` with `time_remaining` seconds left.
#[must_use]
pub const fn score_level_clear(
    level_number: u32,
    time_limit: u32,
    time_remaining: u32,
    streak_before: u32,
) -> ScoreBreakdown {
    ScoreBreakdown {
        progression: level_number.saturating_mul(LEVEL_NUMBER_WEIGHT),
        speed: time_limit.saturating_sub(time_remaining),
        streak: streak_bonus(streak_before),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_scenario_awards_fifty() {
        let breakdown = score_level_clear(1, 120, 100, 2);
        assert_eq!(breakdown.progression, 20);
        assert_eq!(breakdown.speed, 20);
        assert_eq!(breakdown.streak, 10);
        assert_eq!(breakdown.total(), 50);
        assert_eq!(breakdown.level_bonus(), level_clear_bonus(1, 120, 100));
    }

    #[test]
    fn first_clear_has_no_streak_bonus() {
        assert_eq!(streak_bonus(0), 0);
        assert_eq!(score_level_clear(3, 120, 120, 0).total(), 60);
    }

    #[test]
    fn bonus_never_underflows() {
        assert_eq!(level_clear_bonus(2, 120, 500), 40);
    }
}
