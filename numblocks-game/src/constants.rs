//! Centralized balance and tuning constants for Numblocks game logic.
//!
//! These values define the deterministic math for puzzle generation and
//! scoring. Keeping them together ensures gameplay can only be adjusted via
//! reviewed code changes or an explicit [`crate::EngineConfig`] override.

// Identity -----------------------------------------------------------------
/// Game identifier reported to session recorders.
pub const GAME_ID: &str = "logic-puzzle";

// Logging keys -------------------------------------------------------------
pub(crate) const LOG_SESSION_STARTED: &str = "log.session.started";
pub(crate) const LOG_SESSION_COMPLETE: &str = "log.session.complete";
pub(crate) const LOG_SESSION_RESET: &str = "log.session.reset";
pub(crate) const LOG_LEVEL_STARTED: &str = "log.level.started";
pub(crate) const LOG_LEVEL_CLEARED: &str = "log.level.cleared";
pub(crate) const LOG_LEVEL_TIMEOUT: &str = "log.level.timeout";
pub(crate) const LOG_CHECK_FAILED: &str = "log.check.failed";
pub(crate) const LOG_ACTION_IGNORED: &str = "log.action.ignored";
pub(crate) const LOG_GENERATOR_RETRY: &str = "log.generator.retry";
pub(crate) const LOG_GENERATOR_FALLBACK: &str = "log.generator.fallback";
pub(crate) const LOG_RECORDER_FAILED: &str = "log.recorder.failed";

// Session timing -----------------------------------------------------------
/// Countdown length for every level.
pub const TIME_LIMIT_SECONDS: u32 = 120;
/// Pause between a level clear and the next level.
pub const LEVEL_CLEAR_DELAY_MS: u64 = 2_500;
/// Pause between a timeout and the next level. Differs from the clear delay.
pub const TIMEOUT_ADVANCE_DELAY_MS: u64 = 2_000;
pub(crate) const MILLIS_PER_TICK: u64 = 1_000;

// Solution area ------------------------------------------------------------
/// Number of slots in the reference solution area.
pub const SOLUTION_SLOTS: u8 = 3;
/// Fewest placed blocks that can form an accepted answer.
pub const MIN_SOLUTION_BLOCKS: usize = 2;

// Scoring ------------------------------------------------------------------
pub(crate) const LEVEL_NUMBER_WEIGHT: u32 = 20;
pub(crate) const STREAK_BONUS_PER_CLEAR: u32 = 5;

// Generator tuning ---------------------------------------------------------
/// Fresh-draw attempts per strategy before falling back to `basic`.
pub const GENERATION_ATTEMPTS: u32 = 24;
pub(crate) const BASIC_TERM_MAX: u32 = 8;
pub(crate) const BASIC_PAD_MAX: u32 = 10;
pub(crate) const INTERMEDIATE_PAIR_QUOTIENT_MAX: u32 = 10;
pub(crate) const INTERMEDIATE_DISTRACTOR_CAP: u32 = 20;
pub(crate) const INTERMEDIATE_DISTRACTORS_MIN: usize = 2;
pub(crate) const INTERMEDIATE_DISTRACTORS_MAX: usize = 3;
pub(crate) const INTERMEDIATE_PAD_MAX: u32 = 15;
pub(crate) const ADVANCED_DISTRACTOR_CAP: u32 = 25;
pub(crate) const ADVANCED_PRIME_DISTRACTORS: usize = 2;
pub(crate) const ADVANCED_MULTIPLE_DISTRACTORS: usize = 1;
pub(crate) const ADVANCED_PAD_MAX: u32 = 20;
pub(crate) const PAD_DISTINCT_DRAWS: u32 = 64;
