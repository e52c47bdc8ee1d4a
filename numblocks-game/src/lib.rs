//! Numblocks Game Engine
//!
//! Platform-agnostic core logic for the Numblocks target-sum puzzle.
//! This crate provides puzzle generation, validation, scoring and the session
//! state machine without UI or platform-specific dependencies.

pub mod block;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod feedback;
pub mod generator;
pub mod numbers;
pub mod recorder;
pub mod rng;
pub mod scoring;
pub mod session;
pub mod timer;
pub mod validator;

// Re-export commonly used types
pub use block::{Block, BlockId, Placement, PlacementChange, PlacementError};
pub use catalog::{CatalogError, DifficultyTier, LevelCatalog, LevelDefinition};
pub use config::{ConfigError, EngineConfig};
pub use constants::GAME_ID;
pub use feedback::Feedback;
pub use generator::{
    GeneratedPuzzle, GenerationError, GeneratorConfig, generate_blocks, generate_puzzle,
};
pub use numbers::{factors_of, is_prime, primes_up_to};
pub use recorder::{MemoryRecorder, NullRecorder, SessionRecorder, SessionSummary};
pub use rng::{CountingRng, derive_stream_seed, level_stream, session_seed};
pub use scoring::{ScoreBreakdown, level_clear_bonus, score_level_clear, streak_bonus};
pub use session::{
    Action, ActionRejected, Effect, EventKind, GenerationRecord, Phase, SessionEngine,
    SessionEvent, SessionSnapshot, SessionState, Step, Steps, Transition, reduce,
};
pub use timer::{AdvanceReason, AdvanceTimer, PendingAdvance, TimerHandle};
pub use validator::{SolutionCheck, check_solution, find_solution, is_solvable};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_session_records_once() {
        let recorder = MemoryRecorder::new();
        let mut engine = SessionEngine::new(2024, recorder.clone());
        engine.start();
        for _ in 0..engine.catalog().len() {
            let target = engine.current_level().map(|l| l.target_sum).unwrap();
            let values: Vec<u32> = engine.blocks().iter().map(|b| b.value).collect();
            let picks = find_solution(&values, target, 3).unwrap();
            let ids: Vec<BlockId> = picks.iter().map(|&i| engine.blocks()[i].id).collect();
            for (slot, id) in ids.into_iter().enumerate() {
                engine.place_block(id, u8::try_from(slot).unwrap());
            }
            engine.check_solution();
            engine.advance_time(std::time::Duration::from_millis(2_500));
        }
        assert_eq!(engine.phase(), Phase::SessionComplete);
        let summaries = recorder.summaries();
        assert_eq!(summaries.len(), 1);
        assert!(summaries[0].completed);
        assert_eq!(summaries[0].best_streak, 5);
        assert_eq!(summaries[0].game_id, GAME_ID);
    }
}
