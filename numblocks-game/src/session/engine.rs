//! Stateful runtime around the pure reducer.
//!
//! `SessionEngine` owns the clock, the auto-advance timer, per-session seeds
//! and the recorder. Every host input is turned into a [`SessionEvent`],
//! reduced, and the returned effects are executed here.
use serde::Serialize;
use smallvec::SmallVec;
use std::time::Duration;

use crate::block::{Block, BlockId};
use crate::catalog::{DifficultyTier, LevelCatalog, LevelDefinition};
use crate::config::{ConfigError, EngineConfig};
use crate::constants::{
    LOG_ACTION_IGNORED, LOG_CHECK_FAILED, LOG_LEVEL_CLEARED, LOG_LEVEL_STARTED,
    LOG_LEVEL_TIMEOUT, LOG_RECORDER_FAILED, LOG_SESSION_COMPLETE, LOG_SESSION_RESET,
    LOG_SESSION_STARTED, MILLIS_PER_TICK,
};
use crate::feedback::Feedback;
use crate::generator::generate_puzzle;
use crate::recorder::{NullRecorder, SessionRecorder, SessionSummary};
use crate::rng::{level_stream, session_seed};
use crate::scoring::ScoreBreakdown;
use crate::session::event::{Action, ActionRejected, EventKind, SessionEvent};
use crate::session::reducer::{Effect, ReduceContext, Transition, reduce};
use crate::session::state::{Phase, SessionState};
use crate::timer::{AdvanceTimer, PendingAdvance};
use crate::validator::SolutionCheck;

/// What one applied event produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub event: EventKind,
    pub phase: Phase,
    pub feedback: Option<Feedback>,
    #[serde(skip)]
    pub rejected: Option<ActionRejected>,
    pub score: Option<ScoreBreakdown>,
    pub check: Option<SolutionCheck>,
}

impl Step {
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        self.rejected.is_some()
    }
}

pub type Steps = SmallVec<[Step; 2]>;

/// Telemetry for the most recent block generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRecord {
    pub level_index: usize,
    pub level_number: u32,
    pub strategy: DifficultyTier,
    pub attempts: u32,
    pub fell_back: bool,
    pub rng_draws: u64,
    pub planted_values: Vec<u32>,
}

/// Everything a host needs to render the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub feedback: Option<Feedback>,
    pub level: Option<LevelDefinition>,
    pub current_sum: u32,
    pub pending_advance: Option<PendingAdvance>,
    pub clock_ms: u64,
}

/// Session runtime: pure transitions plus clock, timer, seeds and recorder.
#[derive(Debug)]
pub struct SessionEngine<R: SessionRecorder = NullRecorder> {
    catalog: LevelCatalog,
    config: EngineConfig,
    recorder: R,
    seed: u64,
    sessions_started: u64,
    session_seed: u64,
    state: SessionState,
    feedback: Option<Feedback>,
    timer: AdvanceTimer,
    clock_ms: u64,
    countdown_ms: u64,
    last_generation: Option<GenerationRecord>,
    last_summary: Option<SessionSummary>,
}

impl<R: SessionRecorder> SessionEngine<R> {
    /// Engine over the bundled catalog and default tuning.
    pub fn new(seed: u64, recorder: R) -> Self {
        Self::build(seed, LevelCatalog::default(), EngineConfig::default(), recorder)
    }

    /// Engine over a custom catalog and configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when `config` fails validation.
    pub fn with_setup(
        seed: u64,
        catalog: LevelCatalog,
        config: EngineConfig,
        recorder: R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(seed, catalog, config, recorder))
    }

    fn build(seed: u64, catalog: LevelCatalog, config: EngineConfig, recorder: R) -> Self {
        Self {
            catalog,
            config,
            recorder,
            seed,
            sessions_started: 0,
            session_seed: session_seed(seed, 0),
            state: SessionState::default(),
            feedback: None,
            timer: AdvanceTimer::new(),
            clock_ms: 0,
            countdown_ms: 0,
            last_generation: None,
            last_summary: None,
        }
    }

    /// Route a host action to its handler.
    pub fn dispatch(&mut self, action: Action) -> Steps {
        match action {
            Action::Start => self.start(),
            Action::PlaceBlock { block, slot } => self.place_block(block, slot),
            Action::RemoveBlock { block } => self.remove_block(block),
            Action::CheckSolution => self.check_solution(),
            Action::Tick => self.tick(),
            Action::Reset => self.reset(),
        }
    }

    /// Begin a new session at level 1 with freshly generated blocks.
    ///
    /// Allowed from `Idle` and `SessionComplete`; each start draws a new
    /// session seed from the engine seed.
    pub fn start(&mut self) -> Steps {
        if !matches!(self.state.phase, Phase::Idle | Phase::SessionComplete) {
            return self.apply_one(SessionEvent::Start { blocks: Vec::new() });
        }
        self.session_seed = session_seed(self.seed, self.sessions_started);
        self.sessions_started = self.sessions_started.saturating_add(1);
        self.last_summary = None;
        let blocks = self.generate_level(0).unwrap_or_default();
        let steps = self.apply_one(SessionEvent::Start { blocks });
        log::info!(
            "{LOG_SESSION_STARTED}: session {} seed {:#018x}",
            self.sessions_started,
            self.session_seed
        );
        steps
    }

    pub fn place_block(&mut self, block: BlockId, slot: u8) -> Steps {
        self.apply_one(SessionEvent::PlaceBlock { block, slot })
    }

    pub fn remove_block(&mut self, block: BlockId) -> Steps {
        self.apply_one(SessionEvent::RemoveBlock { block })
    }

    pub fn check_solution(&mut self) -> Steps {
        self.apply_one(SessionEvent::CheckSolution)
    }

    /// Advance the clock by one countdown second.
    pub fn tick(&mut self) -> Steps {
        self.advance_time(Duration::from_millis(MILLIS_PER_TICK))
    }

    /// Advance the engine clock, applying countdown ticks and any auto-advance
    /// that falls due, in time order.
    ///
    /// The countdown only runs while a level is active; the auto-advance timer
    /// runs regardless.
    pub fn advance_time(&mut self, elapsed: Duration) -> Steps {
        let mut remaining = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let mut steps = Steps::new();
        loop {
            let until_tick = self
                .state
                .is_playing()
                .then(|| MILLIS_PER_TICK.saturating_sub(self.countdown_ms));
            let until_due = self.timer.due_in(self.clock_ms);
            let step_ms = match until_tick.into_iter().chain(until_due).min() {
                Some(ms) if ms <= remaining => ms,
                _ => {
                    self.pass(remaining);
                    break;
                }
            };
            self.pass(step_ms);
            remaining -= step_ms;

            if self.state.is_playing() && self.countdown_ms >= MILLIS_PER_TICK {
                self.countdown_ms = 0;
                steps.push(self.apply(SessionEvent::Tick));
            }
            if let Some(pending) = self.timer.take_due(self.clock_ms) {
                steps.push(self.fire_advance(pending));
            }
        }
        steps
    }

    /// Abandon the session: cancel any pending advance and return to `Idle`
    /// without recording.
    pub fn reset(&mut self) -> Steps {
        let had_session = self.state.phase != Phase::Idle;
        let steps = self.apply_one(SessionEvent::Reset);
        if had_session {
            log::info!("{LOG_SESSION_RESET}: session {}", self.sessions_started);
        }
        steps
    }

    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.state.phase
    }

    #[must_use]
    pub const fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    #[must_use]
    pub fn current_level(&self) -> Option<&LevelDefinition> {
        match self.state.phase {
            Phase::Idle => None,
            _ => self.catalog.get(self.state.level_index),
        }
    }

    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.state.blocks
    }

    #[must_use]
    pub const fn pending_advance(&self) -> Option<&PendingAdvance> {
        self.timer.pending()
    }

    #[must_use]
    pub const fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub const fn session_seed(&self) -> u64 {
        self.session_seed
    }

    #[must_use]
    pub const fn catalog(&self) -> &LevelCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub const fn recorder(&self) -> &R {
        &self.recorder
    }

    #[must_use]
    pub const fn last_generation(&self) -> Option<&GenerationRecord> {
        self.last_generation.as_ref()
    }

    /// Summary of the most recently completed session, until the next start.
    #[must_use]
    pub const fn last_summary(&self) -> Option<&SessionSummary> {
        self.last_summary.as_ref()
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state.clone(),
            feedback: self.feedback.clone(),
            level: self.current_level().cloned(),
            current_sum: self.state.current_sum(),
            pending_advance: self.timer.pending().copied(),
            clock_ms: self.clock_ms,
        }
    }

    fn pass(&mut self, ms: u64) {
        self.clock_ms = self.clock_ms.saturating_add(ms);
        if self.state.is_playing() {
            self.countdown_ms = self.countdown_ms.saturating_add(ms);
        }
    }

    fn fire_advance(&mut self, pending: PendingAdvance) -> Step {
        let index = self.state.level_index;
        let next_blocks = if self.catalog.is_last(index) {
            None
        } else {
            self.generate_level(index + 1)
        };
        log::debug!(
            "auto-advance after {:?} at {} ms",
            pending.reason,
            self.clock_ms
        );
        self.apply(SessionEvent::Advance { next_blocks })
    }

    fn generate_level(&mut self, index: usize) -> Option<Vec<Block>> {
        let level = self.catalog.get(index)?;
        let mut rng = level_stream(self.session_seed, index);
        let puzzle = generate_puzzle(level, &self.config.generator(), &mut rng);
        self.last_generation = Some(GenerationRecord {
            level_index: index,
            level_number: level.level_number,
            strategy: puzzle.strategy,
            attempts: puzzle.attempts,
            fell_back: puzzle.fell_back,
            rng_draws: rng.draws(),
            planted_values: puzzle.planted_values(),
        });
        Some(puzzle.blocks)
    }

    fn apply_one(&mut self, event: SessionEvent) -> Steps {
        let mut steps = Steps::new();
        steps.push(self.apply(event));
        steps
    }

    fn apply(&mut self, event: SessionEvent) -> Step {
        let kind = event.kind();
        let before = self.state.phase;
        let ctx = ReduceContext {
            catalog: &self.catalog,
            config: &self.config,
            now_ms: self.clock_ms,
        };
        let Transition {
            state,
            feedback,
            effects,
            rejected,
            score,
            check,
        } = reduce(&self.state, event, &ctx);

        if let Some(reason) = rejected {
            log::debug!("{LOG_ACTION_IGNORED}: {reason}");
            return Step {
                event: kind,
                phase: self.state.phase,
                feedback: None,
                rejected,
                score: None,
                check: None,
            };
        }

        self.state = state;
        self.feedback.clone_from(&feedback);
        if self.state.is_playing() && before != Phase::LevelActive {
            self.countdown_ms = 0;
        }
        self.log_transition(kind, before, check.as_ref());

        for effect in effects {
            match effect {
                Effect::ScheduleAdvance { reason, delay_ms } => {
                    self.timer.schedule(reason, self.clock_ms, delay_ms);
                }
                Effect::CancelAdvance => {
                    self.timer.cancel();
                }
                Effect::RecordSummary(summary) => self.record(summary),
            }
        }

        Step {
            event: kind,
            phase: self.state.phase,
            feedback,
            rejected: None,
            score,
            check,
        }
    }

    fn record(&mut self, summary: SessionSummary) {
        log::info!(
            "{LOG_SESSION_COMPLETE}: score {} best streak {} in {}s (completed: {})",
            summary.final_score,
            summary.best_streak,
            summary.duration_seconds,
            summary.completed
        );
        if let Err(err) = self.recorder.record(&summary) {
            log::warn!("{LOG_RECORDER_FAILED}: {err}");
        }
        self.last_summary = Some(summary);
    }

    fn log_transition(&self, kind: EventKind, before: Phase, check: Option<&SolutionCheck>) {
        let level_number = self
            .catalog
            .get(self.state.level_index)
            .map_or(0, |level| level.level_number);
        match (before, self.state.phase) {
            (_, Phase::LevelActive) if before != Phase::LevelActive => {
                log::debug!(
                    "{LOG_LEVEL_STARTED}: level {level_number} with {} blocks",
                    self.state.blocks.len()
                );
            }
            (Phase::LevelActive, Phase::LevelCleared) => {
                log::debug!(
                    "{LOG_LEVEL_CLEARED}: level {level_number} score {} streak {}",
                    self.state.score,
                    self.state.streak
                );
            }
            (Phase::LevelActive, Phase::TimedOut) => {
                log::debug!("{LOG_LEVEL_TIMEOUT}: level {level_number}");
            }
            _ if kind == EventKind::CheckSolution => {
                if let Some(check) = check {
                    log::debug!(
                        "{LOG_CHECK_FAILED}: level {level_number} sum {} of {} with {} placed",
                        check.current_sum,
                        check.target,
                        check.placed
                    );
                }
            }
            _ => {}
        }
    }
}
