//! Pure session transition function.
//!
//! `reduce` never touches clocks, timers, or randomness. Everything it needs
//! arrives in the event or the context, and every side effect it wants is
//! returned as an [`Effect`] for the engine to carry out.
use smallvec::SmallVec;

use crate::block::{Block, place_block, remove_block};
use crate::catalog::LevelCatalog;
use crate::config::EngineConfig;
use crate::feedback::Feedback;
use crate::recorder::SessionSummary;
use crate::scoring::{ScoreBreakdown, score_level_clear};
use crate::session::event::{ActionRejected, SessionEvent};
use crate::session::state::{Phase, SessionState};
use crate::timer::AdvanceReason;
use crate::validator::{SolutionCheck, check_solution};

/// Read-only inputs a transition may consult.
#[derive(Debug, Clone, Copy)]
pub struct ReduceContext<'a> {
    pub catalog: &'a LevelCatalog,
    pub config: &'a EngineConfig,
    /// Engine clock at the moment the event is applied.
    pub now_ms: u64,
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ScheduleAdvance {
        reason: AdvanceReason,
        delay_ms: u64,
    },
    CancelAdvance,
    RecordSummary(SessionSummary),
}

pub type Effects = SmallVec<[Effect; 2]>;

/// Result of applying one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: SessionState,
    pub feedback: Option<Feedback>,
    pub effects: Effects,
    pub rejected: Option<ActionRejected>,
    /// Points awarded by this transition, on a level clear.
    pub score: Option<ScoreBreakdown>,
    pub check: Option<SolutionCheck>,
}

impl Transition {
    fn unchanged(state: &SessionState, rejected: ActionRejected) -> Self {
        Self {
            state: state.clone(),
            feedback: None,
            effects: SmallVec::new(),
            rejected: Some(rejected),
            score: None,
            check: None,
        }
    }

    fn to(state: SessionState) -> Self {
        Self {
            state,
            feedback: None,
            effects: SmallVec::new(),
            rejected: None,
            score: None,
            check: None,
        }
    }

    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        self.rejected.is_some()
    }
}

/// Apply `event` to `state`.
#[must_use]
pub fn reduce(state: &SessionState, event: SessionEvent, ctx: &ReduceContext<'_>) -> Transition {
    let kind = event.kind();
    let wrong_phase = || ActionRejected::WrongPhase {
        event: kind,
        phase: state.phase,
    };

    match event {
        SessionEvent::Reset => {
            let mut transition = Transition::to(SessionState::default());
            transition.effects.push(Effect::CancelAdvance);
            transition
        }
        SessionEvent::Start { blocks } => {
            if !matches!(state.phase, Phase::Idle | Phase::SessionComplete) {
                return Transition::unchanged(state, wrong_phase());
            }
            let Some(first) = ctx.catalog.get(0) else {
                return Transition::unchanged(
                    state,
                    ActionRejected::MissingNextLevel { level_index: 0 },
                );
            };
            let next = SessionState {
                phase: Phase::LevelActive,
                level_index: 0,
                time_remaining_seconds: first.time_limit_seconds,
                blocks,
                started_at_ms: ctx.now_ms,
                ..SessionState::default()
            };
            let mut transition = Transition::to(next);
            transition.effects.push(Effect::CancelAdvance);
            transition.feedback = level_started(ctx.catalog, 0);
            transition
        }
        SessionEvent::PlaceBlock { block, slot } => {
            if !state.is_playing() {
                return Transition::unchanged(state, wrong_phase());
            }
            let mut next = state.clone();
            match place_block(&mut next.blocks, block, slot, ctx.config.slot_count) {
                Ok(_) => Transition::to(next),
                Err(err) => Transition::unchanged(state, err.into()),
            }
        }
        SessionEvent::RemoveBlock { block } => {
            if !state.is_playing() {
                return Transition::unchanged(state, wrong_phase());
            }
            let mut next = state.clone();
            match remove_block(&mut next.blocks, block) {
                Ok(_) => Transition::to(next),
                Err(err) => Transition::unchanged(state, err.into()),
            }
        }
        SessionEvent::CheckSolution => {
            if !state.is_playing() {
                return Transition::unchanged(state, wrong_phase());
            }
            check(state, ctx)
        }
        SessionEvent::Tick => {
            if !state.is_playing() {
                return Transition::unchanged(state, wrong_phase());
            }
            tick(state, ctx)
        }
        SessionEvent::Advance { next_blocks } => {
            if !state.phase.is_awaiting_advance() {
                return Transition::unchanged(state, wrong_phase());
            }
            advance(state, next_blocks, ctx)
        }
    }
}

fn check(state: &SessionState, ctx: &ReduceContext<'_>) -> Transition {
    let Some(level) = ctx.catalog.get(state.level_index) else {
        return Transition::unchanged(
            state,
            ActionRejected::MissingNextLevel {
                level_index: state.level_index,
            },
        );
    };
    let outcome = check_solution(&state.blocks, level.target_sum);
    let mut next = state.clone();

    if !outcome.success {
        next.streak = 0;
        let mut transition = Transition::to(next);
        transition.feedback = Some(Feedback::Miss {
            offset: outcome.offset(),
            placed: outcome.placed,
        });
        transition.check = Some(outcome);
        return transition;
    }

    let breakdown = score_level_clear(
        level.level_number,
        level.time_limit_seconds,
        state.time_remaining_seconds,
        state.streak,
    );
    next.score = next.score.saturating_add(breakdown.total());
    next.streak = next.streak.saturating_add(1);
    next.best_streak = next.best_streak.max(next.streak);
    next.levels_cleared = next.levels_cleared.saturating_add(1);
    next.phase = Phase::LevelCleared;

    let mut transition = Transition::to(next);
    transition.effects.push(Effect::ScheduleAdvance {
        reason: AdvanceReason::LevelCleared,
        delay_ms: ctx.config.level_clear_delay_ms,
    });
    transition.feedback = Some(Feedback::LevelCleared {
        level_number: level.level_number,
        points: breakdown.total(),
    });
    transition.score = Some(breakdown);
    transition.check = Some(outcome);
    transition
}

fn tick(state: &SessionState, ctx: &ReduceContext<'_>) -> Transition {
    let mut next = state.clone();
    next.time_remaining_seconds = next.time_remaining_seconds.saturating_sub(1);
    if next.time_remaining_seconds > 0 {
        return Transition::to(next);
    }

    next.phase = Phase::TimedOut;
    next.streak = 0;
    let level_number = ctx
        .catalog
        .get(state.level_index)
        .map_or(0, |level| level.level_number);
    let mut transition = Transition::to(next);
    transition.effects.push(Effect::ScheduleAdvance {
        reason: AdvanceReason::TimedOut,
        delay_ms: ctx.config.timeout_advance_delay_ms,
    });
    transition.feedback = Some(Feedback::TimedOut { level_number });
    transition
}

fn advance(
    state: &SessionState,
    next_blocks: Option<Vec<Block>>,
    ctx: &ReduceContext<'_>,
) -> Transition {
    if ctx.catalog.is_last(state.level_index) {
        let completed = state.phase == Phase::LevelCleared;
        let duration_ms = ctx.now_ms.saturating_sub(state.started_at_ms);
        let summary = SessionSummary::new(
            state.score,
            state.best_streak,
            duration_ms / 1_000,
            completed,
        );
        let mut next = state.clone();
        next.phase = Phase::SessionComplete;
        let mut transition = Transition::to(next);
        transition.feedback = Some(Feedback::SessionComplete {
            final_score: state.score,
            completed,
        });
        transition.effects.push(Effect::RecordSummary(summary));
        return transition;
    }

    let index = state.level_index + 1;
    let (Some(blocks), Some(level)) = (next_blocks, ctx.catalog.get(index)) else {
        return Transition::unchanged(
            state,
            ActionRejected::MissingNextLevel {
                level_index: state.level_index,
            },
        );
    };
    let mut next = state.clone();
    next.phase = Phase::LevelActive;
    next.level_index = index;
    next.time_remaining_seconds = level.time_limit_seconds;
    next.blocks = blocks;
    let mut transition = Transition::to(next);
    transition.feedback = level_started(ctx.catalog, index);
    transition
}

fn level_started(catalog: &LevelCatalog, index: usize) -> Option<Feedback> {
    catalog.get(index).map(|level| Feedback::LevelStarted {
        level_number: level.level_number,
        concept: level.concept.clone(),
        target_sum: level.target_sum,
    })
}
