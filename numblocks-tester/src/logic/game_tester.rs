use anyhow::Result;
use numblocks_game::constants::SOLUTION_SLOTS;
use numblocks_game::{
    MemoryRecorder, Phase, SessionEngine, SessionSnapshot, SessionSummary, Step, find_solution,
};
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::logic::policy::{GameplayStrategy, PlayerPolicy, PolicyMove};

/// Upper bound on policy moves for a single playthrough.
pub const DEFAULT_MAX_MOVES: usize = 5_000;

#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub strategy: GameplayStrategy,
    pub max_moves: Option<usize>,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub fn new(strategy: GameplayStrategy) -> Self {
        Self {
            strategy,
            max_moves: None,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_max_moves(mut self, max_moves: usize) -> Self {
        self.max_moves = Some(max_moves);
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }
}

/// Assertion hook run after a simulation completes.
type SimulationExpectationFn =
    Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl std::fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    /// Evaluate the expectation against a finished playthrough.
    ///
    /// # Errors
    ///
    /// Returns the expectation's own error when it is not met.
    pub fn evaluate(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

/// Counters gathered while driving one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaythroughMetrics {
    pub moves: usize,
    pub levels_seen: usize,
    pub levels_cleared: u32,
    pub timeouts: u32,
    pub failed_checks: u32,
    pub rejected_actions: u32,
    pub unsolvable_levels: u32,
    pub fell_back_levels: u32,
    /// SHA-256 over every level's block values and the final score.
    pub fingerprint: String,
}

#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub seed: u64,
    pub strategy: GameplayStrategy,
    pub metrics: PlaythroughMetrics,
    pub final_snapshot: SessionSnapshot,
    pub recorded: Vec<SessionSummary>,
    /// Invariant breaches observed while playing.
    pub violations: Vec<String>,
    pub stopped_by_policy: bool,
}

impl SimulationSummary {
    #[must_use]
    pub fn recorded_summary(&self) -> Option<&SessionSummary> {
        self.recorded.last()
    }

    #[must_use]
    pub fn final_phase(&self) -> Phase {
        self.final_snapshot.state.phase
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GameTester {
    verbose: bool,
}

impl GameTester {
    #[must_use]
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    #[must_use]
    pub fn run_plan(&self, plan: &SimulationPlan, seed: u64) -> SimulationSummary {
        let recorder = MemoryRecorder::new();
        let mut engine = SessionEngine::new(seed, recorder.clone());
        let mut policy = plan.strategy.create_policy(seed);
        let mut watch = InvariantWatch::default();
        let mut metrics = PlaythroughMetrics::default();
        let mut hasher = Sha256::new();
        let mut stopped_by_policy = false;
        let max_moves = plan.max_moves.unwrap_or(DEFAULT_MAX_MOVES);

        if self.verbose {
            println!(
                "🎮 Starting playthrough | seed:{seed} policy:{}",
                plan.strategy.label()
            );
        }

        while metrics.moves < max_moves {
            let snapshot = engine.snapshot();
            let steps = match policy.next_move(&snapshot) {
                PolicyMove::Stop => {
                    stopped_by_policy = true;
                    break;
                }
                PolicyMove::Act(action) => engine.dispatch(action),
                PolicyMove::Wait(duration) => engine.advance_time(duration),
            };
            metrics.moves += 1;

            for step in &steps {
                tally(&mut metrics, step);
            }
            if let Some(generated) = entered_level(&snapshot, &engine.snapshot()) {
                metrics.levels_seen += 1;
                hasher.update(generated.as_bytes());
                let values: Vec<u32> = engine.blocks().iter().map(|b| b.value).collect();
                let target = engine.current_level().map_or(0, |l| l.target_sum);
                if find_solution(&values, target, usize::from(SOLUTION_SLOTS)).is_none() {
                    metrics.unsolvable_levels += 1;
                }
                if engine.last_generation().is_some_and(|g| g.fell_back) {
                    metrics.fell_back_levels += 1;
                }
            }
            watch.observe(&snapshot, &engine.snapshot(), &steps, recorder.len());
        }

        let final_snapshot = engine.snapshot();
        hasher.update(final_snapshot.state.score.to_le_bytes());
        metrics.fingerprint = format!("{:x}", hasher.finalize());
        if !stopped_by_policy {
            watch
                .violations
                .push(format!("policy did not finish within {max_moves} moves"));
        }

        if self.verbose {
            println!(
                "🏁 Finished | phase:{} score:{} moves:{}",
                final_snapshot.state.phase, final_snapshot.state.score, metrics.moves
            );
        }

        SimulationSummary {
            seed,
            strategy: plan.strategy,
            metrics,
            final_snapshot,
            recorded: recorder.summaries(),
            violations: watch.violations,
            stopped_by_policy,
        }
    }
}

fn tally(metrics: &mut PlaythroughMetrics, step: &Step) {
    if step.is_rejected() {
        metrics.rejected_actions += 1;
        return;
    }
    match step.phase {
        Phase::LevelCleared if step.score.is_some() => metrics.levels_cleared += 1,
        Phase::TimedOut => metrics.timeouts += 1,
        _ => {}
    }
    if step.check.is_some_and(|check| !check.success) {
        metrics.failed_checks += 1;
    }
}

/// Block values of a level the session just entered, as a hashable string.
fn entered_level(before: &SessionSnapshot, after: &SessionSnapshot) -> Option<String> {
    let entered = after.state.phase == Phase::LevelActive
        && (before.state.phase != Phase::LevelActive
            || before.state.level_index != after.state.level_index);
    entered.then(|| {
        after
            .state
            .blocks
            .iter()
            .map(|b| b.value.to_string())
            .collect::<Vec<_>>()
            .join(",")
    })
}

#[derive(Debug, Default)]
struct InvariantWatch {
    violations: Vec<String>,
}

impl InvariantWatch {
    fn observe(
        &mut self,
        before: &SessionSnapshot,
        after: &SessionSnapshot,
        steps: &[Step],
        recorded: usize,
    ) {
        let (b, a) = (&before.state, &after.state);
        let same_session = a.phase != Phase::Idle && b.phase != Phase::Idle;
        if same_session && b.phase != Phase::SessionComplete && a.score < b.score {
            self.flag(format!("score decreased from {} to {}", b.score, a.score));
        }
        if a.best_streak < a.streak {
            self.flag(format!(
                "best streak {} below streak {}",
                a.best_streak, a.streak
            ));
        }
        let placed = a.blocks.iter().filter(|blk| blk.is_placed()).count();
        if placed > usize::from(SOLUTION_SLOTS) {
            self.flag(format!("{placed} blocks placed in {SOLUTION_SLOTS} slots"));
        }
        if let Some(level) = &after.level
            && a.time_remaining_seconds > level.time_limit_seconds
        {
            self.flag(format!(
                "time remaining {} exceeds limit {}",
                a.time_remaining_seconds, level.time_limit_seconds
            ));
        }
        for step in steps {
            if step.check.is_some_and(|c| !c.success) && a.phase == Phase::LevelActive && a.streak != 0
            {
                self.flag("failed check left streak intact".to_string());
            }
        }
        let expected_records = usize::from(a.phase == Phase::SessionComplete);
        if a.phase != Phase::Idle && recorded != expected_records {
            self.flag(format!(
                "{recorded} summaries recorded while {}",
                a.phase
            ));
        }
        if a.phase.is_awaiting_advance() != after.pending_advance.is_some() {
            self.flag(format!(
                "pending advance mismatch while {}",
                a.phase
            ));
        }
    }

    fn flag(&mut self, message: String) {
        if !self.violations.contains(&message) {
            self.violations.push(message);
        }
    }
}
