use std::fmt;
use std::time::Duration;

use numblocks_game::block::occupant;
use numblocks_game::constants::SOLUTION_SLOTS;
use numblocks_game::{Action, BlockId, Phase, SessionSnapshot, find_solution};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Wait used while the engine is between levels.
const ADVANCE_POLL: Duration = Duration::from_millis(500);

/// Next thing a scripted player does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyMove {
    Act(Action),
    Wait(Duration),
    Stop,
}

/// Policy interface for automated play strategies.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Pick the next move given the current snapshot.
    fn next_move(&mut self, snapshot: &SessionSnapshot) -> PolicyMove;
}

/// Built-in gameplay strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameplayStrategy {
    /// Solves every level immediately.
    Solver,
    /// Solves every level after twenty seconds of thought.
    SlowSolver,
    /// Never touches a block; every level times out.
    Idler,
    /// Random placements and checks.
    Fumbler,
    /// Clears level 1, then resets while the advance is pending.
    Resetter,
    /// Picks solve, fumble-then-solve, or idle per level.
    Mixed,
}

impl GameplayStrategy {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            GameplayStrategy::Solver => "Solver",
            GameplayStrategy::SlowSolver => "Slow Solver",
            GameplayStrategy::Idler => "Idler",
            GameplayStrategy::Fumbler => "Fumbler",
            GameplayStrategy::Resetter => "Resetter",
            GameplayStrategy::Mixed => "Mixed",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy + Send> {
        match self {
            GameplayStrategy::Solver => Box::new(SolverPolicy::new(Duration::ZERO)),
            GameplayStrategy::SlowSolver => {
                Box::new(SolverPolicy::new(Duration::from_secs(20)))
            }
            GameplayStrategy::Idler => Box::new(IdlerPolicy),
            GameplayStrategy::Fumbler => Box::new(FumblerPolicy::new(seed)),
            GameplayStrategy::Resetter => Box::new(ResetterPolicy::default()),
            GameplayStrategy::Mixed => Box::new(MixedPolicy::new(seed)),
        }
    }
}

impl fmt::Display for GameplayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Move toward the first valid solution: fill slots, clear strays, then check.
fn solve_step(snapshot: &SessionSnapshot) -> Option<Action> {
    let level = snapshot.level.as_ref()?;
    let blocks = &snapshot.state.blocks;
    let values: Vec<u32> = blocks.iter().map(|b| b.value).collect();
    let plan: Vec<BlockId> = find_solution(&values, level.target_sum, usize::from(SOLUTION_SLOTS))?
        .into_iter()
        .map(|index| blocks[index].id)
        .collect();

    for (slot, &id) in (0u8..).zip(plan.iter()) {
        if occupant(blocks, slot).map(|b| b.id) != Some(id) {
            return Some(Action::PlaceBlock { block: id, slot });
        }
    }
    if let Some(stray) = blocks
        .iter()
        .find(|b| b.is_placed() && !plan.contains(&b.id))
    {
        return Some(Action::RemoveBlock { block: stray.id });
    }
    Some(Action::CheckSolution)
}

fn between_levels(snapshot: &SessionSnapshot) -> Option<PolicyMove> {
    match snapshot.state.phase {
        Phase::Idle => Some(PolicyMove::Act(Action::Start)),
        Phase::LevelCleared | Phase::TimedOut => Some(PolicyMove::Wait(ADVANCE_POLL)),
        Phase::SessionComplete => Some(PolicyMove::Stop),
        Phase::LevelActive => None,
    }
}

struct SolverPolicy {
    think: Duration,
    thought_on: Option<usize>,
}

impl SolverPolicy {
    const fn new(think: Duration) -> Self {
        Self {
            think,
            thought_on: None,
        }
    }
}

impl PlayerPolicy for SolverPolicy {
    fn name(&self) -> &'static str {
        "solver"
    }

    fn next_move(&mut self, snapshot: &SessionSnapshot) -> PolicyMove {
        if let Some(mv) = between_levels(snapshot) {
            return mv;
        }
        let level = snapshot.state.level_index;
        if !self.think.is_zero() && self.thought_on != Some(level) {
            self.thought_on = Some(level);
            return PolicyMove::Wait(self.think);
        }
        solve_step(snapshot).map_or(PolicyMove::Wait(Duration::from_secs(1)), PolicyMove::Act)
    }
}

struct IdlerPolicy;

impl PlayerPolicy for IdlerPolicy {
    fn name(&self) -> &'static str {
        "idler"
    }

    fn next_move(&mut self, snapshot: &SessionSnapshot) -> PolicyMove {
        between_levels(snapshot).unwrap_or(PolicyMove::Wait(Duration::from_secs(1)))
    }
}

struct FumblerPolicy {
    rng: ChaCha20Rng,
}

impl FumblerPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    fn fumble(&mut self, snapshot: &SessionSnapshot) -> PolicyMove {
        let blocks = &snapshot.state.blocks;
        if blocks.is_empty() {
            return PolicyMove::Wait(Duration::from_secs(1));
        }
        match self.rng.gen_range(0..10) {
            0..=3 => {
                let block = blocks[self.rng.gen_range(0..blocks.len())].id;
                let slot = self.rng.gen_range(0..=SOLUTION_SLOTS);
                PolicyMove::Act(Action::PlaceBlock { block, slot })
            }
            4 => {
                let block = blocks[self.rng.gen_range(0..blocks.len())].id;
                PolicyMove::Act(Action::RemoveBlock { block })
            }
            5 | 6 => PolicyMove::Act(Action::CheckSolution),
            _ => PolicyMove::Wait(Duration::from_secs(1)),
        }
    }
}

impl PlayerPolicy for FumblerPolicy {
    fn name(&self) -> &'static str {
        "fumbler"
    }

    fn next_move(&mut self, snapshot: &SessionSnapshot) -> PolicyMove {
        between_levels(snapshot).unwrap_or_else(|| self.fumble(snapshot))
    }
}

#[derive(Default)]
struct ResetterPolicy {
    reset_done: bool,
    waited: bool,
}

impl PlayerPolicy for ResetterPolicy {
    fn name(&self) -> &'static str {
        "resetter"
    }

    fn next_move(&mut self, snapshot: &SessionSnapshot) -> PolicyMove {
        match snapshot.state.phase {
            Phase::Idle if self.reset_done => {
                if self.waited {
                    PolicyMove::Stop
                } else {
                    self.waited = true;
                    PolicyMove::Wait(Duration::from_secs(10))
                }
            }
            Phase::Idle => PolicyMove::Act(Action::Start),
            Phase::LevelCleared => {
                self.reset_done = true;
                PolicyMove::Act(Action::Reset)
            }
            Phase::LevelActive => {
                solve_step(snapshot).map_or(PolicyMove::Wait(Duration::from_secs(1)), PolicyMove::Act)
            }
            Phase::TimedOut | Phase::SessionComplete => PolicyMove::Stop,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LevelPlan {
    Solve,
    FumbleThenSolve(u8),
    Idle,
}

struct MixedPolicy {
    rng: ChaCha20Rng,
    fumbler: FumblerPolicy,
    plan: Option<(usize, LevelPlan)>,
}

impl MixedPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            fumbler: FumblerPolicy::new(seed.rotate_left(17)),
            plan: None,
        }
    }

    fn plan_for(&mut self, level: usize) -> LevelPlan {
        match self.plan {
            Some((planned, plan)) if planned == level => plan,
            _ => {
                let plan = match self.rng.gen_range(0..4) {
                    0 | 1 => LevelPlan::Solve,
                    2 => LevelPlan::FumbleThenSolve(self.rng.gen_range(3..12)),
                    _ => LevelPlan::Idle,
                };
                self.plan = Some((level, plan));
                plan
            }
        }
    }
}

impl PlayerPolicy for MixedPolicy {
    fn name(&self) -> &'static str {
        "mixed"
    }

    fn next_move(&mut self, snapshot: &SessionSnapshot) -> PolicyMove {
        if let Some(mv) = between_levels(snapshot) {
            return mv;
        }
        let level = snapshot.state.level_index;
        match self.plan_for(level) {
            LevelPlan::Idle => PolicyMove::Wait(Duration::from_secs(1)),
            LevelPlan::FumbleThenSolve(left) if left > 0 => {
                self.plan = Some((level, LevelPlan::FumbleThenSolve(left - 1)));
                self.fumbler.fumble(snapshot)
            }
            LevelPlan::FumbleThenSolve(_) | LevelPlan::Solve => solve_step(snapshot)
                .map_or(PolicyMove::Wait(Duration::from_secs(1)), PolicyMove::Act),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use numblocks_game::{MemoryRecorder, SessionEngine};

    #[test]
    fn solver_places_then_checks() {
        let mut engine = SessionEngine::new(1, MemoryRecorder::new());
        engine.start();
        let mut policy = GameplayStrategy::Solver.create_policy(1);
        let mut moves = 0;
        while engine.phase() == Phase::LevelActive && moves < 10 {
            match policy.next_move(&engine.snapshot()) {
                PolicyMove::Act(action) => {
                    engine.dispatch(action);
                }
                other => panic!("unexpected move {other:?}"),
            }
            moves += 1;
        }
        assert_eq!(engine.phase(), Phase::LevelCleared);
        assert!(moves <= 4);
    }

    #[test]
    fn idler_only_waits_during_levels() {
        let mut engine = SessionEngine::new(2, MemoryRecorder::new());
        let mut policy = GameplayStrategy::Idler.create_policy(2);
        assert_eq!(
            policy.next_move(&engine.snapshot()),
            PolicyMove::Act(Action::Start)
        );
        engine.start();
        assert_eq!(
            policy.next_move(&engine.snapshot()),
            PolicyMove::Wait(Duration::from_secs(1))
        );
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(GameplayStrategy::SlowSolver.to_string(), "Slow Solver");
    }
}
