use anyhow::{Result, ensure};
use numblocks_game::Phase;

use crate::logic::game_tester::{GameTester, SimulationPlan, SimulationSummary};
use crate::logic::policy::GameplayStrategy;

/// Score of a zero-think perfect run over the bundled catalog:
/// progression 20+40+60+80+100 plus streak bonuses 0+5+10+15+20.
const INSTANT_PERFECT_SCORE: u32 = 350;
/// Twenty seconds spent on each of five levels.
const SLOW_SOLVER_SPEED_POINTS: u32 = 100;
/// Five 120 s countdowns plus four 2 s timeout delays, then the final one.
const FULL_TIMEOUT_RUN_SECONDS: u64 = 610;

#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub plan: SimulationPlan,
}

impl TestScenario {
    #[must_use]
    pub fn simulation(name: impl Into<String>, plan: SimulationPlan) -> Self {
        Self {
            name: name.into(),
            plan,
        }
    }
}

const SCENARIOS: &[(&str, &str)] = &[
    ("smoke", "Solve every level once and finish the session"),
    ("perfect-run", "Instant solves score exactly 350 with a streak of 5"),
    ("slow-solver", "Twenty-second solves add speed points on every level"),
    ("timeouts", "Idle through every level; session ends incomplete"),
    ("fumbles", "Random placements and checks never break invariants"),
    ("reset-during-advance", "Reset while a level-clear advance is pending"),
    ("mixed-play", "Per-level mix of solving, fumbling and idling"),
    ("deterministic-replay", "Same seed replays the same blocks and score"),
];

#[must_use]
pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    SCENARIOS.to_vec()
}

#[must_use]
pub fn all_scenario_keys() -> Vec<String> {
    SCENARIOS.iter().map(|(key, _)| (*key).to_string()).collect()
}

fn completes_session(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.final_phase() == Phase::SessionComplete,
        "session should complete, ended in {}",
        summary.final_phase()
    );
    ensure!(
        summary.recorded.len() == 1,
        "exactly one summary should be recorded, got {}",
        summary.recorded.len()
    );
    ensure!(
        summary.metrics.unsolvable_levels == 0,
        "{} generated levels had no solution",
        summary.metrics.unsolvable_levels
    );
    Ok(())
}

fn clears_everything(summary: &SimulationSummary) -> Result<()> {
    completes_session(summary)?;
    let recorded = summary.recorded_summary();
    ensure!(
        recorded.is_some_and(|s| s.completed && s.best_streak == 5),
        "perfect run should record completed=true with best streak 5"
    );
    ensure!(
        summary.metrics.failed_checks == 0,
        "solver should never fail a check"
    );
    Ok(())
}

fn instant_perfect_score(summary: &SimulationSummary) -> Result<()> {
    clears_everything(summary)?;
    let score = summary.final_snapshot.state.score;
    ensure!(
        score == INSTANT_PERFECT_SCORE,
        "expected score {INSTANT_PERFECT_SCORE}, got {score}"
    );
    Ok(())
}

fn slow_perfect_score(summary: &SimulationSummary) -> Result<()> {
    clears_everything(summary)?;
    let score = summary.final_snapshot.state.score;
    let expected = INSTANT_PERFECT_SCORE + SLOW_SOLVER_SPEED_POINTS;
    ensure!(score == expected, "expected score {expected}, got {score}");
    Ok(())
}

fn every_level_times_out(summary: &SimulationSummary) -> Result<()> {
    completes_session(summary)?;
    let recorded = summary
        .recorded_summary()
        .ok_or_else(|| anyhow::anyhow!("missing session summary"))?;
    ensure!(!recorded.completed, "timed-out run must not count as completed");
    ensure!(recorded.final_score == 0, "idle run scored {}", recorded.final_score);
    ensure!(
        recorded.duration_seconds == FULL_TIMEOUT_RUN_SECONDS,
        "expected {FULL_TIMEOUT_RUN_SECONDS}s, got {}s",
        recorded.duration_seconds
    );
    ensure!(summary.metrics.timeouts == 5, "expected 5 timeouts");
    Ok(())
}

fn survives_fumbling(summary: &SimulationSummary) -> Result<()> {
    completes_session(summary)?;
    ensure!(
        summary.metrics.levels_seen == 5,
        "all five levels should be visited, saw {}",
        summary.metrics.levels_seen
    );
    Ok(())
}

fn reset_discards_session(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.final_phase() == Phase::Idle,
        "reset should leave the session idle, found {}",
        summary.final_phase()
    );
    ensure!(
        summary.recorded.is_empty(),
        "reset session must not be recorded"
    );
    ensure!(
        summary.final_snapshot.pending_advance.is_none(),
        "pending advance survived reset"
    );
    ensure!(
        summary.final_snapshot.state.score == 0,
        "reset should clear the score"
    );
    Ok(())
}

fn replays_identically(summary: &SimulationSummary) -> Result<()> {
    completes_session(summary)?;
    let replay = GameTester::new(false).run_plan(&SimulationPlan::new(summary.strategy), summary.seed);
    ensure!(
        replay.metrics.fingerprint == summary.metrics.fingerprint,
        "replay fingerprint {} differs from {}",
        replay.metrics.fingerprint,
        summary.metrics.fingerprint
    );
    ensure!(
        replay.final_snapshot.state.score == summary.final_snapshot.state.score,
        "replay score differs"
    );
    Ok(())
}

#[must_use]
pub fn get_scenario(name: &str) -> Option<TestScenario> {
    let scenario = match name.to_lowercase().as_str() {
        "smoke" => TestScenario::simulation(
            "Smoke",
            SimulationPlan::new(GameplayStrategy::Solver).with_expectation(completes_session),
        ),
        "perfect-run" | "perfect" => TestScenario::simulation(
            "Perfect Run",
            SimulationPlan::new(GameplayStrategy::Solver).with_expectation(instant_perfect_score),
        ),
        "slow-solver" | "slow" => TestScenario::simulation(
            "Slow Solver",
            SimulationPlan::new(GameplayStrategy::SlowSolver)
                .with_expectation(slow_perfect_score),
        ),
        "timeouts" | "idle" => TestScenario::simulation(
            "Timeouts",
            SimulationPlan::new(GameplayStrategy::Idler).with_expectation(every_level_times_out),
        ),
        "fumbles" | "fumbler" => TestScenario::simulation(
            "Fumbles",
            SimulationPlan::new(GameplayStrategy::Fumbler).with_expectation(survives_fumbling),
        ),
        "reset-during-advance" | "reset" => TestScenario::simulation(
            "Reset During Advance",
            SimulationPlan::new(GameplayStrategy::Resetter)
                .with_max_moves(50)
                .with_expectation(reset_discards_session),
        ),
        "mixed-play" | "mixed" => TestScenario::simulation(
            "Mixed Play",
            SimulationPlan::new(GameplayStrategy::Mixed).with_expectation(completes_session),
        ),
        "deterministic-replay" | "deterministic" => TestScenario::simulation(
            "Deterministic Replay",
            SimulationPlan::new(GameplayStrategy::Mixed).with_expectation(replays_identically),
        ),
        _ => return None,
    };
    Some(scenario)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::LogicTester;

    #[test]
    fn every_listed_scenario_resolves() {
        for (key, _) in list_scenarios() {
            assert!(get_scenario(key).is_some(), "{key} did not resolve");
        }
        assert!(get_scenario("unknown").is_none());
    }

    #[test]
    fn every_scenario_passes_on_a_few_seeds() {
        let tester = LogicTester::new(false);
        for key in all_scenario_keys() {
            let scenario = get_scenario(&key).unwrap();
            for result in tester.run_scenario(&scenario, &[1, 1337], 3) {
                assert!(result.passed, "{key}: {:?}", result.failures);
            }
        }
    }
}
