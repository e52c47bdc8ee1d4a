//! Win-condition checks and subset-sum search.
use serde::{Deserialize, Serialize};

use crate::block::Block;
use crate::constants::MIN_SOLUTION_BLOCKS;

/// Outcome of checking the solution area against a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionCheck {
    pub success: bool,
    pub current_sum: u32,
    pub placed: usize,
    pub target: u32,
}

impl SolutionCheck {
    /// Signed distance from the target (`current_sum - target`).
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.current_sum) - i64::from(self.target)
    }
}

/// Sum placed blocks and decide whether they hit `target`.
///
/// A single block never counts, even when its value equals the target.
#[must_use]
pub fn check_solution(blocks: &[Block], target: u32) -> SolutionCheck {
    let (placed, current_sum) = blocks
        .iter()
        .filter(|block| block.is_placed())
        .fold((0usize, 0u32), |(count, sum), block| {
            (count + 1, sum.saturating_add(block.value))
        });
    SolutionCheck {
        success: current_sum == target && placed >= MIN_SOLUTION_BLOCKS,
        current_sum,
        placed,
        target,
    }
}

/// Indices of a subset of `values` with `2..=max_terms` members summing to `target`.
///
/// Returns the lexicographically first subset by index, or `None`.
#[must_use]
pub fn find_solution(values: &[u32], target: u32, max_terms: usize) -> Option<Vec<usize>> {
    if max_terms < MIN_SOLUTION_BLOCKS {
        return None;
    }
    let mut chosen = Vec::with_capacity(max_terms);
    search(values, target, max_terms, 0, 0, &mut chosen).then_some(chosen)
}

/// Whether any valid subset exists.
#[must_use]
pub fn is_solvable(values: &[u32], target: u32, max_terms: usize) -> bool {
    find_solution(values, target, max_terms).is_some()
}

fn search(
    values: &[u32],
    target: u32,
    max_terms: usize,
    start: usize,
    sum: u32,
    chosen: &mut Vec<usize>,
) -> bool {
    if sum == target && chosen.len() >= MIN_SOLUTION_BLOCKS {
        return true;
    }
    if chosen.len() == max_terms {
        return false;
    }
    for index in start..values.len() {
        let next = sum.saturating_add(values[index]);
        if next > target {
            continue;
        }
        chosen.push(index);
        if search(values, target, max_terms, index + 1, next, chosen) {
            return true;
        }
        chosen.pop();
    }
    false
}
