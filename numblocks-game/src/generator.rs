//! Puzzle generation: plants a solution, adds distractors, pads, and shuffles.
//!
//! Every strategy first plants a subset that sums to the level target and fits
//! the solution area, then surrounds it with distractors and padding. The
//! finished set is verified with [`find_solution`] before it is returned; a
//! failed attempt is retried with fresh draws and, once the attempt budget is
//! spent, replaced by the `basic` strategy, which cannot fail.
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::block::{Block, BlockId};
use crate::catalog::{DifficultyTier, LevelDefinition};
use crate::constants::{
    ADVANCED_DISTRACTOR_CAP, ADVANCED_MULTIPLE_DISTRACTORS, ADVANCED_PAD_MAX,
    ADVANCED_PRIME_DISTRACTORS, BASIC_PAD_MAX, BASIC_TERM_MAX, GENERATION_ATTEMPTS,
    INTERMEDIATE_DISTRACTOR_CAP, INTERMEDIATE_DISTRACTORS_MAX, INTERMEDIATE_DISTRACTORS_MIN,
    INTERMEDIATE_PAD_MAX, INTERMEDIATE_PAIR_QUOTIENT_MAX, LOG_GENERATOR_FALLBACK,
    LOG_GENERATOR_RETRY, MIN_SOLUTION_BLOCKS, PAD_DISTINCT_DRAWS, SOLUTION_SLOTS,
};
use crate::numbers::{factors_of, primes_up_to};
use crate::validator::is_solvable;

/// Tunables shared by every generation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Largest planted solution, bounded by the solution area.
    pub slot_count: u8,
    /// Attempts per tier strategy before the `basic` fallback.
    pub attempts: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            slot_count: SOLUTION_SLOTS,
            attempts: GENERATION_ATTEMPTS,
        }
    }
}

/// Why a single generation attempt was discarded.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("no prime at most {limit} to plant")]
    NoPrime { limit: u32 },
    #[error("planted solution needs {terms} terms but the solution area holds {max_terms}")]
    TooManyTerms { terms: usize, max_terms: usize },
    #[error("decomposition of {target} produced only {terms} terms")]
    IncompleteDecomposition { target: u32, terms: usize },
    #[error("planted solution needs {planted} blocks but only {max_blocks} are presented")]
    PlantedExceedsCapacity { planted: usize, max_blocks: usize },
    #[error("no subset of the generated blocks sums to {target}")]
    Unsolvable { target: u32 },
}

/// A finished block set plus generation telemetry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedPuzzle {
    pub blocks: Vec<Block>,
    /// Ids of the planted solution blocks.
    pub planted: Vec<BlockId>,
    /// Strategy that produced the set.
    pub strategy: DifficultyTier,
    /// Attempts consumed, including the successful one.
    pub attempts: u32,
    pub fell_back: bool,
}

impl GeneratedPuzzle {
    /// Values of the planted blocks.
    #[must_use]
    pub fn planted_values(&self) -> Vec<u32> {
        self.blocks
            .iter()
            .filter(|block| self.planted.contains(&block.id))
            .map(|block| block.value)
            .collect()
    }
}

/// Generate the blocks for `level` with the default configuration.
pub fn generate_blocks<R: Rng + ?Sized>(level: &LevelDefinition, rng: &mut R) -> Vec<Block> {
    generate_puzzle(level, &GeneratorConfig::default(), rng).blocks
}

/// Generate a verified puzzle for `level`.
///
/// Always returns exactly `level.max_blocks` blocks containing a subset of
/// `2..=slot_count` blocks that sums to `level.target_sum`.
pub fn generate_puzzle<R: Rng + ?Sized>(
    level: &LevelDefinition,
    cfg: &GeneratorConfig,
    rng: &mut R,
) -> GeneratedPuzzle {
    let budget = cfg.attempts.max(1);
    for attempt in 1..=budget {
        match attempt_tier(level, level.tier, cfg, rng) {
            Ok((blocks, planted)) => {
                return GeneratedPuzzle {
                    blocks,
                    planted,
                    strategy: level.tier,
                    attempts: attempt,
                    fell_back: false,
                };
            }
            Err(err) => {
                log::debug!(
                    "{LOG_GENERATOR_RETRY}: level {} attempt {attempt}/{budget}: {err}",
                    level.level_number
                );
            }
        }
    }

    log::warn!(
        "{LOG_GENERATOR_FALLBACK}: level {} ({}) exhausted {budget} attempts",
        level.level_number,
        level.tier
    );
    let (blocks, planted) = basic_fallback(level, cfg, rng);
    GeneratedPuzzle {
        blocks,
        planted,
        strategy: DifficultyTier::Basic,
        attempts: budget.saturating_add(1),
        fell_back: true,
    }
}

type Assembled = (Vec<Block>, Vec<BlockId>);

fn max_terms(level: &LevelDefinition, cfg: &GeneratorConfig) -> usize {
    usize::from(cfg.slot_count).min(level.max_blocks)
}

fn attempt_tier<R: Rng + ?Sized>(
    level: &LevelDefinition,
    tier: DifficultyTier,
    cfg: &GeneratorConfig,
    rng: &mut R,
) -> Result<Assembled, GenerationError> {
    let max_terms = max_terms(level, cfg);
    let target = level.target_sum;
    let (planted, distractors, pad_max) = match tier {
        DifficultyTier::Basic => (
            decompose(target, max_terms, MIN_SOLUTION_BLOCKS, rng)?,
            Vec::new(),
            BASIC_PAD_MAX,
        ),
        DifficultyTier::Intermediate => (
            plant_factor_pair(target, max_terms, rng)?,
            factor_distractors(target, rng),
            INTERMEDIATE_PAD_MAX,
        ),
        DifficultyTier::Advanced => (
            plant_prime(target, max_terms, rng)?,
            prime_distractors(rng),
            ADVANCED_PAD_MAX,
        ),
    };
    assemble(level, cfg, &planted, distractors, pad_max, rng)
}

fn basic_fallback<R: Rng + ?Sized>(
    level: &LevelDefinition,
    cfg: &GeneratorConfig,
    rng: &mut R,
) -> Assembled {
    if let Ok(assembled) = attempt_tier(level, DifficultyTier::Basic, cfg, rng) {
        return assembled;
    }
    // Catalog validation guarantees target >= 2 and max_blocks >= 2.
    let target = level.target_sum.max(2);
    let planted = [1, target - 1];
    let pads = pad_values(&planted, level.max_blocks.saturating_sub(2), BASIC_PAD_MAX, rng);
    let mut values = planted.to_vec();
    values.extend(pads);
    shuffle_into_blocks(values, planted.len(), rng)
}

/// Split `target` into random terms of at most [`BASIC_TERM_MAX`].
///
/// At most `max_terms` terms are produced; when the budget runs out the last
/// term takes whatever remains. At least `min_terms` terms are produced.
fn decompose<R: Rng + ?Sized>(
    target: u32,
    max_terms: usize,
    min_terms: usize,
    rng: &mut R,
) -> Result<Vec<u32>, GenerationError> {
    if max_terms < min_terms || max_terms == 0 {
        return Err(GenerationError::TooManyTerms {
            terms: min_terms,
            max_terms,
        });
    }
    let mut terms = Vec::with_capacity(max_terms);
    let mut remaining = target;
    while remaining > 0 && terms.len() + 1 < max_terms {
        let mut hi = remaining.min(BASIC_TERM_MAX);
        if terms.len() + 1 < min_terms {
            hi = hi.min(remaining - 1);
        }
        if hi == 0 {
            break;
        }
        let term = rng.gen_range(1..=hi);
        terms.push(term);
        remaining -= term;
    }
    if remaining > 0 {
        terms.push(remaining);
    }
    if terms.len() < min_terms {
        return Err(GenerationError::IncompleteDecomposition {
            target,
            terms: terms.len(),
        });
    }
    Ok(terms)
}

/// Plant `(f, target / f)` for a random proper factor `f`, closing the sum
/// with the remainder `target - f - target / f` when it is non-zero.
fn plant_factor_pair<R: Rng + ?Sized>(
    target: u32,
    max_terms: usize,
    rng: &mut R,
) -> Result<Vec<u32>, GenerationError> {
    let factors = factors_of(target);
    let Some(&factor) = factors.choose(rng) else {
        return decompose(target, max_terms, MIN_SOLUTION_BLOCKS, rng);
    };
    let quotient = target / factor;
    if quotient > INTERMEDIATE_PAIR_QUOTIENT_MAX {
        return decompose(target, max_terms, MIN_SOLUTION_BLOCKS, rng);
    }
    let mut planted = vec![factor, quotient];
    let pair_sum = factor + quotient;
    if pair_sum > target {
        return decompose(target, max_terms, MIN_SOLUTION_BLOCKS, rng);
    }
    if pair_sum < target {
        planted.push(target - pair_sum);
    }
    if planted.len() > max_terms {
        return Err(GenerationError::TooManyTerms {
            terms: planted.len(),
            max_terms,
        });
    }
    Ok(planted)
}

/// Plant a random prime `<= target / 2` plus a decomposition of the rest.
fn plant_prime<R: Rng + ?Sized>(
    target: u32,
    max_terms: usize,
    rng: &mut R,
) -> Result<Vec<u32>, GenerationError> {
    let limit = target / 2;
    let primes = primes_up_to(limit);
    let Some(&prime) = primes.choose(rng) else {
        return Err(GenerationError::NoPrime { limit });
    };
    if max_terms < MIN_SOLUTION_BLOCKS {
        return Err(GenerationError::TooManyTerms {
            terms: MIN_SOLUTION_BLOCKS,
            max_terms,
        });
    }
    let mut planted = vec![prime];
    planted.extend(decompose(target - prime, max_terms - 1, 1, rng)?);
    Ok(planted)
}

/// Two or three multiples of the target's factors, capped.
fn factor_distractors<R: Rng + ?Sized>(target: u32, rng: &mut R) -> Vec<u32> {
    let factors: Vec<u32> = factors_of(target)
        .into_iter()
        .filter(|&f| f <= INTERMEDIATE_DISTRACTOR_CAP)
        .collect();
    if factors.is_empty() {
        return Vec::new();
    }
    let count = rng.gen_range(INTERMEDIATE_DISTRACTORS_MIN..=INTERMEDIATE_DISTRACTORS_MAX);
    (0..count)
        .filter_map(|_| {
            let &factor = factors.choose(rng)?;
            let k = rng.gen_range(1..=INTERMEDIATE_DISTRACTOR_CAP / factor);
            Some(factor * k)
        })
        .collect()
}

/// A few primes and prime multiples, capped.
fn prime_distractors<R: Rng + ?Sized>(rng: &mut R) -> Vec<u32> {
    let primes = primes_up_to(ADVANCED_DISTRACTOR_CAP);
    let mut out: Vec<u32> = primes
        .choose_multiple(rng, ADVANCED_PRIME_DISTRACTORS)
        .copied()
        .collect();
    let small: Vec<u32> = primes
        .iter()
        .copied()
        .filter(|&p| p * 2 <= ADVANCED_DISTRACTOR_CAP)
        .collect();
    for _ in 0..ADVANCED_MULTIPLE_DISTRACTORS {
        if let Some(&prime) = small.choose(rng) {
            let k = rng.gen_range(2..=ADVANCED_DISTRACTOR_CAP / prime);
            out.push(prime * k);
        }
    }
    out
}

/// `count` random values in `[1, max]`, avoiding values already present
/// while unused ones remain.
fn pad_values<R: Rng + ?Sized>(existing: &[u32], count: usize, max: u32, rng: &mut R) -> Vec<u32> {
    let mut seen: Vec<u32> = existing.to_vec();
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let mut value = rng.gen_range(1..=max);
        let mut draws = 1;
        while seen.contains(&value) && draws < PAD_DISTINCT_DRAWS {
            value = rng.gen_range(1..=max);
            draws += 1;
        }
        seen.push(value);
        out.push(value);
    }
    out
}

fn assemble<R: Rng + ?Sized>(
    level: &LevelDefinition,
    cfg: &GeneratorConfig,
    planted: &[u32],
    distractors: Vec<u32>,
    pad_max: u32,
    rng: &mut R,
) -> Result<Assembled, GenerationError> {
    if planted.len() > level.max_blocks {
        return Err(GenerationError::PlantedExceedsCapacity {
            planted: planted.len(),
            max_blocks: level.max_blocks,
        });
    }
    let room = level.max_blocks - planted.len();
    let mut extras = distractors;
    // Only non-planted values are ever truncated.
    extras.truncate(room);
    let mut seen: Vec<u32> = planted.to_vec();
    seen.extend_from_slice(&extras);
    let pads = pad_values(&seen, room - extras.len(), pad_max, rng);
    extras.extend(pads);

    let mut values = planted.to_vec();
    values.extend(extras);
    if !is_solvable(&values, level.target_sum, max_terms(level, cfg)) {
        return Err(GenerationError::Unsolvable {
            target: level.target_sum,
        });
    }
    Ok(shuffle_into_blocks(values, planted.len(), rng))
}

/// Shuffle values (the first `planted` of which form the solution) and assign
/// ids in shuffled order.
fn shuffle_into_blocks<R: Rng + ?Sized>(
    values: Vec<u32>,
    planted: usize,
    rng: &mut R,
) -> Assembled {
    let mut tagged: Vec<(u32, bool)> = values
        .into_iter()
        .enumerate()
        .map(|(index, value)| (value, index < planted))
        .collect();
    tagged.shuffle(rng);
    let mut planted_ids = Vec::with_capacity(planted);
    let blocks = tagged
        .into_iter()
        .zip(0u32..)
        .map(|((value, is_planted), id)| {
            if is_planted {
                planted_ids.push(BlockId(id));
            }
            Block::new(BlockId(id), value)
        })
        .collect();
    (blocks, planted_ids)
}
