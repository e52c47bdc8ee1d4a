use std::collections::HashSet;

use numblocks_game::{
    DifficultyTier, GeneratorConfig, LevelCatalog, LevelDefinition, find_solution,
    generate_puzzle, is_prime, level_stream,
};

const SEEDS_PER_LEVEL: u64 = 1_000;

fn assert_puzzle_shape(level: &LevelDefinition, seed: u64) {
    let cfg = GeneratorConfig::default();
    let mut rng = level_stream(seed, usize::try_from(level.level_number - 1).unwrap());
    let puzzle = generate_puzzle(level, &cfg, &mut rng);
    let label = format!("level {} seed {seed}", level.level_number);

    assert_eq!(puzzle.blocks.len(), level.max_blocks, "{label}: block count");
    let ids: HashSet<u32> = puzzle.blocks.iter().map(|b| b.id.0).collect();
    assert_eq!(ids.len(), puzzle.blocks.len(), "{label}: duplicate ids");
    assert!(
        puzzle.blocks.iter().all(|b| b.value > 0 && !b.is_placed()),
        "{label}: values must be positive and unplaced"
    );

    let planted = puzzle.planted_values();
    assert!(
        (2..=usize::from(cfg.slot_count)).contains(&planted.len()),
        "{label}: planted size {}",
        planted.len()
    );
    assert_eq!(planted.iter().sum::<u32>(), level.target_sum, "{label}: planted sum");

    let values: Vec<u32> = puzzle.blocks.iter().map(|b| b.value).collect();
    assert!(
        find_solution(&values, level.target_sum, usize::from(cfg.slot_count)).is_some(),
        "{label}: unsolvable"
    );

    if level.tier == DifficultyTier::Advanced && !puzzle.fell_back {
        assert!(planted.iter().any(|&v| is_prime(v)), "{label}: no planted prime");
    }
}

#[test]
fn every_level_generates_solvable_sets_across_seeds() {
    let catalog = LevelCatalog::default();
    for level in catalog.iter() {
        for seed in 0..SEEDS_PER_LEVEL {
            assert_puzzle_shape(level, seed);
        }
    }
}

#[test]
fn generation_is_reproducible_per_stream() {
    let catalog = LevelCatalog::default();
    let cfg = GeneratorConfig::default();
    for (index, level) in catalog.iter().enumerate() {
        let a = generate_puzzle(level, &cfg, &mut level_stream(0xDEAD_BEEF, index));
        let b = generate_puzzle(level, &cfg, &mut level_stream(0xDEAD_BEEF, index));
        assert_eq!(a, b);
    }
}

#[test]
fn tier_strategies_rarely_fall_back() {
    let catalog = LevelCatalog::default();
    let cfg = GeneratorConfig::default();
    for (index, level) in catalog.iter().enumerate() {
        let fallbacks = (0..200u64)
            .filter(|&seed| generate_puzzle(level, &cfg, &mut level_stream(seed, index)).fell_back)
            .count();
        assert!(
            fallbacks < 10,
            "level {} fell back {fallbacks} times in 200 seeds",
            level.level_number
        );
    }
}

#[test]
fn tiny_targets_still_produce_two_block_solutions() {
    let level = LevelDefinition::new(1, 2, "Pairs", 4, DifficultyTier::Advanced);
    let cfg = GeneratorConfig::default();
    for seed in 0..100 {
        let puzzle = generate_puzzle(&level, &cfg, &mut level_stream(seed, 0));
        assert_eq!(puzzle.blocks.len(), 4);
        assert_eq!(puzzle.planted_values().iter().sum::<u32>(), 2);
    }
}
