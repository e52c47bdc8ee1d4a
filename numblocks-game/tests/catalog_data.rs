use numblocks_game::{CatalogError, DifficultyTier, EngineConfig, LevelCatalog};

const LEVELS_JSON: &str = include_str!("../data/levels.json");

#[test]
fn bundled_levels_match_reference_table() {
    let catalog = LevelCatalog::from_json(LEVELS_JSON).unwrap();
    let rows: Vec<(u32, u32, &str, usize, DifficultyTier)> = catalog
        .iter()
        .map(|l| {
            (
                l.level_number,
                l.target_sum,
                l.concept.as_str(),
                l.max_blocks,
                l.tier,
            )
        })
        .collect();
    assert_eq!(
        rows,
        vec![
            (1, 15, "Number Bonds", 6, DifficultyTier::Basic),
            (2, 24, "Addition Facts", 6, DifficultyTier::Basic),
            (3, 36, "Factors", 8, DifficultyTier::Intermediate),
            (4, 42, "Multiples", 8, DifficultyTier::Intermediate),
            (5, 60, "Prime Numbers", 10, DifficultyTier::Advanced),
        ]
    );
    assert!(catalog.iter().all(|l| l.time_limit_seconds == 120));
    assert_eq!(catalog, LevelCatalog::default());
}

#[test]
fn custom_catalog_drives_engine() {
    let json = r#"{ "levels": [
        { "level_number": 1, "target_sum": 10, "concept": "Tens", "max_blocks": 5, "tier": "basic", "time_limit_seconds": 30 },
        { "level_number": 2, "target_sum": 20, "concept": "Twenties", "max_blocks": 6, "tier": "advanced" }
    ] }"#;
    let catalog = LevelCatalog::from_json(json).unwrap();
    assert_eq!(catalog.get(1).map(|l| l.time_limit_seconds), Some(120));

    let config = EngineConfig::from_json(r#"{ "level_clear_delay_ms": 0 }"#).unwrap();
    let mut engine =
        numblocks_game::SessionEngine::with_setup(3, catalog, config, numblocks_game::NullRecorder)
            .unwrap();
    engine.start();
    assert_eq!(engine.blocks().len(), 5);
    assert_eq!(engine.state().time_remaining_seconds, 30);
}

#[test]
fn malformed_catalogs_are_rejected() {
    assert!(matches!(
        LevelCatalog::from_json(r#"{ "levels": [] }"#),
        Err(CatalogError::Empty)
    ));
    assert!(matches!(
        LevelCatalog::from_json("{"),
        Err(CatalogError::Parse(_))
    ));
    let skipped = r#"{ "levels": [
        { "level_number": 1, "target_sum": 10, "concept": "a", "max_blocks": 4, "tier": "basic" },
        { "level_number": 3, "target_sum": 12, "concept": "b", "max_blocks": 4, "tier": "basic" }
    ] }"#;
    assert!(matches!(
        LevelCatalog::from_json(skipped),
        Err(CatalogError::NonSequential { .. })
    ));
}
