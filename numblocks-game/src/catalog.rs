//! Level catalog: the ordered, read-only list of puzzle levels.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::constants::{MIN_SOLUTION_BLOCKS, TIME_LIMIT_SECONDS};

const DEFAULT_LEVEL_DATA: &str = include_str!("../data/levels.json");

/// Difficulty classification driving the generation strategy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyTier {
    #[default]
    Basic,
    Intermediate,
    Advanced,
}

impl DifficultyTier {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DifficultyTier {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(Self::Basic),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            _ => Err(()),
        }
    }
}

/// Immutable definition of a single level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDefinition {
    /// 1-based position in the catalog.
    pub level_number: u32,
    /// Sum the player must reach.
    pub target_sum: u32,
    /// Informational label shown next to the level.
    pub concept: String,
    /// Number of blocks presented to the player.
    pub max_blocks: usize,
    pub tier: DifficultyTier,
    #[serde(default = "LevelDefinition::default_time_limit")]
    pub time_limit_seconds: u32,
}

impl LevelDefinition {
    #[must_use]
    pub const fn default_time_limit() -> u32 {
        TIME_LIMIT_SECONDS
    }

    #[must_use]
    pub fn new(
        level_number: u32,
        target_sum: u32,
        concept: &str,
        max_blocks: usize,
        tier: DifficultyTier,
    ) -> Self {
        Self {
            level_number,
            target_sum,
            concept: concept.to_string(),
            max_blocks,
            tier,
            time_limit_seconds: TIME_LIMIT_SECONDS,
        }
    }
}

/// Errors raised when a level catalog violates its invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("level catalog is empty")]
    Empty,
    #[error("level at position {position} is numbered {found}, expected {expected}")]
    NonSequential {
        position: usize,
        expected: u32,
        found: u32,
    },
    #[error("level {level} has a target sum of {target}, which is below 2")]
    TargetTooSmall { level: u32, target: u32 },
    #[error("level {level} presents {max_blocks} blocks, at least {min} are required")]
    TooFewBlocks {
        level: u32,
        max_blocks: usize,
        min: usize,
    },
    #[error("level {level} has no time limit")]
    ZeroTimeLimit { level: u32 },
    #[error("level {level} is {tier} but follows a {previous} level")]
    TierRegression {
        level: u32,
        tier: DifficultyTier,
        previous: DifficultyTier,
    },
    #[error("level catalog is not valid JSON: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCatalog {
    levels: Vec<LevelDefinition>,
}

impl LevelCatalog {
    /// Parse and validate a catalog from JSON.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the JSON is malformed or the catalog is invalid.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Self =
            serde_json::from_str(json).map_err(|err| CatalogError::Parse(err.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Build a catalog from definitions, validating them.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` when any invariant is violated.
    pub fn from_levels(levels: Vec<LevelDefinition>) -> Result<Self, CatalogError> {
        let catalog = Self { levels };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Validate ordering, tier progression, and per-level bounds.
    ///
    /// # Errors
    ///
    /// Returns the first `CatalogError` encountered.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.levels.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut previous_tier = DifficultyTier::Basic;
        for (position, level) in self.levels.iter().enumerate() {
            let expected = u32::try_from(position + 1).unwrap_or(u32::MAX);
            if level.level_number != expected {
                return Err(CatalogError::NonSequential {
                    position,
                    expected,
                    found: level.level_number,
                });
            }
            if level.target_sum < 2 {
                return Err(CatalogError::TargetTooSmall {
                    level: level.level_number,
                    target: level.target_sum,
                });
            }
            if level.max_blocks < MIN_SOLUTION_BLOCKS {
                return Err(CatalogError::TooFewBlocks {
                    level: level.level_number,
                    max_blocks: level.max_blocks,
                    min: MIN_SOLUTION_BLOCKS,
                });
            }
            if level.time_limit_seconds == 0 {
                return Err(CatalogError::ZeroTimeLimit {
                    level: level.level_number,
                });
            }
            if level.tier < previous_tier {
                return Err(CatalogError::TierRegression {
                    level: level.level_number,
                    tier: level.tier,
                    previous: previous_tier,
                });
            }
            previous_tier = level.tier;
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&LevelDefinition> {
        self.levels.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Whether `index` is the final level of the catalog.
    #[must_use]
    pub fn is_last(&self, index: usize) -> bool {
        index + 1 >= self.levels.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LevelDefinition> {
        self.levels.iter()
    }

    fn builtin() -> Self {
        Self {
            levels: vec![
                LevelDefinition::new(1, 15, "Number Bonds", 6, DifficultyTier::Basic),
                LevelDefinition::new(2, 24, "Addition Facts", 6, DifficultyTier::Basic),
                LevelDefinition::new(3, 36, "Factors", 8, DifficultyTier::Intermediate),
                LevelDefinition::new(4, 42, "Multiples", 8, DifficultyTier::Intermediate),
                LevelDefinition::new(5, 60, "Prime Numbers", 10, DifficultyTier::Advanced),
            ],
        }
    }
}

impl Default for LevelCatalog {
    fn default() -> Self {
        Self::from_json(DEFAULT_LEVEL_DATA).unwrap_or_else(|err| {
            log::warn!("bundled level data rejected ({err}); using built-in catalog");
            Self::builtin()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_matches_reference_game() {
        let catalog = LevelCatalog::default();
        let targets: Vec<u32> = catalog.iter().map(|l| l.target_sum).collect();
        assert_eq!(targets, vec![15, 24, 36, 42, 60]);
        let tiers: Vec<DifficultyTier> = catalog.iter().map(|l| l.tier).collect();
        assert_eq!(
            tiers,
            vec![
                DifficultyTier::Basic,
                DifficultyTier::Basic,
                DifficultyTier::Intermediate,
                DifficultyTier::Intermediate,
                DifficultyTier::Advanced,
            ]
        );
        assert!(catalog.iter().all(|l| l.time_limit_seconds == 120));
    }

    #[test]
    fn bundled_data_agrees_with_builtin() {
        let parsed = LevelCatalog::from_json(DEFAULT_LEVEL_DATA).unwrap();
        assert_eq!(parsed, LevelCatalog::builtin());
    }

    #[test]
    fn last_level_detection() {
        let catalog = LevelCatalog::default();
        assert!(!catalog.is_last(0));
        assert!(catalog.is_last(4));
    }

    #[test]
    fn rejects_tier_regression() {
        let err = LevelCatalog::from_levels(vec![
            LevelDefinition::new(1, 15, "a", 6, DifficultyTier::Intermediate),
            LevelDefinition::new(2, 24, "b", 6, DifficultyTier::Basic),
        ])
        .unwrap_err();
        assert!(matches!(err, CatalogError::TierRegression { level: 2, .. }));
    }

    #[test]
    fn rejects_gaps_and_small_levels() {
        let gap = LevelCatalog::from_levels(vec![
            LevelDefinition::new(1, 15, "a", 6, DifficultyTier::Basic),
            LevelDefinition::new(3, 24, "b", 6, DifficultyTier::Basic),
        ]);
        assert!(matches!(gap, Err(CatalogError::NonSequential { found: 3, .. })));

        let tiny = LevelCatalog::from_levels(vec![LevelDefinition::new(
            1,
            1,
            "a",
            6,
            DifficultyTier::Basic,
        )]);
        assert_eq!(
            tiny,
            Err(CatalogError::TargetTooSmall {
                level: 1,
                target: 1
            })
        );

        let few = LevelCatalog::from_levels(vec![LevelDefinition::new(
            1,
            10,
            "a",
            1,
            DifficultyTier::Basic,
        )]);
        assert!(matches!(few, Err(CatalogError::TooFewBlocks { .. })));
        assert_eq!(LevelCatalog::from_levels(Vec::new()), Err(CatalogError::Empty));
    }

    #[test]
    fn malformed_json_reports_parse_error() {
        assert!(matches!(
            LevelCatalog::from_json("{ not json"),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn tier_round_trips_through_strings() {
        for tier in [
            DifficultyTier::Basic,
            DifficultyTier::Intermediate,
            DifficultyTier::Advanced,
        ] {
            assert_eq!(tier.as_str().parse::<DifficultyTier>(), Ok(tier));
        }
        assert!("expert".parse::<DifficultyTier>().is_err());
    }
}
