//! Engine configuration with documented bounds.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    GENERATION_ATTEMPTS, LEVEL_CLEAR_DELAY_MS, MIN_SOLUTION_BLOCKS, SOLUTION_SLOTS,
    TIMEOUT_ADVANCE_DELAY_MS,
};
use crate::generator::GeneratorConfig;

/// Errors raised when engine configuration invariants are violated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be between {min} and {max} (got {value})")]
    RangeViolation {
        field: &'static str,
        min: u64,
        max: u64,
        value: u64,
    },
    #[error("engine configuration is not valid JSON: {0}")]
    Parse(String),
}

/// Tunables for the session engine.
///
/// Per-level time limits live on [`crate::LevelDefinition`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "EngineConfig::default_slot_count")]
    pub slot_count: u8,
    #[serde(default = "EngineConfig::default_level_clear_delay")]
    pub level_clear_delay_ms: u64,
    #[serde(default = "EngineConfig::default_timeout_delay")]
    pub timeout_advance_delay_ms: u64,
    #[serde(default = "EngineConfig::default_generation_attempts")]
    pub generation_attempts: u32,
}

impl EngineConfig {
    #[must_use]
    pub const fn default_slot_count() -> u8 {
        SOLUTION_SLOTS
    }

    #[must_use]
    pub const fn default_level_clear_delay() -> u64 {
        LEVEL_CLEAR_DELAY_MS
    }

    #[must_use]
    pub const fn default_timeout_delay() -> u64 {
        TIMEOUT_ADVANCE_DELAY_MS
    }

    #[must_use]
    pub const fn default_generation_attempts() -> u32 {
        GENERATION_ATTEMPTS
    }

    /// Parse and validate a configuration from JSON; missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the JSON is malformed or a field is out of range.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|err| ConfigError::Parse(err.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when any field violates the documented bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range(
            "slot_count",
            u64::from(self.slot_count),
            MIN_SOLUTION_BLOCKS as u64,
            8,
        )?;
        check_range("level_clear_delay_ms", self.level_clear_delay_ms, 0, 60_000)?;
        check_range(
            "timeout_advance_delay_ms",
            self.timeout_advance_delay_ms,
            0,
            60_000,
        )?;
        check_range(
            "generation_attempts",
            u64::from(self.generation_attempts),
            1,
            1_000,
        )?;
        Ok(())
    }

    #[must_use]
    pub const fn generator(&self) -> GeneratorConfig {
        GeneratorConfig {
            slot_count: self.slot_count,
            attempts: self.generation_attempts,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            slot_count: Self::default_slot_count(),
            level_clear_delay_ms: Self::default_level_clear_delay(),
            timeout_advance_delay_ms: Self::default_timeout_delay(),
            generation_attempts: Self::default_generation_attempts(),
        }
    }
}

fn check_range(field: &'static str, value: u64, min: u64, max: u64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::RangeViolation {
            field,
            min,
            max,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate_and_match_reference_game() {
        let cfg = EngineConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.slot_count, 3);
        assert_eq!(cfg.generation_attempts, 24);
    }

    #[test]
    fn clear_and_timeout_delays_stay_distinct() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.level_clear_delay_ms, 2_500);
        assert_eq!(cfg.timeout_advance_delay_ms, 2_000);
        assert_ne!(cfg.level_clear_delay_ms, cfg.timeout_advance_delay_ms);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg = EngineConfig::from_json(r#"{ "generation_attempts": 6 }"#).unwrap();
        assert_eq!(cfg.generation_attempts, 6);
        assert_eq!(cfg.level_clear_delay_ms, LEVEL_CLEAR_DELAY_MS);
    }

    #[test]
    fn rejects_out_of_range_fields() {
        let err = EngineConfig::from_json(r#"{ "slot_count": 1 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::RangeViolation {
                field: "slot_count",
                ..
            }
        ));
        assert!(matches!(
            EngineConfig::from_json("[]"),
            Err(ConfigError::Parse(_))
        ));
    }
}
