#![forbid(unsafe_code)]

//! Engine configuration loaded from TOML or JSON.
//!
//! ```toml
//! # bstep.toml
//! seed = 42
//!
//! [history]
//! max_depth = 50
//!
//! [random]
//! full_chance = 0.5
//! level_chances = [0.95, 0.7, 0.4, 0.2]
//! ```
//!
//! ```rust,ignore
//! let config = EngineConfig::from_toml_file("bstep.toml")?;
//! ```
//!
//! Every field has a default, so a partial document only overrides what it
//! names. Loaders run [`EngineConfig::validate`] and reject invalid values.

use std::path::Path;

use bstep_core::Value;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level EngineConfig
// ---------------------------------------------------------------------------

/// Tunable parameters of a bstep session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seed for random tree generation. `None` draws from OS entropy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub history: HistoryConfig,
    pub random: RandomTreeConfig,
}

impl EngineConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.checked()
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.checked()
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Load from a file, picking the format by extension (`.json` is JSON,
    /// everything else TOML).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.history.max_depth == 0 {
            errors.push("history.max_depth must be at least 1".to_string());
        }

        let random = &self.random;
        if !(0.0..=1.0).contains(&random.full_chance) {
            errors.push(format!(
                "random.full_chance must be in [0, 1], got {}",
                random.full_chance
            ));
        }
        for (i, chance) in random.level_chances.iter().enumerate() {
            if !(0.0..=1.0).contains(chance) {
                errors.push(format!(
                    "random.level_chances[{i}] must be in [0, 1], got {chance}"
                ));
            }
        }
        if random.default_min > random.default_max {
            errors.push(format!(
                "random.default_min ({}) must not exceed random.default_max ({})",
                random.default_min, random.default_max
            ));
        }

        errors
    }

    /// Serialize to a pretty TOML document.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn checked(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// History controller limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of applied entries kept for undo.
    pub max_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_depth: 100 }
    }
}

/// Shape parameters of random tree generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomTreeConfig {
    /// Probability that a node within the first `full_levels` levels gets
    /// both children unconditionally.
    pub full_chance: f64,
    /// Number of levels (counted from 1 below the root) where the
    /// full-node draw applies.
    pub full_levels: u32,
    /// Per-child probability at level 1, 2, ... Levels past the end of the
    /// list get no children.
    pub level_chances: Vec<f64>,
    /// Lower bound used when an operation does not name one.
    pub default_min: Value,
    /// Upper bound used when an operation does not name one.
    pub default_max: Value,
}

impl Default for RandomTreeConfig {
    fn default() -> Self {
        Self {
            full_chance: 0.5,
            full_levels: 3,
            level_chances: vec![0.95, 0.7, 0.4, 0.2],
            default_min: 0,
            default_max: 99,
        }
    }
}

impl RandomTreeConfig {
    /// Child probability for `level` when the full-node draw did not fire.
    #[must_use]
    pub fn level_chance(&self, level: u32) -> f64 {
        level
            .checked_sub(1)
            .and_then(|i| self.level_chances.get(i as usize))
            .copied()
            .unwrap_or(0.0)
    }
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Failure to load an [`EngineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_empty());
        assert_eq!(config.history.max_depth, 100);
        assert_eq!(config.random.level_chance(1), 0.95);
        assert_eq!(config.random.level_chance(4), 0.2);
        assert_eq!(config.random.level_chance(5), 0.0);
        assert_eq!(config.random.level_chance(0), 0.0);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            seed = 7

            [random]
            full_chance = 0.25
            "#,
        )
        .unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.random.full_chance, 0.25);
        assert_eq!(config.random.full_levels, 3);
        assert_eq!(config.history, HistoryConfig::default());
    }

    #[test]
    fn json_round_trip() {
        let mut config = EngineConfig::default();
        config.seed = Some(99);
        config.history.max_depth = 3;
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(EngineConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn toml_serialization_loads_back() {
        let config = EngineConfig::default();
        let text = config.to_toml_string().unwrap();
        assert_eq!(EngineConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn invalid_values_are_reported() {
        let err = EngineConfig::from_toml_str(
            r#"
            [history]
            max_depth = 0

            [random]
            full_chance = 1.5
            default_min = 10
            default_max = 5
            "#,
        )
        .unwrap_err();
        match err {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_input_is_a_parse_error() {
        assert!(matches!(
            EngineConfig::from_json_str("{ not json"),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("seed = ["),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn file_loading_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("bstep.toml");
        std::fs::write(&toml_path, "seed = 3\n").unwrap();
        let json_path = dir.path().join("bstep.json");
        std::fs::write(&json_path, r#"{"seed": 4}"#).unwrap();

        assert_eq!(EngineConfig::from_file(&toml_path).unwrap().seed, Some(3));
        assert_eq!(EngineConfig::from_file(&json_path).unwrap().seed, Some(4));
        assert!(matches!(
            EngineConfig::from_file(dir.path().join("missing.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
