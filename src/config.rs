//! # Parser Configuration
//!
//! Resolver thresholds and vocabulary settings shared by the master data
//! builder and the line parser. Values can be loaded from environment
//! variables and are validated before use.

use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;

/// Thresholds and vocabulary settings for ingredient parsing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Minimum similarity for a unit candidate to be suggested
    pub unit_min_score: f64,
    /// Similarity at or above which a fuzzy unit match counts as `ok`
    pub unit_ok_score: f64,
    /// Minimum similarity for an ingredient candidate to be suggested
    pub ingredient_min_score: f64,
    /// Similarity at or above which a fuzzy ingredient match counts as `ok`
    pub ingredient_ok_score: f64,
    /// Maximum number of autocomplete suggestions per field
    pub suggestion_limit: usize,
    /// Optional path to a base vocabulary JSON file overriding the built-in one
    pub vocabulary_path: Option<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            unit_min_score: 0.7,
            unit_ok_score: 0.85,
            ingredient_min_score: 0.6,
            ingredient_ok_score: 0.8,
            suggestion_limit: 5,
            vocabulary_path: None,
        }
    }
}

impl ParserConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            unit_min_score: env_or("UNIT_MIN_SCORE", defaults.unit_min_score),
            unit_ok_score: env_or("UNIT_OK_SCORE", defaults.unit_ok_score),
            ingredient_min_score: env_or("INGREDIENT_MIN_SCORE", defaults.ingredient_min_score),
            ingredient_ok_score: env_or("INGREDIENT_OK_SCORE", defaults.ingredient_ok_score),
            suggestion_limit: env_or("SUGGESTION_LIMIT", defaults.suggestion_limit),
            vocabulary_path: env::var("BASE_VOCABULARY_PATH")
                .ok()
                .filter(|path| !path.trim().is_empty()),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> AppResult<()> {
        let scores = [
            ("unit_min_score", self.unit_min_score),
            ("unit_ok_score", self.unit_ok_score),
            ("ingredient_min_score", self.ingredient_min_score),
            ("ingredient_ok_score", self.ingredient_ok_score),
        ];
        for (name, value) in scores {
            if !(0.0..=1.0).contains(&value) {
                return Err(AppError::Config(format!(
                    "{} must be between 0.0 and 1.0, got {}",
                    name, value
                )));
            }
        }

        if self.unit_ok_score < self.unit_min_score {
            return Err(AppError::Config(
                "unit_ok_score cannot be lower than unit_min_score".to_string(),
            ));
        }

        if self.ingredient_ok_score < self.ingredient_min_score {
            return Err(AppError::Config(
                "ingredient_ok_score cannot be lower than ingredient_min_score".to_string(),
            ));
        }

        if self.suggestion_limit == 0 {
            return Err(AppError::Config(
                "suggestion_limit must be greater than 0".to_string(),
            ));
        }

        if let Some(path) = &self.vocabulary_path {
            if path.trim().is_empty() {
                return Err(AppError::Config(
                    "vocabulary_path cannot be empty if provided".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Get a human-readable configuration summary for startup logs
    pub fn summary(&self) -> String {
        format!(
            "unit scores {}/{}, ingredient scores {}/{}, {} suggestions, vocabulary: {}",
            self.unit_min_score,
            self.unit_ok_score,
            self.ingredient_min_score,
            self.ingredient_ok_score,
            self.suggestion_limit,
            self.vocabulary_path.as_deref().unwrap_or("built-in")
        )
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validation() {
        let config = ParserConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.suggestion_limit, 5);
    }

    #[test]
    fn test_score_range_validation() {
        let mut config = ParserConfig {
            unit_min_score: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.unit_min_score = -0.1;
        assert!(config.validate().is_err());

        config.unit_min_score = 0.7;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_ok_score_below_min_score() {
        let config = ParserConfig {
            ingredient_min_score: 0.9,
            ingredient_ok_score: 0.8,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_zero_suggestion_limit() {
        let config = ParserConfig {
            suggestion_limit: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_summary_mentions_vocabulary() {
        let config = ParserConfig::default();
        assert!(config.summary().contains("built-in"));
    }
}
