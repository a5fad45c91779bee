//! # Base Vocabulary
//!
//! The curated list of units and ingredients (with aliases) that every
//! master data snapshot starts from. The built-in list is compiled in from
//! `config/base_vocabulary.json`; deployments can point
//! `BASE_VOCABULARY_PATH` at their own file with the same layout:
//!
//! ```json
//! {
//!   "units": [{ "name": "cl", "aliases": ["centiliter"] }],
//!   "ingredients": [{ "name": "Angostura Bitters", "aliases": ["Angostura"] }]
//! }
//! ```

use crate::config::ParserConfig;
use crate::errors::{error_logging, AppError, AppResult};
use crate::master_data::MasterRecord;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

const BUILTIN_VOCABULARY_JSON: &str = include_str!("../config/base_vocabulary.json");

lazy_static! {
    static ref BUILTIN_VOCABULARY: BaseVocabulary = serde_json::from_str(BUILTIN_VOCABULARY_JSON)
        .expect("Built-in base vocabulary should be valid JSON");
}

/// Fixed unit and ingredient lists merged into every master data snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseVocabulary {
    pub units: Vec<MasterRecord>,
    pub ingredients: Vec<MasterRecord>,
}

impl Default for BaseVocabulary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl BaseVocabulary {
    /// The vocabulary shipped with the crate
    pub fn builtin() -> Self {
        BUILTIN_VOCABULARY.clone()
    }

    /// Use the configured override file, falling back to the built-in list
    pub fn from_config(config: &ParserConfig) -> Self {
        let Some(path) = &config.vocabulary_path else {
            return Self::builtin();
        };

        match load_base_vocabulary(path) {
            Ok(vocabulary) => vocabulary,
            Err(e) => {
                warn!(
                    path = %path,
                    error = %e,
                    "Failed to load base vocabulary, falling back to built-in list"
                );
                Self::builtin()
            }
        }
    }

    /// Validate vocabulary entries
    pub fn validate(&self) -> AppResult<()> {
        if self.units.is_empty() {
            return Err(AppError::Validation("units cannot be empty".to_string()));
        }
        if self.ingredients.is_empty() {
            return Err(AppError::Validation(
                "ingredients cannot be empty".to_string(),
            ));
        }

        let validate_records = |records: &[MasterRecord], category: &str| -> AppResult<()> {
            for (i, record) in records.iter().enumerate() {
                validate_term(&record.name, &format!("{}[{}].name", category, i))?;
                for (j, alias) in record.aliases.iter().enumerate() {
                    validate_term(alias, &format!("{}[{}].aliases[{}]", category, i, j))?;
                }
            }
            Ok(())
        };

        validate_records(&self.units, "units")?;
        validate_records(&self.ingredients, "ingredients")?;

        Ok(())
    }
}

fn validate_term(term: &str, location: &str) -> AppResult<()> {
    if term.trim().is_empty() {
        return Err(AppError::Validation(format!("{} cannot be empty", location)));
    }
    if term.chars().any(|c| c.is_control()) {
        return Err(AppError::Validation(format!(
            "{} '{}' contains control characters",
            location, term
        )));
    }
    Ok(())
}

/// Load and validate a base vocabulary JSON file
pub fn load_base_vocabulary(path: impl AsRef<Path>) -> AppResult<BaseVocabulary> {
    let path = path.as_ref();
    let display_path = path.display().to_string();

    let content = fs::read_to_string(path).map_err(|e| {
        error_logging::log_filesystem_error(&e, "read_base_vocabulary", Some(&display_path));
        AppError::FileSystem(format!("cannot read '{}': {}", display_path, e))
    })?;

    let vocabulary: BaseVocabulary = serde_json::from_str(&content)?;
    vocabulary.validate()?;

    info!(
        path = %display_path,
        units = vocabulary.units.len(),
        ingredients = vocabulary.ingredients.len(),
        "Loaded base vocabulary"
    );
    Ok(vocabulary)
}
