//! # JustCocktails Ingredient Parser
//!
//! Turns free-text cocktail ingredient lines such as `"2 cl Bacardi (weiß)"`
//! into structured, status-annotated records, resolving units and
//! ingredients against a master vocabulary that is partly mined from
//! existing recipes.
//!
//! - [`segmenter`]: split a block into ingredient segments
//! - [`line_parser`]: parse one segment into a [`ParsedIngredient`]
//! - [`master_data`]: build and query the unit/ingredient vocabulary
//! - [`fuzzy`] and [`text_normalizer`]: the matching primitives underneath

pub mod cache;
pub mod config;
pub mod errors;
pub mod fuzzy;
pub mod line_parser;
pub mod master_data;
pub mod observability;
pub mod observability_config;
pub mod segmenter;
pub mod text_normalizer;
pub mod types;
pub mod vocabulary;

// Re-export types for easier access
pub use line_parser::{format_ingredient_line, parse_ingredient_block, parse_ingredient_line};
pub use master_data::{build_master_data, MasterData, MasterRecord, Recipe};
pub use segmenter::split_ingredient_tuples;
pub use types::{AmountStatus, FieldStatus, IngredientToken, ParsedIngredient, TokenType};
