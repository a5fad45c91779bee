//! Parse result types shared by the segmenter, the line parser and callers.
//!
//! All offsets are half-open and counted in chars of the text they refer to.

use serde::{Deserialize, Serialize};

/// Outcome of the amount stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmountStatus {
    /// A single quantity was read
    Ok,
    /// No quantity given, intentionally (`-`) or not at all
    Empty,
    /// A range such as `1-2`; no single value
    Ambiguous,
    /// Numeric text that cannot be a quantity (`1/0`, `1.2.3`)
    Invalid,
}

impl AmountStatus {
    /// Contribution of this status to the confidence score
    pub fn score(self) -> f64 {
        match self {
            AmountStatus::Ok => 1.0,
            AmountStatus::Empty => 0.6,
            AmountStatus::Ambiguous => 0.4,
            AmountStatus::Invalid => 0.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AmountStatus::Ok => "ok",
            AmountStatus::Empty => "empty",
            AmountStatus::Ambiguous => "ambiguous",
            AmountStatus::Invalid => "invalid",
        }
    }
}

/// Outcome of resolving a unit or ingredient against master data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldStatus {
    /// Exact index hit, or a fuzzy hit above the field's ok threshold
    Ok,
    /// Accepted through similarity below the ok threshold
    Fuzzy,
    /// Text present but unknown to the vocabulary
    New,
    /// No text to resolve
    Missing,
}

impl FieldStatus {
    /// Whether the field resolved to a canonical record
    pub fn is_resolved(self) -> bool {
        matches!(self, FieldStatus::Ok | FieldStatus::Fuzzy)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldStatus::Ok => "ok",
            FieldStatus::Fuzzy => "fuzzy",
            FieldStatus::New => "new",
            FieldStatus::Missing => "missing",
        }
    }
}

/// Kind of a highlighted span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Amount,
    Unit,
    Ingredient,
    Notes,
}

/// A typed span of the parsed text, used for syntax highlighting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientToken {
    #[serde(rename = "type")]
    pub token_type: TokenType,
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// Per-field statuses of a parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldStatuses {
    pub amount: AmountStatus,
    pub unit: FieldStatus,
    pub ingredient: FieldStatus,
}

/// Autocomplete candidates per field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSuggestions {
    pub units: Vec<String>,
    pub ingredients: Vec<String>,
}

/// Structured form of one ingredient line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedIngredient {
    /// The text exactly as handed to the parser
    pub raw: String,
    pub amount: Option<f64>,
    pub amount_text: Option<String>,
    /// Canonical unit, or the typed unit when it is new
    pub unit: Option<String>,
    pub unit_raw: Option<String>,
    /// Canonical ingredient, or the typed ingredient when it is new
    pub ingredient: Option<String>,
    pub ingredient_raw: Option<String>,
    /// Parenthetical remarks, space-joined
    pub notes: Option<String>,
    /// Derived from `statuses` only, see [`crate::line_parser::confidence`]
    pub confidence: f64,
    pub statuses: FieldStatuses,
    pub suggestions: FieldSuggestions,
    /// Sorted by `start`, pairwise disjoint
    pub tokens: Vec<IngredientToken>,
}

/// One entry of a multi-ingredient block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientSegment {
    pub text: String,
    pub start: usize,
    pub end: usize,
}
