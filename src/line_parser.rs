//! # Ingredient Line Parser
//!
//! Turns one free-text ingredient line such as `"2 cl Bacardi (weiß)"` into a
//! [`ParsedIngredient`]: amount, unit, ingredient and notes, each with a
//! status, plus typed token spans for highlighting.
//!
//! The pipeline runs left to right over a byte cursor:
//!
//! 1. `50% Filler ...` lines take a fast path: the percentage is the amount
//!    and the unit is always `Filler`.
//! 2. Amount: range, vulgar fraction, mixed number, fraction, decimal,
//!    integer or the `-` placeholder, tried in that order.
//! 3. Unit: the next word, or the next two words when a single word is
//!    unknown but the pair is known (`Bar spoon`).
//! 4. Ingredient: the rest, minus a connector word (`von`, `mit`, ...) and
//!    top-level parenthetical notes.
//!
//! Parsing never fails. Anything that cannot be read shows up as a status.

use crate::master_data::{strip_trailing_punctuation, MasterData, Resolution};
use crate::segmenter::split_ingredient_tuples;
use crate::types::{
    AmountStatus, FieldStatus, FieldStatuses, FieldSuggestions, IngredientToken,
    ParsedIngredient, TokenType,
};
use lazy_static::lazy_static;
use regex::Regex;
use std::time::Instant;
use tracing::{debug, trace};

/// Canonical unit of percentage filler lines
pub const FILLER_UNIT: &str = "Filler";

const AMOUNT_WEIGHT: f64 = 0.3;
const UNIT_WEIGHT: f64 = 0.2;
const INGREDIENT_WEIGHT: f64 = 0.5;

lazy_static! {
    static ref PERCENT_PATTERN: Regex =
        Regex::new(r"^([0-9]{1,3})\s*%").expect("Failed to compile percent regex");
    static ref RANGE_PATTERN: Regex = Regex::new(r"^([0-9]+)\s*[-–]\s*([0-9]+)")
        .expect("Failed to compile range regex");
    static ref VULGAR_FRACTION_PATTERN: Regex =
        Regex::new(r"^(?:([0-9]+)\s?)?([½¼¾⅓⅔⅛⅜⅝⅞])")
            .expect("Failed to compile vulgar fraction regex");
    static ref MIXED_NUMBER_PATTERN: Regex =
        Regex::new(r"^([0-9]+)\s+([0-9]+)\s*/\s*([0-9]+)")
            .expect("Failed to compile mixed number regex");
    static ref FRACTION_PATTERN: Regex =
        Regex::new(r"^([0-9]+)\s*/\s*([0-9]+)").expect("Failed to compile fraction regex");
    static ref MALFORMED_DECIMAL_PATTERN: Regex =
        Regex::new(r"^[0-9]+(?:[.,][0-9]+){2,}|^[0-9]+[.,][0-9]+[.,]")
            .expect("Failed to compile malformed decimal regex");
    static ref DECIMAL_PATTERN: Regex =
        Regex::new(r"^([0-9]+)[.,]([0-9]+)").expect("Failed to compile decimal regex");
    static ref INTEGER_PATTERN: Regex =
        Regex::new(r"^([0-9]+)(?:\s*%)?").expect("Failed to compile integer regex");
    static ref PLACEHOLDER_PATTERN: Regex =
        Regex::new(r"^[-–](?:\s|$)").expect("Failed to compile placeholder regex");
    static ref CONNECTOR_PATTERN: Regex = Regex::new(r"(?i)^(?:von|vom|mit|of)\s+")
        .expect("Failed to compile connector regex");
}

/// Result of the amount stage, spans in bytes
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AmountMatch {
    pub value: Option<f64>,
    pub text: Option<String>,
    pub status: AmountStatus,
    pub span: Option<(usize, usize)>,
}

impl AmountMatch {
    fn empty() -> Self {
        Self {
            value: None,
            text: None,
            status: AmountStatus::Empty,
            span: None,
        }
    }
}

#[derive(Debug, Clone)]
struct UnitMatch {
    unit: Option<String>,
    unit_raw: Option<String>,
    status: FieldStatus,
    suggestions: Vec<String>,
    span: Option<(usize, usize)>,
    cursor: usize,
}

impl UnitMatch {
    fn missing(cursor: usize) -> Self {
        Self {
            unit: None,
            unit_raw: None,
            status: FieldStatus::Missing,
            suggestions: Vec::new(),
            span: None,
            cursor,
        }
    }

    fn from_resolution(resolution: Resolution, raw_text: &str, span: (usize, usize)) -> Self {
        let unit = match resolution.name {
            Some(name) => Some(name),
            None if resolution.status == FieldStatus::New => {
                Some(strip_trailing_punctuation(raw_text).to_string())
            }
            None => None,
        };
        Self {
            unit,
            unit_raw: Some(raw_text.to_string()),
            status: resolution.status,
            suggestions: resolution.suggestions,
            span: Some(span),
            cursor: span.1,
        }
    }
}

/// Ingredient text left after the connector and notes are removed
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct IngredientText {
    pub text: String,
    pub notes: Vec<String>,
    /// Byte spans of the non-note pieces
    pub pieces: Vec<(usize, usize)>,
    /// Byte spans of the top-level parentheticals, parens included
    pub groups: Vec<(usize, usize)>,
}

#[derive(Debug, Clone)]
struct IngredientMatch {
    ingredient: Option<String>,
    ingredient_raw: Option<String>,
    notes: Option<String>,
    status: FieldStatus,
    suggestions: Vec<String>,
    tokens: Vec<(TokenType, (usize, usize))>,
}

/// Parse one ingredient line against `master_data`
///
/// # Examples
///
/// ```
/// use just_cocktails::line_parser::parse_ingredient_line;
/// use just_cocktails::master_data::build_master_data;
/// use just_cocktails::types::FieldStatus;
///
/// let md = build_master_data::<&str>(&[]);
/// let parsed = parse_ingredient_line("2 cl Bacardi", &md);
/// assert_eq!(parsed.amount, Some(2.0));
/// assert_eq!(parsed.unit.as_deref(), Some("cl"));
/// assert_eq!(parsed.ingredient.as_deref(), Some("Bacardi"));
/// assert_eq!(parsed.statuses.ingredient, FieldStatus::Ok);
/// assert_eq!(parsed.confidence, 1.0);
/// ```
pub fn parse_ingredient_line(raw: &str, master_data: &MasterData) -> ParsedIngredient {
    let start_time = Instant::now();

    let parsed = match parse_percent_filler(raw, master_data) {
        Some(parsed) => parsed,
        None => parse_generic(raw, master_data),
    };

    debug!(
        raw = %raw,
        amount = parsed.statuses.amount.as_str(),
        unit = parsed.statuses.unit.as_str(),
        ingredient = parsed.statuses.ingredient.as_str(),
        confidence = parsed.confidence,
        "Parsed ingredient line"
    );
    crate::observability::record_line_parse_metrics(start_time.elapsed(), &parsed);
    parsed
}

/// Segment a block and parse every segment
pub fn parse_ingredient_block(text: &str, master_data: &MasterData) -> Vec<ParsedIngredient> {
    split_ingredient_tuples(text)
        .iter()
        .map(|segment| parse_ingredient_line(&segment.text, master_data))
        .collect()
}

/// Render a parse result back into one editable line
///
/// The amount is written as typed when available, so `"1,5"` stays `"1,5"`.
pub fn format_ingredient_line(parsed: &ParsedIngredient) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(text) = &parsed.amount_text {
        parts.push(text.clone());
    } else if let Some(amount) = parsed.amount {
        parts.push(amount.to_string());
    }
    if let Some(unit) = &parsed.unit {
        parts.push(unit.clone());
    }
    if let Some(ingredient) = &parsed.ingredient {
        parts.push(ingredient.clone());
    }
    if let Some(notes) = &parsed.notes {
        parts.push(format!("({})", notes));
    }

    parts.join(" ")
}

/// Weighted mean of the per-field scores, rounded to two decimals
pub fn confidence(statuses: &FieldStatuses) -> f64 {
    let unit_score = match statuses.unit {
        FieldStatus::Ok => 1.0,
        FieldStatus::Fuzzy => 0.7,
        FieldStatus::Missing => 0.3,
        FieldStatus::New => 0.2,
    };
    let ingredient_score = match statuses.ingredient {
        FieldStatus::Ok => 1.0,
        FieldStatus::Fuzzy => 0.7,
        FieldStatus::New => 0.3,
        FieldStatus::Missing => 0.0,
    };

    let weighted = AMOUNT_WEIGHT * statuses.amount.score()
        + UNIT_WEIGHT * unit_score
        + INGREDIENT_WEIGHT * ingredient_score;
    ((weighted * 100.0).round() / 100.0).clamp(0.0, 1.0)
}

fn parse_percent_filler(raw: &str, master_data: &MasterData) -> Option<ParsedIngredient> {
    let start = skip_whitespace(raw, 0);
    let caps = PERCENT_PATTERN.captures(&raw[start..])?;
    let amount_end = start + caps[0].len();

    let (word_start, word_end) = next_word(raw, amount_end)?;
    let word = &raw[word_start..word_end];
    if !word.eq_ignore_ascii_case("filler") {
        return None;
    }

    trace!(raw = %raw, "Percent filler line");
    let amount = AmountMatch {
        value: parse_digits(&caps[1]),
        text: Some(caps[0].to_string()),
        status: AmountStatus::Ok,
        span: Some((start, amount_end)),
    };
    let unit = UnitMatch {
        unit: Some(FILLER_UNIT.to_string()),
        unit_raw: Some(word.to_string()),
        status: FieldStatus::Ok,
        suggestions: Vec::new(),
        span: Some((word_start, word_end)),
        cursor: word_end,
    };
    let ingredient = ingredient_stage(raw, word_end, master_data, true);

    Some(assemble(raw, amount, unit, ingredient))
}

fn parse_generic(raw: &str, master_data: &MasterData) -> ParsedIngredient {
    let (amount, cursor) = amount_stage(raw, 0);
    let unit = unit_stage(raw, cursor, master_data);
    let is_filler = unit.status.is_resolved() && unit.unit.as_deref() == Some(FILLER_UNIT);
    let ingredient = ingredient_stage(raw, unit.cursor, master_data, is_filler);

    assemble(raw, amount, unit, ingredient)
}

fn assemble(
    raw: &str,
    amount: AmountMatch,
    unit: UnitMatch,
    ingredient: IngredientMatch,
) -> ParsedIngredient {
    let mut spans: Vec<(TokenType, (usize, usize))> = Vec::new();
    if let Some(span) = amount.span {
        spans.push((TokenType::Amount, span));
    }
    if let Some(span) = unit.span {
        spans.push((TokenType::Unit, span));
    }
    spans.extend(ingredient.tokens);
    spans.sort_by_key(|(_, (start, _))| *start);

    let tokens = spans
        .into_iter()
        .map(|(token_type, (start, end))| IngredientToken {
            token_type,
            start: char_offset(raw, start),
            end: char_offset(raw, end),
            text: raw[start..end].to_string(),
        })
        .collect();

    let statuses = FieldStatuses {
        amount: amount.status,
        unit: unit.status,
        ingredient: ingredient.status,
    };

    ParsedIngredient {
        raw: raw.to_string(),
        amount: amount.value,
        amount_text: amount.text,
        unit: unit.unit,
        unit_raw: unit.unit_raw,
        ingredient: ingredient.ingredient,
        ingredient_raw: ingredient.ingredient_raw,
        notes: ingredient.notes,
        confidence: confidence(&statuses),
        statuses,
        suggestions: FieldSuggestions {
            units: unit.suggestions,
            ingredients: ingredient.suggestions,
        },
        tokens,
    }
}

/// Read a leading amount starting at byte `cursor`
///
/// Returns the match and the byte position just after it. Text that is not
/// an amount is left unconsumed.
pub(crate) fn amount_stage(raw: &str, cursor: usize) -> (AmountMatch, usize) {
    let start = skip_whitespace(raw, cursor);
    let rest = &raw[start..];
    if rest.is_empty() {
        return (AmountMatch::empty(), start);
    }

    let matched = |value: Option<f64>, status: AmountStatus, len: usize| {
        let end = start + len;
        (
            AmountMatch {
                value,
                text: Some(raw[start..end].to_string()),
                status,
                span: Some((start, end)),
            },
            end,
        )
    };
    // A number that cannot be represented is invalid, not ok.
    let read = |value: Option<f64>, len: usize| match value {
        Some(value) => matched(Some(value), AmountStatus::Ok, len),
        None => matched(None, AmountStatus::Invalid, len),
    };

    if let Some(caps) = RANGE_PATTERN.captures(rest) {
        // Text is the compact range, en dashes become `-`; the span keeps the typed form.
        let (mut amount, end) = matched(None, AmountStatus::Ambiguous, caps[0].len());
        amount.text = Some(format!("{}-{}", &caps[1], &caps[2]));
        return (amount, end);
    }

    if let Some(caps) = VULGAR_FRACTION_PATTERN.captures(rest) {
        let fraction = caps
            .get(2)
            .and_then(|m| m.as_str().chars().next())
            .and_then(vulgar_value);
        if let Some(fraction) = fraction {
            let whole = match caps.get(1) {
                Some(m) => parse_digits(m.as_str()),
                None => Some(0.0),
            };
            return read(whole.map(|w| w + fraction), caps[0].len());
        }
    }

    if let Some(caps) = MIXED_NUMBER_PATTERN.captures(rest) {
        let value = parse_digits(&caps[1])
            .zip(divide(&caps[2], &caps[3]))
            .map(|(whole, fraction)| whole + fraction);
        return read(value, caps[0].len());
    }

    if let Some(caps) = FRACTION_PATTERN.captures(rest) {
        return read(divide(&caps[1], &caps[2]), caps[0].len());
    }

    if let Some(m) = MALFORMED_DECIMAL_PATTERN.find(rest) {
        return matched(None, AmountStatus::Invalid, m.end());
    }

    if let Some(caps) = DECIMAL_PATTERN.captures(rest) {
        let value = parse_digits(&format!("{}.{}", &caps[1], &caps[2]));
        return read(value, caps[0].len());
    }

    if let Some(caps) = INTEGER_PATTERN.captures(rest) {
        return read(parse_digits(&caps[1]), caps[0].len());
    }

    if PLACEHOLDER_PATTERN.is_match(rest) {
        let dash_len = rest.chars().next().map_or(1, char::len_utf8);
        let end = start + dash_len;
        return (
            AmountMatch {
                value: None,
                text: Some(raw[start..end].to_string()),
                status: AmountStatus::Empty,
                span: Some((start, end)),
            },
            end,
        );
    }

    (AmountMatch::empty(), start)
}

fn unit_stage(raw: &str, cursor: usize, master_data: &MasterData) -> UnitMatch {
    let Some((first_start, first_end)) = next_word(raw, cursor) else {
        return UnitMatch::missing(cursor);
    };
    let first_text = &raw[first_start..first_end];
    let first = master_data.resolve_unit(first_text);

    match first.status {
        FieldStatus::Ok | FieldStatus::Fuzzy => {
            return UnitMatch::from_resolution(first, first_text, (first_start, first_end));
        }
        FieldStatus::Missing => {
            // Only punctuation: consume it, no unit.
            return UnitMatch::missing(first_end);
        }
        FieldStatus::New => {}
    }

    if let Some((_, second_end)) = next_word(raw, first_end) {
        let combined_text = &raw[first_start..second_end];
        let combined = master_data.resolve_unit(combined_text);
        if combined.status.is_resolved() {
            debug!(unit = %combined_text, "Resolved two-word unit");
            return UnitMatch::from_resolution(combined, combined_text, (first_start, second_end));
        }
    }

    UnitMatch::from_resolution(first, first_text, (first_start, first_end))
}

fn ingredient_stage(
    raw: &str,
    cursor: usize,
    master_data: &MasterData,
    is_filler: bool,
) -> IngredientMatch {
    let mut extracted = extract_ingredient_text(raw, cursor);

    if is_filler && extracted.text.is_empty() && !extracted.notes.is_empty() {
        debug!(raw = %raw, "Filler line without ingredient, reading it from the notes");
        extracted.text = extracted.notes.join(" ");
        extracted.notes.clear();
        extracted.pieces = std::mem::take(&mut extracted.groups);
    }

    let mut tokens: Vec<(TokenType, (usize, usize))> = extracted
        .pieces
        .iter()
        .map(|&span| (TokenType::Ingredient, span))
        .collect();
    tokens.extend(extracted.groups.iter().map(|&span| (TokenType::Notes, span)));

    let notes = (!extracted.notes.is_empty()).then(|| extracted.notes.join(" "));
    let resolution = master_data.resolve_ingredient(&extracted.text);
    let ingredient = match resolution.name {
        Some(name) => Some(name),
        None if !extracted.text.is_empty() => Some(extracted.text.clone()),
        None => None,
    };

    IngredientMatch {
        ingredient,
        ingredient_raw: (!extracted.text.is_empty()).then_some(extracted.text),
        notes,
        status: resolution.status,
        suggestions: resolution.suggestions,
        tokens,
    }
}

/// Split the text after `cursor` into ingredient pieces and notes
pub(crate) fn extract_ingredient_text(raw: &str, cursor: usize) -> IngredientText {
    let mut start = skip_whitespace(raw, cursor);
    if let Some(m) = CONNECTOR_PATTERN.find(&raw[start..]) {
        start += m.end();
    }
    let tail = raw[start..].trim_end_matches(|c: char| c.is_whitespace() || c == ',');
    let end = start + tail.len();

    let groups = top_level_groups(raw, start, end);

    let mut pieces = Vec::new();
    let mut position = start;
    for &(group_start, group_end) in groups.iter().chain(std::iter::once(&(end, end))) {
        if let Some(piece) = trim_span(raw, position, group_start) {
            pieces.push(piece);
        }
        position = group_end;
    }

    let text = collapse_whitespace(
        &pieces
            .iter()
            .map(|&(s, e)| &raw[s..e])
            .collect::<Vec<_>>()
            .join(" "),
    );
    let notes = groups
        .iter()
        .map(|&(s, e)| collapse_whitespace(&raw[s + 1..e - 1]))
        .filter(|note| !note.is_empty())
        .collect();

    IngredientText {
        text,
        notes,
        pieces,
        groups,
    }
}

/// Byte span of the next word at or after `from`
///
/// Words end at whitespace, commas and parentheses.
pub(crate) fn next_word(raw: &str, from: usize) -> Option<(usize, usize)> {
    let start = skip_whitespace(raw, from);
    let end = raw[start..]
        .find(|c: char| c.is_whitespace() || matches!(c, ',' | '(' | ')'))
        .map_or(raw.len(), |i| start + i);
    (start < end).then_some((start, end))
}

fn top_level_groups(raw: &str, start: usize, end: usize) -> Vec<(usize, usize)> {
    let mut groups = Vec::new();
    let mut depth: usize = 0;
    let mut open = start;

    for (i, c) in raw[start..end].char_indices() {
        match c {
            '(' => {
                if depth == 0 {
                    open = start + i;
                }
                depth += 1;
            }
            ')' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    groups.push((open, start + i + 1));
                }
            }
            _ => {}
        }
    }

    groups
}

fn trim_span(raw: &str, start: usize, end: usize) -> Option<(usize, usize)> {
    let slice = &raw[start..end];
    let leading = slice.len() - slice.trim_start().len();
    let trimmed = slice
        .trim_start()
        .trim_end_matches(|c: char| c.is_whitespace() || c == ',');
    let new_start = start + leading;
    let new_end = new_start + trimmed.len();
    (new_start < new_end).then_some((new_start, new_end))
}

fn skip_whitespace(raw: &str, from: usize) -> usize {
    let rest = &raw[from..];
    from + (rest.len() - rest.trim_start().len())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn char_offset(raw: &str, byte: usize) -> usize {
    raw[..byte].chars().count()
}

/// Finite value of an ASCII number, `None` when out of range
fn parse_digits(digits: &str) -> Option<f64> {
    digits.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn divide(numerator: &str, denominator: &str) -> Option<f64> {
    let denominator = parse_digits(denominator)?;
    if denominator == 0.0 {
        return None;
    }
    parse_digits(numerator).map(|numerator| numerator / denominator)
}

fn vulgar_value(c: char) -> Option<f64> {
    match c {
        '½' => Some(0.5),
        '¼' => Some(0.25),
        '¾' => Some(0.75),
        '⅓' => Some(1.0 / 3.0),
        '⅔' => Some(2.0 / 3.0),
        '⅛' => Some(0.125),
        '⅜' => Some(0.375),
        '⅝' => Some(0.625),
        '⅞' => Some(0.875),
        _ => None,
    }
}
