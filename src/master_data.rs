//! # Master Data Resolver
//!
//! Owns the unit and ingredient vocabularies and resolves raw tokens against
//! them. A [`MasterData`] snapshot merges the fixed base vocabulary with
//! ingredient names mined from existing recipes, and is immutable once
//! built; callers rebuild it (usually through
//! [`crate::cache::MasterDataCache`]) when the recipe corpus changes.
//!
//! ## Resolution
//!
//! 1. Units lose trailing punctuation (`"cl."` → `"cl"`); blank text is `missing`.
//! 2. A normalized index hit on a canonical name or alias is `ok`.
//! 3. Otherwise the field's value list is ranked with [`suggest`]; survivors
//!    make the best candidate `ok` (score at or above the ok threshold) or
//!    `fuzzy`.
//! 4. Otherwise the text is `new`, with the first known values as suggestions.
//!
//! ## Index collisions
//!
//! Records are indexed in merge order (base units, base ingredients, then
//! mined ingredients in first-seen order). When two records claim the same
//! normalized key, the record merged last owns it.

use crate::config::ParserConfig;
use crate::fuzzy::{suggest, SuggestOptions};
use crate::line_parser::{amount_stage, extract_ingredient_text, next_word};
use crate::segmenter::split_ingredient_tuples;
use crate::text_normalizer::normalize;
use crate::types::FieldStatus;
use crate::vocabulary::BaseVocabulary;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::time::Instant;
use tracing::{debug, info, trace};

/// A canonical unit or ingredient with its alternate spellings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterRecord {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// How often the name was mined from existing recipes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity: Option<u32>,
}

impl MasterRecord {
    pub fn new(name: impl Into<String>, aliases: &[&str]) -> Self {
        Self {
            name: name.into(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            popularity: None,
        }
    }
}

/// Anything that exposes a free-text ingredient block
pub trait IngredientSource {
    fn ingredient_text(&self) -> &str;
}

/// Minimal recipe shape accepted by [`build_master_data`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    pub ingredients: String,
}

impl IngredientSource for Recipe {
    fn ingredient_text(&self) -> &str {
        &self.ingredients
    }
}

impl IngredientSource for String {
    fn ingredient_text(&self) -> &str {
        self
    }
}

impl IngredientSource for &str {
    fn ingredient_text(&self) -> &str {
        self
    }
}

/// Result of resolving one unit or ingredient token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    /// Canonical name when the token resolved (`ok` or `fuzzy`)
    pub name: Option<String>,
    pub status: FieldStatus,
    pub suggestions: Vec<String>,
}

impl Resolution {
    fn missing() -> Self {
        Self {
            name: None,
            status: FieldStatus::Missing,
            suggestions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Unit,
    Ingredient,
}

/// Immutable vocabulary snapshot used by the line parser
#[derive(Debug, Clone)]
pub struct MasterData {
    pub units: Vec<MasterRecord>,
    pub ingredients: Vec<MasterRecord>,
    /// Normalized name/alias → position in `units`
    unit_index: HashMap<String, usize>,
    /// Normalized name/alias → position in `ingredients`
    ingredient_index: HashMap<String, usize>,
    /// Every known unit spelling, canonical names first per record
    pub unit_values: Vec<String>,
    /// Every known ingredient spelling, most popular records first
    pub ingredient_values: Vec<String>,
    config: ParserConfig,
}

impl MasterData {
    /// Resolve a unit token
    pub fn resolve_unit(&self, raw: &str) -> Resolution {
        self.resolve(raw, Field::Unit)
    }

    /// Resolve an ingredient token
    pub fn resolve_ingredient(&self, raw: &str) -> Resolution {
        self.resolve(raw, Field::Ingredient)
    }

    /// Exact (normalized) lookup of a unit record
    pub fn unit_record(&self, raw: &str) -> Option<&MasterRecord> {
        self.unit_index
            .get(&normalize(strip_trailing_punctuation(raw)))
            .map(|&i| &self.units[i])
    }

    /// Exact (normalized) lookup of an ingredient record
    pub fn ingredient_record(&self, raw: &str) -> Option<&MasterRecord> {
        self.ingredient_index
            .get(&normalize(raw))
            .map(|&i| &self.ingredients[i])
    }

    /// Number of distinct normalized unit keys
    pub fn unit_key_count(&self) -> usize {
        self.unit_index.len()
    }

    /// Number of distinct normalized ingredient keys
    pub fn ingredient_key_count(&self) -> usize {
        self.ingredient_index.len()
    }

    /// Thresholds this snapshot resolves with
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    fn resolve(&self, raw: &str, field: Field) -> Resolution {
        let cleaned = match field {
            Field::Unit => strip_trailing_punctuation(raw),
            Field::Ingredient => raw.trim(),
        };
        if cleaned.is_empty() {
            return Resolution::missing();
        }

        let (records, index, values, min_score, ok_score) = match field {
            Field::Unit => (
                &self.units,
                &self.unit_index,
                &self.unit_values,
                self.config.unit_min_score,
                self.config.unit_ok_score,
            ),
            Field::Ingredient => (
                &self.ingredients,
                &self.ingredient_index,
                &self.ingredient_values,
                self.config.ingredient_min_score,
                self.config.ingredient_ok_score,
            ),
        };

        if let Some(&i) = index.get(&normalize(cleaned)) {
            trace!(field = ?field, raw = %cleaned, name = %records[i].name, "Exact master data hit");
            return Resolution {
                name: Some(records[i].name.clone()),
                status: FieldStatus::Ok,
                suggestions: Vec::new(),
            };
        }

        let ranked = suggest(
            cleaned,
            values,
            SuggestOptions {
                limit: self.config.suggestion_limit,
                min_score,
            },
        );

        if let Some(best) = ranked.first() {
            let name = index
                .get(&normalize(&best.value))
                .map(|&i| records[i].name.clone())
                .unwrap_or_else(|| best.value.clone());
            let status = if best.score >= ok_score {
                FieldStatus::Ok
            } else {
                FieldStatus::Fuzzy
            };
            debug!(
                field = ?field,
                raw = %cleaned,
                best = %best.value,
                score = best.score,
                status = status.as_str(),
                "Fuzzy master data match"
            );
            return Resolution {
                name: Some(name),
                status,
                suggestions: ranked.into_iter().map(|s| s.value).collect(),
            };
        }

        debug!(field = ?field, raw = %cleaned, "No master data match, treating as new");
        Resolution {
            name: None,
            status: FieldStatus::New,
            suggestions: values
                .iter()
                .take(self.config.suggestion_limit)
                .cloned()
                .collect(),
        }
    }
}

/// Resolve a unit token against `master_data`
pub fn resolve_unit(raw: &str, master_data: &MasterData) -> Resolution {
    master_data.resolve_unit(raw)
}

/// Resolve an ingredient token against `master_data`
pub fn resolve_ingredient(raw: &str, master_data: &MasterData) -> Resolution {
    master_data.resolve_ingredient(raw)
}

/// Build a snapshot from the built-in vocabulary and default thresholds
pub fn build_master_data<R: IngredientSource>(corpus: &[R]) -> MasterData {
    build_master_data_with(&BaseVocabulary::builtin(), corpus, &ParserConfig::default())
}

/// Build a snapshot from an explicit base vocabulary and configuration
pub fn build_master_data_with<R: IngredientSource>(
    vocabulary: &BaseVocabulary,
    corpus: &[R],
    config: &ParserConfig,
) -> MasterData {
    let start_time = Instant::now();

    let units = vocabulary.units.clone();
    let unit_index = index_records(&units);

    let mined = mine_ingredients(corpus, &unit_index);
    let mined_count = mined.len();
    let ingredients = merge_records(vocabulary.ingredients.clone(), mined);
    let ingredient_index = index_records(&ingredients);

    let master_data = MasterData {
        unit_values: flatten_values(&units),
        ingredient_values: flatten_values(&ingredients),
        units,
        ingredients,
        unit_index,
        ingredient_index,
        config: config.clone(),
    };

    let duration = start_time.elapsed();
    info!(
        recipes = corpus.len(),
        units = master_data.units.len(),
        ingredients = master_data.ingredients.len(),
        mined = mined_count,
        duration_ms = duration.as_millis() as u64,
        "Built master data"
    );
    crate::observability::record_master_data_build_metrics(
        duration,
        corpus.len(),
        master_data.units.len(),
        master_data.ingredients.len(),
        mined_count,
    );

    master_data
}

/// Stable key over the ordered ingredient texts of a corpus
///
/// Equal corpora produce equal keys within one build of the crate.
pub fn corpus_fingerprint<R: IngredientSource>(corpus: &[R]) -> String {
    let mut hasher = DefaultHasher::new();
    for recipe in corpus {
        recipe.ingredient_text().hash(&mut hasher);
        // Separator so ["ab", "c"] and ["a", "bc"] differ.
        0xffu8.hash(&mut hasher);
    }
    format!("{}:{:016x}", corpus.len(), hasher.finish())
}

pub(crate) fn strip_trailing_punctuation(raw: &str) -> &str {
    raw.trim()
        .trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | '!' | '?'))
        .trim_end()
}

fn index_records(records: &[MasterRecord]) -> HashMap<String, usize> {
    let mut index = HashMap::new();
    for (i, record) in records.iter().enumerate() {
        for term in std::iter::once(&record.name).chain(record.aliases.iter()) {
            let key = normalize(term);
            if key.is_empty() {
                continue;
            }
            if let Some(previous) = index.insert(key.clone(), i) {
                if previous != i {
                    debug!(
                        key = %key,
                        previous = %records[previous].name,
                        current = %record.name,
                        "Master data key collision, last merged record wins"
                    );
                }
            }
        }
    }
    index
}

/// Merge mined records into the base list
///
/// Records with the same normalized canonical name union their aliases and
/// keep the higher popularity; unseen mined records are appended.
fn merge_records(mut base: Vec<MasterRecord>, mined: Vec<MasterRecord>) -> Vec<MasterRecord> {
    let mut by_name: HashMap<String, usize> = base
        .iter()
        .enumerate()
        .map(|(i, record)| (normalize(&record.name), i))
        .collect();

    for record in mined {
        let key = normalize(&record.name);
        match by_name.get(&key) {
            Some(&i) => {
                let existing = &mut base[i];
                let mut known: HashSet<String> = existing.aliases.iter().map(|a| normalize(a)).collect();
                known.insert(key);
                for alias in record.aliases {
                    if known.insert(normalize(&alias)) {
                        existing.aliases.push(alias);
                    }
                }
                existing.popularity = existing.popularity.max(record.popularity);
            }
            None => {
                by_name.insert(key, base.len());
                base.push(record);
            }
        }
    }

    base
}

/// All spellings, most popular records first, de-duplicated by normalized key
fn flatten_values(records: &[MasterRecord]) -> Vec<String> {
    let mut order: Vec<&MasterRecord> = records.iter().collect();
    // Stable sort keeps merge order among equally popular records.
    order.sort_by(|a, b| b.popularity.unwrap_or(0).cmp(&a.popularity.unwrap_or(0)));

    let mut seen = HashSet::new();
    let mut values = Vec::new();
    for record in order {
        for term in std::iter::once(&record.name).chain(record.aliases.iter()) {
            let key = normalize(term);
            if !key.is_empty() && seen.insert(key) {
                values.push(term.clone());
            }
        }
    }
    values
}

/// Count ingredient names used in existing recipes
///
/// Each segment loses its leading amount, a following known unit (one or
/// two words, exact match only), a connector word and parenthetical notes;
/// whatever remains is counted. The first spelling seen becomes the name.
fn mine_ingredients<R: IngredientSource>(
    corpus: &[R],
    unit_index: &HashMap<String, usize>,
) -> Vec<MasterRecord> {
    let mut records: Vec<MasterRecord> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for recipe in corpus {
        for segment in split_ingredient_tuples(recipe.ingredient_text()) {
            let Some(name) = strip_amount_and_unit(&segment.text, unit_index) else {
                continue;
            };
            let key = normalize(&name);
            match positions.get(&key) {
                Some(&i) => {
                    let popularity = records[i].popularity.unwrap_or(0);
                    records[i].popularity = Some(popularity + 1);
                }
                None => {
                    positions.insert(key, records.len());
                    records.push(MasterRecord {
                        name,
                        aliases: Vec::new(),
                        popularity: Some(1),
                    });
                }
            }
        }
    }

    trace!("Mined {} distinct ingredient names", records.len());
    records
}

fn strip_amount_and_unit(line: &str, unit_index: &HashMap<String, usize>) -> Option<String> {
    let is_unit = |text: &str| unit_index.contains_key(&normalize(strip_trailing_punctuation(text)));

    let (_, mut cursor) = amount_stage(line, 0);
    if let Some((first_start, first_end)) = next_word(line, cursor) {
        if is_unit(&line[first_start..first_end]) {
            cursor = first_end;
        } else if let Some((_, second_end)) = next_word(line, first_end) {
            if is_unit(&line[first_start..second_end]) {
                cursor = second_end;
            }
        }
    }

    let extracted = extract_ingredient_text(line, cursor);
    (!extracted.text.is_empty()).then_some(extracted.text)
}
