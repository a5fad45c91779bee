//! # Fuzzy Matching
//!
//! Edit-distance based similarity scoring and candidate ranking used by the
//! master data resolver when a token has no exact index hit.
//!
//! - [`levenshtein_distance`]: classic O(n·m) dynamic programming, unit costs
//! - [`similarity`]: `1 - distance / max_len` over normalized text
//! - [`suggest`]: ranked candidates above a minimum score

use crate::text_normalizer::normalize;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::trace;

/// A ranked candidate returned by [`suggest`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Candidate value as supplied by the caller
    pub value: String,
    /// Similarity score in [0, 1]
    pub score: f64,
}

/// Options for [`suggest`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuggestOptions {
    /// Maximum number of suggestions returned
    pub limit: usize,
    /// Candidates scoring below this are dropped
    pub min_score: f64,
}

impl Default for SuggestOptions {
    fn default() -> Self {
        Self {
            limit: 5,
            min_score: 0.0,
        }
    }
}

/// Calculate Levenshtein distance between two strings
///
/// Insertion, deletion and substitution all cost 1. Distances are counted in
/// chars, not bytes.
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();

    // Two rows of the edit matrix: distances from the previous and current
    // prefix of `s1` to every prefix of `s2`.
    let mut previous: Vec<usize> = (0..=s2_chars.len()).collect();
    let mut current = vec![0; s2_chars.len() + 1];

    for (i, &c1) in s1_chars.iter().enumerate() {
        current[0] = i + 1;
        for (j, &c2) in s2_chars.iter().enumerate() {
            let substitution = previous[j] + usize::from(c1 != c2);
            current[j + 1] = substitution
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[s2_chars.len()]
}

/// Similarity between two strings in [0, 1] after normalization
///
/// # Examples
///
/// ```
/// use just_cocktails::fuzzy::similarity;
///
/// assert_eq!(similarity("Minze", "minze"), 1.0);
/// assert!(similarity("Angostora", "Angostura") > 0.85);
/// assert_eq!(similarity("", "Rum"), 0.0);
/// ```
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);

    match (a.is_empty(), b.is_empty()) {
        (true, true) => return 1.0,
        (true, false) | (false, true) => return 0.0,
        _ => {}
    }

    let max_len = a.chars().count().max(b.chars().count());
    1.0 - levenshtein_distance(&a, &b) as f64 / max_len as f64
}

/// Rank `candidates` by similarity to `query`
///
/// A blank query returns the first `limit` candidates in input order with
/// score 1, which lets an autocomplete list everything. Otherwise candidates
/// below `min_score` are dropped and the rest sorted by descending score,
/// ties broken alphabetically.
pub fn suggest<S: AsRef<str>>(
    query: &str,
    candidates: &[S],
    options: SuggestOptions,
) -> Vec<Suggestion> {
    if query.trim().is_empty() {
        return candidates
            .iter()
            .take(options.limit)
            .map(|candidate| Suggestion {
                value: candidate.as_ref().to_string(),
                score: 1.0,
            })
            .collect();
    }

    let mut scored: Vec<Suggestion> = candidates
        .iter()
        .filter_map(|candidate| {
            let value = candidate.as_ref();
            let score = similarity(query, value);
            trace!(query = %query, candidate = %value, score, "Scored fuzzy candidate");
            (score >= options.min_score).then(|| Suggestion {
                value: value.to_string(),
                score,
            })
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.value.cmp(&b.value))
    });
    scored.truncate(options.limit);
    scored
}
