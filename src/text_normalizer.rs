//! # Text Normalizer
//!
//! Folds ingredient and unit text onto a comparison key: lowercase,
//! diacritics removed, whitespace collapsed. Every index lookup and every
//! fuzzy comparison goes through [`normalize`].

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalize text for lookups and similarity scoring
///
/// # Examples
///
/// ```
/// use just_cocktails::text_normalizer::normalize;
///
/// assert_eq!(normalize("  Crème   de Cassis "), "creme de cassis");
/// assert_eq!(normalize("ZUCKERSIRUP"), "zuckersirup");
/// ```
pub fn normalize(text: &str) -> String {
    // Lowercase before decomposing so case mappings that introduce combining
    // marks (e.g. 'İ') are stripped in the same pass.
    let folded: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();

    folded.split_whitespace().collect::<Vec<&str>>().join(" ")
}
