//! # Ingredient Block Segmenter
//!
//! Splits a multi-ingredient block into ordered segments. A segment ends at
//! a line break, or at a comma that is outside parentheses and is not a
//! decimal comma (digit on both sides, no space). `"1,5 cl Sirup, 2 cl Rum"`
//! therefore yields two segments, not three.

use crate::types::IngredientSegment;
use std::time::Instant;
use tracing::{debug, trace};

/// Split `text` into trimmed, non-empty ingredient segments
///
/// Segment offsets are char offsets into `text`.
///
/// # Examples
///
/// ```
/// use just_cocktails::segmenter::split_ingredient_tuples;
///
/// let segments = split_ingredient_tuples("1,5 cl Sirup, 2 cl Rum (weiß, kalt)");
/// assert_eq!(segments.len(), 2);
/// assert_eq!(segments[0].text, "1,5 cl Sirup");
/// assert_eq!(segments[1].text, "2 cl Rum (weiß, kalt)");
/// ```
pub fn split_ingredient_tuples(text: &str) -> Vec<IngredientSegment> {
    let start_time = Instant::now();
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();

    let mut segments = Vec::new();
    let mut segment_start = 0;
    let mut depth: usize = 0;

    // One extra iteration stands in for the end-of-string boundary.
    for i in 0..=len {
        let is_boundary = match chars.get(i) {
            None => true,
            Some('\n') | Some('\r') => {
                // An unclosed parenthesis never spans lines.
                depth = 0;
                true
            }
            Some('(') => {
                depth += 1;
                false
            }
            Some(')') => {
                depth = depth.saturating_sub(1);
                false
            }
            Some(',') => depth == 0 && !is_decimal_comma(&chars, i),
            Some(_) => false,
        };

        if is_boundary {
            if let Some(segment) = trimmed_segment(&chars, segment_start, i) {
                trace!(
                    start = segment.start,
                    end = segment.end,
                    text = %segment.text,
                    "Emitting ingredient segment"
                );
                segments.push(segment);
            }
            segment_start = i + 1;
        }
    }

    debug!(
        "Split ingredient block of {} chars into {} segments",
        len,
        segments.len()
    );
    crate::observability::record_segmentation_metrics(
        start_time.elapsed(),
        len,
        segments.len(),
    );
    segments
}

fn is_decimal_comma(chars: &[char], index: usize) -> bool {
    index > 0
        && chars[index - 1].is_ascii_digit()
        && chars.get(index + 1).is_some_and(|c| c.is_ascii_digit())
}

fn trimmed_segment(chars: &[char], mut start: usize, mut end: usize) -> Option<IngredientSegment> {
    while start < end && chars[start].is_whitespace() {
        start += 1;
    }
    while end > start && chars[end - 1].is_whitespace() {
        end -= 1;
    }

    (start < end).then(|| IngredientSegment {
        text: chars[start..end].iter().collect(),
        start,
        end,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(input: &str) -> Vec<String> {
        split_ingredient_tuples(input)
            .into_iter()
            .map(|s| s.text)
            .collect()
    }

    #[test]
    fn test_decimal_comma_is_not_a_separator() {
        assert_eq!(texts("1,5 cl Sirup"), vec!["1,5 cl Sirup"]);
        assert_eq!(texts("1,5 cl Sirup, 2 cl Rum"), vec!["1,5 cl Sirup", "2 cl Rum"]);
    }

    #[test]
    fn test_comma_with_space_after_digit_splits() {
        assert_eq!(texts("1, 5 cl Sirup"), vec!["1", "5 cl Sirup"]);
    }

    #[test]
    fn test_line_breaks_always_split() {
        assert_eq!(
            texts("2 cl Rum\r\n1 Dash Angostura\n\n(Garnitur\nMinze)"),
            vec!["2 cl Rum", "1 Dash Angostura", "(Garnitur", "Minze)"]
        );
    }

    #[test]
    fn test_commas_inside_parentheses_are_kept() {
        assert_eq!(
            texts("Minze (frisch, gezupft), 2 cl Gin"),
            vec!["Minze (frisch, gezupft)", "2 cl Gin"]
        );
        assert_eq!(texts("a (b (c, d), e), f"), vec!["a (b (c, d), e)", "f"]);
    }

    #[test]
    fn test_stray_closing_paren_does_not_underflow() {
        assert_eq!(texts("Rum), Gin"), vec!["Rum)", "Gin"]);
    }

    #[test]
    fn test_empty_segments_dropped() {
        assert!(texts("").is_empty());
        assert!(texts(" , ,\n ").is_empty());
        assert_eq!(texts(",Rum,,Gin,"), vec!["Rum", "Gin"]);
    }

    #[test]
    fn test_offsets_are_char_based() {
        let segments = split_ingredient_tuples("  Süßes Zeug ,Öl");
        assert_eq!(segments[0].start, 2);
        assert_eq!(segments[0].end, 12);
        assert_eq!(segments[1].start, 14);
        assert_eq!(segments[1].end, 16);
        assert_eq!(segments[1].text, "Öl");
    }
}
