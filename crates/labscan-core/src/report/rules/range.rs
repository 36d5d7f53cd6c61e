//! Reference-range parsing.

use super::grammar::{Grammar, DEFAULT_GRAMMAR};
use super::patterns::{NUMBER_TOKEN, STRICT_DECIMAL};
use crate::models::record::ReferenceRange;

/// Parse a decimal written with either a comma or a dot separator.
/// Anything else (qualitative tokens, flags, garbage) yields `None`.
pub fn parse_decimal(s: &str) -> Option<f64> {
    let normalized = s.trim().replace(',', ".");
    if !STRICT_DECIMAL.is_match(&normalized) {
        return None;
    }
    normalized.parse().ok()
}

/// Parse the text inside a range's parentheses with the default profile.
pub fn parse_range(fragment: &str) -> ReferenceRange {
    parse_range_with(fragment, &DEFAULT_GRAMMAR)
}

/// Parse the text inside a range's parentheses.
///
/// Dash-like glyphs unify to a hyphen, then the fragment splits on the
/// hyphen or a connective word. A hyphen that does not follow a number is
/// a minus sign. Two numbers give `(min, max)` as written, even when
/// `min > max`; a single number gives `min` only.
pub fn parse_range_with(fragment: &str, grammar: &Grammar) -> ReferenceRange {
    let mut unified = fragment.to_string();
    for glyph in grammar.dash_glyphs() {
        if glyph != "-" {
            unified = unified.replace(glyph.as_str(), "-");
        }
    }

    let numbers: Vec<f64> = split_bounds(&unified, grammar)
        .into_iter()
        .filter_map(|piece| NUMBER_TOKEN.find(piece))
        .filter_map(|m| parse_decimal(m.as_str()))
        .collect();

    match numbers.as_slice() {
        [] => ReferenceRange::default(),
        [min] => ReferenceRange::new(Some(*min), None),
        [min, max, ..] => ReferenceRange::new(Some(*min), Some(*max)),
    }
}

fn split_bounds<'a>(fragment: &'a str, grammar: &Grammar) -> Vec<&'a str> {
    let mut pieces = Vec::new();
    let mut start = 0;

    for m in grammar.range_separator().find_iter(fragment) {
        let is_hyphen = m.as_str().trim() == "-";
        let after_number = fragment[..m.start()]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_ascii_digit() || c == '.');
        if is_hyphen && !after_number {
            continue;
        }
        pieces.push(&fragment[start..m.start()]);
        start = m.end();
    }
    pieces.push(&fragment[start..]);

    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("4.0"), Some(4.0));
        assert_eq!(parse_decimal("4,5"), Some(4.5));
        assert_eq!(parse_decimal("-0.3"), Some(-0.3));
        assert_eq!(parse_decimal("neg"), None);
        assert_eq!(parse_decimal(">>"), None);
        assert_eq!(parse_decimal("inf"), None);
        assert_eq!(parse_decimal("1e5"), None);
    }

    #[test]
    fn test_dash_glyphs_unify() {
        let expected = ReferenceRange::new(Some(2.8), Some(8.1));

        assert_eq!(parse_range("2.8-8.1"), expected);
        assert_eq!(parse_range("2.8 – 8.1"), expected);
        assert_eq!(parse_range("2.8~8.1"), expected);
        assert_eq!(parse_range("2.8 — 8.1"), expected);
        assert_eq!(parse_range("2,8 - 8,1"), expected);
    }

    #[test]
    fn test_to_connective() {
        assert_eq!(parse_range("202 to 417"), ReferenceRange::new(Some(202.0), Some(417.0)));
        assert_eq!(parse_range("202 TO 417"), ReferenceRange::new(Some(202.0), Some(417.0)));
    }

    #[test]
    fn test_single_bound() {
        assert_eq!(parse_range("5.0"), ReferenceRange::new(Some(5.0), None));
        assert_eq!(parse_range("< 5.0"), ReferenceRange::new(Some(5.0), None));
    }

    #[test]
    fn test_min_greater_than_max_passes_through() {
        assert_eq!(parse_range("8.1-2.8"), ReferenceRange::new(Some(8.1), Some(2.8)));
    }

    #[test]
    fn test_negative_bounds() {
        assert_eq!(parse_range("-2.5 - 2.5"), ReferenceRange::new(Some(-2.5), Some(2.5)));
        assert_eq!(parse_range("-2.5--1.0"), ReferenceRange::new(Some(-2.5), Some(-1.0)));
        assert_eq!(
            parse_range("\u{2212}3 \u{2013} 3"),
            ReferenceRange::new(Some(-3.0), Some(3.0))
        );
        assert_eq!(parse_range("-5 to 5"), ReferenceRange::new(Some(-5.0), Some(5.0)));
    }

    #[test]
    fn test_non_numeric_range() {
        assert_eq!(parse_range("negativní"), ReferenceRange::default());
        assert_eq!(parse_range(""), ReferenceRange::default());
    }

    #[test]
    fn test_units_inside_range() {
        assert_eq!(
            parse_range("3.5 - 5.1 mmol/l"),
            ReferenceRange::new(Some(3.5), Some(5.1))
        );
    }

    proptest! {
        #[test]
        fn prop_parse_range_never_panics(fragment in "\\PC{0,40}") {
            let _ = parse_range(&fragment);
        }
    }
}
