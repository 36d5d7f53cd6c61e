//! OCR text normalization.

use super::patterns::{SPACE_BEFORE_PUNCT, SPLIT_DECIMAL};

/// Normalize raw OCR text.
///
/// Line structure is kept. Within a line whitespace runs collapse to one
/// space, typographic punctuation is unified, spaces before commas and
/// periods are dropped and split decimals (`4 . 0`) are rejoined.
/// Normalizing normalized text returns it unchanged.
pub fn normalize(text: &str) -> String {
    let unified = unify_punctuation(text);

    let collapsed = unified
        .split('\n')
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n");

    let mut result = SPACE_BEFORE_PUNCT.replace_all(&collapsed, "$1").into_owned();

    // Each pass removes at least one space, so this terminates.
    while SPLIT_DECIMAL.is_match(&result) {
        result = SPLIT_DECIMAL.replace_all(&result, "$1$2$3").into_owned();
    }

    result
}

fn unify_punctuation(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push('\n');
            }
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' | '`' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => out.push('"'),
            '\u{2026}' => out.push_str("..."),
            '\u{FF0C}' => out.push(','),
            '\u{FF0E}' => out.push('.'),
            '\u{FF1A}' => out.push(':'),
            '\u{FF1B}' => out.push(';'),
            '\u{FF08}' => out.push('('),
            '\u{FF09}' => out.push(')'),
            _ => out.push(c),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_collapses_whitespace_per_line() {
        assert_eq!(
            normalize("  03085   Urea\t4.0  \r\n\r\n Kreatinin  80 "),
            "03085 Urea 4.0\n\nKreatinin 80"
        );
    }

    #[test]
    fn test_repairs_split_decimals() {
        assert_eq!(normalize("Urea 4 . 0 mmol/L"), "Urea 4.0 mmol/L");
        assert_eq!(normalize("Urea 4 ,0"), "Urea 4,0");
        assert_eq!(normalize("Datum: 12. 3. 2024"), "Datum: 12.3.2024");
    }

    #[test]
    fn test_no_space_before_punctuation() {
        assert_eq!(normalize("Novák , Jan ."), "Novák, Jan.");
    }

    #[test]
    fn test_unifies_punctuation() {
        assert_eq!(normalize("„Pozn.“ ‘a’ …"), "\"Pozn.\" 'a'...");
        assert_eq!(normalize("Lékař： MUDr．X"), "Lékař: MUDr.X");
    }

    #[test]
    fn test_keeps_range_dashes() {
        assert_eq!(normalize("(2.8 – 8.1)"), "(2.8 – 8.1)");
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(text in "\\PC{0,80}") {
            let once = normalize(&text);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn prop_normalize_is_idempotent_on_report_like_text(
            text in "[0-9a-zA-Z .,\\-()\\n\\t]{0,80}"
        ) {
            let once = normalize(&text);
            prop_assert_eq!(normalize(&once), once);
        }
    }
}
