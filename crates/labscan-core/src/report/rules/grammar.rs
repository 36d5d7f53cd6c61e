//! Record grammar compiled from a [`GrammarProfile`].

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::Result;
use crate::models::config::GrammarProfile;

/// Signed or unsigned decimal without a multi-digit leading zero, so that a
/// zero-padded test code is never read as a result value.
const NUMBER: &str = r"[-+]?(?:0|[1-9][0-9]*)(?:[.,][0-9]+)?";

/// A contiguous unit token.
const UNIT: &str = r"[^\s()]+";

lazy_static! {
    /// Grammar for the default profile.
    pub static ref DEFAULT_GRAMMAR: Grammar = Grammar::new(&GrammarProfile::default()).unwrap();
}

/// Compiled patterns for one grammar profile.
#[derive(Debug, Clone)]
pub struct Grammar {
    profile: GrammarProfile,
    record_line: Regex,
    code_name_anchor: Regex,
    record_prefix: Regex,
    value_token: Regex,
    stream_token: Regex,
    range_separator: Regex,
    name_tail: Regex,
}

impl Grammar {
    /// Compile a grammar from a profile.
    pub fn new(profile: &GrammarProfile) -> Result<Self> {
        profile.validate()?;

        let code = format!(
            "[0-9]{{{},{}}}",
            profile.code_length.min, profile.code_length.max
        );
        let name = format!(r"\p{{L}}[{}]*?", profile.name_characters);
        let value = value_alternatives(profile);

        let record_line = Regex::new(&format!(
            r"^(?P<code>{code})\s+(?P<name>{name})\s+(?P<value>{value})(?:\s+(?P<unit>{UNIT}))?(?:\s*\((?P<range>[^)]*)\))?(?:\s+(?P<unit_after>{UNIT}))?$"
        ))?;
        let code_name_anchor =
            Regex::new(&format!(r"(?:^|\s)(?P<code>{code})\s+(?P<name>\p{{L}})"))?;
        let record_prefix = Regex::new(&format!(r"^{code}\s+\p{{L}}"))?;
        let value_token = Regex::new(&format!("^(?:{value})$"))?;
        let name_tail = Regex::new(&format!(r"^\p{{L}}[{}]*", profile.name_characters))?;

        let connectives: Vec<String> = profile
            .range_connectives
            .iter()
            .filter(|c| !c.trim().is_empty())
            .map(|c| format!(r"\b{}\b", regex::escape(c.trim())))
            .collect();
        let range_separator = if connectives.is_empty() {
            Regex::new(r"\s*-\s*")?
        } else {
            Regex::new(&format!(r"\s*(?:-|(?i:{}))\s*", connectives.join("|")))?
        };

        Ok(Self {
            profile: profile.clone(),
            record_line,
            code_name_anchor,
            record_prefix,
            value_token,
            stream_token: Regex::new(r"\([^)]*\)?|[^\s()]+")?,
            range_separator,
            name_tail,
        })
    }

    /// The profile this grammar was compiled from.
    pub fn profile(&self) -> &GrammarProfile {
        &self.profile
    }

    /// Full-line record pattern.
    pub fn record_line(&self) -> &Regex {
        &self.record_line
    }

    /// A code followed by the first letter of a name, anywhere in a line.
    pub fn code_name_anchor(&self) -> &Regex {
        &self.code_name_anchor
    }

    /// Matches lines that start like a lab record.
    pub fn record_prefix(&self) -> &Regex {
        &self.record_prefix
    }

    /// Matches a whole token that is a result value.
    pub fn value_token(&self) -> &Regex {
        &self.value_token
    }

    /// Splits a value stream into parenthesized groups and plain tokens.
    pub fn stream_token(&self) -> &Regex {
        &self.stream_token
    }

    /// Splits a range fragment into its bounds.
    pub fn range_separator(&self) -> &Regex {
        &self.range_separator
    }

    /// The longest name-shaped prefix of a string.
    pub fn name_tail(&self) -> &Regex {
        &self.name_tail
    }

    pub fn dash_glyphs(&self) -> &[String] {
        &self.profile.dash_glyphs
    }

    /// Whether a token has the shape of a test code.
    pub fn is_code_shaped(&self, token: &str) -> bool {
        let len = token.len();
        len >= self.profile.code_length.min
            && len <= self.profile.code_length.max
            && token.bytes().all(|b| b.is_ascii_digit())
    }
}

/// Value alternation: number, then qualitative words, then flag markers.
/// Longer tokens come first so `negativní` is preferred over `neg`.
fn value_alternatives(profile: &GrammarProfile) -> String {
    let mut alternatives = vec![NUMBER.to_string()];

    let mut words: Vec<&String> = profile
        .qualitative_values
        .iter()
        .filter(|w| !w.is_empty())
        .collect();
    words.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
    if !words.is_empty() {
        let escaped: Vec<String> = words.iter().map(|w| regex::escape(w)).collect();
        alternatives.push(format!("(?i:{})", escaped.join("|")));
    }

    let mut markers: Vec<&String> = profile.flag_markers.iter().filter(|m| !m.is_empty()).collect();
    markers.sort_by(|a, b| b.len().cmp(&a.len()));
    alternatives.extend(markers.iter().map(|m| regex::escape(m)));

    alternatives.join("|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::CodeLength;

    #[test]
    fn test_value_token() {
        let grammar = &*DEFAULT_GRAMMAR;

        assert!(grammar.value_token().is_match("4.0"));
        assert!(grammar.value_token().is_match("-1,5"));
        assert!(grammar.value_token().is_match("0.5"));
        assert!(grammar.value_token().is_match("NEG"));
        assert!(grammar.value_token().is_match("negativní"));
        assert!(grammar.value_token().is_match(">>"));
        assert!(grammar.value_token().is_match("+++"));
        assert!(!grammar.value_token().is_match("03077"));
        assert!(!grammar.value_token().is_match("mmol/L"));
    }

    #[test]
    fn test_is_code_shaped() {
        let grammar = &*DEFAULT_GRAMMAR;

        assert!(grammar.is_code_shaped("03085"));
        assert!(grammar.is_code_shaped("1234"));
        assert!(!grammar.is_code_shaped("447"));
        assert!(!grammar.is_code_shaped("4.0"));
    }

    #[test]
    fn test_custom_code_length() {
        let profile = GrammarProfile {
            code_length: CodeLength { min: 3, max: 3 },
            ..Default::default()
        };
        let grammar = Grammar::new(&profile).unwrap();

        assert!(grammar.record_line().is_match("123 Urea 4.0"));
        assert!(!grammar.record_line().is_match("03085 Urea 4.0"));
    }

    #[test]
    fn test_invalid_name_class_is_an_error() {
        let profile = GrammarProfile {
            name_characters: r"\p{NotAClass}".to_string(),
            ..Default::default()
        };

        assert!(Grammar::new(&profile).is_err());
    }
}
