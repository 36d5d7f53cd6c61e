//! Primary strategy: one lab record per line.

use tracing::trace;

use super::grammar::Grammar;
use super::range::parse_range_with;
use super::PageText;
use crate::models::record::{LabRecord, ReferenceRange};
use crate::strategy::Strategy;

/// Scans normalized text line by line for
/// `code name value [unit] [(range)] [unit]` records.
pub struct RecordLineParser<'g> {
    grammar: &'g Grammar,
}

impl<'g> RecordLineParser<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self { grammar }
    }

    /// Parse every matching line of a page. Lines that match nothing
    /// (headers, footers, noise) are skipped.
    pub fn parse(&self, text: &str, page: usize) -> Vec<LabRecord> {
        text.lines()
            .filter_map(|line| self.parse_line(line.trim(), page))
            .collect()
    }

    /// Parse a single line.
    pub fn parse_line(&self, line: &str, page: usize) -> Option<LabRecord> {
        let caps = self.grammar.record_line().captures(line)?;

        let code = caps.name("code")?.as_str();
        let name = caps.name("name")?.as_str().trim();
        let value = caps.name("value")?.as_str();
        let unit = caps
            .name("unit")
            .or_else(|| caps.name("unit_after"))
            .map(|m| m.as_str().to_string());

        if self.is_code_name_pair(value, unit.as_deref()) {
            trace!("Skipping code+name pair line: {}", line);
            return None;
        }

        let range = caps
            .name("range")
            .map(|m| parse_range_with(m.as_str(), self.grammar))
            .unwrap_or_default();

        Some(LabRecord::draft(code, name, value, unit, range, page))
    }

    /// A "value" that is itself a test code followed by a capitalised word
    /// is the next record's code and name, as in `03085 Urea 13077 Kyselina`.
    /// Upper-case units such as `U` or `IU` are not names.
    fn is_code_name_pair(&self, value: &str, unit: Option<&str>) -> bool {
        if !self.grammar.is_code_shaped(value) {
            return false;
        }
        unit.is_some_and(looks_like_name)
    }
}

fn looks_like_name(word: &str) -> bool {
    let mut chars = word.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let rest = chars.as_str();

    first.is_uppercase()
        && word.chars().all(char::is_alphabetic)
        && rest.chars().any(char::is_lowercase)
}

impl<'t> Strategy<[PageText<'t>]> for RecordLineParser<'_> {
    type Output = Vec<LabRecord>;

    fn name(&self) -> &str {
        "record-line"
    }

    fn attempt(&self, pages: &[PageText<'t>]) -> Option<Vec<LabRecord>> {
        let records: Vec<LabRecord> = pages
            .iter()
            .flat_map(|page| self.parse(page.text, page.number))
            .collect();

        (!records.is_empty()).then_some(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::rules::grammar::DEFAULT_GRAMMAR;
    use pretty_assertions::assert_eq;

    fn parser() -> RecordLineParser<'static> {
        RecordLineParser::new(&DEFAULT_GRAMMAR)
    }

    #[test]
    fn test_full_record_line() {
        let record = parser().parse_line("03085 Urea 4.0 mmol/L (2.8 - 8.1)", 1).unwrap();

        assert_eq!(record.code, "03085");
        assert_eq!(record.raw_name, "Urea");
        assert_eq!(record.value_raw, "4.0");
        assert_eq!(record.value_numeric, Some(4.0));
        assert_eq!(record.unit.as_deref(), Some("mmol/L"));
        assert_eq!(record.range(), ReferenceRange::new(Some(2.8), Some(8.1)));
        assert_eq!(record.source_page, 1);
    }

    #[test]
    fn test_multi_word_name_with_digits() {
        let record = parser()
            .parse_line("03077 Kyselina močová 447 umol/l (202-417)", 1)
            .unwrap();
        assert_eq!(record.raw_name, "Kyselina močová");
        assert_eq!(record.value_numeric, Some(447.0));

        let record = parser().parse_line("01234 Vitamin B12 350 pmol/l", 1).unwrap();
        assert_eq!(record.raw_name, "Vitamin B12");
        assert_eq!(record.value_raw, "350");
    }

    #[test]
    fn test_qualitative_and_flag_values() {
        let record = parser().parse_line("05001 Bílkovina neg (neg)", 1).unwrap();
        assert_eq!(record.value_raw, "neg");
        assert_eq!(record.value_numeric, None);
        assert!(!record.range().is_bounded());

        let record = parser().parse_line("05002 Glukóza v moči >>", 1).unwrap();
        assert_eq!(record.raw_name, "Glukóza v moči");
        assert_eq!(record.value_raw, ">>");
        assert_eq!(record.value_numeric, None);
    }

    #[test]
    fn test_decimal_comma_and_unit_after_range() {
        let record = parser().parse_line("03001 Sodík 140,5 (136-145) mmol/l", 2).unwrap();

        assert_eq!(record.value_numeric, Some(140.5));
        assert_eq!(record.unit.as_deref(), Some("mmol/l"));
        assert_eq!(record.range_min, Some(136.0));
        assert_eq!(record.source_page, 2);
    }

    #[test]
    fn test_no_unit_no_range() {
        let record = parser().parse_line("03085 Urea 4.0", 1).unwrap();

        assert_eq!(record.unit, None);
        assert_eq!(record.range(), ReferenceRange::default());
    }

    #[test]
    fn test_non_record_lines_skipped() {
        let text = "LABORATOŘ KLINICKÉ BIOCHEMIE\nKód Název Výsledek Jednotka\n03085 Urea 4.0 mmol/L (2.8 - 8.1)\nStrana 1 z 2";
        let records = parser().parse(text, 1);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].code, "03085");
    }

    #[test]
    fn test_code_name_streams_are_not_records() {
        assert!(parser().parse_line("03085 Urea 03077 Kyselina", 1).is_none());
        assert!(parser().parse_line("13085 Urea 13077 Kyselina", 1).is_none());
    }

    #[test]
    fn test_large_value_with_upper_case_unit() {
        let record = parser().parse_line("01234 Amyláza 1250 U (0-100)", 1).unwrap();
        assert_eq!(record.value_numeric, Some(1250.0));
        assert_eq!(record.unit.as_deref(), Some("U"));
        assert_eq!(record.range(), ReferenceRange::new(Some(0.0), Some(100.0)));

        let record = parser().parse_line("02001 Vitamin D 2000 IU", 1).unwrap();
        assert_eq!(record.value_raw, "2000");
        assert_eq!(record.unit.as_deref(), Some("IU"));

        let text = "01234 Amyláza 1250 U (0-100)\n03085 Urea 4.0 mmol/L (2.8-8.1)";
        assert_eq!(parser().parse(text, 1).len(), 2);
    }

    #[test]
    fn test_strategy_reports_none_when_empty() {
        let pages = [PageText::new(1, "no records here")];
        assert!(parser().attempt(&pages[..]).is_none());

        let pages = [
            PageText::new(1, "03085 Urea 4.0"),
            PageText::new(2, "03001 Sodík 140"),
        ];
        let records = parser().attempt(&pages[..]).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].source_page, 2);
    }
}
