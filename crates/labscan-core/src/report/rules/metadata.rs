//! Document metadata extraction.
//!
//! Every field has its own ordered list of candidate patterns, labeled forms
//! first and looser heuristics after. The first pattern that yields a
//! non-empty value wins.

use regex::Regex;
use tracing::trace;

use super::grammar::Grammar;
use super::patterns::{
    ADDRESS_LABELED, ADDRESS_POSTAL, BIRTH_LABEL, DATE_TOKEN, DIAGNOSIS_CODE, DIAGNOSIS_LABELED,
    DOCTOR_LABELED, DOCTOR_TITLE, LABELED_DATE, NEXT_FIELD, PATIENT_HONORIFIC, PATIENT_LABELED,
};
use crate::models::metadata::DocumentMetadata;
use crate::strategy::{first_match, Strategy};

type FieldStrategy<'a> = &'a dyn Strategy<str, Output = String>;

/// A regex whose capture group holds the field value.
pub struct FieldPattern {
    name: &'static str,
    regex: &'static Regex,
    group: usize,
}

impl FieldPattern {
    pub fn new(name: &'static str, regex: &'static Regex, group: usize) -> Self {
        Self { name, regex, group }
    }
}

impl Strategy<str> for FieldPattern {
    type Output = String;

    fn name(&self) -> &str {
        self.name
    }

    fn attempt(&self, text: &str) -> Option<String> {
        self.regex
            .captures_iter(text)
            .filter_map(|caps| caps.get(self.group))
            .map(|m| clean_value(m.as_str()))
            .find(|value| !value.is_empty())
    }
}

/// First date-shaped token on a line that is not a birth date.
pub struct UnlabeledDate;

impl Strategy<str> for UnlabeledDate {
    type Output = String;

    fn name(&self) -> &str {
        "date-token"
    }

    fn attempt(&self, text: &str) -> Option<String> {
        text.lines()
            .filter(|line| !BIRTH_LABEL.is_match(line))
            .find_map(|line| DATE_TOKEN.find(line))
            .map(|m| m.as_str().trim().to_string())
    }
}

/// Distinct ICD-10 shaped codes outside of lab record lines.
pub struct DiagnosisCodes<'g> {
    grammar: &'g Grammar,
}

impl Strategy<str> for DiagnosisCodes<'_> {
    type Output = String;

    fn name(&self) -> &str {
        "diagnosis-codes"
    }

    fn attempt(&self, text: &str) -> Option<String> {
        let mut codes: Vec<&str> = Vec::new();

        for line in text.lines().map(str::trim) {
            if self.grammar.record_prefix().is_match(line) {
                continue;
            }
            for caps in DIAGNOSIS_CODE.captures_iter(line) {
                let code = caps.get(1).map_or("", |m| m.as_str());
                if !code.is_empty() && !codes.contains(&code) {
                    codes.push(code);
                }
            }
        }

        (!codes.is_empty()).then(|| codes.join(", "))
    }
}

/// Resolves [`DocumentMetadata`] fields from report text.
pub struct MetadataExtractor<'g> {
    patient_label: FieldPattern,
    patient_honorific: FieldPattern,
    address_label: FieldPattern,
    address_postal: FieldPattern,
    doctor_label: FieldPattern,
    doctor_title: FieldPattern,
    date_label: FieldPattern,
    diagnosis_label: FieldPattern,
    diagnosis_codes: DiagnosisCodes<'g>,
}

impl<'g> MetadataExtractor<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self {
            patient_label: FieldPattern::new("patient-label", &PATIENT_LABELED, 1),
            patient_honorific: FieldPattern::new("patient-honorific", &PATIENT_HONORIFIC, 1),
            address_label: FieldPattern::new("address-label", &ADDRESS_LABELED, 1),
            address_postal: FieldPattern::new("address-postal", &ADDRESS_POSTAL, 1),
            doctor_label: FieldPattern::new("doctor-label", &DOCTOR_LABELED, 1),
            doctor_title: FieldPattern::new("doctor-title", &DOCTOR_TITLE, 1),
            date_label: FieldPattern::new("date-label", &LABELED_DATE, 1),
            diagnosis_label: FieldPattern::new("diagnosis-label", &DIAGNOSIS_LABELED, 1),
            diagnosis_codes: DiagnosisCodes { grammar },
        }
    }

    /// Extract every metadata field from `text`.
    pub fn extract(&self, text: &str) -> DocumentMetadata {
        DocumentMetadata {
            patient_name: resolve(
                "patient_name",
                text,
                &[&self.patient_label, &self.patient_honorific],
            ),
            address: resolve("address", text, &[&self.address_label, &self.address_postal]),
            diagnosis: resolve(
                "diagnosis",
                text,
                &[&self.diagnosis_label, &self.diagnosis_codes],
            ),
            doctor_name: resolve("doctor_name", text, &[&self.doctor_label, &self.doctor_title]),
            document_date: resolve("document_date", text, &[&self.date_label, &UnlabeledDate]),
        }
    }
}

fn resolve(field: &str, text: &str, strategies: &[FieldStrategy<'_>]) -> Option<String> {
    first_match(text, strategies).map(|(strategy, value)| {
        trace!("{} resolved by {}: {}", field, strategy, value);
        value
    })
}

/// Cut a labeled value where the next field begins and trim trailing
/// punctuation.
fn clean_value(raw: &str) -> String {
    let value = match NEXT_FIELD.find(raw) {
        Some(m) => &raw[..m.start()],
        None => raw,
    };

    value
        .trim_start()
        .trim_end_matches(|c: char| c.is_whitespace() || ",;:.-".contains(c))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::rules::grammar::DEFAULT_GRAMMAR;
    use pretty_assertions::assert_eq;

    fn extract(text: &str) -> DocumentMetadata {
        MetadataExtractor::new(&DEFAULT_GRAMMAR).extract(text)
    }

    #[test]
    fn test_labeled_fields() {
        let text = "Pacient: Jan Novák, nar. 1.2.1970\n\
                    Adresa: Hlavní 12, 110 00 Praha 1\n\
                    Ošetřující lékař: MUDr. Petr Svoboda\n\
                    Datum odběru: 15.01.2024\n\
                    Diagnóza: E11.9 Diabetes mellitus 2. typu";
        let metadata = extract(text);

        assert_eq!(metadata.patient_name.as_deref(), Some("Jan Novák"));
        assert_eq!(metadata.address.as_deref(), Some("Hlavní 12, 110 00 Praha 1"));
        assert_eq!(metadata.doctor_name.as_deref(), Some("MUDr. Petr Svoboda"));
        assert_eq!(metadata.document_date.as_deref(), Some("15.01.2024"));
        assert_eq!(
            metadata.diagnosis.as_deref(),
            Some("E11.9 Diabetes mellitus 2. typu")
        );
    }

    #[test]
    fn test_english_labels() {
        let text = "Name: John Smith\nPhysician: Dr. Brown\nDate of report: 2024-03-01";
        let metadata = extract(text);

        assert_eq!(metadata.patient_name.as_deref(), Some("John Smith"));
        assert_eq!(metadata.doctor_name.as_deref(), Some("Dr. Brown"));
        assert_eq!(metadata.document_date.as_deref(), Some("2024-03-01"));
    }

    #[test]
    fn test_heuristics_when_unlabeled() {
        let text = "Vážená paní Marie Dvořáková\n\
                    Květná 5, 602 00 Brno\n\
                    Vyšetřil MUDr. Karel Malý\n\
                    Brno 3.4.2023";
        let metadata = extract(text);

        assert_eq!(metadata.patient_name.as_deref(), Some("Marie Dvořáková"));
        assert_eq!(metadata.address.as_deref(), Some("Květná 5, 602 00 Brno"));
        assert_eq!(metadata.doctor_name.as_deref(), Some("MUDr. Karel Malý"));
        assert_eq!(metadata.document_date.as_deref(), Some("3.4.2023"));
    }

    #[test]
    fn test_postal_address_after_normalization() {
        let text = crate::report::rules::normalize("Květná 5, 602 00 Brno");
        let metadata = extract(&text);

        assert_eq!(metadata.address.as_deref(), Some("Květná 5,602 00 Brno"));
    }

    #[test]
    fn test_birth_date_is_not_document_date() {
        let text = "Datum narození 1.2.1970\nVytištěno 5.6.2024";
        let metadata = extract(text);

        assert_eq!(metadata.document_date.as_deref(), Some("5.6.2024"));
    }

    #[test]
    fn test_diagnosis_codes_skip_record_lines() {
        let text = "Dg E11.9, I10 a E11.9\n01234 Vitamin B12 300 pmol/l (145-569)";
        let metadata = extract(text);

        assert_eq!(metadata.diagnosis.as_deref(), Some("E11.9, I10"));
    }

    #[test]
    fn test_empty_label_does_not_take_next_line() {
        let metadata = extract("Pacient:\nLékař: MUDr. Eva Malá\nDiagnóza:\nAdresa: Květná 5");

        assert_eq!(metadata.patient_name, None);
        assert_eq!(metadata.doctor_name.as_deref(), Some("MUDr. Eva Malá"));
        assert_eq!(metadata.diagnosis, None);
        assert_eq!(metadata.address.as_deref(), Some("Květná 5"));
    }

    #[test]
    fn test_missing_fields_stay_unset() {
        let metadata = extract("03085 Urea 4.0 mmol/L (2.8-8.1)");

        assert_eq!(metadata, DocumentMetadata::default());
    }
}
