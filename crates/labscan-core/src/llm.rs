//! Structured candidates produced by an upstream language model.
//!
//! Model output is untrusted: it may wrap the JSON in prose or code fences,
//! or not contain JSON at all. A candidate is only used when it decodes and
//! carries a lab-results array.

use serde_json::Value;
use tracing::debug;

use crate::models::result::{StructuredLabResult, StructuredReport};

/// Decode a model response into JSON.
///
/// The whole response is tried first; otherwise the block from the first
/// `{` (or `[`) to the last `}` (or `]`), latest-ending block first.
pub fn parse_structured_candidate(raw: &str) -> Option<Value> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<Value>(raw) {
        return (!value.is_null()).then_some(value);
    }

    let mut blocks: Vec<&str> = [('{', '}'), ('[', ']')]
        .iter()
        .filter_map(|&(open, close)| {
            let start = raw.find(open)?;
            let end = raw.rfind(close)?;
            (start < end).then(|| &raw[start..=end])
        })
        .collect();
    blocks.sort_by_key(|block| std::cmp::Reverse(block.as_ptr() as usize + block.len()));

    blocks.into_iter().find_map(|block| {
        serde_json::from_str::<Value>(block)
            .ok()
            .filter(|value| !value.is_null())
    })
}

/// Turn a decoded candidate into a report if it is authoritative: an object
/// with a `LabResults` array, or a bare array of lab results.
pub fn structured_report_from_value(value: Value) -> Option<StructuredReport> {
    match value {
        Value::Array(_) => {
            let results: Vec<StructuredLabResult> = serde_json::from_value(value)
                .map_err(|e| debug!("Candidate array is not a list of lab results: {}", e))
                .ok()?;
            Some(StructuredReport {
                lab_results: Some(results),
                ..Default::default()
            })
        }
        Value::Object(ref map) if map.get("LabResults").is_some_and(Value::is_array) => {
            serde_json::from_value(value)
                .map_err(|e| debug!("Candidate object does not decode as a report: {}", e))
                .ok()
        }
        _ => None,
    }
}

/// Decode a raw model response straight into an authoritative report.
pub fn authoritative_report(raw: &str) -> Option<StructuredReport> {
    parse_structured_candidate(raw).and_then(structured_report_from_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_direct_json() {
        let value = parse_structured_candidate(r#"{"LabResults": []}"#).unwrap();
        assert_eq!(value, json!({"LabResults": []}));
    }

    #[test]
    fn test_json_wrapped_in_prose() {
        let raw = "Here is the result:\n```json\n{\"Patient\": {\"Name\": \"Jan Novák\"}}\n```\nDone.";
        let value = parse_structured_candidate(raw).unwrap();

        assert_eq!(value["Patient"]["Name"], "Jan Novák");
    }

    #[test]
    fn test_trailing_array_block() {
        let raw = r#"Results: [{"Code": "03085", "Name": "Urea", "Result": "4.0"}]"#;
        let value = parse_structured_candidate(raw).unwrap();

        assert!(value.is_array());
    }

    #[test]
    fn test_no_json() {
        assert_eq!(parse_structured_candidate(""), None);
        assert_eq!(parse_structured_candidate("null"), None);
        assert_eq!(parse_structured_candidate("I could not read the report."), None);
        assert_eq!(parse_structured_candidate("{broken"), None);
    }

    #[test]
    fn test_report_requires_lab_results() {
        assert!(structured_report_from_value(json!({"Patient": {"Name": "X"}})).is_none());
        assert!(structured_report_from_value(json!({"LabResults": null})).is_none());
        assert!(structured_report_from_value(json!("text")).is_none());

        let report = structured_report_from_value(json!({"LabResults": []})).unwrap();
        assert_eq!(report.lab_results, Some(vec![]));
    }

    #[test]
    fn test_lenient_fields() {
        let report = authoritative_report(
            r#"{
                "Patient": {"Name": "Jan Novák", "Address": null},
                "Document": {"Date": "15.01.2024"},
                "LabResults": [
                    {"Code": 3085, "Name": "Urea", "Result": 4.0, "Min": "2,8", "Max": 8.1}
                ]
            }"#,
        )
        .unwrap();

        let results = report.lab_results.as_ref().unwrap();
        assert_eq!(results[0].code, "3085");
        assert_eq!(results[0].result, "4.0");
        assert_eq!(results[0].min, Some(2.8));
        assert_eq!(results[0].max, Some(8.1));
        assert_eq!(report.patient.address, None);
        assert_eq!(report.document.date.as_deref(), Some("15.01.2024"));
    }

    #[test]
    fn test_bare_array_is_authoritative() {
        let report =
            authoritative_report(r#"[{"Code": "03085", "Name": "Urea", "Result": "4.0"}]"#)
                .unwrap();

        assert_eq!(report.draft_records().len(), 1);
        assert_eq!(report.metadata(), Default::default());
    }
}
