//! Extraction output and its export forms.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::metadata::DocumentMetadata;
use super::record::{LabRecord, ReferenceRange};
use crate::report::rules::range::parse_decimal;

/// Result of extracting one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Lab records in page order.
    pub records: Vec<LabRecord>,
    /// Document metadata.
    pub metadata: DocumentMetadata,
    /// Non-fatal conditions met during extraction.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ExtractionWarning>,
}

/// A recoverable condition reported alongside the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractionWarning {
    /// Neither parsing strategy produced a record.
    NoRecordsFound,
    /// The line grammar found nothing and records were paired from streams.
    StreamRecoveryUsed { records: usize },
    /// A structured candidate was supplied but could not be used.
    UpstreamJsonInvalid,
    /// Pages beyond the configured limit were dropped.
    PagesTruncated { total: usize, kept: usize },
}

impl fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRecordsFound => write!(f, "no lab records found"),
            Self::StreamRecoveryUsed { records } => {
                write!(f, "{} records recovered by position pairing", records)
            }
            Self::UpstreamJsonInvalid => {
                write!(f, "structured candidate unusable, parsed text instead")
            }
            Self::PagesTruncated { total, kept } => {
                write!(f, "document has {} pages, processed the first {}", total, kept)
            }
        }
    }
}

impl ExtractionResult {
    /// Whether no records were extracted.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records flagged out of range.
    pub fn out_of_range_count(&self) -> usize {
        self.records.iter().filter(|r| r.out_of_range).count()
    }

    /// Tabular export form, one row per record.
    pub fn table_rows(&self) -> Vec<TableRow> {
        self.records.iter().map(TableRow::from).collect()
    }

    /// Nested export form.
    pub fn to_structured(&self) -> StructuredReport {
        StructuredReport {
            patient: PatientSection {
                name: self.metadata.patient_name.clone(),
                address: self.metadata.address.clone(),
                diagnosis: self.metadata.diagnosis.clone(),
            },
            doctor: DoctorSection {
                name: self.metadata.doctor_name.clone(),
            },
            document: DocumentSection {
                date: self.metadata.document_date.clone(),
            },
            lab_results: Some(
                self.records
                    .iter()
                    .map(|r| StructuredLabResult {
                        code: r.code.clone(),
                        name: r.canonical_name.clone(),
                        result: r.value_raw.clone(),
                        min: r.range_min,
                        max: r.range_max,
                    })
                    .collect(),
            ),
        }
    }
}

/// One row of the tabular export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub code: String,
    pub name: String,
    pub result: String,
    pub unit: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub out_of_range: bool,
}

impl From<&LabRecord> for TableRow {
    fn from(record: &LabRecord) -> Self {
        Self {
            code: record.code.clone(),
            name: record.canonical_name.clone(),
            result: record.value_raw.clone(),
            unit: record.unit.clone(),
            min: record.range_min,
            max: record.range_max,
            out_of_range: record.out_of_range,
        }
    }
}

/// Nested report form, shared by the export and by structured candidates
/// produced upstream. Decoding is lenient: codes, results and bounds may be
/// numbers or strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredReport {
    #[serde(rename = "Patient", default)]
    pub patient: PatientSection,

    #[serde(rename = "Doctor", default)]
    pub doctor: DoctorSection,

    #[serde(rename = "Document", default)]
    pub document: DocumentSection,

    /// `None` when the source carried no lab-results array at all.
    #[serde(rename = "LabResults", default, skip_serializing_if = "Option::is_none")]
    pub lab_results: Option<Vec<StructuredLabResult>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientSection {
    #[serde(rename = "Name", default, deserialize_with = "lenient_opt_string")]
    pub name: Option<String>,
    #[serde(rename = "Address", default, deserialize_with = "lenient_opt_string")]
    pub address: Option<String>,
    #[serde(rename = "Diagnosis", default, deserialize_with = "lenient_opt_string")]
    pub diagnosis: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DoctorSection {
    #[serde(rename = "Name", default, deserialize_with = "lenient_opt_string")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentSection {
    #[serde(rename = "Date", default, deserialize_with = "lenient_opt_string")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredLabResult {
    #[serde(rename = "Code", default, deserialize_with = "lenient_string")]
    pub code: String,
    #[serde(rename = "Name", default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(rename = "Result", default, deserialize_with = "lenient_string")]
    pub result: String,
    #[serde(rename = "Min", default, deserialize_with = "lenient_f64")]
    pub min: Option<f64>,
    #[serde(rename = "Max", default, deserialize_with = "lenient_f64")]
    pub max: Option<f64>,
}

impl StructuredReport {
    /// Metadata carried by the report.
    pub fn metadata(&self) -> DocumentMetadata {
        DocumentMetadata {
            patient_name: self.patient.name.clone(),
            address: self.patient.address.clone(),
            diagnosis: self.patient.diagnosis.clone(),
            doctor_name: self.doctor.name.clone(),
            document_date: self.document.date.clone(),
        }
    }

    /// Draft records for every lab result. Records from a structured
    /// candidate are not attributable to a page and carry page 0.
    pub fn draft_records(&self) -> Vec<LabRecord> {
        self.lab_results
            .iter()
            .flatten()
            .filter(|r| !r.name.trim().is_empty() || !r.code.trim().is_empty())
            .map(|r| {
                LabRecord::draft(
                    r.code.trim(),
                    r.name.trim(),
                    r.result.trim(),
                    None,
                    ReferenceRange::new(r.min, r.max),
                    0,
                )
            })
            .collect()
    }
}

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(value_to_string).unwrap_or_default())
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(value_to_string)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => parse_decimal(&s),
        _ => None,
    })
}
