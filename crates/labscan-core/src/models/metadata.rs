//! Report metadata.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::report::rules::dates::parse_date;

/// Document-level fields, each resolved first-match-wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Patient full name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,

    /// Patient address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Diagnosis text or comma-separated diagnosis codes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,

    /// Requesting or attending physician.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_name: Option<String>,

    /// Document date as printed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_date: Option<String>,
}

impl DocumentMetadata {
    /// Fill every unset field from `other`. Set fields are never overwritten,
    /// so merging pages in order keeps the earliest match.
    pub fn fill_missing(&mut self, other: DocumentMetadata) {
        fill(&mut self.patient_name, other.patient_name);
        fill(&mut self.address, other.address);
        fill(&mut self.diagnosis, other.diagnosis);
        fill(&mut self.doctor_name, other.doctor_name);
        fill(&mut self.document_date, other.document_date);
    }

    /// Whether every field is resolved.
    pub fn is_complete(&self) -> bool {
        self.patient_name.is_some()
            && self.address.is_some()
            && self.diagnosis.is_some()
            && self.doctor_name.is_some()
            && self.document_date.is_some()
    }

    /// Names of the fields that are still unresolved.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.patient_name.is_none() {
            missing.push("patient_name");
        }
        if self.address.is_none() {
            missing.push("address");
        }
        if self.diagnosis.is_none() {
            missing.push("diagnosis");
        }
        if self.doctor_name.is_none() {
            missing.push("doctor_name");
        }
        if self.document_date.is_none() {
            missing.push("document_date");
        }
        missing
    }

    /// The document date as a calendar date, when it parses.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        self.document_date.as_deref().and_then(parse_date)
    }
}

fn fill(slot: &mut Option<String>, candidate: Option<String>) {
    if slot.is_none() {
        *slot = candidate.filter(|v| !v.trim().is_empty());
    }
}
