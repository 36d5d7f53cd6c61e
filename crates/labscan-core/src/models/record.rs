//! Lab result records.

use serde::{Deserialize, Serialize};

use crate::report::rules::range::parse_decimal;

/// Bounds parsed from a reference-range fragment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRange {
    /// Lower bound.
    pub min: Option<f64>,
    /// Upper bound.
    pub max: Option<f64>,
}

impl ReferenceRange {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// Whether at least one bound is present.
    pub fn is_bounded(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }
}

/// A single laboratory test result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabRecord {
    /// Laboratory test code as printed on the report.
    pub code: String,

    /// Test name as recognized by OCR.
    pub raw_name: String,

    /// Canonical test name (the raw name when no dictionary entry matched).
    pub canonical_name: String,

    /// Result value as printed (number, qualitative token, or flag marker).
    pub value_raw: String,

    /// Numeric result; absent for qualitative values.
    pub value_numeric: Option<f64>,

    /// Result unit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Lower reference bound.
    pub range_min: Option<f64>,

    /// Upper reference bound.
    pub range_max: Option<f64>,

    /// Whether the numeric value falls outside the reference range.
    pub out_of_range: bool,

    /// 1-based page the record was found on.
    pub source_page: usize,
}

impl LabRecord {
    /// Create a draft record as produced by a parser, before
    /// canonicalization and annotation.
    pub fn draft(
        code: impl Into<String>,
        raw_name: impl Into<String>,
        value_raw: impl Into<String>,
        unit: Option<String>,
        range: ReferenceRange,
        source_page: usize,
    ) -> Self {
        let raw_name = raw_name.into();
        let value_raw = value_raw.into();
        let value_numeric = parse_decimal(&value_raw);

        Self {
            code: code.into(),
            canonical_name: raw_name.clone(),
            raw_name,
            value_raw,
            value_numeric,
            unit: unit.filter(|u| !u.is_empty()),
            range_min: range.min,
            range_max: range.max,
            out_of_range: false,
            source_page,
        }
    }

    /// The record's reference range.
    pub fn range(&self) -> ReferenceRange {
        ReferenceRange::new(self.range_min, self.range_max)
    }
}
