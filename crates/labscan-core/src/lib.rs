//! Core library for clinical laboratory report extraction.
//!
//! This crate provides:
//! - OCR text normalization (whitespace, punctuation, split decimals)
//! - Lab record parsing with a line grammar and a stream-recovery fallback
//! - Test name canonicalization against a fuzzy-matched dictionary
//! - Report metadata extraction (patient, doctor, date, diagnosis, address)
//! - Out-of-range annotation and tabular / nested export forms

pub mod error;
pub mod models;
pub mod strategy;
pub mod canonical;
pub mod report;
pub mod llm;

pub use error::{LabscanError, Result};
pub use models::record::LabRecord;
pub use models::metadata::DocumentMetadata;
pub use models::result::{ExtractionResult, ExtractionWarning, StructuredReport, TableRow};
pub use models::config::{GrammarProfile, LabscanConfig};
pub use canonical::{CanonicalDictionary, Canonicalizer, SimilarityScorer, WeightedScorer};
pub use report::{LabReportParser, ReportExtractor, split_pages};
