//! Error types for the labscan-core library.
//!
//! Extraction itself never fails: malformed input degrades to partial or
//! empty results. These errors cover construction (configuration, grammar
//! compilation, dictionary loading).

use thiserror::Error;

/// Main error type for the labscan library.
#[derive(Error, Debug)]
pub enum LabscanError {
    /// Canonical dictionary error.
    #[error("dictionary error: {0}")]
    Dictionary(#[from] DictionaryError),

    /// A grammar profile produced an invalid pattern.
    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to building a canonical dictionary.
#[derive(Error, Debug)]
pub enum DictionaryError {
    /// The dictionary contains no entries.
    #[error("dictionary is empty")]
    Empty,

    /// A canonical name normalizes to an empty key.
    #[error("canonical name {0:?} has an empty normalized form")]
    EmptyName(String),

    /// Two canonical names claim the same normalized variant.
    #[error("variant {variant:?} maps to both {first:?} and {second:?}")]
    Conflict {
        variant: String,
        first: String,
        second: String,
    },
}

/// Result type for the labscan library.
pub type Result<T> = std::result::Result<T, LabscanError>;
