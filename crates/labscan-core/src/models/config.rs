//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{LabscanError, Result};

/// Main configuration for labscan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LabscanConfig {
    /// Record and metadata extraction configuration.
    pub extraction: ExtractionConfig,

    /// Test name canonicalization configuration.
    pub canonicalizer: CanonicalizerConfig,
}

/// Extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Run both parsing strategies per page instead of per document.
    pub per_page: bool,

    /// Maximum pages to process (0 = unlimited).
    pub max_pages: usize,

    /// Line grammar profile.
    pub profile: GrammarProfile,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            per_page: false,
            max_pages: 20,
            profile: GrammarProfile::default(),
        }
    }
}

/// Inclusive digit-count bounds for test codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeLength {
    pub min: usize,
    pub max: usize,
}

/// The configurable shape of a lab record line. One profile covers the
/// layout variants seen across laboratories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrammarProfile {
    /// Digit count of the leading test code.
    pub code_length: CodeLength,

    /// Regex character-class body for test names after the first letter.
    pub name_characters: String,

    /// Non-numeric result tokens (matched case-insensitively).
    pub qualitative_values: Vec<String>,

    /// Markers printed in place of a value for marked abnormalities.
    pub flag_markers: Vec<String>,

    /// Glyphs treated as the range dash.
    pub dash_glyphs: Vec<String>,

    /// Words that join range bounds.
    pub range_connectives: Vec<String>,
}

impl Default for GrammarProfile {
    fn default() -> Self {
        Self {
            code_length: CodeLength { min: 4, max: 6 },
            name_characters: r"\p{L}\p{N} .,/%+'\-".to_string(),
            qualitative_values: [
                "negativní",
                "negativni",
                "negative",
                "neg",
                "pozitivní",
                "pozitivni",
                "positive",
                "pos",
                "stopy",
                "trace",
                "nález",
                "norma",
                "normal",
                "+++",
                "++",
                "+",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            flag_markers: vec!["<<".to_string(), ">>".to_string()],
            dash_glyphs: [
                "-", "\u{2010}", "\u{2011}", "\u{2012}", "\u{2013}", "\u{2014}", "\u{2212}", "~",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            range_connectives: vec!["to".to_string()],
        }
    }
}

impl GrammarProfile {
    /// Check the profile for values that cannot produce a usable grammar.
    pub fn validate(&self) -> Result<()> {
        let CodeLength { min, max } = self.code_length;
        if min == 0 || min > max {
            return Err(LabscanError::Config(format!(
                "invalid code length range {}..={}",
                min, max
            )));
        }
        if self.name_characters.is_empty() {
            return Err(LabscanError::Config("name_characters is empty".into()));
        }
        if self.dash_glyphs.iter().any(|g| g.is_empty()) {
            return Err(LabscanError::Config("dash_glyphs contains an empty glyph".into()));
        }
        Ok(())
    }
}

/// Canonicalizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonicalizerConfig {
    /// Minimum similarity (0.0 - 1.0) for accepting a dictionary match.
    pub threshold: f64,

    /// JSON dictionary replacing the built-in one.
    pub dictionary_path: Option<PathBuf>,
}

impl Default for CanonicalizerConfig {
    fn default() -> Self {
        Self {
            threshold: 0.85,
            dictionary_path: None,
        }
    }
}

impl LabscanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check all sections.
    pub fn validate(&self) -> Result<()> {
        self.extraction.profile.validate()?;
        if !(0.0..=1.0).contains(&self.canonicalizer.threshold) {
            return Err(LabscanError::Config(format!(
                "canonicalizer threshold {} is outside 0.0 - 1.0",
                self.canonicalizer.threshold
            )));
        }
        Ok(())
    }
}
