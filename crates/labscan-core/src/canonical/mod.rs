//! Test name canonicalization.
//!
//! OCR names are matched against a [`CanonicalDictionary`]: an exact hit on a
//! normalized variant wins, otherwise the best fuzzy score at or above the
//! threshold. When the full name fails, its trailing and then leading two-token
//! slices are tried, so `Kyselina močová v séru` still resolves.

pub mod dictionary;
pub mod scorer;

pub use dictionary::{normalize_name, CanonicalDictionary};
pub use scorer::{SimilarityScorer, WeightedScorer};

use std::sync::Arc;

use serde::Serialize;
use tracing::trace;

use crate::error::Result;
use crate::models::config::CanonicalizerConfig;

/// Which part of the raw name produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSlice {
    Full,
    Trailing,
    Leading,
}

/// A resolved canonical name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalMatch {
    pub canonical: String,
    pub score: f64,
    pub slice: MatchSlice,
    /// Whether the slice was an exact variant hit.
    pub exact: bool,
}

/// Maps raw test names to canonical names. Immutable and shareable.
#[derive(Clone)]
pub struct Canonicalizer {
    dictionary: Arc<CanonicalDictionary>,
    scorer: Arc<dyn SimilarityScorer>,
    threshold: f64,
}

impl std::fmt::Debug for Canonicalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canonicalizer")
            .field("entries", &self.dictionary.len())
            .field("threshold", &self.threshold)
            .finish()
    }
}

impl Default for Canonicalizer {
    fn default() -> Self {
        Self::new(CanonicalDictionary::builtin())
    }
}

impl Canonicalizer {
    pub const DEFAULT_THRESHOLD: f64 = 0.85;

    /// Canonicalizer with the default scorer and threshold.
    pub fn new(dictionary: Arc<CanonicalDictionary>) -> Self {
        Self {
            dictionary,
            scorer: Arc::new(WeightedScorer::default()),
            threshold: Self::DEFAULT_THRESHOLD,
        }
    }

    /// Build from configuration, loading the dictionary file if one is set.
    pub fn from_config(config: &CanonicalizerConfig) -> Result<Self> {
        let dictionary = match &config.dictionary_path {
            Some(path) => Arc::new(CanonicalDictionary::from_file(path)?),
            None => CanonicalDictionary::builtin(),
        };

        Ok(Self::new(dictionary).with_threshold(config.threshold))
    }

    pub fn with_scorer(mut self, scorer: Arc<dyn SimilarityScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn dictionary(&self) -> &CanonicalDictionary {
        &self.dictionary
    }

    /// Canonical name for `raw`, or `raw` unchanged when nothing matches.
    pub fn canonicalize(&self, raw: &str) -> String {
        match self.resolve(raw) {
            Some(m) => m.canonical,
            None => raw.to_string(),
        }
    }

    /// Resolve `raw` with match details.
    pub fn resolve(&self, raw: &str) -> Option<CanonicalMatch> {
        let normalized = normalize_name(raw);
        if normalized.is_empty() {
            return None;
        }

        let tokens: Vec<&str> = normalized.split(' ').collect();
        let mut slices = vec![(MatchSlice::Full, normalized.clone())];
        if tokens.len() > 2 {
            slices.push((MatchSlice::Trailing, tokens[tokens.len() - 2..].join(" ")));
            slices.push((MatchSlice::Leading, tokens[..2].join(" ")));
        }

        let found = slices
            .into_iter()
            .find_map(|(slice, text)| self.match_slice(&text, slice));

        match &found {
            Some(m) => trace!(
                "{:?} -> {:?} ({:?}, score {:.3})",
                raw,
                m.canonical,
                m.slice,
                m.score
            ),
            None => trace!("{:?} left as is", raw),
        }

        found
    }

    fn match_slice(&self, text: &str, slice: MatchSlice) -> Option<CanonicalMatch> {
        if let Some(canonical) = self.dictionary.lookup_normalized(text) {
            return Some(CanonicalMatch {
                canonical: canonical.to_string(),
                score: 1.0,
                slice,
                exact: true,
            });
        }

        let mut best: Option<(&str, f64)> = None;
        for (variant, canonical) in self.dictionary.variants() {
            let score = self.scorer.score(text, variant);
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((canonical, score));
            }
        }

        best.filter(|(_, score)| *score >= self.threshold)
            .map(|(canonical, score)| CanonicalMatch {
                canonical: canonical.to_string(),
                score,
                slice,
                exact: false,
            })
    }
}
