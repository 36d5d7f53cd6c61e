//! String similarity scoring for dictionary matching.

use strsim::{jaro_winkler, normalized_levenshtein};

/// Similarity between two normalized names, in `0.0..=1.0`.
pub trait SimilarityScorer: Send + Sync {
    fn score(&self, a: &str, b: &str) -> f64;
}

/// Weighted blend of Jaro-Winkler and normalized Levenshtein.
#[derive(Debug, Clone, Copy)]
pub struct WeightedScorer {
    pub jaro_winkler_weight: f64,
    pub levenshtein_weight: f64,
}

impl Default for WeightedScorer {
    fn default() -> Self {
        // Jaro-Winkler favours shared prefixes, which OCR usually keeps intact
        Self {
            jaro_winkler_weight: 0.6,
            levenshtein_weight: 0.4,
        }
    }
}

impl SimilarityScorer for WeightedScorer {
    fn score(&self, a: &str, b: &str) -> f64 {
        let jw = jaro_winkler(a, b);
        let lev = normalized_levenshtein(a, b);

        jw * self.jaro_winkler_weight + lev * self.levenshtein_weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_scores_one() {
        let scorer = WeightedScorer::default();
        assert!((scorer.score("kreatinin", "kreatinin") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_ocr_typo_scores_high() {
        let scorer = WeightedScorer::default();
        assert!(scorer.score("kreatlnin", "kreatinin") > 0.85);
        assert!(scorer.score("cholesterol", "hemoglobin") < 0.6);
    }
}
