//! Feature encoding of a candidate query string.

use std::collections::HashSet;

use crate::config::VocabularyConfig;

use super::novelty::{jaccard, word_set};
use super::state::LearningState;

/// Dimensionality of the query feature vector.
pub const FEATURE_DIM: usize = 12;

/// Event/procurement vocabulary checked at the word level for feature 4.
const PROCUREMENT_WORDS: [&str; 6] = ["contract", "award", "rfp", "bid", "tender", "agreement"];

/// Jaccard threshold above which a candidate counts as matching a proven
/// pattern (feature 7).
const PATTERN_MATCH_THRESHOLD: f64 = 0.6;

/// Maps a query string plus learning state into a fixed 12-element vector,
/// each component in [0, 1]. Extraction is a pure function of the inputs
/// and the reference year fixed at construction.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    vocab: VocabularyConfig,
    reference_year: i32,
}

impl FeatureExtractor {
    #[must_use]
    pub fn new(vocab: VocabularyConfig, reference_year: i32) -> Self {
        Self {
            vocab,
            reference_year,
        }
    }

    #[must_use]
    pub fn extract(&self, candidate: &str, state: &LearningState) -> Vec<f64> {
        let lower = candidate.to_lowercase();
        let words: Vec<String> = lower.split_whitespace().map(ToString::to_string).collect();
        let word_count = words.len().max(1);
        let unique: HashSet<&String> = words.iter().collect();

        let mut features = vec![0.0; FEATURE_DIM];

        // 1. Length, normalized by 10 words.
        features[0] = (words.len() as f64 / 10.0).min(1.0);

        // 2. Proper-noun proxy: a long word plus any uppercase in the raw string.
        let has_upper = candidate.chars().any(char::is_uppercase);
        if has_upper && words.iter().any(|w| w.len() > 5) {
            features[1] = 1.0;
        }

        // 3. Vehicle-type term.
        features[2] = contains_any(&lower, &self.vocab.vehicle_types);

        // 4. Event/procurement term, word-level.
        if words
            .iter()
            .any(|w| PROCUREMENT_WORDS.contains(&w.as_str()))
        {
            features[3] = 1.0;
        }

        // 5. Specificity: up to 3 known specific terms across vehicle,
        // event, and service vocabularies.
        let specific = self
            .vocab
            .vehicle_types
            .iter()
            .chain(&self.vocab.event_types)
            .chain(&self.vocab.service_types)
            .filter(|term| lower.contains(&term.to_lowercase()))
            .count()
            .min(3);
        features[4] = specific as f64 / 3.0;

        // 6. Mean per-word effectiveness, scaled down by 100.
        let term_sum: f64 = words
            .iter()
            .map(|w| state.effective_terms.get(w).copied().unwrap_or(0.0))
            .sum();
        features[5] = (term_sum / word_count as f64 / 100.0).min(1.0);

        // 7. Close match to a proven pattern.
        let candidate_set = word_set(candidate);
        if state
            .proven_patterns
            .iter()
            .any(|p| jaccard(&candidate_set, &word_set(p)) > PATTERN_MATCH_THRESHOLD)
        {
            features[6] = 1.0;
        }

        // 8. Technology term.
        features[7] = contains_any(&lower, &self.vocab.technology_types);

        // 9. Policy term.
        features[8] = contains_any(&lower, &self.vocab.policy_types);

        // 10. Lexical diversity.
        features[9] = unique.len() as f64 / word_count as f64;

        // 11. Service-type term.
        features[10] = contains_any(&lower, &self.vocab.service_types);

        // 12. Temporal recency: a keyword or a year near the reference year.
        let temporal_keyword = self
            .vocab
            .temporal_keywords
            .iter()
            .any(|k| words.iter().any(|w| w == &k.to_lowercase()));
        if temporal_keyword || words.iter().any(|w| self.is_recent_year(w)) {
            features[11] = 1.0;
        }

        features
    }

    fn is_recent_year(&self, word: &str) -> bool {
        if word.len() != 4 {
            return false;
        }
        word.parse::<i32>()
            .is_ok_and(|year| (year - self.reference_year).abs() <= 1)
    }
}

fn contains_any(lower: &str, terms: &[String]) -> f64 {
    if terms.iter().any(|t| lower.contains(&t.to_lowercase())) {
        1.0
    } else {
        0.0
    }
}
