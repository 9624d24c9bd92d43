//! Novelty scoring against recent query history.

use std::collections::HashSet;

/// Lowercased word set of a query string.
#[must_use]
pub fn word_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(ToString::to_string)
        .collect()
}

/// Jaccard similarity of two word sets: |intersection| / |union|.
#[must_use]
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f64 / union as f64
}

/// Novelty of a candidate against recent queries for the same context:
/// one minus the maximum Jaccard similarity found. With no history the
/// candidate is maximally novel (1.0), which guarantees early exploration
/// breadth before anything has been logged.
#[must_use]
pub fn novelty_score(candidate: &str, recent_queries: &[String]) -> f64 {
    let candidate_set = word_set(candidate);
    let max_similarity = recent_queries
        .iter()
        .map(|q| jaccard(&candidate_set, &word_set(q)))
        .fold(0.0_f64, f64::max);
    1.0 - max_similarity
}
