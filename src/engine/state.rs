//! Per-context learning state for the query bandit.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::features::FEATURE_DIM;

/// Context fields supplied by the caller for one invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryContext {
    pub agency_id: Option<String>,
    pub agency_name: Option<String>,
    pub topic: Option<String>,
    pub location: Option<String>,
}

impl QueryContext {
    /// Derive the partition key under which bandit knowledge is scoped.
    ///
    /// `agency:<id>` when an agency id is present, else `topic:<topic>`,
    /// else the literal `global`. Pure: the same context always resolves
    /// to the same key.
    #[must_use]
    pub fn context_key(&self) -> String {
        if let Some(id) = &self.agency_id {
            format!("agency:{id}")
        } else if let Some(topic) = &self.topic {
            format!("topic:{topic}")
        } else {
            "global".to_string()
        }
    }
}

/// Learned parameters and accumulated knowledge for one context.
///
/// `theta` and `a_matrix` are the LinUCB model: a reward weight vector and
/// the feature outer-product accumulator (identity at birth). The remaining
/// collections are curated knowledge that biases candidate synthesis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningState {
    /// Database row id; `None` until persisted.
    pub id: Option<i64>,
    pub context_key: String,
    pub theta: Vec<f64>,
    pub a_matrix: Vec<Vec<f64>>,
    /// Templates previously shown to be effective, oldest first.
    pub proven_patterns: Vec<String>,
    /// Word -> cumulative effectiveness score.
    pub effective_terms: HashMap<String, f64>,
    /// Substrings that suppress any candidate containing them.
    pub exhausted_topics: Vec<String>,
    pub total_queries: i64,
    pub avg_reward: f64,
}

impl LearningState {
    /// Fresh state: zero weights, identity covariance, empty collections.
    #[must_use]
    pub fn new(context_key: impl Into<String>) -> Self {
        Self {
            id: None,
            context_key: context_key.into(),
            theta: vec![0.0; FEATURE_DIM],
            a_matrix: identity(FEATURE_DIM),
            proven_patterns: Vec::new(),
            effective_terms: HashMap::new(),
            exhausted_topics: Vec::new(),
            total_queries: 0,
            avg_reward: 0.0,
        }
    }

    /// Top `limit` effective terms by cumulative score, ties broken
    /// alphabetically so candidate synthesis stays deterministic.
    #[must_use]
    pub fn top_effective_terms(&self, limit: usize) -> Vec<String> {
        let mut terms: Vec<(&String, &f64)> = self.effective_terms.iter().collect();
        terms.sort_by(|a, b| {
            b.1.partial_cmp(a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });
        terms.into_iter().take(limit).map(|(word, _)| word.clone()).collect()
    }

    /// The `limit` most-recently-recorded proven patterns.
    #[must_use]
    pub fn recent_patterns(&self, limit: usize) -> &[String] {
        let start = self.proven_patterns.len().saturating_sub(limit);
        &self.proven_patterns[start..]
    }
}

fn identity(dim: usize) -> Vec<Vec<f64>> {
    (0..dim)
        .map(|i| (0..dim).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect()
}
