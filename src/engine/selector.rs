//! LinUCB candidate scoring and ranking.

use serde::Serialize;

use super::matrix::{invert, quadratic_form};
use super::state::LearningState;

/// One scored candidate, ephemeral to a single selection pass.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredCandidate {
    pub query: String,
    pub features: Vec<f64>,
    pub predicted_reward: f64,
    pub uncertainty: f64,
    pub novelty_score: f64,
    pub ucb_score: f64,
}

/// Combines predicted reward, an uncertainty bonus from the covariance
/// inverse, and a novelty bonus into one score per candidate.
#[derive(Debug, Clone, Copy)]
pub struct UcbSelector {
    /// Exploration weight (alpha).
    pub alpha: f64,
    /// Novelty weight (beta).
    pub beta: f64,
}

impl UcbSelector {
    #[must_use]
    pub fn new(alpha: f64, beta: f64) -> Self {
        Self { alpha, beta }
    }

    /// Score and rank candidates descending by UCB score. Ties keep
    /// generation order (the sort is stable). The covariance inverse is
    /// computed once per invocation, not per candidate.
    #[must_use]
    pub fn rank(
        &self,
        state: &LearningState,
        candidates: Vec<(String, Vec<f64>, f64)>,
    ) -> Vec<ScoredCandidate> {
        let a_inverse = invert(&state.a_matrix);

        let mut scored: Vec<ScoredCandidate> = candidates
            .into_iter()
            .map(|(query, features, novelty)| {
                let predicted_reward: f64 =
                    state.theta.iter().zip(&features).map(|(t, f)| t * f).sum();
                let uncertainty = quadratic_form(&features, &a_inverse).max(0.0).sqrt();
                let ucb_score =
                    predicted_reward + self.alpha * uncertainty + self.beta * novelty;
                ScoredCandidate {
                    query,
                    features,
                    predicted_reward,
                    uncertainty,
                    novelty_score: novelty,
                    ucb_score,
                }
            })
            .collect();

        scored.sort_by(|a, b| {
            b.ucb_score
                .partial_cmp(&a.ucb_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored
    }
}

/// Qualitative exploration label for the winning candidate. Telemetry only,
/// never fed back into scoring.
#[must_use]
pub fn exploration_level(uncertainty: f64, novelty: f64) -> &'static str {
    if uncertainty > 1.0 {
        "high"
    } else if novelty > 0.7 {
        "medium"
    } else {
        "low"
    }
}
