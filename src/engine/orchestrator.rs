//! One invocation of the engine: load state, generate, score, select, log.

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{DqError, Result};
use crate::storage::{Database, LearningStore};

use super::candidates::CandidateGenerator;
use super::features::FeatureExtractor;
use super::novelty::novelty_score;
use super::selector::{ScoredCandidate, UcbSelector, exploration_level};
use super::state::QueryContext;

/// One query-selection request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuggestRequest {
    pub context: QueryContext,
    /// Overrides the configured alpha.
    pub exploration_weight: Option<f64>,
    /// Overrides the configured beta.
    pub novelty_weight: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuggestMetadata {
    pub predicted_reward: f64,
    pub uncertainty: f64,
    pub novelty_score: f64,
    pub ucb_score: f64,
    pub exploration_level: &'static str,
    pub context_key: String,
    pub total_queries_executed: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Alternative {
    pub query: String,
    pub ucb_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuggestResponse {
    pub success: bool,
    pub query: String,
    pub metadata: SuggestMetadata,
    pub top_alternatives: Vec<Alternative>,
}

/// The adaptive query generation engine. Stateless between invocations;
/// everything learned lives behind the learning store.
pub struct QueryEngine<'a> {
    db: &'a Database,
    config: &'a Config,
    reference_year: i32,
}

impl<'a> QueryEngine<'a> {
    #[must_use]
    pub fn new(db: &'a Database, config: &'a Config) -> Self {
        Self {
            db,
            config,
            reference_year: Utc::now().year(),
        }
    }

    /// Pin the temporal-recency reference year. Tests use this to keep
    /// feature extraction reproducible across year boundaries.
    #[must_use]
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = year;
        self
    }

    /// Run one full selection pass and persist the decision.
    pub fn suggest(&self, request: &SuggestRequest) -> Result<SuggestResponse> {
        let context_key = request.context.context_key();
        let store = LearningStore::new(self.db);
        let state = store.load_or_initialize(&context_key)?;
        let state_id = state
            .id
            .ok_or_else(|| DqError::StateNotFound(context_key.clone()))?;

        let generator = CandidateGenerator::new(&self.config.vocab, &self.config.engine);
        let candidates = generator.generate(&request.context, &state);
        if candidates.is_empty() {
            return Err(DqError::NoCandidates(context_key));
        }

        let recent = store.recent_queries(state_id, self.config.engine.history_window)?;
        let extractor = FeatureExtractor::new(self.config.vocab.clone(), self.reference_year);

        let scored_inputs: Vec<(String, Vec<f64>, f64)> = candidates
            .into_iter()
            .map(|candidate| {
                let features = extractor.extract(&candidate, &state);
                let novelty = novelty_score(&candidate, &recent);
                (candidate, features, novelty)
            })
            .collect();

        let alpha = request
            .exploration_weight
            .unwrap_or(self.config.engine.exploration_weight);
        let beta = request
            .novelty_weight
            .unwrap_or(self.config.engine.novelty_weight);
        let selector = UcbSelector::new(alpha, beta);
        let mut ranked = selector.rank(&state, scored_inputs);
        debug!(
            context_key = %state.context_key,
            candidates = ranked.len(),
            alpha,
            beta,
            "ranked candidate queries"
        );

        let winner: ScoredCandidate = ranked.remove(0);
        store.append_execution(
            state_id,
            &winner.query,
            &winner.features,
            winner.predicted_reward,
            winner.uncertainty,
            winner.novelty_score,
            winner.ucb_score,
        )?;
        info!(
            context_key = %state.context_key,
            query = %winner.query,
            ucb_score = winner.ucb_score,
            "selected query"
        );

        let top_alternatives = ranked
            .into_iter()
            .take(3)
            .map(|c| Alternative {
                query: c.query,
                ucb_score: c.ucb_score,
            })
            .collect();

        Ok(SuggestResponse {
            success: true,
            query: winner.query,
            metadata: SuggestMetadata {
                predicted_reward: winner.predicted_reward,
                uncertainty: winner.uncertainty,
                novelty_score: winner.novelty_score,
                ucb_score: winner.ucb_score,
                exploration_level: exploration_level(winner.uncertainty, winner.novelty_score),
                context_key: state.context_key,
                total_queries_executed: state.total_queries,
            },
            top_alternatives,
        })
    }
}
