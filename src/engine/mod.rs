//! Adaptive query generation engine.
//!
//! A per-context LinUCB-style contextual bandit that decides which search
//! query to issue next when probing the web for transit procurement and news
//! signals. Each invocation loads (or initializes) the context's learning
//! state, synthesizes candidate queries, scores each by predicted reward,
//! parameter uncertainty, and novelty against recent history, then selects
//! and logs one query.

pub mod candidates;
pub mod features;
pub mod matrix;
pub mod novelty;
pub mod selector;
pub mod state;

mod orchestrator;

pub use candidates::CandidateGenerator;
pub use features::{FEATURE_DIM, FeatureExtractor};
pub use novelty::novelty_score;
pub use orchestrator::{QueryEngine, SuggestMetadata, SuggestRequest, SuggestResponse};
pub use selector::{ScoredCandidate, UcbSelector, exploration_level};
pub use state::{LearningState, QueryContext};
