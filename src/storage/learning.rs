//! Learning-state persistence: load, idempotent initialize, and the
//! append-only execution log.

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, params};
use serde::Serialize;
use tracing::debug;

use crate::engine::LearningState;
use crate::error::{DqError, Result};
use crate::storage::Database;

/// One appended decision, read back later as the novelty corpus.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionRecord {
    pub id: i64,
    pub learning_state_id: i64,
    pub query_text: String,
    pub query_features: Vec<f64>,
    pub predicted_reward: f64,
    pub uncertainty: f64,
    pub novelty_score: f64,
    pub ucb_score: f64,
    pub executed_at: DateTime<Utc>,
}

pub struct LearningStore<'a> {
    db: &'a Database,
}

impl<'a> LearningStore<'a> {
    #[must_use]
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Load the learning state for a context, if one exists.
    pub fn load(&self, context_key: &str) -> Result<Option<LearningState>> {
        self.db
            .conn()
            .query_row(
                "SELECT id, context_key, theta, a_matrix, proven_patterns,
                        effective_terms, exhausted_topics, total_queries, avg_reward
                 FROM learning_state WHERE context_key = ?1",
                [context_key],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, String>(5)?,
                        row.get::<_, String>(6)?,
                        row.get::<_, i64>(7)?,
                        row.get::<_, f64>(8)?,
                    ))
                },
            )
            .optional()?
            .map(|row| {
                Ok(LearningState {
                    id: Some(row.0),
                    context_key: row.1,
                    theta: serde_json::from_str(&row.2)?,
                    a_matrix: serde_json::from_str(&row.3)?,
                    proven_patterns: serde_json::from_str(&row.4)?,
                    effective_terms: serde_json::from_str(&row.5)?,
                    exhausted_topics: serde_json::from_str(&row.6)?,
                    total_queries: row.7,
                    avg_reward: row.8,
                })
            })
            .transpose()
    }

    /// Write a fresh zeroed state for the context and return it. Idempotent
    /// under concurrent first requests: the unique constraint makes the
    /// insert a no-op for the loser, and both callers re-read the same row.
    pub fn initialize(&self, context_key: &str) -> Result<LearningState> {
        let fresh = LearningState::new(context_key);
        let now = Utc::now().to_rfc3339();
        self.db.conn().execute(
            "INSERT INTO learning_state
                 (context_key, theta, a_matrix, proven_patterns, effective_terms,
                  exhausted_topics, total_queries, avg_reward, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, 0.0, ?7, ?7)
             ON CONFLICT(context_key) DO NOTHING",
            params![
                context_key,
                serde_json::to_string(&fresh.theta)?,
                serde_json::to_string(&fresh.a_matrix)?,
                serde_json::to_string(&fresh.proven_patterns)?,
                serde_json::to_string(&fresh.effective_terms)?,
                serde_json::to_string(&fresh.exhausted_topics)?,
                now,
            ],
        )?;
        self.load(context_key)?
            .ok_or_else(|| DqError::StateNotFound(context_key.to_string()))
    }

    /// Load the state for a context, creating it on first request.
    pub fn load_or_initialize(&self, context_key: &str) -> Result<LearningState> {
        if let Some(state) = self.load(context_key)? {
            return Ok(state);
        }
        debug!(context_key, "initializing learning state");
        self.initialize(context_key)
    }

    /// Persist curated knowledge fields (patterns, terms, topics) and
    /// counters. Model parameters are written too so a future reward
    /// feedback step can reuse this path.
    pub fn update(&self, state: &LearningState) -> Result<()> {
        let id = state
            .id
            .ok_or_else(|| DqError::StateNotFound(state.context_key.clone()))?;
        self.db.conn().execute(
            "UPDATE learning_state SET
                 theta = ?1, a_matrix = ?2, proven_patterns = ?3,
                 effective_terms = ?4, exhausted_topics = ?5,
                 total_queries = ?6, avg_reward = ?7, updated_at = ?8
             WHERE id = ?9",
            params![
                serde_json::to_string(&state.theta)?,
                serde_json::to_string(&state.a_matrix)?,
                serde_json::to_string(&state.proven_patterns)?,
                serde_json::to_string(&state.effective_terms)?,
                serde_json::to_string(&state.exhausted_topics)?,
                state.total_queries,
                state.avg_reward,
                Utc::now().to_rfc3339(),
                id,
            ],
        )?;
        Ok(())
    }

    /// Append one decision to the execution log.
    pub fn append_execution(
        &self,
        learning_state_id: i64,
        query_text: &str,
        query_features: &[f64],
        predicted_reward: f64,
        uncertainty: f64,
        novelty_score: f64,
        ucb_score: f64,
    ) -> Result<i64> {
        self.db.conn().execute(
            "INSERT INTO execution_log
                 (learning_state_id, query_text, query_features, predicted_reward,
                  uncertainty, novelty_score, ucb_score, executed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                learning_state_id,
                query_text,
                serde_json::to_string(query_features)?,
                predicted_reward,
                uncertainty,
                novelty_score,
                ucb_score,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(self.db.conn().last_insert_rowid())
    }

    /// Most recent query strings for a context, newest first. This is the
    /// novelty comparison corpus.
    pub fn recent_queries(&self, learning_state_id: i64, limit: usize) -> Result<Vec<String>> {
        let mut stmt = self.db.conn().prepare(
            "SELECT query_text FROM execution_log
             WHERE learning_state_id = ?1
             ORDER BY id DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![learning_state_id, limit as i64], |row| {
            row.get::<_, String>(0)
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Full execution-log rows for a context, newest first.
    pub fn recent_executions(
        &self,
        learning_state_id: i64,
        limit: usize,
    ) -> Result<Vec<ExecutionRecord>> {
        let mut stmt = self.db.conn().prepare(
            "SELECT id, learning_state_id, query_text, query_features,
                    predicted_reward, uncertainty, novelty_score, ucb_score, executed_at
             FROM execution_log
             WHERE learning_state_id = ?1
             ORDER BY id DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![learning_state_id, limit as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, f64>(4)?,
                row.get::<_, f64>(5)?,
                row.get::<_, f64>(6)?,
                row.get::<_, f64>(7)?,
                row.get::<_, String>(8)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let row = row?;
            out.push(ExecutionRecord {
                id: row.0,
                learning_state_id: row.1,
                query_text: row.2,
                query_features: serde_json::from_str(&row.3)?,
                predicted_reward: row.4,
                uncertainty: row.5,
                novelty_score: row.6,
                ucb_score: row.7,
                executed_at: row
                    .8
                    .parse::<DateTime<Utc>>()
                    .unwrap_or_else(|_| Utc::now()),
            });
        }
        Ok(out)
    }
}
