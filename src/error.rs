//! Error types for dq.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DqError>;

#[derive(Debug, Error)]
pub enum DqError {
    /// The candidate generator produced zero usable query candidates.
    #[error("no usable query candidates for context '{0}'")]
    NoCandidates(String),

    /// No learning state exists for the requested context.
    #[error("no learning state for context '{0}'")]
    StateNotFound(String),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("missing configuration: {0}")]
    MissingConfig(String),
}

impl DqError {
    /// Stable machine-readable code for robot-mode error payloads.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoCandidates(_) => "no_candidates",
            Self::StateNotFound(_) => "state_not_found",
            Self::Sqlite(_) => "persistence_error",
            Self::Json(_) => "serialization_error",
            Self::Io(_) => "io_error",
            Self::Config(_) | Self::MissingConfig(_) => "config_error",
        }
    }
}
