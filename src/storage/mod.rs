//! Storage layer for dq.
//!
//! SQLite holds the per-context learning state and the append-only
//! execution log that feeds novelty scoring.

pub mod learning;
pub mod migrations;
pub mod sqlite;

pub use learning::{ExecutionRecord, LearningStore};
pub use sqlite::Database;
