//! dq - adaptive search-query selection for transit procurement signal
//! discovery.
//!
//! A per-context LinUCB-style contextual bandit decides which web-search
//! query to issue next, learning from past query outcomes to avoid
//! re-issuing unproductive queries while still exploring unseen topics.

pub mod app;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod storage;

pub use error::{DqError, Result};
