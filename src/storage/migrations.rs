//! Schema migrations.

use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA_VERSION: u32 = 1;

/// Run pending migrations, returning the resulting schema version.
pub fn run_migrations(conn: &Connection) -> Result<u32> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_meta (
             key TEXT PRIMARY KEY,
             value INTEGER NOT NULL
         );",
    )?;

    let current: u32 = conn
        .query_row(
            "SELECT value FROM schema_meta WHERE key = 'version'",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if current < 1 {
        migrate_v1(conn)?;
    }

    conn.execute(
        "INSERT INTO schema_meta (key, value) VALUES ('version', ?1)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        [SCHEMA_VERSION],
    )?;

    Ok(SCHEMA_VERSION)
}

fn migrate_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS learning_state (
             id INTEGER PRIMARY KEY AUTOINCREMENT,
             context_key TEXT NOT NULL UNIQUE,
             theta TEXT NOT NULL,
             a_matrix TEXT NOT NULL,
             proven_patterns TEXT NOT NULL,
             effective_terms TEXT NOT NULL,
             exhausted_topics TEXT NOT NULL,
             total_queries INTEGER NOT NULL DEFAULT 0,
             avg_reward REAL NOT NULL DEFAULT 0.0,
             created_at TEXT NOT NULL,
             updated_at TEXT NOT NULL
         );

         CREATE TABLE IF NOT EXISTS execution_log (
             id INTEGER PRIMARY KEY AUTOINCREMENT,
             learning_state_id INTEGER NOT NULL REFERENCES learning_state(id),
             query_text TEXT NOT NULL,
             query_features TEXT NOT NULL,
             predicted_reward REAL NOT NULL,
             uncertainty REAL NOT NULL,
             novelty_score REAL NOT NULL,
             ucb_score REAL NOT NULL,
             executed_at TEXT NOT NULL
         );

         CREATE INDEX IF NOT EXISTS idx_execution_log_state
             ON execution_log(learning_state_id, id DESC);",
    )?;
    Ok(())
}
