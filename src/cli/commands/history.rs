use clap::Args;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_json};
use crate::error::{DqError, Result};
use crate::storage::LearningStore;

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Context key, e.g. `agency:42`, `topic:ferries`, or `global`
    pub context: String,

    /// Maximum rows to show
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

pub fn run(ctx: &AppContext, args: &HistoryArgs) -> Result<()> {
    let store = LearningStore::new(&ctx.db);
    let state = store
        .load(&args.context)?
        .ok_or_else(|| DqError::StateNotFound(args.context.clone()))?;
    let state_id = state
        .id
        .ok_or_else(|| DqError::StateNotFound(args.context.clone()))?;
    let rows = store.recent_executions(state_id, args.limit)?;

    if ctx.robot_mode {
        return emit_json(&serde_json::json!({
            "success": true,
            "context_key": state.context_key,
            "executions": rows,
        }));
    }

    let mut layout = HumanLayout::new();
    layout.title(&format!("History: {}", state.context_key));
    if rows.is_empty() {
        layout.bullet("(no executions logged)");
    }
    for row in &rows {
        layout.bullet(&format!(
            "{}  ucb={:.4} novelty={:.4} uncertainty={:.4}  {}",
            row.executed_at.format("%Y-%m-%d %H:%M:%S"),
            row.ucb_score,
            row.novelty_score,
            row.uncertainty,
            row.query_text,
        ));
    }
    emit_human(layout);
    Ok(())
}
