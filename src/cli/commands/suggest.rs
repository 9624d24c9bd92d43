use clap::Args;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_json};
use crate::engine::{QueryContext, QueryEngine, SuggestRequest};
use crate::error::Result;

#[derive(Args, Debug, Default)]
pub struct SuggestArgs {
    /// Agency identifier (scopes learning to `agency:<id>`)
    #[arg(long)]
    pub agency_id: Option<String>,

    /// Agency display name used in candidate synthesis
    #[arg(long)]
    pub agency_name: Option<String>,

    /// Free-text topic (scopes learning to `topic:<topic>` when no agency)
    #[arg(long)]
    pub topic: Option<String>,

    /// Location used in candidate synthesis
    #[arg(long)]
    pub location: Option<String>,

    /// Override the exploration weight (alpha)
    #[arg(long)]
    pub exploration_weight: Option<f64>,

    /// Override the novelty weight (beta)
    #[arg(long)]
    pub novelty_weight: Option<f64>,
}

pub fn run(ctx: &AppContext, args: &SuggestArgs) -> Result<()> {
    let request = SuggestRequest {
        context: QueryContext {
            agency_id: args.agency_id.clone(),
            agency_name: args.agency_name.clone(),
            topic: args.topic.clone(),
            location: args.location.clone(),
        },
        exploration_weight: args.exploration_weight,
        novelty_weight: args.novelty_weight,
    };

    let engine = QueryEngine::new(&ctx.db, &ctx.config);
    let result = engine.suggest(&request);

    if ctx.robot_mode {
        // The invocation boundary: any failure becomes a response, never a
        // crash of the calling pipeline.
        return match result {
            Ok(response) => emit_json(&response),
            Err(err) => emit_json(&serde_json::json!({
                "success": false,
                "error": err.to_string(),
            })),
        };
    }

    let response = result?;
    let mut layout = HumanLayout::new();
    layout
        .title("Next Query")
        .kv("Query", &response.query)
        .blank()
        .section("Scores")
        .kv("Predicted reward", &format!("{:.4}", response.metadata.predicted_reward))
        .kv("Uncertainty", &format!("{:.4}", response.metadata.uncertainty))
        .kv("Novelty", &format!("{:.4}", response.metadata.novelty_score))
        .kv("UCB score", &format!("{:.4}", response.metadata.ucb_score))
        .kv("Exploration", response.metadata.exploration_level)
        .blank()
        .section("Context")
        .kv("Key", &response.metadata.context_key)
        .kv(
            "Total queries",
            &response.metadata.total_queries_executed.to_string(),
        );

    if !response.top_alternatives.is_empty() {
        layout.blank().section("Alternatives");
        for alt in &response.top_alternatives {
            layout.bullet(&format!("{} ({:.4})", alt.query, alt.ucb_score));
        }
    }

    emit_human(layout);
    Ok(())
}
