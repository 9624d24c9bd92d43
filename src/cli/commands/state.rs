use clap::{Args, Subcommand};

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_json};
use crate::error::{DqError, Result};
use crate::storage::LearningStore;

#[derive(Args, Debug)]
pub struct StateArgs {
    #[command(subcommand)]
    pub command: StateCommand,
}

#[derive(Subcommand, Debug)]
pub enum StateCommand {
    /// Show a context's learning state
    Show(ShowArgs),

    /// Mark a topic substring as exhausted for a context
    Exhaust(TopicArgs),

    /// Remove a topic substring from a context's exhausted set
    Revive(TopicArgs),

    /// Record a proven query pattern for a context
    Pattern(PatternArgs),

    /// Set the effectiveness score of a term for a context
    Term(TermArgs),
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Context key, e.g. `agency:42`, `topic:ferries`, or `global`
    pub context: String,
}

#[derive(Args, Debug)]
pub struct TopicArgs {
    pub context: String,
    pub topic: String,
}

#[derive(Args, Debug)]
pub struct PatternArgs {
    pub context: String,
    /// Template string, may contain an `[agency]` placeholder
    pub pattern: String,
}

#[derive(Args, Debug)]
pub struct TermArgs {
    pub context: String,
    pub word: String,
    pub score: f64,
}

pub fn run(ctx: &AppContext, args: &StateArgs) -> Result<()> {
    match &args.command {
        StateCommand::Show(args) => show(ctx, args),
        StateCommand::Exhaust(args) => exhaust(ctx, args),
        StateCommand::Revive(args) => revive(ctx, args),
        StateCommand::Pattern(args) => pattern(ctx, args),
        StateCommand::Term(args) => term(ctx, args),
    }
}

fn show(ctx: &AppContext, args: &ShowArgs) -> Result<()> {
    let store = LearningStore::new(&ctx.db);
    let state = store
        .load(&args.context)?
        .ok_or_else(|| DqError::StateNotFound(args.context.clone()))?;

    if ctx.robot_mode {
        return emit_json(&state);
    }

    let theta_norm = state.theta.iter().map(|v| v * v).sum::<f64>().sqrt();
    let trace: f64 = state
        .a_matrix
        .iter()
        .enumerate()
        .map(|(i, row)| row.get(i).copied().unwrap_or(0.0))
        .sum();

    let mut layout = HumanLayout::new();
    layout
        .title("Learning State")
        .kv("Context", &state.context_key)
        .kv("Theta norm", &format!("{theta_norm:.4}"))
        .kv("A-matrix trace", &format!("{trace:.4}"))
        .kv("Proven patterns", &state.proven_patterns.len().to_string())
        .kv("Effective terms", &state.effective_terms.len().to_string())
        .kv("Exhausted topics", &state.exhausted_topics.join(", "))
        .kv("Total queries", &state.total_queries.to_string())
        .kv("Avg reward", &format!("{:.4}", state.avg_reward));
    emit_human(layout);
    Ok(())
}

fn exhaust(ctx: &AppContext, args: &TopicArgs) -> Result<()> {
    let store = LearningStore::new(&ctx.db);
    let mut state = store.load_or_initialize(&args.context)?;
    if !state.exhausted_topics.contains(&args.topic) {
        state.exhausted_topics.push(args.topic.clone());
        store.update(&state)?;
    }
    confirm(ctx, "exhausted", &args.context, &args.topic)
}

fn revive(ctx: &AppContext, args: &TopicArgs) -> Result<()> {
    let store = LearningStore::new(&ctx.db);
    let mut state = store.load_or_initialize(&args.context)?;
    state.exhausted_topics.retain(|t| t != &args.topic);
    store.update(&state)?;
    confirm(ctx, "revived", &args.context, &args.topic)
}

fn pattern(ctx: &AppContext, args: &PatternArgs) -> Result<()> {
    let store = LearningStore::new(&ctx.db);
    let mut state = store.load_or_initialize(&args.context)?;
    state.proven_patterns.push(args.pattern.clone());
    store.update(&state)?;
    confirm(ctx, "pattern recorded", &args.context, &args.pattern)
}

fn term(ctx: &AppContext, args: &TermArgs) -> Result<()> {
    let store = LearningStore::new(&ctx.db);
    let mut state = store.load_or_initialize(&args.context)?;
    state.effective_terms.insert(args.word.clone(), args.score);
    store.update(&state)?;
    confirm(ctx, "term scored", &args.context, &args.word)
}

fn confirm(ctx: &AppContext, action: &str, context: &str, subject: &str) -> Result<()> {
    if ctx.robot_mode {
        emit_json(&serde_json::json!({
            "success": true,
            "action": action,
            "context_key": context,
            "subject": subject,
        }))
    } else {
        let mut layout = HumanLayout::new();
        layout
            .kv("Context", context)
            .kv("Action", action)
            .kv("Subject", subject);
        emit_human(layout);
        Ok(())
    }
}
