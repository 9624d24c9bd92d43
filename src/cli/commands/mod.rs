//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - run() function to execute the command

use clap::Subcommand;

pub mod history;
pub mod state;
pub mod suggest;

use crate::app::AppContext;
use crate::error::Result;

pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Suggest(args) => suggest::run(ctx, args),
        Commands::State(args) => state::run(ctx, args),
        Commands::History(args) => history::run(ctx, args),
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Select the next search query for a context
    Suggest(suggest::SuggestArgs),

    /// Inspect or curate a context's learning state
    State(state::StateArgs),

    /// Show recent execution-log entries for a context
    History(history::HistoryArgs),
}
