//! `velpon chain` — show one hook point's delegation chain.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::commands::CommandContext;
use crate::output;
use velpon_chain::{ChainEntry, ChainResolver};
use velpon_core::AppResult;

/// Arguments for the chain command
#[derive(Debug, Args)]
pub struct ChainArgs {
    /// Hook point whose chain to show
    pub hook_point: String,
}

/// One chain position as a table row
#[derive(Debug, Serialize, Tabled)]
pub struct ChainRow {
    /// Position, 0 outermost
    #[tabled(rename = "#")]
    pub position: usize,
    /// Bound identifier
    #[tabled(rename = "Implementation")]
    pub id: String,
    /// Supplying registration
    #[tabled(rename = "Registration")]
    pub registration: String,
    /// Link name
    #[tabled(rename = "Link")]
    pub link: String,
    /// Link target
    #[tabled(rename = "Next")]
    pub next: String,
}

impl From<ChainEntry> for ChainRow {
    fn from(entry: ChainEntry) -> Self {
        Self {
            position: entry.position,
            registration: entry
                .registration
                .clone()
                .unwrap_or_else(|| "(pluggable base)".to_string()),
            link: output::cell(&entry.link),
            next: output::cell(&entry.next),
            id: entry.id,
        }
    }
}

/// Execute the chain command
pub fn execute(args: &ChainArgs, ctx: &CommandContext) -> AppResult<()> {
    let resolver = ChainResolver::new(ctx.stack.clone(), ctx.scheme());
    let rows: Vec<ChainRow> = resolver
        .describe(&args.hook_point)
        .into_iter()
        .map(ChainRow::from)
        .collect();

    output::print_list(&rows, ctx.format);
    Ok(())
}
