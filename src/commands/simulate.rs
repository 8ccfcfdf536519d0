//! `velpon simulate` — run lookups through a registered facility.

use std::sync::Arc;

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::commands::CommandContext;
use crate::output::{self, OutputFormat};
use velpon_chain::ResolutionFacility;
use velpon_core::AppResult;

/// Arguments for the simulate command
#[derive(Debug, Args)]
pub struct SimulateArgs {
    /// Names to look up, in order
    #[arg(required = true)]
    pub names: Vec<String>,

    /// Extra implementation names the host defines
    #[arg(short, long)]
    pub define: Vec<String>,
}

/// Result of one simulated lookup
#[derive(Debug, Serialize, Tabled)]
pub struct LookupRow {
    /// Looked-up name
    #[tabled(rename = "Name")]
    pub name: String,
    /// Implementation it denotes
    #[tabled(rename = "Bound to")]
    pub bound_to: String,
    /// Implementations it passes through
    #[tabled(rename = "Lineage")]
    pub lineage: String,
}

/// One alias recorded by the host
#[derive(Debug, Serialize, Tabled)]
pub struct AliasRow {
    /// Aliased name
    #[tabled(rename = "Alias")]
    pub name: String,
    /// Target
    #[tabled(rename = "Target")]
    pub target: String,
}

/// Lookups and the aliases they left behind
#[derive(Debug, Serialize)]
pub struct SimulationReport {
    /// One row per looked-up name, in argument order
    pub lookups: Vec<LookupRow>,
    /// Aliases bound while the facility was active
    pub aliases: Vec<AliasRow>,
}

/// Execute the simulate command
pub fn execute(args: &SimulateArgs, ctx: &CommandContext) -> AppResult<()> {
    let report = simulate(args, ctx)?;

    match ctx.format {
        OutputFormat::Json => output::print_json(&report),
        OutputFormat::Table => {
            output::print_list(&report.lookups, ctx.format);
            output::print_list(&report.aliases, ctx.format);
        }
    }

    Ok(())
}

/// Register the stack on the context's host, look every name up, then
/// unregister
pub fn simulate(args: &SimulateArgs, ctx: &CommandContext) -> AppResult<SimulationReport> {
    let host = Arc::new(ctx.host());
    for name in &args.define {
        host.define(name.clone());
    }

    let facility = ResolutionFacility::with_host(host.clone(), ctx.config.chain.clone());
    facility.register(ctx.stack.clone())?;

    let lookups: Vec<LookupRow> = args
        .names
        .iter()
        .map(|name| {
            let lineage = host.lineage(name);
            LookupRow {
                name: name.clone(),
                bound_to: lineage
                    .first()
                    .cloned()
                    .unwrap_or_else(|| "(unresolved)".to_string()),
                lineage: lineage.join(" -> "),
            }
        })
        .collect();

    let aliases: Vec<AliasRow> = host
        .aliases()
        .into_iter()
        .map(|(name, target)| AliasRow { name, target })
        .collect();

    facility.unregister()?;

    Ok(SimulationReport { lookups, aliases })
}
