//! `velpon check` — stack diagnostics and a summary of every chain.

use serde::Serialize;
use tabled::Tabled;

use crate::commands::CommandContext;
use crate::output::{self, OutputFormat};
use velpon_chain::{ChainResolver, StackDiagnostic};
use velpon_core::AppResult;

/// Summary of one hook point's chain
#[derive(Debug, Serialize, Tabled)]
pub struct ChainSummary {
    /// Hook point
    #[tabled(rename = "Hook point")]
    pub hook_point: String,
    /// Outermost implementation
    #[tabled(rename = "Top")]
    pub top: String,
    /// Number of implementations including the base
    #[tabled(rename = "Depth")]
    pub depth: usize,
    /// Whole chain, outermost first
    #[tabled(rename = "Chain")]
    pub chain: String,
}

#[derive(Debug, Serialize)]
struct CheckReport<'a> {
    registrations: usize,
    diagnostics: &'a [StackDiagnostic],
    chains: &'a [ChainSummary],
}

/// Execute the check command
pub fn execute(ctx: &CommandContext) -> AppResult<()> {
    let resolver = ChainResolver::new(ctx.stack.clone(), ctx.scheme());
    let diagnostics = ctx.stack.diagnostics(resolver.scheme());

    let chains: Vec<ChainSummary> = ctx
        .known_hook_points()
        .into_iter()
        .map(|hook_point| {
            let chain = resolver.chain(&hook_point);
            ChainSummary {
                top: resolver.resolve_top(&hook_point),
                depth: chain.len(),
                chain: chain.join(" -> "),
                hook_point,
            }
        })
        .collect();

    match ctx.format {
        OutputFormat::Json => output::print_json(&CheckReport {
            registrations: ctx.stack.len(),
            diagnostics: &diagnostics,
            chains: &chains,
        }),
        OutputFormat::Table => {
            for diagnostic in &diagnostics {
                output::print_warning(&diagnostic.to_string());
            }
            if diagnostics.is_empty() {
                output::print_success(&format!(
                    "{} registration(s), no issues found",
                    ctx.stack.len()
                ));
            }
            output::print_list(&chains, ctx.format);
        }
    }

    Ok(())
}
