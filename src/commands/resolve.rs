//! `velpon resolve` — classify and resolve one name.

use clap::Args;
use serde::Serialize;

use crate::commands::CommandContext;
use crate::output::{self, OutputFormat};
use velpon_chain::{ChainResolver, NameClassifier, NameKind};
use velpon_core::AppResult;

/// Arguments for the resolve command
#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Hook point or link name to resolve
    pub name: String,
}

/// Classification and resolution of one name
#[derive(Debug, Serialize)]
pub struct ResolveReport {
    /// The name as given
    pub name: String,
    /// What kind of query it is
    pub kind: NameKind,
    /// Implementation it resolves to, if any
    pub target: Option<String>,
}

/// Execute the resolve command
pub fn execute(args: &ResolveArgs, ctx: &CommandContext) -> AppResult<()> {
    let report = resolve(args, ctx)?;

    match ctx.format {
        OutputFormat::Json => output::print_json(&report),
        OutputFormat::Table => match (&report.kind, &report.target) {
            (NameKind::TopOfChain(_), Some(target)) => {
                println!("{} (hook point) -> {}", report.name, target)
            }
            (NameKind::Link(override_id), Some(target)) => {
                println!("{} (link of {}) -> {}", report.name, override_id, target)
            }
            _ => output::print_warning(&format!(
                "'{}' is neither a hook point nor a link",
                report.name
            )),
        },
    }

    Ok(())
}

/// Classify `args.name` against the context's host and resolve it
pub fn resolve(args: &ResolveArgs, ctx: &CommandContext) -> AppResult<ResolveReport> {
    let host = ctx.host();
    let classifier = NameClassifier::from_config(&ctx.config.chain);
    let resolver = ChainResolver::new(ctx.stack.clone(), ctx.scheme());

    let kind = classifier.classify(&args.name, &host);
    let target = match &kind {
        NameKind::TopOfChain(hook_point) => Some(resolver.resolve_top(hook_point)),
        NameKind::Link(_) => Some(resolver.resolve_link(&args.name)?),
        NameKind::Foreign => None,
    };

    Ok(ResolveReport {
        name: args.name.clone(),
        kind,
        target,
    })
}
