//! CLI command definitions and dispatch.

pub mod chain;
pub mod check;
pub mod resolve;
pub mod simulate;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::warn;

use crate::output::OutputFormat;
use velpon_chain::{InMemoryHost, NameScheme, Stack, StackFile};
use velpon_core::config::AppConfig;
use velpon_core::AppResult;

/// Velpon — stack plugin overrides of named hook points
#[derive(Debug, Parser)]
#[command(name = "velpon", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (extension optional)
    #[arg(short, long, default_value = "config/default")]
    pub config: String,

    /// Stack file to load, overriding `stack.path`
    #[arg(short, long)]
    pub stack: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Classify and resolve a single name
    Resolve(resolve::ResolveArgs),
    /// Show the delegation chain of a hook point
    Chain(chain::ChainArgs),
    /// Report stack diagnostics and every chain
    Check,
    /// Register the stack on an in-memory host and look names up
    Simulate(simulate::SimulateArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(&self, config: AppConfig) -> AppResult<()> {
        let ctx = CommandContext::load(config, self.stack.clone(), self.format)?;

        match &self.command {
            Commands::Resolve(args) => resolve::execute(args, &ctx),
            Commands::Chain(args) => chain::execute(args, &ctx),
            Commands::Check => check::execute(&ctx),
            Commands::Simulate(args) => simulate::execute(args, &ctx),
        }
    }
}

/// State shared by all commands
#[derive(Debug)]
pub struct CommandContext {
    /// Loaded configuration
    pub config: AppConfig,
    /// Loaded registration stack
    pub stack: Stack,
    /// Selected output format
    pub format: OutputFormat,
}

impl CommandContext {
    /// Load the stack named on the command line or in the configuration
    pub fn load(
        config: AppConfig,
        stack_path: Option<PathBuf>,
        format: OutputFormat,
    ) -> AppResult<Self> {
        let path = stack_path.or_else(|| config.stack.path.as_ref().map(PathBuf::from));

        let stack = match path {
            Some(path) => StackFile::load(&path)?,
            None => {
                warn!("No stack file configured, resolving against an empty stack");
                Stack::default()
            }
        };

        Ok(Self {
            config,
            stack,
            format,
        })
    }

    /// Naming scheme from the `[chain]` section
    pub fn scheme(&self) -> NameScheme {
        NameScheme::from_config(&self.config.chain)
    }

    /// Hook points known to this invocation: declared ones, then those the
    /// stack overrides
    pub fn known_hook_points(&self) -> Vec<String> {
        let mut hook_points = self.config.chain.hook_points.clone();
        for registration in self.stack.registrations() {
            for hook_point in registration.overrides.keys() {
                if !hook_points.contains(hook_point) {
                    hook_points.push(hook_point.clone());
                }
            }
        }
        hook_points
    }

    /// An in-memory host where every known hook point's pluggable base is
    /// defined and every override delegates through its link
    pub fn host(&self) -> InMemoryHost {
        let scheme = self.scheme();
        let host = InMemoryHost::new();

        for hook_point in self.known_hook_points() {
            host.define(scheme.pluggable_base(&hook_point));
        }
        for registration in self.stack.registrations() {
            for override_id in registration.overrides.values() {
                host.define_delegating(override_id.clone(), scheme.link_of(override_id));
            }
        }

        host
    }
}
