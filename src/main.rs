//! Velpon — plugin override chain resolver.
//!
//! Entry point: loads configuration, initializes logging and dispatches
//! the selected command.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use velpon_core::config::AppConfig;
use velpon_core::config::logging::LoggingConfig;

mod commands;
mod output;

use commands::Cli;

fn main() {
    let cli = Cli::parse();

    let env = std::env::var("VELPON_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&cli.config, &env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config.logging);
    tracing::debug!(config = %cli.config, env = %env, "Configuration loaded");

    if let Err(e) = cli.execute(config) {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}

/// Initialize tracing/logging on stderr so command output stays clean
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    match logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
