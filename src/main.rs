//! Quote ingestion and signal generation CLI.

mod cli;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use quote_config::load_config;

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::ValidateConfig = cli.command {
        return cli::commands::validate::run(cli.config.as_deref());
    }

    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;

    // Setup logging
    let level = cli
        .log_level
        .map(|l| l.as_str().to_string())
        .unwrap_or_else(|| config.logging.level.clone());
    let json = cli.json_logs || config.logging.is_json();
    let _guard = logging::setup_logging(&level, json, config.logging.file.as_deref())?;

    // Execute command
    match cli.command {
        Commands::Parse(args) => cli::commands::parse::run(args),
        Commands::Fetch(args) => cli::commands::fetch::run(args, &config),
        Commands::Signals(args) => cli::commands::signals::run(args, &config),
        Commands::Generators => cli::commands::generators::run(),
        Commands::ValidateConfig => cli::commands::validate::run(cli.config.as_deref()),
    }
}
