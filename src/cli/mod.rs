//! CLI definitions.

pub mod commands;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use quote_core::traits::HistoryScope;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "quotes")]
#[command(author, version, about = "Quote ingestion and moving-average signal generation")]
pub struct Cli {
    /// Configuration file path (defaults to config/default.toml when present)
    #[arg(short, long, global = true, env = "QUOTES_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (overrides the configuration)
    #[arg(short, long, global = true)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Dialects quotes can be written in.
#[derive(Clone, Copy, ValueEnum)]
pub enum WriteFormat {
    Daily,
    Tagged,
    Intraday,
}

impl From<WriteFormat> for quote_data::Format {
    fn from(format: WriteFormat) -> Self {
        match format {
            WriteFormat::Daily => quote_data::Format::Daily,
            WriteFormat::Tagged => quote_data::Format::Tagged,
            WriteFormat::Intraday => quote_data::Format::Intraday,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a quote file and report what it holds
    Parse(ParseArgs),
    /// Fetch history for symbols from the provider
    Fetch(FetchArgs),
    /// Run a signal generator over quotes
    Signals(SignalsArgs),
    /// List available signal generators
    Generators,
    /// Validate configuration
    ValidateConfig,
}

#[derive(clap::Args)]
pub struct ParseArgs {
    /// Quote file in any supported dialect
    pub file: PathBuf,

    /// Skip records before this day (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Output format (text, json)
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Write the parsed quotes to this file
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Dialect of the saved file
    #[arg(long, value_enum, default_value = "daily")]
    pub save_format: WriteFormat,
}

#[derive(clap::Args)]
pub struct FetchArgs {
    /// Symbols to fetch (comma-separated)
    #[arg(short = 'S', long, value_delimiter = ',', required = true)]
    pub symbols: Vec<String>,

    /// How much history to fetch
    #[arg(long, default_value = "last")]
    pub scope: HistoryScope,

    /// Only keep these missing days (comma-separated YYYY-MM-DD)
    #[arg(long, value_delimiter = ',', conflicts_with = "scope")]
    pub missing: Vec<NaiveDate>,

    /// Directory to save one daily file per symbol
    #[arg(long)]
    pub save_dir: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(clap::Args)]
pub struct SignalsArgs {
    /// Quote file to evaluate
    #[arg(long, conflicts_with = "symbol", required_unless_present = "symbol")]
    pub data: Option<PathBuf>,

    /// Symbol to fetch from the provider
    #[arg(short = 'S', long)]
    pub symbol: Option<String>,

    /// History scope when fetching
    #[arg(long, default_value = "all")]
    pub scope: HistoryScope,

    /// Generator name (defaults to the configured one)
    #[arg(short, long)]
    pub generator: Option<String>,

    /// Window overrides, e.g. --set fast=10 --set slow=30
    #[arg(long = "set", value_parser = parse_window)]
    pub windows: Vec<(String, i64)>,

    /// Classify the last N quotes instead of only the latest one
    #[arg(long)]
    pub lookback: Option<usize>,

    /// Attach diagnostic values to signals
    #[arg(short, long)]
    pub verbose: bool,

    /// Output format (text, json)
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

fn parse_window(s: &str) -> Result<(String, i64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    let value = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid window '{}': {}", value, e))?;
    Ok((name.trim().to_string(), value))
}
