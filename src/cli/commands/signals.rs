//! Signals command implementation.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use quote_config::AppConfig;
use quote_core::traits::{HistoryProvider, Parameters};
use quote_core::types::{QuoteChain, Signal, Symbol};
use quote_data::{MemoryQuoteRegistry, QuoteReader};
use quote_signals::{evaluate, Evaluation, GeneratorRegistry};

use super::provider;
use crate::cli::{OutputFormat, SignalsArgs};

pub fn run(args: SignalsArgs, config: &AppConfig) -> Result<()> {
    let key = args
        .generator
        .clone()
        .unwrap_or_else(|| config.generators.default.clone());

    let registry = GeneratorRegistry::new();
    if !registry.exists(&key) {
        anyhow::bail!(
            "Unknown generator '{}'. Run `quotes generators` to list the available ones",
            key
        );
    }

    let verbose = args.verbose || config.generators.verbose;
    let mut generator = config
        .generators
        .config_for(&key)?
        .build(verbose)
        .with_context(|| format!("Failed to create generator '{}'", key))?;

    if !args.windows.is_empty() {
        let params: Parameters = args.windows.iter().cloned().collect();
        generator
            .set_parameters(&params)
            .context("Invalid window override")?;
    }

    let chain = load_chain(&args, config)?;
    info!(
        generator = generator.name(),
        quotes = chain.len(),
        warmup = generator.warmup_period(),
        "Evaluating signals"
    );

    let evaluation = match args.lookback {
        Some(lookback) => Evaluation::Backtest { lookback },
        None => Evaluation::Latest,
    };
    let output = evaluate(generator.as_ref(), &chain, evaluation)?;

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&output)?),
        OutputFormat::Text => {
            for signal in output.signals() {
                print_signal(signal);
            }
        }
    }

    Ok(())
}

fn load_chain(args: &SignalsArgs, config: &AppConfig) -> Result<QuoteChain> {
    if let Some(path) = &args.data {
        let mut reader = QuoteReader::from_path(path)
            .with_context(|| format!("Cannot open {}", path.display()))?;
        return reader
            .read_chain()
            .with_context(|| format!("Failed to parse {}", path.display()));
    }

    let symbol = args
        .symbol
        .as_deref()
        .map(Symbol::new)
        .context("Provide a quote file with --data or a symbol with --symbol")?;
    let provider = provider(config, Arc::new(MemoryQuoteRegistry::new()))?;
    Ok(provider.fetch_history(&symbol, args.scope)?)
}

fn print_signal(signal: &Signal) {
    let mut line = format!(
        "{}  {:<10} {:<4}  close {:>10.4}  level {:>10.4}",
        signal.quote.date,
        signal.quote.symbol.name(),
        signal.signal_type,
        signal.quote.close,
        signal.level
    );
    for value in &signal.values {
        line.push_str(&format!("  {} {:.4}", value.name, value.value));
    }
    println!("{}", line);
}
