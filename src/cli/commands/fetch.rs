//! Fetch command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::sync::Arc;
use tracing::{error, info};

use quote_config::AppConfig;
use quote_core::traits::HistoryProvider;
use quote_core::types::{Quote, QuoteChain, Symbol};
use quote_data::{reconcile, Format, MemoryQuoteRegistry};

use super::{provider, save_chain};
use crate::cli::{FetchArgs, OutputFormat};

#[derive(Serialize)]
struct FetchReport<'a> {
    symbol: &'a Symbol,
    quotes: Vec<&'a Quote>,
}

pub fn run(args: FetchArgs, config: &AppConfig) -> Result<()> {
    let registry = Arc::new(MemoryQuoteRegistry::new());
    let provider = provider(config, registry.clone())?;

    if let Some(dir) = &args.save_dir {
        fs::create_dir_all(dir).with_context(|| format!("Cannot create {}", dir.display()))?;
    }

    let mut failed = 0;
    for name in &args.symbols {
        let symbol = Symbol::new(name);
        let chain = match fetch_one(&provider, &symbol, &args) {
            Ok(chain) => chain,
            Err(e) => {
                error!(%symbol, error = %format!("{:#}", e), "Fetch failed, skipping symbol");
                failed += 1;
                continue;
            }
        };
        registry.record_chain(&chain);

        match args.output {
            OutputFormat::Json => {
                let report = FetchReport {
                    symbol: &symbol,
                    quotes: chain.quotes().collect(),
                };
                println!("{}", serde_json::to_string(&report)?);
            }
            OutputFormat::Text => print_summary(&symbol, &chain),
        }

        if let Some(dir) = &args.save_dir {
            let path = dir.join(format!("{}.mst", symbol));
            save_chain(&chain, &path, Format::Tagged)?;
            info!(%symbol, path = %path.display(), "Quotes saved");
        }
    }

    if failed == args.symbols.len() {
        anyhow::bail!("No symbol could be fetched");
    }
    Ok(())
}

fn fetch_one<P: HistoryProvider>(provider: &P, symbol: &Symbol, args: &FetchArgs) -> Result<QuoteChain> {
    if args.missing.is_empty() {
        let chain = provider.fetch_history(symbol, args.scope)?;
        info!(%symbol, scope = %args.scope, quotes = chain.len(), "Fetched history");
        return Ok(chain);
    }

    let quotes = reconcile(provider, symbol, &args.missing)?;
    Ok(QuoteChain::from_quotes(quotes)?)
}

fn print_summary(symbol: &Symbol, chain: &QuoteChain) {
    match (chain.head(), chain.tail()) {
        (Some(head), Some(tail)) => println!(
            "{:<10} {:>6} quotes  {} .. {}  close {}",
            symbol.name(),
            chain.len(),
            head.date,
            tail.date,
            tail.close
        ),
        _ => println!("{:<10} {:>6} quotes", symbol.name(), 0),
    }
}
