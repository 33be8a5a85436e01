//! Parse command implementation.

use anyhow::{Context, Result};
use tracing::{info, warn};

use quote_data::{Format, QuoteReader};

use super::save_chain;
use crate::cli::{OutputFormat, ParseArgs};

pub fn run(args: ParseArgs) -> Result<()> {
    let mut reader = QuoteReader::from_path(&args.file)
        .with_context(|| format!("Cannot open {}", args.file.display()))?;

    if let Some(from) = args.from {
        if !reader.seek(from)? {
            warn!(file = %args.file.display(), %from, "No records from the requested day");
        }
    }

    let chain = reader
        .read_chain()
        .with_context(|| format!("Failed to parse {}", args.file.display()))?;
    let format = reader.format().unwrap_or(Format::Unknown);
    info!(file = %args.file.display(), %format, quotes = chain.len(), "Parsed quote file");

    match args.output {
        OutputFormat::Json => {
            let quotes: Vec<_> = chain.quotes().collect();
            println!("{}", serde_json::to_string_pretty(&quotes)?);
        }
        OutputFormat::Text => {
            println!("File:    {}", args.file.display());
            println!("Format:  {}", format);
            println!("Quotes:  {}", chain.len());
            if let Some(symbol) = chain.symbol() {
                println!("Symbol:  {}", symbol);
            }
            if let (Some(head), Some(tail)) = (chain.head(), chain.tail()) {
                println!("From:    {}", head.date);
                println!("To:      {}", tail.date);
                println!(
                    "Last:    O {} H {} L {} C {} V {}",
                    tail.open, tail.high, tail.low, tail.close, tail.volume
                );
            }
        }
    }

    if let Some(path) = &args.save {
        save_chain(&chain, path, args.save_format.into())?;
        info!(path = %path.display(), "Quotes saved");
    }

    Ok(())
}
