//! CLI command implementations.

pub mod fetch;
pub mod generators;
pub mod parse;
pub mod signals;
pub mod validate;

use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;

use quote_config::AppConfig;
use quote_core::traits::QuoteRegistry;
use quote_core::types::QuoteChain;
use quote_data::{BossaProvider, Format, MemoryQuoteRegistry, QuoteWriter};

/// Provider configured from the application settings.
pub fn provider(config: &AppConfig, registry: Arc<MemoryQuoteRegistry>) -> Result<BossaProvider> {
    let registry: Arc<dyn QuoteRegistry> = registry;
    BossaProvider::from_settings(config.provider.clone(), Some(registry))
        .context("Failed to create history provider")
}

/// Write a chain to `path` in the given dialect.
pub fn save_chain(chain: &QuoteChain, path: &Path, format: Format) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Cannot create {}", path.display()))?;
    let mut writer = QuoteWriter::new(BufWriter::new(file), format)?;
    writer.write_all(chain.quotes())?;
    writer.flush()?;
    Ok(())
}
