//! Validate configuration command.

use anyhow::Result;
use std::path::Path;

use quote_config::{load_config, DEFAULT_CONFIG_PATH};

pub fn run(config_path: Option<&Path>) -> Result<()> {
    let shown = config_path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| format!("{} (optional)", DEFAULT_CONFIG_PATH));
    println!("Validating configuration: {}", shown);

    match load_config(config_path) {
        Ok(config) => {
            println!("Configuration is valid!");
            println!();
            println!("App: {}", config.app.name);
            println!("Environment: {}", config.app.environment);
            println!("Log level: {}", config.logging.level);
            println!("Cache directory: {}", config.provider.cache_dir.display());
            println!("Archive open attempts: {}", config.provider.max_open_attempts);
            println!("Download attempts: {}", config.provider.retry.max_attempts);
            println!("Default generator: {}", config.generators.default);
            println!(
                "HMAC windows: fast {} slow {} smoothing {}",
                config.generators.hmac.fast,
                config.generators.hmac.slow,
                config.generators.hmac.smoothing
            );
            println!(
                "MAVD windows: fast {} slow {} signal {}",
                config.generators.mavd.fast,
                config.generators.mavd.slow,
                config.generators.mavd.signal
            );
        }
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
