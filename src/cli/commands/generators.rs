//! List generators command.

use anyhow::Result;
use quote_signals::GeneratorRegistry;

pub fn run() -> Result<()> {
    let registry = GeneratorRegistry::new();

    println!("Available Generators");
    println!("═══════════════════════════════════════════════════════════");
    println!();

    for info in registry.list() {
        println!("  {} ({})", info.name, info.key);
        println!("  ───────────────────────────────────────────────────────");
        println!("  {}", info.description);
        println!("  Defaults: {}", info.default_config);
        println!();
    }

    println!("Use --generator <key> to select a generator and --set name=value to override windows.");

    Ok(())
}
