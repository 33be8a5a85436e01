//! Generator registry for loading generators by name.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use quote_core::{
    error::GeneratorError,
    traits::{SignalGenerator, WindowConfig},
};

use crate::{HmacConfig, HmacGenerator, MavdConfig, MavdGenerator};

/// Information about a registered generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorInfo {
    /// Registry key
    pub key: String,
    /// Display name
    pub name: String,
    /// Generator description
    pub description: String,
    /// Default configuration as JSON
    pub default_config: serde_json::Value,
}

/// Registry of the built-in signal generators.
pub struct GeneratorRegistry {
    generators: BTreeMap<String, GeneratorInfo>,
}

impl GeneratorRegistry {
    /// Create a registry with all built-in generators.
    pub fn new() -> Self {
        let mut generators = BTreeMap::new();

        let hmac = HmacGenerator::default();
        generators.insert(
            "hmac".to_string(),
            GeneratorInfo {
                key: "hmac".to_string(),
                name: hmac.name().to_string(),
                description: hmac.description().to_string(),
                default_config: config_value(&HmacConfig::default()),
            },
        );

        let mavd = MavdGenerator::default();
        generators.insert(
            "mavd".to_string(),
            GeneratorInfo {
                key: "mavd".to_string(),
                name: mavd.name().to_string(),
                description: mavd.description().to_string(),
                default_config: config_value(&MavdConfig::default()),
            },
        );

        Self { generators }
    }

    /// List all available generators, ordered by key.
    pub fn list(&self) -> Vec<&GeneratorInfo> {
        self.generators.values().collect()
    }

    /// Get generator info by key (case-insensitive).
    pub fn get(&self, key: &str) -> Option<&GeneratorInfo> {
        self.generators.get(&key.to_lowercase())
    }

    /// Check if a generator exists.
    pub fn exists(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Create a generator from a JSON configuration.
    ///
    /// Missing windows take their defaults.
    pub fn create(
        &self,
        key: &str,
        config: serde_json::Value,
        verbose: bool,
    ) -> Result<Box<dyn SignalGenerator>, GeneratorError> {
        let mut generator: Box<dyn SignalGenerator> = match key.to_lowercase().as_str() {
            "hmac" => Box::new(HmacGenerator::new(parse_config::<HmacConfig>(config)?)?),
            "mavd" => Box::new(MavdGenerator::new(parse_config::<MavdConfig>(config)?)?),
            _ => return Err(GeneratorError::NotFound(key.to_string())),
        };
        generator.set_verbose(verbose);
        Ok(generator)
    }

    /// Create a generator with its default configuration.
    pub fn create_default(
        &self,
        key: &str,
        verbose: bool,
    ) -> Result<Box<dyn SignalGenerator>, GeneratorError> {
        let info = self
            .get(key)
            .ok_or_else(|| GeneratorError::NotFound(key.to_string()))?;
        self.create(key, info.default_config.clone(), verbose)
    }
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn config_value<C: Serialize>(config: &C) -> serde_json::Value {
    // Window configs are plain integer structs
    serde_json::to_value(config).unwrap_or(serde_json::Value::Null)
}

fn parse_config<C: WindowConfig + for<'de> Deserialize<'de>>(
    value: serde_json::Value,
) -> Result<C, GeneratorError> {
    let value = if value.is_null() {
        serde_json::Value::Object(Default::default())
    } else {
        value
    };
    serde_json::from_value(value).map_err(|e| GeneratorError::InvalidConfig(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_list() {
        let registry = GeneratorRegistry::new();
        let keys: Vec<&str> = registry.list().iter().map(|g| g.key.as_str()).collect();

        assert_eq!(keys, ["hmac", "mavd"]);
    }

    #[test]
    fn test_registry_get() {
        let registry = GeneratorRegistry::new();

        assert!(registry.get("HMAC").is_some());
        assert!(registry.exists("mavd"));
        assert!(registry.get("macd").is_none());
    }

    #[test]
    fn test_create_default() {
        let registry = GeneratorRegistry::new();

        let generator = registry.create_default("hmac", true).unwrap();
        assert_eq!(generator.name(), "HMAC");
        assert!(generator.is_verbose());
        assert_eq!(generator.parameters()["slow"], 40);
    }

    #[test]
    fn test_create_with_config() {
        let registry = GeneratorRegistry::new();

        let config = serde_json::json!({ "fast": 5, "signal": 9 });
        let generator = registry.create("mavd", config, false).unwrap();

        let params = generator.parameters();
        assert_eq!(params["fast"], 5);
        assert_eq!(params["slow"], 14);
        assert_eq!(params["signal"], 9);
    }

    #[test]
    fn test_create_invalid() {
        let registry = GeneratorRegistry::new();

        let config = serde_json::json!({ "fast": 1 });
        assert!(matches!(
            registry.create("hmac", config, false),
            Err(GeneratorError::InvalidParameter { .. })
        ));

        let config = serde_json::json!({ "fast": "twenty" });
        assert!(matches!(
            registry.create("hmac", config, false),
            Err(GeneratorError::InvalidConfig(_))
        ));

        assert!(matches!(
            registry.create("unknown", serde_json::Value::Null, false),
            Err(GeneratorError::NotFound(_))
        ));
    }
}
