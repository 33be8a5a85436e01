//! Configuration structures.

use serde::{Deserialize, Serialize};

use quote_core::error::GeneratorError;
use quote_core::traits::WindowConfig;
use quote_data::ProviderSettings;
use quote_signals::{GeneratorConfig, HmacConfig, MavdConfig};

/// Main application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub provider: ProviderSettings,
    #[serde(default)]
    pub generators: GeneratorSettings,
}

/// General app settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "quotes".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Whether log lines are written as JSON.
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

/// Signal generator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Generator used when none is named
    pub default: String,
    /// Attach diagnostic values to signals
    pub verbose: bool,
    pub hmac: HmacConfig,
    pub mavd: MavdConfig,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            default: "hmac".to_string(),
            verbose: false,
            hmac: HmacConfig::default(),
            mavd: MavdConfig::default(),
        }
    }
}

impl GeneratorSettings {
    /// Configured windows of the named generator.
    pub fn config_for(&self, key: &str) -> Result<GeneratorConfig, GeneratorError> {
        match key.to_lowercase().as_str() {
            "hmac" => Ok(GeneratorConfig::Hmac(self.hmac.clone())),
            "mavd" => Ok(GeneratorConfig::Mavd(self.mavd.clone())),
            _ => Err(GeneratorError::NotFound(key.to_string())),
        }
    }

    /// Configured windows of the default generator.
    pub fn default_config(&self) -> Result<GeneratorConfig, GeneratorError> {
        self.config_for(&self.default)
    }

    /// Check the default name and every window.
    pub fn validate(&self) -> Result<(), GeneratorError> {
        self.default_config()?;
        self.hmac.validate()?;
        self.mavd.validate()
    }
}
