//! Configuration management.
//!
//! Settings come from an optional TOML file overlaid by `QUOTES__*`
//! environment variables, e.g. `QUOTES__PROVIDER__TIMEOUT_SECS=60`.

mod settings;

pub use settings::{AppConfig, AppSettings, GeneratorSettings, LoggingConfig};

use config::{Config, ConfigError, Environment, File, FileFormat, FileSourceFile};
use std::fs;
use std::path::Path;
use thiserror::Error;

use quote_core::error::GeneratorError;

/// Configuration file used when none is given.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Cannot load configuration: {0}")]
    Load(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid generator settings: {0}")]
    Generator(#[from] GeneratorError),

    #[error("Cannot serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Load configuration from file and environment.
///
/// An explicit `path` must exist; without one, [`DEFAULT_CONFIG_PATH`] is
/// read if present.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, SettingsError> {
    let file = match path {
        Some(path) => File::from(path).required(true),
        None => File::with_name(DEFAULT_CONFIG_PATH).required(false),
    };

    load_from(file, environment())
}

fn environment() -> Environment {
    Environment::with_prefix("QUOTES")
        .separator("__")
        .try_parsing(true)
}

fn load_from(
    file: File<FileSourceFile, FileFormat>,
    env: Environment,
) -> Result<AppConfig, SettingsError> {
    let config = Config::builder().add_source(file).add_source(env).build()?;

    let app: AppConfig = config.try_deserialize()?;
    validate(&app)?;
    Ok(app)
}

/// Check values that deserialization cannot.
pub fn validate(config: &AppConfig) -> Result<(), SettingsError> {
    if config.provider.max_open_attempts == 0 {
        return Err(SettingsError::Invalid(
            "provider.max_open_attempts must be at least 1".into(),
        ));
    }
    if config.provider.retry.max_attempts == 0 {
        return Err(SettingsError::Invalid(
            "provider.retry.max_attempts must be at least 1".into(),
        ));
    }
    if !matches!(config.logging.format.to_lowercase().as_str(), "pretty" | "json") {
        return Err(SettingsError::Invalid(format!(
            "logging.format must be pretty or json, got {}",
            config.logging.format
        )));
    }
    config.generators.validate()?;
    Ok(())
}

/// Write the default configuration as TOML.
pub fn write_default_config(path: &Path) -> Result<(), SettingsError> {
    let text = toml::to_string_pretty(&AppConfig::default())?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote_signals::GeneratorConfig;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write(dir: &TempDir, text: &str) -> PathBuf {
        let path = dir.path().join("quotes.toml");
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_load_file() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            r#"
[app]
name = "quotes-test"
environment = "test"

[logging]
level = "debug"
format = "json"

[provider]
cache_dir = "/var/cache/quotes"
max_open_attempts = 3

[provider.retry]
max_attempts = 2

[generators]
default = "mavd"

[generators.mavd]
fast = 5
"#,
        );

        let config = load_config(Some(path.as_path())).unwrap();
        assert_eq!(config.app.name, "quotes-test");
        assert!(config.logging.is_json());
        assert_eq!(config.provider.cache_dir, PathBuf::from("/var/cache/quotes"));
        assert_eq!(config.provider.max_open_attempts, 3);
        assert_eq!(config.provider.retry.max_attempts, 2);
        assert_eq!(config.provider.retry.initial_backoff_ms, 500);

        match config.generators.default_config().unwrap() {
            GeneratorConfig::Mavd(mavd) => {
                assert_eq!(mavd.fast, 5);
                assert_eq!(mavd.slow, 14);
            }
            other => panic!("unexpected generator {:?}", other),
        }
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = TempDir::new().unwrap();
        let result = load_config(Some(dir.path().join("none.toml").as_path()));
        assert!(matches!(result, Err(SettingsError::Load(_))));
    }

    #[test]
    fn test_environment_override() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "[provider]\ntimeout_secs = 10\n");
        let vars = HashMap::from([
            ("QUOTES__PROVIDER__TIMEOUT_SECS".to_string(), "45".to_string()),
            ("QUOTES__GENERATORS__VERBOSE".to_string(), "true".to_string()),
        ]);

        let env = environment().source(Some(vars));
        let config = load_from(File::from(path.as_path()), env).unwrap();
        assert_eq!(config.provider.timeout_secs, 45);
        assert!(config.generators.verbose);
    }

    #[test]
    fn test_invalid_windows() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "[generators.hmac]\nsmoothing = 1\n");

        let result = load_config(Some(path.as_path()));
        assert!(matches!(
            result,
            Err(SettingsError::Generator(GeneratorError::InvalidParameter { .. }))
        ));
    }

    #[test]
    fn test_unknown_default_generator() {
        let mut config = AppConfig::default();
        config.generators.default = "rsi".into();

        assert!(matches!(
            validate(&config),
            Err(SettingsError::Generator(GeneratorError::NotFound(_)))
        ));
    }

    #[test]
    fn test_invalid_log_format() {
        let mut config = AppConfig::default();
        config.logging.format = "xml".into();
        assert!(matches!(validate(&config), Err(SettingsError::Invalid(_))));
    }

    #[test]
    fn test_default_config_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config").join("default.toml");

        write_default_config(&path).unwrap();
        let config = load_config(Some(path.as_path())).unwrap();
        assert_eq!(config, AppConfig::default());
    }
}
