//! Configuration manager implementation

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use tracing::debug;

use crate::{
    error::{ConfigError, Result},
    types::{AppConfig, ConfigManager as ConfigManagerTrait},
};

const ENV_PREFIX: &str = "CODESHINE";
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Configuration manager
pub struct ConfigManager {
    /// Configuration file path
    config_path: PathBuf,
    /// Environment prefix
    env_prefix: String,
}

impl ConfigManager {
    /// Create a new configuration manager
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    /// Create with custom config path
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            config_path: path,
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    /// Use a different environment prefix
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Path of the TOML file layered over the defaults
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Get default config path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("codeshine")
            .join("config.toml")
    }

    /// Loads and validates in one step
    pub fn load_validated(&self) -> Result<AppConfig> {
        let config = self.load_config()?;
        self.validate_config(&config)?;
        Ok(config)
    }
}

impl ConfigManagerTrait for ConfigManager {
    fn load_config(&self) -> Result<AppConfig> {
        debug!(path = %self.config_path.display(), "Loading configuration");

        let builder = Config::builder()
            .add_source(
                File::from(self.config_path.clone())
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix(&self.env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        let app_config: AppConfig = config.try_deserialize()?;
        Ok(app_config)
    }

    fn save_config(&self, config: &AppConfig) -> Result<()> {
        let toml = toml::to_string_pretty(config)?;
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.config_path, toml)?;
        debug!(path = %self.config_path.display(), "Saved configuration");
        Ok(())
    }

    fn validate_config(&self, config: &AppConfig) -> Result<()> {
        let inference = &config.inference;
        if inference.base_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "inference.base_url must not be empty".to_string(),
            ));
        }
        if inference.model.trim().is_empty() {
            return Err(ConfigError::Validation(
                "inference.model must not be empty".to_string(),
            ));
        }
        if inference.max_tokens == 0 {
            return Err(ConfigError::Validation(
                "inference.max_tokens must be greater than 0".to_string(),
            ));
        }
        if inference.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "inference.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&inference.temperature) {
            return Err(ConfigError::Validation(format!(
                "inference.temperature must be within [0, 2], got {}",
                inference.temperature
            )));
        }
        if let Some(top_p) = inference.top_p {
            if top_p <= 0.0 || top_p > 1.0 {
                return Err(ConfigError::Validation(format!(
                    "inference.top_p must be within (0, 1], got {}",
                    top_p
                )));
            }
        }
        if config.pipeline.chunk_threshold_chars == 0 {
            return Err(ConfigError::Validation(
                "pipeline.chunk_threshold_chars must be greater than 0".to_string(),
            ));
        }
        if !LOG_LEVELS.contains(&config.logging.level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::Validation(format!(
                "logging.level must be one of {}, got '{}'",
                LOG_LEVELS.join(", "),
                config.logging.level
            )));
        }
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
