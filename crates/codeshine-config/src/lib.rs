//! Codeshine configuration
//!
//! Configuration is layered: built-in defaults, then a TOML file, then
//! `CODESHINE_`-prefixed environment variables using `__` between keys.

pub mod error;
pub mod manager;
pub mod types;

pub use error::{ConfigError, Result};
pub use manager::ConfigManager;
pub use types::{
    AppConfig, ConfigManager as ConfigManagerTrait, InferenceConfig, LoggingConfig,
    PipelineConfig,
};
