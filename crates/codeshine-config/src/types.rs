//! Core configuration types and data structures

use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Inference backend settings
    pub inference: InferenceConfig,
    /// Pipeline tuning
    pub pipeline: PipelineConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

/// Inference backend configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InferenceConfig {
    /// Ollama endpoint
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Maximum tokens per call
    pub max_tokens: usize,
    /// Sampling temperature
    pub temperature: f32,
    /// Nucleus sampling cutoff
    pub top_p: Option<f32>,
    /// Timeout for one inference call, in seconds
    pub timeout_secs: u64,
}

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Inputs longer than this are split into chunks
    pub chunk_threshold_chars: usize,
    /// Lines of the previous chunk given as context
    pub overlap_lines: usize,
    /// Retries after a truncated response
    pub max_truncation_retries: usize,
    /// Interval at which streamed tokens are flushed to the host
    pub stream_flush_ms: u64,
    /// Yield to the runtime between chunks
    pub inter_chunk_yield: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Max level: trace, debug, info, warn, or error
    pub level: String,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "qwen2.5-coder:1.5b".to_string(),
            max_tokens: 2048,
            temperature: 0.2,
            top_p: Some(0.9),
            timeout_secs: 120,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_threshold_chars: 3000,
            overlap_lines: 3,
            max_truncation_retries: 2,
            stream_flush_ms: 50,
            inter_chunk_yield: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Configuration manager trait
pub trait ConfigManager {
    /// Load configuration
    fn load_config(&self) -> Result<AppConfig, crate::error::ConfigError>;
    /// Save configuration
    fn save_config(&self, config: &AppConfig) -> Result<(), crate::error::ConfigError>;
    /// Validate configuration
    fn validate_config(&self, config: &AppConfig) -> Result<(), crate::error::ConfigError>;
}
