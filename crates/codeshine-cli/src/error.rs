// CLI error type and user-facing messages

use codeshine_config::ConfigError;
use codeshine_pipeline::PipelineError;
use codeshine_providers::ProviderError;
use thiserror::Error;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Model server unavailable at {url}")]
    ServerUnavailable { url: String, model: String },

    #[error("Optimization failed: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            CliError::InvalidArgument { message } => {
                format!(
                    "Invalid argument: {}\n\nRun 'codeshine --help' for usage information.",
                    message
                )
            }
            CliError::Io(e) => format!("File operation failed: {}", e),
            CliError::Config(e) => {
                format!(
                    "Configuration error: {}\n\nRun 'codeshine config' to inspect the effective configuration.",
                    e
                )
            }
            CliError::Provider(e) => {
                format!(
                    "Provider error: {}\n\nCheck the [inference] section with 'codeshine config'.",
                    e
                )
            }
            CliError::ServerUnavailable { url, model } => {
                format!(
                    "Could not reach the model server at {}.\n\nStart it with 'ollama serve' and pull the model with 'ollama pull {}', or pass --dry-run.",
                    url, model
                )
            }
            CliError::Pipeline(e) => e.user_message(),
            CliError::Serialization(msg) => format!("Could not render output: {}", msg),
            CliError::Other(e) => format!("{:#}", e),
        }
    }

    /// Whether the run ended because the user interrupted it
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CliError::Pipeline(PipelineError::Cancelled))
    }

    /// Get technical details for verbose mode
    pub fn technical_details(&self) -> String {
        format!("{:?}", self)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for CliError {
    fn from(err: toml::ser::Error) -> Self {
        CliError::Serialization(err.to_string())
    }
}

pub type CliResult<T> = Result<T, CliError>;
