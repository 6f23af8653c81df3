//! Error types for inference providers

use thiserror::Error;

/// Errors that can occur when talking to an inference provider
#[derive(Debug, Error, PartialEq, Clone)]
pub enum ProviderError {
    /// Model or endpoint not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Network error occurred
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Generic provider error
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// Response could not be parsed
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Generation was cancelled by the caller
    #[error("Generation cancelled")]
    Cancelled,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProviderError {
    /// Whether the error came from cancellation rather than a failure
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ProviderError::Cancelled)
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::ParseError(err.to_string())
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::NetworkError("Request timeout".to_string())
        } else if err.is_connect() {
            ProviderError::NetworkError(err.to_string())
        } else {
            ProviderError::ProviderError(err.to_string())
        }
    }
}
