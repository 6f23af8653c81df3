//! Pipeline error types

use codeshine_providers::ProviderError;
use thiserror::Error;

/// Pipeline result type
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Terminal failures of an optimization run
///
/// Content-quality problems never show up here; the validator turns them into
/// fallback results.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    #[error("Another optimization is already running")]
    Busy,

    #[error("Inference timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Optimization cancelled")]
    Cancelled,

    #[error("Model returned no output after {attempts} attempts")]
    EmptyOutput { attempts: usize },

    #[error("Inference failed: {0}")]
    Provider(ProviderError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// Whether the run hit the per-call inference timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, PipelineError::Timeout { .. })
    }

    /// Cause string for the terminal `error` event
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::Timeout { seconds } => format!(
                "Inference timed out after {}s. Try a smaller selection or enable fast mode.",
                seconds
            ),
            PipelineError::Provider(ProviderError::NetworkError(_)) => format!(
                "{}. Is the inference server running?",
                self
            ),
            other => other.to_string(),
        }
    }
}

impl From<ProviderError> for PipelineError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Cancelled => PipelineError::Cancelled,
            other => PipelineError::Provider(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_cancel_maps_to_cancelled() {
        assert_eq!(PipelineError::from(ProviderError::Cancelled), PipelineError::Cancelled);
        assert!(matches!(
            PipelineError::from(ProviderError::ParseError("x".into())),
            PipelineError::Provider(_)
        ));
    }

    #[test]
    fn test_timeout_is_distinguishable() {
        let err = PipelineError::Timeout { seconds: 120 };
        assert!(err.is_timeout());
        assert!(err.user_message().contains("smaller selection"));
        assert!(!PipelineError::Cancelled.is_timeout());
        assert_eq!(PipelineError::Cancelled.user_message(), "Optimization cancelled");
    }
}
