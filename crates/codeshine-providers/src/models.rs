//! Request and response models for inference

use serde::{Deserialize, Serialize};

/// Sampling options for one generation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Maximum tokens to generate
    pub max_tokens: usize,
    /// Sampling temperature
    pub temperature: f32,
    /// Nucleus sampling cutoff
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub top_p: Option<f32>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: 2048,
            temperature: 0.2,
            top_p: Some(0.9),
        }
    }
}

/// Why a generation stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// The model finished on its own
    Stop,
    /// The token limit was reached
    Length,
    /// The caller cancelled the generation
    Cancelled,
}

/// Completion signal of a generation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSummary {
    /// Full generated text
    pub text: String,
    /// Number of generated tokens, or fragments when the backend does not count
    pub token_count: usize,
    /// Why generation stopped
    pub finish_reason: FinishReason,
}
