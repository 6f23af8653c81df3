//! Inference providers for codeshine
//!
//! Providers stream generated text through a [`GenerationHandle`]: fragments
//! arrive on a stream, a completion future resolves with the full text, and
//! the handle can be cancelled at any time.

pub mod error;
pub mod models;
pub mod provider;
pub mod providers;
pub mod streaming;

pub use error::ProviderError;
pub use models::{FinishReason, GenerationOptions, GenerationSummary};
pub use provider::{CompletionFuture, GenerationHandle, GenerationSink, InferenceProvider, TokenStream};
pub use providers::ollama::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
pub use providers::OllamaProvider;
pub use streaming::{ScriptedProvider, ScriptedResponse};
