//! Optimization pipeline for codeshine
//!
//! The [`PipelineOrchestrator`] drives a request through static analysis,
//! optional chunking, prompt construction, streamed inference, and output
//! validation, reporting progress as [`PipelineEvent`]s. Every run ends in
//! exactly one `done` or `error` event.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use codeshine_pipeline::{OptimizationRequest, PipelineOrchestrator, PipelineSettings};
//! use codeshine_providers::ScriptedProvider;
//!
//! # tokio_test::block_on(async {
//! let provider = Arc::new(ScriptedProvider::echo());
//! let orchestrator = Arc::new(PipelineOrchestrator::new(provider, PipelineSettings::default()));
//!
//! let run = orchestrator
//!     .start(OptimizationRequest::new("total = sum(values)\n").with_language("python"))
//!     .unwrap();
//! let result = run.wait().await.unwrap();
//! assert!(result.no_change);
//! # });
//! ```

pub mod assembly;
pub mod error;
pub mod events;
pub mod orchestrator;
pub mod request;
pub mod settings;

pub use error::{PipelineError, Result};
pub use events::{EventSink, PipelineEvent, RunMetrics, Stage};
pub use orchestrator::{PipelineOrchestrator, PipelineRun};
pub use request::OptimizationRequest;
pub use settings::PipelineSettings;
