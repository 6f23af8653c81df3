#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # Codeshine Analysis
//!
//! Deterministic static analysis of code snippets. Extracts structural facts
//! and anti-pattern evidence without running any model; the results seed
//! prompts and enrich validation of model output.
//!
//! ## Features
//!
//! - **Structural metrics**: line, function, and loop counts, block and loop nesting depth
//! - **Algorithm recognition**: priority-ordered signature table, first match wins
//! - **Recursion heuristics**: self-invocation counts and divide-and-conquer vocabulary
//! - **Anti-pattern detectors**: seven independent detectors with fixed severities
//! - **Chunking**: boundary-aware splitting of large inputs

#[allow(missing_docs)]
pub mod algorithms;
pub mod analyzer;
#[allow(missing_docs)]
pub mod chunker;
#[allow(missing_docs)]
pub mod detectors;
#[allow(missing_docs)]
pub mod language;
pub mod models;
#[allow(missing_docs)]
pub mod structure;
#[allow(missing_docs)]
pub mod suggestions;

pub use algorithms::{downgrade, is_quadratic_or_worse};
pub use analyzer::{AnalyzerConfig, StaticAnalyzer, MAX_ANALYZED_CHARS};
pub use chunker::{Chunker, CodeChunk};
pub use language::{detect_language, Language};
pub use models::*;

/// Analyzes `code` with the default configuration
pub fn analyze(code: &str, requested_language: &str) -> StaticAnalysis {
    StaticAnalyzer::new().analyze(code, requested_language)
}
