#![warn(missing_docs)]

//! Prompt construction and model output validation for codeshine
//!
//! The [`PromptBuilder`] turns code plus its static analysis into few-shot
//! prompts, with retry escalation levels that trade context for compliance.
//! The [`OutputValidator`] turns raw, possibly truncated model text into a
//! trustworthy [`OptimizationResult`] or a safe fallback that returns the
//! original code unchanged.

pub mod error;
#[allow(missing_docs)]
pub mod extraction;
#[allow(missing_docs)]
pub mod few_shot;
pub mod models;
#[allow(missing_docs)]
pub mod preservation;
#[allow(missing_docs)]
pub mod prompt_builder;
pub mod repair;
pub mod similarity;
#[allow(missing_docs)]
pub mod validator;

// Re-export public API
pub use error::Rejection;
pub use extraction::{extract_code, ExtractionMethod, Extracted};
pub use models::OptimizationResult;
pub use preservation::{extract_elements, CodeElements, ElementKind};
pub use prompt_builder::{EscalationLevel, Focus, PromptBuilder, PromptOptions};
pub use repair::{looks_truncated, repair_truncation, RepairOutcome};
pub use similarity::similarity;
pub use validator::{OutputValidator, ValidatorConfig};
