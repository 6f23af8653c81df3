//! Error types for output validation

use thiserror::Error;

use crate::preservation::ElementKind;

/// Reason a validation stage refused model output
///
/// Rejections never leave the validator as errors. The validator converts
/// them into fallback results and the `Display` text becomes the parse
/// warning shown to the host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Nothing resembling code was found
    #[error("No code could be extracted from the model output")]
    NoCode,

    /// Truncation heuristics fired but brackets were balanced
    #[error("Model output looks truncated ({0}) and could not be repaired")]
    Unrepairable(String),

    /// Output lost too many meaningful lines
    #[error("Model output too short: {kept} of {original} meaningful lines kept, at least {required_percent}% required")]
    TooShort {
        /// Meaningful lines in the output
        kept: usize,
        /// Meaningful lines in the original
        original: usize,
        /// Minimum retained share
        required_percent: u32,
    },

    /// Output dropped declarations present in the original
    #[error("Model output dropped {kind}: {}", .names.join(", "))]
    MissingElements {
        /// Kind of the first missing group
        kind: ElementKind,
        /// Missing names in source order
        names: Vec<String>,
    },

    /// Output diverged too far from the original
    #[error("Model output too different from the original: {similarity}% similar, {threshold}% required")]
    LowSimilarity {
        /// Measured similarity percentage
        similarity: u8,
        /// Threshold that applied
        threshold: u8,
    },
}

/// Result type for validation stages
pub type Result<T> = std::result::Result<T, Rejection>;
