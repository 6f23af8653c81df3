//! Data models for optimization results

use codeshine_analysis::{DetectedPattern, OptimizationSuggestion, Severity, StaticAnalysis};
use serde::{Deserialize, Serialize};

/// Explanation used when the model returned the input unchanged
pub const NO_CHANGE_EXPLANATION: &str =
    "No meaningful change found; the original code is already in good shape for this focus.";

/// Externally visible outcome of an optimization request
///
/// Invariant: when `parsed` is false, `optimized_code` is the original code
/// byte-for-byte and `no_change` is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Algorithm recognized in the input
    pub algorithm_before: String,
    /// Algorithm after optimization
    pub algorithm_after: String,
    /// Complexity of the input
    pub complexity_before: String,
    /// Complexity expected after optimization
    pub complexity_after: String,
    /// Most severe finding
    pub bottleneck: String,
    /// Headline optimization strategy
    pub strategy: String,
    /// Costs of the strategy
    pub tradeoffs: String,
    /// Confidence in the rewrite, 0..=100
    pub confidence: u8,
    /// Human-readable summary
    pub explanation: String,
    /// Rewritten code, or the original on fallback
    pub optimized_code: String,
    /// Patterns echoed from analysis
    pub detected_patterns: Vec<DetectedPattern>,
    /// Suggestions echoed from analysis
    pub suggestions: Vec<OptimizationSuggestion>,
    /// Line similarity between input and output, 0..=100
    pub similarity: u8,
    /// Extraction and validation succeeded
    #[serde(rename = "_parsed")]
    pub parsed: bool,
    /// Output is identical to the input, genuine or fallback
    #[serde(rename = "_no_change")]
    pub no_change: bool,
    /// Reason for a fallback or repair
    #[serde(rename = "_parse_warning", skip_serializing_if = "Option::is_none", default)]
    pub parse_warning: Option<String>,
}

impl OptimizationResult {
    /// Result that returns the original code untouched
    pub fn fallback(
        original: &str,
        analysis: &StaticAnalysis,
        warning: impl Into<String>,
    ) -> Self {
        let warning = warning.into();
        Self {
            algorithm_before: analysis.algorithm_label().to_string(),
            algorithm_after: analysis.algorithm_label().to_string(),
            complexity_before: analysis.estimated_complexity.clone(),
            complexity_after: analysis.estimated_complexity.clone(),
            bottleneck: bottleneck(analysis),
            strategy: "Keep the existing code".to_string(),
            tradeoffs: "None".to_string(),
            confidence: 0,
            explanation: format!("The original code was kept. {}", warning),
            optimized_code: original.to_string(),
            detected_patterns: analysis.detected_patterns.clone(),
            suggestions: analysis.possible_optimizations.clone(),
            similarity: 100,
            parsed: false,
            no_change: true,
            parse_warning: Some(warning),
        }
    }

    /// Whether this result came from a fallback
    pub fn is_fallback(&self) -> bool {
        !self.parsed
    }

    /// Whether the code differs from the input
    pub fn has_changes(&self) -> bool {
        !self.no_change
    }
}

/// Description of the most severe detected pattern
pub fn bottleneck(analysis: &StaticAnalysis) -> String {
    analysis
        .detected_patterns
        .iter()
        .max_by_key(|p| p.severity)
        .map(|p| p.description.clone())
        .unwrap_or_else(|| "No significant bottleneck detected".to_string())
}

/// Headline strategy from the first suggestion
pub fn strategy(analysis: &StaticAnalysis) -> String {
    analysis
        .possible_optimizations
        .first()
        .map(|s| s.action.clone())
        .unwrap_or_else(|| "Tidy the code without changing behavior".to_string())
}

/// Typical costs of the headline strategy
pub fn tradeoffs(analysis: &StaticAnalysis) -> String {
    let uses_hashing = analysis
        .possible_optimizations
        .iter()
        .any(|s| s.action.to_ascii_lowercase().contains("hash"));
    let memoizes = analysis
        .possible_optimizations
        .iter()
        .any(|s| s.action.to_ascii_lowercase().contains("memoiz"));

    if uses_hashing || memoizes {
        "Uses extra memory for lookup structures in exchange for speed".to_string()
    } else if analysis
        .detected_patterns
        .iter()
        .any(|p| p.severity == Severity::High)
    {
        "Restructured control flow may read differently from the original".to_string()
    } else {
        "None significant".to_string()
    }
}
