//! Data models produced by static analysis

use std::fmt;

use serde::{Deserialize, Serialize};

/// Anti-pattern kinds the analyzer and the host understand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// A loop opened inside the scope of another loop
    NestedLoops,
    /// The same call expression evaluated over and over
    RepeatedComputation,
    /// Linear membership tests (`includes`, `indexOf`, `in list`) inside loops
    InefficientLookup,
    /// Boolean comparisons against literals and `x ? true : false` shapes
    RedundantConditional,
    /// String building with `+=` inside a loop
    StringConcatInLoop,
    /// Block nesting five or more levels deep
    DeepNesting,
    /// Oversized function or file
    LargeFunction,
    /// Allocation inside a hot path
    UnnecessaryAllocation,
    /// Recursive calls recomputing the same subproblem
    MissingMemoization,
    /// Hand-rolled quadratic sort
    InefficientSort,
}

impl PatternKind {
    /// Stable snake_case tag used in prompts and events
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::NestedLoops => "nested_loops",
            PatternKind::RepeatedComputation => "repeated_computation",
            PatternKind::InefficientLookup => "inefficient_lookup",
            PatternKind::RedundantConditional => "redundant_conditional",
            PatternKind::StringConcatInLoop => "string_concat_in_loop",
            PatternKind::DeepNesting => "deep_nesting",
            PatternKind::LargeFunction => "large_function",
            PatternKind::UnnecessaryAllocation => "unnecessary_allocation",
            PatternKind::MissingMemoization => "missing_memoization",
            PatternKind::InefficientSort => "inefficient_sort",
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a detected pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Cosmetic or readability issue
    Low,
    /// Noticeable cost on larger inputs
    Medium,
    /// Likely the dominant cost
    High,
}

impl Severity {
    /// Contribution of one finding of this severity to the confidence score
    pub fn weight(&self) -> f64 {
        match self {
            Severity::High => 0.25,
            Severity::Medium => 0.15,
            Severity::Low => 0.05,
        }
    }
}

/// Expected impact of applying a suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    /// Small improvement
    Low,
    /// Moderate improvement
    Medium,
    /// Large improvement
    High,
}

/// Anti-pattern evidence found in the code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedPattern {
    /// Pattern kind
    #[serde(rename = "type")]
    pub kind: PatternKind,
    /// Human-readable description
    pub description: String,
    /// Severity of the finding
    pub severity: Severity,
    /// 1-based line where the evidence was found
    #[serde(rename = "lineHint", skip_serializing_if = "Option::is_none", default)]
    pub line_hint: Option<usize>,
}

impl DetectedPattern {
    /// Creates a new finding without a line hint
    pub fn new(kind: PatternKind, severity: Severity, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
            severity,
            line_hint: None,
        }
    }

    /// Attaches a line hint
    pub fn at_line(mut self, line: Option<usize>) -> Self {
        self.line_hint = line;
        self
    }
}

/// Optimization suggestion derived from detected patterns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationSuggestion {
    /// What to change
    pub action: String,
    /// Why the change helps
    pub rationale: String,
    /// Expected impact
    #[serde(rename = "expectedImpact")]
    pub expected_impact: Impact,
}

/// Named algorithm recognized by the detection table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmMatch {
    /// Display label, e.g. "Bubble Sort"
    pub label: String,
    /// Typical complexity of the algorithm
    pub complexity: String,
    /// Family used by the validator to relax similarity requirements
    pub family: AlgorithmFamily,
}

/// Broad algorithm families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmFamily {
    /// Sorting algorithms
    Sort,
    /// Searching algorithms
    Search,
    /// Graph traversal and shortest paths
    Graph,
    /// Dynamic programming
    DynamicProgramming,
    /// Plain recursion
    Recursive,
    /// Anything else
    Other,
}

impl AlgorithmFamily {
    /// Families that an optimization is expected to restructure heavily
    pub fn is_restructuring(&self) -> bool {
        matches!(
            self,
            AlgorithmFamily::Sort | AlgorithmFamily::Search | AlgorithmFamily::Graph
        )
    }
}

/// Recursion evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecursionInfo {
    /// At least one function name occurs twice or more
    pub is_recursive: bool,
    /// Recursive with split-point vocabulary (mid, pivot, lo, hi, ...)
    pub divide_and_conquer: bool,
}

/// Result of static analysis
///
/// Built once per request (and once per chunk in multi-chunk mode); never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticAnalysis {
    /// Resolved language name
    pub language: String,
    /// Number of lines
    #[serde(rename = "lineCount")]
    pub line_count: usize,
    /// Number of function-like declarations
    #[serde(rename = "functionCount")]
    pub function_count: usize,
    /// Number of loop keywords
    #[serde(rename = "loopCount")]
    pub loop_count: usize,
    /// Deepest block nesting
    #[serde(rename = "nestingDepth")]
    pub nesting_depth: usize,
    /// Deepest loop-inside-loop nesting
    #[serde(rename = "loopNestingDepth")]
    pub loop_nesting_depth: usize,
    /// Named algorithm, if recognized
    pub detected_algorithm: Option<AlgorithmMatch>,
    /// Recursion evidence
    pub recursion: RecursionInfo,
    /// Estimated time complexity
    pub estimated_complexity: String,
    /// Anti-pattern evidence
    pub detected_patterns: Vec<DetectedPattern>,
    /// Suggestions derived from the patterns
    pub possible_optimizations: Vec<OptimizationSuggestion>,
    /// Confidence that optimization is worthwhile, 0..1
    pub confidence_score: f64,
    /// Informational gate for early exit policies
    pub is_optimizable: bool,
    /// Size-bounded code segments covering the whole input
    pub chunks: Vec<String>,
    /// Analysis only looked at a prefix of the input
    #[serde(rename = "isTruncated")]
    pub is_truncated: bool,
}

impl StaticAnalysis {
    /// Label of the detected algorithm, or "Unknown"
    pub fn algorithm_label(&self) -> &str {
        self.detected_algorithm
            .as_ref()
            .map(|a| a.label.as_str())
            .unwrap_or("Unknown")
    }

    /// Family of the detected algorithm
    pub fn algorithm_family(&self) -> AlgorithmFamily {
        self.detected_algorithm
            .as_ref()
            .map(|a| a.family)
            .unwrap_or(AlgorithmFamily::Other)
    }

    /// Whether any pattern was detected
    pub fn has_patterns(&self) -> bool {
        !self.detected_patterns.is_empty()
    }

    /// Whether the input was split into more than one chunk
    pub fn is_multi_chunk(&self) -> bool {
        self.chunks.len() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_kind_serializes_snake_case() {
        let json = serde_json::to_string(&PatternKind::NestedLoops).unwrap();
        assert_eq!(json, "\"nested_loops\"");
        assert_eq!(PatternKind::StringConcatInLoop.to_string(), "string_concat_in_loop");
    }

    #[test]
    fn test_detected_pattern_wire_shape() {
        let pattern = DetectedPattern::new(PatternKind::DeepNesting, Severity::Medium, "deep")
            .at_line(Some(4));
        let value = serde_json::to_value(&pattern).unwrap();
        assert_eq!(value["type"], "deep_nesting");
        assert_eq!(value["severity"], "medium");
        assert_eq!(value["lineHint"], 4);
    }

    #[test]
    fn test_restructuring_families() {
        assert!(AlgorithmFamily::Sort.is_restructuring());
        assert!(AlgorithmFamily::Graph.is_restructuring());
        assert!(!AlgorithmFamily::Recursive.is_restructuring());
    }
}
