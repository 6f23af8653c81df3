//! Suggestion synthesis and confidence scoring

use crate::{
    algorithms::{is_cubic_or_worse, is_quadratic_or_worse},
    models::{DetectedPattern, Impact, OptimizationSuggestion, PatternKind},
};

/// Upper bound on suggestions per analysis
pub const MAX_SUGGESTIONS: usize = 5;

/// Confidence bonus for quadratic complexity
pub const QUADRATIC_BONUS: f64 = 0.20;

/// Confidence bonus for cubic or exponential complexity
pub const CUBIC_BONUS: f64 = 0.25;

/// Confidence added per high-impact suggestion
pub const HIGH_IMPACT_STEP: f64 = 0.10;

/// Ceiling on the high-impact contribution
pub const HIGH_IMPACT_CAP: f64 = 0.30;

/// Inputs shorter than this many lines are scaled down
pub const SHORT_INPUT_LINES: usize = 10;

/// Scale for inputs under five lines
pub const TINY_INPUT_SCALE: f64 = 0.3;

/// Scale for inputs of five to nine lines
pub const SHORT_INPUT_SCALE: f64 = 0.6;

/// Confidence needed for the optimizable gate
pub const OPTIMIZABLE_CONFIDENCE: f64 = 0.5;

fn suggestion_for(kind: PatternKind) -> (&'static str, &'static str, Impact) {
    match kind {
        PatternKind::NestedLoops => (
            "Replace the inner loop with a hash-based index built once",
            "Each outer iteration rescans the inner collection",
            Impact::High,
        ),
        PatternKind::RepeatedComputation => (
            "Compute the repeated expression once and reuse the result",
            "Identical calls redo the same work",
            Impact::Medium,
        ),
        PatternKind::InefficientLookup => (
            "Use a hash set or map for membership tests",
            "Hash lookups are constant time instead of a linear scan",
            Impact::High,
        ),
        PatternKind::RedundantConditional => (
            "Simplify boolean expressions and drop literal comparisons",
            "Shorter conditions are easier to read and verify",
            Impact::Low,
        ),
        PatternKind::StringConcatInLoop => (
            "Collect the pieces and join them once after the loop",
            "Repeated concatenation copies the growing string every iteration",
            Impact::Medium,
        ),
        PatternKind::DeepNesting => (
            "Flatten control flow with guard clauses and early returns",
            "Shallow code has fewer paths to reason about",
            Impact::Medium,
        ),
        PatternKind::LargeFunction => (
            "Split the code into smaller focused functions",
            "Small units are easier to optimize and test in isolation",
            Impact::Low,
        ),
        PatternKind::UnnecessaryAllocation => (
            "Reuse buffers instead of allocating inside hot paths",
            "Allocation and copying dominate tight loops",
            Impact::Medium,
        ),
        PatternKind::MissingMemoization => (
            "Memoize results of recursive calls",
            "Overlapping subproblems are recomputed exponentially often",
            Impact::High,
        ),
        PatternKind::InefficientSort => (
            "Use the standard library sort",
            "Library sorts run in O(n log n)",
            Impact::High,
        ),
    }
}

fn hash_lookup_suggestion() -> OptimizationSuggestion {
    OptimizationSuggestion {
        action: "Use a hash map or set to avoid repeated scans".to_string(),
        rationale: "Quadratic work usually comes from searching a collection inside a loop"
            .to_string(),
        expected_impact: Impact::High,
    }
}

/// One suggestion per pattern kind, plus a hash lookup suggestion for
/// quadratic-or-worse code that has none yet
pub fn synthesize(patterns: &[DetectedPattern], complexity: &str) -> Vec<OptimizationSuggestion> {
    let mut seen = Vec::new();
    let mut suggestions = Vec::new();

    for pattern in patterns {
        if seen.contains(&pattern.kind) {
            continue;
        }
        seen.push(pattern.kind);
        let (action, rationale, expected_impact) = suggestion_for(pattern.kind);
        suggestions.push(OptimizationSuggestion {
            action: action.to_string(),
            rationale: rationale.to_string(),
            expected_impact,
        });
    }

    let has_hash = suggestions
        .iter()
        .any(|s| s.action.to_ascii_lowercase().contains("hash"));
    if is_quadratic_or_worse(complexity) && !has_hash {
        suggestions.push(hash_lookup_suggestion());
    }

    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}

/// Confidence that optimization is worthwhile, clamped to [0, 1] and rounded
/// to two decimals
pub fn confidence_score(
    patterns: &[DetectedPattern],
    complexity: &str,
    suggestions: &[OptimizationSuggestion],
    line_count: usize,
) -> f64 {
    let severity: f64 = patterns.iter().map(|p| p.severity.weight()).sum();

    let complexity_bonus = if is_cubic_or_worse(complexity) {
        CUBIC_BONUS
    } else if is_quadratic_or_worse(complexity) {
        QUADRATIC_BONUS
    } else {
        0.0
    };

    let high_impact = suggestions
        .iter()
        .filter(|s| s.expected_impact == Impact::High)
        .count() as f64;
    let impact_bonus = (high_impact * HIGH_IMPACT_STEP).min(HIGH_IMPACT_CAP);

    let mut score = severity + complexity_bonus + impact_bonus;
    if line_count < SHORT_INPUT_LINES {
        score *= if line_count < 5 {
            TINY_INPUT_SCALE
        } else {
            SHORT_INPUT_SCALE
        };
    }

    (score.clamp(0.0, 1.0) * 100.0).round() / 100.0
}

/// Informational gate: confident and with something to improve
pub fn is_optimizable(confidence: f64, patterns: &[DetectedPattern], complexity: &str) -> bool {
    confidence >= OPTIMIZABLE_CONFIDENCE
        && (!patterns.is_empty() || is_quadratic_or_worse(complexity))
}
