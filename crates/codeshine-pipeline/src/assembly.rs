//! Reassembly of per-chunk results
//!
//! The combined result is built from a fresh analysis of the reassembled code.
//! It is not validated against the pre-chunk original, since chunk-level
//! validation already decided what to keep.

use codeshine_analysis::{StaticAnalysis, StaticAnalyzer};
use codeshine_generation::models::{bottleneck, strategy, tradeoffs, NO_CHANGE_EXPLANATION};
use codeshine_generation::{similarity, OptimizationResult};
use tracing::debug;

/// A chunk's original text and the validator's verdict on it
#[derive(Debug, Clone)]
pub struct ChunkOutcome {
    pub original: String,
    pub result: OptimizationResult,
}

impl ChunkOutcome {
    /// Text this chunk contributes to the reassembled code
    ///
    /// Unchanged chunks contribute their exact original text so an all-unchanged
    /// run reproduces the input byte for byte.
    pub fn piece(&self) -> String {
        if !self.result.has_changes() {
            return self.original.clone();
        }
        let mut piece = self
            .result
            .optimized_code
            .trim_end_matches(['\n', '\r'])
            .to_string();
        if self.original.ends_with('\n') {
            piece.push('\n');
        }
        piece
    }
}

/// Builds the combined result for a chunked run
pub fn assemble_chunks(
    original: &str,
    analysis: &StaticAnalysis,
    outcomes: &[ChunkOutcome],
    analyzer: &StaticAnalyzer,
) -> OptimizationResult {
    let total = outcomes.len();
    let joined: String = outcomes.iter().map(ChunkOutcome::piece).collect();
    let no_change = joined == original;

    let warnings: Vec<String> = outcomes
        .iter()
        .enumerate()
        .filter_map(|(i, outcome)| {
            outcome
                .result
                .parse_warning
                .as_ref()
                .map(|w| format!("chunk {}/{}: {}", i + 1, total, w))
        })
        .collect();
    let changed: Vec<&OptimizationResult> = outcomes
        .iter()
        .map(|o| &o.result)
        .filter(|r| r.has_changes())
        .collect();

    let after = analyzer.analyze(&joined, &analysis.language);
    debug!(
        chunks = total,
        changed = changed.len(),
        complexity_after = %after.estimated_complexity,
        "Reassembled chunked output"
    );

    let confidence = if changed.is_empty() {
        if outcomes.iter().all(|o| o.result.parsed) {
            100
        } else {
            0
        }
    } else {
        changed.iter().map(|r| r.confidence).min().unwrap_or(0)
    };

    let complexity_before = analysis.estimated_complexity.clone();
    let complexity_after = if no_change {
        complexity_before.clone()
    } else {
        after.estimated_complexity.clone()
    };

    let explanation = if no_change {
        NO_CHANGE_EXPLANATION.to_string()
    } else {
        format!(
            "Optimized {} of {} chunks. Estimated complexity {} before and {} after.",
            changed.len(),
            total,
            complexity_before,
            complexity_after
        )
    };

    OptimizationResult {
        algorithm_before: analysis.algorithm_label().to_string(),
        algorithm_after: if no_change {
            analysis.algorithm_label().to_string()
        } else {
            after.algorithm_label().to_string()
        },
        complexity_before,
        complexity_after,
        bottleneck: bottleneck(analysis),
        strategy: if no_change {
            "Keep the existing code".to_string()
        } else {
            strategy(analysis)
        },
        tradeoffs: if no_change {
            "None".to_string()
        } else {
            tradeoffs(analysis)
        },
        confidence,
        explanation,
        similarity: if no_change {
            100
        } else {
            similarity(original, &joined)
        },
        optimized_code: if no_change {
            original.to_string()
        } else {
            joined
        },
        detected_patterns: analysis.detected_patterns.clone(),
        suggestions: analysis.possible_optimizations.clone(),
        // Parsed once any chunk passed validation; all-fallback runs stay unparsed.
        parsed: outcomes.iter().any(|o| o.result.parsed),
        no_change,
        parse_warning: (!warnings.is_empty()).then(|| warnings.join("; ")),
    }
}
