//! Output validation
//!
//! `OutputValidator::normalize` turns raw model text into an
//! [`OptimizationResult`] through six ordered stages:
//!
//! 1. Extraction of the code from the surrounding text
//! 2. Truncation repair
//! 3. Size sanity against the original
//! 4. Element preservation
//! 5. Similarity
//! 6. Result assembly
//!
//! Any rejection short-circuits to a fallback result that returns the
//! original code unchanged.

use codeshine_analysis::{downgrade, Language, StaticAnalysis};
use tracing::{debug, warn};

use crate::{
    error::{Rejection, Result},
    extraction::extract_code,
    models::{bottleneck, strategy, tradeoffs, OptimizationResult, NO_CHANGE_EXPLANATION},
    preservation::{extract_elements, missing_elements},
    repair::{repair_truncation, RepairOutcome},
    similarity::similarity,
};

/// Originals with at most this many meaningful lines are "tiny"
pub const TINY_ORIGINAL_LINES: usize = 10;
/// Originals with at most this many meaningful lines are "medium"
pub const MEDIUM_ORIGINAL_LINES: usize = 40;
/// Share of meaningful lines a tiny original must keep, in percent
pub const TINY_MIN_RETAINED_PERCENT: u32 = 10;
/// Share of meaningful lines a medium original must keep, in percent
pub const MEDIUM_MIN_RETAINED_PERCENT: u32 = 30;
/// Share of meaningful lines a large original must keep, in percent
pub const LARGE_MIN_RETAINED_PERCENT: u32 = 40;
/// Minimum similarity for ordinary code
pub const SIMILARITY_THRESHOLD: u8 = 35;
/// Minimum similarity for sort, search, and graph algorithms
pub const RESTRUCTURING_SIMILARITY_THRESHOLD: u8 = 25;
/// Confidence ceiling for C and C++ inputs
pub const C_FAMILY_CONFIDENCE_CAP: u8 = 70;
/// Similarity below which confidence is capped
pub const LOW_SIMILARITY_MARK: u8 = 80;
/// Confidence ceiling for low-similarity rewrites
pub const LOW_SIMILARITY_CONFIDENCE_CAP: u8 = 60;
/// Confidence ceiling after truncation repair
pub const REPAIRED_CONFIDENCE_CAP: u8 = 50;

/// Validator thresholds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorConfig {
    pub tiny_original_lines: usize,
    pub medium_original_lines: usize,
    pub tiny_min_retained_percent: u32,
    pub medium_min_retained_percent: u32,
    pub large_min_retained_percent: u32,
    pub similarity_threshold: u8,
    pub restructuring_similarity_threshold: u8,
    pub c_family_confidence_cap: u8,
    pub low_similarity_mark: u8,
    pub low_similarity_confidence_cap: u8,
    pub repaired_confidence_cap: u8,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            tiny_original_lines: TINY_ORIGINAL_LINES,
            medium_original_lines: MEDIUM_ORIGINAL_LINES,
            tiny_min_retained_percent: TINY_MIN_RETAINED_PERCENT,
            medium_min_retained_percent: MEDIUM_MIN_RETAINED_PERCENT,
            large_min_retained_percent: LARGE_MIN_RETAINED_PERCENT,
            similarity_threshold: SIMILARITY_THRESHOLD,
            restructuring_similarity_threshold: RESTRUCTURING_SIMILARITY_THRESHOLD,
            c_family_confidence_cap: C_FAMILY_CONFIDENCE_CAP,
            low_similarity_mark: LOW_SIMILARITY_MARK,
            low_similarity_confidence_cap: LOW_SIMILARITY_CONFIDENCE_CAP,
            repaired_confidence_cap: REPAIRED_CONFIDENCE_CAP,
        }
    }
}

/// Counts lines that carry code: not blank, not a bare brace, not a comment
pub fn meaningful_line_count(code: &str, language: Language) -> usize {
    let comment = language.line_comment();
    code.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.chars().all(|c| matches!(c, '{' | '}' | '(' | ')' | '[' | ']' | ';' | ',')))
        .filter(|line| {
            !line.starts_with(comment)
                && !line.starts_with("/*")
                && !(line.starts_with('*') && !language.is_indentation_scoped())
        })
        .count()
}

/// Validates model output against the original code
#[derive(Debug, Clone, Default)]
pub struct OutputValidator {
    config: ValidatorConfig,
}

struct Candidate {
    code: String,
    repaired_with: Option<String>,
}

impl OutputValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validates raw model text; never fails, falls back instead
    pub fn normalize(
        &self,
        raw: &str,
        original: &str,
        analysis: &StaticAnalysis,
        language: Language,
    ) -> OptimizationResult {
        match self.validate(raw, original, analysis, language) {
            Ok(result) => result,
            Err(rejection) => {
                warn!(reason = %rejection, "Falling back to original code");
                OptimizationResult::fallback(original, analysis, rejection.to_string())
            }
        }
    }

    fn validate(
        &self,
        raw: &str,
        original: &str,
        analysis: &StaticAnalysis,
        language: Language,
    ) -> Result<OptimizationResult> {
        let candidate = self.extract_and_repair(raw, language)?;
        self.check_size(original, &candidate.code, language)?;
        self.check_elements(original, &candidate.code, language)?;

        let score = similarity(original, &candidate.code);
        let threshold = if analysis.algorithm_family().is_restructuring() {
            self.config.restructuring_similarity_threshold
        } else {
            self.config.similarity_threshold
        };
        debug!(similarity = score, threshold, "Similarity computed");
        if score < threshold {
            return Err(Rejection::LowSimilarity {
                similarity: score,
                threshold,
            });
        }

        Ok(self.assemble(original, candidate, score, analysis, language))
    }

    fn extract_and_repair(&self, raw: &str, language: Language) -> Result<Candidate> {
        let extracted = extract_code(raw).ok_or(Rejection::NoCode)?;
        debug!(method = ?extracted.method, "Code extracted");

        match repair_truncation(&extracted.code, language) {
            RepairOutcome::Intact => Ok(Candidate {
                code: extracted.code,
                repaired_with: None,
            }),
            RepairOutcome::Repaired { code, closers } => {
                debug!(closers = %closers, "Repaired truncated output");
                Ok(Candidate {
                    code,
                    repaired_with: Some(closers),
                })
            }
            RepairOutcome::Unrecoverable(reason) => {
                Err(Rejection::Unrepairable(reason.to_string()))
            }
        }
    }

    fn check_size(&self, original: &str, candidate: &str, language: Language) -> Result<()> {
        let original_lines = meaningful_line_count(original, language);
        let kept = meaningful_line_count(candidate, language);
        if original_lines == 0 {
            return Ok(());
        }

        let required_percent = if original_lines <= self.config.tiny_original_lines {
            self.config.tiny_min_retained_percent
        } else if original_lines <= self.config.medium_original_lines {
            self.config.medium_min_retained_percent
        } else {
            self.config.large_min_retained_percent
        };

        if (kept as u64) * 100 < (original_lines as u64) * u64::from(required_percent) {
            return Err(Rejection::TooShort {
                kept,
                original: original_lines,
                required_percent,
            });
        }
        Ok(())
    }

    fn check_elements(&self, original: &str, candidate: &str, language: Language) -> Result<()> {
        let before = extract_elements(original, language);
        let after = extract_elements(candidate, language);

        for (kind, names) in missing_elements(&before, &after) {
            if kind.is_fatal() {
                return Err(Rejection::MissingElements { kind, names });
            }
            debug!(kind = %kind, names = ?names, "Non-fatal names missing from output");
        }
        Ok(())
    }

    fn assemble(
        &self,
        original: &str,
        candidate: Candidate,
        score: u8,
        analysis: &StaticAnalysis,
        language: Language,
    ) -> OptimizationResult {
        let no_change = candidate.code.trim() == original.trim();
        let optimized_code = if no_change {
            original.to_string()
        } else {
            candidate.code
        };

        let mut confidence = if no_change {
            100
        } else {
            (analysis.confidence_score * 100.0).round().clamp(0.0, 100.0) as u8
        };
        if language.is_c_family() {
            confidence = confidence.min(self.config.c_family_confidence_cap);
        }
        if score < self.config.low_similarity_mark {
            confidence = confidence.min(self.config.low_similarity_confidence_cap);
        }
        if candidate.repaired_with.is_some() {
            confidence = confidence.min(self.config.repaired_confidence_cap);
        }

        let complexity_before = analysis.estimated_complexity.clone();
        let complexity_after = if no_change {
            complexity_before.clone()
        } else {
            downgrade(&complexity_before)
        };

        let parse_warning = candidate
            .repaired_with
            .as_ref()
            .map(|closers| format!("Model output was truncated; appended `{}` to close it", closers));

        let explanation = if no_change {
            NO_CHANGE_EXPLANATION.to_string()
        } else if complexity_after != complexity_before {
            format!(
                "{}. Expected complexity improves from {} to {}.",
                strategy(analysis).trim_end_matches('.'),
                complexity_before,
                complexity_after
            )
        } else {
            format!("{}.", strategy(analysis).trim_end_matches('.'))
        };

        OptimizationResult {
            algorithm_before: analysis.algorithm_label().to_string(),
            algorithm_after: analysis.algorithm_label().to_string(),
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
            optimized_code,
            detected_patterns: analysis.detected_patterns.clone(),
            suggestions: analysis.possible_optimizations.clone(),
            similarity: score,
            parsed: true,
            no_change,
            parse_warning,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeshine_analysis::StaticAnalyzer;

    const ORIGINAL: &str = "function hasDuplicate(items) {
  for (let i = 0; i < items.length; i++) {
    for (let j = i + 1; j < items.length; j++) {
      if (items[i] === items[j]) return true;
    }
  }
  return false;
}
";

    fn analysis(code: &str, language: &str) -> StaticAnalysis {
        StaticAnalyzer::new().analyze(code, language)
    }

    fn normalize(raw: &str, original: &str, language: Language) -> OptimizationResult {
        OutputValidator::new().normalize(raw, original, &analysis(original, language.name()), language)
    }

    #[test]
    fn test_unchanged_output() {
        let raw = format!("```javascript\n{}```", ORIGINAL);
        let result = normalize(&raw, ORIGINAL, Language::JavaScript);
        assert!(result.parsed);
        assert!(result.no_change);
        assert_eq!(result.confidence, 100);
        assert_eq!(result.similarity, 100);
        assert_eq!(result.optimized_code, ORIGINAL);
        assert_eq!(result.explanation, NO_CHANGE_EXPLANATION);
    }

    #[test]
    fn test_accepted_rewrite() {
        let raw = "```javascript
function hasDuplicate(items) {
  const seen = new Set();
  for (let i = 0; i < items.length; i++) {
    if (seen.has(items[i])) return true;
    seen.add(items[i]);
  }
  return false;
}
```";
        let result = normalize(raw, ORIGINAL, Language::JavaScript);
        assert!(result.parsed, "warning: {:?}", result.parse_warning);
        assert!(!result.no_change);
        assert!(result.optimized_code.contains("new Set()"));
        assert_eq!(result.complexity_before, "O(n²)");
        assert_eq!(result.complexity_after, "O(n)");
        assert!(result.confidence <= LOW_SIMILARITY_CONFIDENCE_CAP);
        assert!(result.parse_warning.is_none());
    }

    #[test]
    fn test_prose_only_falls_back() {
        let result = normalize("I cannot improve this code.", ORIGINAL, Language::JavaScript);
        assert!(!result.parsed);
        assert!(result.no_change);
        assert_eq!(result.optimized_code, ORIGINAL);
        assert!(result.parse_warning.is_some());
    }

    #[test]
    fn test_near_empty_output_falls_back() {
        let original = (0..20)
            .map(|i| format!("total += compute{}(input);", i))
            .collect::<Vec<_>>()
            .join("\n");
        let raw = "```js\ntotal += compute0(input);\n```";
        let result = normalize(raw, &original, Language::JavaScript);
        assert!(!result.parsed);
        assert!(result.parse_warning.unwrap().contains("too short"));
    }

    #[test]
    fn test_repaired_output_confidence_capped() {
        let original = "function f(xs) {\n  for (const x of xs) {\n    use(x);\n  }\n}\n";
        let raw = "```js\nfunction f(xs) {\n  for (const x of xs) {\n    use(x);\n  }\n";
        let result = normalize(raw, original, Language::JavaScript);
        assert!(result.parsed, "warning: {:?}", result.parse_warning);
        assert!(result.parse_warning.as_deref().unwrap_or("").contains("truncated"));
        assert!(result.confidence <= REPAIRED_CONFIDENCE_CAP);
    }

    #[test]
    fn test_c_confidence_capped() {
        let original = "int add(int a, int b) {\n    return a + b;\n}\n";
        let raw = format!("```c\n{}```", original);
        let result = normalize(&raw, original, Language::C);
        assert!(result.no_change);
        assert_eq!(result.confidence, C_FAMILY_CONFIDENCE_CAP);
    }

    #[test]
    fn test_meaningful_lines() {
        let code = "def f():\n    # note\n\n    return 1\n";
        assert_eq!(meaningful_line_count(code, Language::Python), 2);
        let code = "if (a) {\n  // c\n  b();\n}\n";
        assert_eq!(meaningful_line_count(code, Language::JavaScript), 2);
    }
}
