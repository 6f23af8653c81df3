//! Static analyzer entry point

use tracing::debug;

use crate::{
    algorithms::{detect_algorithm, detect_recursion, estimate_complexity},
    chunker::{Chunker, CodeChunk, DEFAULT_CHUNK_THRESHOLD, DEFAULT_OVERLAP_LINES},
    detectors::detect_all,
    language::Language,
    models::StaticAnalysis,
    structure::measure,
    suggestions::{confidence_score, is_optimizable, synthesize},
};

/// Inputs longer than this are analyzed on a prefix
pub const MAX_ANALYZED_CHARS: usize = 200_000;

/// Analyzer configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerConfig {
    /// Chunk size threshold in characters
    pub chunk_threshold: usize,
    /// Context lines carried between chunks
    pub overlap_lines: usize,
    /// Analysis prefix limit in characters
    pub max_analyzed_chars: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            chunk_threshold: DEFAULT_CHUNK_THRESHOLD,
            overlap_lines: DEFAULT_OVERLAP_LINES,
            max_analyzed_chars: MAX_ANALYZED_CHARS,
        }
    }
}

/// Deterministic analyzer; holds configuration only
#[derive(Debug, Clone, Default)]
pub struct StaticAnalyzer {
    config: AnalyzerConfig,
}

impl StaticAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn chunker(&self) -> Chunker {
        Chunker::new(self.config.chunk_threshold, self.config.overlap_lines)
    }

    /// Analyzes a snippet. Pure: identical input yields identical output.
    ///
    /// `requested_language` may be a name, an alias, or anything else (such as
    /// `auto`), in which case the language is detected from content.
    pub fn analyze(&self, code: &str, requested_language: &str) -> StaticAnalysis {
        let language = Language::resolve(requested_language, code);
        let (analyzed, is_truncated) = self.analyzed_prefix(code);

        let metrics = measure(analyzed, language);
        let detected_algorithm = detect_algorithm(analyzed);
        let recursion = detect_recursion(analyzed);
        let estimated_complexity = estimate_complexity(
            detected_algorithm.as_ref(),
            recursion,
            metrics.loop_nesting_depth,
        );

        let detected_patterns = detect_all(analyzed, &metrics);
        let possible_optimizations = synthesize(&detected_patterns, &estimated_complexity);
        let confidence = confidence_score(
            &detected_patterns,
            &estimated_complexity,
            &possible_optimizations,
            metrics.line_count,
        );
        let optimizable = is_optimizable(confidence, &detected_patterns, &estimated_complexity);
        let chunks = self.chunker().split(code);

        debug!(
            language = %language,
            lines = metrics.line_count,
            patterns = detected_patterns.len(),
            complexity = %estimated_complexity,
            confidence,
            chunks = chunks.len(),
            "Static analysis complete"
        );

        StaticAnalysis {
            language: language.name().to_string(),
            line_count: metrics.line_count,
            function_count: metrics.function_count,
            loop_count: metrics.loop_count,
            nesting_depth: metrics.max_depth,
            loop_nesting_depth: metrics.loop_nesting_depth,
            detected_algorithm,
            recursion,
            estimated_complexity,
            detected_patterns,
            possible_optimizations,
            confidence_score: confidence,
            is_optimizable: optimizable,
            chunks,
            is_truncated,
        }
    }

    /// Splits code into chunks with overlap context
    pub fn split(&self, code: &str) -> Vec<CodeChunk> {
        self.chunker().split_with_overlap(code)
    }

    fn analyzed_prefix<'a>(&self, code: &'a str) -> (&'a str, bool) {
        if code.len() <= self.config.max_analyzed_chars {
            return (code, false);
        }
        let mut cut = self.config.max_analyzed_chars;
        while !code.is_char_boundary(cut) {
            cut -= 1;
        }
        let cut = code[..cut].rfind('\n').map(|i| i + 1).unwrap_or(cut);
        (&code[..cut], true)
    }
}
