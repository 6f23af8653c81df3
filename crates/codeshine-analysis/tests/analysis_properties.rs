//! Property-based tests for static analysis
//!
//! Properties:
//! - Analysis is a pure function of its input
//! - Joining the chunks reproduces the input exactly
//! - Confidence always lies in [0, 1]
//! - Suggestions never exceed the cap

use codeshine_analysis::{suggestions::MAX_SUGGESTIONS, Chunker, StaticAnalyzer};
use proptest::prelude::*;

/// Strategy for generating code-like lines
fn code_line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("function f(a) {".to_string()),
        Just("def g(xs):".to_string()),
        Just("    for x in xs:".to_string()),
        Just("  for (let i = 0; i < n; i++) {".to_string()),
        Just("    if (seen.includes(v)) continue;".to_string()),
        Just("  s += ', ';".to_string()),
        Just("  return total;".to_string()),
        Just("}".to_string()),
        Just(String::new()),
        "[a-z ]{0,40}".prop_map(|s| s),
    ]
}

/// Strategy for generating multi-line snippets
fn snippet_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(code_line_strategy(), 0..120).prop_map(|lines| lines.join("\n"))
}

proptest! {
    #[test]
    fn prop_analysis_is_deterministic(code in snippet_strategy()) {
        let analyzer = StaticAnalyzer::new();
        prop_assert_eq!(analyzer.analyze(&code, "auto"), analyzer.analyze(&code, "auto"));
    }

    #[test]
    fn prop_chunks_reconstruct_input(code in snippet_strategy(), threshold in 40usize..600) {
        let chunks = Chunker::new(threshold, 3).split(&code);
        prop_assert!(!chunks.is_empty());
        prop_assert_eq!(chunks.concat(), code);
    }

    #[test]
    fn prop_confidence_bounded(code in snippet_strategy()) {
        let analysis = StaticAnalyzer::new().analyze(&code, "javascript");
        prop_assert!((0.0..=1.0).contains(&analysis.confidence_score));
        prop_assert!(analysis.possible_optimizations.len() <= MAX_SUGGESTIONS);
    }

    #[test]
    fn prop_arbitrary_text_never_panics(code in "\\PC{0,400}") {
        let analysis = StaticAnalyzer::new().analyze(&code, "auto");
        prop_assert_eq!(analysis.chunks.concat(), code);
    }
}
