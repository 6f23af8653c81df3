//! Property-based tests for output validation
//!
//! Properties:
//! - Fallback safety: an unparsed result always carries the original code byte-for-byte
//! - No loss: a parsed result keeps every non-trivial function, class, and import
//! - Similarity monotonicity: identical code scores 100 and reports no change

use codeshine_analysis::{Language, StaticAnalyzer};
use codeshine_generation::{
    extract_elements, preservation::is_trivial, similarity, OutputValidator,
};
use proptest::prelude::*;

const ORIGINAL: &str = r#"import { fetchUser } from "./api";

function loadNames(ids) {
  const names = [];
  for (const id of ids) {
    if (!names.includes(id)) {
      names.push(fetchUser(id).name);
    }
  }
  return names;
}

class Cache {
  lookup(key) {
    return this.store[key];
  }
}
"#;

/// Strategy for generating plausible and implausible model outputs
fn raw_output_strategy() -> impl Strategy<Value = String> {
    let fragment = prop_oneof![
        Just("```javascript\n".to_string()),
        Just("```\n".to_string()),
        Just("Here is the optimized code:\n".to_string()),
        Just(ORIGINAL.to_string()),
        Just("function loadNames(ids) {\n  return [...new Set(ids)].map((id) => fetchUser(id).name);\n}\n".to_string()),
        Just("class Cache {\n".to_string()),
        Just("const f = (a) =>".to_string()),
        Just("...\n".to_string()),
        Just("This makes it faster.\n".to_string()),
        "[ -~\n]{0,60}",
    ];
    prop::collection::vec(fragment, 0..6).prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn prop_fallback_returns_original(raw in raw_output_strategy()) {
        let analysis = StaticAnalyzer::new().analyze(ORIGINAL, "javascript");
        let result = OutputValidator::new().normalize(&raw, ORIGINAL, &analysis, Language::JavaScript);

        if !result.parsed {
            prop_assert_eq!(&result.optimized_code, ORIGINAL);
            prop_assert!(result.no_change);
            prop_assert!(result.parse_warning.is_some());
        }
        prop_assert!(result.confidence <= 100);
    }

    #[test]
    fn prop_parsed_results_keep_elements(raw in raw_output_strategy()) {
        let analysis = StaticAnalyzer::new().analyze(ORIGINAL, "javascript");
        let result = OutputValidator::new().normalize(&raw, ORIGINAL, &analysis, Language::JavaScript);

        if result.parsed {
            let before = extract_elements(ORIGINAL, Language::JavaScript);
            let after = extract_elements(&result.optimized_code, Language::JavaScript);
            for name in before.functions.iter().chain(&before.classes).chain(&before.imports) {
                if is_trivial(name) {
                    continue;
                }
                prop_assert!(
                    after.functions.contains(name)
                        || after.classes.contains(name)
                        || after.imports.contains(name)
                        || after.variables.contains(name),
                    "lost {}", name
                );
            }
        }
    }

    #[test]
    fn prop_identical_code_is_unchanged(body in "[a-z]{1,8}( = [0-9]{1,3};)?") {
        let original = format!("function keep() {{\n  {}\n}}\n", body);
        prop_assert_eq!(similarity(&original, &original), 100);

        let analysis = StaticAnalyzer::new().analyze(&original, "javascript");
        let raw = format!("```javascript\n{}```", original);
        let result = OutputValidator::new().normalize(&raw, &original, &analysis, Language::JavaScript);
        prop_assert!(result.parsed);
        prop_assert!(result.no_change);
        prop_assert_eq!(result.similarity, 100);
        prop_assert_eq!(result.optimized_code, original);
    }
}
