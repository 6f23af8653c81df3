//! Validator behavior on representative model outputs

use codeshine_analysis::{Language, StaticAnalyzer};
use codeshine_generation::{
    extract_code, repair_truncation, ExtractionMethod, OutputValidator, RepairOutcome,
};

#[test]
fn test_unterminated_fence_needs_no_repair() {
    let extracted = extract_code("```js\nconst x=1;\n").unwrap();
    assert_eq!(extracted.code, "const x=1;");
    assert_eq!(extracted.method, ExtractionMethod::UnterminatedFence);
    assert_eq!(
        repair_truncation(&extracted.code, Language::JavaScript),
        RepairOutcome::Intact
    );

    let original = "const x = 1;";
    let analysis = StaticAnalyzer::new().analyze(original, "javascript");
    let result = OutputValidator::new().normalize(
        "```js\nconst x=1;\n",
        original,
        &analysis,
        Language::JavaScript,
    );
    assert!(result.parse_warning.is_none() || result.is_fallback());
}

#[test]
fn test_unchanged_output_reports_no_change() {
    let original = "def total(xs):\n    s = 0\n    for x in xs:\n        s += x\n    return s\n";
    let analysis = StaticAnalyzer::new().analyze(original, "python");
    let raw = format!("Here is the code:\n```python\n{}```\n", original);

    let result = OutputValidator::new().normalize(&raw, original, &analysis, Language::Python);

    assert!(result.parsed);
    assert!(result.no_change);
    assert_eq!(result.confidence, 100);
    assert!(result.explanation.contains("No meaningful change"));
    assert_eq!(result.optimized_code, original);
}

#[test]
fn test_dropped_function_falls_back() {
    let original = r#"function calculateTotal(items) {
  let total = 0;
  for (const item of items) {
    total += item.price * item.qty;
  }
  return total;
}

function formatPrice(amount) {
  return "$" + amount.toFixed(2);
}
"#;
    let raw = r#"```javascript
function calculateTotal(items) {
  return items.reduce((sum, item) => sum + item.price * item.qty, 0);
}
```"#;
    let analysis = StaticAnalyzer::new().analyze(original, "javascript");

    let result = OutputValidator::new().normalize(raw, original, &analysis, Language::JavaScript);

    assert!(!result.parsed);
    assert!(result.no_change);
    assert_eq!(result.optimized_code, original);
    assert!(result.parse_warning.unwrap().contains("formatPrice"));
}

#[test]
fn test_restructured_sort_uses_lower_threshold() {
    let original = r#"function bubbleSort(arr) {
  const n = arr.length;
  for (let a = 0; a < n; a++) {
    for (let b = 0; b < n - a - 1; b++) {
      if (arr[b] > arr[b + 1]) {
        const swap = arr[b];
        arr[b] = arr[b + 1];
        arr[b + 1] = swap;
      }
    }
  }
  return arr;
}
"#;
    let raw = r#"```javascript
function bubbleSort(arr) {
  const n = arr.length;
  for (let a = 0; a < n; a++) {
    let swapped = false;
    for (let b = 0; b < n - a - 1; b++) {
      if (arr[b] > arr[b + 1]) {
        [arr[b], arr[b + 1]] = [arr[b + 1], arr[b]];
        swapped = true;
      }
    }
    if (!swapped) break;
  }
  return arr;
}
```"#;
    let analysis = StaticAnalyzer::new().analyze(original, "javascript");
    assert_eq!(analysis.algorithm_label(), "Bubble Sort");

    let result = OutputValidator::new().normalize(raw, original, &analysis, Language::JavaScript);

    assert!(result.parsed, "warning: {:?}", result.parse_warning);
    assert!(!result.no_change);
    assert_eq!(result.algorithm_before, "Bubble Sort");
}
