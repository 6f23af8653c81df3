//! Integration tests for the static analyzer across languages

use codeshine_analysis::{
    algorithms::{COMPLEXITY_CUBIC, COMPLEXITY_QUADRATIC},
    AlgorithmFamily, Language, PatternKind, Severity, StaticAnalyzer,
};

#[test]
fn test_nested_loops_one_liner() {
    let analysis = StaticAnalyzer::new().analyze("for(i<n)for(j<n){}", "javascript");

    let nested = analysis
        .detected_patterns
        .iter()
        .find(|p| p.kind == PatternKind::NestedLoops)
        .expect("nested loops");
    assert!(nested.severity >= Severity::Medium);
    assert!(
        analysis.estimated_complexity == COMPLEXITY_QUADRATIC
            || analysis.estimated_complexity == COMPLEXITY_CUBIC
    );
}

#[test]
fn test_python_duplicate_finder() {
    let code = r#"def find_duplicates(items):
    duplicates = []
    for i in range(len(items)):
        for j in range(i + 1, len(items)):
            if items[i] == items[j] and items[i] not in duplicates:
                duplicates.append(items[i])
    return duplicates
"#;
    let analysis = StaticAnalyzer::new().analyze(code, "auto");
    assert_eq!(analysis.language, Language::Python.name());
    assert_eq!(analysis.function_count, 1);
    assert_eq!(analysis.loop_nesting_depth, 2);
    assert_eq!(analysis.estimated_complexity, COMPLEXITY_QUADRATIC);
    assert!(analysis.has_patterns());
    assert!(analysis
        .possible_optimizations
        .iter()
        .any(|s| s.action.to_lowercase().contains("hash")));
}

#[test]
fn test_binary_search_family() {
    let code = r#"int binarySearch(int arr[], int n, int target) {
    int lo = 0, hi = n - 1;
    while (lo <= hi) {
        int mid = lo + (hi - lo) / 2;
        if (arr[mid] == target) return mid;
        if (arr[mid] < target) lo = mid + 1; else hi = mid - 1;
    }
    return -1;
}
"#;
    let analysis = StaticAnalyzer::new().analyze(code, "c");
    assert_eq!(analysis.algorithm_label(), "Binary Search");
    assert_eq!(analysis.algorithm_family(), AlgorithmFamily::Search);
    assert_eq!(analysis.language, "c");
}

#[test]
fn test_clean_code_is_not_optimizable() {
    let code = "function add(a, b) {\n  return a + b;\n}\n";
    let analysis = StaticAnalyzer::new().analyze(code, "javascript");
    assert!(!analysis.has_patterns());
    assert!(!analysis.is_optimizable);
    assert_eq!(analysis.algorithm_label(), "Unknown");
}

#[test]
fn test_analysis_serializes_with_wire_names() {
    let analysis = StaticAnalyzer::new().analyze("for(i<n)for(j<n){}", "javascript");
    let json = serde_json::to_value(&analysis).unwrap();
    assert!(json.get("lineCount").is_some());
    assert!(json.get("detected_patterns").is_some());
    assert!(json.get("isTruncated").is_some());
    assert_eq!(json["detected_patterns"][0]["type"], "nested_loops");
}
