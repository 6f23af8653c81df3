//! Anti-pattern detectors
//!
//! Each detector is independent and reports at most one finding with a fixed
//! severity.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    models::{DetectedPattern, PatternKind, Severity},
    structure::StructuralMetrics,
};

/// Block depth at which nesting is reported
pub const EXCESSIVE_NESTING_DEPTH: usize = 5;

/// Identical call expressions needed to report repeated computation
pub const REPEATED_CALL_THRESHOLD: usize = 3;

/// Average lines per function above which functions are reported as oversized
pub const LARGE_FUNCTION_LINES: usize = 50;

/// File length above which the whole input is reported as oversized
pub const LARGE_FILE_LINES: usize = 300;

lazy_static! {
    static ref CALL_EXPRESSION: Regex =
        Regex::new(r"\b[A-Za-z_][\w]*(?:\.[A-Za-z_]\w*)*\s*\([^()\n]*\)").unwrap();
    static ref LOOP_BOUND_CALL: Regex =
        Regex::new(r"\b(?:for|while)\s*\([^;)]*;[^;]*\b(?:\w+\.(?:length|size\(\)|count\(\))|len\()").unwrap();
    static ref MEMBERSHIP_TEST: Regex = Regex::new(
        r"\.(?:includes|indexOf|contains|lastIndexOf)\s*\(|\bif\s+\w+\s+(?:not\s+)?in\s+\w*(?:list|arr|array|items|values)\w*\b|\.index\s*\(|std::find\s*\("
    )
    .unwrap();
    static ref REDUNDANT_CONDITIONAL: Regex = Regex::new(
        r"(?:===?|!==?)\s*(?:true|false|True|False)\b|\b(?:true|false|True|False)\s*(?:===?|!==?)|\?\s*true\s*:\s*false\b|\?\s*false\s*:\s*true\b|\breturn\s+true;?\s*\}?\s*else\s*\{?\s*return\s+false\b"
    )
    .unwrap();
    static ref STRING_CONCAT: Regex = Regex::new(
        r#"\b\w+\s*\+=\s*(?:["'`]|f["']|str\(|String\(|\w+\.toString\(\))|\b(\w+)\s*=\s*(\w+)\s*\+\s*["'`]"#
    )
    .unwrap();
    static ref IGNORED_CALLS: Vec<&'static str> = vec![
        "print", "println", "printf", "console.log", "console.error", "System.out.println",
        "len", "range", "assert", "expect", "push", "append",
    ];
}

/// Runs all detectors in a fixed order
pub fn detect_all(code: &str, metrics: &StructuralMetrics) -> Vec<DetectedPattern> {
    [
        detect_nested_loops(metrics),
        detect_repeated_computation(code),
        detect_inefficient_lookup(code, metrics),
        detect_redundant_conditionals(code),
        detect_string_concat_in_loop(code, metrics),
        detect_excessive_nesting(metrics),
        detect_large_function(metrics),
    ]
    .into_iter()
    .flatten()
    .collect()
}

pub fn detect_nested_loops(metrics: &StructuralMetrics) -> Option<DetectedPattern> {
    if metrics.loop_nesting_depth < 2 {
        return None;
    }
    Some(DetectedPattern::new(
        PatternKind::NestedLoops,
        Severity::High,
        format!(
            "Nested loops {} levels deep; work grows with the product of the loop bounds",
            metrics.loop_nesting_depth
        ),
    ))
}

pub fn detect_repeated_computation(code: &str) -> Option<DetectedPattern> {
    if let Some(found) = LOOP_BOUND_CALL.find(code) {
        return Some(
            DetectedPattern::new(
                PatternKind::RepeatedComputation,
                Severity::Medium,
                "Loop bound is recomputed on every iteration",
            )
            .at_line(Some(line_of(code, found.start()))),
        );
    }

    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for found in CALL_EXPRESSION.find_iter(code) {
        let expression: String = found.as_str().split_whitespace().collect();
        let callee = expression.split('(').next().unwrap_or_default();
        if IGNORED_CALLS.contains(&callee) || (expression.ends_with("()") && !callee.contains('.')) {
            continue;
        }
        let entry = counts.entry(expression).or_insert((0, found.start()));
        entry.0 += 1;
    }

    let (expression, (count, offset)) = counts
        .into_iter()
        .filter(|(_, (count, _))| *count >= REPEATED_CALL_THRESHOLD)
        .max_by(|a, b| a.1 .0.cmp(&b.1 .0).then_with(|| b.1 .1.cmp(&a.1 .1)))?;

    Some(
        DetectedPattern::new(
            PatternKind::RepeatedComputation,
            Severity::Medium,
            format!("`{}` is evaluated {} times with the same arguments", expression, count),
        )
        .at_line(Some(line_of(code, offset))),
    )
}

pub fn detect_inefficient_lookup(
    code: &str,
    metrics: &StructuralMetrics,
) -> Option<DetectedPattern> {
    if metrics.loop_count == 0 {
        return None;
    }
    let found = MEMBERSHIP_TEST.find(code)?;
    Some(
        DetectedPattern::new(
            PatternKind::InefficientLookup,
            Severity::Medium,
            "Linear membership test inside iteration; each check scans the whole collection",
        )
        .at_line(Some(line_of(code, found.start()))),
    )
}

pub fn detect_redundant_conditionals(code: &str) -> Option<DetectedPattern> {
    let found = REDUNDANT_CONDITIONAL.find(code)?;
    Some(
        DetectedPattern::new(
            PatternKind::RedundantConditional,
            Severity::Low,
            "Boolean compared against a literal or mapped to true/false explicitly",
        )
        .at_line(Some(line_of(code, found.start()))),
    )
}

pub fn detect_string_concat_in_loop(
    code: &str,
    metrics: &StructuralMetrics,
) -> Option<DetectedPattern> {
    if metrics.loop_count == 0 {
        return None;
    }
    let caps = STRING_CONCAT
        .captures_iter(code)
        .find(|caps| match (caps.get(1), caps.get(2)) {
            (Some(target), Some(source)) => target.as_str() == source.as_str(),
            _ => true,
        })?;
    let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
    Some(
        DetectedPattern::new(
            PatternKind::StringConcatInLoop,
            Severity::Medium,
            "String built by repeated concatenation inside a loop; each step copies the string",
        )
        .at_line(Some(line_of(code, start))),
    )
}

pub fn detect_excessive_nesting(metrics: &StructuralMetrics) -> Option<DetectedPattern> {
    if metrics.max_depth < EXCESSIVE_NESTING_DEPTH {
        return None;
    }
    Some(DetectedPattern::new(
        PatternKind::DeepNesting,
        Severity::Medium,
        format!(
            "Blocks nested {} levels deep make control flow hard to follow",
            metrics.max_depth
        ),
    ))
}

pub fn detect_large_function(metrics: &StructuralMetrics) -> Option<DetectedPattern> {
    if metrics.line_count > LARGE_FILE_LINES {
        return Some(DetectedPattern::new(
            PatternKind::LargeFunction,
            Severity::Low,
            format!("Input spans {} lines; consider splitting it up", metrics.line_count),
        ));
    }
    if metrics.function_count == 0 {
        return None;
    }
    let average = metrics.line_count / metrics.function_count;
    if average <= LARGE_FUNCTION_LINES {
        return None;
    }
    Some(DetectedPattern::new(
        PatternKind::LargeFunction,
        Severity::Low,
        format!("Functions average {} lines each", average),
    ))
}

fn line_of(code: &str, offset: usize) -> usize {
    code[..offset.min(code.len())].matches('\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{language::Language, structure::measure};

    fn run(code: &str, language: Language) -> Vec<DetectedPattern> {
        detect_all(code, &measure(code, language))
    }

    fn kinds(patterns: &[DetectedPattern]) -> Vec<PatternKind> {
        patterns.iter().map(|p| p.kind).collect()
    }

    #[test]
    fn test_nested_loops_reports_depth() {
        let patterns = run("for(i<n)for(j<n){}", Language::JavaScript);
        let nested = patterns
            .iter()
            .find(|p| p.kind == PatternKind::NestedLoops)
            .unwrap();
        assert_eq!(nested.severity, Severity::High);
        assert!(nested.description.contains('2'));
    }

    #[test]
    fn test_loop_bound_recomputed() {
        let code = "for (let i = 0; i < items.length; i++) {\n  total += items[i];\n}\n";
        let pattern = detect_repeated_computation(code).unwrap();
        assert_eq!(pattern.kind, PatternKind::RepeatedComputation);
        assert_eq!(pattern.line_hint, Some(1));
    }

    #[test]
    fn test_repeated_identical_calls() {
        let code = "a = compute(x, y)\nb = compute(x, y) + 1\nc = compute(x, y) * 2\n";
        let pattern = detect_repeated_computation(code).unwrap();
        assert!(pattern.description.contains("compute(x,y)"));
        assert!(pattern.description.contains('3'));
    }

    #[test]
    fn test_logging_calls_are_not_repeated_computation() {
        let code = "print(x)\nprint(x)\nprint(x)\n";
        assert!(detect_repeated_computation(code).is_none());
    }

    #[test]
    fn test_membership_inside_loop() {
        let code = "for (const v of values) {\n  if (seen.includes(v)) continue;\n  seen.push(v);\n}\n";
        let patterns = run(code, Language::JavaScript);
        let lookup = patterns
            .iter()
            .find(|p| p.kind == PatternKind::InefficientLookup)
            .unwrap();
        assert_eq!(lookup.line_hint, Some(2));
    }

    #[test]
    fn test_membership_without_loop_is_fine() {
        let patterns = run("const ok = xs.includes(3);", Language::JavaScript);
        assert!(!kinds(&patterns).contains(&PatternKind::InefficientLookup));
    }

    #[test]
    fn test_redundant_conditionals() {
        assert!(detect_redundant_conditionals("if (done === true) { stop(); }").is_some());
        assert!(detect_redundant_conditionals("const b = x > 1 ? true : false;").is_some());
        assert!(detect_redundant_conditionals("if (done) { stop(); }").is_none());
    }

    #[test]
    fn test_string_concat_in_loop() {
        let code = "let s = '';\nfor (const w of words) {\n  s += ', ';\n}\n";
        let patterns = run(code, Language::JavaScript);
        assert!(kinds(&patterns).contains(&PatternKind::StringConcatInLoop));

        let python = "out = ''\nfor w in words:\n    out = out + ' ' + w\n";
        let patterns = run(python, Language::Python);
        assert!(kinds(&patterns).contains(&PatternKind::StringConcatInLoop));
    }

    #[test]
    fn test_excessive_nesting() {
        let code = "if(a){if(b){if(c){if(d){if(e){x();}}}}}";
        let patterns = run(code, Language::JavaScript);
        let deep = patterns
            .iter()
            .find(|p| p.kind == PatternKind::DeepNesting)
            .unwrap();
        assert!(deep.description.contains('5'));
    }

    #[test]
    fn test_large_file() {
        let metrics = StructuralMetrics {
            line_count: LARGE_FILE_LINES + 1,
            ..Default::default()
        };
        assert!(detect_large_function(&metrics).is_some());

        let metrics = StructuralMetrics {
            line_count: 120,
            function_count: 2,
            ..Default::default()
        };
        let pattern = detect_large_function(&metrics).unwrap();
        assert!(pattern.description.contains("60"));
    }

    #[test]
    fn test_each_detector_reports_at_most_once() {
        let code = "for (i) { for (j) { if (x === true) {} if (y === false) {} } }";
        let patterns = run(code, Language::JavaScript);
        let redundant = patterns
            .iter()
            .filter(|p| p.kind == PatternKind::RedundantConditional)
            .count();
        assert_eq!(redundant, 1);
    }
}
