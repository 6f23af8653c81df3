//! Structural pass: line, function, and loop counts plus nesting depths
//!
//! Brace-scoped languages are scanned once, character by character, with a
//! brace depth counter and a parallel stack of open loops. A loop is nested
//! only when it starts while another loop's body is still open, so loops inside
//! unrelated blocks do not inflate the loop nesting depth. String literals and
//! line comments are skipped so brackets inside them are not counted.

use lazy_static::lazy_static;
use regex::Regex;

use crate::language::Language;

lazy_static! {
    static ref FUNCTION_DECLARATIONS: Vec<Regex> = vec![
        Regex::new(r"\bfunction\b\s*\*?\s*\w*\s*\(").unwrap(),
        Regex::new(r"(?m)^\s*(?:async\s+)?def\s+\w+\s*\(").unwrap(),
        Regex::new(r"\bfn\s+\w+").unwrap(),
        Regex::new(r"\bfunc\s+(?:\([^)]*\)\s*)?\w+\s*\(").unwrap(),
        Regex::new(r"(?:\([^()]*\)|\b\w+)\s*=>").unwrap(),
        Regex::new(
            r"(?m)^\s*(?:(?:public|private|protected|static|final|inline|virtual|const|unsigned)\s+)*([A-Za-z_][\w<>\[\],:*&]*)\s+[*&]?([A-Za-z_]\w*)\s*\([^;{}]*\)\s*(?:const\s*)?(?:throws\s+[\w, ]+)?\s*\{"
        )
        .unwrap(),
    ];
    static ref CONTROL_WORDS: Vec<&'static str> =
        vec!["if", "for", "while", "switch", "catch", "return", "else", "do", "new", "sizeof"];
    static ref DECLARATION_KEYWORDS: Vec<&'static str> =
        vec!["function", "def", "fn", "func", "async", "pub", "else", "return", "new", "await"];
    static ref LOOP_TOKEN: Regex = Regex::new(r"\b(?:for|while|do)\b").unwrap();
}

/// Counts produced by the structural pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StructuralMetrics {
    pub line_count: usize,
    pub function_count: usize,
    pub loop_count: usize,
    pub max_depth: usize,
    pub loop_nesting_depth: usize,
}

/// Runs the structural pass for the given language
pub fn measure(code: &str, language: Language) -> StructuralMetrics {
    let (max_depth, loop_nesting_depth) = if language.is_indentation_scoped() {
        scan_indentation(code)
    } else {
        scan_braces(code)
    };

    StructuralMetrics {
        line_count: count_lines(code),
        function_count: count_functions(code),
        loop_count: count_loops(code, language),
        max_depth,
        loop_nesting_depth,
    }
}

pub fn count_lines(code: &str) -> usize {
    if code.is_empty() {
        0
    } else {
        code.lines().count()
    }
}

pub fn count_functions(code: &str) -> usize {
    let mut total = 0;
    for (index, pattern) in FUNCTION_DECLARATIONS.iter().enumerate() {
        if index == FUNCTION_DECLARATIONS.len() - 1 {
            // Typed signatures share their shape with `if (...) {` and friends.
            total += pattern
                .captures_iter(code)
                .filter(|caps| match (caps.get(1), caps.get(2)) {
                    (Some(ty), Some(name)) => {
                        !DECLARATION_KEYWORDS.contains(&ty.as_str())
                            && !CONTROL_WORDS.contains(&name.as_str())
                    }
                    _ => false,
                })
                .count();
        } else {
            total += pattern.find_iter(code).count();
        }
    }
    total
}

fn count_loops(code: &str, language: Language) -> usize {
    let stripped = strip_literals(code, language);
    LOOP_TOKEN.find_iter(&stripped).count()
}

/// A loop whose body has not closed yet
#[derive(Debug, Clone, Copy)]
struct LoopFrame {
    /// Brace depth at the loop keyword
    depth: usize,
    /// Paren depth at the loop keyword
    parens: usize,
    /// Body brace has been seen
    opened: bool,
}

/// Returns `(max_depth, loop_nesting_depth)` for brace-scoped code
fn scan_braces(code: &str) -> (usize, usize) {
    let chars: Vec<char> = code.chars().collect();
    let mut depth = 0usize;
    let mut parens = 0usize;
    let mut max_depth = 0usize;
    let mut loop_nesting = 0usize;
    let mut loops: Vec<LoopFrame> = Vec::new();
    let mut quote: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if let Some(q) = quote {
            if c == '\\' {
                i += 2;
                continue;
            }
            // Only template literals span lines.
            if c == q || (c == '\n' && q != '`') {
                quote = None;
            }
            i += 1;
            continue;
        }

        match c {
            '"' | '\'' | '`' => quote = Some(c),
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
                continue;
            }
            '(' => parens += 1,
            ')' => parens = parens.saturating_sub(1),
            '{' => {
                if let Some(frame) = loops.last_mut() {
                    if !frame.opened && frame.depth == depth && frame.parens == parens {
                        frame.opened = true;
                    }
                }
                depth += 1;
                max_depth = max_depth.max(depth);
            }
            '}' => {
                depth = depth.saturating_sub(1);
                while let Some(frame) = loops.last() {
                    // A brace-less loop whose single-statement body was a block ends with it.
                    let closed = if frame.opened {
                        depth <= frame.depth
                    } else {
                        depth < frame.depth || (depth == frame.depth && parens == frame.parens)
                    };
                    if closed {
                        loops.pop();
                    } else {
                        break;
                    }
                }
            }
            ';' => {
                // A single-statement body ends every pending brace-less loop at this level.
                while let Some(frame) = loops.last() {
                    if !frame.opened && frame.depth == depth && frame.parens == parens {
                        loops.pop();
                    } else {
                        break;
                    }
                }
            }
            c if is_word_start(c) && (i == 0 || !is_word_char(chars[i - 1])) => {
                let start = i;
                while i < chars.len() && is_word_char(chars[i]) {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                if matches!(word.as_str(), "for" | "while" | "do") {
                    loops.push(LoopFrame {
                        depth,
                        parens,
                        opened: false,
                    });
                    loop_nesting = loop_nesting.max(loops.len());
                }
                continue;
            }
            _ => {}
        }
        i += 1;
    }

    (max_depth, loop_nesting)
}

/// Returns `(max_depth, loop_nesting_depth)` for indentation-scoped code
fn scan_indentation(code: &str) -> (usize, usize) {
    let mut loop_indents: Vec<usize> = Vec::new();
    let mut block_indents: Vec<usize> = Vec::new();
    let mut max_depth = 0usize;
    let mut loop_nesting = 0usize;

    for line in code.lines() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let indent = indentation_width(line);

        while loop_indents.last().is_some_and(|&open| indent <= open) {
            loop_indents.pop();
        }
        while block_indents.last().is_some_and(|&open| indent <= open) {
            block_indents.pop();
        }
        max_depth = max_depth.max(block_indents.len());

        if trimmed.trim_end().ends_with(':') {
            block_indents.push(indent);
            if trimmed.starts_with("for ") || trimmed.starts_with("while ") {
                loop_indents.push(indent);
                loop_nesting = loop_nesting.max(loop_indents.len());
            }
        }
    }

    (max_depth, loop_nesting)
}

fn indentation_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

/// Replaces string literal contents and line comments with spaces
pub fn strip_literals(code: &str, language: Language) -> String {
    let comment = language.line_comment();
    let mut out = String::with_capacity(code.len());
    for line in code.lines() {
        let mut quote: Option<char> = None;
        let mut escaped = false;
        let mut rest = line;
        while let Some(c) = rest.chars().next() {
            let width = c.len_utf8();
            if let Some(q) = quote {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                    out.push(c);
                    rest = &rest[width..];
                    continue;
                }
                out.push(' ');
            } else if rest.starts_with(comment) {
                break;
            } else {
                if matches!(c, '"' | '\'' | '`') {
                    quote = Some(c);
                }
                out.push(c);
            }
            rest = &rest[width..];
        }
        out.push('\n');
    }
    out
}

fn is_word_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brace_less_outer_loop_counts_as_nested() {
        let metrics = measure("for(i<n)for(j<n){}", Language::JavaScript);
        assert_eq!(metrics.loop_count, 2);
        assert_eq!(metrics.loop_nesting_depth, 2);
    }

    #[test]
    fn test_sequential_loops_are_not_nested() {
        let code = "function f(a) {\n  for (let i = 0; i < a.length; i++) { x(); }\n  for (let j = 0; j < a.length; j++) { y(); }\n}\n";
        let metrics = measure(code, Language::JavaScript);
        assert_eq!(metrics.loop_count, 2);
        assert_eq!(metrics.loop_nesting_depth, 1);
        assert_eq!(metrics.max_depth, 2);
    }

    #[test]
    fn test_loop_inside_unrelated_block_is_not_nested() {
        let code = "if (a) {\n  if (b) {\n    while (c) { c--; }\n  }\n}\n";
        let metrics = measure(code, Language::JavaScript);
        assert_eq!(metrics.loop_nesting_depth, 1);
        assert_eq!(metrics.max_depth, 3);
    }

    #[test]
    fn test_triple_nested_loops() {
        let code = "for (i) {\n for (j) {\n  for (k) { s += 1; }\n }\n}\n";
        let metrics = measure(code, Language::C);
        assert_eq!(metrics.loop_nesting_depth, 3);
    }

    #[test]
    fn test_single_statement_body_closes_loop() {
        let code = "for (i = 0; i < n; i++) sum += i;\nfor (j = 0; j < n; j++) { sum -= j; }\n";
        let metrics = measure(code, Language::C);
        assert_eq!(metrics.loop_nesting_depth, 1);
    }

    #[test]
    fn test_do_while_counts_once_for_nesting() {
        let code = "do {\n  x++;\n} while (x < 10);\nfor (;;) { break; }\n";
        let metrics = measure(code, Language::C);
        assert_eq!(metrics.loop_nesting_depth, 1);
    }

    #[test]
    fn test_braces_in_strings_are_ignored() {
        let code = "const s = \"{{{{\";\nfunction f() { return '}'; }\n";
        let metrics = measure(code, Language::JavaScript);
        assert_eq!(metrics.max_depth, 1);
    }

    #[test]
    fn test_python_indentation_nesting() {
        let code = "def f(xs):\n    for a in xs:\n        for b in xs:\n            print(a, b)\n    for c in xs:\n        pass\n";
        let metrics = measure(code, Language::Python);
        assert_eq!(metrics.loop_nesting_depth, 2);
        assert_eq!(metrics.max_depth, 3);
        assert_eq!(metrics.function_count, 1);
    }

    #[test]
    fn test_function_count_skips_control_flow() {
        let code = "int add(int a, int b) {\n  if (a > b) {\n    return a;\n  }\n  return b;\n}\n";
        assert_eq!(count_functions(code), 1);
    }

    #[test]
    fn test_loop_keywords_in_comments_are_ignored() {
        let code = "// for every item\nconst x = \"while\";\n";
        let metrics = measure(code, Language::JavaScript);
        assert_eq!(metrics.loop_count, 0);
    }
}
