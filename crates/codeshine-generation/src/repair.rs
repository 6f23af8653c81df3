//! Truncation detection and repair
//!
//! Brackets inside string literals and comments are ignored. A non-empty
//! bracket stack at the end of the text is repaired by appending the missing
//! closers in LIFO order. Text whose brackets balance but that still ends in a
//! dangling construct cannot be repaired.

use codeshine_analysis::Language;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DANGLING_SUFFIX: Regex = Regex::new(
        r"(?:\.\.\.|…|=>|->|&&|\|\||[^=!<>]=|\s[+*]|,|\b(?:if|else|elif|for|while|const|let|var|def|function|class|and|or|not|new|await|import|from))$"
    )
    .unwrap();
}

/// Outcome of the repair stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairOutcome {
    /// Brackets balance and nothing dangles
    Intact,
    /// Missing closers were appended
    Repaired {
        /// Repaired text
        code: String,
        /// Closers that were appended, in order
        closers: String,
    },
    /// Balanced but visibly cut off
    Unrecoverable(&'static str),
}

fn closer_for(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

/// Brackets still open at the end of `code`, outermost first
pub fn open_brackets(code: &str, language: Language) -> Vec<char> {
    let chars: Vec<char> = code.chars().collect();
    let comment: Vec<char> = language.line_comment().chars().collect();
    let block_comments = !language.is_indentation_scoped();

    let mut stack = Vec::new();
    let mut quote: Option<(char, bool)> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if let Some((q, triple)) = quote {
            if c == '\\' {
                i += 2;
                continue;
            }
            if triple {
                if c == q && chars.get(i + 1) == Some(&q) && chars.get(i + 2) == Some(&q) {
                    quote = None;
                    i += 3;
                    continue;
                }
            } else if c == q || (c == '\n' && q != '`') {
                quote = None;
            }
            i += 1;
            continue;
        }

        if chars[i..].starts_with(&comment) {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            continue;
        }
        if block_comments && c == '/' && chars.get(i + 1) == Some(&'*') {
            i += 2;
            while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                i += 1;
            }
            i += 2;
            continue;
        }

        match c {
            '"' | '`' => {
                let triple = language == Language::Python
                    && chars.get(i + 1) == Some(&c)
                    && chars.get(i + 2) == Some(&c);
                quote = Some((c, triple));
                i += if triple { 3 } else { 1 };
                continue;
            }
            '\'' => {
                if language == Language::Rust && !is_char_literal(&chars, i) {
                    // Lifetime or label, not a literal.
                    i += 1;
                    continue;
                }
                let triple = language == Language::Python
                    && chars.get(i + 1) == Some(&c)
                    && chars.get(i + 2) == Some(&c);
                quote = Some((c, triple));
                i += if triple { 3 } else { 1 };
                continue;
            }
            '(' | '[' | '{' => stack.push(c),
            ')' | ']' | '}' => {
                if stack.last().map(|open| closer_for(*open)) == Some(c) {
                    stack.pop();
                }
            }
            _ => {}
        }
        i += 1;
    }

    stack
}

fn is_char_literal(chars: &[char], start: usize) -> bool {
    match chars.get(start + 1) {
        Some('\\') => true,
        Some(_) => chars.get(start + 2) == Some(&'\''),
        None => false,
    }
}

/// Suffix heuristics that mark text as cut off, independent of brackets
pub fn dangling_suffix(code: &str, language: Language) -> Option<&'static str> {
    let comment = language.line_comment();
    let last = code
        .lines()
        .rev()
        .map(str::trim_end)
        .find(|line| !line.trim().is_empty() && !line.trim_start().starts_with(comment))?;

    if last.ends_with("...") || last.ends_with('…') {
        return Some("trailing ellipsis");
    }
    if last.ends_with("=>") || last.ends_with("->") {
        return Some("dangling arrow");
    }
    if language == Language::Python && last.ends_with(':') && code.trim_end().ends_with(last) {
        return Some("block header without a body");
    }
    if DANGLING_SUFFIX.is_match(last) {
        return Some("dangling keyword or operator");
    }
    None
}

/// Whether the text looks cut off by any heuristic
pub fn looks_truncated(code: &str, language: Language) -> bool {
    !open_brackets(code, language).is_empty() || dangling_suffix(code, language).is_some()
}

/// Appends missing closers or reports unrecoverable truncation
pub fn repair_truncation(code: &str, language: Language) -> RepairOutcome {
    let open = open_brackets(code, language);
    if open.is_empty() {
        return match dangling_suffix(code, language) {
            Some(reason) => RepairOutcome::Unrecoverable(reason),
            None => RepairOutcome::Intact,
        };
    }

    let mut repaired = code.trim_end().to_string();
    let mut closers = String::new();
    for bracket in open.iter().rev() {
        let closer = closer_for(*bracket);
        if closer == '}' {
            repaired.push('\n');
        }
        repaired.push(closer);
        closers.push(closer);
    }
    RepairOutcome::Repaired {
        code: repaired,
        closers,
    }
}
