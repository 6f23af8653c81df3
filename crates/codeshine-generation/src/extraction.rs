//! Code extraction from raw model output
//!
//! Strategies are tried in order: a complete fenced block, an unterminated
//! fenced block, a single inline backtick span, then raw text with prose lines
//! filtered out.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref PREAMBLE: Regex = Regex::new(
        r"(?i)^\s*(?:here(?:'s| is| are)\b|sure\b|certainly\b|of course\b|below is\b|the (?:optimized|improved|updated|refactored) (?:code|version)\b|i(?:'ve| have) (?:optimized|improved|updated|refactored)\b)"
    )
    .unwrap();
    static ref INLINE_SPAN: Regex = Regex::new(r"`([^`\n]+)`").unwrap();
    static ref PROSE_LINE: Regex =
        Regex::new(r"^[A-Z][A-Za-z'’,-]*(?:\s+\S+){2,}[.!?:]$").unwrap();
    static ref CODE_PUNCTUATION: Regex = Regex::new(r"[;{}=<>\[\]]|\(\s*\)|=>|->|::").unwrap();
    static ref COMMENT_LINE: Regex = Regex::new(r"^\s*(?://|#|/\*|\*|--)").unwrap();
}

/// How the code was located
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMethod {
    /// Opening and closing fence present
    FencedBlock,
    /// Opening fence without a closing one
    UnterminatedFence,
    /// A single inline backtick span
    InlineSpan,
    /// Raw text with prose removed
    RawText,
}

/// Code located in model output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub code: String,
    pub method: ExtractionMethod,
}

impl Extracted {
    /// The model stopped before closing its fence
    pub fn is_unterminated(&self) -> bool {
        self.method == ExtractionMethod::UnterminatedFence
    }
}

/// Removes leading chatter lines such as "Here is the optimized code:"
pub fn strip_preamble(raw: &str) -> &str {
    let mut rest = raw;
    loop {
        let trimmed = rest.trim_start_matches(['\n', '\r']);
        let line_end = trimmed.find('\n').unwrap_or(trimmed.len());
        let line = &trimmed[..line_end];
        if line.trim().is_empty() && line_end < trimmed.len() {
            rest = &trimmed[line_end + 1..];
            continue;
        }
        if PREAMBLE.is_match(line) && !CODE_PUNCTUATION.is_match(line) {
            rest = trimmed.get(line_end + 1..).unwrap_or("");
            continue;
        }
        return trimmed;
    }
}

/// Locates code in raw model output
pub fn extract_code(raw: &str) -> Option<Extracted> {
    let text = strip_preamble(raw);
    if text.trim().is_empty() {
        return None;
    }

    if let Some(found) = fenced_block(text) {
        return Some(found);
    }
    if let Some(code) = single_inline_span(text) {
        return Some(Extracted {
            code,
            method: ExtractionMethod::InlineSpan,
        });
    }
    filter_prose(text).map(|code| Extracted {
        code,
        method: ExtractionMethod::RawText,
    })
}

fn fenced_block(text: &str) -> Option<Extracted> {
    let mut inside = false;
    let mut body: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim_start().starts_with("```") {
            if inside {
                if body.iter().any(|l| !l.trim().is_empty()) {
                    return Some(Extracted {
                        code: body.join("\n"),
                        method: ExtractionMethod::FencedBlock,
                    });
                }
                // Empty block; keep looking for one with content.
                inside = false;
                body.clear();
            } else {
                inside = true;
            }
            continue;
        }
        if inside {
            body.push(line);
        }
    }

    if inside && body.iter().any(|l| !l.trim().is_empty()) {
        return Some(Extracted {
            code: body.join("\n").trim_end().to_string(),
            method: ExtractionMethod::UnterminatedFence,
        });
    }
    None
}

fn single_inline_span(text: &str) -> Option<String> {
    let mut spans = INLINE_SPAN.captures_iter(text);
    let first = spans.next()?.get(1)?.as_str().trim().to_string();
    if spans.next().is_some() || first.is_empty() {
        return None;
    }
    Some(first)
}

/// Whether a line reads like an English sentence rather than code
pub fn is_prose_line(line: &str) -> bool {
    let trimmed = line.trim();
    !COMMENT_LINE.is_match(trimmed)
        && PROSE_LINE.is_match(trimmed)
        && !CODE_PUNCTUATION.is_match(trimmed)
}

fn filter_prose(text: &str) -> Option<String> {
    let kept: Vec<&str> = text.lines().filter(|line| !is_prose_line(line)).collect();
    let code = kept.join("\n");
    let code = code.trim_matches(['\n', '\r']).trim_end();
    if code.trim().is_empty() {
        None
    } else {
        Some(code.to_string())
    }
}
