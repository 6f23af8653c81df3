//! Boundary-aware splitting of large inputs
//!
//! Chunks are contiguous line-aligned substrings of the input, so joining the
//! chunk texts reproduces the input exactly. A chunk is closed early at a
//! declaration boundary once it passes half the threshold, and unconditionally
//! once it reaches the threshold.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Default chunk size threshold in characters
pub const DEFAULT_CHUNK_THRESHOLD: usize = 3000;

/// Default number of trailing lines carried into the next chunk as context
pub const DEFAULT_OVERLAP_LINES: usize = 3;

lazy_static! {
    static ref BOUNDARY: Regex = Regex::new(
        r"^\s*(?:export\s+|async\s+function\b|function\b|class\b|def\b|fn\b|pub\s|public\b|private\b|protected\b)"
    )
    .unwrap();
}

/// A chunk plus the preceding context handed to the prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeChunk {
    /// 0-based position
    pub index: usize,
    /// Exact substring of the input
    pub text: String,
    /// Trailing lines of the previous chunk; read-only context
    pub overlap: String,
}

/// Splits code into size-bounded chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    threshold: usize,
    overlap_lines: usize,
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_THRESHOLD, DEFAULT_OVERLAP_LINES)
    }
}

impl Chunker {
    pub fn new(threshold: usize, overlap_lines: usize) -> Self {
        Self {
            threshold: threshold.max(1),
            overlap_lines,
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Whether the code needs more than one chunk
    pub fn exceeds_threshold(&self, code: &str) -> bool {
        code.len() > self.threshold
    }

    /// Splits the code; never returns an empty list
    pub fn split(&self, code: &str) -> Vec<String> {
        if !self.exceeds_threshold(code) {
            return vec![code.to_string()];
        }

        let soft_limit = self.threshold / 2;
        let mut chunks = Vec::new();
        let mut current = String::new();

        for line in code.split_inclusive('\n') {
            if current.len() > soft_limit && BOUNDARY.is_match(line) {
                chunks.push(std::mem::take(&mut current));
            }
            current.push_str(line);
            if current.len() >= self.threshold {
                chunks.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            chunks.push(current);
        }
        if chunks.is_empty() {
            chunks.push(code.to_string());
        }
        chunks
    }

    /// Splits the code and attaches overlap context to every chunk after the first
    pub fn split_with_overlap(&self, code: &str) -> Vec<CodeChunk> {
        let texts = self.split(code);
        let mut chunks = Vec::with_capacity(texts.len());
        let mut previous: Option<&str> = None;

        for (index, text) in texts.iter().enumerate() {
            let overlap = previous
                .map(|prev| trailing_lines(prev, self.overlap_lines))
                .unwrap_or_default();
            chunks.push(CodeChunk {
                index,
                text: text.clone(),
                overlap,
            });
            previous = Some(text);
        }
        chunks
    }
}

fn trailing_lines(text: &str, count: usize) -> String {
    if count == 0 {
        return String::new();
    }
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(count);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(functions: usize) -> String {
        (0..functions)
            .map(|i| {
                format!(
                    "function handler{i}(input) {{\n  const value = input * {i};\n  return value + {i};\n}}\n\n"
                )
            })
            .collect()
    }

    #[test]
    fn test_small_input_is_single_chunk() {
        let chunker = Chunker::default();
        assert_eq!(chunker.split("let x = 1;"), vec!["let x = 1;".to_string()]);
    }

    #[test]
    fn test_empty_input_is_single_chunk() {
        assert_eq!(Chunker::default().split(""), vec![String::new()]);
    }

    #[test]
    fn test_chunks_reconstruct_input() {
        let code = sample(40);
        let chunker = Chunker::new(300, 2);
        let chunks = chunker.split(&code);
        assert!(chunks.len() > 1);
        assert_eq!(chunks.concat(), code);
    }

    #[test]
    fn test_chunks_start_at_boundaries_when_possible() {
        let code = sample(40);
        let chunks = Chunker::new(300, 2).split(&code);
        for chunk in &chunks[1..] {
            assert!(
                chunk.starts_with("function") || chunk.starts_with('\n'),
                "unexpected chunk start: {:?}",
                &chunk[..chunk.len().min(20)]
            );
        }
    }

    #[test]
    fn test_hard_threshold_without_boundaries() {
        let code = "x = x + 1;\n".repeat(200);
        let chunker = Chunker::new(200, 0);
        let chunks = chunker.split(&code);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.len() <= 200 + 11));
        assert_eq!(chunks.concat(), code);
    }

    #[test]
    fn test_overlap_carries_previous_tail() {
        let code = sample(40);
        let chunks = Chunker::new(300, 2).split_with_overlap(&code);
        assert!(chunks[0].overlap.is_empty());
        for pair in chunks.windows(2) {
            let tail: Vec<&str> = pair[0].text.lines().collect();
            let expected = tail[tail.len().saturating_sub(2)..].join("\n");
            assert_eq!(pair[1].overlap, expected);
        }
    }
}
