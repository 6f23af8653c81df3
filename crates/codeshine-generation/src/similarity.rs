//! Line similarity between original and rewritten code

/// Lines longer than this may match on a shared prefix
pub const PREFIX_MATCH_CHARS: usize = 10;

fn meaningful(code: &str) -> Vec<&str> {
    code.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

fn lines_match(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    if a.chars().count() <= PREFIX_MATCH_CHARS || b.chars().count() <= PREFIX_MATCH_CHARS {
        return false;
    }
    a.chars()
        .take(PREFIX_MATCH_CHARS)
        .eq(b.chars().take(PREFIX_MATCH_CHARS))
}

/// Position-aligned line similarity weighted by the length ratio, as a percentage
pub fn similarity(original: &str, candidate: &str) -> u8 {
    let a = meaningful(original);
    let b = meaningful(candidate);

    if a == b {
        return 100;
    }
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let matches = a
        .iter()
        .zip(b.iter())
        .filter(|(x, y)| lines_match(x, y))
        .count();
    let line_ratio = matches as f64 / a.len().max(b.len()) as f64;

    let len_a: usize = a.iter().map(|l| l.len()).sum();
    let len_b: usize = b.iter().map(|l| l.len()).sum();
    let length_ratio = len_a.min(len_b) as f64 / len_a.max(len_b).max(1) as f64;

    (line_ratio * length_ratio * 100.0).round().clamp(0.0, 100.0) as u8
}
