//! Algorithm recognition, recursion heuristics, and complexity estimation
//!
//! Detection is table-driven: entries are tried in order and the first match
//! wins, so specific names (`quicksort`) sit ahead of generic calls (`.sort(`).

use std::collections::BTreeSet;

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{AlgorithmFamily, AlgorithmMatch, RecursionInfo};

/// Calls to a single name needed before it is treated as recursive
pub const RECURSION_MIN_OCCURRENCES: usize = 2;

/// Calls needed, together with split vocabulary, for divide-and-conquer
pub const DIVIDE_AND_CONQUER_MIN_OCCURRENCES: usize = 3;

pub const COMPLEXITY_CONSTANT: &str = "O(1)";
pub const COMPLEXITY_LINEAR: &str = "O(n)";
pub const COMPLEXITY_QUADRATIC: &str = "O(n²)";
pub const COMPLEXITY_CUBIC: &str = "O(n³) or worse";
pub const COMPLEXITY_LINEARITHMIC: &str = "O(n log n)";
pub const COMPLEXITY_RECURSIVE: &str = "O(n) to O(2ⁿ)";

/// One row of the algorithm table
pub struct AlgorithmSignature {
    pub pattern: Regex,
    pub label: &'static str,
    pub complexity: &'static str,
    pub family: AlgorithmFamily,
}

impl AlgorithmSignature {
    fn new(
        pattern: &str,
        label: &'static str,
        complexity: &'static str,
        family: AlgorithmFamily,
    ) -> Self {
        Self {
            pattern: Regex::new(pattern).unwrap(),
            label,
            complexity,
            family,
        }
    }

    fn to_match(&self) -> AlgorithmMatch {
        AlgorithmMatch {
            label: self.label.to_string(),
            complexity: self.complexity.to_string(),
            family: self.family,
        }
    }
}

lazy_static! {
    /// Priority-ordered signature table.
    pub static ref ALGORITHM_TABLE: Vec<AlgorithmSignature> = {
        use AlgorithmFamily::*;
        vec![
            AlgorithmSignature::new(r"(?i)quick_?sort", "Quick Sort", COMPLEXITY_LINEARITHMIC, Sort),
            AlgorithmSignature::new(r"(?i)merge_?sort", "Merge Sort", COMPLEXITY_LINEARITHMIC, Sort),
            AlgorithmSignature::new(r"(?i)heap_?sort|\bheapify\b", "Heap Sort", COMPLEXITY_LINEARITHMIC, Sort),
            AlgorithmSignature::new(r"(?i)bubble_?sort", "Bubble Sort", COMPLEXITY_QUADRATIC, Sort),
            AlgorithmSignature::new(r"(?i)insertion_?sort", "Insertion Sort", COMPLEXITY_QUADRATIC, Sort),
            AlgorithmSignature::new(r"(?i)selection_?sort", "Selection Sort", COMPLEXITY_QUADRATIC, Sort),
            AlgorithmSignature::new(r"(?i)binary_?search", "Binary Search", "O(log n)", Search),
            AlgorithmSignature::new(r"(?i)linear_?search", "Linear Search", COMPLEXITY_LINEAR, Search),
            AlgorithmSignature::new(r"(?i)dijkstra", "Dijkstra's Algorithm", "O((V + E) log V)", Graph),
            AlgorithmSignature::new(r"(?i)\bbfs\b|breadth_?first", "Breadth-First Search", "O(V + E)", Graph),
            AlgorithmSignature::new(r"(?i)\bdfs\b|depth_?first", "Depth-First Search", "O(V + E)", Graph),
            AlgorithmSignature::new(r"(?i)\bmemo\w*|\bdp\s*\[|lru_cache", "Dynamic Programming", "O(n·m)", DynamicProgramming),
            AlgorithmSignature::new(r"(?i)\bfib(?:onacci)?\w*\s*\(", "Fibonacci", "O(2ⁿ)", Recursive),
            AlgorithmSignature::new(r"(?i)\bfactorial\w*\s*\(", "Factorial", COMPLEXITY_LINEAR, Recursive),
            AlgorithmSignature::new(r"\.sort\s*\(|\bsorted\s*\(|Arrays\.sort|std::sort|sort\.(?:Slice|Ints|Strings)", "Built-in Sort", COMPLEXITY_LINEARITHMIC, Sort),
        ]
    };

    /// Function name capture per declaration convention
    static ref NAME_CONVENTIONS: Vec<Regex> = vec![
        Regex::new(r"\bfunction\s+([A-Za-z_$][\w$]*)\s*\(").unwrap(),
        Regex::new(r"\b(?:def|fn|func)\s+([A-Za-z_]\w*)\s*[(<]").unwrap(),
        Regex::new(r"(?m)^\s*(?:(?:public|private|protected|static|final|inline|const)\s+)*[A-Za-z_][\w<>\[\]:*&]*\s+[*&]?([A-Za-z_]\w*)\s*\([^;{}]*\)\s*\{").unwrap(),
    ];

    static ref SPLIT_VOCABULARY: Regex = Regex::new(r"\b(?:mid|pivot|left|right|lo|hi)\b").unwrap();
}

/// Returns the first matching algorithm signature
pub fn detect_algorithm(code: &str) -> Option<AlgorithmMatch> {
    ALGORITHM_TABLE
        .iter()
        .find(|signature| signature.pattern.is_match(code))
        .map(AlgorithmSignature::to_match)
}

/// Collects candidate function names across the naming conventions
pub fn function_names(code: &str) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    for convention in NAME_CONVENTIONS.iter() {
        for caps in convention.captures_iter(code) {
            if let Some(name) = caps.get(1) {
                let name = name.as_str();
                if !matches!(name, "if" | "for" | "while" | "switch" | "catch" | "return") {
                    names.insert(name.to_string());
                }
            }
        }
    }
    names
}

/// Counts occurrences of `name(` (declaration included)
fn invocation_count(code: &str, name: &str) -> usize {
    match Regex::new(&format!(r"\b{}\s*\(", regex::escape(name))) {
        Ok(pattern) => pattern.find_iter(code).count(),
        Err(_) => 0,
    }
}

/// Heuristic recursion detection; not a proof
pub fn detect_recursion(code: &str) -> RecursionInfo {
    let mut info = RecursionInfo::default();
    let has_split_vocabulary = SPLIT_VOCABULARY.is_match(code);

    for name in function_names(code) {
        let count = invocation_count(code, &name);
        if count >= RECURSION_MIN_OCCURRENCES {
            info.is_recursive = true;
        }
        if count >= DIVIDE_AND_CONQUER_MIN_OCCURRENCES && has_split_vocabulary {
            info.divide_and_conquer = true;
        }
    }

    info
}

/// Estimates complexity with precedence: named algorithm, divide-and-conquer,
/// plain recursion, then loop nesting depth
pub fn estimate_complexity(
    algorithm: Option<&AlgorithmMatch>,
    recursion: RecursionInfo,
    loop_nesting_depth: usize,
) -> String {
    if let Some(algorithm) = algorithm {
        return algorithm.complexity.clone();
    }
    if recursion.divide_and_conquer {
        return COMPLEXITY_LINEARITHMIC.to_string();
    }
    if recursion.is_recursive {
        return COMPLEXITY_RECURSIVE.to_string();
    }
    match loop_nesting_depth {
        0 => COMPLEXITY_CONSTANT,
        1 => COMPLEXITY_LINEAR,
        2 => COMPLEXITY_QUADRATIC,
        _ => COMPLEXITY_CUBIC,
    }
    .to_string()
}

/// Quadratic, cubic, exponential, or factorial
pub fn is_quadratic_or_worse(complexity: &str) -> bool {
    ["n²", "n³", "2ⁿ", "n^2", "n^3", "2^n", "n!"]
        .iter()
        .any(|marker| complexity.contains(marker))
}

/// Worse than quadratic
pub fn is_cubic_or_worse(complexity: &str) -> bool {
    ["n³", "2ⁿ", "n^3", "2^n", "n!"]
        .iter()
        .any(|marker| complexity.contains(marker))
}

/// Complexity expected after a successful optimization
pub fn downgrade(complexity: &str) -> String {
    const DOWNGRADES: &[(&str, &str)] = &[
        (COMPLEXITY_CUBIC, COMPLEXITY_QUADRATIC),
        (COMPLEXITY_QUADRATIC, COMPLEXITY_LINEAR),
        (COMPLEXITY_LINEARITHMIC, COMPLEXITY_LINEAR),
    ];
    DOWNGRADES
        .iter()
        .find(|(from, _)| *from == complexity)
        .map(|(_, to)| to.to_string())
        .unwrap_or_else(|| complexity.to_string())
}
