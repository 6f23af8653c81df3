use std::{collections::HashMap, fmt, path::Path};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref NAME_MAP: HashMap<&'static str, Language> = {
        use Language::*;
        HashMap::from([
            ("javascript", JavaScript),
            ("js", JavaScript),
            ("jsx", JavaScript),
            ("node", JavaScript),
            ("typescript", TypeScript),
            ("ts", TypeScript),
            ("tsx", TypeScript),
            ("python", Python),
            ("py", Python),
            ("java", Java),
            ("c", C),
            ("h", C),
            ("cpp", Cpp),
            ("c++", Cpp),
            ("cc", Cpp),
            ("cxx", Cpp),
            ("hpp", Cpp),
            ("rust", Rust),
            ("rs", Rust),
            ("go", Go),
            ("golang", Go),
        ])
    };

    /// Content signals, checked in order; first match wins.
    static ref CONTENT_SIGNALS: Vec<(Regex, Language)> = vec![
        (Regex::new(r"(?m)^\s*(pub\s+)?fn\s+\w+|\blet\s+mut\b|::new\(|println!\(").unwrap(), Language::Rust),
        (Regex::new(r"(?m)^\s*package\s+main\b|\bfunc\s+\w+\s*\(|:=").unwrap(), Language::Go),
        (Regex::new(r"(?m)^\s*#include\s*<(iostream|vector|string|map|algorithm)>|\bstd::|\bcout\s*<<").unwrap(), Language::Cpp),
        (Regex::new(r"(?m)^\s*#include\s*[<\x22]|\bprintf\s*\(|\bmalloc\s*\(").unwrap(), Language::C),
        (Regex::new(r"(?m)\bpublic\s+(static\s+)?(class|void|int|String)\b|System\.out\.").unwrap(), Language::Java),
        (Regex::new(r"(?m)^\s*def\s+\w+\s*\(.*\)\s*(->\s*[\w\[\], ]+)?:|^\s*import\s+\w+\s*$|^\s*from\s+\S+\s+import\b|\bself\.").unwrap(), Language::Python),
        (Regex::new(r":\s*(string|number|boolean)\b|\binterface\s+\w+\s*\{|<\w+>\s*\(").unwrap(), Language::TypeScript),
    ];
}

/// Curated set of languages with prompt templates and extraction tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
    TypeScript,
    Python,
    Java,
    C,
    Cpp,
    Rust,
    Go,
}

impl Language {
    pub fn all() -> &'static [Language] {
        &[
            Language::JavaScript,
            Language::TypeScript,
            Language::Python,
            Language::Java,
            Language::C,
            Language::Cpp,
            Language::Rust,
            Language::Go,
        ]
    }

    /// Resolves a language name or alias, case-insensitively
    pub fn from_name(name: &str) -> Option<Language> {
        NAME_MAP.get(name.trim().to_ascii_lowercase().as_str()).copied()
    }

    pub fn from_extension(path: &Path) -> Option<Language> {
        path.extension()
            .and_then(|s| s.to_str())
            .and_then(Language::from_name)
    }

    /// Resolves the requested language, falling back to content detection
    pub fn resolve(requested: &str, code: &str) -> Language {
        Language::from_name(requested).unwrap_or_else(|| detect_language(code))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Python => "python",
            Language::Java => "java",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Rust => "rust",
            Language::Go => "go",
        }
    }

    /// Info string used on fenced code blocks
    pub fn fence_tag(&self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Python => "python",
            Language::Java => "java",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Rust => "rust",
            Language::Go => "go",
        }
    }

    pub fn line_comment(&self) -> &'static str {
        match self {
            Language::Python => "#",
            _ => "//",
        }
    }

    /// Scope is expressed by indentation rather than braces
    pub fn is_indentation_scoped(&self) -> bool {
        matches!(self, Language::Python)
    }

    /// C-family languages where output confidence is capped
    pub fn is_c_family(&self) -> bool {
        matches!(self, Language::C | Language::Cpp)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Guesses a language from content signals; defaults to JavaScript
pub fn detect_language(code: &str) -> Language {
    CONTENT_SIGNALS
        .iter()
        .find(|(signal, _)| signal.is_match(code))
        .map(|(_, language)| *language)
        .unwrap_or(Language::JavaScript)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_aliases() {
        assert_eq!(Language::from_name("JS"), Some(Language::JavaScript));
        assert_eq!(Language::from_name("c++"), Some(Language::Cpp));
        assert_eq!(Language::from_name(" golang "), Some(Language::Go));
        assert_eq!(Language::from_name("cobol"), None);
    }

    #[test]
    fn test_from_extension() {
        assert_eq!(
            Language::from_extension(Path::new("src/main.rs")),
            Some(Language::Rust)
        );
        assert_eq!(Language::from_extension(Path::new("README")), None);
    }

    #[test]
    fn test_detect_language_signals() {
        assert_eq!(detect_language("fn main() {\n    let mut x = 1;\n}"), Language::Rust);
        assert_eq!(detect_language("def add(a, b):\n    return a + b\n"), Language::Python);
        assert_eq!(
            detect_language("#include <stdio.h>\nint main() { printf(\"hi\"); }"),
            Language::C
        );
        assert_eq!(
            detect_language("#include <vector>\nstd::vector<int> v;"),
            Language::Cpp
        );
        assert_eq!(
            detect_language("public class A { public static void main(String[] a) {} }"),
            Language::Java
        );
        assert_eq!(detect_language("const x = [1, 2].map(v => v * 2);"), Language::JavaScript);
    }

    #[test]
    fn test_resolve_auto_uses_detection() {
        assert_eq!(Language::resolve("auto", "def f():\n    pass"), Language::Python);
        assert_eq!(Language::resolve("go", "def f():\n    pass"), Language::Go);
    }
}
