//! Element preservation checks
//!
//! Identifiers are extracted with per-language heuristic tables. Functions,
//! classes, and imports missing from the output are losses; variables are
//! tracked for diagnostics only.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use codeshine_analysis::Language;
use lazy_static::lazy_static;
use regex::Regex;

/// Kind of extracted element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementKind {
    Function,
    Class,
    Import,
    Variable,
}

impl ElementKind {
    /// Losing this kind of element rejects the output
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ElementKind::Variable)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ElementKind::Function => "function",
            ElementKind::Class => "class",
            ElementKind::Import => "import",
            ElementKind::Variable => "variable",
        })
    }
}

/// Names that may disappear without counting as a loss
pub const TRIVIAL_NAMES: &[&str] = &[
    "i", "j", "k", "n", "m", "x", "y", "z", "tmp", "temp", "idx", "index", "len", "count",
    "result", "res", "ret", "val", "value", "item", "el", "elem", "key", "acc", "_",
];

/// Whether a missing name is not worth reporting
pub fn is_trivial(name: &str) -> bool {
    name.chars().count() <= 1 || TRIVIAL_NAMES.contains(&name)
}

struct ElementTable {
    functions: Vec<Regex>,
    classes: Vec<Regex>,
    imports: Vec<Regex>,
    variables: Vec<Regex>,
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
}

const CONTROL_WORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "return", "else", "do", "sizeof", "new", "throw",
];

lazy_static! {
    static ref TABLES: HashMap<Language, ElementTable> = {
        let js_like = || ElementTable {
            functions: compile(&[
                r"\bfunction\s*\*?\s*([A-Za-z_$][\w$]*)\s*\(",
                r"\b(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*=\s*(?:async\s+)?(?:function\b|\([^()]*\)\s*(?::\s*[^=]+)?=>|[A-Za-z_$][\w$]*\s*=>)",
                r"(?m)^\s*(?:(?:public|private|protected|static|async|get|set)\s+)*([A-Za-z_$][\w$]*)\s*\([^()]*\)\s*(?::\s*[^{]+)?\{",
            ]),
            classes: compile(&[r"\b(?:class|interface)\s+([A-Za-z_$][\w$]*)"]),
            imports: compile(&[
                r#"\bimport\s+(?:[\w*{}\s,]+\s+from\s+)?["']([^"']+)["']"#,
                r#"\brequire\s*\(\s*["']([^"']+)["']\s*\)"#,
            ]),
            variables: compile(&[r"\b(?:const|let|var)\s+([A-Za-z_$][\w$]*)"]),
        };

        let mut tables = HashMap::new();
        tables.insert(Language::JavaScript, js_like());
        tables.insert(Language::TypeScript, js_like());
        tables.insert(
            Language::Python,
            ElementTable {
                functions: compile(&[r"\bdef\s+([A-Za-z_]\w*)\s*\("]),
                classes: compile(&[r"\bclass\s+([A-Za-z_]\w*)"]),
                imports: compile(&[
                    r"(?m)^\s*import\s+([\w.]+)",
                    r"(?m)^\s*from\s+([\w.]+)\s+import\b",
                ]),
                variables: compile(&[r"(?m)^\s*([A-Za-z_]\w*)\s*=[^=]"]),
            },
        );
        tables.insert(
            Language::Java,
            ElementTable {
                functions: compile(&[
                    r"(?m)^\s*(?:@\w+(?:\([^)]*\))?\s+)*(?:(?:public|private|protected|static|final|abstract|synchronized|native)\s+)*[\w<>\[\],?]+\s+([A-Za-z_]\w*)\s*\([^)]*\)\s*(?:throws\s+[\w.,\s]+)?\{",
                ]),
                classes: compile(&[r"\b(?:class|interface|enum|record)\s+([A-Za-z_]\w*)"]),
                imports: compile(&[r"(?m)^\s*import\s+(?:static\s+)?([\w.*]+)\s*;"]),
                variables: compile(&[
                    r"\b(?:int|long|double|float|char|boolean|byte|short|String|var)(?:\[\])?\s+([A-Za-z_]\w*)\s*[=;]",
                ]),
            },
        );
        let c_like = |classes: &[&str]| ElementTable {
            functions: compile(&[
                r"(?m)^\s*(?:(?:static|inline|extern|virtual|const|unsigned|signed|constexpr)\s+)*[A-Za-z_][\w:<>,]*[\s*&]+([A-Za-z_][\w:~]*)\s*\([^;{}]*\)\s*(?:const\s*)?(?:override\s*)?\{",
            ]),
            classes: compile(classes),
            imports: compile(&[r#"(?m)^\s*#\s*include\s*[<"]([^>"]+)[>"]"#]),
            variables: compile(&[
                r"\b(?:int|long|double|float|char|bool|size_t|auto|unsigned)\s*\*?\s*([A-Za-z_]\w*)\s*[=;\[]",
            ]),
        };
        tables.insert(Language::C, c_like(&[r"\bstruct\s+([A-Za-z_]\w*)\s*\{"]));
        tables.insert(
            Language::Cpp,
            c_like(&[r"\b(?:class|struct)\s+([A-Za-z_]\w*)\s*(?::[^{;]*)?\{"]),
        );
        tables.insert(
            Language::Rust,
            ElementTable {
                functions: compile(&[r"\bfn\s+([A-Za-z_]\w*)"]),
                classes: compile(&[r"\b(?:struct|enum|trait|union)\s+([A-Za-z_]\w*)"]),
                imports: compile(&[r"(?m)^\s*(?:pub\s+)?use\s+([\w:]+)"]),
                variables: compile(&[r"\blet\s+(?:mut\s+)?([A-Za-z_]\w*)"]),
            },
        );
        tables.insert(
            Language::Go,
            ElementTable {
                functions: compile(&[r"\bfunc\s+(?:\([^)]*\)\s*)?([A-Za-z_]\w*)\s*\("]),
                classes: compile(&[r"\btype\s+([A-Za-z_]\w*)\s+(?:struct|interface)\b"]),
                imports: compile(&[
                    r#"(?m)^\s*import\s+(?:\w+\s+)?"([^"]+)""#,
                    r#"(?m)^\s*(?:\w+\s+)?"([\w./-]+)"\s*$"#,
                ]),
                variables: compile(&[r"\b([A-Za-z_]\w*)\s*:=", r"\bvar\s+([A-Za-z_]\w*)"]),
            },
        );
        tables
    };
}

/// Identifiers extracted from source code
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeElements {
    pub functions: BTreeSet<String>,
    pub classes: BTreeSet<String>,
    pub imports: BTreeSet<String>,
    pub variables: BTreeSet<String>,
}

impl CodeElements {
    fn of(&self, kind: ElementKind) -> &BTreeSet<String> {
        match kind {
            ElementKind::Function => &self.functions,
            ElementKind::Class => &self.classes,
            ElementKind::Import => &self.imports,
            ElementKind::Variable => &self.variables,
        }
    }
}

fn collect(patterns: &[Regex], code: &str) -> BTreeSet<String> {
    patterns
        .iter()
        .flat_map(|pattern| pattern.captures_iter(code))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .filter(|name| !CONTROL_WORDS.contains(&name.as_str()))
        .collect()
}

/// Extracts function, class, import, and variable names
pub fn extract_elements(code: &str, language: Language) -> CodeElements {
    let Some(table) = TABLES.get(&language) else {
        return CodeElements::default();
    };
    CodeElements {
        functions: collect(&table.functions, code),
        classes: collect(&table.classes, code),
        imports: collect(&table.imports, code),
        variables: collect(&table.variables, code),
    }
}

/// Non-trivial names present in `original` but absent from `output`, grouped by kind
pub fn missing_elements(
    original: &CodeElements,
    output: &CodeElements,
) -> Vec<(ElementKind, Vec<String>)> {
    [
        ElementKind::Function,
        ElementKind::Class,
        ElementKind::Import,
        ElementKind::Variable,
    ]
    .into_iter()
    .filter_map(|kind| {
        let names: Vec<String> = original
            .of(kind)
            .difference(output.of(kind))
            .filter(|name| !is_trivial(name))
            .filter(|name| kind == ElementKind::Variable || !output.contains_any(name))
            .cloned()
            .collect();
        (!names.is_empty()).then_some((kind, names))
    })
    .collect()
}

impl CodeElements {
    /// A function turned into a method or an arrow binding still counts as present
    fn contains_any(&self, name: &str) -> bool {
        self.functions.contains(name) || self.classes.contains(name) || self.variables.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_javascript_elements() {
        let code = r#"import { sum } from "./math";
const lodash = require('lodash');
function total(xs) { return sum(xs); }
const double = (x) => x * 2;
class Cart {
  addItem(item) {
    this.items.push(item);
  }
}
"#;
        let elements = extract_elements(code, Language::JavaScript);
        assert!(elements.functions.contains("total"));
        assert!(elements.functions.contains("double"));
        assert!(elements.functions.contains("addItem"));
        assert!(elements.classes.contains("Cart"));
        assert!(elements.imports.contains("./math"));
        assert!(elements.imports.contains("lodash"));
        assert!(!elements.functions.contains("if"));
    }

    #[test]
    fn test_python_elements() {
        let code = "import os\nfrom collections import Counter\n\nclass Tally:\n    def add(self, x):\n        total = x\n";
        let elements = extract_elements(code, Language::Python);
        assert!(elements.imports.contains("os"));
        assert!(elements.imports.contains("collections"));
        assert!(elements.classes.contains("Tally"));
        assert!(elements.functions.contains("add"));
        assert!(elements.variables.contains("total"));
    }

    #[test]
    fn test_java_and_c_elements() {
        let java = "import java.util.List;\npublic class Finder {\n    @Override\n    public int find(List<Integer> xs) {\n        if (xs.isEmpty()) {\n            return -1;\n        }\n        return 0;\n    }\n}\n";
        let elements = extract_elements(java, Language::Java);
        assert!(elements.imports.contains("java.util.List"));
        assert!(elements.classes.contains("Finder"));
        assert!(elements.functions.contains("find"));

        let c = "#include <stdio.h>\nstatic int *lookup(int key) {\n    return 0;\n}\n";
        let elements = extract_elements(c, Language::C);
        assert!(elements.imports.contains("stdio.h"));
        assert!(elements.functions.contains("lookup"));
    }

    #[test]
    fn test_missing_function_reported() {
        let original = extract_elements(
            "function calculateTotal(a) {}\nfunction formatPrice(p) {}\n",
            Language::JavaScript,
        );
        let output = extract_elements("function calculateTotal(a) {}\n", Language::JavaScript);
        let missing = missing_elements(&original, &output);
        assert_eq!(missing, vec![(ElementKind::Function, vec!["formatPrice".to_string()])]);
    }

    #[test]
    fn test_trivial_names_not_counted() {
        let original = extract_elements("let i = 0;\nlet tmp = 1;\n", Language::JavaScript);
        let output = extract_elements("", Language::JavaScript);
        assert!(missing_elements(&original, &output).is_empty());
    }

    #[test]
    fn test_function_rewritten_as_arrow_is_present() {
        let original = extract_elements("function square(v) { return v * v; }", Language::JavaScript);
        let output = extract_elements("const square = (v) => v * v;", Language::JavaScript);
        assert!(missing_elements(&original, &output).is_empty());
    }
}
