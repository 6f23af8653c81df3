//! Few-shot examples, one per supported language
//!
//! Each example is a minimal before/after pair in the language's own syntax.
//! They anchor the output format more than they teach optimization.

use codeshine_analysis::Language;

/// Worked before/after sample embedded in prompts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FewShotExample {
    pub language: Language,
    pub before: &'static str,
    pub after: &'static str,
}

const JAVASCRIPT: FewShotExample = FewShotExample {
    language: Language::JavaScript,
    before: "function hasDuplicate(items) {
  for (let i = 0; i < items.length; i++) {
    for (let j = i + 1; j < items.length; j++) {
      if (items[i] === items[j]) return true;
    }
  }
  return false;
}",
    after: "function hasDuplicate(items) {
  const seen = new Set();
  for (const item of items) {
    if (seen.has(item)) return true;
    seen.add(item);
  }
  return false;
}",
};

const TYPESCRIPT: FewShotExample = FewShotExample {
    language: Language::TypeScript,
    before: "function joinNames(users: { name: string }[]): string {
  let out = '';
  for (let i = 0; i < users.length; i++) {
    if (i > 0) out += ', ';
    out += users[i].name;
  }
  return out;
}",
    after: "function joinNames(users: { name: string }[]): string {
  return users.map((user) => user.name).join(', ');
}",
};

const PYTHON: FewShotExample = FewShotExample {
    language: Language::Python,
    before: "def common(a, b):
    result = []
    for x in a:
        if x in b:
            result.append(x)
    return result",
    after: "def common(a, b):
    lookup = set(b)
    return [x for x in a if x in lookup]",
};

const JAVA: FewShotExample = FewShotExample {
    language: Language::Java,
    before: "public static int countMatches(List<String> words, List<String> targets) {
    int count = 0;
    for (String w : words) {
        if (targets.contains(w)) count++;
    }
    return count;
}",
    after: "public static int countMatches(List<String> words, List<String> targets) {
    Set<String> lookup = new HashSet<>(targets);
    int count = 0;
    for (String w : words) {
        if (lookup.contains(w)) count++;
    }
    return count;
}",
};

const C: FewShotExample = FewShotExample {
    language: Language::C,
    before: "int sum(const int *values, int n) {
    int total = 0;
    for (int i = 0; i < n; i++) {
        total = total + values[i];
    }
    return total;
}",
    after: "int sum(const int *values, int n) {
    int total = 0;
    for (int i = 0; i < n; i++) {
        total += values[i];
    }
    return total;
}",
};

const CPP: FewShotExample = FewShotExample {
    language: Language::Cpp,
    before: "bool contains(const std::vector<int>& values, int target) {
    for (size_t i = 0; i < values.size(); i++) {
        if (values[i] == target) return true;
    }
    return false;
}",
    after: "bool contains(const std::vector<int>& values, int target) {
    return std::find(values.begin(), values.end(), target) != values.end();
}",
};

const RUST: FewShotExample = FewShotExample {
    language: Language::Rust,
    before: "fn total_len(words: &Vec<String>) -> usize {
    let mut total = 0;
    for i in 0..words.len() {
        total = total + words[i].len();
    }
    total
}",
    after: "fn total_len(words: &[String]) -> usize {
    words.iter().map(|w| w.len()).sum()
}",
};

const GO: FewShotExample = FewShotExample {
    language: Language::Go,
    before: "func unique(items []string) []string {
\tout := []string{}
\tfor _, item := range items {
\t\tfound := false
\t\tfor _, o := range out {
\t\t\tif o == item {
\t\t\t\tfound = true
\t\t\t}
\t\t}
\t\tif !found {
\t\t\tout = append(out, item)
\t\t}
\t}
\treturn out
}",
    after: "func unique(items []string) []string {
\tseen := make(map[string]struct{}, len(items))
\tout := make([]string, 0, len(items))
\tfor _, item := range items {
\t\tif _, ok := seen[item]; !ok {
\t\t\tseen[item] = struct{}{}
\t\t\tout = append(out, item)
\t\t}
\t}
\treturn out
}",
};

/// Example for the given language
pub fn example_for(language: Language) -> &'static FewShotExample {
    match language {
        Language::JavaScript => &JAVASCRIPT,
        Language::TypeScript => &TYPESCRIPT,
        Language::Python => &PYTHON,
        Language::Java => &JAVA,
        Language::C => &C,
        Language::Cpp => &CPP,
        Language::Rust => &RUST,
        Language::Go => &GO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_language_has_example() {
        for language in Language::all() {
            let example = example_for(*language);
            assert_eq!(example.language, *language);
            assert_ne!(example.before, example.after);
        }
    }
}
