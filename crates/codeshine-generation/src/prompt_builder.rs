//! Prompt building for code optimization
//!
//! Prompts are plain text ending in an `Output:` cursor so the model has
//! nothing to continue except code. Retries use progressively simpler prompts:
//! a retry never adds context, it only trades context for compliance.

use std::fmt;
use std::str::FromStr;

use codeshine_analysis::{Language, StaticAnalysis};
use serde::{Deserialize, Serialize};

use crate::few_shot::example_for;

/// Fixed system instruction, principles in priority order
pub const SYSTEM_INSTRUCTION: &str = "You are a careful code optimizer. Follow these rules in order:
1. Preserve behavior. Never change what the code computes or returns.
2. Keep every function, class, and import. Do not rename public names.
3. Make the smallest change that fixes the real problem.
4. Prefer standard library tools over hand-written replacements.
5. Return the complete code in one fenced code block and nothing else.";

/// Directive appended when the previous output looked cut off
pub const COMPLETION_DIRECTIVE: &str =
    "Return the complete code from the first line to the last. Do not stop early and do not abbreviate with `...`.";

/// Final line of every prompt
pub const OUTPUT_CURSOR: &str = "Output:";

/// What the caller wants improved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Focus {
    Performance,
    Readability,
    Security,
    BestPractices,
    #[default]
    All,
}

impl Focus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Focus::Performance => "performance",
            Focus::Readability => "readability",
            Focus::Security => "security",
            Focus::BestPractices => "best-practices",
            Focus::All => "all",
        }
    }

    /// Canonical phrasing placed in the task block
    pub fn hint(&self) -> &'static str {
        match self {
            Focus::Performance => {
                "Focus on performance: reduce time complexity and remove repeated work."
            }
            Focus::Readability => {
                "Focus on readability: simplify control flow and use clear names for new locals."
            }
            Focus::Security => {
                "Focus on security: validate inputs and remove unsafe operations."
            }
            Focus::BestPractices => {
                "Focus on best practices: use idiomatic constructs of the language."
            }
            Focus::All => {
                "Improve performance first, then readability, without changing behavior."
            }
        }
    }
}

impl fmt::Display for Focus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Focus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "performance" | "perf" => Ok(Focus::Performance),
            "readability" => Ok(Focus::Readability),
            "security" => Ok(Focus::Security),
            "best-practices" | "bestpractices" => Ok(Focus::BestPractices),
            "all" => Ok(Focus::All),
            other => Err(format!("Unknown focus: {}", other)),
        }
    }
}

/// Prompt strength for a retry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationLevel {
    /// Structured prompt with analysis and a few-shot example
    Full,
    /// Bare instruction to optimize and return fenced code
    Bare,
    /// Bare instruction that also forbids explanation and truncation
    Strict,
}

impl EscalationLevel {
    /// Level for the given retry count; 0 is the first attempt
    pub fn for_retry(retry: usize) -> Self {
        match retry {
            0 => EscalationLevel::Full,
            1 => EscalationLevel::Bare,
            _ => EscalationLevel::Strict,
        }
    }

    /// Next level, or `None` when already strict
    pub fn next(&self) -> Option<Self> {
        match self {
            EscalationLevel::Full => Some(EscalationLevel::Bare),
            EscalationLevel::Bare => Some(EscalationLevel::Strict),
            EscalationLevel::Strict => None,
        }
    }
}

/// Per-call prompt options beyond code, analysis, and focus
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptOptions {
    /// Escalation level; `None` means a first attempt
    pub strengthen: Option<EscalationLevel>,
    /// Trailing lines of the previous chunk, shown as read-only context
    pub overlap: Option<String>,
    /// Ask explicitly for complete output
    pub require_complete: bool,
}

impl PromptOptions {
    pub fn strengthened(level: EscalationLevel) -> Self {
        Self {
            strengthen: Some(level),
            ..Default::default()
        }
    }

    fn level(&self) -> EscalationLevel {
        self.strengthen.unwrap_or(EscalationLevel::Full)
    }
}

/// Builds optimization prompts
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Builds a prompt, optionally at a strengthened escalation level
    pub fn build(
        &self,
        code: &str,
        analysis: &StaticAnalysis,
        focus: Focus,
        strengthen: Option<EscalationLevel>,
    ) -> String {
        self.build_with(
            code,
            analysis,
            focus,
            &PromptOptions {
                strengthen,
                ..Default::default()
            },
        )
    }

    /// Builds a prompt with full options
    pub fn build_with(
        &self,
        code: &str,
        analysis: &StaticAnalysis,
        focus: Focus,
        options: &PromptOptions,
    ) -> String {
        let language = Language::from_name(&analysis.language).unwrap_or(Language::JavaScript);

        let mut sections = match options.level() {
            EscalationLevel::Full => vec![
                SYSTEM_INSTRUCTION.to_string(),
                few_shot_section(language),
                task_section(code, analysis, focus, language, options),
            ],
            EscalationLevel::Bare => vec![bare_section(code, language, options, false)],
            EscalationLevel::Strict => vec![bare_section(code, language, options, true)],
        };
        sections.push(OUTPUT_CURSOR.to_string());
        sections.join("\n\n")
    }
}

fn fenced(code: &str, language: Language) -> String {
    format!(
        "```{}\n{}\n```",
        language.fence_tag(),
        code.trim_end_matches(['\n', '\r'])
    )
}

fn few_shot_section(language: Language) -> String {
    let example = example_for(language);
    format!(
        "Example ({}):\nInput:\n{}\nOutput:\n{}",
        language,
        fenced(example.before, language),
        fenced(example.after, language)
    )
}

fn overlap_section(overlap: &str, language: Language) -> Option<String> {
    if overlap.trim().is_empty() {
        return None;
    }
    let comment = language.line_comment();
    let context = overlap
        .lines()
        .map(|line| format!("{} {}", comment, line))
        .collect::<Vec<_>>()
        .join("\n");
    Some(format!(
        "Preceding code for context only. Do not repeat it:\n{}",
        context
    ))
}

fn analysis_summary(analysis: &StaticAnalysis) -> String {
    let mut lines = vec![format!(
        "Analysis: {} lines, estimated complexity {}, algorithm {}.",
        analysis.line_count,
        analysis.estimated_complexity,
        analysis.algorithm_label()
    )];
    for pattern in &analysis.detected_patterns {
        match pattern.line_hint {
            Some(line) => lines.push(format!("- {} (line {})", pattern.description, line)),
            None => lines.push(format!("- {}", pattern.description)),
        }
    }
    for suggestion in &analysis.possible_optimizations {
        lines.push(format!("Suggested: {}", suggestion.action));
    }
    lines.join("\n")
}

fn task_section(
    code: &str,
    analysis: &StaticAnalysis,
    focus: Focus,
    language: Language,
    options: &PromptOptions,
) -> String {
    let mut parts = vec![
        "Task:".to_string(),
        focus.hint().to_string(),
        analysis_summary(analysis),
    ];
    if let Some(context) = options
        .overlap
        .as_deref()
        .and_then(|o| overlap_section(o, language))
    {
        parts.push(context);
    }
    parts.push(format!("Optimize this {} code:", language));
    parts.push(fenced(code, language));
    if options.require_complete {
        parts.push(COMPLETION_DIRECTIVE.to_string());
    }
    parts.join("\n")
}

fn bare_section(code: &str, language: Language, options: &PromptOptions, strict: bool) -> String {
    let mut parts = vec![format!(
        "Optimize this {} code and return it in a ```{} fenced code block.",
        language,
        language.fence_tag()
    )];
    if strict {
        parts.push(
            "Return only code. No explanation. Do not truncate; include every function in full."
                .to_string(),
        );
    }
    if let Some(context) = options
        .overlap
        .as_deref()
        .and_then(|o| overlap_section(o, language))
    {
        parts.push(context);
    }
    parts.push(fenced(code, language));
    if options.require_complete {
        parts.push(COMPLETION_DIRECTIVE.to_string());
    }
    parts.join("\n")
}
