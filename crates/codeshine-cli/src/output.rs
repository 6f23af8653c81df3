// Output formatting and styling

use codeshine_generation::OptimizationResult;
use colored::Colorize;

/// Output styling configuration
///
/// Everything except the final code goes to stderr, so colors follow stderr.
pub struct OutputStyle {
    pub use_colors: bool,
}

impl Default for OutputStyle {
    fn default() -> Self {
        Self {
            use_colors: atty::is(atty::Stream::Stderr),
        }
    }
}

impl OutputStyle {
    /// Format success message
    pub fn success(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "✓".green().bold(), msg)
        } else {
            format!("✓ {}", msg)
        }
    }

    /// Format error message
    pub fn error(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "✗".red().bold(), msg)
        } else {
            format!("✗ {}", msg)
        }
    }

    /// Format warning message
    pub fn warning(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "⚠".yellow(), msg)
        } else {
            format!("⚠ {}", msg)
        }
    }

    /// Format info message
    pub fn info(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "ℹ".blue(), msg)
        } else {
            format!("ℹ {}", msg)
        }
    }

    /// Live preview text, dimmed so it reads as provisional
    pub fn preview(&self, text: &str) -> String {
        if self.use_colors {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    /// Format a key-value pair
    pub fn key_value(&self, key: &str, value: &str) -> String {
        if self.use_colors {
            format!("  {}: {}", key.bold(), value)
        } else {
            format!("  {}: {}", key, value)
        }
    }

    /// Format a section header
    pub fn section(&self, title: &str) -> String {
        if self.use_colors {
            format!(
                "\n{}\n{}",
                title.bold().underline(),
                "─".repeat(title.len())
            )
        } else {
            format!("\n{}\n{}", title, "─".repeat(title.len()))
        }
    }

    /// Human summary of a finished optimization
    pub fn result_summary(&self, result: &OptimizationResult) -> String {
        let mut lines = vec![self.section("Optimization")];
        if result.no_change {
            lines.push(self.info(&result.explanation));
        } else {
            lines.push(self.success(&result.explanation));
        }
        lines.push(self.key_value(
            "Algorithm",
            &format!("{} -> {}", result.algorithm_before, result.algorithm_after),
        ));
        lines.push(self.key_value(
            "Complexity",
            &format!("{} -> {}", result.complexity_before, result.complexity_after),
        ));
        lines.push(self.key_value("Bottleneck", &result.bottleneck));
        lines.push(self.key_value("Strategy", &result.strategy));
        lines.push(self.key_value("Tradeoffs", &result.tradeoffs));
        lines.push(self.key_value("Confidence", &format!("{}%", result.confidence)));
        lines.push(self.key_value("Similarity", &format!("{}%", result.similarity)));
        if let Some(warning) = &result.parse_warning {
            lines.push(self.warning(warning));
        }
        lines.join("\n")
    }
}

pub fn print_error(msg: &str) {
    let style = OutputStyle::default();
    eprintln!("{}", style.error(msg));
}

pub fn print_warning(msg: &str) {
    let style = OutputStyle::default();
    eprintln!("{}", style.warning(msg));
}

pub fn print_info(msg: &str) {
    let style = OutputStyle::default();
    eprintln!("{}", style.info(msg));
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeshine_analysis::analyze;

    #[test]
    fn test_output_style_without_colors() {
        let style = OutputStyle { use_colors: false };
        assert_eq!(style.success("test"), "✓ test");
        assert_eq!(style.error("test"), "✗ test");
        assert_eq!(style.warning("test"), "⚠ test");
        assert_eq!(style.info("test"), "ℹ test");
        assert_eq!(style.preview("let x"), "let x");
    }

    #[test]
    fn test_section_formatting() {
        let style = OutputStyle { use_colors: false };
        let result = style.section("Optimization");
        assert!(result.contains("Optimization"));
        assert!(result.contains("─"));
    }

    #[test]
    fn test_fallback_summary_carries_warning() {
        let style = OutputStyle { use_colors: false };
        let code = "x = 1\n";
        let analysis = analyze(code, "python");
        let result = OptimizationResult::fallback(code, &analysis, "no code block found");

        let summary = style.result_summary(&result);
        assert!(summary.contains("Confidence: 0%"));
        assert!(summary.contains("⚠ no code block found"));
    }
}
