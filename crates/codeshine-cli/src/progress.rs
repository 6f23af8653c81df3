//! Spinner shown while a model call is outstanding

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::warn;

const FRAMES: &[&str] = &["⠁", "⠂", "⠄", "⡀", "⢀", "⠠", "⠐", "⠈", "✓"];
const TICK: Duration = Duration::from_millis(100);
const TEMPLATE: &str = "{spinner:.cyan} {prefix:.bold} {msg} {elapsed:.dim}";

/// Spinner labelled with the model being waited on
pub fn model_spinner(model: &str, message: &str) -> ProgressBar {
    let style = ProgressStyle::with_template(TEMPLATE)
        .map(|style| style.tick_strings(FRAMES))
        .unwrap_or_else(|e| {
            warn!(error = %e, "Invalid spinner template; using the default");
            ProgressStyle::default_spinner()
        });
    let spinner = ProgressBar::new_spinner()
        .with_style(style)
        .with_prefix(model.to_string())
        .with_message(message.to_string());
    spinner.enable_steady_tick(TICK);
    spinner
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_carries_model_and_message() {
        let spinner = model_spinner("qwen2.5-coder:1.5b", "Waiting for the model");
        assert_eq!(spinner.prefix(), "qwen2.5-coder:1.5b");
        assert_eq!(spinner.message(), "Waiting for the model");
        spinner.finish_and_clear();
        assert!(spinner.is_finished());
    }
}
