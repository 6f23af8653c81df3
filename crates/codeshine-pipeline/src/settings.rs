//! Runtime settings derived from configuration

use std::time::Duration;

use codeshine_analysis::AnalyzerConfig;
use codeshine_config::AppConfig;
use codeshine_providers::GenerationOptions;

/// Knobs the orchestrator reads on every run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub generation: GenerationOptions,
    /// Wall-clock limit for one inference call
    pub call_timeout: Duration,
    pub chunk_threshold: usize,
    pub overlap_lines: usize,
    pub max_truncation_retries: usize,
    /// Preview text is flushed at most this often
    pub flush_window: Duration,
    pub inter_chunk_yield: bool,
}

impl PipelineSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            generation: GenerationOptions {
                max_tokens: config.inference.max_tokens,
                temperature: config.inference.temperature,
                top_p: config.inference.top_p,
            },
            call_timeout: Duration::from_secs(config.inference.timeout_secs),
            chunk_threshold: config.pipeline.chunk_threshold_chars,
            overlap_lines: config.pipeline.overlap_lines,
            max_truncation_retries: config.pipeline.max_truncation_retries,
            flush_window: Duration::from_millis(config.pipeline.stream_flush_ms),
            inter_chunk_yield: config.pipeline.inter_chunk_yield,
        }
    }

    pub fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            chunk_threshold: self.chunk_threshold,
            overlap_lines: self.overlap_lines,
            ..AnalyzerConfig::default()
        }
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let mut config = AppConfig::default();
        config.inference.timeout_secs = 30;
        config.pipeline.chunk_threshold_chars = 1000;

        let settings = PipelineSettings::from_config(&config);
        assert_eq!(settings.call_timeout, Duration::from_secs(30));
        assert_eq!(settings.analyzer_config().chunk_threshold, 1000);
        assert_eq!(settings.generation.max_tokens, 2048);
        assert_eq!(settings.flush_window, Duration::from_millis(50));
    }
}
