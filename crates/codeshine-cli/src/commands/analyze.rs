// Print the static analysis of a source file

use async_trait::async_trait;
use codeshine_analysis::{StaticAnalysis, StaticAnalyzer};
use codeshine_config::AppConfig;
use codeshine_pipeline::PipelineSettings;
use tracing::debug;

use crate::commands::{read_source, resolve_language, Command};
use crate::error::CliResult;

/// Runs the static analyzer without a model
pub struct AnalyzeCommand {
    input: String,
    language: Option<String>,
    config: AppConfig,
}

impl AnalyzeCommand {
    pub fn new(input: String, config: AppConfig) -> Self {
        Self {
            input,
            language: None,
            config,
        }
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    /// Analyzes `code` with the configured chunking thresholds
    pub fn analyze(&self, code: &str) -> StaticAnalysis {
        let language = resolve_language(&self.input, self.language.as_deref());
        debug!(language = %language, chars = code.len(), "Analyzing source");
        let settings = PipelineSettings::from_config(&self.config);
        StaticAnalyzer::with_config(settings.analyzer_config()).analyze(code, &language)
    }
}

#[async_trait]
impl Command for AnalyzeCommand {
    async fn execute(&self) -> CliResult<()> {
        let code = read_source(&self.input)?;
        let analysis = self.analyze(&code);
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        Ok(())
    }
}
