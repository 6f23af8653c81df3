// Run the optimization pipeline on a source file

use std::sync::Arc;

use async_trait::async_trait;
use codeshine_config::AppConfig;
use codeshine_generation::{Focus, OptimizationResult};
use codeshine_pipeline::{
    OptimizationRequest, PipelineEvent, PipelineOrchestrator, PipelineSettings, Stage,
};
use codeshine_providers::{InferenceProvider, OllamaProvider, ScriptedProvider};
use indicatif::ProgressBar;
use tracing::{debug, info, warn};

use crate::commands::{read_source, resolve_language, Command};
use crate::error::{CliError, CliResult};
use crate::logging::VerbosityLevel;
use crate::output::OutputStyle;
use crate::progress::model_spinner;

/// Optimizes one file, streaming a preview to stderr
pub struct OptimizeCommand {
    input: String,
    language: Option<String>,
    focus: Focus,
    fast: bool,
    model: Option<String>,
    json: bool,
    dry_run: bool,
    config: AppConfig,
    verbosity: VerbosityLevel,
}

impl OptimizeCommand {
    pub fn new(input: String, config: AppConfig, verbosity: VerbosityLevel) -> Self {
        Self {
            input,
            language: None,
            focus: Focus::default(),
            fast: false,
            model: None,
            json: false,
            dry_run: false,
            config,
            verbosity,
        }
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    pub fn with_focus(mut self, focus: Focus) -> Self {
        self.focus = focus;
        self
    }

    pub fn with_fast(mut self, fast: bool) -> Self {
        self.fast = fast;
        self
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    fn model_name(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| self.config.inference.model.clone())
    }

    async fn build_provider(&self) -> CliResult<Arc<dyn InferenceProvider>> {
        if self.dry_run {
            info!("Dry run: echoing input instead of calling a model");
            return Ok(Arc::new(ScriptedProvider::echo()));
        }

        let url = self.config.inference.base_url.clone();
        let model = self.model_name();
        let provider = OllamaProvider::new(url.clone(), model.clone())?;
        match provider.health_check().await {
            Ok(true) => Ok(Arc::new(provider)),
            Ok(false) => Err(CliError::ServerUnavailable { url, model }),
            Err(e) => {
                debug!(error = %e, "Health check failed");
                Err(CliError::ServerUnavailable { url, model })
            }
        }
    }

    /// Runs the pipeline over `code` and returns the final result
    ///
    /// Ctrl-C cancels the run; the pipeline then reports `Cancelled`.
    pub async fn run(&self, code: String) -> CliResult<OptimizationResult> {
        let provider = self.build_provider().await?;
        let settings = PipelineSettings::from_config(&self.config);
        let orchestrator = Arc::new(PipelineOrchestrator::new(provider, settings));

        let request = OptimizationRequest::new(code)
            .with_language(resolve_language(&self.input, self.language.as_deref()))
            .with_focus(self.focus)
            .fast(self.fast);

        let mut run = orchestrator.start(request)?;
        debug!(request_id = %run.request_id, "Pipeline started");

        let label = if self.dry_run {
            "dry run".to_string()
        } else {
            self.model_name()
        };
        let mut renderer = EventRenderer::new(
            OutputStyle::default(),
            label,
            self.verbosity.shows_progress(),
        );
        let mut interrupted = false;
        loop {
            tokio::select! {
                event = run.events.recv() => match event {
                    Some(event) => {
                        renderer.render(&event);
                        if event.is_terminal() {
                            break;
                        }
                    }
                    None => break,
                },
                signal = tokio::signal::ctrl_c(), if !interrupted => {
                    if let Err(e) = signal {
                        warn!(error = %e, "Could not listen for Ctrl-C");
                    }
                    interrupted = true;
                    renderer.note("Cancelling");
                    run.cancel();
                }
            }
        }
        renderer.finish();

        Ok(run.wait().await?)
    }

    fn print_result(&self, result: &OptimizationResult) -> CliResult<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(result)?);
            return Ok(());
        }
        if self.verbosity.shows_progress() {
            eprintln!("{}", OutputStyle::default().result_summary(result));
        }
        let code = &result.optimized_code;
        if code.ends_with('\n') {
            print!("{}", code);
        } else {
            println!("{}", code);
        }
        Ok(())
    }
}

#[async_trait]
impl Command for OptimizeCommand {
    async fn execute(&self) -> CliResult<()> {
        let code = read_source(&self.input)?;
        let result = self.run(code).await?;
        self.print_result(&result)
    }
}

/// Turns pipeline events into progress lines and a live preview on stderr
struct EventRenderer {
    style: OutputStyle,
    model: String,
    enabled: bool,
    spinner: Option<ProgressBar>,
    preview_open: bool,
}

impl EventRenderer {
    fn new(style: OutputStyle, model: String, enabled: bool) -> Self {
        Self {
            style,
            model,
            enabled,
            spinner: None,
            preview_open: false,
        }
    }

    fn render(&mut self, event: &PipelineEvent) {
        if !self.enabled {
            return;
        }
        match event {
            PipelineEvent::Stage { stage } => match stage {
                Stage::Generating => self.spin("Waiting for the model"),
                Stage::Analyzing => self.line(self.style.info("Analyzing code")),
                Stage::Chunking => self.line(self.style.info("Splitting into chunks")),
                Stage::Validating => self.line(self.style.info("Validating output")),
                Stage::Retrying => self.line(self.style.warning("Retrying")),
                Stage::Idle | Stage::Done | Stage::Failed => {}
            },
            PipelineEvent::Substage { message } => self.line(self.style.info(message)),
            PipelineEvent::ChunkProgress { current, total } => {
                self.line(self.style.info(&format!("Chunk {}/{}", current, total)))
            }
            PipelineEvent::StreamActive => {}
            PipelineEvent::Chunk { text } => {
                self.clear_spinner();
                eprint!("{}", self.style.preview(text));
                self.preview_open = true;
            }
            PipelineEvent::StreamIdle => {
                self.clear_spinner();
                self.close_preview();
            }
            PipelineEvent::RetryClear => {
                self.line(self.style.warning("Discarding preview"));
            }
            PipelineEvent::Done { metrics, .. } => self.line(self.style.success(&format!(
                "Finished in {} ms ({} model calls, {} chunks)",
                metrics.elapsed_ms, metrics.attempts, metrics.chunks
            ))),
            PipelineEvent::Error { .. } => self.finish(),
        }
    }

    fn note(&mut self, message: &str) {
        if self.enabled {
            self.line(self.style.warning(message));
        }
    }

    fn line(&mut self, text: String) {
        self.clear_spinner();
        self.close_preview();
        eprintln!("{}", text);
    }

    fn spin(&mut self, message: &str) {
        match &self.spinner {
            Some(spinner) => spinner.set_message(message.to_string()),
            None => self.spinner = Some(model_spinner(&self.model, message)),
        }
    }

    fn clear_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn close_preview(&mut self) {
        if self.preview_open {
            eprintln!();
            self.preview_open = false;
        }
    }

    fn finish(&mut self) {
        self.clear_spinner();
        self.close_preview();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dry_run(input: &str) -> OptimizeCommand {
        OptimizeCommand::new(input.to_string(), AppConfig::default(), VerbosityLevel::Quiet)
            .with_dry_run(true)
    }

    #[tokio::test]
    async fn test_dry_run_returns_input() {
        let code = "function add(a, b) {\n  return a + b;\n}\n";
        let result = dry_run("add.js").run(code.to_string()).await.unwrap();
        assert!(result.no_change);
        assert_eq!(result.optimized_code, code);
    }

    #[tokio::test]
    async fn test_blank_input_is_rejected() {
        let err = dry_run("-").run("   \n".to_string()).await.unwrap_err();
        assert!(matches!(err, CliError::Pipeline(_)));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_reported() {
        let mut config = AppConfig::default();
        config.inference.base_url = "http://127.0.0.1:9".to_string();
        let cmd = OptimizeCommand::new("a.py".to_string(), config, VerbosityLevel::Quiet)
            .with_model(Some("tiny".to_string()));

        let err = cmd.run("x = 1\n".to_string()).await.unwrap_err();
        match err {
            CliError::ServerUnavailable { url, model } => {
                assert_eq!(url, "http://127.0.0.1:9");
                assert_eq!(model, "tiny");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_model_override() {
        let cmd = dry_run("-").with_model(Some("codellama:7b".to_string()));
        assert_eq!(cmd.model_name(), "codellama:7b");
        assert_eq!(dry_run("-").model_name(), "qwen2.5-coder:1.5b");
    }
}
