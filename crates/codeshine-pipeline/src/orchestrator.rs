//! Pipeline orchestrator
//!
//! Runs one request at a time: analyze, optionally chunk, then for each piece
//! build a prompt, stream a completion, and validate it. Two bounded retry
//! ladders sit around each inference call. Empty output escalates the prompt
//! from full to bare to strict and then fails the run. Output that looks cut
//! off is retried with a completion directive, except in fast mode.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use codeshine_analysis::{Language, StaticAnalysis, StaticAnalyzer};
use codeshine_generation::{
    extract_code, looks_truncated, EscalationLevel, Focus, OptimizationResult, OutputValidator,
    PromptBuilder, PromptOptions,
};
use codeshine_providers::{FinishReason, GenerationHandle, InferenceProvider};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::assembly::{assemble_chunks, ChunkOutcome};
use crate::error::{PipelineError, Result};
use crate::events::{EventSink, PipelineEvent, RunMetrics, Stage};
use crate::request::OptimizationRequest;
use crate::settings::PipelineSettings;

/// Releases the single-flight flag when dropped
struct BusyGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Per-request state threaded through the call chain
struct RunContext {
    request_id: Uuid,
    focus: Focus,
    fast_mode: bool,
    language: Language,
    events: EventSink,
    cancel: CancellationToken,
    attempts: usize,
    chunks: usize,
}

/// A run spawned onto the runtime
pub struct PipelineRun {
    pub request_id: Uuid,
    /// Progress, preview, and the terminal event
    pub events: mpsc::UnboundedReceiver<PipelineEvent>,
    cancel: CancellationToken,
    task: JoinHandle<Result<OptimizationResult>>,
}

impl PipelineRun {
    /// Requests cooperative cancellation
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Waits for the run to finish
    pub async fn wait(self) -> Result<OptimizationResult> {
        self.task
            .await
            .map_err(|e| PipelineError::Internal(e.to_string()))?
    }
}

/// Coordinates analysis, prompting, inference, and validation
pub struct PipelineOrchestrator {
    provider: Arc<dyn InferenceProvider>,
    analyzer: StaticAnalyzer,
    prompts: PromptBuilder,
    validator: OutputValidator,
    settings: PipelineSettings,
    busy: Arc<AtomicBool>,
    stage: Arc<Mutex<Stage>>,
}

impl PipelineOrchestrator {
    pub fn new(provider: Arc<dyn InferenceProvider>, settings: PipelineSettings) -> Self {
        Self {
            provider,
            analyzer: StaticAnalyzer::with_config(settings.analyzer_config()),
            prompts: PromptBuilder::new(),
            validator: OutputValidator::new(),
            settings,
            busy: Arc::new(AtomicBool::new(false)),
            stage: Arc::new(Mutex::new(Stage::Idle)),
        }
    }

    pub fn with_validator(mut self, validator: OutputValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn provider(&self) -> &Arc<dyn InferenceProvider> {
        &self.provider
    }

    /// Current phase; `Idle` between runs
    pub fn stage(&self) -> Stage {
        self.stage.lock().map(|s| *s).unwrap_or(Stage::Idle)
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn try_acquire(&self) -> Option<BusyGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard {
                flag: self.busy.clone(),
            })
    }

    fn set_stage(&self, ctx: &RunContext, stage: Stage) {
        if let Ok(mut current) = self.stage.lock() {
            *current = stage;
        }
        ctx.events.stage(stage);
    }

    fn reset_stage(&self) {
        if let Ok(mut current) = self.stage.lock() {
            *current = Stage::Idle;
        }
    }

    /// Spawns a run; fails immediately with `Busy` if one is in flight
    pub fn start(self: &Arc<Self>, request: OptimizationRequest) -> Result<PipelineRun> {
        let guard = self.try_acquire().ok_or(PipelineError::Busy)?;
        let (events, rx) = EventSink::channel();
        let cancel = CancellationToken::new();
        let request_id = Uuid::new_v4();

        let this = Arc::clone(self);
        let token = cancel.clone();
        let task = tokio::spawn(async move {
            this.execute(guard, request_id, request, events, token).await
        });

        Ok(PipelineRun {
            request_id,
            events: rx,
            cancel,
            task,
        })
    }

    /// Runs a request to completion on the current task
    ///
    /// Emits exactly one `done` or `error` event on `events`, including when
    /// the request is rejected because another run is in flight.
    pub async fn optimize(
        &self,
        request: OptimizationRequest,
        events: EventSink,
        cancel: CancellationToken,
    ) -> Result<OptimizationResult> {
        let Some(guard) = self.try_acquire() else {
            warn!("Rejecting request while another optimization is running");
            let err = PipelineError::Busy;
            events.emit(PipelineEvent::Error {
                message: err.user_message(),
                timeout: false,
            });
            return Err(err);
        };
        self.execute(guard, Uuid::new_v4(), request, events, cancel)
            .await
    }

    async fn execute(
        &self,
        guard: BusyGuard,
        request_id: Uuid,
        request: OptimizationRequest,
        events: EventSink,
        cancel: CancellationToken,
    ) -> Result<OptimizationResult> {
        let span = info_span!("optimize", request_id = %request_id);
        let started = Instant::now();
        let mut ctx = RunContext {
            request_id,
            focus: request.focus,
            fast_mode: request.fast_mode,
            language: Language::resolve(&request.language, &request.code),
            events,
            cancel,
            attempts: 0,
            chunks: 0,
        };

        let outcome = async {
            request.validate()?;
            self.run(&mut ctx, &request.code).await
        }
        .instrument(span)
        .await;

        match &outcome {
            Ok(result) => {
                let metrics = RunMetrics {
                    request_id: ctx.request_id,
                    elapsed_ms: started.elapsed().as_millis() as u64,
                    attempts: ctx.attempts,
                    chunks: ctx.chunks,
                };
                info!(
                    request_id = %ctx.request_id,
                    elapsed_ms = metrics.elapsed_ms,
                    attempts = metrics.attempts,
                    parsed = result.parsed,
                    no_change = result.no_change,
                    "Optimization finished"
                );
                self.set_stage(&ctx, Stage::Done);
                ctx.events.emit(PipelineEvent::Done {
                    result: Box::new(result.clone()),
                    metrics,
                });
            }
            Err(err) => {
                if matches!(err, PipelineError::Cancelled) {
                    info!(request_id = %ctx.request_id, "Optimization cancelled");
                } else {
                    error!(request_id = %ctx.request_id, error = %err, "Optimization failed");
                }
                self.set_stage(&ctx, Stage::Failed);
                ctx.events.emit(PipelineEvent::Error {
                    message: err.user_message(),
                    timeout: err.is_timeout(),
                });
            }
        }

        self.reset_stage();
        drop(guard);
        outcome
    }

    async fn run(&self, ctx: &mut RunContext, code: &str) -> Result<OptimizationResult> {
        self.set_stage(ctx, Stage::Analyzing);
        let analysis = self.analyzer.analyze(code, ctx.language.name());
        ctx.chunks = analysis.chunks.len();
        info!(
            language = %ctx.language,
            complexity = %analysis.estimated_complexity,
            patterns = analysis.detected_patterns.len(),
            chunks = analysis.chunks.len(),
            "Analysis complete"
        );

        if analysis.is_multi_chunk() {
            self.run_chunked(ctx, code, &analysis).await
        } else {
            self.run_single(ctx, code, &analysis).await
        }
    }

    async fn run_single(
        &self,
        ctx: &mut RunContext,
        code: &str,
        analysis: &StaticAnalysis,
    ) -> Result<OptimizationResult> {
        let first = self
            .generate_validated(ctx, code, analysis, None, EscalationLevel::Full)
            .await?;
        if !first.no_change || !analysis.has_patterns() {
            return Ok(first);
        }

        info!("No change despite detected patterns; retrying with a bare prompt");
        ctx.events
            .substage("No change found; retrying with a simpler prompt");
        self.set_stage(ctx, Stage::Retrying);
        ctx.events.emit(PipelineEvent::RetryClear);
        match self
            .generate_validated(ctx, code, analysis, None, EscalationLevel::Bare)
            .await
        {
            Ok(second) if second.has_changes() => Ok(second),
            Ok(_) => Ok(first),
            Err(PipelineError::EmptyOutput { attempts }) => {
                debug!(attempts, "Strengthened retry returned nothing; keeping first result");
                Ok(first)
            }
            Err(err) => Err(err),
        }
    }

    async fn run_chunked(
        &self,
        ctx: &mut RunContext,
        code: &str,
        analysis: &StaticAnalysis,
    ) -> Result<OptimizationResult> {
        self.set_stage(ctx, Stage::Chunking);
        let chunks = self.analyzer.split(code);
        let total = chunks.len();
        info!(total, "Processing chunks sequentially");

        let mut outcomes = Vec::with_capacity(total);
        for chunk in chunks {
            if ctx.cancel.is_cancelled() {
                return Err(PipelineError::Cancelled);
            }
            ctx.events.emit(PipelineEvent::ChunkProgress {
                current: chunk.index + 1,
                total,
            });
            debug!(chunk = chunk.index + 1, total, chars = chunk.text.len(), "Optimizing chunk");

            let chunk_analysis = self.analyzer.analyze(&chunk.text, ctx.language.name());
            let overlap = (!chunk.overlap.is_empty()).then_some(chunk.overlap.as_str());
            let result = self
                .generate_validated(ctx, &chunk.text, &chunk_analysis, overlap, EscalationLevel::Full)
                .await?;
            if result.is_fallback() {
                warn!(chunk = chunk.index + 1, "Chunk kept its original text");
            }
            outcomes.push(ChunkOutcome {
                original: chunk.text,
                result,
            });

            if self.settings.inter_chunk_yield {
                tokio::task::yield_now().await;
            }
        }

        self.set_stage(ctx, Stage::Validating);
        ctx.events.substage("Re-analyzing reassembled code");
        Ok(assemble_chunks(code, analysis, &outcomes, &self.analyzer))
    }

    /// One piece of code through both retry ladders and the validator
    async fn generate_validated(
        &self,
        ctx: &mut RunContext,
        code: &str,
        analysis: &StaticAnalysis,
        overlap: Option<&str>,
        start: EscalationLevel,
    ) -> Result<OptimizationResult> {
        let mut level = start;
        let mut truncation_retries = 0;
        let mut require_complete = false;
        let mut calls = 0;

        loop {
            let options = PromptOptions {
                strengthen: (level != EscalationLevel::Full).then_some(level),
                overlap: overlap.map(str::to_string),
                require_complete,
            };
            let prompt = self
                .prompts
                .build_with(code, analysis, ctx.focus, &options);

            if calls > 0 {
                self.set_stage(ctx, Stage::Retrying);
                ctx.events.emit(PipelineEvent::RetryClear);
            }
            self.set_stage(ctx, Stage::Generating);
            let (text, finish) = self.stream_completion(ctx, &prompt).await?;
            calls += 1;

            if text.trim().is_empty() {
                match level.next() {
                    Some(next) => {
                        warn!(attempt = calls, level = ?next, "Empty model output; escalating prompt");
                        ctx.events.substage("Empty response; retrying with a simpler prompt");
                        level = next;
                        continue;
                    }
                    None => return Err(PipelineError::EmptyOutput { attempts: calls }),
                }
            }

            if !ctx.fast_mode
                && truncation_retries < self.settings.max_truncation_retries
                && self.looks_cut_off(&text, finish, ctx.language)
            {
                truncation_retries += 1;
                warn!(
                    attempt = calls,
                    retry = truncation_retries,
                    "Model output looks truncated; asking for complete code"
                );
                ctx.events
                    .substage("Response looks cut off; asking for complete code");
                require_complete = true;
                continue;
            }

            self.set_stage(ctx, Stage::Validating);
            return Ok(self
                .validator
                .normalize(&text, code, analysis, ctx.language));
        }
    }

    fn looks_cut_off(&self, text: &str, finish: FinishReason, language: Language) -> bool {
        if finish == FinishReason::Length {
            return true;
        }
        // A missing closing fence alone is left to validation.
        extract_code(text).is_some_and(|extracted| looks_truncated(&extracted.code, language))
    }

    /// Streams one completion, relaying preview text and enforcing the call timeout
    async fn stream_completion(
        &self,
        ctx: &mut RunContext,
        prompt: &str,
    ) -> Result<(String, FinishReason)> {
        ctx.attempts += 1;
        let timeout = self.settings.call_timeout;
        let seconds = timeout.as_secs();
        let deadline = sleep(timeout);
        tokio::pin!(deadline);

        let handle = tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => return Err(PipelineError::Cancelled),
            _ = &mut deadline => {
                warn!(seconds, "Inference call timed out before streaming started");
                return Err(PipelineError::Timeout { seconds });
            }
            handle = self.provider.generate_stream(prompt, self.settings.generation.clone()) => handle?,
        };

        let call = handle.cancel_token();
        let GenerationHandle {
            mut stream,
            completion,
            ..
        } = handle;

        ctx.events.emit(PipelineEvent::StreamActive);
        let window = self.settings.flush_window;
        let mut pending = String::new();
        let mut last_flush = Instant::now();

        loop {
            let flush_at = tokio::time::Instant::from_std(last_flush + window);
            tokio::select! {
                biased;
                _ = ctx.cancel.cancelled() => {
                    call.cancel();
                    ctx.events.emit(PipelineEvent::StreamIdle);
                    return Err(PipelineError::Cancelled);
                }
                _ = &mut deadline => {
                    call.cancel();
                    ctx.events.emit(PipelineEvent::StreamIdle);
                    warn!(seconds, "Inference call timed out");
                    return Err(PipelineError::Timeout { seconds });
                }
                _ = sleep_until(flush_at), if !pending.is_empty() => {
                    flush(&ctx.events, &mut pending);
                    last_flush = Instant::now();
                }
                next = stream.next() => match next {
                    Some(Ok(fragment)) => {
                        pending.push_str(&fragment);
                        if last_flush.elapsed() >= window {
                            flush(&ctx.events, &mut pending);
                            last_flush = Instant::now();
                        }
                    }
                    Some(Err(err)) => {
                        flush(&ctx.events, &mut pending);
                        ctx.events.emit(PipelineEvent::StreamIdle);
                        return Err(err.into());
                    }
                    None => break,
                },
            }
        }
        flush(&ctx.events, &mut pending);
        ctx.events.emit(PipelineEvent::StreamIdle);

        let summary = tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => {
                call.cancel();
                return Err(PipelineError::Cancelled);
            }
            _ = &mut deadline => {
                call.cancel();
                return Err(PipelineError::Timeout { seconds });
            }
            summary = completion => summary?,
        };
        debug!(
            tokens = summary.token_count,
            chars = summary.text.len(),
            finish = ?summary.finish_reason,
            "Inference call complete"
        );
        Ok((summary.text, summary.finish_reason))
    }
}

fn flush(events: &EventSink, pending: &mut String) {
    if !pending.is_empty() {
        events.emit(PipelineEvent::Chunk {
            text: std::mem::take(pending),
        });
    }
}
