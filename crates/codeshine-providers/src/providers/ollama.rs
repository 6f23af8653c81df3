//! Ollama provider
//!
//! Streams completions from `/api/generate`. The endpoint answers with
//! newline-delimited JSON objects, one per generated fragment, the last one
//! carrying `done: true`.

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::error::ProviderError;
use crate::models::{FinishReason, GenerationOptions, GenerationSummary};
use crate::provider::{GenerationHandle, GenerationSink, InferenceProvider};

/// Endpoint used when none is configured
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "qwen2.5-coder:1.5b";

const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 100;
const MAX_BACKOFF_MS: u64 = 400;

/// Ollama provider implementation
pub struct OllamaProvider {
    client: Arc<Client>,
    base_url: String,
    model: String,
}

fn is_transient_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.status().is_some_and(|s| s.is_server_error())
}

/// Sends a request, backing off between attempts that fail transiently
///
/// Makes at most `MAX_RETRIES + 1` attempts; the last error is returned as is.
async fn send_with_backoff<F, Fut>(
    operation: &str,
    mut send: F,
) -> Result<reqwest::Response, reqwest::Error>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    let mut backoff = Duration::from_millis(INITIAL_BACKOFF_MS);

    for attempt in 1..=MAX_RETRIES {
        match send().await {
            Err(err) if is_transient_error(&err) => {
                warn!(
                    operation,
                    attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %err,
                    "Ollama request failed, backing off"
                );
                sleep(backoff).await;
                backoff = (backoff * 2).min(Duration::from_millis(MAX_BACKOFF_MS));
            }
            outcome => return outcome,
        }
    }

    debug!(operation, "Ollama request on final attempt");
    send().await
}

impl OllamaProvider {
    /// Create a new Ollama provider for `model` at `base_url`
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self, ProviderError> {
        let base_url = base_url.into();
        let model = model.into();
        if base_url.is_empty() {
            return Err(ProviderError::ConfigError(
                "Ollama base URL is required".to_string(),
            ));
        }
        if model.is_empty() {
            return Err(ProviderError::ConfigError(
                "Ollama model name is required".to_string(),
            ));
        }

        Ok(Self {
            client: Arc::new(Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }

    /// Create a provider with the default localhost endpoint and model
    pub fn with_default_endpoint() -> Result<Self, ProviderError> {
        Self::new(DEFAULT_ENDPOINT, DEFAULT_MODEL)
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request_body(&self, prompt: &str, options: &GenerationOptions) -> OllamaGenerateRequest {
        OllamaGenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: true,
            options: OllamaOptions {
                num_predict: options.max_tokens,
                temperature: options.temperature,
                top_p: options.top_p,
            },
        }
    }
}

/// Feeds complete NDJSON lines into the sink. Returns the final line once seen.
///
/// Bytes after the last newline stay in `buffer`, so a codepoint split across
/// network reads is only decoded once its line is whole.
fn drain_lines(
    buffer: &mut Vec<u8>,
    sink: &mut GenerationSink,
) -> Result<Option<OllamaGenerateChunk>, ProviderError> {
    while let Some(newline) = buffer.iter().position(|&b| b == b'\n') {
        let raw: Vec<u8> = buffer.drain(..=newline).collect();
        let line = std::str::from_utf8(&raw)
            .map_err(|e| {
                debug!("Streaming response line is not valid UTF-8: {}", e);
                ProviderError::ParseError(format!("Invalid UTF-8 in streaming response: {}", e))
            })?
            .trim();
        if line.is_empty() {
            continue;
        }

        let chunk: OllamaGenerateChunk = serde_json::from_str(line).map_err(|e| {
            debug!("Failed to parse streaming response line: {}", e);
            ProviderError::ParseError(format!("Failed to parse streaming response: {}", e))
        })?;
        if let Some(message) = &chunk.error {
            return Err(ProviderError::ProviderError(message.clone()));
        }
        sink.emit(chunk.response.clone());
        if chunk.done {
            return Ok(Some(chunk));
        }
    }
    Ok(None)
}

fn finish_reason(chunk: &OllamaGenerateChunk) -> FinishReason {
    match chunk.done_reason.as_deref() {
        Some("length") => FinishReason::Length,
        _ => FinishReason::Stop,
    }
}

async fn relay_generation<S, B, E>(
    bytes: S,
    mut sink: GenerationSink,
) -> Result<GenerationSummary, ProviderError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    futures::pin_mut!(bytes);
    let cancel = sink.cancel_token();
    let mut buffer: Vec<u8> = Vec::new();

    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Ollama generation cancelled after {} chars", sink.text().len());
                return Err(ProviderError::Cancelled);
            }
            next = bytes.next() => next,
        };

        match next {
            Some(Ok(data)) => {
                buffer.extend_from_slice(data.as_ref());
                match drain_lines(&mut buffer, &mut sink) {
                    Ok(Some(last)) => {
                        return Ok(sink.finish(finish_reason(&last), last.eval_count));
                    }
                    Ok(None) => {}
                    Err(e) => {
                        sink.fail(e.clone());
                        return Err(e);
                    }
                }
            }
            Some(Err(e)) => {
                error!("Failed to read streaming response body: {}", e);
                let err = ProviderError::NetworkError(e.to_string());
                sink.fail(err.clone());
                return Err(err);
            }
            None => {
                // Body closed without a trailing newline after the final object.
                buffer.push(b'\n');
                let last = drain_lines(&mut buffer, &mut sink).map_err(|e| {
                    sink.fail(e.clone());
                    e
                })?;
                let reason = last.as_ref().map(finish_reason).unwrap_or(FinishReason::Stop);
                return Ok(sink.finish(reason, last.and_then(|c| c.eval_count)));
            }
        }
    }
}

#[async_trait]
impl InferenceProvider for OllamaProvider {
    fn id(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate_stream(
        &self,
        prompt: &str,
        options: GenerationOptions,
    ) -> Result<GenerationHandle, ProviderError> {
        debug!(
            model = %self.model,
            prompt_chars = prompt.len(),
            max_tokens = options.max_tokens,
            "Starting streaming generation request to Ollama"
        );

        let body = self.request_body(prompt, &options);
        let client = self.client.clone();
        let url = format!("{}/api/generate", self.base_url);

        let response = send_with_backoff("generate", || {
            let client = client.clone();
            let url = url.clone();
            let body = body.clone();
            async move { client.post(url).json(&body).send().await }
        })
        .await
        .map_err(|e| {
            error!("Ollama streaming request failed after retries: {}", e);
            ProviderError::from(e)
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound(format!(
                "Ollama model '{}' is not available",
                self.model
            )));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Ollama API error ({}): {}", status, error_text);
            return Err(ProviderError::ProviderError(format!(
                "Ollama API error: {}",
                status
            )));
        }

        Ok(GenerationHandle::spawn(move |sink| {
            relay_generation(response.bytes_stream(), sink)
        }))
    }

    async fn health_check(&self) -> Result<bool, ProviderError> {
        debug!("Performing health check for Ollama provider");

        let base_url = self.base_url.clone();
        let client = self.client.clone();

        let response = send_with_backoff("health_check", || {
            let client = client.clone();
            let url = format!("{}/api/tags", base_url);
            async move { client.get(url).send().await }
        })
        .await;

        match response {
            Err(e) => {
                warn!("Ollama health check failed after retries: {}", e);
                Err(ProviderError::from(e))
            }
            Ok(response) if response.status().is_success() => {
                let tags: OllamaTagsResponse = response.json().await.unwrap_or_default();
                let installed = tags
                    .models
                    .unwrap_or_default()
                    .iter()
                    .any(|m| m.name == self.model || m.name.split(':').next() == Some(self.model.as_str()));
                if !installed {
                    warn!("Ollama is reachable but model '{}' is not installed", self.model);
                }
                debug!("Ollama health check passed");
                Ok(true)
            }
            Ok(response) => {
                warn!(
                    "Ollama health check returned status {}",
                    response.status()
                );
                Ok(false)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct OllamaGenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Clone, Serialize)]
struct OllamaOptions {
    num_predict: usize,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateChunk {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    eval_count: Option<usize>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OllamaTagsResponse {
    models: Option<Vec<OllamaModel>>,
}

#[derive(Debug, Deserialize)]
struct OllamaModel {
    name: String,
}
