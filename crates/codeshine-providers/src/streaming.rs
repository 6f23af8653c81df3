//! Scripted provider for offline runs and tests
//!
//! Replays queued responses word by word through the same streaming handle the
//! real providers use. With an empty queue it echoes the code block of the
//! prompt back, which produces an unchanged result downstream.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

use crate::error::ProviderError;
use crate::models::{FinishReason, GenerationOptions};
use crate::provider::{GenerationHandle, InferenceProvider};

/// One scripted reply
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptedResponse {
    /// Stream this text
    Text(String),
    /// Stream this text, then report that the token limit was hit
    Truncated(String),
    /// Emit nothing until cancelled
    Stall,
    /// Refuse the request
    Fail(ProviderError),
    /// Echo the last fenced block of the prompt
    Echo,
}

impl From<&str> for ScriptedResponse {
    fn from(text: &str) -> Self {
        ScriptedResponse::Text(text.to_string())
    }
}

impl From<String> for ScriptedResponse {
    fn from(text: String) -> Self {
        ScriptedResponse::Text(text)
    }
}

/// Provider that replays scripted responses
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<ScriptedResponse>>,
    prompts: Mutex<Vec<String>>,
    options: Mutex<Vec<GenerationOptions>>,
    word_delay: Duration,
}

impl ScriptedProvider {
    /// Creates a provider replaying `responses` in order
    pub fn new<I, R>(responses: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<ScriptedResponse>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
            options: Mutex::new(Vec::new()),
            word_delay: Duration::ZERO,
        }
    }

    /// Provider that always echoes the prompt's code
    pub fn echo() -> Self {
        Self::new(Vec::<ScriptedResponse>::new())
    }

    /// Waits `delay_ms` before each word
    pub fn with_word_delay(mut self, delay_ms: u64) -> Self {
        self.word_delay = Duration::from_millis(delay_ms);
        self
    }

    /// Queues another response
    pub fn push(&self, response: impl Into<ScriptedResponse>) {
        if let Ok(mut queue) = self.responses.lock() {
            queue.push_back(response.into());
        }
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// Options received so far
    pub fn options(&self) -> Vec<GenerationOptions> {
        self.options.lock().map(|o| o.clone()).unwrap_or_default()
    }

    /// Number of generation calls
    pub fn calls(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or_default()
    }

    fn next_response(&self) -> ScriptedResponse {
        self.responses
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front())
            .unwrap_or(ScriptedResponse::Echo)
    }
}

/// Last fenced block in `prompt`, fences included
pub fn echo_code_block(prompt: &str) -> String {
    let lines: Vec<&str> = prompt.lines().collect();
    let Some(close) = lines.iter().rposition(|l| l.trim() == "```") else {
        return String::new();
    };
    let Some(open) = lines[..close]
        .iter()
        .rposition(|l| l.trim_start().starts_with("```"))
    else {
        return String::new();
    };
    lines[open..=close].join("\n")
}

/// Splits text into words that keep their trailing whitespace
fn words(text: &str) -> Vec<String> {
    text.split_inclusive(char::is_whitespace)
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl InferenceProvider for ScriptedProvider {
    fn id(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted"
    }

    async fn generate_stream(
        &self,
        prompt: &str,
        options: GenerationOptions,
    ) -> Result<GenerationHandle, ProviderError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        if let Ok(mut recorded) = self.options.lock() {
            recorded.push(options);
        }

        let (text, reason) = match self.next_response() {
            ScriptedResponse::Fail(err) => return Err(err),
            ScriptedResponse::Stall => {
                debug!("Scripted provider stalling until cancelled");
                return Ok(GenerationHandle::spawn(|sink| async move {
                    sink.cancel_token().cancelled().await;
                    Err(ProviderError::Cancelled)
                }));
            }
            ScriptedResponse::Text(text) => (text, FinishReason::Stop),
            ScriptedResponse::Truncated(text) => (text, FinishReason::Length),
            ScriptedResponse::Echo => (echo_code_block(prompt), FinishReason::Stop),
        };

        let delay = self.word_delay;
        Ok(GenerationHandle::spawn(move |mut sink| async move {
            let cancel = sink.cancel_token();
            for word in words(&text) {
                if !delay.is_zero() {
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
                        _ = sleep(delay) => {}
                    }
                }
                if !sink.emit(word) {
                    return Err(ProviderError::Cancelled);
                }
            }
            Ok(sink.finish(reason, None))
        }))
    }

    async fn health_check(&self) -> Result<bool, ProviderError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_replays_word_by_word() {
        let provider = ScriptedProvider::new(["let x = 1;\nlet y = 2;"]);
        let handle = provider
            .generate_stream("prompt", GenerationOptions::default())
            .await
            .unwrap();

        let GenerationHandle {
            stream, completion, ..
        } = handle;
        let words: Vec<String> = stream.map(|w| w.unwrap()).collect().await;
        assert_eq!(words.first().map(String::as_str), Some("let "));
        assert_eq!(words.concat(), "let x = 1;\nlet y = 2;");

        let summary = completion.await.unwrap();
        assert_eq!(summary.token_count, words.len());
        assert_eq!(provider.prompts(), vec!["prompt".to_string()]);
    }

    #[tokio::test]
    async fn test_echo_returns_prompt_code() {
        let provider = ScriptedProvider::echo();
        let prompt = "Optimize:\n```python\nx = 1\n```\n\nOutput:";
        let summary = provider
            .generate_stream(prompt, GenerationOptions::default())
            .await
            .unwrap()
            .collect()
            .await
            .unwrap();
        assert_eq!(summary.text, "```python\nx = 1\n```");
    }

    #[tokio::test]
    async fn test_truncated_reports_length() {
        let provider = ScriptedProvider::new([ScriptedResponse::Truncated("fn f() {".into())]);
        let summary = provider
            .generate_stream("p", GenerationOptions::default())
            .await
            .unwrap()
            .collect()
            .await
            .unwrap();
        assert_eq!(summary.finish_reason, FinishReason::Length);
    }

    #[tokio::test]
    async fn test_stall_ends_on_cancel() {
        let provider = ScriptedProvider::new([ScriptedResponse::Stall]);
        let handle = provider
            .generate_stream("p", GenerationOptions::default())
            .await
            .unwrap();
        handle.cancel();
        assert_eq!(handle.collect().await, Err(ProviderError::Cancelled));
    }

    #[tokio::test]
    async fn test_fail_is_returned_immediately() {
        let provider = ScriptedProvider::new([ScriptedResponse::Fail(
            ProviderError::NetworkError("refused".into()),
        )]);
        let result = provider.generate_stream("p", GenerationOptions::default()).await;
        assert!(matches!(result, Err(ProviderError::NetworkError(_))));
        assert_eq!(provider.calls(), 1);
    }

    #[test]
    fn test_echo_without_block_is_empty() {
        assert_eq!(echo_code_block("no code here"), "");
    }
}
