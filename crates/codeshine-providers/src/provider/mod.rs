//! Provider trait and the streaming generation handle

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::{FutureExt, StreamExt};
use std::future::Future;
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_util::sync::CancellationToken;

use crate::error::ProviderError;
use crate::models::{FinishReason, GenerationOptions, GenerationSummary};

/// Stream of generated text fragments
pub type TokenStream = BoxStream<'static, Result<String, ProviderError>>;

/// Future resolving once generation has finished
pub type CompletionFuture = BoxFuture<'static, Result<GenerationSummary, ProviderError>>;

/// Inference backend that streams completions for a prompt
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Provider identifier, e.g. "ollama"
    fn id(&self) -> &str;

    /// Model used for generation
    fn model(&self) -> &str;

    /// Starts generating a completion for `prompt`
    ///
    /// Returns as soon as the backend accepted the request. Fragments arrive on
    /// the handle's stream and the summary resolves once generation stops.
    async fn generate_stream(
        &self,
        prompt: &str,
        options: GenerationOptions,
    ) -> Result<GenerationHandle, ProviderError>;

    /// Checks whether the backend is reachable
    async fn health_check(&self) -> Result<bool, ProviderError>;
}

/// Producer side of a generation, handed to the task that talks to the backend
pub struct GenerationSink {
    tokens: mpsc::UnboundedSender<Result<String, ProviderError>>,
    cancel: CancellationToken,
    text: String,
    fragments: usize,
}

impl GenerationSink {
    /// Forwards a fragment to the consumer. Returns false once cancelled.
    pub fn emit(&mut self, fragment: impl Into<String>) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        let fragment = fragment.into();
        if fragment.is_empty() {
            return true;
        }
        self.text.push_str(&fragment);
        self.fragments += 1;
        // The consumer may only await the summary and drop the stream.
        let _ = self.tokens.send(Ok(fragment));
        true
    }

    /// Reports a mid-stream failure on the token stream
    pub fn fail(&self, err: ProviderError) {
        let _ = self.tokens.send(Err(err));
    }

    /// Token observed by the producer to stop early
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Whether the consumer asked to stop
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Text emitted so far
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Closes the stream and builds the summary
    ///
    /// `token_count` overrides the fragment count when the backend reports one.
    pub fn finish(self, reason: FinishReason, token_count: Option<usize>) -> GenerationSummary {
        GenerationSummary {
            token_count: token_count.unwrap_or(self.fragments),
            text: self.text,
            finish_reason: reason,
        }
    }
}

/// Consumer side of a generation
///
/// The stream ends when the producer finishes. `completion` resolves with the
/// summary, or with [`ProviderError::Cancelled`] after [`cancel`](Self::cancel).
pub struct GenerationHandle {
    /// Text fragments in generation order
    pub stream: TokenStream,
    /// Resolves once generation has stopped
    pub completion: CompletionFuture,
    cancel: CancellationToken,
}

impl GenerationHandle {
    /// Runs `producer` on a background task wired to a fresh handle
    pub fn spawn<F, Fut>(producer: F) -> Self
    where
        F: FnOnce(GenerationSink) -> Fut,
        Fut: Future<Output = Result<GenerationSummary, ProviderError>> + Send + 'static,
    {
        let (token_tx, token_rx) = mpsc::unbounded_channel();
        let (done_tx, done_rx) = oneshot::channel();
        let cancel = CancellationToken::new();

        let sink = GenerationSink {
            tokens: token_tx,
            cancel: cancel.clone(),
            text: String::new(),
            fragments: 0,
        };
        let task = producer(sink);
        tokio::spawn(async move {
            let outcome = task.await;
            let _ = done_tx.send(outcome);
        });

        let completion = async move {
            done_rx.await.unwrap_or_else(|_| {
                Err(ProviderError::Internal(
                    "generation task ended without a result".to_string(),
                ))
            })
        }
        .boxed();

        Self {
            stream: UnboundedReceiverStream::new(token_rx).boxed(),
            completion,
            cancel,
        }
    }

    /// Asks the producer to stop; the stream closes shortly after
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token that cancels this generation when triggered
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Drains the stream and waits for the summary
    pub async fn collect(mut self) -> Result<GenerationSummary, ProviderError> {
        while let Some(fragment) = self.stream.next().await {
            fragment?;
        }
        self.completion.await
    }
}

impl std::fmt::Debug for GenerationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationHandle")
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}
