//! Events streamed to the host during a run

use codeshine_generation::OptimizationResult;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Pipeline phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idle,
    Analyzing,
    Chunking,
    Generating,
    Validating,
    Retrying,
    Done,
    Failed,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::Analyzing => "analyzing",
            Stage::Chunking => "chunking",
            Stage::Generating => "generating",
            Stage::Validating => "validating",
            Stage::Retrying => "retrying",
            Stage::Done => "done",
            Stage::Failed => "failed",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timing and effort of a finished run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetrics {
    pub request_id: Uuid,
    pub elapsed_ms: u64,
    /// Inference calls made, retries included
    pub attempts: usize,
    pub chunks: usize,
}

/// Message sent to the host
///
/// Every run ends with exactly one `Done` or `Error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// Entered a pipeline phase
    Stage { stage: Stage },
    /// Free-text detail within a phase
    Substage { message: String },
    /// Started work on chunk `current` of `total`, 1-based
    ChunkProgress { current: usize, total: usize },
    /// A model stream opened
    StreamActive,
    /// A model stream closed
    StreamIdle,
    /// Discard any buffered preview text
    RetryClear,
    /// Preview text fragment
    Chunk { text: String },
    /// Final result
    Done {
        result: Box<OptimizationResult>,
        metrics: RunMetrics,
    },
    /// Terminal failure
    Error {
        message: String,
        #[serde(default)]
        timeout: bool,
    },
}

impl PipelineEvent {
    /// Whether this event ends a run
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineEvent::Done { .. } | PipelineEvent::Error { .. })
    }
}

/// Sending half of a run's event channel
///
/// Sends never fail; a host that stops listening only loses the preview.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<PipelineEvent>,
}

impl EventSink {
    pub fn new(tx: mpsc::UnboundedSender<PipelineEvent>) -> Self {
        Self { tx }
    }

    /// Sink paired with a fresh receiver
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<PipelineEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn emit(&self, event: PipelineEvent) {
        let _ = self.tx.send(event);
    }

    pub fn stage(&self, stage: Stage) {
        self.emit(PipelineEvent::Stage { stage });
    }

    pub fn substage(&self, message: impl Into<String>) {
        self.emit(PipelineEvent::Substage {
            message: message.into(),
        });
    }
}
