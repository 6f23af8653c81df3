//! Request contract consumed from the host

use codeshine_generation::Focus;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

fn auto_language() -> String {
    "auto".to_string()
}

/// One optimization request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationRequest {
    /// Source code to optimize
    pub code: String,
    /// Language name or alias; `auto` detects from content
    #[serde(default = "auto_language")]
    pub language: String,
    #[serde(default)]
    pub focus: Focus,
    /// Skip the truncation retry ladder
    #[serde(default)]
    pub fast_mode: bool,
}

impl OptimizationRequest {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            language: auto_language(),
            focus: Focus::default(),
            fast_mode: false,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_focus(mut self, focus: Focus) -> Self {
        self.focus = focus;
        self
    }

    pub fn fast(mut self, fast_mode: bool) -> Self {
        self.fast_mode = fast_mode;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.code.trim().is_empty() {
            return Err(PipelineError::InvalidRequest(
                "no code to optimize".to_string(),
            ));
        }
        Ok(())
    }
}
