// Command handlers for the codeshine CLI

pub mod analyze;
pub mod config;
pub mod optimize;

pub use analyze::AnalyzeCommand;
pub use config::ConfigCommand;
pub use optimize::OptimizeCommand;

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use codeshine_analysis::Language;

use crate::error::CliResult;

/// Trait for command handlers
#[async_trait::async_trait]
pub trait Command: Send + Sync {
    /// Execute the command
    async fn execute(&self) -> CliResult<()>;
}

/// Reads a source file, or stdin for `-`
pub fn read_source(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut code = String::new();
        std::io::stdin()
            .read_to_string(&mut code)
            .context("Failed to read source from stdin")?;
        return Ok(code);
    }
    std::fs::read_to_string(input).with_context(|| format!("Failed to read {}", input))
}

/// Explicit language, else the file extension, else `auto`
pub fn resolve_language(input: &str, requested: Option<&str>) -> String {
    if let Some(language) = requested {
        return language.to_string();
    }
    if input != "-" {
        if let Some(language) = Language::from_extension(Path::new(input)) {
            return language.name().to_string();
        }
    }
    "auto".to_string()
}
