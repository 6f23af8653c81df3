// Command-line parsing and routing

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use codeshine_analysis::Language;
use codeshine_config::ConfigManager;
use codeshine_generation::Focus;

use crate::commands::{AnalyzeCommand, Command, ConfigCommand, OptimizeCommand};
use crate::error::CliResult;
use crate::logging::{init_logging, VerbosityLevel};

/// codeshine - model-guided code optimization
#[derive(Parser, Debug)]
#[command(name = "codeshine")]
#[command(about = "Analyze code and rewrite it for performance with a local model")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file to use instead of the user config
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress progress and preview output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Print the static analysis of a file as JSON
    #[command(alias = "a")]
    Analyze {
        /// Source file, or - for stdin
        #[arg(value_name = "FILE", default_value = "-")]
        input: String,

        /// Language name or alias (default: detect)
        #[arg(short, long, value_parser = parse_language)]
        language: Option<String>,
    },

    /// Optimize a file and print the rewritten code
    #[command(alias = "o")]
    Optimize {
        /// Source file, or - for stdin
        #[arg(value_name = "FILE", default_value = "-")]
        input: String,

        /// Language name or alias (default: detect)
        #[arg(short, long, value_parser = parse_language)]
        language: Option<String>,

        /// What to improve: performance, readability, security, best-practices, all
        #[arg(short, long, default_value = "all")]
        focus: Focus,

        /// Skip the truncation retries
        #[arg(long)]
        fast: bool,

        /// Model to use instead of the configured one
        #[arg(short, long)]
        model: Option<String>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// Echo the input through the pipeline without a model
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the effective configuration
    Config {
        /// Print only the configuration file path
        #[arg(long)]
        path: bool,
    },
}

/// Accepts `auto` or a known language name or alias
pub fn parse_language(value: &str) -> Result<String, String> {
    if value.trim().eq_ignore_ascii_case("auto") {
        return Ok("auto".to_string());
    }
    Language::from_name(value)
        .map(|language| language.name().to_string())
        .ok_or_else(|| {
            let known: Vec<&str> = Language::all().iter().map(Language::name).collect();
            format!(
                "unknown language '{}', expected auto or one of: {}",
                value,
                known.join(", ")
            )
        })
}

/// Command router
pub struct CommandRouter;

impl CommandRouter {
    /// Parse arguments and run the selected command
    pub async fn route() -> CliResult<()> {
        let cli = Cli::parse();
        Self::execute(&cli).await
    }

    /// Execute a command
    pub async fn execute(cli: &Cli) -> CliResult<()> {
        let verbosity = VerbosityLevel::from_flags(cli.verbose, cli.quiet);
        let manager = match &cli.config {
            Some(path) => ConfigManager::with_path(path.clone()),
            None => ConfigManager::new(),
        };
        let config = manager.load_validated()?;
        init_logging(verbosity, &config.logging.level);

        match &cli.command {
            Commands::Analyze { input, language } => {
                let cmd = AnalyzeCommand::new(input.clone(), config)
                    .with_language(language.clone());
                cmd.execute().await
            }
            Commands::Optimize {
                input,
                language,
                focus,
                fast,
                model,
                json,
                dry_run,
            } => {
                let cmd = OptimizeCommand::new(input.clone(), config, verbosity)
                    .with_language(language.clone())
                    .with_focus(*focus)
                    .with_fast(*fast)
                    .with_model(model.clone())
                    .with_json(*json)
                    .with_dry_run(*dry_run);
                cmd.execute().await
            }
            Commands::Config { path } => {
                let cmd = ConfigCommand::new(manager.config_path().to_path_buf(), config)
                    .with_path_only(*path);
                cmd.execute().await
            }
        }
    }
}
