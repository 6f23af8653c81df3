// Show the effective configuration

use std::path::PathBuf;

use async_trait::async_trait;
use codeshine_config::AppConfig;

use crate::commands::Command;
use crate::error::CliResult;

/// Prints the merged configuration as TOML
pub struct ConfigCommand {
    path: PathBuf,
    config: AppConfig,
    path_only: bool,
}

impl ConfigCommand {
    pub fn new(path: PathBuf, config: AppConfig) -> Self {
        Self {
            path,
            config,
            path_only: false,
        }
    }

    pub fn with_path_only(mut self, path_only: bool) -> Self {
        self.path_only = path_only;
        self
    }

    /// Text written to stdout
    pub fn render(&self) -> CliResult<String> {
        if self.path_only {
            return Ok(self.path.display().to_string());
        }
        let body = toml::to_string_pretty(&self.config)?;
        Ok(format!("# {}\n{}", self.path.display(), body))
    }
}

#[async_trait]
impl Command for ConfigCommand {
    async fn execute(&self) -> CliResult<()> {
        println!("{}", self.render()?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_path_only() {
        let cmd = ConfigCommand::new(PathBuf::from("/tmp/codeshine.toml"), AppConfig::default())
            .with_path_only(true);
        assert_eq!(cmd.render().unwrap(), "/tmp/codeshine.toml");
    }

    #[test]
    fn test_render_round_trips_through_toml() {
        let mut config = AppConfig::default();
        config.inference.model = "codellama:7b".to_string();
        let cmd = ConfigCommand::new(PathBuf::from("config.toml"), config.clone());

        let rendered = cmd.render().unwrap();
        assert!(rendered.starts_with("# config.toml\n"));
        assert!(rendered.contains("[inference]"));
        let parsed: AppConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }
}
