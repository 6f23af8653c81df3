use codeshine_config::*;
use serial_test::serial;
use std::env;
use tempfile::TempDir;

#[test]
fn test_app_config_default() {
    let config = AppConfig::default();
    assert_eq!(config.inference.base_url, "http://localhost:11434");
    assert_eq!(config.inference.max_tokens, 2048);
    assert_eq!(config.inference.timeout_secs, 120);
    assert_eq!(config.pipeline.chunk_threshold_chars, 3000);
    assert_eq!(config.pipeline.max_truncation_retries, 2);
    assert_eq!(config.logging.level, "info");
}

#[test]
#[serial]
fn test_missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let manager = ConfigManager::with_path(dir.path().join("absent.toml"));
    let config = manager.load_config().unwrap();
    assert_eq!(config, AppConfig::default());
}

#[test]
#[serial]
fn test_partial_file_keeps_other_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "[inference]\nmodel = \"codellama:7b\"\n\n[pipeline]\noverlap_lines = 5\n",
    )
    .unwrap();

    let config = ConfigManager::with_path(path).load_config().unwrap();
    assert_eq!(config.inference.model, "codellama:7b");
    assert_eq!(config.inference.max_tokens, 2048);
    assert_eq!(config.pipeline.overlap_lines, 5);
    assert_eq!(config.pipeline.stream_flush_ms, 50);
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[inference]\nmodel = \"from-file\"\ntimeout_secs = 30\n").unwrap();

    env::set_var("CODESHINE_INFERENCE__MODEL", "from-env");
    env::set_var("CODESHINE_PIPELINE__CHUNK_THRESHOLD_CHARS", "1200");
    let result = ConfigManager::with_path(path).load_config();
    env::remove_var("CODESHINE_INFERENCE__MODEL");
    env::remove_var("CODESHINE_PIPELINE__CHUNK_THRESHOLD_CHARS");

    let config = result.unwrap();
    assert_eq!(config.inference.model, "from-env");
    assert_eq!(config.inference.timeout_secs, 30);
    assert_eq!(config.pipeline.chunk_threshold_chars, 1200);
}

#[test]
#[serial]
fn test_save_then_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");
    let manager = ConfigManager::with_path(path.clone());

    let mut config = AppConfig::default();
    config.inference.temperature = 0.5;
    config.logging.level = "debug".to_string();
    manager.save_config(&config).unwrap();

    assert!(path.exists());
    assert_eq!(manager.load_config().unwrap(), config);
}

#[test]
#[serial]
fn test_load_validated_rejects_invalid_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[inference]\nmax_tokens = 0\n").unwrap();

    let err = ConfigManager::with_path(path).load_validated().unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)));
}

#[test]
#[serial]
fn test_malformed_file_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[inference\nmodel = ").unwrap();

    let err = ConfigManager::with_path(path).load_config().unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}
