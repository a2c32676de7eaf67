//! Integration tests for config file resolution and graceful degradation
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate LLMSVC_CONFIG are marked with #[serial]
//! to ensure they run sequentially, not in parallel.

use llmsvc_common::config::{load_toml_config, BackendKind, TomlConfig, CONFIG_ENV_VAR};
use serial_test::serial;
use std::env;
use tempfile::TempDir;

#[test]
#[serial]
fn test_cli_path_takes_priority_over_env() {
    let temp_dir = TempDir::new().unwrap();
    let cli_path = temp_dir.path().join("cli.toml");
    let env_path = temp_dir.path().join("env.toml");

    std::fs::write(&cli_path, "[server]\nport = 7001\n").unwrap();
    std::fs::write(&env_path, "[server]\nport = 7002\n").unwrap();
    env::set_var(CONFIG_ENV_VAR, &env_path);

    let (config, source) = TomlConfig::load(Some(&cli_path)).unwrap();

    env::remove_var(CONFIG_ENV_VAR);
    assert_eq!(config.server.port, 7001);
    assert_eq!(source.as_deref(), Some(cli_path.as_path()));
}

#[test]
#[serial]
fn test_env_path_used_without_cli_argument() {
    let temp_dir = TempDir::new().unwrap();
    let env_path = temp_dir.path().join("env.toml");
    std::fs::write(&env_path, "[cache]\ncapacity = 16\n").unwrap();
    env::set_var(CONFIG_ENV_VAR, &env_path);

    let (config, source) = TomlConfig::load(None).unwrap();

    env::remove_var(CONFIG_ENV_VAR);
    assert_eq!(config.cache.capacity, 16);
    assert_eq!(source.as_deref(), Some(env_path.as_path()));
}

#[test]
#[serial]
fn test_explicit_missing_file_is_an_error() {
    env::remove_var(CONFIG_ENV_VAR);
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope.toml");

    let result = TomlConfig::load(Some(&missing));
    assert!(result.is_err(), "An explicitly named config file must exist");
}

#[test]
#[serial]
#[cfg(target_os = "linux")]
fn test_no_file_reports_missing_source() {
    // The caller warns when no source is returned
    if std::path::Path::new("/etc/llmsvc/config.toml").exists() {
        return;
    }
    env::remove_var(CONFIG_ENV_VAR);
    let temp_dir = TempDir::new().unwrap();
    let previous = env::var_os("XDG_CONFIG_HOME");
    env::set_var("XDG_CONFIG_HOME", temp_dir.path());

    let (config, source) = TomlConfig::load(None).unwrap();

    match previous {
        Some(value) => env::set_var("XDG_CONFIG_HOME", value),
        None => env::remove_var("XDG_CONFIG_HOME"),
    }
    assert!(source.is_none());
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_malformed_toml_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bad.toml");
    std::fs::write(&path, "[server\nport = ").unwrap();

    assert!(load_toml_config(&path).is_err());
}

#[test]
fn test_full_file_loads_every_section() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("llmsvc.toml");
    std::fs::write(
        &path,
        r#"
        [server]
        api_key = "your-secure-api-key"

        [backend]
        kind = "remote"

        [throttle]
        release_after_backoff = true

        [models.supported.embedding]
        tiny = "org/tiny"
        "#,
    )
    .unwrap();

    let loaded = load_toml_config(&path).unwrap();

    let mut expected = TomlConfig::default();
    expected.server.api_key = "your-secure-api-key".to_string();
    expected.backend.kind = BackendKind::Remote;
    expected.throttle.release_after_backoff = true;
    expected
        .models
        .supported
        .entry("embedding".to_string())
        .or_default()
        .insert("tiny".to_string(), "org/tiny".to_string());
    assert_eq!(loaded, expected);
}
