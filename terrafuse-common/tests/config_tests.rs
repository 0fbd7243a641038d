//! Tests for config file resolution and graceful degradation
//!
//! Tests that manipulate TERRAFUSE_CONFIG are marked with #[serial] so they do
//! not race on the process environment.

use serde::Deserialize;
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;
use terrafuse_common::config::{load_toml_config, resolve_config_path, LoggingConfig, CONFIG_ENV_VAR};
use terrafuse_common::Error;

#[derive(Debug, Default, Deserialize)]
struct SampleConfig {
    #[serde(default)]
    logging: LoggingConfig,
    #[serde(default)]
    name: Option<String>,
}

#[test]
#[serial]
fn test_env_var_used_when_no_cli_argument() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/from-env.toml");

    let resolved = resolve_config_path(None, CONFIG_ENV_VAR);
    assert_eq!(resolved, Some(PathBuf::from("/tmp/from-env.toml")));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_cli_argument_overrides_env_var() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/from-env.toml");

    let cli = PathBuf::from("/tmp/from-cli.toml");
    let resolved = resolve_config_path(Some(&cli), CONFIG_ENV_VAR);
    assert_eq!(resolved, Some(cli));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    let config: SampleConfig = load_toml_config(Some(&path)).unwrap();
    assert_eq!(config.logging.level, "info");
    assert!(config.name.is_none());
}

#[test]
fn test_valid_file_is_parsed() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "name = \"field-station\"").unwrap();
    writeln!(file, "[logging]").unwrap();
    writeln!(file, "level = \"debug\"").unwrap();

    let config: SampleConfig = load_toml_config(Some(file.path())).unwrap();
    assert_eq!(config.name.as_deref(), Some("field-station"));
    assert_eq!(config.logging.level, "debug");
    assert!(!config.logging.plain);
}

#[test]
fn test_malformed_file_is_config_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "name = [unterminated").unwrap();

    let result: Result<SampleConfig, Error> = load_toml_config(Some(file.path()));
    assert!(matches!(result, Err(Error::Config(_))));
}
