//! Tests for loading the engine's TOML configuration from disk
//!
//! Every test passes an explicit path, which takes priority over
//! TERRAFUSE_CONFIG, so none of them touch the process environment.

use std::io::Write;
use tempfile::NamedTempFile;
use terrafuse_common::Error;
use terrafuse_engine::config::{TomlConfig, DEFAULT_TRADITIONAL_TIMEOUT_MS};

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_reads_file_values() {
    let file = write_config(
        r#"
        [logging]
        level = "debug"
        plain = true

        [fusion]
        top_k = 3
        vision_timeout_ms = 2500

        [fusion.reading_defaults]
        temperature_c = 20.0
        "#,
    );

    let config = TomlConfig::load(Some(file.path())).unwrap();

    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.plain);
    assert_eq!(config.fusion.top_k, 3);
    assert_eq!(config.fusion.vision_timeout_ms, 2500);
    assert_eq!(
        config.fusion.traditional_timeout_ms,
        DEFAULT_TRADITIONAL_TIMEOUT_MS
    );
    assert_eq!(config.fusion.reading_defaults.temperature_c, Some(20.0));
}

#[test]
fn test_load_rejects_zero_top_k() {
    let file = write_config("[fusion]\ntop_k = 0\n");

    let result = TomlConfig::load(Some(file.path()));
    assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("top_k")));
}

#[test]
fn test_load_rejects_zero_timeout() {
    let file = write_config("[fusion]\ntraditional_timeout_ms = 0\n");

    let result = TomlConfig::load(Some(file.path()));
    assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("timeouts")));
}

#[test]
fn test_load_rejects_out_of_range_default() {
    let file = write_config("[fusion.reading_defaults]\nvegetation_health = 140.0\n");

    let result = TomlConfig::load(Some(file.path()));
    assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("vegetation_health")));
}

#[test]
fn test_load_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();

    let config = TomlConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
    assert_eq!(config.fusion.top_k, 5);
    assert_eq!(config.logging.level, "info");
}
