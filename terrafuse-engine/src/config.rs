//! Configuration for terrafuse-engine
//!
//! Bootstrap configuration is a single TOML file:
//!
//! ```toml
//! [logging]
//! level = "debug"
//!
//! [fusion]
//! top_k = 5
//! traditional_timeout_ms = 10000
//! vision_timeout_ms = 15000
//!
//! [fusion.reading_defaults]
//! aqi = 50.0
//! ```
//!
//! Every section and key is optional. Command-line flags override file values.

use crate::types::ReadingField;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use terrafuse_common::config::{load_toml_config, resolve_config_path, LoggingConfig, CONFIG_ENV_VAR};
use terrafuse_common::{Error, Result};

/// Default number of recommendations kept after ranking
pub const DEFAULT_TOP_K: usize = 5;

/// Default timeout for the reading provider
pub const DEFAULT_TRADITIONAL_TIMEOUT_MS: u64 = 10_000;

/// Default timeout for the vision provider
pub const DEFAULT_VISION_TIMEOUT_MS: u64 = 15_000;

/// Top-level TOML configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub fusion: FusionSettings,
}

impl TomlConfig {
    /// Resolve and load the config file (CLI → ENV → user config dir → defaults)
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        let path = resolve_config_path(cli_path, CONFIG_ENV_VAR);
        let config: TomlConfig = load_toml_config(path.as_deref())?;
        config.fusion.validate()?;
        Ok(config)
    }
}

/// Fusion tuning
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FusionSettings {
    /// Recommendations kept after ranking
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    #[serde(default = "default_traditional_timeout_ms")]
    pub traditional_timeout_ms: u64,

    #[serde(default = "default_vision_timeout_ms")]
    pub vision_timeout_ms: u64,

    /// Default-substitution policy for missing reading fields (empty by default)
    #[serde(default)]
    pub reading_defaults: ReadingDefaults,
}

impl Default for FusionSettings {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            traditional_timeout_ms: DEFAULT_TRADITIONAL_TIMEOUT_MS,
            vision_timeout_ms: DEFAULT_VISION_TIMEOUT_MS,
            reading_defaults: ReadingDefaults::default(),
        }
    }
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

fn default_traditional_timeout_ms() -> u64 {
    DEFAULT_TRADITIONAL_TIMEOUT_MS
}

fn default_vision_timeout_ms() -> u64 {
    DEFAULT_VISION_TIMEOUT_MS
}

impl FusionSettings {
    pub fn traditional_timeout(&self) -> Duration {
        Duration::from_millis(self.traditional_timeout_ms)
    }

    pub fn vision_timeout(&self) -> Duration {
        Duration::from_millis(self.vision_timeout_ms)
    }

    /// Reject settings that would make every request fail or misbehave
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(Error::Config("fusion.top_k must be at least 1".to_string()));
        }
        if self.traditional_timeout_ms == 0 || self.vision_timeout_ms == 0 {
            return Err(Error::Config(
                "fusion provider timeouts must be greater than zero".to_string(),
            ));
        }
        self.reading_defaults.validate()
    }
}

/// Explicit, auditable default-substitution policy
///
/// Each `Some` value names the number assumed when a reading lacks that field.
/// The traditional score records which fields were substituted so the output never
/// presents an assumed value as a measured one.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReadingDefaults {
    #[serde(default)]
    pub aqi: Option<f64>,
    #[serde(default)]
    pub temperature_c: Option<f64>,
    #[serde(default)]
    pub vegetation_health: Option<f64>,
}

impl ReadingDefaults {
    /// True when no substitution is configured
    pub fn is_empty(&self) -> bool {
        self.aqi.is_none() && self.temperature_c.is_none() && self.vegetation_health.is_none()
    }

    /// Configured default for a score input field
    pub fn get(&self, field: ReadingField) -> Option<f64> {
        match field {
            ReadingField::Aqi => self.aqi,
            ReadingField::TemperatureC => self.temperature_c,
            ReadingField::VegetationHealth => self.vegetation_health,
            ReadingField::WaterQuality | ReadingField::UvIndex => None,
        }
    }

    fn validate(&self) -> Result<()> {
        let bounded = [
            ("aqi", self.aqi, 0.0, f64::MAX),
            ("temperature_c", self.temperature_c, -100.0, 100.0),
            ("vegetation_health", self.vegetation_health, 0.0, 100.0),
        ];
        for (name, value, min, max) in bounded {
            if let Some(v) = value {
                if !v.is_finite() || v < min || v > max {
                    return Err(Error::Config(format!(
                        "fusion.reading_defaults.{} = {} outside [{}, {}]",
                        name, v, min, max
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = FusionSettings::default();
        assert_eq!(settings.top_k, 5);
        assert_eq!(settings.traditional_timeout(), Duration::from_secs(10));
        assert_eq!(settings.vision_timeout(), Duration::from_secs(15));
        assert!(settings.reading_defaults.is_empty());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: TomlConfig = toml::from_str(
            r#"
            [fusion]
            top_k = 3

            [fusion.reading_defaults]
            aqi = 50.0
            "#,
        )
        .unwrap();

        assert_eq!(config.fusion.top_k, 3);
        assert_eq!(config.fusion.vision_timeout_ms, DEFAULT_VISION_TIMEOUT_MS);
        assert_eq!(config.fusion.reading_defaults.get(ReadingField::Aqi), Some(50.0));
        assert_eq!(config.fusion.reading_defaults.get(ReadingField::TemperatureC), None);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_zero_top_k_rejected() {
        let settings = FusionSettings {
            top_k: 0,
            ..FusionSettings::default()
        };
        assert!(matches!(settings.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_out_of_range_default_rejected() {
        let settings = FusionSettings {
            reading_defaults: ReadingDefaults {
                vegetation_health: Some(140.0),
                ..ReadingDefaults::default()
            },
            ..FusionSettings::default()
        };
        assert!(settings.validate().is_err());
    }
}
