//! JSON-file-backed providers
//!
//! Each request re-reads the file so a long-running process picks up new
//! snapshots. A missing file means "no data"; an unreadable payload is
//! reported as malformed. Neither aborts the request.

use super::{TraditionalReadingProvider, VisionAssessmentProvider};
use crate::error::ProviderError;
use crate::types::{EnvironmentalReading, SourceKind, VisionAssessment};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use terrafuse_common::Coordinates;
use tracing::debug;

async fn load_json<T: DeserializeOwned>(path: &Path, kind: SourceKind) -> Result<T, ProviderError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), %kind, "Snapshot file not found");
            return Err(ProviderError::NoData(kind));
        }
        Err(e) => {
            return Err(ProviderError::Upstream {
                kind,
                message: format!("failed to read {}: {}", path.display(), e),
            })
        }
    };

    serde_json::from_str(&content).map_err(|e| ProviderError::Malformed {
        kind,
        message: format!("{}: {}", path.display(), e),
    })
}

/// Reading snapshot stored as JSON
///
/// The file may omit `coordinates` and `timestamp`; a bare object of sensor
/// fields is enough. Missing fields become `None`.
#[derive(Debug, Clone)]
pub struct JsonReadingProvider {
    path: PathBuf,
}

impl JsonReadingProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// On-disk reading layout (coordinates come from the request)
#[derive(Debug, serde::Deserialize)]
struct ReadingSnapshot {
    #[serde(default)]
    timestamp: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    aqi: Option<f64>,
    #[serde(default)]
    temperature_c: Option<f64>,
    #[serde(default)]
    vegetation_health: Option<f64>,
    #[serde(default)]
    water_quality: Option<f64>,
    #[serde(default)]
    uv_index: Option<f64>,
}

#[async_trait]
impl TraditionalReadingProvider for JsonReadingProvider {
    fn name(&self) -> &'static str {
        "json-file"
    }

    async fn fetch(&self, coordinates: Coordinates) -> Result<EnvironmentalReading, ProviderError> {
        let snapshot: ReadingSnapshot = load_json(&self.path, SourceKind::Traditional).await?;
        let timestamp = match snapshot.timestamp {
            Some(ts) => ts,
            None => file_modified(&self.path).await?,
        };

        Ok(EnvironmentalReading {
            coordinates,
            timestamp,
            aqi: snapshot.aqi,
            temperature_c: snapshot.temperature_c,
            vegetation_health: snapshot.vegetation_health,
            water_quality: snapshot.water_quality,
            uv_index: snapshot.uv_index,
        })
    }
}

/// Vision assessment stored as JSON
#[derive(Debug, Clone)]
pub struct JsonVisionProvider {
    path: PathBuf,
}

impl JsonVisionProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl VisionAssessmentProvider for JsonVisionProvider {
    fn name(&self) -> &'static str {
        "json-file"
    }

    async fn fetch(&self, _coordinates: Coordinates) -> Result<VisionAssessment, ProviderError> {
        load_json(&self.path, SourceKind::Vision).await
    }
}

/// Snapshot time when the payload carries none
///
/// A reading without any known observation time is rejected rather than stamped
/// with a made-up one.
async fn file_modified(path: &Path) -> Result<chrono::DateTime<chrono::Utc>, ProviderError> {
    tokio::fs::metadata(path)
        .await
        .and_then(|m| m.modified())
        .map(chrono::DateTime::<chrono::Utc>::from)
        .map_err(|e| ProviderError::Malformed {
            kind: SourceKind::Traditional,
            message: format!(
                "{} has no timestamp and its modification time is unavailable: {}",
                path.display(),
                e
            ),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn origin() -> Coordinates {
        Coordinates::new(0.0, 0.0).unwrap()
    }

    #[tokio::test]
    async fn test_reading_partial_fields() {
        let file = write_temp(r#"{"aqi": 42.0, "vegetation_health": 61.5}"#);
        let provider = JsonReadingProvider::new(file.path());

        let reading = provider.fetch(origin()).await.unwrap();
        assert_eq!(reading.aqi, Some(42.0));
        assert_eq!(reading.vegetation_health, Some(61.5));
        assert_eq!(reading.temperature_c, None);
        assert_eq!(reading.coordinates, origin());
    }

    #[tokio::test]
    async fn test_reading_explicit_timestamp() {
        let file = write_temp(r#"{"timestamp": "2024-06-01T12:00:00Z", "aqi": 10.0}"#);
        let provider = JsonReadingProvider::new(file.path());

        let reading = provider.fetch(origin()).await.unwrap();
        assert_eq!(reading.timestamp.to_rfc3339(), "2024-06-01T12:00:00+00:00");
    }

    #[tokio::test]
    async fn test_reading_without_timestamp_uses_file_time() {
        let file = write_temp(r#"{"aqi": 10.0}"#);
        let expected: chrono::DateTime<chrono::Utc> =
            std::fs::metadata(file.path()).unwrap().modified().unwrap().into();
        let provider = JsonReadingProvider::new(file.path());

        let reading = provider.fetch(origin()).await.unwrap();
        assert_eq!(reading.timestamp, expected);
    }

    #[tokio::test]
    async fn test_unknown_snapshot_time_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let err = file_modified(&dir.path().join("vanished.json"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Malformed {
                kind: SourceKind::Traditional,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_missing_file_is_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let provider = JsonVisionProvider::new(dir.path().join("absent.json"));

        let err = provider.fetch(origin()).await.unwrap_err();
        assert!(matches!(err, ProviderError::NoData(SourceKind::Vision)));
    }

    #[tokio::test]
    async fn test_garbage_is_malformed() {
        let file = write_temp("not json at all");
        let provider = JsonVisionProvider::new(file.path());

        let err = provider.fetch(origin()).await.unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Malformed {
                kind: SourceKind::Vision,
                ..
            }
        ));
    }
}
