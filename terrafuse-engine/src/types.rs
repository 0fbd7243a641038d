//! Core input types for the fusion pipeline
//!
//! Both provider payloads are explicit typed records. Every reading field a
//! provider may fail to deliver is an `Option` and stays `None` all the way
//! through fusion; nothing here invents a placeholder number.
//!
//! # Value ranges
//! - `EnvironmentalReading::vegetation_health`, `water_quality`: 0-100
//! - `EnvironmentalReading::aqi`, `uv_index`: >= 0
//! - `VisionAssessment` probabilities and health score: 0.0-1.0
//! - `VisionAssessment::predicted_ndvi`: -1.0-1.0

use crate::error::{FusionError, FusionResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use terrafuse_common::Coordinates;

// ============================================================================
// Sources
// ============================================================================

/// The two independent assessment sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Traditional,
    Vision,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Traditional => write!(f, "traditional"),
            SourceKind::Vision => write!(f, "vision"),
        }
    }
}

// ============================================================================
// Traditional reading
// ============================================================================

/// Reading-based environmental snapshot for one coordinate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalReading {
    pub coordinates: Coordinates,
    pub timestamp: DateTime<Utc>,
    /// US EPA air quality index
    #[serde(default)]
    pub aqi: Option<f64>,
    /// Air temperature in degrees Celsius
    #[serde(default)]
    pub temperature_c: Option<f64>,
    /// Vegetation health percentage (0-100)
    #[serde(default)]
    pub vegetation_health: Option<f64>,
    /// Water quality index (0-100)
    #[serde(default)]
    pub water_quality: Option<f64>,
    #[serde(default)]
    pub uv_index: Option<f64>,
}

/// Named field of an [`EnvironmentalReading`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingField {
    Aqi,
    TemperatureC,
    VegetationHealth,
    WaterQuality,
    UvIndex,
}

impl ReadingField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingField::Aqi => "aqi",
            ReadingField::TemperatureC => "temperature_c",
            ReadingField::VegetationHealth => "vegetation_health",
            ReadingField::WaterQuality => "water_quality",
            ReadingField::UvIndex => "uv_index",
        }
    }
}

impl fmt::Display for ReadingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl EnvironmentalReading {
    /// Reading with every optional field absent
    pub fn empty(coordinates: Coordinates, timestamp: DateTime<Utc>) -> Self {
        Self {
            coordinates,
            timestamp,
            aqi: None,
            temperature_c: None,
            vegetation_health: None,
            water_quality: None,
            uv_index: None,
        }
    }

    /// Look up a field by name
    pub fn field(&self, field: ReadingField) -> Option<f64> {
        match field {
            ReadingField::Aqi => self.aqi,
            ReadingField::TemperatureC => self.temperature_c,
            ReadingField::VegetationHealth => self.vegetation_health,
            ReadingField::WaterQuality => self.water_quality,
            ReadingField::UvIndex => self.uv_index,
        }
    }

    /// Reject malformed values before any blending
    ///
    /// # Errors
    /// Returns `FusionError::Validation` naming the first offending field
    pub fn validate(&self) -> FusionResult<()> {
        self.coordinates
            .validate()
            .map_err(|e| FusionError::Validation(format!("reading.coordinates: {}", e)))?;
        check_optional("reading.aqi", self.aqi, 0.0, f64::MAX)?;
        check_optional("reading.temperature_c", self.temperature_c, -100.0, 100.0)?;
        check_optional("reading.vegetation_health", self.vegetation_health, 0.0, 100.0)?;
        check_optional("reading.water_quality", self.water_quality, 0.0, 100.0)?;
        check_optional("reading.uv_index", self.uv_index, 0.0, f64::MAX)?;
        Ok(())
    }
}

// ============================================================================
// Vision assessment
// ============================================================================

/// Per-subsystem confidence tag reported by the vision pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelConfidence {
    High,
    Medium,
    Low,
    Unavailable,
}

/// Imagery-derived assessment for one coordinate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionAssessment {
    /// Vegetation health (0.0-1.0)
    pub vegetation_health_score: f64,
    /// Predicted NDVI (-1.0-1.0)
    pub predicted_ndvi: f64,
    /// Above-ground biomass, tons/ha
    pub biomass_estimate: f64,
    pub water_presence_probability: f64,
    pub urban_probability: f64,
    pub deforestation_risk: f64,
    #[serde(default)]
    pub risks: Vec<RiskRecord>,
    #[serde(default)]
    pub recommendations: Vec<RecommendationRecord>,
    /// Subsystem name → confidence tag, passed through to the output unchanged
    #[serde(default)]
    pub model_confidence: BTreeMap<String, ModelConfidence>,
}

impl VisionAssessment {
    /// Reject malformed values before any blending
    ///
    /// # Errors
    /// Returns `FusionError::Validation` naming the first offending field
    pub fn validate(&self) -> FusionResult<()> {
        check(
            "vision.vegetation_health_score",
            self.vegetation_health_score,
            0.0,
            1.0,
        )?;
        check("vision.predicted_ndvi", self.predicted_ndvi, -1.0, 1.0)?;
        check("vision.biomass_estimate", self.biomass_estimate, 0.0, f64::MAX)?;
        check(
            "vision.water_presence_probability",
            self.water_presence_probability,
            0.0,
            1.0,
        )?;
        check("vision.urban_probability", self.urban_probability, 0.0, 1.0)?;
        check("vision.deforestation_risk", self.deforestation_risk, 0.0, 1.0)?;

        if let Some(rec) = self.recommendations.iter().find(|r| r.action.trim().is_empty()) {
            return Err(FusionError::Validation(format!(
                "vision recommendation with {:?} priority has empty action",
                rec.priority
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Risks and recommendations
// ============================================================================

/// Environmental risk category
///
/// Shared by both detection methods so that corroborating detections of the same
/// hazard can be matched across sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskType {
    AirPollution,
    TemperatureStress,
    #[serde(alias = "vegetation_degradation")]
    VegetationDecline,
    #[serde(alias = "deforestation_detected")]
    Deforestation,
    #[serde(alias = "water_scarcity")]
    WaterStress,
    #[serde(alias = "urban_environmental_pressure")]
    UrbanPressure,
}

/// Risk severity, also used for the combined risk level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Moderate,
    High,
}

/// Which model detected a risk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    Traditional,
    Vision,
}

/// A detected environmental risk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskRecord {
    pub risk_type: RiskType,
    pub severity: Severity,
    pub detection_method: DetectionMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RiskRecord {
    pub fn new(risk_type: RiskType, severity: Severity, detection_method: DetectionMethod) -> Self {
        Self {
            risk_type,
            severity,
            detection_method,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Recommendation priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// Provenance of a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    Vision,
    Traditional,
    Hybrid,
}

/// A conservation recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub priority: Priority,
    pub action: String,
    pub source: RecommendationSource,
}

impl RecommendationRecord {
    pub fn new(priority: Priority, action: impl Into<String>, source: RecommendationSource) -> Self {
        Self {
            priority,
            action: action.into(),
            source,
        }
    }
}

// ============================================================================
// Degradation
// ============================================================================

/// Why fusion ran with less than full data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DegradationReason {
    /// Provider did not answer within its timeout
    Timeout { after_ms: u64 },
    /// Provider answered with an error or no data
    Unavailable { message: String },
    /// Reading lacked fields the traditional score needs
    IncompleteReading { missing: Vec<ReadingField> },
    /// Missing reading fields were filled from the configured default policy
    SubstitutedDefaults { fields: Vec<ReadingField> },
}

/// A non-fatal degradation, recorded in the output confidence block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Degradation {
    pub source: SourceKind,
    #[serde(flatten)]
    pub reason: DegradationReason,
}

impl Degradation {
    pub fn new(source: SourceKind, reason: DegradationReason) -> Self {
        Self { source, reason }
    }
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            DegradationReason::Timeout { after_ms } => {
                write!(f, "{} source timed out after {} ms", self.source, after_ms)
            }
            DegradationReason::Unavailable { message } => {
                write!(f, "{} source unavailable: {}", self.source, message)
            }
            DegradationReason::IncompleteReading { missing } => {
                write!(f, "{} reading incomplete, missing {}", self.source, join_fields(missing))
            }
            DegradationReason::SubstitutedDefaults { fields } => {
                write!(f, "{} reading used policy defaults for {}", self.source, join_fields(fields))
            }
        }
    }
}

fn join_fields(fields: &[ReadingField]) -> String {
    fields
        .iter()
        .map(ReadingField::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Validation helpers
// ============================================================================

fn check(name: &str, value: f64, min: f64, max: f64) -> FusionResult<()> {
    if !value.is_finite() {
        return Err(FusionError::Validation(format!("{} is not a finite number", name)));
    }
    if value < min || value > max {
        return Err(FusionError::Validation(format!(
            "{} = {} outside [{}, {}]",
            name, value, min, max
        )));
    }
    Ok(())
}

fn check_optional(name: &str, value: Option<f64>, min: f64, max: f64) -> FusionResult<()> {
    match value {
        Some(v) => check(name, v, min, max),
        None => Ok(()),
    }
}
