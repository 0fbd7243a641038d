//! Score Aggregator - single-number scores per source
//!
//! Traditional: `0.3·(100−max(0, aqi−50)) + 0.5·vegetation + 0.2·max(0, 50−|temp−22|)`
//! Vision: `40·health + 25·water + 20·(1−urban) + 15·(1−deforestation)`
//!
//! Both scores are clamped to [0, 100]; AQI above 150 would otherwise drive the
//! air term negative.
//!
//! The traditional score needs aqi, temperature, and vegetation health. A reading
//! missing any of them scores UNAVAILABLE unless the configured
//! [`ReadingDefaults`] policy names a substitute for that field.

use crate::config::ReadingDefaults;
use crate::types::{EnvironmentalReading, ReadingField, VisionAssessment};
use tracing::{debug, info};

/// Air quality weight in the traditional score
pub const AIR_QUALITY_WEIGHT: f64 = 0.3;
/// Vegetation weight in the traditional score
pub const VEGETATION_WEIGHT: f64 = 0.5;
/// Temperature comfort weight in the traditional score
pub const TEMPERATURE_WEIGHT: f64 = 0.2;

/// AQI at or below which air quality carries no penalty
const AQI_PENALTY_THRESHOLD: f64 = 50.0;
/// Temperature (°C) with the best comfort sub-score
const IDEAL_TEMPERATURE_C: f64 = 22.0;
/// Ceiling of the temperature comfort sub-score
const TEMPERATURE_COMFORT_CEILING: f64 = 50.0;

/// Fields the traditional score cannot be computed without
pub const SCORE_INPUTS: [ReadingField; 3] = [
    ReadingField::Aqi,
    ReadingField::TemperatureC,
    ReadingField::VegetationHealth,
];

/// Traditional score outcome
#[derive(Debug, Clone, PartialEq)]
pub enum TraditionalScore {
    /// Score computed; `substituted` lists fields filled from the default policy
    Available {
        value: f64,
        substituted: Vec<ReadingField>,
    },
    /// At least one required field was absent and had no configured default
    Unavailable { missing: Vec<ReadingField> },
}

impl TraditionalScore {
    pub fn value(&self) -> Option<f64> {
        match self {
            TraditionalScore::Available { value, .. } => Some(*value),
            TraditionalScore::Unavailable { .. } => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, TraditionalScore::Available { .. })
    }
}

/// Reduces source payloads to single scores
#[derive(Debug, Clone, Default)]
pub struct ScoreAggregator {
    defaults: ReadingDefaults,
}

impl ScoreAggregator {
    /// Aggregator with an explicit default-substitution policy
    pub fn new(defaults: ReadingDefaults) -> Self {
        if !defaults.is_empty() {
            info!(?defaults, "Reading default-substitution policy active");
        }
        Self { defaults }
    }

    /// Aggregator that never substitutes (absent field ⇒ UNAVAILABLE)
    pub fn strict() -> Self {
        Self::default()
    }

    /// Compute the traditional score from a reading
    pub fn compute_traditional_score(&self, reading: &EnvironmentalReading) -> TraditionalScore {
        let mut missing = Vec::new();
        let mut substituted = Vec::new();
        let mut inputs = [0.0; 3];

        for (slot, field) in inputs.iter_mut().zip(SCORE_INPUTS) {
            match reading.field(field) {
                Some(v) => *slot = v,
                None => match self.defaults.get(field) {
                    Some(v) => {
                        *slot = v;
                        substituted.push(field);
                    }
                    None => missing.push(field),
                },
            }
        }

        if !missing.is_empty() {
            debug!(?missing, "Traditional score unavailable");
            return TraditionalScore::Unavailable { missing };
        }

        let [aqi, temperature, vegetation] = inputs;
        let value = traditional_formula(aqi, temperature, vegetation);
        debug!(value, ?substituted, "Traditional score computed");

        TraditionalScore::Available { value, substituted }
    }

    /// Compute the vision score (0-100) from an assessment
    pub fn vision_score(assessment: &VisionAssessment) -> f64 {
        let vegetation = assessment.vegetation_health_score * 40.0;
        let water = assessment.water_presence_probability * 25.0;
        let urban = (1.0 - assessment.urban_probability) * 20.0;
        let deforestation = (1.0 - assessment.deforestation_risk) * 15.0;

        (vegetation + water + urban + deforestation).clamp(0.0, 100.0)
    }
}

fn traditional_formula(aqi: f64, temperature: f64, vegetation: f64) -> f64 {
    let air = 100.0 - (aqi - AQI_PENALTY_THRESHOLD).max(0.0);
    let comfort = (TEMPERATURE_COMFORT_CEILING - (temperature - IDEAL_TEMPERATURE_C).abs()).max(0.0);

    (AIR_QUALITY_WEIGHT * air + VEGETATION_WEIGHT * vegetation + TEMPERATURE_WEIGHT * comfort)
        .clamp(0.0, 100.0)
}
