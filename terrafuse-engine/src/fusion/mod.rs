// Fusion Module - consensus over traditional and vision assessments
//
// Architecture: resolved inputs → ScoreAggregator → per-view consensus
// (vegetation, score, risk, recommendation) → ConfidenceEstimator → FusedAssessment

pub mod confidence;
pub mod recommendation;
pub mod risk;
pub mod score;
pub mod vegetation;

use crate::aggregator::{ScoreAggregator, TraditionalScore};
use crate::config::{FusionSettings, DEFAULT_TOP_K};
use crate::error::{FusionError, FusionResult};
use crate::types::{
    Degradation, DegradationReason, EnvironmentalReading, ModelConfidence, Priority,
    RecommendationSource, RiskRecord, Severity, SourceKind, VisionAssessment,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use terrafuse_common::Coordinates;
use tracing::{debug, info, warn};

// ============================================================================
// Output types
// ============================================================================

/// Vegetation health label (same thresholds for both sources)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VegetationStatus {
    Excellent,
    Good,
    Moderate,
    Poor,
    VeryPoor,
}

impl VegetationStatus {
    /// Classify a 0-100 health value: ≥80, ≥60, ≥40, ≥20, else very poor
    pub fn classify(health: f64) -> Self {
        if health >= 80.0 {
            VegetationStatus::Excellent
        } else if health >= 60.0 {
            VegetationStatus::Good
        } else if health >= 40.0 {
            VegetationStatus::Moderate
        } else if health >= 20.0 {
            VegetationStatus::Poor
        } else {
            VegetationStatus::VeryPoor
        }
    }
}

impl fmt::Display for VegetationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            VegetationStatus::Excellent => "excellent",
            VegetationStatus::Good => "good",
            VegetationStatus::Moderate => "moderate",
            VegetationStatus::Poor => "poor",
            VegetationStatus::VeryPoor => "very poor",
        };
        f.write_str(label)
    }
}

/// Confidence in the fused vegetation label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsensusConfidence {
    /// Both sources produced the same label
    High,
    /// Labels differ; vision label used
    Medium,
    TraditionalOnly,
    VisionOnly,
}

/// Agreement between the two environmental scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgreementTier {
    /// delta < 10
    High,
    /// delta < 20
    Medium,
    /// delta ≥ 20
    LowAgreement,
    TraditionalOnly,
    VisionOnly,
}

impl AgreementTier {
    /// Ordering strength for two-sided tiers (higher is stronger)
    ///
    /// Single-source tiers carry no agreement information and return `None`.
    pub fn strength(&self) -> Option<u8> {
        match self {
            AgreementTier::High => Some(2),
            AgreementTier::Medium => Some(1),
            AgreementTier::LowAgreement => Some(0),
            AgreementTier::TraditionalOnly | AgreementTier::VisionOnly => None,
        }
    }
}

/// Overall fusion confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    Low,
    Medium,
    High,
}

/// Fused vegetation view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedVegetation {
    /// Vision NDVI (absent without vision)
    pub ndvi: Option<f64>,
    /// Fused health (0-100)
    pub health_score: f64,
    pub consensus_status: VegetationStatus,
    pub confidence_tier: ConsensusConfidence,
    /// Per-source labels that fed the consensus
    pub traditional_status: Option<VegetationStatus>,
    pub vision_status: Option<VegetationStatus>,
}

/// Fused environmental score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedScore {
    /// Fused score (0-100)
    pub value: f64,
    pub traditional_value: Option<f64>,
    pub vision_value: Option<f64>,
    pub agreement_tier: AgreementTier,
    /// |traditional − vision|; absent in single-source mode
    pub delta: Option<f64>,
}

/// Combined risk view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedRisks {
    /// Every risk from both sources, traditional first
    pub all: Vec<RiskRecord>,
    pub overall_level: Severity,
    /// Records whose type was flagged by both detection methods
    pub consensus_risks: Vec<RiskRecord>,
}

/// One ranked recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRecommendation {
    /// 1-based rank
    pub rank: usize,
    pub priority: Priority,
    pub action: String,
    pub source: RecommendationSource,
}

/// Ranked recommendation list (top-K)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRecommendations {
    pub entries: Vec<RankedRecommendation>,
    /// Candidates before truncation
    pub total_recommendations: usize,
}

/// Fusion confidence block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionConfidence {
    pub overall_tier: ConfidenceTier,
    /// Absent in single-source mode
    pub agreement_percentage: Option<f64>,
    /// Vision per-subsystem tags, unchanged
    pub model_confidence: BTreeMap<String, ModelConfidence>,
    pub degradations: Vec<Degradation>,
}

/// Consensus verdict for one coordinate
///
/// Created once per request and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedAssessment {
    pub coordinates: Coordinates,
    pub produced_at: DateTime<Utc>,
    pub fused_vegetation: Option<FusedVegetation>,
    pub fused_score: Option<FusedScore>,
    pub combined_risks: CombinedRisks,
    pub ranked_recommendations: RankedRecommendations,
    pub fusion_confidence: FusionConfidence,
}

// ============================================================================
// Engine
// ============================================================================

/// Which sources resolved for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    BothReady,
    OneReady(SourceKind),
    NoneReady,
}

impl SourceState {
    pub fn of(traditional: bool, vision: bool) -> Self {
        match (traditional, vision) {
            (true, true) => SourceState::BothReady,
            (true, false) => SourceState::OneReady(SourceKind::Traditional),
            (false, true) => SourceState::OneReady(SourceKind::Vision),
            (false, false) => SourceState::NoneReady,
        }
    }
}

/// Resolved inputs for one fusion
#[derive(Debug, Clone)]
pub struct FusionInput<'a> {
    pub coordinates: Coordinates,
    pub reading: Option<&'a EnvironmentalReading>,
    pub vision: Option<&'a VisionAssessment>,
    /// Degradations recorded while resolving the inputs (timeouts, provider errors)
    pub degradations: Vec<Degradation>,
}

impl<'a> FusionInput<'a> {
    pub fn new(
        coordinates: Coordinates,
        reading: Option<&'a EnvironmentalReading>,
        vision: Option<&'a VisionAssessment>,
    ) -> Self {
        Self {
            coordinates,
            reading,
            vision,
            degradations: Vec::new(),
        }
    }

    pub fn with_degradations(mut self, degradations: Vec<Degradation>) -> Self {
        self.degradations = degradations;
        self
    }
}

/// Pure consensus engine
///
/// Holds only immutable settings; `fuse` has no side effects beyond logging and
/// may be called concurrently from any number of tasks.
#[derive(Debug, Clone)]
pub struct ConsensusFusionEngine {
    aggregator: ScoreAggregator,
    top_k: usize,
}

impl Default for ConsensusFusionEngine {
    fn default() -> Self {
        Self {
            aggregator: ScoreAggregator::strict(),
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl ConsensusFusionEngine {
    pub fn new(aggregator: ScoreAggregator, top_k: usize) -> Self {
        Self {
            aggregator,
            top_k: top_k.max(1),
        }
    }

    pub fn from_settings(settings: &FusionSettings) -> Self {
        Self::new(
            ScoreAggregator::new(settings.reading_defaults.clone()),
            settings.top_k,
        )
    }

    /// Fuse resolved inputs into one assessment
    ///
    /// # Errors
    /// * `FusionError::Validation` - coordinates or either input malformed
    /// * `FusionError::AssessmentUnavailable` - neither input present
    pub fn fuse(
        &self,
        input: FusionInput<'_>,
        produced_at: DateTime<Utc>,
    ) -> FusionResult<FusedAssessment> {
        let FusionInput {
            coordinates,
            reading,
            vision,
            mut degradations,
        } = input;

        coordinates
            .validate()
            .map_err(|e| FusionError::Validation(e.to_string()))?;

        let state = SourceState::of(reading.is_some(), vision.is_some());
        debug!(?state, %coordinates, "Fusion inputs resolved");

        if state == SourceState::NoneReady {
            return Err(unavailable_error(&degradations));
        }

        if let Some(reading) = reading {
            reading.validate()?;
        }
        if let Some(vision) = vision {
            vision.validate()?;
        }

        if let SourceState::OneReady(source) = state {
            warn!(%source, "Single-source fusion");
        }

        // Scores
        let traditional_score = reading.map(|r| self.aggregator.compute_traditional_score(r));
        match &traditional_score {
            Some(TraditionalScore::Unavailable { missing }) => degradations.push(Degradation::new(
                SourceKind::Traditional,
                DegradationReason::IncompleteReading {
                    missing: missing.clone(),
                },
            )),
            Some(TraditionalScore::Available { substituted, .. }) if !substituted.is_empty() => {
                degradations.push(Degradation::new(
                    SourceKind::Traditional,
                    DegradationReason::SubstitutedDefaults {
                        fields: substituted.clone(),
                    },
                ))
            }
            _ => {}
        }
        let traditional_value = traditional_score.as_ref().and_then(TraditionalScore::value);
        let vision_value = vision.map(ScoreAggregator::vision_score);

        // Vegetation: an incomplete reading only contributes when vision is absent
        let reading_complete = traditional_score
            .as_ref()
            .map_or(false, TraditionalScore::is_available);
        let traditional_health = reading
            .and_then(|r| r.vegetation_health)
            .filter(|_| reading_complete || vision.is_none());

        let fused_vegetation = vegetation::fuse_vegetation(
            traditional_health,
            vision.map(|v| v.vegetation_health_score),
            vision.map(|v| v.predicted_ndvi),
        );
        let fused_score = score::fuse_scores(traditional_value, vision_value);

        // Risks and recommendations
        let traditional_risks = reading
            .map(risk::detect_traditional_risks)
            .unwrap_or_default();
        let combined_risks = risk::combine_risks(
            traditional_risks,
            vision.map(|v| v.risks.as_slice()).unwrap_or_default(),
        );
        let ranked_recommendations = recommendation::rank_recommendations(
            vision.map(|v| v.recommendations.as_slice()).unwrap_or_default(),
            self.top_k,
        );

        let fusion_confidence = confidence::estimate_confidence(
            fused_score.as_ref().and_then(|s| s.delta),
            vision.map(|v| v.model_confidence.clone()).unwrap_or_default(),
            degradations,
        );

        info!(
            %coordinates,
            score = ?fused_score.as_ref().map(|s| s.value),
            risks = combined_risks.all.len(),
            confidence = ?fusion_confidence.overall_tier,
            "Assessment fused"
        );

        Ok(FusedAssessment {
            coordinates,
            produced_at,
            fused_vegetation,
            fused_score,
            combined_risks,
            ranked_recommendations,
            fusion_confidence,
        })
    }
}

fn unavailable_error(degradations: &[Degradation]) -> FusionError {
    let reason_for = |source: SourceKind| {
        degradations
            .iter()
            .find(|d| d.source == source)
            .map(|d| d.to_string())
            .unwrap_or_else(|| format!("{} source returned no data", source))
    };

    FusionError::AssessmentUnavailable {
        traditional: reason_for(SourceKind::Traditional),
        vision: reason_for(SourceKind::Vision),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures::{coords, reading, timestamp, vision};

    #[test]
    fn test_classify_thresholds() {
        assert_eq!(VegetationStatus::classify(80.0), VegetationStatus::Excellent);
        assert_eq!(VegetationStatus::classify(79.9), VegetationStatus::Good);
        assert_eq!(VegetationStatus::classify(60.0), VegetationStatus::Good);
        assert_eq!(VegetationStatus::classify(40.0), VegetationStatus::Moderate);
        assert_eq!(VegetationStatus::classify(20.0), VegetationStatus::Poor);
        assert_eq!(VegetationStatus::classify(19.9), VegetationStatus::VeryPoor);
    }

    #[test]
    fn test_source_state() {
        assert_eq!(SourceState::of(true, true), SourceState::BothReady);
        assert_eq!(
            SourceState::of(false, true),
            SourceState::OneReady(SourceKind::Vision)
        );
        assert_eq!(SourceState::of(false, false), SourceState::NoneReady);
    }

    #[test]
    fn test_none_ready_is_unavailable() {
        let engine = ConsensusFusionEngine::default();
        let result = engine.fuse(FusionInput::new(coords(), None, None), timestamp());
        assert!(matches!(result, Err(FusionError::AssessmentUnavailable { .. })));
    }

    #[test]
    fn test_unavailable_names_each_source_once() {
        let engine = ConsensusFusionEngine::default();
        let degradations = vec![
            Degradation::new(
                SourceKind::Traditional,
                DegradationReason::Unavailable {
                    message: "down".into(),
                },
            ),
            Degradation::new(SourceKind::Vision, DegradationReason::Timeout { after_ms: 100 }),
        ];

        let err = engine
            .fuse(
                FusionInput::new(coords(), None, None).with_degradations(degradations),
                timestamp(),
            )
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Assessment unavailable: traditional source unavailable: down; \
             vision source timed out after 100 ms"
        );
    }

    #[test]
    fn test_validation_runs_before_blending() {
        let engine = ConsensusFusionEngine::default();
        let bad = reading(Some(40.0), Some(20.0), Some(-5.0));
        let result = engine.fuse(FusionInput::new(coords(), Some(&bad), None), timestamp());
        assert!(matches!(result, Err(FusionError::Validation(_))));
    }

    #[test]
    fn test_incomplete_reading_recorded_as_degradation() {
        let engine = ConsensusFusionEngine::default();
        let partial = reading(None, Some(20.0), Some(70.0));
        let assessment = vision(0.7);

        let fused = engine
            .fuse(
                FusionInput::new(coords(), Some(&partial), Some(&assessment)),
                timestamp(),
            )
            .unwrap();

        assert_eq!(fused.fusion_confidence.degradations.len(), 1);
        assert_eq!(
            fused.fusion_confidence.degradations[0].source,
            SourceKind::Traditional
        );
    }

    #[test]
    fn test_incomplete_reading_still_used_without_vision() {
        let engine = ConsensusFusionEngine::default();
        let partial = reading(None, None, Some(55.0));

        let fused = engine
            .fuse(FusionInput::new(coords(), Some(&partial), None), timestamp())
            .unwrap();

        let veg = fused.fused_vegetation.unwrap();
        assert_eq!(veg.health_score, 55.0);
        assert_eq!(veg.confidence_tier, ConsensusConfidence::TraditionalOnly);
        assert!(fused.fused_score.is_none());
    }

    #[test]
    fn test_top_k_floor_is_one() {
        let engine = ConsensusFusionEngine::new(ScoreAggregator::strict(), 0);
        let assessment = vision(0.7);

        let fused = engine
            .fuse(FusionInput::new(coords(), None, Some(&assessment)), timestamp())
            .unwrap();
        assert_eq!(fused.ranked_recommendations.entries.len(), 1);
    }

    #[test]
    fn test_agreement_strength_ordering() {
        assert!(AgreementTier::High.strength() > AgreementTier::Medium.strength());
        assert!(AgreementTier::Medium.strength() > AgreementTier::LowAgreement.strength());
        assert_eq!(AgreementTier::VisionOnly.strength(), None);
    }
}
