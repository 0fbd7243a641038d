// Confidence Estimator - agreement percentage from inter-model score delta
//
// agreement = clamp(100 − delta, 0, 100); >80 high, >60 medium, else low.

use crate::fusion::{ConfidenceTier, FusionConfidence};
use crate::types::{Degradation, ModelConfidence};
use std::collections::BTreeMap;
use tracing::debug;

/// Agreement percentage above which overall confidence is high
pub const HIGH_CONFIDENCE_AGREEMENT: f64 = 80.0;
/// Agreement percentage above which overall confidence is medium
pub const MEDIUM_CONFIDENCE_AGREEMENT: f64 = 60.0;

/// Agreement percentage (0-100) for a score delta
pub fn agreement_percentage(delta: f64) -> f64 {
    (100.0 - delta).clamp(0.0, 100.0)
}

/// Overall tier for an agreement percentage
pub fn confidence_tier(agreement: f64) -> ConfidenceTier {
    if agreement > HIGH_CONFIDENCE_AGREEMENT {
        ConfidenceTier::High
    } else if agreement > MEDIUM_CONFIDENCE_AGREEMENT {
        ConfidenceTier::Medium
    } else {
        ConfidenceTier::Low
    }
}

/// Estimate fusion confidence
///
/// # Arguments
/// * `delta` - Inter-model score delta; `None` in single-source mode
/// * `model_confidence` - Vision per-subsystem tags, passed through unchanged
/// * `degradations` - Non-fatal degradations recorded during the request
///
/// Without a delta there is nothing to cross-check, so the tier is low and the
/// agreement percentage is absent.
pub fn estimate_confidence(
    delta: Option<f64>,
    model_confidence: BTreeMap<String, ModelConfidence>,
    degradations: Vec<Degradation>,
) -> FusionConfidence {
    let agreement = delta.map(agreement_percentage);
    let overall_tier = agreement.map_or(ConfidenceTier::Low, confidence_tier);

    debug!(
        ?agreement,
        tier = ?overall_tier,
        degradations = degradations.len(),
        "Fusion confidence estimated"
    );

    FusionConfidence {
        overall_tier,
        agreement_percentage: agreement,
        model_confidence,
        degradations,
    }
}
