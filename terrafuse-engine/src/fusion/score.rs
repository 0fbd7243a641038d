// Score Consensus - weighted ensemble with agreement tiers
//
// fused = 0.6·vision + 0.4·traditional; agreement from |traditional − vision|

use crate::fusion::{AgreementTier, FusedScore};
use tracing::{debug, warn};

/// Vision share of the fused score
pub const VISION_SCORE_WEIGHT: f64 = 0.6;
/// Traditional share of the fused score
pub const TRADITIONAL_SCORE_WEIGHT: f64 = 0.4;

/// Delta below which the models are in high agreement
pub const HIGH_AGREEMENT_DELTA: f64 = 10.0;
/// Delta below which the models are in medium agreement
pub const MEDIUM_AGREEMENT_DELTA: f64 = 20.0;

/// Fuse the two environmental scores
///
/// Single-source cases pass the available score through unchanged.
pub fn fuse_scores(traditional: Option<f64>, vision: Option<f64>) -> Option<FusedScore> {
    let fused = match (traditional, vision) {
        (Some(trad), Some(vis)) => {
            let delta = (trad - vis).abs();
            let agreement_tier = agreement_tier(delta);
            if agreement_tier == AgreementTier::LowAgreement {
                warn!(traditional = trad, vision = vis, delta, "Environmental scores disagree");
            }
            FusedScore {
                value: VISION_SCORE_WEIGHT * vis + TRADITIONAL_SCORE_WEIGHT * trad,
                traditional_value: Some(trad),
                vision_value: Some(vis),
                agreement_tier,
                delta: Some(delta),
            }
        }
        (Some(trad), None) => FusedScore {
            value: trad,
            traditional_value: Some(trad),
            vision_value: None,
            agreement_tier: AgreementTier::TraditionalOnly,
            delta: None,
        },
        (None, Some(vis)) => FusedScore {
            value: vis,
            traditional_value: None,
            vision_value: Some(vis),
            agreement_tier: AgreementTier::VisionOnly,
            delta: None,
        },
        (None, None) => {
            debug!("No environmental score from either source");
            return None;
        }
    };

    debug!(value = fused.value, tier = ?fused.agreement_tier, "Score fused");
    Some(fused)
}

/// Map an inter-model delta to its agreement tier
pub fn agreement_tier(delta: f64) -> AgreementTier {
    if delta < HIGH_AGREEMENT_DELTA {
        AgreementTier::High
    } else if delta < MEDIUM_AGREEMENT_DELTA {
        AgreementTier::Medium
    } else {
        AgreementTier::LowAgreement
    }
}
