// Vegetation Consensus - weighted health blend with label tie-break
//
// Vision carries 0.7 of the blend and wins label disagreements.

use crate::fusion::{ConsensusConfidence, FusedVegetation, VegetationStatus};
use tracing::{debug, warn};

/// Vision share of the two-sided health blend
pub const VISION_HEALTH_WEIGHT: f64 = 0.7;
/// Traditional share of the two-sided health blend
pub const TRADITIONAL_HEALTH_WEIGHT: f64 = 0.3;

/// Fuse vegetation health from both sources
///
/// # Arguments
/// * `traditional_health` - Reading vegetation health (0-100)
/// * `vision_health` - Vision health score (0.0-1.0)
/// * `vision_ndvi` - Vision predicted NDVI
///
/// # Returns
/// * `None` when neither side has vegetation data
pub fn fuse_vegetation(
    traditional_health: Option<f64>,
    vision_health: Option<f64>,
    vision_ndvi: Option<f64>,
) -> Option<FusedVegetation> {
    let traditional_status = traditional_health.map(VegetationStatus::classify);
    let vision_percent = vision_health.map(|h| h * 100.0);
    let vision_status = vision_percent.map(VegetationStatus::classify);

    let (health_score, consensus_status, confidence_tier) =
        match (traditional_health, vision_percent, traditional_status, vision_status) {
            (Some(trad), Some(vis), Some(trad_label), Some(vis_label)) => {
                let fused = VISION_HEALTH_WEIGHT * vis + TRADITIONAL_HEALTH_WEIGHT * trad;
                if trad_label == vis_label {
                    (fused, vis_label, ConsensusConfidence::High)
                } else {
                    warn!(
                        traditional = %trad_label,
                        vision = %vis_label,
                        "Vegetation labels disagree, using vision label"
                    );
                    (fused, vis_label, ConsensusConfidence::Medium)
                }
            }
            (Some(trad), None, Some(trad_label), _) => {
                (trad, trad_label, ConsensusConfidence::TraditionalOnly)
            }
            (None, Some(vis), _, Some(vis_label)) => {
                (vis, vis_label, ConsensusConfidence::VisionOnly)
            }
            _ => {
                debug!("No vegetation data from either source");
                return None;
            }
        };

    debug!(
        health_score,
        status = %consensus_status,
        confidence = ?confidence_tier,
        "Vegetation fused"
    );

    Some(FusedVegetation {
        ndvi: vision_ndvi,
        health_score,
        consensus_status,
        confidence_tier,
        traditional_status,
        vision_status,
    })
}
