// Recommendation Consensus - vision first, then hybrid, truncated to top-K

use crate::fusion::{RankedRecommendation, RankedRecommendations};
use crate::types::{Priority, RecommendationRecord, RecommendationSource};
use tracing::debug;

/// Source-independent recommendations appended after the vision list
pub fn hybrid_recommendations() -> Vec<RecommendationRecord> {
    vec![
        RecommendationRecord::new(
            Priority::Medium,
            "Implement environmental monitoring system",
            RecommendationSource::Hybrid,
        ),
        RecommendationRecord::new(
            Priority::Low,
            "Establish community environmental awareness program",
            RecommendationSource::Hybrid,
        ),
    ]
}

/// Rank recommendations and keep the first `top_k`
///
/// Vision recommendations keep their provider order and are tagged
/// `RecommendationSource::Vision`; hybrid ones follow.
pub fn rank_recommendations(vision: &[RecommendationRecord], top_k: usize) -> RankedRecommendations {
    let candidates: Vec<RecommendationRecord> = vision
        .iter()
        .cloned()
        .map(|mut r| {
            r.source = RecommendationSource::Vision;
            r
        })
        .chain(hybrid_recommendations())
        .collect();

    let total_recommendations = candidates.len();
    let entries: Vec<RankedRecommendation> = candidates
        .into_iter()
        .take(top_k)
        .enumerate()
        .map(|(i, record)| RankedRecommendation {
            rank: i + 1,
            priority: record.priority,
            action: record.action,
            source: record.source,
        })
        .collect();

    debug!(
        "Kept {} of {} recommendations (top_k={})",
        entries.len(),
        total_recommendations,
        top_k
    );

    RankedRecommendations {
        entries,
        total_recommendations,
    }
}
