//! Assessment service
//!
//! Orchestrates one request: both providers run concurrently, each under its
//! own timeout. A failed or timed-out provider becomes a degradation record and
//! the request continues with whatever resolved. The service holds only
//! immutable state and is shared across tasks through `Arc`.

use crate::config::FusionSettings;
use crate::error::{FusionError, FusionResult, ProviderError};
use crate::fusion::{ConsensusFusionEngine, FusedAssessment, FusionInput};
use crate::providers::{TraditionalReadingProvider, VisionAssessmentProvider};
use crate::types::{Degradation, DegradationReason, SourceKind};
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use terrafuse_common::Coordinates;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Concurrent fetch + fusion for a coordinate
pub struct AssessmentService {
    traditional: Arc<dyn TraditionalReadingProvider>,
    vision: Arc<dyn VisionAssessmentProvider>,
    engine: ConsensusFusionEngine,
    traditional_timeout: Duration,
    vision_timeout: Duration,
}

impl AssessmentService {
    pub fn new(
        traditional: Arc<dyn TraditionalReadingProvider>,
        vision: Arc<dyn VisionAssessmentProvider>,
        settings: &FusionSettings,
    ) -> Self {
        Self {
            traditional,
            vision,
            engine: ConsensusFusionEngine::from_settings(settings),
            traditional_timeout: settings.traditional_timeout(),
            vision_timeout: settings.vision_timeout(),
        }
    }

    /// Assess a coordinate
    ///
    /// # Errors
    /// * `FusionError::Validation` - coordinates out of range, or a provider
    ///   returned a malformed payload
    /// * `FusionError::AssessmentUnavailable` - neither provider produced data
    /// * `FusionError::Cancelled` - `cancel` fired before both providers settled
    pub async fn assess(
        &self,
        latitude: f64,
        longitude: f64,
        cancel: &CancellationToken,
    ) -> FusionResult<FusedAssessment> {
        let coordinates = Coordinates::new(latitude, longitude)
            .map_err(|e| FusionError::Validation(e.to_string()))?;

        info!(
            latitude,
            longitude,
            traditional = self.traditional.name(),
            vision = self.vision.name(),
            "Assessment requested"
        );

        let fetch_both = async {
            tokio::join!(
                bounded(
                    SourceKind::Traditional,
                    self.traditional_timeout,
                    self.traditional.fetch(coordinates),
                ),
                bounded(
                    SourceKind::Vision,
                    self.vision_timeout,
                    self.vision.fetch(coordinates),
                ),
            )
        };

        let (reading, vision) = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(%coordinates, "Assessment cancelled");
                return Err(FusionError::Cancelled);
            }
            resolved = fetch_both => resolved,
        };

        let mut degradations = Vec::new();
        let reading = settle(reading, &mut degradations);
        let vision = settle(vision, &mut degradations);

        self.engine.fuse(
            FusionInput::new(coordinates, reading.as_ref(), vision.as_ref())
                .with_degradations(degradations),
            Utc::now(),
        )
    }

    /// Assess without a caller-held cancellation token
    pub async fn assess_uncancellable(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> FusionResult<FusedAssessment> {
        self.assess(latitude, longitude, &CancellationToken::new())
            .await
    }
}

/// Outcome of one provider call
enum Fetched<T> {
    Ready(T),
    Degraded(Degradation),
}

/// Run a provider call under its timeout, folding every failure into a degradation
async fn bounded<T, F>(kind: SourceKind, limit: Duration, call: F) -> Fetched<T>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(value)) => {
            debug!(source = %kind, "Provider resolved");
            Fetched::Ready(value)
        }
        Ok(Err(e)) => {
            warn!(source = %kind, error = %e, "Provider failed, continuing without it");
            Fetched::Degraded(Degradation::new(
                kind,
                DegradationReason::Unavailable {
                    message: e.to_string(),
                },
            ))
        }
        Err(_) => {
            let after_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
            warn!(source = %kind, after_ms, "Provider timed out, continuing without it");
            Fetched::Degraded(Degradation::new(
                kind,
                DegradationReason::Timeout { after_ms },
            ))
        }
    }
}

fn settle<T>(fetched: Fetched<T>, degradations: &mut Vec<Degradation>) -> Option<T> {
    match fetched {
        Fetched::Ready(value) => Some(value),
        Fetched::Degraded(degradation) => {
            degradations.push(degradation);
            None
        }
    }
}
