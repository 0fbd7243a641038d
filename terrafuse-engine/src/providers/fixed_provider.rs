//! Fixed-value providers
//!
//! Deterministic test doubles and CLI inputs. `FixedReadingProvider` re-stamps
//! the stored reading with the requested coordinates so a single fixture can
//! serve any location.

use super::{TraditionalReadingProvider, VisionAssessmentProvider};
use crate::error::ProviderError;
use crate::types::{EnvironmentalReading, SourceKind, VisionAssessment};
use async_trait::async_trait;
use std::time::Duration;
use terrafuse_common::Coordinates;

/// Returns the same reading for every coordinate, optionally after a delay
#[derive(Debug, Clone)]
pub struct FixedReadingProvider {
    reading: EnvironmentalReading,
    delay: Option<Duration>,
}

impl FixedReadingProvider {
    pub fn new(reading: EnvironmentalReading) -> Self {
        Self {
            reading,
            delay: None,
        }
    }

    /// Simulate upstream latency
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl TraditionalReadingProvider for FixedReadingProvider {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn fetch(&self, coordinates: Coordinates) -> Result<EnvironmentalReading, ProviderError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(EnvironmentalReading {
            coordinates,
            ..self.reading.clone()
        })
    }
}

/// Returns the same vision assessment for every coordinate
#[derive(Debug, Clone)]
pub struct FixedVisionProvider {
    assessment: VisionAssessment,
    delay: Option<Duration>,
}

impl FixedVisionProvider {
    pub fn new(assessment: VisionAssessment) -> Self {
        Self {
            assessment,
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl VisionAssessmentProvider for FixedVisionProvider {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn fetch(&self, _coordinates: Coordinates) -> Result<VisionAssessment, ProviderError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.assessment.clone())
    }
}

/// Always fails with an upstream error
#[derive(Debug, Clone)]
pub struct UnavailableProvider {
    message: String,
}

impl UnavailableProvider {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl TraditionalReadingProvider for UnavailableProvider {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    async fn fetch(&self, _coordinates: Coordinates) -> Result<EnvironmentalReading, ProviderError> {
        Err(ProviderError::Upstream {
            kind: SourceKind::Traditional,
            message: self.message.clone(),
        })
    }
}

#[async_trait]
impl VisionAssessmentProvider for UnavailableProvider {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    async fn fetch(&self, _coordinates: Coordinates) -> Result<VisionAssessment, ProviderError> {
        Err(ProviderError::Upstream {
            kind: SourceKind::Vision,
            message: self.message.clone(),
        })
    }
}
