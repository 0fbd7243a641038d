// Assessment Providers - external collaborators behind narrow async traits
//
// Live weather/air-quality APIs and the imagery pipeline are implemented outside
// this crate. The engine only sees these two traits, injected at construction.

use crate::error::ProviderError;
use crate::types::{EnvironmentalReading, VisionAssessment};
use async_trait::async_trait;
use terrafuse_common::Coordinates;

pub mod file_provider;
pub mod fixed_provider;

pub use file_provider::{JsonReadingProvider, JsonVisionProvider};
pub use fixed_provider::{FixedReadingProvider, FixedVisionProvider, UnavailableProvider};

/// Reading-based environmental data source
#[async_trait]
pub trait TraditionalReadingProvider: Send + Sync {
    /// Provider identifier for logging (e.g., "open-meteo", "fixture")
    fn name(&self) -> &'static str;

    /// Fetch the latest reading for a coordinate
    ///
    /// # Returns
    /// * `Ok(EnvironmentalReading)` - any individual field may be `None`
    /// * `Err(ProviderError)` - source unavailable (degrades, never aborts)
    async fn fetch(&self, coordinates: Coordinates) -> Result<EnvironmentalReading, ProviderError>;
}

/// Imagery-based assessment source
#[async_trait]
pub trait VisionAssessmentProvider: Send + Sync {
    /// Provider identifier for logging
    fn name(&self) -> &'static str;

    /// Fetch a vision assessment for a coordinate
    async fn fetch(&self, coordinates: Coordinates) -> Result<VisionAssessment, ProviderError>;
}
