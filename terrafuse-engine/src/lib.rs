//! terrafuse-engine library interface
//!
//! Consensus fusion of a reading-based and an imagery-based environmental
//! assessment into one verdict per coordinate.

pub mod aggregator;
pub mod config;
pub mod engine;
pub mod error;
pub mod fusion;
pub mod providers;
pub mod types;

pub use crate::engine::AssessmentService;
pub use crate::error::{FusionError, FusionResult, ProviderError};
pub use crate::fusion::{ConsensusFusionEngine, FusedAssessment, FusionInput};
pub use crate::types::{EnvironmentalReading, VisionAssessment};
