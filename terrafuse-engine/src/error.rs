//! Error types for terrafuse-engine
//!
//! Only three failures ever reach a caller: malformed input, both sources
//! unavailable, and caller-initiated cancellation. Everything a single provider
//! can go wrong with is folded into a degradation record instead.

use crate::types::SourceKind;
use thiserror::Error;

/// Fusion request error
#[derive(Debug, Error)]
pub enum FusionError {
    /// Malformed or out-of-range input, raised before any blending
    #[error("Validation error: {0}")]
    Validation(String),

    /// Neither the reading nor the vision source produced data
    ///
    /// Each field is a full reason naming its source.
    #[error("Assessment unavailable: {traditional}; {vision}")]
    AssessmentUnavailable { traditional: String, vision: String },

    /// The caller cancelled the request while providers were in flight
    #[error("Assessment request cancelled")]
    Cancelled,
}

impl FusionError {
    /// True for errors the caller can fix by changing the request
    pub fn is_validation(&self) -> bool {
        matches!(self, FusionError::Validation(_))
    }
}

/// Result type for fusion operations
pub type FusionResult<T> = Result<T, FusionError>;

/// Provider (adapter) failure
///
/// Never escapes the fusion boundary. [`crate::engine::AssessmentService`]
/// converts each variant into a [`crate::types::Degradation`].
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Source has no data for this coordinate
    #[error("{0} source has no data for this location")]
    NoData(SourceKind),

    /// Upstream service could not be reached or answered with an error
    #[error("{kind} source failed: {message}")]
    Upstream { kind: SourceKind, message: String },

    /// Upstream answered with a payload that could not be interpreted
    #[error("{kind} source returned an unreadable payload: {message}")]
    Malformed { kind: SourceKind, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_validation_is_caller_fixable() {
        assert!(FusionError::Validation("aqi".into()).is_validation());
        assert!(!FusionError::Cancelled.is_validation());
        assert!(!FusionError::AssessmentUnavailable {
            traditional: "traditional source returned no data".into(),
            vision: "vision source returned no data".into(),
        }
        .is_validation());
    }

    #[test]
    fn test_unavailable_message_names_both_sources() {
        let err = FusionError::AssessmentUnavailable {
            traditional: "traditional source timed out after 10000 ms".into(),
            vision: "vision source returned no data".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("timed out"));
        assert!(msg.contains("no data"));
    }
}
