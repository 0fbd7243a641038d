//! Geographic coordinates

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Latitude bounds in degrees
pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);

/// Longitude bounds in degrees
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

/// WGS84 coordinate pair
///
/// Construct through [`Coordinates::new`] to get range checking. Values outside
/// the valid range are rejected, never clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Create validated coordinates
    ///
    /// # Errors
    /// Returns `Error::InvalidInput` if either value is non-finite or out of range
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let coords = Self {
            latitude,
            longitude,
        };
        coords.validate()?;
        Ok(coords)
    }

    /// Check that both values are finite and within range
    pub fn validate(&self) -> Result<()> {
        check_range("latitude", self.latitude, LATITUDE_RANGE)?;
        check_range("longitude", self.longitude, LONGITUDE_RANGE)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

fn check_range(name: &str, value: f64, (min, max): (f64, f64)) -> Result<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(Error::InvalidInput(format!(
            "{} {} outside [{}, {}]",
            name, value, min, max
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_coordinates() {
        let coords = Coordinates::new(51.5074, -0.1278).unwrap();
        assert_eq!(coords.latitude, 51.5074);
        assert_eq!(coords.longitude, -0.1278);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        assert!(Coordinates::new(90.0, 180.0).is_ok());
        assert!(Coordinates::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(matches!(
            Coordinates::new(90.5, 0.0),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            Coordinates::new(0.0, -180.01),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
        assert!(Coordinates::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_deserialized_coordinates_validate() {
        // Deserialization bypasses `new`, so callers must run `validate`
        let coords = Coordinates {
            latitude: 120.0,
            longitude: 0.0,
        };
        assert!(coords.validate().is_err());
    }
}
