//! Shared data types for the application.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised while building model values.
#[derive(Debug, Error, PartialEq)]
pub enum PinError {
    #[error("invalid coordinate ({lat}, {lng}): latitude must be in [-90, 90] and longitude in [-180, 180]")]
    InvalidCoordinate { lat: f64, lng: f64 },
}

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting values outside the valid ranges.
    pub fn new(lat: f64, lng: f64) -> Result<Self, PinError> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);

        if valid {
            Ok(Self { lat, lng })
        } else {
            Err(PinError::InvalidCoordinate { lat, lng })
        }
    }

    /// Bring an arbitrary position back onto the globe.
    ///
    /// Latitude is clamped, longitude wraps around the antimeridian.
    pub fn normalized(lat: f64, lng: f64) -> Self {
        let lat = lat.clamp(-90.0, 90.0);
        let lng = if (-180.0..=180.0).contains(&lng) {
            lng
        } else {
            (lng + 180.0).rem_euclid(360.0) - 180.0
        };
        Self { lat, lng }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}

/// A committed annotation. Every field is populated before it reaches the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    pub lat: f64,
    pub lng: f64,
    pub remark: String,
    pub address: String,
}

impl Pin {
    /// Finalize a pending pin with its remark and resolved address.
    pub fn new(at: Coordinate, remark: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            lat: at.lat,
            lng: at.lng,
            remark: remark.into(),
            address: address.into(),
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            lat: self.lat,
            lng: self.lng,
        }
    }
}

/// A clicked location awaiting a remark and an address.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingPin {
    pub at: Coordinate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_bounds() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
        assert_eq!(
            Coordinate::new(91.0, 0.0),
            Err(PinError::InvalidCoordinate { lat: 91.0, lng: 0.0 })
        );
        assert!(Coordinate::new(0.0, -180.5).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_normalized_wraps_longitude() {
        let c = Coordinate::normalized(95.0, 190.0);
        assert_eq!(c.lat, 90.0);
        assert!((c.lng - -170.0).abs() < 1e-9);

        let c = Coordinate::normalized(-10.0, -200.0);
        assert!((c.lng - 160.0).abs() < 1e-9);

        let c = Coordinate::normalized(51.505, -0.09);
        assert_eq!(c, Coordinate { lat: 51.505, lng: -0.09 });
    }

    #[test]
    fn test_display_uses_six_decimals() {
        let c = Coordinate::new(51.505, -0.09).unwrap();
        assert_eq!(c.to_string(), "51.505000, -0.090000");
    }

    #[test]
    fn test_pin_record_shape() {
        let pin = Pin::new(Coordinate::new(1.5, 2.5).unwrap(), "Cafe", "Somewhere");
        let json = serde_json::to_value(&pin).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"lat": 1.5, "lng": 2.5, "remark": "Cafe", "address": "Somewhere"})
        );
    }
}
