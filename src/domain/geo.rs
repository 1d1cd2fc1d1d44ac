//! Validated geographic coordinates.

use serde::Serialize;

use crate::error::RealtimeError;

/// A latitude/longitude pair validated at construction.
///
/// The only way to obtain a `GeoPoint` is [`GeoPoint::new`], which
/// rejects out-of-range coordinates instead of clamping them. The type
/// is serialize-only: raw wire coordinates stay `f64` until an envelope
/// constructor validates them, so no deserialized value can carry an
/// invalid position past this gate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Validates and wraps a coordinate pair.
    ///
    /// Latitude must lie in `[-90, 90]` and longitude in `[-180, 180]`.
    /// NaN fails both checks.
    ///
    /// # Errors
    ///
    /// Returns [`RealtimeError::Validation`] for out-of-range values.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, RealtimeError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(RealtimeError::Validation(format!(
                "latitude {latitude} out of range [-90, 90]"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(RealtimeError::Validation(format!(
                "longitude {longitude} out of range [-180, 180]"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Returns the latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Returns the longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}
