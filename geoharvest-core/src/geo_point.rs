//! Validated WGS84 coordinates.

use geo::Coord;
use thiserror::Error;

/// A latitude/longitude pair in degrees.
///
/// Latitude is kept within `-90.0..=90.0` and longitude within
/// `-180.0..=180.0`; [`GeoPoint::new`] rejects anything else.
///
/// # Examples
///
/// ```
/// use geoharvest_core::GeoPoint;
///
/// # fn main() -> Result<(), geoharvest_core::GeoPointError> {
/// let point = GeoPoint::new(46.7712, 23.6236)?;
/// assert_eq!(point.lat(), 46.7712);
/// assert!(GeoPoint::new(91.0, 0.0).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    lat: f64,
    lon: f64,
}

/// Errors returned by [`GeoPoint::new`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeoPointError {
    /// Latitude was not finite or fell outside `-90..=90`.
    #[error("latitude {lat} is outside -90..=90")]
    LatitudeOutOfRange {
        /// Rejected latitude.
        lat: f64,
    },
    /// Longitude was not finite or fell outside `-180..=180`.
    #[error("longitude {lon} is outside -180..=180")]
    LongitudeOutOfRange {
        /// Rejected longitude.
        lon: f64,
    },
}

impl GeoPoint {
    /// Validate and construct a [`GeoPoint`].
    ///
    /// # Errors
    ///
    /// Returns [`GeoPointError`] when either component is non-finite or out
    /// of range.
    pub fn new(lat: f64, lon: f64) -> Result<Self, GeoPointError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(GeoPointError::LatitudeOutOfRange { lat });
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(GeoPointError::LongitudeOutOfRange { lon });
        }
        Ok(Self { lat, lon })
    }

    /// Build a point from components already known to be in range.
    pub(crate) const fn from_trusted(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn lon(&self) -> f64 {
        self.lon
    }
}

impl From<GeoPoint> for Coord<f64> {
    fn from(point: GeoPoint) -> Self {
        Self {
            x: point.lon,
            y: point.lat,
        }
    }
}

impl TryFrom<Coord<f64>> for GeoPoint {
    type Error = GeoPointError;

    fn try_from(coord: Coord<f64>) -> Result<Self, Self::Error> {
        Self::new(coord.y, coord.x)
    }
}
