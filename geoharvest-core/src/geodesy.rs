//! Spherical geodesy helpers.
//!
//! Distances use a mean Earth radius of 6 371 000 m while destination points
//! use the WGS84 equatorial radius of 6 378 137 m. The two constants are kept
//! apart on purpose: each mirrors the approximation its caller was tuned
//! against, and unifying them would shift every generated viewpoint.

use geo::{Coord, Intersects, Rect};
use thiserror::Error;

use crate::GeoPoint;

/// Radius used by [`distance_meters`].
pub const MEAN_EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Radius used by [`destination_point`].
pub const EQUATORIAL_EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Metres per degree of latitude used by [`bounding_box`].
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// Smallest `cos(latitude)` accepted by [`bounding_box`].
const MIN_LATITUDE_COSINE: f64 = 1e-6;

/// Errors raised by [`bounding_box`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeodesyError {
    /// The centre is too close to a pole for the equirectangular scaling.
    #[error("bounding box around latitude {lat} degenerates near the pole")]
    PolarBoundingBox {
        /// Latitude of the rejected centre.
        lat: f64,
    },
    /// The radius was negative or not finite.
    #[error("bounding box radius {radius_m} must be finite and non-negative")]
    InvalidRadius {
        /// Rejected radius in metres.
        radius_m: f64,
    },
}

/// Axis-aligned box in degrees, ordered like the `bbox` query parameter used
/// by imagery APIs: `min_lon, min_lat, max_lon, max_lat`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Western edge.
    pub min_lon: f64,
    /// Southern edge.
    pub min_lat: f64,
    /// Eastern edge.
    pub max_lon: f64,
    /// Northern edge.
    pub max_lat: f64,
}

impl BoundingBox {
    /// Report whether `point` lies inside the box, edges included.
    #[must_use]
    pub fn contains(&self, point: GeoPoint) -> bool {
        Rect::from(*self).intersects(&Coord::from(point))
    }
}

impl From<BoundingBox> for Rect<f64> {
    fn from(bbox: BoundingBox) -> Self {
        Self::new(
            Coord {
                x: bbox.min_lon,
                y: bbox.min_lat,
            },
            Coord {
                x: bbox.max_lon,
                y: bbox.max_lat,
            },
        )
    }
}

/// Haversine great-circle distance between `a` and `b` in metres.
///
/// # Examples
///
/// ```
/// use geoharvest_core::{GeoPoint, geodesy::distance_meters};
///
/// let a = GeoPoint::new(0.0, 0.0).expect("valid");
/// let b = GeoPoint::new(0.0, 1.0).expect("valid");
/// let d = distance_meters(a, b);
/// assert!((d - 111_194.9).abs() < 1.0);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "haversine distance is floating-point trigonometry"
)]
pub fn distance_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat().to_radians();
    let lat2 = b.lat().to_radians();
    let delta_lat = lat2 - lat1;
    let delta_lon = (b.lon() - a.lon()).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    2.0 * h.sqrt().min(1.0).asin() * MEAN_EARTH_RADIUS_M
}

/// Forward azimuth from `a` to `b` in degrees within `0.0..360.0`.
///
/// Returns `0.0` when the points coincide.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "spherical bearing is floating-point trigonometry"
)]
pub fn initial_bearing_degrees(a: GeoPoint, b: GeoPoint) -> f64 {
    if a == b {
        return 0.0;
    }
    let lat1 = a.lat().to_radians();
    let lat2 = b.lat().to_radians();
    let delta_lon = (b.lon() - a.lon()).to_radians();

    let y = delta_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lon.cos();
    normalise_degrees(y.atan2(x).to_degrees())
}

/// Point reached by travelling `distance_m` metres from `origin` along
/// `bearing_deg`.
///
/// The resulting longitude is wrapped back into `-180.0..=180.0`.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "the direct geodetic problem is floating-point trigonometry"
)]
pub fn destination_point(origin: GeoPoint, bearing_deg: f64, distance_m: f64) -> GeoPoint {
    let lat = origin.lat().to_radians();
    let lon = origin.lon().to_radians();
    let bearing = bearing_deg.to_radians();
    let angular = distance_m / EQUATORIAL_EARTH_RADIUS_M;

    let dest_lat = (lat.sin() * angular.cos() + lat.cos() * angular.sin() * bearing.cos())
        .clamp(-1.0, 1.0)
        .asin();
    let dest_lon = lon
        + (bearing.sin() * angular.sin() * lat.cos())
            .atan2(angular.cos() - lat.sin() * dest_lat.sin());

    GeoPoint::from_trusted(
        dest_lat.to_degrees().clamp(-90.0, 90.0),
        wrap_longitude(dest_lon.to_degrees()),
    )
}

/// Equirectangular box extending `radius_m` metres around `center`.
///
/// # Errors
///
/// Returns [`GeodesyError::PolarBoundingBox`] when the centre is so close to
/// a pole that the longitude scale factor blows up, and
/// [`GeodesyError::InvalidRadius`] for negative or non-finite radii.
#[expect(
    clippy::float_arithmetic,
    reason = "metre-to-degree conversion scales by latitude"
)]
pub fn bounding_box(center: GeoPoint, radius_m: f64) -> Result<BoundingBox, GeodesyError> {
    if !radius_m.is_finite() || radius_m < 0.0 {
        return Err(GeodesyError::InvalidRadius { radius_m });
    }
    let cos_lat = center.lat().to_radians().cos();
    if cos_lat.abs() < MIN_LATITUDE_COSINE {
        return Err(GeodesyError::PolarBoundingBox { lat: center.lat() });
    }
    let lat_offset = radius_m / METERS_PER_DEGREE;
    let lon_offset = radius_m / (METERS_PER_DEGREE * cos_lat.abs());

    Ok(BoundingBox {
        min_lon: center.lon() - lon_offset,
        min_lat: center.lat() - lat_offset,
        max_lon: center.lon() + lon_offset,
        max_lat: center.lat() + lat_offset,
    })
}

#[expect(clippy::float_arithmetic, reason = "angle normalisation")]
fn normalise_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round tiny negative inputs up to exactly 360.0.
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

#[expect(clippy::float_arithmetic, reason = "angle normalisation")]
fn wrap_longitude(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) {
        return lon;
    }
    (lon + 180.0).rem_euclid(360.0) - 180.0
}
