//! Evenly spaced sampling along polylines.
//!
//! [`interpolate`] walks a polyline segment by segment and emits a point every
//! `interval_m` metres of path length. The distance still owed to the next
//! sample is carried across segment boundaries, so spacing stays linear along
//! the whole path rather than restarting at every node.

use std::collections::HashSet;

use crate::GeoPoint;
use crate::geodesy::{destination_point, distance_meters, initial_bearing_degrees};

/// Segments shorter than this are treated as duplicate nodes.
const MIN_SEGMENT_M: f64 = 1e-3;

/// Scale used to round coordinates to 15 decimal places before de-duplication.
const DEDUP_SCALE: f64 = 1e15;

/// How a [`SamplePoint`] was generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleOrigin {
    /// Interpolated along a polyline.
    PathInterpolated,
    /// Placed at the landmark with only the camera heading varying.
    HeadingRing,
    /// Displaced around the landmark at a fixed radius.
    OffsetRing,
}

/// A generated position.
///
/// `id` is sequential within the call that produced the point and only
/// guarantees uniqueness there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    /// Position of the sample.
    pub coord: GeoPoint,
    /// Sequence number within the generating call.
    pub id: usize,
    /// Generator that produced the sample.
    pub origin: SampleOrigin,
}

/// Sample `nodes` every `interval_m` metres.
///
/// The first node is always emitted. Segments shorter than a millimetre are
/// skipped. The trailing stretch after the last full interval produces no
/// point, so the final node is not emitted unless it falls exactly on an
/// interval boundary.
///
/// Repeats are removed after rounding to 15 decimal places, which only
/// catches bit-identical coordinates. Near-duplicates survive; this is a
/// cheap guard against degenerate input, not a spatial de-duplication.
///
/// Returns an empty vector for fewer than two nodes or for an interval that
/// is not a positive finite number.
///
/// # Examples
///
/// ```
/// use geoharvest_core::{GeoPoint, sampler::interpolate};
///
/// let start = GeoPoint::new(0.0, 0.0).expect("valid");
/// let end = GeoPoint::new(0.0, 0.001).expect("valid");
/// let samples = interpolate(&[start, end], 10.0);
/// assert_eq!(samples.first().map(|s| s.coord), Some(start));
/// assert_eq!(samples.len(), 12);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "walking a polyline accumulates floating-point distances"
)]
pub fn interpolate(nodes: &[GeoPoint], interval_m: f64) -> Vec<SamplePoint> {
    let Some(first) = nodes.first() else {
        return Vec::new();
    };
    if nodes.len() < 2 || !interval_m.is_finite() || interval_m <= 0.0 {
        return Vec::new();
    }

    let mut coords = vec![*first];
    let mut until_next = interval_m;

    for (start, end) in nodes.iter().zip(nodes.iter().skip(1)) {
        let mut remaining = distance_meters(*start, *end);
        if remaining < MIN_SEGMENT_M {
            continue;
        }
        // Travel and measurement use different radii: step from the last
        // sample and re-measure what is left of the segment.
        let mut from = *start;
        while until_next <= remaining {
            let next = destination_point(from, initial_bearing_degrees(from, *end), until_next);
            coords.push(next);
            from = next;
            remaining = distance_meters(from, *end);
            until_next = interval_m;
        }
        until_next -= remaining;
    }

    dedup_exact(coords)
        .into_iter()
        .enumerate()
        .map(|(id, coord)| SamplePoint {
            coord,
            id,
            origin: SampleOrigin::PathInterpolated,
        })
        .collect()
}

fn dedup_exact(coords: Vec<GeoPoint>) -> Vec<GeoPoint> {
    let mut seen = HashSet::new();
    coords
        .into_iter()
        .filter(|coord| seen.insert(rounded_key(*coord, DEDUP_SCALE)))
        .collect()
}

/// Hashable key for `coord` rounded to `scale` (e.g. `1e7` for 7 places).
#[expect(clippy::float_arithmetic, reason = "decimal rounding")]
pub(crate) fn rounded_key(coord: GeoPoint, scale: f64) -> (u64, u64) {
    let round = |value: f64| ((value * scale).round() / scale).to_bits();
    (round(coord.lat()), round(coord.lon()))
}
