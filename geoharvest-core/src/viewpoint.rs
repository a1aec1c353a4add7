//! Camera viewpoints around a landmark.
//!
//! Three generators are available:
//!
//! - [`heading_ring`] keeps the camera on the landmark and rotates it through
//!   evenly spaced headings;
//! - [`offset_ring`] places the camera on a circle around the landmark and
//!   points it back at the subject;
//! - [`path_viewpoints`] samples approach paths (for example footways near
//!   the landmark) and points every sample at the subject.
//!
//! [`ViewpointPlan`] combines them into the full set for one landmark. Every
//! viewpoint carries a label that encodes its origin, index and heading; the
//! label is unique within one generating call and ends up in filenames.

use std::collections::HashSet;

use crate::geodesy::{destination_point, initial_bearing_degrees};
use crate::sampler::{SampleOrigin, SamplePoint, rounded_key};
use crate::{GeoPoint, Landmark, Polyline};

/// Scale used to merge path samples shared by overlapping paths.
const PATH_DEDUP_SCALE: f64 = 1e7;

/// A camera position and heading.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewpoint {
    /// Where the camera stands.
    pub sample: SamplePoint,
    /// Compass heading of the shot in degrees within `0.0..360.0`.
    pub heading: f64,
    /// Human-readable identifier, unique within one generating call.
    pub label: String,
}

impl Viewpoint {
    /// Camera position.
    #[must_use]
    pub const fn coord(&self) -> GeoPoint {
        self.sample.coord
    }
}

/// Viewpoint counts and spacing used for every landmark in a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewpointPlan {
    /// Number of headings shot from the landmark itself.
    pub headings: usize,
    /// Number of positions on the offset ring.
    pub offsets: usize,
    /// Radius of the offset ring in metres.
    pub offset_radius_m: f64,
    /// Spacing between samples along approach paths in metres.
    pub path_interval_m: f64,
}

impl Default for ViewpointPlan {
    fn default() -> Self {
        Self {
            headings: 4,
            offsets: 4,
            offset_radius_m: 15.0,
            path_interval_m: 10.0,
        }
    }
}

impl ViewpointPlan {
    /// Report whether the plan can produce any viewpoint without paths.
    #[must_use]
    pub fn has_rings(&self) -> bool {
        self.headings > 0 || (self.offsets > 0 && is_positive(self.offset_radius_m))
    }

    /// Generate every viewpoint for `landmark`.
    ///
    /// Heading-ring viewpoints come first, then the offset ring, then path
    /// samples. Sample ids are renumbered so they run sequentially across all
    /// three families.
    ///
    /// # Examples
    ///
    /// ```
    /// use geoharvest_core::{GeoPoint, Landmark, ViewpointPlan};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let landmark = Landmark::new("Bastion", GeoPoint::new(45.0, 25.0)?, None)?;
    /// let plan = ViewpointPlan { headings: 2, offsets: 3, ..ViewpointPlan::default() };
    /// let viewpoints = plan.plan(&landmark, &[]);
    /// assert_eq!(viewpoints.len(), 5);
    /// assert_eq!(viewpoints.last().map(|v| v.sample.id), Some(4));
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn plan(&self, landmark: &Landmark, paths: &[Polyline]) -> Vec<Viewpoint> {
        let mut viewpoints = heading_ring(landmark, self.headings);
        viewpoints.extend(offset_ring(landmark, self.offsets, self.offset_radius_m));
        viewpoints.extend(path_viewpoints(landmark, paths, self.path_interval_m));
        for (id, viewpoint) in viewpoints.iter_mut().enumerate() {
            viewpoint.sample.id = id;
        }
        viewpoints
    }
}

/// `count` viewpoints at the landmark with headings `i * 360 / count`.
#[must_use]
pub fn heading_ring(landmark: &Landmark, count: usize) -> Vec<Viewpoint> {
    ring_angles(count)
        .enumerate()
        .map(|(id, heading)| Viewpoint {
            sample: SamplePoint {
                coord: landmark.coord(),
                id,
                origin: SampleOrigin::HeadingRing,
            },
            heading,
            label: format!("loc{id}_h{}", whole_degrees(heading)),
        })
        .collect()
}

/// `count` viewpoints `radius_m` metres from the landmark, each facing it.
///
/// Position `i` sits on bearing `i * 360 / count` from the landmark; its
/// heading is the initial bearing from that position back to the landmark.
/// Returns nothing when the radius is not a positive finite number.
#[must_use]
pub fn offset_ring(landmark: &Landmark, count: usize, radius_m: f64) -> Vec<Viewpoint> {
    if !is_positive(radius_m) {
        return Vec::new();
    }
    let target = landmark.coord();
    ring_angles(count)
        .enumerate()
        .map(|(id, bearing)| {
            let coord = destination_point(target, bearing, radius_m);
            let heading = initial_bearing_degrees(coord, target);
            Viewpoint {
                sample: SamplePoint {
                    coord,
                    id,
                    origin: SampleOrigin::OffsetRing,
                },
                heading,
                label: format!(
                    "offset{id}_b{}_ht{}",
                    whole_degrees(bearing),
                    whole_degrees(heading)
                ),
            }
        })
        .collect()
}

/// Samples along `paths`, each facing the landmark.
///
/// Samples shared by several paths are kept once, comparing coordinates
/// rounded to seven decimal places (roughly a centimetre).
#[must_use]
pub fn path_viewpoints(landmark: &Landmark, paths: &[Polyline], interval_m: f64) -> Vec<Viewpoint> {
    let target = landmark.coord();
    let mut seen = HashSet::new();
    paths
        .iter()
        .flat_map(|path| path.interpolate(interval_m))
        .filter(|sample| seen.insert(rounded_key(sample.coord, PATH_DEDUP_SCALE)))
        .enumerate()
        .map(|(id, sample)| {
            let heading = initial_bearing_degrees(sample.coord, target);
            Viewpoint {
                sample: SamplePoint { id, ..sample },
                heading,
                label: format!("path{id}_h{}", whole_degrees(heading)),
            }
        })
        .collect()
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "ring angles divide the circle by a small viewpoint count"
)]
fn ring_angles(count: usize) -> impl Iterator<Item = f64> {
    let step = if count == 0 { 0.0 } else { 360.0 / count as f64 };
    (0..count).map(move |i| i as f64 * step)
}

fn whole_degrees(angle: f64) -> String {
    format!("{:.0}", angle.trunc())
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
