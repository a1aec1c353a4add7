//! Provider search results.

use std::time::SystemTime;

use crate::GeoPoint;

/// An image reference returned by a provider search, before it is ranked or
/// fetched.
///
/// `locator` is opaque to everything but the provider that produced it; it
/// carries whatever the provider needs to download the bytes later (a
/// thumbnail URL, a signed request, a photo reference).
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Provider-side identifier, used in logs.
    pub provider_ref: String,
    /// Provider-specific fetch payload.
    pub locator: String,
    /// Where the image was captured, when the provider knows.
    pub coord: Option<GeoPoint>,
    /// Capture time, when the provider knows.
    pub captured_at: Option<SystemTime>,
    /// Camera compass angle in degrees, when the provider knows.
    pub compass_angle: Option<f64>,
}

impl Candidate {
    /// Construct a candidate without optional metadata.
    #[must_use]
    pub fn new(provider_ref: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            provider_ref: provider_ref.into(),
            locator: locator.into(),
            coord: None,
            captured_at: None,
            compass_angle: None,
        }
    }

    /// Attach the capture position.
    #[must_use]
    pub fn with_coord(mut self, coord: GeoPoint) -> Self {
        self.coord = Some(coord);
        self
    }

    /// Attach the capture time.
    #[must_use]
    pub fn with_captured_at(mut self, captured_at: SystemTime) -> Self {
        self.captured_at = Some(captured_at);
        self
    }

    /// Attach the camera compass angle.
    #[must_use]
    pub fn with_compass_angle(mut self, degrees: f64) -> Self {
        self.compass_angle = Some(degrees);
        self
    }
}

/// A candidate paired with its ranking score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    /// Ranked candidate.
    pub candidate: Candidate,
    /// Heuristic score; higher is better.
    pub score: f64,
}
