//! Core domain types for the Geoharvest imagery harvester.
//!
//! The crate covers everything that can be decided without touching the
//! network: spherical geodesy helpers, viewpoint generation around landmarks
//! and along paths, candidate ranking, and the capability traits that image
//! providers and persistence sinks implement.
//!
//! Coordinates are WGS84 degrees. [`GeoPoint`] converts to and from
//! [`geo::Coord`] with `x = longitude` and `y = latitude`.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod candidate;
pub mod geodesy;
mod geo_point;
mod landmark;
mod polyline;
mod provider;
mod ranker;
pub mod sampler;
mod sink;
pub mod viewpoint;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use candidate::{Candidate, ScoredCandidate};
pub use geo_point::{GeoPoint, GeoPointError};
pub use geodesy::{BoundingBox, GeodesyError};
pub use landmark::{Landmark, LandmarkError};
pub use polyline::{Polyline, PolylineError};
pub use provider::{ImageProvider, ProviderError, SearchQuery};
pub use ranker::{CandidateScorer, ProximityScorer, rank, rank_with};
pub use sampler::{SampleOrigin, SamplePoint};
pub use sink::{AcquisitionRecord, ImageSink, PersistError};
pub use viewpoint::{Viewpoint, ViewpointPlan};
