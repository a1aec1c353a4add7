//! Facade crate for the Geoharvest image acquisition engine.
//!
//! This crate re-exports the core domain types and the acquisition
//! coordinator, and exposes the HTTP providers and filesystem sink behind
//! feature flags.

#![forbid(unsafe_code)]

pub use geoharvest_core::{
    AcquisitionRecord, Candidate, CandidateScorer, GeoPoint, ImageProvider, ImageSink, Landmark,
    PersistError, Polyline, ProviderError, ProximityScorer, SearchQuery, Viewpoint,
    ViewpointPlan,
};

pub use geoharvest_coordinator::{
    AcquisitionConfig, AcquisitionError, Coordinator, RetryPolicy, RunReport, RunStats, Site,
    WorkUnit,
};

#[cfg(feature = "providers")]
pub use geoharvest_data::{
    MapillaryConfig, MapillaryProvider, OverpassConfig, OverpassLandmarkSource, PlacesConfig,
    PlacesProvider, StreetViewConfig, StreetViewProvider,
};

#[cfg(feature = "fs")]
pub use geoharvest_fs::FsImageSink;
