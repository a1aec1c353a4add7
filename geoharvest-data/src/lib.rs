//! Remote data sources for Geoharvest.
//!
//! Responsibilities:
//! - Implement [`geoharvest_core::ImageProvider`] for Mapillary, Google
//!   Street View and Google Places photos.
//! - Discover landmarks per city through the Overpass API.
//!
//! Boundaries:
//! - Do not encode sampling or ranking rules (live in `geoharvest-core`).
//! - Expose blocking APIs; async HTTP stays internal to each client.
//!
//! Invariants:
//! - Clients are `Send + Sync` and safe to share between acquisition workers.
//! - Credentials never appear in error messages or logs.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod http;
pub mod mapillary;
pub mod overpass;
pub mod places;
pub mod street_view;

pub use http::{ClientBuildError, DEFAULT_USER_AGENT, HttpSettings};
pub use mapillary::{MapillaryConfig, MapillaryProvider};
pub use overpass::{OverpassConfig, OverpassError, OverpassLandmarkSource};
pub use places::{PlacesConfig, PlacesProvider};
pub use street_view::{StreetViewConfig, StreetViewProvider};
