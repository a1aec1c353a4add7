//! Mapillary Graph API image provider.
//!
//! Searches query the `images` endpoint inside a bounding box around the
//! viewpoint and return every image that exposes a 2048 px thumbnail. Fetches
//! download that thumbnail.
//!
//! # Example
//!
//! ```no_run
//! use geoharvest_core::{GeoPoint, ImageProvider, SearchQuery};
//! use geoharvest_data::mapillary::{MapillaryConfig, MapillaryProvider};
//!
//! let provider = MapillaryProvider::new(MapillaryConfig::new("MLY|token"))?;
//! let query = SearchQuery {
//!     center: GeoPoint::new(46.7699, 23.5897)?,
//!     radius_meters: 150.0,
//!     keyword: None,
//!     heading: None,
//! };
//! let candidates = provider.search(&query)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod api;
mod provider;

pub use provider::{DEFAULT_BASE_URL, DEFAULT_LIMIT, MapillaryConfig, MapillaryProvider};
