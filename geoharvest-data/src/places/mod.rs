//! Google Places API photo provider.
//!
//! A search runs Nearby Search around the viewpoint with the landmark name as
//! keyword, looks up the first matching place with Place Details and returns
//! its photos as candidates. Fetches download each photo through Place Photo.
//! The API key is only added to the photo URL when downloading, so candidate
//! locators never carry it.
//!
//! # Example
//!
//! ```no_run
//! use geoharvest_core::{GeoPoint, ImageProvider, SearchQuery};
//! use geoharvest_data::places::{PlacesConfig, PlacesProvider};
//!
//! let provider = PlacesProvider::new(PlacesConfig::new("AIza-key"))?;
//! let query = SearchQuery {
//!     center: GeoPoint::new(44.4275, 26.0873)?,
//!     radius_meters: 100.0,
//!     keyword: Some("Palatul Parlamentului".to_owned()),
//!     heading: None,
//! };
//! let candidates = provider.search(&query)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod api;
mod provider;

pub use provider::{DEFAULT_BASE_URL, DEFAULT_MAX_PHOTOS, PlacesConfig, PlacesProvider};
