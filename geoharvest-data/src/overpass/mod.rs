//! Landmark discovery through the Overpass API.
//!
//! One interpreter query per city selects monuments, churches, government
//! buildings, museums, theatres and attractions inside the area carrying the
//! city's name. Only positioned, tagged nodes become landmarks.
//!
//! # Example
//!
//! ```no_run
//! use geoharvest_data::overpass::{OverpassConfig, OverpassLandmarkSource};
//!
//! let source = OverpassLandmarkSource::new(OverpassConfig::default())?;
//! for landmark in source.landmarks("Cluj-Napoca", 3)? {
//!     println!("{}", landmark.name());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod api;
mod source;

pub use source::{DEFAULT_ENDPOINT, OverpassConfig, OverpassError, OverpassLandmarkSource};
