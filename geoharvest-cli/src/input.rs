//! Landmarks document shared by `discover` (writer) and `harvest` (reader).
//!
//! ```json
//! {"units": [{"name": "Sibiu", "landmarks": [
//!   {"name": "Turnul Sfatului", "lat": 45.7976, "lon": 24.1519, "kind": "attraction",
//!    "paths": [[{"lat": 45.7970, "lon": 24.1510}, {"lat": 45.7975, "lon": 24.1518}]]}
//! ]}]}
//! ```

use std::io::BufReader;

use camino::Utf8Path;
use geoharvest_coordinator::{Site, WorkUnit};
use geoharvest_core::{
    GeoPoint, GeoPointError, Landmark, LandmarkError, Polyline, PolylineError,
};
use geoharvest_fs::open_utf8_file;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::CliError;

/// Entries of a landmarks document that cannot become work units.
#[derive(Debug, Error)]
pub enum InputError {
    /// A landmark or path node has an out-of-range coordinate.
    #[error("unit {unit:?}, landmark {landmark:?}: {source}")]
    Coordinate {
        /// Unit containing the entry.
        unit: String,
        /// Landmark containing the entry.
        landmark: String,
        /// Validation failure.
        #[source]
        source: GeoPointError,
    },
    /// A landmark has a blank name.
    #[error("unit {unit:?}: {source}")]
    Landmark {
        /// Unit containing the entry.
        unit: String,
        /// Validation failure.
        #[source]
        source: LandmarkError,
    },
    /// An approach path is too short to sample.
    #[error("unit {unit:?}, landmark {landmark:?}: {source}")]
    Path {
        /// Unit containing the entry.
        unit: String,
        /// Landmark owning the path.
        landmark: String,
        /// Validation failure.
        #[source]
        source: PolylineError,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct LandmarkDocument {
    #[serde(default)]
    pub(crate) units: Vec<UnitEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct UnitEntry {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) landmarks: Vec<LandmarkEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct LandmarkEntry {
    pub(crate) name: String,
    pub(crate) lat: f64,
    pub(crate) lon: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) kind: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) paths: Vec<Vec<PointEntry>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub(crate) struct PointEntry {
    pub(crate) lat: f64,
    pub(crate) lon: f64,
}

impl From<&Landmark> for LandmarkEntry {
    fn from(landmark: &Landmark) -> Self {
        let coord = landmark.coord();
        Self {
            name: landmark.name().to_owned(),
            lat: coord.lat(),
            lon: coord.lon(),
            kind: landmark.kind().map(str::to_owned),
            paths: Vec::new(),
        }
    }
}

impl LandmarkDocument {
    /// Validate every entry and build the work units, one per document unit.
    pub(crate) fn into_work_units(self) -> Result<Vec<WorkUnit>, InputError> {
        self.units
            .into_iter()
            .map(|unit| {
                let sites = unit
                    .landmarks
                    .into_iter()
                    .map(|entry| entry.into_site(&unit.name))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(WorkUnit::new(unit.name, sites))
            })
            .collect()
    }

    pub(crate) fn landmark_count(&self) -> usize {
        self.units.iter().map(|unit| unit.landmarks.len()).sum()
    }
}

impl LandmarkEntry {
    fn into_site(self, unit: &str) -> Result<Site, InputError> {
        let coordinate_error = |source| InputError::Coordinate {
            unit: unit.to_owned(),
            landmark: self.name.clone(),
            source,
        };
        let coord = GeoPoint::new(self.lat, self.lon).map_err(coordinate_error)?;
        let paths = self
            .paths
            .iter()
            .map(|nodes| {
                let points = nodes
                    .iter()
                    .map(|node| GeoPoint::new(node.lat, node.lon))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(coordinate_error)?;
                Polyline::new(points).map_err(|source| InputError::Path {
                    unit: unit.to_owned(),
                    landmark: self.name.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let landmark =
            Landmark::new(self.name, coord, self.kind).map_err(|source| InputError::Landmark {
                unit: unit.to_owned(),
                source,
            })?;
        Ok(Site::new(landmark).with_paths(paths))
    }
}

/// Read and validate the landmarks document at `path`.
pub(crate) fn load_work_units(path: &Utf8Path) -> Result<Vec<WorkUnit>, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenInput {
        path: path.to_path_buf(),
        source,
    })?;
    let document: LandmarkDocument =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| CliError::ParseInput {
            path: path.to_path_buf(),
            source,
        })?;
    document
        .into_work_units()
        .map_err(|source| CliError::InvalidInput {
            path: path.to_path_buf(),
            source,
        })
}
