//! Ordered node sequences such as OSM ways.

use thiserror::Error;

use crate::GeoPoint;
use crate::sampler::{SamplePoint, interpolate};

/// Ordered sequence of at least two nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    nodes: Vec<GeoPoint>,
}

/// Errors returned by [`Polyline::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PolylineError {
    /// Fewer than two nodes were supplied.
    #[error("a polyline needs at least two nodes, found {found}")]
    TooFewNodes {
        /// Number of nodes supplied.
        found: usize,
    },
}

impl Polyline {
    /// Validate and construct a [`Polyline`].
    ///
    /// # Errors
    ///
    /// Returns [`PolylineError::TooFewNodes`] for fewer than two nodes.
    pub fn new(nodes: Vec<GeoPoint>) -> Result<Self, PolylineError> {
        if nodes.len() < 2 {
            return Err(PolylineError::TooFewNodes { found: nodes.len() });
        }
        Ok(Self { nodes })
    }

    /// Nodes in path order.
    #[must_use]
    pub fn nodes(&self) -> &[GeoPoint] {
        &self.nodes
    }

    /// Evenly spaced samples along the polyline; see [`interpolate`].
    #[must_use]
    pub fn interpolate(&self, interval_m: f64) -> Vec<SamplePoint> {
        interpolate(&self.nodes, interval_m)
    }
}
