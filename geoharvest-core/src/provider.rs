//! Image provider capability.
//!
//! The acquisition coordinator depends only on [`ImageProvider`]; concrete
//! HTTP clients live in `geoharvest-data`.

use std::time::Duration;

use thiserror::Error;

use crate::{Candidate, GeoPoint};

/// Parameters for a provider search around one viewpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    /// Camera position to search around.
    pub center: GeoPoint,
    /// Search radius in metres.
    pub radius_meters: f64,
    /// Optional free-text hint, usually the landmark name.
    pub keyword: Option<String>,
    /// Camera heading for providers that render a view on demand.
    pub heading: Option<f64>,
}

/// Failure reported by an [`ImageProvider`].
///
/// Only [`ProviderError::Transient`] failures of
/// [`ImageProvider::fetch`] are retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Network failure, timeout, throttling or a server-side error.
    #[error("{provider} request failed transiently: {message}")]
    Transient {
        /// Provider name.
        provider: String,
        /// Human-readable detail.
        message: String,
    },
    /// Client error, malformed response or missing imagery.
    #[error("{provider} request failed: {message}")]
    Permanent {
        /// Provider name.
        provider: String,
        /// Human-readable detail.
        message: String,
    },
}

impl ProviderError {
    /// Build a transient error.
    pub fn transient(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transient {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Build a permanent error.
    pub fn permanent(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Permanent {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Report whether retrying the same request may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

/// Search for and download imagery.
///
/// Implementations must be `Send + Sync`: one provider instance is shared by
/// every worker of an acquisition run, and each worker calls it
/// sequentially. Calls may block.
///
/// # Examples
///
/// ```
/// use geoharvest_core::{Candidate, GeoPoint, ImageProvider, ProviderError, SearchQuery};
///
/// struct Blank;
///
/// impl ImageProvider for Blank {
///     fn name(&self) -> &str {
///         "blank"
///     }
///
///     fn search(&self, query: &SearchQuery) -> Result<Vec<Candidate>, ProviderError> {
///         Ok(vec![Candidate::new("only", "only").with_coord(query.center)])
///     }
///
///     fn fetch(&self, _candidate: &Candidate) -> Result<Vec<u8>, ProviderError> {
///         Ok(Vec::new())
///     }
/// }
///
/// let query = SearchQuery {
///     center: GeoPoint::new(0.0, 0.0).expect("valid"),
///     radius_meters: 50.0,
///     keyword: None,
///     heading: None,
/// };
/// assert_eq!(Blank.search(&query).map(|c| c.len()), Ok(1));
/// ```
pub trait ImageProvider: Send + Sync {
    /// Short lowercase name used in filenames and logs.
    fn name(&self) -> &str;

    /// Return candidate images for `query`, in the provider's own order.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the search cannot be completed.
    fn search(&self, query: &SearchQuery) -> Result<Vec<Candidate>, ProviderError>;

    /// Download the image bytes for `candidate`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the download fails; transient errors
    /// are retried by the caller.
    fn fetch(&self, candidate: &Candidate) -> Result<Vec<u8>, ProviderError>;

    /// Pause applied by each worker after every successful fetch.
    fn request_delay(&self) -> Duration {
        Duration::ZERO
    }
}

impl<P> ImageProvider for Box<P>
where
    P: ImageProvider + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    fn search(&self, query: &SearchQuery) -> Result<Vec<Candidate>, ProviderError> {
        (**self).search(query)
    }

    fn fetch(&self, candidate: &Candidate) -> Result<Vec<u8>, ProviderError> {
        (**self).fetch(candidate)
    }

    fn request_delay(&self) -> Duration {
        (**self).request_delay()
    }
}
