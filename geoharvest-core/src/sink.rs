//! Persistence capability and the dataset output row.

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

use crate::GeoPoint;

/// One persisted image and the coordinate it is labelled with.
///
/// This is the unit the downstream dataset consumes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AcquisitionRecord {
    /// Location of the stored image.
    pub image_path: Utf8PathBuf,
    /// Label latitude in degrees.
    pub lat: f64,
    /// Label longitude in degrees.
    pub lon: f64,
}

impl AcquisitionRecord {
    /// Construct a record for an image stored at `image_path`.
    #[must_use]
    pub fn new(image_path: impl Into<Utf8PathBuf>, coord: GeoPoint) -> Self {
        Self {
            image_path: image_path.into(),
            lat: coord.lat(),
            lon: coord.lon(),
        }
    }
}

/// Failure to store image bytes.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Writing to the filesystem failed.
    #[error("failed to write image to {path}")]
    Io {
        /// Target path.
        path: Utf8PathBuf,
        /// Source error from std I/O.
        #[source]
        source: std::io::Error,
    },
    /// The sink refused the file name.
    #[error("sink rejected {file_name}: {reason}")]
    Rejected {
        /// File name that was refused.
        file_name: String,
        /// Why the sink refused it.
        reason: String,
    },
}

/// Store downloaded image bytes.
///
/// Sinks are shared by every worker of an acquisition run and must therefore
/// be `Send + Sync`.
pub trait ImageSink: Send + Sync {
    /// Store `bytes` under `file_name` and return the resulting path.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError`] when the bytes could not be stored; the
    /// caller drops the record and does not retry.
    fn write(&self, file_name: &str, bytes: &[u8]) -> Result<Utf8PathBuf, PersistError>;

    /// Directory or namespace the sink writes into, for logging.
    fn location(&self) -> &Utf8Path;
}
