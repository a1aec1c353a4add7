//! Error types emitted by the Geoharvest CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use geoharvest_coordinator::AcquisitionError;
use geoharvest_data::ClientBuildError;
use thiserror::Error;

use crate::input::InputError;

/// Errors emitted by the Geoharvest CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Option or argument name.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Option or argument name.
        field: &'static str,
        /// Path involved.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Option or argument name.
        field: &'static str,
        /// Path involved.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Option or argument name.
        field: &'static str,
        /// Path involved.
        path: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
    /// The output directory exists but is not a directory.
    #[error("output directory {path:?} is not a directory")]
    OutputDirectoryNotDirectory {
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// Opening the landmarks document failed.
    #[error("failed to open landmarks at {path:?}: {source}")]
    OpenInput {
        /// Path involved.
        path: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
    /// The landmarks document is not valid JSON.
    #[error("failed to parse landmarks JSON at {path:?}: {source}")]
    ParseInput {
        /// Path involved.
        path: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: serde_json::Error,
    },
    /// The landmarks document contains invalid entries.
    #[error("landmarks in {path:?} failed validation: {source}")]
    InvalidInput {
        /// Path involved.
        path: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: InputError,
    },
    /// Constructing an HTTP client failed.
    #[error("failed to build {client} client: {source}")]
    BuildClient {
        /// Client that failed to build.
        client: &'static str,
        /// Underlying failure.
        #[source]
        source: ClientBuildError,
    },
    /// Preparing the image directory failed.
    #[error("failed to prepare image directory {path:?}: {source}")]
    PrepareImageDirectory {
        /// Path involved.
        path: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
    /// The acquisition run was aborted before any work started.
    #[error("acquisition aborted: {0}")]
    Acquisition(#[from] AcquisitionError),
    /// Serialising an output document failed.
    #[error("failed to serialise {what}: {source}")]
    SerialiseOutput {
        /// Document being serialised.
        what: &'static str,
        /// Underlying failure.
        #[source]
        source: serde_json::Error,
    },
    /// Writing an output document failed.
    #[error("failed to write {path:?}: {source}")]
    WriteOutput {
        /// Path involved.
        path: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
}
