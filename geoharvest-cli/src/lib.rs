//! Command-line interface for Geoharvest.
//!
//! `discover` turns city names into a landmarks document via Overpass;
//! `harvest` downloads street-level imagery around those landmarks.
#![forbid(unsafe_code)]

use camino::Utf8Path;
use clap::{Parser, Subcommand};
use serde::Serialize;

mod discover;
mod error;
mod harvest;
mod input;

pub use error::CliError;
pub use input::InputError;

use discover::{DiscoverArgs, run_discover};
use harvest::{HarvestArgs, run_harvest};

pub(crate) const ARG_HARVEST_INPUT: &str = "input";
pub(crate) const ARG_HARVEST_OUTPUT_DIR: &str = "output-dir";
pub(crate) const ARG_HARVEST_API_KEY: &str = "api-key";
pub(crate) const ARG_DISCOVER_CITY: &str = "city";
pub(crate) const ENV_HARVEST_INPUT: &str = "GEOHARVEST_CMDS_HARVEST_INPUT";
pub(crate) const ENV_HARVEST_API_KEY: &str = "GEOHARVEST_CMDS_HARVEST_API_KEY";
pub(crate) const ENV_DISCOVER_CITY: &str = "GEOHARVEST_CMDS_DISCOVER_CITIES";

/// Run the Geoharvest CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when arguments or configuration are invalid, inputs
/// cannot be read, or outputs cannot be written. Per-image failures during a
/// harvest are logged and do not surface here.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Harvest(args) => {
            let report = run_harvest(args)?;
            log::info!(
                "harvested {} images ({} viewpoints, {} fetch failures)",
                report.stats.images_persisted,
                report.stats.viewpoints_attempted,
                report.stats.fetch_failures
            );
        }
        Command::Discover(args) => {
            let _document = run_discover(args)?;
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(
    name = "geoharvest",
    about = "Collect geolocated street-level images of city landmarks",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Download images around the landmarks in a landmarks document.
    Harvest(HarvestArgs),
    /// Find landmarks per city and write a landmarks document.
    Discover(DiscoverArgs),
}

fn require_existing_file(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match geoharvest_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn write_json<T: Serialize + ?Sized>(
    path: &Utf8Path,
    what: &'static str,
    value: &T,
) -> Result<(), CliError> {
    let mut payload = serde_json::to_vec_pretty(value)
        .map_err(|source| CliError::SerialiseOutput { what, source })?;
    payload.push(b'\n');
    geoharvest_fs::write_file_bytes(path, &payload).map_err(|source| CliError::WriteOutput {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests;
