//! Discover command: build a landmarks document from Overpass.

use camino::Utf8PathBuf;
use clap::Parser;
use geoharvest_core::Landmark;
use geoharvest_data::{OverpassConfig, OverpassError, OverpassLandmarkSource};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::input::{LandmarkDocument, LandmarkEntry, UnitEntry};
use crate::{ARG_DISCOVER_CITY, CliError, ENV_DISCOVER_CITY, write_json};

const DEFAULT_LIMIT: usize = 3;
const DEFAULT_OUTPUT: &str = "landmarks.json";

/// CLI arguments for the `discover` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Query the Overpass API for notable landmarks in each city \
                 and write a landmarks document that `harvest` can consume.",
    about = "Discover landmarks per city"
)]
#[ortho_config(prefix = "GEOHARVEST")]
pub(crate) struct DiscoverArgs {
    /// City names, matched against OpenStreetMap area names.
    #[arg(value_name = ARG_DISCOVER_CITY)]
    #[serde(default)]
    pub(crate) cities: Vec<String>,
    /// Landmarks kept per city (default: 3).
    #[arg(long, value_name = "n")]
    #[serde(default)]
    pub(crate) limit: Option<usize>,
    /// Destination of the landmarks document (default: `landmarks.json`).
    #[arg(long, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
    /// Overpass interpreter endpoint.
    #[arg(long = "overpass-url", value_name = "url")]
    #[serde(default)]
    pub(crate) overpass_url: Option<String>,
}

impl DiscoverArgs {
    pub(crate) fn into_config(self) -> Result<DiscoverConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        DiscoverConfig::try_from(merged)
    }
}

/// Resolved `discover` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DiscoverConfig {
    pub(crate) cities: Vec<String>,
    pub(crate) limit: usize,
    pub(crate) output: Utf8PathBuf,
    pub(crate) overpass_url: String,
}

impl TryFrom<DiscoverArgs> for DiscoverConfig {
    type Error = CliError;

    fn try_from(args: DiscoverArgs) -> Result<Self, Self::Error> {
        let cities: Vec<String> = args
            .cities
            .into_iter()
            .map(|city| city.trim().to_owned())
            .filter(|city| !city.is_empty())
            .collect();
        if cities.is_empty() {
            return Err(CliError::MissingArgument {
                field: ARG_DISCOVER_CITY,
                env: ENV_DISCOVER_CITY,
            });
        }
        Ok(Self {
            cities,
            limit: args.limit.unwrap_or(DEFAULT_LIMIT),
            output: args
                .output
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_OUTPUT)),
            overpass_url: args
                .overpass_url
                .unwrap_or_else(|| OverpassConfig::default().endpoint),
        })
    }
}

/// Looks up landmarks for one city.
pub(crate) trait CityLandmarks {
    fn landmarks(&self, city: &str, limit: usize) -> Result<Vec<Landmark>, OverpassError>;
}

impl CityLandmarks for OverpassLandmarkSource {
    fn landmarks(&self, city: &str, limit: usize) -> Result<Vec<Landmark>, OverpassError> {
        Self::landmarks(self, city, limit)
    }
}

pub(crate) fn run_discover(args: DiscoverArgs) -> Result<LandmarkDocument, CliError> {
    let config = args.into_config()?;
    let source = OverpassLandmarkSource::new(
        OverpassConfig::default().with_endpoint(config.overpass_url.clone()),
    )
    .map_err(|source| CliError::BuildClient {
        client: "overpass",
        source,
    })?;
    let document = discover_with(&config, &source);
    write_json(&config.output, "landmarks document", &document)?;
    log::info!(
        "wrote {} landmarks in {} cities to {}",
        document.landmark_count(),
        document.units.len(),
        config.output
    );
    Ok(document)
}

/// Query every configured city, skipping cities that fail or yield nothing.
pub(crate) fn discover_with(
    config: &DiscoverConfig,
    source: &dyn CityLandmarks,
) -> LandmarkDocument {
    let units = config
        .cities
        .iter()
        .filter_map(|city| match source.landmarks(city, config.limit) {
            Ok(landmarks) if landmarks.is_empty() => {
                log::warn!("no landmarks found in {city}");
                None
            }
            Ok(landmarks) => Some(UnitEntry {
                name: city.clone(),
                landmarks: landmarks.iter().map(LandmarkEntry::from).collect(),
            }),
            Err(err) => {
                log::warn!("skipping {city}: {err}");
                None
            }
        })
        .collect();
    LandmarkDocument { units }
}
