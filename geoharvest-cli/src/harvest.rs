//! Harvest command implementation for the Geoharvest CLI.

use std::num::NonZeroUsize;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, ValueEnum};
use geoharvest_coordinator::{AcquisitionConfig, Coordinator, RunReport, WorkUnit};
use geoharvest_core::{AcquisitionRecord, ImageProvider, ViewpointPlan};
use geoharvest_data::{
    MapillaryConfig, MapillaryProvider, PlacesConfig, PlacesProvider, StreetViewConfig,
    StreetViewProvider,
};
use geoharvest_fs::FsImageSink;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::input::load_work_units;
use crate::{
    ARG_HARVEST_API_KEY, ARG_HARVEST_INPUT, ARG_HARVEST_OUTPUT_DIR, CliError,
    ENV_HARVEST_API_KEY, ENV_HARVEST_INPUT, require_existing_file, write_json,
};

/// Directory under the output directory receiving the images.
pub(crate) const IMAGES_DIR: &str = "images";
/// File under the output directory receiving the records.
pub(crate) const RECORDS_FILE: &str = "records.json";

const DEFAULT_OUTPUT_DIR: &str = "harvest";

/// Street-level imagery service to query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum ProviderKind {
    /// Mapillary Graph API.
    #[default]
    Mapillary,
    /// Google Street View Static API.
    StreetView,
    /// Google Places photos.
    Places,
}

impl ProviderKind {
    const fn label(self) -> &'static str {
        match self {
            Self::Mapillary => "mapillary",
            Self::StreetView => "street-view",
            Self::Places => "places",
        }
    }

    /// Plan used for values the caller leaves unset.
    ///
    /// Places results ignore heading and position within the search radius,
    /// so one viewpoint per landmark is enough.
    fn default_plan(self) -> ViewpointPlan {
        match self {
            Self::Places => ViewpointPlan {
                headings: 1,
                offsets: 0,
                ..ViewpointPlan::default()
            },
            Self::Mapillary | Self::StreetView => ViewpointPlan::default(),
        }
    }
}

/// CLI arguments for the `harvest` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Download street-level images around every landmark in a \
                 landmarks document. Images land in <output-dir>/images and \
                 their coordinates in <output-dir>/records.json.",
    about = "Harvest geolocated images around landmarks"
)]
#[ortho_config(prefix = "GEOHARVEST")]
pub(crate) struct HarvestArgs {
    /// Path to the landmarks JSON document.
    #[arg(long = ARG_HARVEST_INPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) input: Option<Utf8PathBuf>,
    /// Directory receiving images and records (default: `harvest`).
    #[arg(long = ARG_HARVEST_OUTPUT_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) output_dir: Option<Utf8PathBuf>,
    /// Imagery provider.
    #[arg(long, value_enum)]
    #[serde(default)]
    pub(crate) provider: Option<ProviderKind>,
    /// Provider credential: Mapillary access token or Google API key.
    #[arg(long = ARG_HARVEST_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) api_key: Option<String>,
    /// Worker threads; 0 uses the available parallelism.
    #[arg(long, value_name = "n")]
    #[serde(default)]
    pub(crate) workers: Option<usize>,
    /// Images downloaded per viewpoint.
    #[arg(long = "top-k", value_name = "n")]
    #[serde(default)]
    pub(crate) top_k: Option<usize>,
    /// Headings shot from each landmark.
    #[arg(long, value_name = "n")]
    #[serde(default)]
    pub(crate) headings: Option<usize>,
    /// Positions on the offset ring around each landmark.
    #[arg(long, value_name = "n")]
    #[serde(default)]
    pub(crate) offsets: Option<usize>,
    /// Offset ring radius in metres.
    #[arg(long = "offset-radius", value_name = "metres")]
    #[serde(default)]
    pub(crate) offset_radius: Option<f64>,
    /// Spacing of samples along approach paths in metres.
    #[arg(long = "path-interval", value_name = "metres")]
    #[serde(default)]
    pub(crate) path_interval: Option<f64>,
    /// Provider search radius in metres.
    #[arg(long = "search-radius", value_name = "metres")]
    #[serde(default)]
    pub(crate) search_radius: Option<f64>,
}

impl HarvestArgs {
    pub(crate) fn into_config(self) -> Result<HarvestConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        HarvestConfig::try_from(merged)
    }
}

/// Resolved `harvest` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct HarvestConfig {
    pub(crate) input: Utf8PathBuf,
    pub(crate) output_dir: Utf8PathBuf,
    pub(crate) provider: ProviderKind,
    pub(crate) api_key: String,
    pub(crate) acquisition: AcquisitionConfig,
}

impl HarvestConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing_file(&self.input, ARG_HARVEST_INPUT)?;
        if self.output_dir.exists() && !self.output_dir.is_dir() {
            return Err(CliError::OutputDirectoryNotDirectory {
                path: self.output_dir.clone(),
            });
        }
        Ok(())
    }

    pub(crate) fn images_dir(&self) -> Utf8PathBuf {
        self.output_dir.join(IMAGES_DIR)
    }

    pub(crate) fn records_path(&self) -> Utf8PathBuf {
        self.output_dir.join(RECORDS_FILE)
    }
}

impl TryFrom<HarvestArgs> for HarvestConfig {
    type Error = CliError;

    fn try_from(args: HarvestArgs) -> Result<Self, Self::Error> {
        let input = args.input.ok_or(CliError::MissingArgument {
            field: ARG_HARVEST_INPUT,
            env: ENV_HARVEST_INPUT,
        })?;
        let api_key = args
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or(CliError::MissingArgument {
                field: ARG_HARVEST_API_KEY,
                env: ENV_HARVEST_API_KEY,
            })?;

        let provider = args.provider.unwrap_or_default();
        let defaults = AcquisitionConfig::default();
        let default_plan = provider.default_plan();
        let acquisition = AcquisitionConfig {
            workers: args.workers.and_then(NonZeroUsize::new),
            plan: ViewpointPlan {
                headings: args.headings.unwrap_or(default_plan.headings),
                offsets: args.offsets.unwrap_or(default_plan.offsets),
                offset_radius_m: args.offset_radius.unwrap_or(default_plan.offset_radius_m),
                path_interval_m: args.path_interval.unwrap_or(default_plan.path_interval_m),
            },
            search_radius_m: args.search_radius.unwrap_or(defaults.search_radius_m),
            top_k: args.top_k.unwrap_or(defaults.top_k),
            retry: defaults.retry,
        };

        Ok(Self {
            input,
            output_dir: args
                .output_dir
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_OUTPUT_DIR)),
            provider,
            api_key,
            acquisition,
        })
    }
}

pub(crate) fn run_harvest(args: HarvestArgs) -> Result<RunReport, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    let units = load_work_units(&config.input)?;
    match config.provider {
        ProviderKind::Mapillary => {
            let provider = MapillaryProvider::new(MapillaryConfig::new(config.api_key.clone()))
                .map_err(|source| CliError::BuildClient {
                    client: ProviderKind::Mapillary.label(),
                    source,
                })?;
            execute_harvest(&config, units, provider)
        }
        ProviderKind::StreetView => {
            let provider = StreetViewProvider::new(StreetViewConfig::new(config.api_key.clone()))
                .map_err(|source| CliError::BuildClient {
                    client: ProviderKind::StreetView.label(),
                    source,
                })?;
            execute_harvest(&config, units, provider)
        }
        ProviderKind::Places => {
            let provider = PlacesProvider::new(PlacesConfig::new(config.api_key.clone()))
                .map_err(|source| CliError::BuildClient {
                    client: ProviderKind::Places.label(),
                    source,
                })?;
            execute_harvest(&config, units, provider)
        }
    }
}

/// Run the acquisition with `provider` and persist its records.
pub(crate) fn execute_harvest<P: ImageProvider>(
    config: &HarvestConfig,
    units: Vec<WorkUnit>,
    provider: P,
) -> Result<RunReport, CliError> {
    config.acquisition.validate(&units)?;
    let images_dir = config.images_dir();
    let sink = FsImageSink::create(images_dir.clone()).map_err(|source| {
        CliError::PrepareImageDirectory {
            path: images_dir,
            source,
        }
    })?;
    let coordinator = Coordinator::new(provider, sink, config.acquisition.clone());
    let report = coordinator.run(units)?;
    write_records(&config.records_path(), &report.records)?;
    log::info!(
        "harvest wrote {} records to {}",
        report.records.len(),
        config.records_path()
    );
    Ok(report)
}

fn write_records(path: &Utf8Path, records: &[AcquisitionRecord]) -> Result<(), CliError> {
    write_json(path, "acquisition records", records)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<HarvestConfig, CliError> {
    let merged = HarvestArgs::merge_from_layers(layers).map_err(CliError::from)?;
    HarvestConfig::try_from(merged)
}
