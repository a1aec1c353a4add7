//! Behaviour-driven step definitions driving the harvest CLI scenarios.

use super::helpers::{TWO_CITY_DOCUMENT, Workspace};
use super::*;
use crate::harvest::{HarvestConfig, ProviderKind, RECORDS_FILE, execute_harvest};
use crate::input::load_work_units;
use camino::Utf8PathBuf;
use geoharvest_coordinator::{AcquisitionConfig, RunReport};
use geoharvest_core::test_support::FakeProvider;
use geoharvest_core::{AcquisitionRecord, ViewpointPlan};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use std::num::NonZeroUsize;

/// Aggregates harvest scenario state so each step only needs a single world
/// argument.
#[derive(Debug)]
struct HarvestWorld {
    workspace: Workspace,
    input: RefCell<Option<Utf8PathBuf>>,
    outcome: RefCell<Option<Result<RunReport, CliError>>>,
    config_error: RefCell<Option<CliError>>,
}

impl HarvestWorld {
    fn new() -> Self {
        Self {
            workspace: Workspace::new(),
            input: RefCell::new(None),
            outcome: RefCell::new(None),
            config_error: RefCell::new(None),
        }
    }

    fn config(&self) -> HarvestConfig {
        let input = self.input.borrow().clone().expect("document written");
        HarvestConfig {
            input,
            output_dir: self.workspace.root().join("out"),
            provider: ProviderKind::Mapillary,
            api_key: "token".to_owned(),
            acquisition: AcquisitionConfig {
                workers: NonZeroUsize::new(3),
                plan: ViewpointPlan {
                    headings: 4,
                    offsets: 0,
                    offset_radius_m: 0.0,
                    path_interval_m: 10.0,
                },
                top_k: 2,
                ..AcquisitionConfig::default()
            },
        }
    }

    fn harvest(&self, provider: FakeProvider) {
        let config = self.config();
        let units = load_work_units(&config.input).expect("document loads");
        let outcome = execute_harvest(&config, units, provider);
        self.outcome.replace(Some(outcome));
    }

    fn records(&self) -> Vec<AcquisitionRecord> {
        let path = self.workspace.root().join("out").join(RECORDS_FILE);
        let json = std::fs::read_to_string(path).expect("records written");
        serde_json::from_str(&json).expect("records deserialise")
    }

    fn persisted(&self) -> usize {
        let borrowed = self.outcome.borrow();
        borrowed
            .as_ref()
            .expect("harvest ran")
            .as_ref()
            .expect("harvest succeeded")
            .stats
            .images_persisted
    }
}

#[fixture]
fn world() -> HarvestWorld {
    HarvestWorld::new()
}

#[given("a landmarks document covering two cities")]
fn landmarks_document(#[from(world)] world: &HarvestWorld) {
    let path = world.workspace.write("landmarks.json", TWO_CITY_DOCUMENT);
    world.input.replace(Some(path));
}

#[when("I harvest it with a healthy provider")]
fn harvest_healthy(#[from(world)] world: &HarvestWorld) {
    world.harvest(FakeProvider::default());
}

#[when("I harvest it with a provider that fails for {name}")]
fn harvest_failing(#[from(world)] world: &HarvestWorld, name: String) {
    world.harvest(FakeProvider::default().failing_search_for(name.trim_matches('"')));
}

#[when("I configure the harvest command without an API key")]
fn configure_without_key(#[from(world)] world: &HarvestWorld) {
    let input = world.input.borrow().clone().expect("document written");
    let invocation = ["geoharvest", "harvest", "--input", input.as_str()];
    let outcome = Cli::try_parse_from(invocation)
        .map_err(CliError::ArgumentParsing)
        .and_then(|cli| match cli.command {
            Command::Harvest(args) => HarvestConfig::try_from(args).map(|_| ()),
            Command::Discover(_) => panic!("parsed the wrong subcommand"),
        });
    world.config_error.replace(outcome.err());
}

#[then("the records file lists every stored image")]
fn records_match(#[from(world)] world: &HarvestWorld) {
    let records = world.records();
    assert!(!records.is_empty());
    assert_eq!(records.len(), world.persisted());
}

#[then("every record points inside the images directory")]
fn records_inside_images(#[from(world)] world: &HarvestWorld) {
    let images = world.config().images_dir();
    for record in world.records() {
        assert!(record.image_path.starts_with(&images), "{record:?}");
        assert!(record.image_path.is_file(), "{record:?}");
    }
}

#[then("no stored image belongs to {name}")]
fn no_images_for(#[from(world)] world: &HarvestWorld, name: String) {
    let stem = name.trim_matches('"').replace(' ', "_");
    assert!(world.records().iter().all(|record| {
        record
            .image_path
            .file_name()
            .is_some_and(|file| !file.starts_with(&stem))
    }));
}

#[then("the CLI reports that the {flag} flag is missing")]
fn reports_missing(#[from(world)] world: &HarvestWorld, flag: String) {
    let borrowed = world.config_error.borrow();
    match borrowed.as_ref().expect("configuration should fail") {
        CliError::MissingArgument { field, .. } => assert_eq!(*field, flag.trim_matches('"')),
        other => panic!("unexpected error {other:?}"),
    }
}

macro_rules! register_harvest_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/harvest_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: HarvestWorld) {
            let _ = world;
        }
    };
}

register_harvest_scenario!(harvesting_a_document, "harvesting a landmarks document");
register_harvest_scenario!(
    failing_landmark_is_skipped,
    "a landmark without imagery does not stop the harvest"
);
register_harvest_scenario!(rejecting_missing_credential, "rejecting a missing credential");
