//! Behaviour tests for acquisition coordination.

use std::cell::RefCell;
use std::num::{NonZeroU32, NonZeroUsize};

use geoharvest_coordinator::{
    AcquisitionConfig, AcquisitionError, Coordinator, RetryPolicy, RunReport, Site, WorkUnit,
};
use geoharvest_core::test_support::{FakeProvider, MemorySink};
use geoharvest_core::{GeoPoint, Landmark, ViewpointPlan};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

const HEADINGS: usize = 3;
const TOP_K: usize = 2;

#[derive(Default)]
struct Outcome {
    result: Option<Result<RunReport, AcquisitionError>>,
    searches: usize,
    files: Vec<String>,
}

#[fixture]
fn units() -> RefCell<Vec<WorkUnit>> {
    RefCell::new(Vec::new())
}

#[fixture]
fn provider() -> RefCell<Option<FakeProvider>> {
    RefCell::new(None)
}

#[fixture]
fn outcome() -> RefCell<Outcome> {
    RefCell::new(Outcome::default())
}

fn landmark(name: &str, lat: f64, lon: f64) -> Site {
    let coord = GeoPoint::new(lat, lon).expect("valid");
    Site::new(Landmark::new(name, coord, None).expect("landmark"))
}

fn report(outcome: &RefCell<Outcome>) -> RunReport {
    match &outcome.borrow().result {
        Some(Ok(report)) => report.clone(),
        other => panic!("expected a completed run, got {other:?}"),
    }
}

#[given("a city with two landmarks")]
fn given_city(#[from(units)] units: &RefCell<Vec<WorkUnit>>) {
    *units.borrow_mut() = vec![WorkUnit::new(
        "Cluj-Napoca",
        vec![
            landmark("Biserica Sfantul Mihail", 46.7699, 23.5897),
            landmark("Teatrul National", 46.7703, 23.5978),
        ],
    )];
}

#[given("no cities")]
fn given_no_cities(#[from(units)] units: &RefCell<Vec<WorkUnit>>) {
    units.borrow_mut().clear();
}

#[given("a provider that always answers")]
fn given_healthy(#[from(provider)] provider: &RefCell<Option<FakeProvider>>) {
    *provider.borrow_mut() = Some(FakeProvider::default());
}

#[given("a provider that refuses searches for the first landmark")]
fn given_refusing(#[from(provider)] provider: &RefCell<Option<FakeProvider>>) {
    *provider.borrow_mut() =
        Some(FakeProvider::default().failing_search_for("Biserica Sfantul Mihail"));
}

#[given("a provider whose downloads fail once before succeeding")]
fn given_flaky(#[from(provider)] provider: &RefCell<Option<FakeProvider>>) {
    *provider.borrow_mut() = Some(FakeProvider::default().with_transient_fetch_failures(1));
}

#[when("the acquisition runs")]
fn when_runs(
    #[from(units)] units: &RefCell<Vec<WorkUnit>>,
    #[from(provider)] provider: &RefCell<Option<FakeProvider>>,
    #[from(outcome)] outcome: &RefCell<Outcome>,
) {
    let config = AcquisitionConfig {
        workers: NonZeroUsize::new(2),
        plan: ViewpointPlan {
            headings: HEADINGS,
            offsets: 0,
            offset_radius_m: 0.0,
            path_interval_m: 10.0,
        },
        top_k: TOP_K,
        retry: RetryPolicy::immediate(NonZeroU32::MIN.saturating_add(1)),
        ..AcquisitionConfig::default()
    };
    let fake = provider.borrow_mut().take().expect("provider configured");
    let coordinator = Coordinator::new(fake, MemorySink::default(), config);
    let result = coordinator.run(units.borrow().clone());
    let mut out = outcome.borrow_mut();
    out.result = Some(result);
    out.searches = coordinator.provider().searches().len();
    out.files = coordinator.sink().file_names();
}

#[then("every viewpoint yields the configured number of images")]
fn then_full(#[from(outcome)] outcome: &RefCell<Outcome>) {
    let report = report(outcome);
    assert_eq!(report.stats.viewpoints_attempted, 2 * HEADINGS);
    assert_eq!(report.records.len(), 2 * HEADINGS * TOP_K);
}

#[then("no failures are reported")]
fn then_no_failures(#[from(outcome)] outcome: &RefCell<Outcome>) {
    let stats = report(outcome).stats;
    assert_eq!(stats.search_failures, 0);
    assert_eq!(stats.fetch_failures, 0);
    assert_eq!(stats.persist_failures, 0);
}

#[then("only the second landmark has images")]
fn then_second_only(#[from(outcome)] outcome: &RefCell<Outcome>) {
    let files = outcome.borrow().files.clone();
    assert_eq!(files.len(), HEADINGS * TOP_K);
    assert!(files.iter().all(|f| f.starts_with("Teatrul_National_")));
}

#[then("the refused searches are counted")]
fn then_refusals_counted(#[from(outcome)] outcome: &RefCell<Outcome>) {
    assert_eq!(report(outcome).stats.search_failures, HEADINGS);
}

#[then("the run is aborted before searching")]
fn then_aborted(#[from(outcome)] outcome: &RefCell<Outcome>) {
    let out = outcome.borrow();
    assert!(matches!(out.result, Some(Err(AcquisitionError::EmptyWorkPool))));
    assert_eq!(out.searches, 0);
    assert!(out.files.is_empty());
}

#[scenario(path = "tests/features/acquisition.feature", index = 0)]
fn healthy_provider(
    units: RefCell<Vec<WorkUnit>>,
    provider: RefCell<Option<FakeProvider>>,
    outcome: RefCell<Outcome>,
) {
    let _ = (units, provider, outcome);
}

#[scenario(path = "tests/features/acquisition.feature", index = 1)]
fn failing_landmark(
    units: RefCell<Vec<WorkUnit>>,
    provider: RefCell<Option<FakeProvider>>,
    outcome: RefCell<Outcome>,
) {
    let _ = (units, provider, outcome);
}

#[scenario(path = "tests/features/acquisition.feature", index = 2)]
fn flaky_downloads(
    units: RefCell<Vec<WorkUnit>>,
    provider: RefCell<Option<FakeProvider>>,
    outcome: RefCell<Outcome>,
) {
    let _ = (units, provider, outcome);
}

#[scenario(path = "tests/features/acquisition.feature", index = 3)]
fn empty_input(
    units: RefCell<Vec<WorkUnit>>,
    provider: RefCell<Option<FakeProvider>>,
    outcome: RefCell<Outcome>,
) {
    let _ = (units, provider, outcome);
}
