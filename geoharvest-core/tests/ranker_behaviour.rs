//! Behaviour tests for candidate ranking.

use geoharvest_core::geodesy::{EQUATORIAL_EARTH_RADIUS_M, MEAN_EARTH_RADIUS_M, destination_point};
use geoharvest_core::{Candidate, GeoPoint, ScoredCandidate, rank};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;

#[fixture]
fn target() -> GeoPoint {
    GeoPoint::new(46.7712, 23.5964).expect("valid")
}

#[fixture]
fn candidates() -> RefCell<Vec<Candidate>> {
    RefCell::new(Vec::new())
}

#[fixture]
fn ranked() -> RefCell<Vec<ScoredCandidate>> {
    RefCell::new(Vec::new())
}

fn at_distance(target: GeoPoint, metres: f64) -> Candidate {
    let travel = metres * EQUATORIAL_EARTH_RADIUS_M / MEAN_EARTH_RADIUS_M;
    let name = format!("{metres:.0}m");
    Candidate::new(name.clone(), name).with_coord(destination_point(target, 120.0, travel))
}

fn rank_into(
    target: GeoPoint,
    candidates: &RefCell<Vec<Candidate>>,
    ranked: &RefCell<Vec<ScoredCandidate>>,
    top_k: usize,
) {
    let input = candidates.borrow().clone();
    *ranked.borrow_mut() = rank(input, target, top_k);
}

fn ranked_refs(ranked: &RefCell<Vec<ScoredCandidate>>) -> Vec<String> {
    ranked
        .borrow()
        .iter()
        .map(|s| s.candidate.provider_ref.clone())
        .collect()
}

#[given("candidates at 5, 30 and 200 metres from the landmark")]
fn given_banded(
    #[from(target)] target: &GeoPoint,
    #[from(candidates)] candidates: &RefCell<Vec<Candidate>>,
) {
    *candidates.borrow_mut() = [5.0, 30.0, 200.0]
        .into_iter()
        .map(|d| at_distance(*target, d))
        .collect();
}

#[given("candidates without a known position")]
fn given_unpositioned(#[from(candidates)] candidates: &RefCell<Vec<Candidate>>) {
    *candidates.borrow_mut() = ["a", "b", "c"]
        .into_iter()
        .map(|name| Candidate::new(name, name))
        .collect();
}

#[given("no candidates")]
fn given_none(#[from(candidates)] candidates: &RefCell<Vec<Candidate>>) {
    candidates.borrow_mut().clear();
}

#[when("the candidates are ranked keeping the top 2")]
fn when_top_two(
    #[from(target)] target: &GeoPoint,
    #[from(candidates)] candidates: &RefCell<Vec<Candidate>>,
    #[from(ranked)] ranked: &RefCell<Vec<ScoredCandidate>>,
) {
    rank_into(*target, candidates, ranked, 2);
}

#[when("the candidates are ranked keeping the top 5")]
fn when_top_five(
    #[from(target)] target: &GeoPoint,
    #[from(candidates)] candidates: &RefCell<Vec<Candidate>>,
    #[from(ranked)] ranked: &RefCell<Vec<ScoredCandidate>>,
) {
    rank_into(*target, candidates, ranked, 5);
}

#[then("the candidate at 30 metres ranks first")]
fn then_sweet_first(#[from(ranked)] ranked: &RefCell<Vec<ScoredCandidate>>) {
    assert_eq!(ranked_refs(ranked).first().map(String::as_str), Some("30m"));
}

#[then("the candidate at 200 metres ranks second")]
fn then_far_second(#[from(ranked)] ranked: &RefCell<Vec<ScoredCandidate>>) {
    assert_eq!(ranked_refs(ranked), vec!["30m".to_owned(), "200m".to_owned()]);
}

#[then("every ranked candidate scores the base score")]
fn then_base_score(#[from(ranked)] ranked: &RefCell<Vec<ScoredCandidate>>) {
    assert!(
        ranked
            .borrow()
            .iter()
            .all(|s| (s.score - 100.0).abs() < f64::EPSILON)
    );
}

#[then("the provider order is preserved")]
fn then_order_kept(#[from(ranked)] ranked: &RefCell<Vec<ScoredCandidate>>) {
    assert_eq!(ranked_refs(ranked), vec!["a", "b", "c"]);
}

#[then("no candidates are returned")]
fn then_empty(#[from(ranked)] ranked: &RefCell<Vec<ScoredCandidate>>) {
    assert!(ranked.borrow().is_empty());
}

#[scenario(path = "tests/features/ranker.feature", index = 0)]
fn preferred_band_first(
    target: GeoPoint,
    candidates: RefCell<Vec<Candidate>>,
    ranked: RefCell<Vec<ScoredCandidate>>,
) {
    let _ = (target, candidates, ranked);
}

#[scenario(path = "tests/features/ranker.feature", index = 1)]
fn unpositioned_keep_base(
    target: GeoPoint,
    candidates: RefCell<Vec<Candidate>>,
    ranked: RefCell<Vec<ScoredCandidate>>,
) {
    let _ = (target, candidates, ranked);
}

#[scenario(path = "tests/features/ranker.feature", index = 2)]
fn empty_search(
    target: GeoPoint,
    candidates: RefCell<Vec<Candidate>>,
    ranked: RefCell<Vec<ScoredCandidate>>,
) {
    let _ = (target, candidates, ranked);
}
