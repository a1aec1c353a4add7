//! Rank provider candidates against a target coordinate.
//!
//! Providers such as Mapillary return dozens of images around a point; only
//! the best `top_k` are downloaded. The [`CandidateScorer`] trait is the
//! extension point for scoring rules. [`ProximityScorer`] implements the
//! rule used by default.

use std::cmp::Ordering;

use crate::geodesy::distance_meters;
use crate::{Candidate, GeoPoint, ScoredCandidate};

/// Assign a score to a candidate for a given target.
///
/// Higher scores rank first. Implementations must be thread-safe so one
/// scorer can be shared by every acquisition worker. Further criteria, such
/// as capture direction or capture year, belong in their own implementations
/// (or in a scorer wrapping [`ProximityScorer`]).
///
/// # Examples
///
/// ```
/// use geoharvest_core::{Candidate, CandidateScorer, GeoPoint, rank_with};
///
/// struct NewestFirst;
///
/// impl CandidateScorer for NewestFirst {
///     fn score(&self, candidate: &Candidate, _target: GeoPoint) -> f64 {
///         candidate
///             .captured_at
///             .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
///             .map_or(0.0, |d| d.as_secs_f64())
///     }
/// }
///
/// let target = GeoPoint::new(0.0, 0.0).expect("valid");
/// let ranked = rank_with(&NewestFirst, vec![Candidate::new("a", "a")], target, 1);
/// assert_eq!(ranked.len(), 1);
/// ```
pub trait CandidateScorer: Send + Sync {
    /// Return the score for `candidate` when photographing `target`.
    fn score(&self, candidate: &Candidate, target: GeoPoint) -> f64;
}

/// Distance-based heuristic.
///
/// Starting from `base`, a candidate with a known position is adjusted by its
/// distance `d` to the target:
///
/// - `d < close_radius_m`: `close_penalty` is subtracted;
/// - `close_radius_m <= d < preferred_radius_m`: `preferred_bonus` is added;
/// - otherwise `falloff_per_m * d` is subtracted.
///
/// Candidates without a position keep `base`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityScorer {
    /// Starting score.
    pub base: f64,
    /// Radius under which a candidate is considered too close.
    pub close_radius_m: f64,
    /// Amount subtracted for too-close candidates.
    pub close_penalty: f64,
    /// Upper bound of the preferred distance band.
    pub preferred_radius_m: f64,
    /// Amount added inside the preferred band.
    pub preferred_bonus: f64,
    /// Penalty per metre beyond the preferred band.
    pub falloff_per_m: f64,
}

impl Default for ProximityScorer {
    fn default() -> Self {
        Self {
            base: 100.0,
            close_radius_m: 10.0,
            close_penalty: 30.0,
            preferred_radius_m: 50.0,
            preferred_bonus: 20.0,
            falloff_per_m: 0.1,
        }
    }
}

impl CandidateScorer for ProximityScorer {
    #[expect(clippy::float_arithmetic, reason = "heuristic score adjustments")]
    fn score(&self, candidate: &Candidate, target: GeoPoint) -> f64 {
        let Some(coord) = candidate.coord else {
            return self.base;
        };
        let d = distance_meters(coord, target);
        if d < self.close_radius_m {
            self.base - self.close_penalty
        } else if d < self.preferred_radius_m {
            self.base + self.preferred_bonus
        } else {
            self.base - self.falloff_per_m * d
        }
    }
}

/// Rank `candidates` with the default [`ProximityScorer`].
#[must_use]
pub fn rank(candidates: Vec<Candidate>, target: GeoPoint, top_k: usize) -> Vec<ScoredCandidate> {
    rank_with(&ProximityScorer::default(), candidates, target, top_k)
}

/// Score, sort and truncate `candidates`.
///
/// Sorting is stable and descending by score, so candidates with equal scores
/// keep the provider's order. The result holds `min(top_k, candidates.len())`
/// entries.
#[must_use]
pub fn rank_with<S>(
    scorer: &S,
    candidates: Vec<Candidate>,
    target: GeoPoint,
    top_k: usize,
) -> Vec<ScoredCandidate>
where
    S: CandidateScorer + ?Sized,
{
    let mut scored: Vec<ScoredCandidate> = candidates
        .into_iter()
        .map(|candidate| {
            let score = scorer.score(&candidate, target);
            ScoredCandidate { candidate, score }
        })
        .collect();
    scored.sort_by(|lhs, rhs| {
        rhs.score
            .partial_cmp(&lhs.score)
            .unwrap_or(Ordering::Equal)
    });
    scored.truncate(top_k);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesy::{EQUATORIAL_EARTH_RADIUS_M, MEAN_EARTH_RADIUS_M, destination_point};
    use rstest::{fixture, rstest};

    #[fixture]
    fn target() -> GeoPoint {
        GeoPoint::new(46.77, 23.59).expect("valid")
    }

    /// Candidate whose haversine distance to `target` is `metres`.
    fn at_distance(target: GeoPoint, metres: f64, name: &str) -> Candidate {
        let travel = metres * EQUATORIAL_EARTH_RADIUS_M / MEAN_EARTH_RADIUS_M;
        Candidate::new(name, name).with_coord(destination_point(target, 45.0, travel))
    }

    #[rstest]
    fn scores_follow_the_distance_bands(target: GeoPoint) {
        let candidates = vec![
            at_distance(target, 5.0, "near"),
            at_distance(target, 30.0, "sweet"),
            at_distance(target, 200.0, "far"),
        ];
        let scorer = ProximityScorer::default();
        let scores: Vec<f64> = candidates.iter().map(|c| scorer.score(c, target)).collect();
        for (score, expected) in scores.iter().zip([70.0, 120.0, 80.0]) {
            assert!((score - expected).abs() < 1e-6, "expected {expected}, got {score}");
        }
    }

    #[rstest]
    fn keeps_top_k_by_descending_score(target: GeoPoint) {
        let candidates = vec![
            at_distance(target, 5.0, "near"),
            at_distance(target, 30.0, "sweet"),
            at_distance(target, 200.0, "far"),
        ];
        let ranked = rank(candidates, target, 2);
        let refs: Vec<&str> = ranked
            .iter()
            .map(|s| s.candidate.provider_ref.as_str())
            .collect();
        assert_eq!(refs, vec!["sweet", "far"]);
    }

    #[rstest]
    fn ties_keep_provider_order(target: GeoPoint) {
        let candidates = vec![
            Candidate::new("first", "1"),
            Candidate::new("second", "2"),
            Candidate::new("third", "3"),
        ];
        let ranked = rank(candidates, target, 10);
        let refs: Vec<&str> = ranked
            .iter()
            .map(|s| s.candidate.provider_ref.as_str())
            .collect();
        assert_eq!(refs, vec!["first", "second", "third"]);
        assert!(ranked.iter().all(|s| (s.score - 100.0).abs() < f64::EPSILON));
    }

    #[rstest]
    fn empty_input_ranks_to_nothing(target: GeoPoint) {
        assert!(rank(Vec::new(), target, 3).is_empty());
    }
}
