//! Run configuration.

use std::num::{NonZeroU32, NonZeroUsize};
use std::thread;
use std::time::Duration;

use geoharvest_core::ViewpointPlan;

use crate::{AcquisitionError, WorkUnit};

/// Worker count used when the platform cannot report its parallelism.
const FALLBACK_WORKERS: NonZeroUsize = match NonZeroUsize::new(4) {
    Some(workers) => workers,
    None => NonZeroUsize::MIN,
};

const DEFAULT_ATTEMPTS: NonZeroU32 = match NonZeroU32::new(3) {
    Some(attempts) => attempts,
    None => NonZeroU32::MIN,
};

/// Retry behaviour for transient fetch failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per candidate, including the first.
    pub attempts: NonZeroU32,
    /// Pause between attempts.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Policy that never waits between attempts.
    #[must_use]
    pub const fn immediate(attempts: NonZeroU32) -> Self {
        Self {
            attempts,
            backoff: Duration::ZERO,
        }
    }
}

/// Parameters shared by every worker in a run.
#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionConfig {
    /// Worker threads; `None` uses the available parallelism.
    pub workers: Option<NonZeroUsize>,
    /// Viewpoint generation for each landmark.
    pub plan: ViewpointPlan,
    /// Radius passed to provider searches, in metres.
    pub search_radius_m: f64,
    /// Candidates downloaded per viewpoint.
    pub top_k: usize,
    /// Fetch retry behaviour.
    pub retry: RetryPolicy,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            workers: None,
            plan: ViewpointPlan::default(),
            search_radius_m: 100.0,
            top_k: 3,
            retry: RetryPolicy::default(),
        }
    }
}

impl AcquisitionConfig {
    /// Worker count for a run: the configured value, else the available
    /// parallelism, else four.
    #[must_use]
    pub fn resolved_workers(&self) -> NonZeroUsize {
        self.workers
            .or_else(|| thread::available_parallelism().ok())
            .unwrap_or(FALLBACK_WORKERS)
    }

    /// Check that a run over `units` with this configuration can produce an
    /// image.
    ///
    /// Callers that set up output before running can call this first so
    /// that an aborted run leaves nothing behind.
    ///
    /// # Errors
    ///
    /// Returns the [`AcquisitionError`] describing the first violated
    /// precondition.
    pub fn validate(&self, units: &[WorkUnit]) -> Result<(), AcquisitionError> {
        if units.is_empty() {
            return Err(AcquisitionError::EmptyWorkPool);
        }
        if units.iter().all(|unit| unit.sites.is_empty()) {
            return Err(AcquisitionError::NoLandmarks);
        }
        let radius_m = self.search_radius_m;
        if !radius_m.is_finite() || radius_m <= 0.0 {
            return Err(AcquisitionError::InvalidSearchRadius { radius_m });
        }
        if self.top_k == 0 {
            return Err(AcquisitionError::ZeroTopK);
        }
        if !self.plan.has_rings() && !self.paths_are_sampled(units) {
            return Err(AcquisitionError::EmptyPlan);
        }
        Ok(())
    }

    fn paths_are_sampled(&self, units: &[WorkUnit]) -> bool {
        let interval = self.plan.path_interval_m;
        interval.is_finite()
            && interval > 0.0
            && units
                .iter()
                .flat_map(|unit| &unit.sites)
                .any(|site| !site.paths.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn explicit_worker_count_wins() {
        let config = AcquisitionConfig {
            workers: NonZeroUsize::new(7),
            ..AcquisitionConfig::default()
        };
        assert_eq!(config.resolved_workers().get(), 7);
    }

    #[rstest]
    fn defaults_match_the_documented_values() {
        let config = AcquisitionConfig::default();
        assert_eq!(config.top_k, 3);
        assert_eq!(config.retry.attempts.get(), 3);
        assert_eq!(config.retry.backoff, Duration::from_millis(500));
        assert!(config.resolved_workers().get() >= 1);
    }

    #[rstest]
    fn validation_rejects_an_empty_unit_list() {
        let config = AcquisitionConfig::default();
        assert_eq!(config.validate(&[]), Err(AcquisitionError::EmptyWorkPool));
        assert_eq!(
            config.validate(&[WorkUnit::new("Sibiu", Vec::new())]),
            Err(AcquisitionError::NoLandmarks)
        );
    }
}
