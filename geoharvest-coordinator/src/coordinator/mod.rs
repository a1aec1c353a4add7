//! `Coordinator` and the run lifecycle.

use std::num::NonZeroUsize;
use std::thread;
use std::time::Instant;

use geoharvest_core::{CandidateScorer, ImageProvider, ImageSink, ProximityScorer};
use thiserror::Error;

use crate::report::ResultSink;
use crate::work::WorkPool;
use crate::{AcquisitionConfig, RunReport, WorkUnit};

mod worker;

/// Preconditions that abort a run before any worker starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AcquisitionError {
    /// No work units were supplied.
    #[error("no work units to process")]
    EmptyWorkPool,
    /// Work units were supplied but none contains a site.
    #[error("work units contain no landmarks")]
    NoLandmarks,
    /// Neither viewpoint ring is enabled and no usable path was supplied.
    #[error("viewpoint plan produces no viewpoints: enable a ring or supply paths")]
    EmptyPlan,
    /// The search radius is not a positive finite number.
    #[error("search radius must be positive and finite, got {radius_m}")]
    InvalidSearchRadius {
        /// Rejected radius in metres.
        radius_m: f64,
    },
    /// `top_k` is zero, so no image would ever be downloaded.
    #[error("top_k must be at least 1")]
    ZeroTopK,
}

/// Drives acquisition runs against one provider and one sink.
///
/// The coordinator is generic over the capability boundaries: an image
/// provider, a persistence sink and a candidate scorer.
pub struct Coordinator<P, S, C = ProximityScorer>
where
    P: ImageProvider,
    S: ImageSink,
    C: CandidateScorer,
{
    provider: P,
    sink: S,
    scorer: C,
    config: AcquisitionConfig,
}

impl<P, S> Coordinator<P, S>
where
    P: ImageProvider,
    S: ImageSink,
{
    /// Construct a coordinator ranking with [`ProximityScorer`].
    pub fn new(provider: P, sink: S, config: AcquisitionConfig) -> Self {
        Self::with_scorer(provider, sink, ProximityScorer::default(), config)
    }
}

impl<P, S, C> Coordinator<P, S, C>
where
    P: ImageProvider,
    S: ImageSink,
    C: CandidateScorer,
{
    /// Construct a coordinator with an explicit scorer.
    pub const fn with_scorer(provider: P, sink: S, scorer: C, config: AcquisitionConfig) -> Self {
        Self {
            provider,
            sink,
            scorer,
            config,
        }
    }

    /// Provider used for searches and downloads.
    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Sink images are written to.
    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Run configuration.
    #[must_use]
    pub const fn config(&self) -> &AcquisitionConfig {
        &self.config
    }

    /// Validate `units` and the configuration, returning a run ready to
    /// execute.
    ///
    /// # Errors
    ///
    /// Returns [`AcquisitionError`] when the run could not produce any
    /// image. Nothing is searched, fetched or written in that case.
    pub fn prepare(
        &self,
        units: Vec<WorkUnit>,
    ) -> Result<AcquisitionRun<'_, P, S, C>, AcquisitionError> {
        self.config.validate(&units)?;
        Ok(AcquisitionRun {
            coordinator: self,
            pool: WorkPool::new(units),
            workers: self.config.resolved_workers(),
        })
    }

    /// Prepare and execute a run in one call.
    ///
    /// # Errors
    ///
    /// Returns [`AcquisitionError`] under the same conditions as
    /// [`Coordinator::prepare`].
    pub fn run(&self, units: Vec<WorkUnit>) -> Result<RunReport, AcquisitionError> {
        Ok(self.prepare(units)?.execute())
    }
}

/// A validated run that has not started yet.
pub struct AcquisitionRun<'a, P, S, C>
where
    P: ImageProvider,
    S: ImageSink,
    C: CandidateScorer,
{
    coordinator: &'a Coordinator<P, S, C>,
    pool: WorkPool,
    workers: NonZeroUsize,
}

impl<P, S, C> AcquisitionRun<'_, P, S, C>
where
    P: ImageProvider,
    S: ImageSink,
    C: CandidateScorer,
{
    /// Number of worker threads the run will spawn.
    #[must_use]
    pub const fn workers(&self) -> NonZeroUsize {
        self.workers
    }

    /// Process every unit and return the merged results.
    ///
    /// Blocks until all workers have drained the pool and joined. Per-item
    /// failures are logged and counted, never propagated.
    #[must_use]
    pub fn execute(self) -> RunReport {
        let started_at = Instant::now();
        let coordinator = self.coordinator;
        let workers = self.workers.get();
        log::info!(
            "starting acquisition of {} units with {workers} workers via {} into {}",
            self.pool.len(),
            coordinator.provider.name(),
            coordinator.sink.location()
        );

        let results = ResultSink::default();
        thread::scope(|scope| {
            for worker in 0..workers {
                let pool = &self.pool;
                let results = &results;
                scope.spawn(move || results.merge(coordinator.work(worker, pool)));
            }
        });

        let report = results.into_report();
        log::info!(
            "acquisition finished in {:.1?}: {} images from {} units ({} search failures, {} fetch failures, {} persist failures)",
            started_at.elapsed(),
            report.stats.images_persisted,
            report.stats.units_claimed,
            report.stats.search_failures,
            report.stats.fetch_failures,
            report.stats.persist_failures
        );
        report
    }
}
