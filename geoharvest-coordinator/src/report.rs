//! Run output and the sink workers merge into.

use std::sync::{Mutex, PoisonError};

use geoharvest_core::AcquisitionRecord;

/// Counters accumulated over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Units taken from the pool.
    pub units_claimed: usize,
    /// Sites whose viewpoints were planned.
    pub sites_processed: usize,
    /// Viewpoints searched.
    pub viewpoints_attempted: usize,
    /// Searches that returned an error.
    pub search_failures: usize,
    /// Searches that returned no candidates.
    pub empty_searches: usize,
    /// Candidates whose download failed after all retries.
    pub fetch_failures: usize,
    /// Downloads the sink refused to store.
    pub persist_failures: usize,
    /// Images stored and recorded.
    pub images_persisted: usize,
}

impl RunStats {
    fn absorb(&mut self, other: Self) {
        self.units_claimed += other.units_claimed;
        self.sites_processed += other.sites_processed;
        self.viewpoints_attempted += other.viewpoints_attempted;
        self.search_failures += other.search_failures;
        self.empty_searches += other.empty_searches;
        self.fetch_failures += other.fetch_failures;
        self.persist_failures += other.persist_failures;
        self.images_persisted += other.images_persisted;
    }
}

/// Which worker took which unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitClaim {
    /// Zero-based worker index.
    pub worker: usize,
    /// Claimed unit name.
    pub unit: String,
}

/// Everything a completed run produced.
///
/// Record order across workers is unspecified.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    /// One entry per stored image.
    pub records: Vec<AcquisitionRecord>,
    /// Aggregated counters.
    pub stats: RunStats,
    /// Claim log, one entry per unit taken from the pool.
    pub claims: Vec<UnitClaim>,
}

impl RunReport {
    pub(crate) fn absorb(&mut self, other: Self) {
        self.records.extend(other.records);
        self.stats.absorb(other.stats);
        self.claims.extend(other.claims);
    }
}

/// Append-only result collection owned by one run.
#[derive(Debug, Default)]
pub(crate) struct ResultSink {
    report: Mutex<RunReport>,
}

impl ResultSink {
    /// Merge a worker's local results.
    pub(crate) fn merge(&self, local: RunReport) {
        self.report
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .absorb(local);
    }

    pub(crate) fn into_report(self) -> RunReport {
        self.report
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
