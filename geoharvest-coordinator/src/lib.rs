//! Concurrent acquisition runs for Geoharvest.
//!
//! A run takes a list of [`WorkUnit`]s (typically one per city), plans
//! viewpoints for every landmark, asks an
//! [`ImageProvider`](geoharvest_core::ImageProvider) for candidates, keeps the
//! best few according to a
//! [`CandidateScorer`](geoharvest_core::CandidateScorer), downloads them and
//! hands the bytes to an [`ImageSink`](geoharvest_core::ImageSink).
//!
//! Work is shared between a fixed number of scoped worker threads through a
//! mutex-guarded pool. Each worker keeps its results locally and merges them
//! into the run's result sink exactly once, under a second, independent lock.
//! Per-item failures are logged, counted in [`RunStats`] and skipped; only
//! the preconditions checked by [`Coordinator::prepare`] abort a run.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod config;
mod coordinator;
mod report;
mod work;

pub use config::{AcquisitionConfig, RetryPolicy};
pub use coordinator::{AcquisitionError, AcquisitionRun, Coordinator};
pub use report::{RunReport, RunStats, UnitClaim};
pub use work::{Site, WorkUnit};
