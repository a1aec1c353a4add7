//! The per-worker acquisition loop.

use std::thread;

use geoharvest_core::{
    AcquisitionRecord, Candidate, CandidateScorer, ImageProvider, ImageSink, ProviderError,
    SearchQuery, Viewpoint, rank_with,
};
use log::{debug, warn};

use super::Coordinator;
use crate::Site;
use crate::report::{RunReport, UnitClaim};
use crate::work::WorkPool;

impl<P, S, C> Coordinator<P, S, C>
where
    P: ImageProvider,
    S: ImageSink,
    C: CandidateScorer,
{
    /// Claim units until the pool is drained, accumulating results locally.
    pub(super) fn work(&self, worker: usize, pool: &WorkPool) -> RunReport {
        let mut local = RunReport::default();
        while let Some((unit_index, unit)) = pool.claim() {
            debug!("worker {worker} claimed {}", unit.name);
            local.stats.units_claimed += 1;
            for (site_index, site) in unit.sites.iter().enumerate() {
                let key = SiteKey {
                    stem: site.landmark.file_stem(),
                    unit: unit_index,
                    site: site_index,
                };
                self.process_site(site, &key, &mut local);
            }
            local.claims.push(UnitClaim {
                worker,
                unit: unit.name,
            });
        }
        local
    }

    fn process_site(&self, site: &Site, key: &SiteKey, local: &mut RunReport) {
        local.stats.sites_processed += 1;
        for viewpoint in self.config.plan.plan(&site.landmark, &site.paths) {
            local.stats.viewpoints_attempted += 1;
            self.process_viewpoint(site, key, &viewpoint, local);
        }
    }

    fn process_viewpoint(
        &self,
        site: &Site,
        key: &SiteKey,
        viewpoint: &Viewpoint,
        local: &mut RunReport,
    ) {
        let query = SearchQuery {
            center: viewpoint.coord(),
            radius_meters: self.config.search_radius_m,
            keyword: Some(site.landmark.name().to_owned()),
            heading: Some(viewpoint.heading),
        };
        let candidates = match self.provider.search(&query) {
            Ok(candidates) => candidates,
            Err(err) => {
                warn!("skipping {} {}: {err}", site.landmark.name(), viewpoint.label);
                local.stats.search_failures += 1;
                return;
            }
        };
        if candidates.is_empty() {
            debug!("no imagery for {} {}", site.landmark.name(), viewpoint.label);
            local.stats.empty_searches += 1;
            return;
        }

        let ranked = rank_with(
            &self.scorer,
            candidates,
            site.landmark.coord(),
            self.config.top_k,
        );
        for (index, scored) in ranked.into_iter().enumerate() {
            let candidate = scored.candidate;
            let bytes = match self.fetch_with_retry(&candidate) {
                Ok(bytes) => bytes,
                Err(err) => {
                    warn!("dropping candidate {}: {err}", candidate.provider_ref);
                    local.stats.fetch_failures += 1;
                    continue;
                }
            };
            let delay = self.provider.request_delay();
            if !delay.is_zero() {
                thread::sleep(delay);
            }

            let file_name = key.file_name(self.provider.name(), &viewpoint.label, index);
            match self.sink.write(&file_name, &bytes) {
                Ok(path) => {
                    debug!("stored {path} (score {:.1})", scored.score);
                    let coord = candidate.coord.unwrap_or_else(|| viewpoint.coord());
                    local.records.push(AcquisitionRecord::new(path, coord));
                    local.stats.images_persisted += 1;
                }
                Err(err) => {
                    warn!("could not store {file_name}: {err}");
                    local.stats.persist_failures += 1;
                }
            }
        }
    }

    /// Fetch `candidate`, retrying transient failures per the retry policy.
    fn fetch_with_retry(&self, candidate: &Candidate) -> Result<Vec<u8>, ProviderError> {
        let policy = self.config.retry;
        let mut attempt = 1;
        loop {
            match self.provider.fetch(candidate) {
                Err(err) if err.is_transient() && attempt < policy.attempts.get() => {
                    debug!(
                        "attempt {attempt} for {} failed: {err}; retrying",
                        candidate.provider_ref
                    );
                    attempt += 1;
                    if !policy.backoff.is_zero() {
                        thread::sleep(policy.backoff);
                    }
                }
                result => return result,
            }
        }
    }
}

/// Identifies a site within a run so that same-named landmarks never share
/// an image file.
struct SiteKey {
    stem: String,
    unit: usize,
    site: usize,
}

impl SiteKey {
    fn file_name(&self, provider: &str, label: &str, rank: usize) -> String {
        format!(
            "{}_u{}s{}_{provider}_{label}_{rank}.jpg",
            self.stem, self.unit, self.site
        )
    }
}
