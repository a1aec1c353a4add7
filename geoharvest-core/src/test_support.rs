//! Deterministic, in-memory `ImageProvider` and `ImageSink` implementations
//! used by unit and behaviour tests across the workspace.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, PoisonError};

use camino::{Utf8Path, Utf8PathBuf};

use crate::geodesy::destination_point;
use crate::{Candidate, ImageProvider, ImageSink, PersistError, ProviderError, SearchQuery};

/// Distances in metres, east of the search centre, of the candidates every
/// [`FakeProvider`] search returns.
pub const FAKE_CANDIDATE_DISTANCES_M: [f64; 3] = [5.0, 30.0, 200.0];

/// Provider returning three synthetic candidates around each search centre.
///
/// Candidate references encode the search centre and distance, so identical
/// queries always yield identical candidates. Fetched bytes are the
/// reference itself.
#[derive(Debug, Default)]
pub struct FakeProvider {
    failing_keywords: Vec<String>,
    empty_keywords: Vec<String>,
    transient_fetch_failures: usize,
    permanent_fetch_failures: bool,
    searches: Mutex<Vec<SearchQuery>>,
    fetch_attempts: Mutex<HashMap<String, usize>>,
}

impl FakeProvider {
    /// Fail every search whose keyword equals `keyword`.
    #[must_use]
    pub fn failing_search_for(mut self, keyword: impl Into<String>) -> Self {
        self.failing_keywords.push(keyword.into());
        self
    }

    /// Return no candidates for searches whose keyword equals `keyword`.
    #[must_use]
    pub fn empty_search_for(mut self, keyword: impl Into<String>) -> Self {
        self.empty_keywords.push(keyword.into());
        self
    }

    /// Fail the first `count` fetches of every candidate transiently.
    #[must_use]
    pub const fn with_transient_fetch_failures(mut self, count: usize) -> Self {
        self.transient_fetch_failures = count;
        self
    }

    /// Fail every fetch permanently.
    #[must_use]
    pub const fn with_permanent_fetch_failures(mut self) -> Self {
        self.permanent_fetch_failures = true;
        self
    }

    /// Queries seen so far, in call order.
    #[must_use]
    pub fn searches(&self) -> Vec<SearchQuery> {
        self.searches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of fetch attempts made for the candidate `provider_ref`.
    #[must_use]
    pub fn fetch_attempts(&self, provider_ref: &str) -> usize {
        self.fetch_attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(provider_ref)
            .copied()
            .unwrap_or(0)
    }

    /// Total fetch attempts across all candidates.
    #[must_use]
    pub fn total_fetch_attempts(&self) -> usize {
        self.fetch_attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .sum()
    }

    fn keyword_in(list: &[String], query: &SearchQuery) -> bool {
        query
            .keyword
            .as_deref()
            .is_some_and(|keyword| list.iter().any(|k| k == keyword))
    }
}

impl ImageProvider for FakeProvider {
    fn name(&self) -> &str {
        "fake"
    }

    fn search(&self, query: &SearchQuery) -> Result<Vec<Candidate>, ProviderError> {
        self.searches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(query.clone());
        if Self::keyword_in(&self.failing_keywords, query) {
            return Err(ProviderError::permanent("fake", "search refused"));
        }
        if Self::keyword_in(&self.empty_keywords, query) {
            return Ok(Vec::new());
        }
        let centre = query.center;
        Ok(FAKE_CANDIDATE_DISTANCES_M
            .iter()
            .map(|&distance| {
                let reference = format!(
                    "{:.6},{:.6}@{distance:.0}",
                    centre.lat(),
                    centre.lon()
                );
                Candidate::new(reference.clone(), reference)
                    .with_coord(destination_point(centre, 90.0, distance))
            })
            .collect())
    }

    fn fetch(&self, candidate: &Candidate) -> Result<Vec<u8>, ProviderError> {
        let attempt = {
            let mut attempts = self
                .fetch_attempts
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let count = attempts.entry(candidate.provider_ref.clone()).or_insert(0);
            *count = count.saturating_add(1);
            *count
        };
        if self.permanent_fetch_failures {
            return Err(ProviderError::permanent("fake", "image withdrawn"));
        }
        if attempt <= self.transient_fetch_failures {
            return Err(ProviderError::transient("fake", "HTTP 503"));
        }
        Ok(candidate.locator.as_bytes().to_vec())
    }
}

/// Sink that keeps written images in memory.
#[derive(Debug)]
pub struct MemorySink {
    root: Utf8PathBuf,
    rejected_fragments: Vec<String>,
    files: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl Default for MemorySink {
    fn default() -> Self {
        Self {
            root: Utf8PathBuf::from("memory"),
            rejected_fragments: Vec::new(),
            files: Mutex::new(BTreeMap::new()),
        }
    }
}

impl MemorySink {
    /// Reject every file name containing `fragment`.
    #[must_use]
    pub fn rejecting(mut self, fragment: impl Into<String>) -> Self {
        self.rejected_fragments.push(fragment.into());
        self
    }

    /// Names of the stored files, sorted.
    #[must_use]
    pub fn file_names(&self) -> Vec<String> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Bytes stored under `file_name`.
    #[must_use]
    pub fn contents(&self, file_name: &str) -> Option<Vec<u8>> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(file_name)
            .cloned()
    }
}

impl ImageSink for MemorySink {
    fn write(&self, file_name: &str, bytes: &[u8]) -> Result<Utf8PathBuf, PersistError> {
        if let Some(fragment) = self
            .rejected_fragments
            .iter()
            .find(|fragment| file_name.contains(fragment.as_str()))
        {
            return Err(PersistError::Rejected {
                file_name: file_name.to_owned(),
                reason: format!("contains {fragment}"),
            });
        }
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(file_name.to_owned(), bytes.to_vec());
        Ok(self.root.join(file_name))
    }

    fn location(&self) -> &Utf8Path {
        &self.root
    }
}
