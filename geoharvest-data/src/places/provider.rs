//! `ImageProvider` implementation over the Google Places API.

use std::time::Duration;

use geoharvest_core::{Candidate, ImageProvider, ProviderError, SearchQuery};
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use url::Url;

use super::api::{DETAIL_FIELDS, DetailsResponse, NearbyResponse, check_status};
use crate::http::{BlockingHttp, classify_reqwest_error, status_error};
use crate::{ClientBuildError, HttpSettings};

/// Production Places API base URL.
pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";

/// Photos kept per place.
pub const DEFAULT_MAX_PHOTOS: usize = 10;

pub(crate) const NAME: &str = "places";

/// Configuration for [`PlacesProvider`].
#[derive(Clone, PartialEq, Eq)]
pub struct PlacesConfig {
    /// API key appended to every request.
    pub api_key: String,
    /// Places API base URL.
    pub base_url: String,
    /// Photos kept per place.
    pub max_photos: usize,
    /// `maxwidth` requested from Place Photo, in pixels.
    pub max_width: u32,
    /// Pause after every successful download.
    pub request_delay: Duration,
    /// Shared HTTP settings.
    pub http: HttpSettings,
}

impl std::fmt::Debug for PlacesConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlacesConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("max_photos", &self.max_photos)
            .field("max_width", &self.max_width)
            .field("request_delay", &self.request_delay)
            .field("http", &self.http)
            .finish()
    }
}

impl PlacesConfig {
    /// Configuration for the production API with the given key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            max_photos: DEFAULT_MAX_PHOTOS,
            max_width: 1600,
            request_delay: Duration::from_millis(500),
            http: HttpSettings::default(),
        }
    }

    /// Point the provider at another endpoint.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the number of photos kept per place.
    #[must_use]
    pub const fn with_max_photos(mut self, max_photos: usize) -> Self {
        self.max_photos = max_photos;
        self
    }

    /// Set the post-download pause.
    #[must_use]
    pub const fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    /// Replace the HTTP settings.
    #[must_use]
    pub fn with_http(mut self, http: HttpSettings) -> Self {
        self.http = http;
        self
    }
}

/// Google Places photo provider.
///
/// A search finds the best-matching place near the query centre and turns
/// its photos into candidates. Headings are ignored: Places photos are
/// user uploads, not rendered views.
#[derive(Debug)]
pub struct PlacesProvider {
    http: BlockingHttp,
    base: Url,
    config: PlacesConfig,
}

impl PlacesProvider {
    /// Build a provider from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientBuildError`] when the base URL is invalid or the HTTP
    /// client or runtime cannot be built.
    pub fn new(config: PlacesConfig) -> Result<Self, ClientBuildError> {
        let trimmed = config.base_url.trim_end_matches('/');
        let base = Url::parse(&format!("{trimmed}/")).map_err(|source| {
            ClientBuildError::BaseUrl {
                url: config.base_url.clone(),
                source,
            }
        })?;
        let http = BlockingHttp::new(&config.http)?;
        Ok(Self { http, base, config })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ProviderError> {
        self.base
            .join(path)
            .map_err(|err| ProviderError::permanent(NAME, format!("invalid endpoint: {err}")))
    }

    /// Nearby Search URL for `query`, including the key.
    fn nearby_url(&self, query: &SearchQuery) -> Result<Url, ProviderError> {
        let mut url = self.endpoint("nearbysearch/json")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair(
                    "location",
                    &format!("{},{}", query.center.lat(), query.center.lon()),
                )
                .append_pair("radius", &format!("{:.0}", query.radius_meters));
            if let Some(keyword) = query.keyword.as_deref() {
                pairs.append_pair("keyword", keyword);
            }
            pairs.append_pair("key", &self.config.api_key);
        }
        Ok(url)
    }

    /// Place Details URL for `place_id`, including the key.
    fn details_url(&self, place_id: &str) -> Result<Url, ProviderError> {
        let mut url = self.endpoint("details/json")?;
        url.query_pairs_mut()
            .append_pair("place_id", place_id)
            .append_pair("fields", DETAIL_FIELDS)
            .append_pair("key", &self.config.api_key);
        Ok(url)
    }

    /// Place Photo URL for `reference`, without the key.
    fn photo_url(&self, reference: &str) -> Result<Url, ProviderError> {
        let mut url = self.endpoint("photo")?;
        url.query_pairs_mut()
            .append_pair("maxwidth", &self.config.max_width.to_string())
            .append_pair("photo_reference", reference);
        Ok(url)
    }

    fn signed(&self, locator: &str) -> Result<Url, ProviderError> {
        let mut url = Url::parse(locator)
            .map_err(|err| ProviderError::permanent(NAME, format!("invalid locator: {err}")))?;
        url.query_pairs_mut().append_pair("key", &self.config.api_key);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ProviderError> {
        let response = self
            .http
            .client()
            .get(url)
            .send()
            .await
            .map_err(|err| classify_reqwest_error(NAME, err))?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(NAME, status));
        }
        response
            .json::<T>()
            .await
            .map_err(|err| classify_reqwest_error(NAME, err))
    }

    async fn search_async(&self, query: &SearchQuery) -> Result<Vec<Candidate>, ProviderError> {
        let nearby: NearbyResponse = self.get_json(self.nearby_url(query)?).await?;
        if !check_status(&nearby.status, nearby.error_message.as_deref())? {
            return Ok(Vec::new());
        }
        let Some(place) = nearby.results.into_iter().next() else {
            return Ok(Vec::new());
        };
        let details: DetailsResponse = self.get_json(self.details_url(&place.place_id)?).await?;
        if !check_status(&details.status, details.error_message.as_deref())? {
            return Ok(Vec::new());
        }
        let Some(result) = details.result else {
            return Ok(Vec::new());
        };
        let location = result.location();
        result
            .photo_references()
            .take(self.config.max_photos)
            .map(|reference| {
                let url = self.photo_url(&reference)?;
                let candidate = Candidate::new(reference, url.as_str());
                Ok(match location {
                    Some(coord) => candidate.with_coord(coord),
                    None => candidate,
                })
            })
            .collect()
    }

    async fn fetch_async(&self, url: Url) -> Result<Vec<u8>, ProviderError> {
        let response = self
            .http
            .client()
            .get(url)
            .send()
            .await
            .map_err(|err| classify_reqwest_error(NAME, err))?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = response
            .bytes()
            .await
            .map_err(|err| classify_reqwest_error(NAME, err))?;
        interpret_photo(status, content_type.as_deref(), body.to_vec())
    }
}

/// Turn a Place Photo response into image bytes or a classified error.
fn interpret_photo(
    status: StatusCode,
    content_type: Option<&str>,
    body: Vec<u8>,
) -> Result<Vec<u8>, ProviderError> {
    if !status.is_success() {
        return Err(status_error(NAME, status));
    }
    match content_type {
        Some(value) if value.starts_with("image/") => Ok(body),
        other => Err(ProviderError::permanent(
            NAME,
            format!(
                "expected an image, got {}",
                other.unwrap_or("no content type")
            ),
        )),
    }
}

impl ImageProvider for PlacesProvider {
    fn name(&self) -> &str {
        NAME
    }

    fn search(&self, query: &SearchQuery) -> Result<Vec<Candidate>, ProviderError> {
        let candidates = self.http.block_on(self.search_async(query))?;
        log::debug!(
            "places returned {} photos for {}",
            candidates.len(),
            query.keyword.as_deref().unwrap_or("unnamed query")
        );
        Ok(candidates)
    }

    fn fetch(&self, candidate: &Candidate) -> Result<Vec<u8>, ProviderError> {
        let url = self.signed(&candidate.locator)?;
        self.http.block_on(self.fetch_async(url))
    }

    fn request_delay(&self) -> Duration {
        self.config.request_delay
    }
}
