//! Google Street View Static API image provider.
//!
//! Street View renders a view for any location and heading, so a search does
//! not hit the network: it returns a single candidate describing the request
//! for the query centre and heading. The fetch then either yields a JPEG or
//! reports that no imagery exists there.

use std::time::Duration;

use geoharvest_core::{Candidate, ImageProvider, ProviderError, SearchQuery};
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::http::{BlockingHttp, classify_reqwest_error, status_error};
use crate::{ClientBuildError, HttpSettings};

/// Production Street View Static API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/streetview";

const NAME: &str = "streetview";

/// Bytes of a non-image body inspected for "no imagery" markers.
const BODY_SAMPLE_LEN: usize = 500;

const NO_IMAGERY_MARKERS: [&str; 3] = [
    "ZERO_RESULTS",
    "Sorry, we have no imagery here",
    "No Street View imagery found",
];

/// Configuration for [`StreetViewProvider`].
#[derive(Clone, PartialEq)]
pub struct StreetViewConfig {
    /// API key appended to every download.
    pub api_key: String,
    /// Static API base URL.
    pub base_url: String,
    /// Image size as `WIDTHxHEIGHT`.
    pub size: String,
    /// Horizontal field of view in degrees.
    pub fov: f64,
    /// Camera pitch in degrees.
    pub pitch: f64,
    /// Pause after every successful download.
    pub request_delay: Duration,
    /// Shared HTTP settings.
    pub http: HttpSettings,
}

impl std::fmt::Debug for StreetViewConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreetViewConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("size", &self.size)
            .field("fov", &self.fov)
            .field("pitch", &self.pitch)
            .field("request_delay", &self.request_delay)
            .field("http", &self.http)
            .finish()
    }
}

impl StreetViewConfig {
    /// Configuration for the production API with the given key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            size: "640x480".to_owned(),
            fov: 90.0,
            pitch: 0.0,
            request_delay: Duration::from_secs(1),
            http: HttpSettings::default(),
        }
    }

    /// Point the provider at another endpoint.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the image size, e.g. `"640x640"`.
    #[must_use]
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = size.into();
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

/// Street View image provider.
#[derive(Debug)]
pub struct StreetViewProvider {
    http: BlockingHttp,
    endpoint: Url,
    config: StreetViewConfig,
}

impl StreetViewProvider {
    /// Build a provider from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientBuildError`] when the base URL is invalid or the HTTP
    /// client or runtime cannot be built.
    pub fn new(config: StreetViewConfig) -> Result<Self, ClientBuildError> {
        let endpoint = Url::parse(&config.base_url).map_err(|source| ClientBuildError::BaseUrl {
            url: config.base_url.clone(),
            source,
        })?;
        let http = BlockingHttp::new(&config.http)?;
        Ok(Self {
            http,
            endpoint,
            config,
        })
    }

    /// Request URL for `query`, without the API key.
    fn view_url(&self, query: &SearchQuery) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("size", &self.config.size)
                .append_pair(
                    "location",
                    &format!("{},{}", query.center.lat(), query.center.lon()),
                )
                .append_pair("fov", &self.config.fov.to_string())
                .append_pair("pitch", &self.config.pitch.to_string())
                .append_pair("source", "outdoor")
                .append_pair("return_error_code", "true");
            if let Some(heading) = query.heading {
                pairs.append_pair("heading", &format!("{heading:.2}"));
            }
        }
        url
    }

    fn signed(&self, locator: &str) -> Result<Url, ProviderError> {
        let mut url = Url::parse(locator)
            .map_err(|err| ProviderError::permanent(NAME, format!("invalid locator: {err}")))?;
        url.query_pairs_mut().append_pair("key", &self.config.api_key);
        Ok(url)
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
        interpret_response(status, content_type.as_deref(), body.to_vec())
    }
}

/// Turn a raw response into image bytes or a classified error.
fn interpret_response(
    status: StatusCode,
    content_type: Option<&str>,
    body: Vec<u8>,
) -> Result<Vec<u8>, ProviderError> {
    let is_jpeg = content_type.is_some_and(|value| value.contains("image/jpeg"));
    if status == StatusCode::OK && is_jpeg {
        return Ok(body);
    }
    let sample = String::from_utf8_lossy(body.get(..BODY_SAMPLE_LEN).unwrap_or(body.as_slice()));
    if NO_IMAGERY_MARKERS
        .iter()
        .any(|marker| sample.contains(marker))
    {
        return Err(ProviderError::permanent(NAME, "no imagery at this location"));
    }
    if status == StatusCode::OK {
        return Err(ProviderError::permanent(
            NAME,
            format!(
                "expected image/jpeg, got {}",
                content_type.unwrap_or("no content type")
            ),
        ));
    }
    Err(status_error(NAME, status))
}

impl ImageProvider for StreetViewProvider {
    fn name(&self) -> &str {
        NAME
    }

    fn search(&self, query: &SearchQuery) -> Result<Vec<Candidate>, ProviderError> {
        let url = self.view_url(query);
        let heading = query.heading.unwrap_or(0.0);
        let reference = format!(
            "{:.6},{:.6}@{heading:.2}",
            query.center.lat(),
            query.center.lon()
        );
        let mut candidate = Candidate::new(reference, url.as_str()).with_coord(query.center);
        if query.heading.is_some() {
            candidate = candidate.with_compass_angle(heading);
        }
        Ok(vec![candidate])
    }

    fn fetch(&self, candidate: &Candidate) -> Result<Vec<u8>, ProviderError> {
        let url = self.signed(&candidate.locator)?;
        self.http.block_on(self.fetch_async(url))
    }

    fn request_delay(&self) -> Duration {
        self.config.request_delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoharvest_core::GeoPoint;
    use rstest::{fixture, rstest};

    #[fixture]
    fn provider() -> StreetViewProvider {
        StreetViewProvider::new(StreetViewConfig::new("secret-key")).expect("provider should build")
    }

    fn query(heading: Option<f64>) -> SearchQuery {
        SearchQuery {
            center: GeoPoint::new(45.6427, 25.5887).expect("valid"),
            radius_meters: 50.0,
            keyword: Some("Biserica Neagra".to_owned()),
            heading,
        }
    }

    #[rstest]
    fn search_synthesises_one_candidate_without_the_key(provider: StreetViewProvider) {
        let candidates = provider.search(&query(Some(123.456))).expect("search");
        assert_eq!(candidates.len(), 1);
        let candidate = candidates.first().expect("candidate");
        assert_eq!(candidate.provider_ref, "45.642700,25.588700@123.46");
        assert_eq!(candidate.compass_angle, Some(123.456));
        assert!(!candidate.locator.contains("secret-key"));

        let url = Url::parse(&candidate.locator).expect("locator is a URL");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        for (key, value) in [
            ("size", "640x480"),
            ("location", "45.6427,25.5887"),
            ("fov", "90"),
            ("pitch", "0"),
            ("source", "outdoor"),
            ("return_error_code", "true"),
            ("heading", "123.46"),
        ] {
            assert!(
                pairs.contains(&(key.to_owned(), value.to_owned())),
                "missing {key}={value} in {pairs:?}"
            );
        }
    }

    #[rstest]
    fn search_without_heading_omits_the_parameter(provider: StreetViewProvider) {
        let candidates = provider.search(&query(None)).expect("search");
        let candidate = candidates.first().expect("candidate");
        assert!(!candidate.locator.contains("heading="));
        assert_eq!(candidate.compass_angle, None);
    }

    #[rstest]
    fn signing_appends_the_key(provider: StreetViewProvider) {
        let candidates = provider.search(&query(Some(0.0))).expect("search");
        let locator = &candidates.first().expect("candidate").locator;
        let signed = provider.signed(locator).expect("valid locator");
        assert!(
            signed
                .query_pairs()
                .any(|(key, value)| key == "key" && value == "secret-key")
        );
    }

    #[rstest]
    fn jpeg_responses_yield_bytes() {
        let body = vec![0xFF, 0xD8, 0xFF];
        let result = interpret_response(StatusCode::OK, Some("image/jpeg"), body.clone());
        assert_eq!(result, Ok(body));
    }

    #[rstest]
    #[case(StatusCode::OK, Some("text/plain"), "ZERO_RESULTS")]
    #[case(StatusCode::BAD_REQUEST, Some("text/plain"), "ZERO_RESULTS")]
    #[case(StatusCode::NOT_FOUND, None, "Sorry, we have no imagery here.")]
    fn missing_imagery_is_permanent(
        #[case] status: StatusCode,
        #[case] content_type: Option<&str>,
        #[case] body: &str,
    ) {
        let err = interpret_response(status, content_type, body.as_bytes().to_vec())
            .expect_err("no imagery");
        assert_eq!(
            err,
            ProviderError::permanent(NAME, "no imagery at this location")
        );
    }

    #[rstest]
    fn non_image_success_is_permanent() {
        let err = interpret_response(StatusCode::OK, Some("text/html"), b"<html/>".to_vec())
            .expect_err("not an image");
        assert!(!err.is_transient());
    }

    #[rstest]
    #[case(StatusCode::FORBIDDEN, false)]
    #[case(StatusCode::SERVICE_UNAVAILABLE, true)]
    #[case(StatusCode::TOO_MANY_REQUESTS, true)]
    fn other_statuses_follow_the_shared_classification(
        #[case] status: StatusCode,
        #[case] transient: bool,
    ) {
        let err = interpret_response(status, Some("text/plain"), b"error".to_vec())
            .expect_err("failure status");
        assert_eq!(err.is_transient(), transient);
    }

    #[rstest]
    fn default_delay_is_one_second(provider: StreetViewProvider) {
        assert_eq!(provider.request_delay(), Duration::from_secs(1));
    }
}
