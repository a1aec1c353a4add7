//! `ImageProvider` implementation over the Mapillary Graph API.

use std::time::Duration;

use geoharvest_core::geodesy::bounding_box;
use geoharvest_core::{BoundingBox, Candidate, ImageProvider, ProviderError, SearchQuery};
use reqwest::header::AUTHORIZATION;
use url::Url;

use super::api::{IMAGE_FIELDS, ImageRecord, ImagesResponse};
use crate::http::{BlockingHttp, classify_reqwest_error, status_error};
use crate::{ClientBuildError, HttpSettings};

/// Production Graph API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://graph.mapillary.com";

/// Maximum images requested per search.
pub const DEFAULT_LIMIT: u32 = 100;

const NAME: &str = "mapillary";

/// Configuration for [`MapillaryProvider`].
#[derive(Clone, PartialEq, Eq)]
pub struct MapillaryConfig {
    /// Client access token, sent as `Authorization: OAuth <token>`.
    pub access_token: String,
    /// Graph API base URL.
    pub base_url: String,
    /// Maximum images requested per search.
    pub limit: u32,
    /// Pause after every successful download.
    pub request_delay: Duration,
    /// Shared HTTP settings.
    pub http: HttpSettings,
}

impl std::fmt::Debug for MapillaryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapillaryConfig")
            .field("access_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("limit", &self.limit)
            .field("request_delay", &self.request_delay)
            .field("http", &self.http)
            .finish()
    }
}

impl MapillaryConfig {
    /// Configuration for the production API with the given token.
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            limit: DEFAULT_LIMIT,
            request_delay: Duration::ZERO,
            http: HttpSettings::default(),
        }
    }

    /// Point the provider at another endpoint.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the per-search image limit.
    #[must_use]
    pub const fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
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

/// Mapillary image provider.
///
/// The provider blocks on asynchronous HTTP requests internally, so it can be
/// shared by the coordinator's worker threads directly.
#[derive(Debug)]
pub struct MapillaryProvider {
    http: BlockingHttp,
    images_endpoint: Url,
    config: MapillaryConfig,
}

impl MapillaryProvider {
    /// Build a provider from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientBuildError`] when the base URL is invalid or the HTTP
    /// client or runtime cannot be built.
    pub fn new(config: MapillaryConfig) -> Result<Self, ClientBuildError> {
        let base = config.base_url.trim_end_matches('/');
        let images_endpoint =
            Url::parse(&format!("{base}/images")).map_err(|source| ClientBuildError::BaseUrl {
                url: config.base_url.clone(),
                source,
            })?;
        let http = BlockingHttp::new(&config.http)?;
        Ok(Self {
            http,
            images_endpoint,
            config,
        })
    }

    /// Build the `images` search URL for `bbox`.
    fn images_url(&self, bbox: BoundingBox) -> Url {
        let mut url = self.images_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("fields", IMAGE_FIELDS)
            .append_pair(
                "bbox",
                &format!(
                    "{},{},{},{}",
                    bbox.min_lon, bbox.min_lat, bbox.max_lon, bbox.max_lat
                ),
            )
            .append_pair("limit", &self.config.limit.to_string());
        url
    }

    async fn search_async(&self, url: Url) -> Result<ImagesResponse, ProviderError> {
        let response = self
            .http
            .client()
            .get(url)
            .header(AUTHORIZATION, format!("OAuth {}", self.config.access_token))
            .send()
            .await
            .map_err(|err| classify_reqwest_error(NAME, err))?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(NAME, status));
        }
        response
            .json::<ImagesResponse>()
            .await
            .map_err(|err| classify_reqwest_error(NAME, err))
    }

    async fn fetch_async(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
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
        let bytes = response
            .bytes()
            .await
            .map_err(|err| classify_reqwest_error(NAME, err))?;
        Ok(bytes.to_vec())
    }
}

/// Candidates with a downloadable thumbnail, in response order.
fn convert_response(response: ImagesResponse) -> Vec<Candidate> {
    response
        .data
        .into_iter()
        .filter_map(ImageRecord::into_candidate)
        .collect()
}

impl ImageProvider for MapillaryProvider {
    fn name(&self) -> &str {
        NAME
    }

    fn search(&self, query: &SearchQuery) -> Result<Vec<Candidate>, ProviderError> {
        let bbox = bounding_box(query.center, query.radius_meters)
            .map_err(|err| ProviderError::permanent(NAME, err.to_string()))?;
        let url = self.images_url(bbox);
        let response = self.http.block_on(self.search_async(url))?;
        let candidates = convert_response(response);
        log::debug!(
            "mapillary returned {} usable images around {},{}",
            candidates.len(),
            query.center.lat(),
            query.center.lon()
        );
        Ok(candidates)
    }

    fn fetch(&self, candidate: &Candidate) -> Result<Vec<u8>, ProviderError> {
        self.http.block_on(self.fetch_async(&candidate.locator))
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
    fn provider() -> MapillaryProvider {
        MapillaryProvider::new(MapillaryConfig::new("secret-token")).expect("provider should build")
    }

    #[rstest]
    fn images_url_carries_fields_bbox_and_limit(provider: MapillaryProvider) {
        let bbox = BoundingBox {
            min_lon: 23.5,
            min_lat: 46.7,
            max_lon: 23.6,
            max_lat: 46.8,
        };

        let url = provider.images_url(bbox);

        assert_eq!(url.host_str(), Some("graph.mapillary.com"));
        assert_eq!(url.path(), "/images");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("fields".to_owned(), IMAGE_FIELDS.to_owned())));
        assert!(pairs.contains(&("bbox".to_owned(), "23.5,46.7,23.6,46.8".to_owned())));
        assert!(pairs.contains(&("limit".to_owned(), "100".to_owned())));
        assert!(!url.as_str().contains("secret-token"));
    }

    #[rstest]
    fn base_url_trailing_slash_is_ignored() {
        let config = MapillaryConfig::new("t").with_base_url("http://localhost:8080/");
        let provider = MapillaryProvider::new(config).expect("provider should build");
        assert_eq!(
            provider.images_endpoint.as_str(),
            "http://localhost:8080/images"
        );
    }

    #[rstest]
    fn invalid_base_url_is_rejected() {
        let config = MapillaryConfig::new("t").with_base_url("not a url");
        assert!(matches!(
            MapillaryProvider::new(config),
            Err(ClientBuildError::BaseUrl { .. })
        ));
    }

    #[rstest]
    fn polar_search_is_a_permanent_error(provider: MapillaryProvider) {
        let query = SearchQuery {
            center: GeoPoint::new(90.0, 0.0).expect("valid"),
            radius_meters: 100.0,
            keyword: None,
            heading: None,
        };
        let err = provider.search(&query).expect_err("polar bbox");
        assert!(!err.is_transient());
    }

    #[rstest]
    fn debug_output_hides_the_token() {
        let rendered = format!("{:?}", MapillaryConfig::new("secret-token"));
        assert!(!rendered.contains("secret-token"));
    }

    #[rstest]
    fn convert_response_keeps_provider_order() {
        let body = r#"{"data": [
            {"id": "b", "thumb_2048_url": "https://x/b.jpg"},
            {"id": "a", "thumb_2048_url": "https://x/a.jpg"}
        ]}"#;
        let response: ImagesResponse = serde_json::from_str(body).expect("should deserialise");
        let refs: Vec<String> = convert_response(response)
            .into_iter()
            .map(|c| c.provider_ref)
            .collect();
        assert_eq!(refs, vec!["b".to_owned(), "a".to_owned()]);
    }
}
