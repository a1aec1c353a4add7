//! Blocking landmark discovery client.

use std::num::NonZeroU32;
use std::thread;
use std::time::Duration;

use geoharvest_core::Landmark;
use thiserror::Error;
use url::Url;

use super::api::{OverpassResponse, into_landmarks, landmark_query};
use crate::http::BlockingHttp;
use crate::{ClientBuildError, HttpSettings};

/// Public Overpass interpreter endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";

const DEFAULT_ATTEMPTS: NonZeroU32 = NonZeroU32::MIN.saturating_add(2);
const DEFAULT_BACKOFF: Duration = Duration::from_millis(500);

/// Configuration for [`OverpassLandmarkSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverpassConfig {
    /// Interpreter endpoint receiving `POST data=<query>`.
    pub endpoint: String,
    /// Requests made per city before giving up.
    pub attempts: NonZeroU32,
    /// Pause between attempts.
    pub backoff: Duration,
    /// Shared HTTP settings.
    pub http: HttpSettings,
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            attempts: DEFAULT_ATTEMPTS,
            backoff: DEFAULT_BACKOFF,
            http: HttpSettings::default(),
        }
    }
}

impl OverpassConfig {
    /// Use another interpreter endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the attempt budget and back-off.
    #[must_use]
    pub const fn with_retry(mut self, attempts: NonZeroU32, backoff: Duration) -> Self {
        self.attempts = attempts;
        self.backoff = backoff;
        self
    }

    /// Replace the HTTP settings.
    #[must_use]
    pub fn with_http(mut self, http: HttpSettings) -> Self {
        self.http = http;
        self
    }
}

/// Errors returned by [`OverpassLandmarkSource::landmarks`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OverpassError {
    /// Every attempt ended in a non-success status.
    #[error("overpass query for {city} failed after {attempts} attempts with status {status}")]
    Status {
        /// City being queried.
        city: String,
        /// Attempts made.
        attempts: u32,
        /// Last status received.
        status: u16,
    },
    /// Every attempt ended in a transport failure.
    #[error("overpass query for {city} failed after {attempts} attempts: {source}")]
    Network {
        /// City being queried.
        city: String,
        /// Attempts made.
        attempts: u32,
        /// Last transport error.
        #[source]
        source: reqwest::Error,
    },
    /// The response body was not a valid interpreter response.
    #[error("overpass returned a malformed response for {city}: {source}")]
    Decode {
        /// City being queried.
        city: String,
        /// Parse failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Outcome of one interpreter request.
enum Attempt {
    Body(String),
    Status(u16),
    Network(reqwest::Error),
}

/// Discovers landmarks per city through the Overpass API.
#[derive(Debug)]
pub struct OverpassLandmarkSource {
    http: BlockingHttp,
    endpoint: Url,
    config: OverpassConfig,
}

impl OverpassLandmarkSource {
    /// Build a source from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientBuildError`] when the endpoint is invalid or the HTTP
    /// client or runtime cannot be built.
    pub fn new(config: OverpassConfig) -> Result<Self, ClientBuildError> {
        let endpoint = Url::parse(&config.endpoint).map_err(|source| ClientBuildError::BaseUrl {
            url: config.endpoint.clone(),
            source,
        })?;
        let http = BlockingHttp::new(&config.http)?;
        Ok(Self {
            http,
            endpoint,
            config,
        })
    }

    /// Return up to `limit` landmarks inside the area named `city`.
    ///
    /// Named landmarks precede unnamed ones. Failed requests are retried with
    /// the configured back-off.
    ///
    /// # Errors
    ///
    /// Returns [`OverpassError`] when every attempt fails or the response
    /// cannot be parsed.
    pub fn landmarks(&self, city: &str, limit: usize) -> Result<Vec<Landmark>, OverpassError> {
        let query = landmark_query(city);
        let attempts = self.config.attempts.get();
        let mut attempt = 1;
        let body = loop {
            let outcome = self.http.block_on(self.post(&query));
            let failure = match outcome {
                Attempt::Body(body) => break body,
                Attempt::Status(status) => {
                    log::warn!("overpass attempt {attempt}/{attempts} for {city} returned {status}");
                    OverpassError::Status {
                        city: city.to_owned(),
                        attempts: attempt,
                        status,
                    }
                }
                Attempt::Network(source) => {
                    log::warn!("overpass attempt {attempt}/{attempts} for {city} failed: {source}");
                    OverpassError::Network {
                        city: city.to_owned(),
                        attempts: attempt,
                        source,
                    }
                }
            };
            if attempt >= attempts {
                return Err(failure);
            }
            attempt += 1;
            thread::sleep(self.config.backoff);
        };

        let response: OverpassResponse =
            serde_json::from_str(&body).map_err(|source| OverpassError::Decode {
                city: city.to_owned(),
                source,
            })?;
        let mut landmarks = into_landmarks(response);
        landmarks.truncate(limit);
        log::info!("discovered {} landmarks in {city}", landmarks.len());
        Ok(landmarks)
    }

    async fn post(&self, query: &str) -> Attempt {
        let sent = self
            .http
            .client()
            .post(self.endpoint.clone())
            .form(&[("data", query)])
            .send()
            .await;
        let response = match sent {
            Ok(response) => response,
            Err(err) => return Attempt::Network(err.without_url()),
        };
        let status = response.status();
        if !status.is_success() {
            return Attempt::Status(status.as_u16());
        }
        match response.text().await {
            Ok(body) => Attempt::Body(body),
            Err(err) => Attempt::Network(err.without_url()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_match_the_public_interpreter() {
        let config = OverpassConfig::default();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.attempts.get(), 3);
        assert_eq!(config.backoff, Duration::from_millis(500));
    }

    #[rstest]
    fn retry_builder_overrides_defaults() {
        let attempts = NonZeroU32::new(5).expect("non-zero");
        let config = OverpassConfig::default().with_retry(attempts, Duration::ZERO);
        assert_eq!(config.attempts, attempts);
        assert_eq!(config.backoff, Duration::ZERO);
    }

    #[rstest]
    fn invalid_endpoint_is_rejected() {
        let config = OverpassConfig::default().with_endpoint("::not a url::");
        assert!(matches!(
            OverpassLandmarkSource::new(config),
            Err(ClientBuildError::BaseUrl { .. })
        ));
    }

    #[rstest]
    fn unreachable_endpoint_exhausts_every_attempt() {
        let attempts = NonZeroU32::new(2).expect("non-zero");
        let config = OverpassConfig::default()
            .with_endpoint("http://127.0.0.1:9/api/interpreter")
            .with_retry(attempts, Duration::ZERO)
            .with_http(HttpSettings::default().with_timeout(Duration::from_secs(2)));
        let source = OverpassLandmarkSource::new(config).expect("source should build");

        let err = source.landmarks("Sibiu", 3).expect_err("nothing listens there");

        assert!(matches!(err, OverpassError::Network { attempts: 2, .. }));
    }

    #[rstest]
    fn status_errors_report_the_code() {
        let err = OverpassError::Status {
            city: "Brasov".to_owned(),
            attempts: 3,
            status: 504,
        };
        assert_eq!(
            err.to_string(),
            "overpass query for Brasov failed after 3 attempts with status 504"
        );
    }
}
