//! Blocking bridge over `reqwest` shared by every client in this crate.
//!
//! [`geoharvest_core::ImageProvider`] is synchronous so the acquisition
//! coordinator can drive it from plain worker threads. Each client owns a
//! small multi-threaded Tokio runtime and blocks on it per request. Many
//! coordinator workers may block on the same runtime at once.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use geoharvest_core::ProviderError;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tokio::runtime::{Builder, Handle, Runtime, RuntimeFlavor};

/// Default user agent for outgoing requests.
pub const DEFAULT_USER_AGENT: &str = "geoharvest/0.1";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const RUNTIME_WORKERS: usize = 2;

/// Timeout and identification shared by every HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    /// Connect and overall request timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpSettings {
    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Failure to construct an HTTP-backed client.
#[derive(Debug, Error)]
pub enum ClientBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// The configured base URL could not be parsed.
    #[error("invalid base URL {url}: {source}")]
    BaseUrl {
        /// Rejected URL.
        url: String,
        /// Parse failure.
        #[source]
        source: url::ParseError,
    },
}

/// `reqwest` client plus the runtime its futures are driven on.
pub(crate) struct BlockingHttp {
    client: Client,
    runtime: Runtime,
}

impl fmt::Debug for BlockingHttp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockingHttp")
            .field("client", &self.client)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl BlockingHttp {
    pub(crate) fn new(settings: &HttpSettings) -> Result<Self, ClientBuildError> {
        let client = Client::builder()
            .user_agent(&settings.user_agent)
            .connect_timeout(settings.timeout)
            .timeout(settings.timeout)
            .build()
            .map_err(ClientBuildError::HttpClient)?;
        let runtime = Builder::new_multi_thread()
            .worker_threads(RUNTIME_WORKERS)
            .thread_name("geoharvest-http")
            .enable_all()
            .build()
            .map_err(ClientBuildError::Runtime)?;
        Ok(Self { client, runtime })
    }

    pub(crate) const fn client(&self) -> &Client {
        &self.client
    }

    /// Drive `future` to completion from synchronous code.
    ///
    /// Inside a multi-threaded Tokio runtime the caller's runtime is reused
    /// through `block_in_place`; otherwise the owned runtime is used.
    pub(crate) fn block_on<F: Future>(&self, future: F) -> F::Output {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}

/// Report whether a response status is worth retrying.
pub(crate) fn is_transient_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

/// Map a non-success status to a provider error.
pub(crate) fn status_error(provider: &str, status: StatusCode) -> ProviderError {
    let message = format!("HTTP {status}");
    if is_transient_status(status) {
        ProviderError::transient(provider, message)
    } else {
        ProviderError::permanent(provider, message)
    }
}

/// Map a `reqwest` failure to a provider error.
///
/// The request URL is stripped first; some providers carry the API key in
/// the query string.
pub(crate) fn classify_reqwest_error(provider: &str, error: reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        return ProviderError::transient(provider, "request timed out");
    }
    if let Some(status) = error.status() {
        return status_error(provider, status);
    }
    let bare = error.without_url();
    if bare.is_decode() {
        return ProviderError::permanent(provider, format!("malformed response: {bare}"));
    }
    ProviderError::transient(provider, format!("network error: {bare}"))
}
