//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the warmer, including:
//! - Building the shared keep-alive client with the fixed warming headers
//! - The `Fetcher` seam used by the resolver, the pool, the retry pass and the notifier
//! - Classifying document fetches into successes and recorded failures

use crate::config::Config;
use crate::crawler::failures::{FailureTracker, FetchFailure};
use crate::{ConfigError, FetchError, WarmError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT_ENCODING};
use reqwest::Client;
use std::time::Duration;

/// Header used to pin the CDN's geo variant
pub const COUNTRY_CODE_HEADER: &str = "cdn-country-code";

/// A complete HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl FetchResponse {
    /// Returns true for 4xx and 5xx responses
    pub fn is_error_status(&self) -> bool {
        self.status >= 400
    }
}

/// Performs a single GET request
///
/// An HTTP error status is a normal response here; only transport-level
/// problems (DNS, connect, timeout, body read) are errors.
#[async_trait]
pub trait Fetcher: Send + Sync + 'static {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError>;
}

/// Result of warming a single document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The origin answered with a status below 400
    Success {
        /// HTTP status code
        status: u16,
        /// Size of the discarded body in bytes
        body_len: usize,
    },

    /// The origin answered with a status of 400 or above
    HttpError {
        /// HTTP status code
        status: u16,
    },

    /// No response was received
    TransportError {
        /// Error description
        error: String,
    },
}

impl FetchOutcome {
    /// Classifies the result of a fetch
    pub fn from_result(result: Result<FetchResponse, FetchError>) -> Self {
        match result {
            Ok(response) if response.is_error_status() => Self::HttpError {
                status: response.status,
            },
            Ok(response) => Self::Success {
                status: response.status,
                body_len: response.body.len(),
            },
            Err(e) => Self::TransportError {
                error: e.to_string(),
            },
        }
    }

    /// Returns true if the document was served without an error
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Builds the failure record for this outcome, if it is a failure
    pub fn failure(&self, url: &str) -> Option<FetchFailure> {
        match self {
            Self::Success { .. } => None,
            Self::HttpError { status } => Some(FetchFailure::http(url, *status)),
            Self::TransportError { error } => Some(FetchFailure::transport(url, error.clone())),
        }
    }
}

/// Production fetcher backed by a shared keep-alive `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    /// Builds a fetcher from the warmer configuration
    pub fn new(config: &Config) -> Result<Self, WarmError> {
        Ok(Self::from_client(build_http_client(config)?))
    }

    /// Wraps an already configured client
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let response = self.client.get(url).send().await.map_err(classify_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify_error)?;
        Ok(FetchResponse { status, body })
    }
}

/// Builds the HTTP client shared by every request of a run
///
/// The client keeps connections alive between requests, decodes gzip and
/// brotli bodies, and sends on every request:
/// - `User-Agent: CrawlerName/Version (+ContactURL)`
/// - `Accept-Encoding` from the `[headers]` section (default `gzip`)
/// - `CDN-Country-Code` from the `[headers]` section (default `US`)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(WarmError)` - A header value is invalid or the client failed to build
pub fn build_http_client(config: &Config) -> Result<Client, WarmError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT_ENCODING,
        header_value("accept-encoding", &config.headers.accept_encoding)?,
    );
    headers.insert(
        HeaderName::from_static(COUNTRY_CODE_HEADER),
        header_value("country-code", &config.headers.country_code)?,
    );

    let client = Client::builder()
        .user_agent(config.user_agent_string())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.warmer.request_timeout))
        .connect_timeout(Duration::from_secs(config.warmer.connect_timeout))
        .pool_max_idle_per_host(config.warmer.concurrency as usize)
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

fn header_value(field: &str, value: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(value).map_err(|e| {
        ConfigError::Validation(format!("Invalid {} header value '{}': {}", field, value, e))
    })
}

fn classify_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if e.is_connect() {
        FetchError::Connect(e.to_string())
    } else {
        FetchError::Request(e.to_string())
    }
}

/// Fetches a document and records it in the tracker if it failed
///
/// Status codes of 400 and above and transport errors both end up as a
/// `FetchFailure`, so one bad document never stops a worker.
pub async fn fetch_document<F>(fetcher: &F, url: &str, tracker: &FailureTracker) -> FetchOutcome
where
    F: Fetcher + ?Sized,
{
    let outcome = FetchOutcome::from_result(fetcher.fetch(url).await);

    match &outcome {
        FetchOutcome::Success { status, body_len } => {
            tracing::trace!("Fetched {} ({}, {} bytes)", url, status, body_len);
        }
        FetchOutcome::HttpError { status } => {
            tracing::warn!("Error {} while fetching {}", status, url);
        }
        FetchOutcome::TransportError { error } => {
            tracing::warn!("Failed to fetch {}: {}", url, error);
        }
    }

    if let Some(failure) = outcome.failure(url) {
        tracker.record(failure);
    }

    outcome
}
