//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the crawler's identity header and timeout
//! - GET requests with bounded retries and exponential backoff
//! - Parsing successful responses into a document tree

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::FetchError;
use reqwest::Client;
use scraper::Html;
use std::time::Duration;

/// A fetched page, parsed and ready for extraction
///
/// Owned by the caller of [`fetch_page`] and dropped once its products are extracted.
pub type PageDocument = Html;

/// Retry budget for a single page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay unit; attempt k (k >= 2) waits 2^(k-2) units
    pub backoff_unit: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_unit: Duration) -> Self {
        Self {
            max_attempts,
            backoff_unit,
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(config.max_retries, config.backoff_unit())
    }

    /// Returns the pause before the given 1-based attempt
    ///
    /// The first attempt goes out immediately; afterwards the delay doubles
    /// starting from one unit. No jitter is applied.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt < 2 {
            return Duration::ZERO;
        }
        let factor = 2u32.saturating_pow(attempt - 2);
        self.backoff_unit.saturating_mul(factor)
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Whole-request timeout
///
/// # Example
///
/// ```no_run
/// use catalog_harvest::config::UserAgentConfig;
/// use catalog_harvest::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(10)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Sends one GET request and returns the body of a 2xx response
async fn fetch_once(client: &Client, url: &str) -> Result<String, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|source| FetchError::Transport {
        url: url.to_string(),
        source,
    })
}

/// Fetches a URL with retry logic and parses it into a document
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | 2xx | Parse body and return |
/// | Any other status | Retry |
/// | Timeout / connection error | Retry |
/// | Budget exhausted | `FetchError::Exhausted` |
///
/// Callers should treat `Exhausted` as "page unavailable" rather than a crash.
pub async fn fetch_page(
    client: &Client,
    url: &str,
    policy: &RetryPolicy,
) -> Result<PageDocument, FetchError> {
    let attempts = policy.max_attempts.max(1);

    for attempt in 1..=attempts {
        let delay = policy.delay_before(attempt);
        if !delay.is_zero() {
            tracing::info!(
                "Retrying {} in {}ms (attempt {}/{})",
                url,
                delay.as_millis(),
                attempt,
                attempts
            );
            tokio::time::sleep(delay).await;
        }

        tracing::info!("Fetching page: {} (attempt {}/{})", url, attempt, attempts);

        match fetch_once(client, url).await {
            Ok(body) => {
                tracing::info!("Fetched {} ({} bytes)", url, body.len());
                return Ok(Html::parse_document(&body));
            }
            Err(e) => {
                tracing::warn!("Attempt {}/{} failed: {}", attempt, attempts, e);
            }
        }
    }

    tracing::error!("Could not fetch {} after {} attempts", url, attempts);
    Err(FetchError::Exhausted {
        url: url.to_string(),
        attempts,
    })
}
