//! Page fetcher implementation
//!
//! This module handles every HTTP request made during a scrape, including:
//! - Building HTTP clients with proper user agent strings and timeouts
//! - GET requests for listing and navigation pages
//! - Bounded retry for transient failures
//! - Error classification
//!
//! Any failure that survives the retry budget is fatal for the run.

use crate::config::{FetcherConfig, UserAgentConfig};
use crate::{FetchError, HarvestError};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use scraper::Html;
use std::time::Duration;
use url::Url;

/// A source of HTML pages
///
/// The pipeline only needs "give me the body at this URL"; production uses
/// [`HttpFetcher`], tests can serve canned pages.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Returns the body of the page at `url`
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `fetcher` - Timeout settings
///
/// # Example
///
/// ```no_run
/// use catalog_sweep::config::{FetcherConfig, UserAgentConfig};
/// use catalog_sweep::crawler::build_http_client;
///
/// let user_agent = UserAgentConfig {
///     crawler_name: "CatalogSweep".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&user_agent, &FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    fetcher: &FetcherConfig,
) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL; ContactEmail)
    let user_agent = format!(
        "{}/{} (+{}; {})",
        user_agent.crawler_name,
        user_agent.crawler_version,
        user_agent.contact_url,
        user_agent.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(fetcher.timeout_secs))
        .connect_timeout(Duration::from_secs(fetcher.connect_timeout_secs))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// HTTP-backed page source with bounded retry
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 2xx | Return body |
/// | HTTP 4xx (404, 429, ...) | Immediate failure |
/// | HTTP 5xx | Retry up to `max-retries` times |
/// | Timeout | Retry up to `max-retries` times |
/// | Connection refused | Retry up to `max-retries` times |
/// | Other transport error | Immediate failure |
pub struct HttpFetcher {
    client: Client,
    max_retries: u32,
    retry_delay: Duration,
    request_delay: Duration,
}

impl HttpFetcher {
    /// Creates a fetcher from user agent and fetcher settings
    pub fn new(user_agent: &UserAgentConfig, fetcher: &FetcherConfig) -> Result<Self, FetchError> {
        let client = build_http_client(user_agent, fetcher)?;
        Ok(Self::with_client(client, fetcher))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client, fetcher: &FetcherConfig) -> Self {
        Self {
            client,
            max_retries: fetcher.max_retries,
            retry_delay: Duration::from_millis(fetcher.retry_delay_ms),
            request_delay: Duration::from_millis(fetcher.request_delay_ms),
        }
    }

    /// Sends a single GET request
    async fn fetch_once(&self, url: &Url) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))
    }
}

#[async_trait]
impl PageSource for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let mut attempt = 0;

        loop {
            if !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }

            match self.fetch_once(url).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        "Fetch of {} failed ({}), retry {}/{}",
                        url,
                        e,
                        attempt,
                        self.max_retries
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Maps a reqwest error onto the fetch error taxonomy
fn classify_transport_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else if error.is_connect() {
        FetchError::Connect(error.to_string())
    } else {
        FetchError::Transport(error)
    }
}

/// Fetches a page and parses it into a queryable document tree
///
/// # Returns
///
/// * `Ok(Html)` - The parsed document
/// * `Err(HarvestError::Fetch)` - The page could not be retrieved
pub async fn fetch_document<S>(source: &S, url: &Url) -> Result<Html, HarvestError>
where
    S: PageSource + ?Sized,
{
    let body = source
        .fetch(url)
        .await
        .map_err(|source| HarvestError::Fetch {
            url: url.to_string(),
            source,
        })?;

    Ok(Html::parse_document(&body))
}
