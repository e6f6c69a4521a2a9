use crate::ConfigError;
use serde::Deserialize;
use url::Url;

/// Main configuration structure for Catalog-Sweep
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Parses the configured site root
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.site.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))
    }
}

/// The site being scraped
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Site root; category hrefs and image paths resolve against it
    #[serde(rename = "base-url")]
    pub base_url: String,
}

/// Request timeouts, retries and pacing
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// Maximum wait for one request, in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum wait for the TCP/TLS connection, in seconds
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Extra attempts for transient failures before the fetch is fatal
    #[serde(rename = "max-retries", default)]
    pub max_retries: u32,

    /// Pause between attempts (milliseconds)
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Pause before every request (milliseconds)
    #[serde(rename = "request-delay-ms", default)]
    pub request_delay_ms: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_retry_delay_ms() -> u64 {
    500
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            max_retries: 0,
            retry_delay_ms: default_retry_delay_ms(),
            request_delay_ms: 0,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// What to do with a product card whose fields cannot be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedCardPolicy {
    /// Abort the whole run on the first malformed card
    #[default]
    Abort,
    /// Drop the card, log it and keep going
    Skip,
}

/// Record extraction configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractionConfig {
    #[serde(rename = "malformed-card", default)]
    pub malformed_card: MalformedCardPolicy,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Optional path for a JSON dump of the catalog
    #[serde(rename = "json-path", default)]
    pub json_path: Option<String>,
}
