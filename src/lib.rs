//! Catalog-Sweep: a category-walking book catalog scraper
//!
//! This crate discovers the category taxonomy of a paginated book store,
//! walks every listing page of every category, extracts typed book records,
//! assigns them stable sequential ids and hands the finished catalog to a
//! storage sink.

pub mod catalog;
pub mod config;
pub mod crawler;
pub mod output;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Catalog-Sweep operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to fetch {url}: {source}")]
    Fetch { url: String, source: FetchError },

    #[error("Malformed product card on {url}: {message}")]
    Extraction { url: String, message: String },

    #[error("Invalid CSS selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Transport and HTTP failures while retrieving a page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP status {status}")]
    Status { status: u16 },

    #[error("Request timeout")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Failed to read response body: {0}")]
    Body(String),

    #[error("HTTP client error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl FetchError {
    /// Returns true for failures worth another attempt (5xx, timeouts, refused connections)
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Status { status } => *status >= 500,
            Self::Timeout | Self::Connect(_) => true,
            Self::Body(_) | Self::Transport(_) => false,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Catalog-Sweep operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use catalog::{BookRecord, CategoryIndex, RawBookRecord};
pub use config::Config;
pub use crawler::{scrape_catalog, Coordinator, HttpFetcher, PageSource};
pub use storage::{BookSink, SqliteStorage, StoreReport};
