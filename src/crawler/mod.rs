//! Crawler module for catalog scraping
//!
//! This module contains the core scraping pipeline, including:
//! - Page fetching with bounded retry
//! - Category discovery from the site navigation
//! - Record extraction from product cards
//! - Pagination through each category's listing pages
//! - Overall run coordination and id assignment

mod categories;
mod coordinator;
mod extractor;
mod fetcher;
mod paginator;
mod selectors;

pub use categories::{discover_categories, parse_categories};
pub use coordinator::{CatalogRun, Coordinator};
pub use extractor::{category_label, extract_cards, extract_page, MalformedCard};
pub use fetcher::{build_http_client, fetch_document, HttpFetcher, PageSource};
pub use paginator::{next_page_href, next_page_url, CategoryWalk, PageWalker};
pub use selectors::SiteSelectors;

use crate::catalog::BookRecord;
use crate::config::Config;
use crate::HarvestError;

/// Scrapes the configured site over HTTP
///
/// This is the main entry point for a scrape. It will:
/// 1. Build the HTTP fetcher from the configuration
/// 2. Discover the category index
/// 3. Walk every category and number the records
///
/// # Example
///
/// ```no_run
/// use catalog_sweep::config::load_config;
/// use catalog_sweep::crawler::scrape_catalog;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let books = scrape_catalog(&config).await?;
/// println!("{} books", books.len());
/// # Ok(())
/// # }
/// ```
pub async fn scrape_catalog(config: &Config) -> Result<Vec<BookRecord>, HarvestError> {
    Coordinator::from_config(config)?.scrape_catalog().await
}
