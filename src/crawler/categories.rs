//! Category discovery
//!
//! The site root carries the category taxonomy as a nested list in its
//! side navigation. Each link becomes one entry of the [`CategoryIndex`],
//! in navigation order.

use crate::catalog::CategoryIndex;
use crate::crawler::fetcher::{fetch_document, PageSource};
use crate::crawler::selectors::SiteSelectors;
use crate::url::resolve_href;
use crate::HarvestError;
use scraper::Html;
use url::Url;

/// Fetches the site root and builds the category index
///
/// # Returns
///
/// * `Ok(CategoryIndex)` - Categories in navigation order, or the single
///   `Unknown -> site root` entry when none were found
/// * `Err(HarvestError::Fetch)` - The site root could not be fetched
pub async fn discover_categories<S>(
    source: &S,
    base_url: &Url,
    selectors: &SiteSelectors,
) -> Result<CategoryIndex, HarvestError>
where
    S: PageSource + ?Sized,
{
    let document = fetch_document(source, base_url).await?;
    let index = parse_categories(&document, base_url, selectors);

    tracing::info!("Discovered {} categories", index.len());
    Ok(index)
}

/// Extracts the category index from a parsed site root
///
/// A missing navigation region yields no links, which triggers the fallback
/// entry rather than an error.
pub fn parse_categories(document: &Html, base_url: &Url, selectors: &SiteSelectors) -> CategoryIndex {
    let mut index = CategoryIndex::new();

    for link in document.select(&selectors.category_link) {
        let name = link.text().collect::<String>().trim().to_string();

        let Some(href) = link.value().attr("href") else {
            tracing::warn!("Category link '{}' has no href, skipping", name);
            continue;
        };

        match resolve_href(base_url, href) {
            Ok(url) => index.insert(name, url),
            Err(e) => tracing::warn!("Category '{}' has unusable href '{}': {}", name, href, e),
        }
    }

    if index.is_empty() {
        tracing::warn!("No category links found, treating the site root as one category");
    }

    index.or_fallback(base_url)
}
