//! Pagination walker
//!
//! Walks one category's listing pages: fetch, extract, follow the
//! "next" link, until a page has no next link.

use crate::catalog::{CardFailure, RawBookRecord};
use crate::config::MalformedCardPolicy;
use crate::crawler::extractor::{category_label, extract_cards};
use crate::crawler::fetcher::{fetch_document, PageSource};
use crate::crawler::selectors::SiteSelectors;
use crate::url::sibling_url;
use crate::HarvestError;
use scraper::Html;
use url::Url;

/// Everything collected while walking one category
#[derive(Debug, Default)]
pub struct CategoryWalk {
    /// Records in page order, then card order
    pub records: Vec<RawBookRecord>,
    /// Cards dropped under [`MalformedCardPolicy::Skip`]
    pub skipped: Vec<CardFailure>,
    pub pages_fetched: usize,
}

/// Walks the listing pages of categories
pub struct PageWalker<'a, S: PageSource + ?Sized> {
    source: &'a S,
    base_url: &'a Url,
    selectors: &'a SiteSelectors,
    policy: MalformedCardPolicy,
}

impl<'a, S: PageSource + ?Sized> PageWalker<'a, S> {
    pub fn new(
        source: &'a S,
        base_url: &'a Url,
        selectors: &'a SiteSelectors,
        policy: MalformedCardPolicy,
    ) -> Self {
        Self {
            source,
            base_url,
            selectors,
            policy,
        }
    }

    /// Collects every record of a category, starting at its first listing page
    ///
    /// There is no page limit; the walk ends when a page has no next link.
    ///
    /// # Returns
    ///
    /// * `Ok(CategoryWalk)` - All records of the category
    /// * `Err(HarvestError::Fetch)` - A listing page could not be fetched
    /// * `Err(HarvestError::Extraction)` - A malformed card under the abort policy
    pub async fn walk_category(
        &self,
        start_url: &Url,
        category_name: &str,
    ) -> Result<CategoryWalk, HarvestError> {
        let mut walk = CategoryWalk::default();
        let mut current = Some(start_url.clone());

        while let Some(page_url) = current.take() {
            let (outcomes, next_href) = {
                let document = fetch_document(self.source, &page_url).await?;
                (
                    extract_cards(&document, category_name, self.base_url, self.selectors),
                    next_page_href(&document, self.selectors),
                )
            };
            walk.pages_fetched += 1;

            let mut extracted = 0;
            for outcome in outcomes {
                match outcome {
                    Ok(record) => {
                        walk.records.push(record);
                        extracted += 1;
                    }
                    Err(card) => match self.policy {
                        MalformedCardPolicy::Abort => return Err(card.into_error(&page_url)),
                        MalformedCardPolicy::Skip => {
                            tracing::warn!(
                                "Skipping card {} on {}: {}",
                                card.position,
                                page_url,
                                card.reason
                            );
                            walk.skipped.push(CardFailure {
                                category: category_label(category_name),
                                page_url: page_url.to_string(),
                                position: card.position,
                                reason: card.reason,
                            });
                        }
                    },
                }
            }

            tracing::info!(
                "Extracted {} - page {} ({}): {} records",
                category_name,
                walk.pages_fetched,
                page_url,
                extracted
            );

            current = match next_href {
                Some(href) => {
                    let next = next_page_url(&page_url, &href)?;
                    tracing::debug!("Following next page link to {}", next);
                    Some(next)
                }
                None => None,
            };
        }

        Ok(walk)
    }
}

/// The href of the page's "next" link, if any
pub fn next_page_href(document: &Html, selectors: &SiteSelectors) -> Option<String> {
    document
        .select(&selectors.next_page)
        .next()
        .and_then(|link| link.value().attr("href"))
        .map(str::to_string)
}

/// Resolves a next-page href relative to the directory of the current page
pub fn next_page_url(current: &Url, href: &str) -> Result<Url, HarvestError> {
    Ok(sibling_url(current, href)?)
}
