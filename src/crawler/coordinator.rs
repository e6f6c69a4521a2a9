//! Catalog coordinator - main scrape orchestration logic
//!
//! This module drives one complete scrape run:
//! - Discovering the category index once from the site root
//! - Walking every category's listing pages in index order
//! - Assigning ids from a single per-run sequence
//!
//! Everything happens sequentially. Ids are derived from traversal order
//! (category, then page, then card), so two runs over the same pages
//! produce identical catalogs.

use crate::catalog::{BookRecord, CardFailure, CategoryIndex, IdSequence};
use crate::config::{Config, MalformedCardPolicy};
use crate::crawler::categories::discover_categories;
use crate::crawler::fetcher::{HttpFetcher, PageSource};
use crate::crawler::paginator::PageWalker;
use crate::crawler::selectors::SiteSelectors;
use crate::HarvestError;
use url::Url;

/// Result of a complete scrape run
#[derive(Debug)]
pub struct CatalogRun {
    /// The catalog, ids 1..=N in traversal order
    pub books: Vec<BookRecord>,
    /// Cards dropped under the skip policy; always empty under abort
    pub skipped: Vec<CardFailure>,
    pub categories: CategoryIndex,
    pub pages_fetched: usize,
}

/// Main scrape coordinator structure
pub struct Coordinator<S: PageSource> {
    source: S,
    base_url: Url,
    selectors: SiteSelectors,
    policy: MalformedCardPolicy,
}

impl Coordinator<HttpFetcher> {
    /// Creates an HTTP-backed coordinator from the run configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to scrape
    /// * `Err(HarvestError)` - Invalid base URL or HTTP client setup failure
    pub fn from_config(config: &Config) -> Result<Self, HarvestError> {
        let base_url = config.base_url()?;
        let fetcher = HttpFetcher::new(&config.user_agent, &config.fetcher).map_err(|source| {
            HarvestError::Fetch {
                url: base_url.to_string(),
                source,
            }
        })?;

        Self::new(fetcher, base_url, config.extraction.malformed_card)
    }
}

impl<S: PageSource> Coordinator<S> {
    /// Creates a coordinator over any page source
    ///
    /// # Arguments
    ///
    /// * `source` - Where pages come from
    /// * `base_url` - The site root; category links and image paths resolve against it
    /// * `policy` - What to do with a product card that cannot be read
    pub fn new(source: S, base_url: Url, policy: MalformedCardPolicy) -> Result<Self, HarvestError> {
        Ok(Self {
            source,
            base_url,
            selectors: SiteSelectors::new()?,
            policy,
        })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Runs a complete scrape
    ///
    /// 1. Discover categories from the site root (falls back to `Unknown`)
    /// 2. Walk each category's pages in index order
    /// 3. Number records as they arrive, starting at 1
    ///
    /// The first fetch failure aborts the run; no partial catalog is returned.
    pub async fn run(&self) -> Result<CatalogRun, HarvestError> {
        tracing::info!("Starting catalog scrape of {}", self.base_url);
        let start_time = std::time::Instant::now();

        let categories = discover_categories(&self.source, &self.base_url, &self.selectors).await?;
        let walker = PageWalker::new(&self.source, &self.base_url, &self.selectors, self.policy);

        let mut ids = IdSequence::new();
        let mut books = Vec::new();
        let mut skipped = Vec::new();
        // The site root counts as the first page
        let mut pages_fetched = 1;

        for category in &categories {
            tracing::info!("Scraping category {} ({})", category.name, category.url);

            let walk = walker.walk_category(&category.url, &category.name).await?;
            pages_fetched += walk.pages_fetched;
            skipped.extend(walk.skipped);
            books.extend(walk.records.into_iter().map(|raw| ids.assign(raw)));
        }

        tracing::info!(
            "Scrape completed: {} books from {} categories, {} pages in {:?}",
            ids.issued(),
            categories.len(),
            pages_fetched,
            start_time.elapsed()
        );
        if !skipped.is_empty() {
            tracing::warn!("{} malformed cards were skipped", skipped.len());
        }

        Ok(CatalogRun {
            books,
            skipped,
            categories,
            pages_fetched,
        })
    }

    /// Scrapes the whole catalog and returns the numbered records
    pub async fn scrape_catalog(&self) -> Result<Vec<BookRecord>, HarvestError> {
        Ok(self.run().await?.books)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::UNKNOWN_CATEGORY;
    use crate::FetchError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const ROOT: &str = "https://books.example/";

    struct StaticSite {
        pages: HashMap<String, String>,
        hits: Mutex<usize>,
    }

    impl StaticSite {
        fn new(pages: Vec<(String, String)>) -> Self {
            Self {
                pages: pages.into_iter().collect(),
                hits: Mutex::new(0),
            }
        }

        fn hits(&self) -> usize {
            *self.hits.lock().unwrap()
        }
    }

    #[async_trait]
    impl PageSource for StaticSite {
        async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
            *self.hits.lock().unwrap() += 1;
            self.pages
                .get(url.as_str())
                .cloned()
                .ok_or(FetchError::Status { status: 404 })
        }
    }

    fn book(title: &str, price: &str) -> String {
        format!(
            r#"<article class="product_pod">
                <div class="image_container"><img src="../../../../media/cache/{title}.jpg"></div>
                <p class="star-rating Four"></p>
                <h3><a href="../../../{title}/index.html" title="{title}">{title}</a></h3>
                <div class="product_price">
                  <p class="price_color">{price}</p>
                  <p class="instock availability">In stock</p>
                </div>
            </article>"#
        )
    }

    fn listing(books: &[String], next: Option<&str>) -> String {
        let pager = next
            .map(|href| format!(r#"<li class="next"><a href="{href}">next</a></li>"#))
            .unwrap_or_default();
        format!("<html><body><ol>{}</ol><ul class=\"pager\">{}</ul></body></html>", books.concat(), pager)
    }

    fn root_page() -> String {
        r#"<html><body><div class="side_categories"><ul><li>
             <a href="catalogue/category/books_1/index.html">Books</a>
             <ul>
               <li><a href="catalogue/category/books/travel_2/index.html">Travel</a></li>
               <li><a href="catalogue/category/books/mystery_3/index.html">Mystery</a></li>
             </ul>
           </li></ul></div></body></html>"#
            .to_string()
    }

    /// Travel: one page with two cards. Mystery: two pages with two and one cards.
    fn two_category_site() -> StaticSite {
        let travel = format!("{}catalogue/category/books/travel_2/", ROOT);
        let mystery = format!("{}catalogue/category/books/mystery_3/", ROOT);

        StaticSite::new(vec![
            (ROOT.to_string(), root_page()),
            (
                format!("{}index.html", travel),
                listing(&[book("t1", "£10.00"), book("t2", "£20.00")], None),
            ),
            (
                format!("{}index.html", mystery),
                listing(&[book("m1", "£1.50"), book("m2", "£2.50")], Some("page-2.html")),
            ),
            (
                format!("{}page-2.html", mystery),
                listing(&[book("m3", "£3.50")], None),
            ),
        ])
    }

    fn coordinator<S: PageSource>(site: S, policy: MalformedCardPolicy) -> Coordinator<S> {
        Coordinator::new(site, Url::parse(ROOT).unwrap(), policy).unwrap()
    }

    #[tokio::test]
    async fn test_ids_follow_traversal_order() {
        let coordinator = coordinator(two_category_site(), MalformedCardPolicy::Abort);

        let books = coordinator.scrape_catalog().await.unwrap();

        let summary: Vec<_> = books
            .iter()
            .map(|b| (b.id, b.title.as_str(), b.category.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (1, "t1", "Travel"),
                (2, "t2", "Travel"),
                (3, "m1", "Mystery"),
                (4, "m2", "Mystery"),
                (5, "m3", "Mystery"),
            ]
        );
        assert_eq!(books[4].price, 3.5);
        assert_eq!(books[4].rating, 4);
        assert_eq!(books[0].image_url, "https://books.example/media/cache/t1.jpg");
        // root + travel + two mystery pages
        assert_eq!(coordinator.source().hits(), 4);
    }

    #[tokio::test]
    async fn test_repeated_runs_are_identical() {
        let coordinator = coordinator(two_category_site(), MalformedCardPolicy::Abort);

        let first = coordinator.scrape_catalog().await.unwrap();
        let second = coordinator.scrape_catalog().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(second[0].id, 1);
    }

    #[tokio::test]
    async fn test_run_reports_categories_and_pages() {
        let coordinator = coordinator(two_category_site(), MalformedCardPolicy::Abort);

        let run = coordinator.run().await.unwrap();

        assert_eq!(run.categories.names(), vec!["Travel", "Mystery"]);
        assert_eq!(run.pages_fetched, 4);
        assert!(run.skipped.is_empty());
    }

    #[tokio::test]
    async fn test_site_without_navigation_is_one_unknown_category() {
        let site = StaticSite::new(vec![(
            ROOT.to_string(),
            listing(&[book("a", "£5"), book("b", "£6")], None),
        )]);
        let coordinator = coordinator(site, MalformedCardPolicy::Abort);

        let books = coordinator.scrape_catalog().await.unwrap();

        assert_eq!(books.len(), 2);
        assert!(books.iter().all(|b| b.category == UNKNOWN_CATEGORY));
        assert_eq!(books[1].id, 2);
    }

    #[tokio::test]
    async fn test_unreachable_page_aborts_run() {
        let mut site = two_category_site();
        site.pages
            .remove(&format!("{}catalogue/category/books/mystery_3/page-2.html", ROOT));
        let coordinator = coordinator(site, MalformedCardPolicy::Abort);

        let err = coordinator.scrape_catalog().await.unwrap_err();
        assert!(matches!(
            err,
            HarvestError::Fetch {
                source: FetchError::Status { status: 404 },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_skipped_cards_leave_ids_contiguous() {
        let mut site = two_category_site();
        let broken = book("broken", "£9.99").replace(r#"<p class="price_color">£9.99</p>"#, "");
        site.pages.insert(
            format!("{}catalogue/category/books/travel_2/index.html", ROOT),
            listing(&[book("t1", "£10.00"), broken, book("t2", "£20.00")], None),
        );

        let strict = coordinator(site, MalformedCardPolicy::Abort);
        assert!(matches!(
            strict.scrape_catalog().await,
            Err(HarvestError::Extraction { .. })
        ));

        let lenient = Coordinator::new(
            strict.source,
            Url::parse(ROOT).unwrap(),
            MalformedCardPolicy::Skip,
        )
        .unwrap();
        let run = lenient.run().await.unwrap();

        let ids: Vec<_> = run.books.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(run.books[1].title, "t2");
        assert_eq!(run.skipped.len(), 1);
        assert_eq!(run.skipped[0].category, "Travel");
        assert_eq!(run.skipped[0].position, 1);
    }
}
