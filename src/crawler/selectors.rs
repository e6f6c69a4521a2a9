//! CSS selectors describing the store's markup
//!
//! Selectors are compiled once per run and shared by the discoverer,
//! the extractor and the pagination walker.

use crate::HarvestError;
use scraper::Selector;

/// Category links inside the nested side navigation list
pub const CATEGORY_LINK: &str = "div.side_categories ul li ul li a";
/// One product card per book
pub const PRODUCT_CARD: &str = "article.product_pod";
/// Heading link carrying the full title in its `title` attribute
pub const TITLE_LINK: &str = "h3 a";
pub const PRICE: &str = ".price_color";
/// Paragraph whose second class is the rating word
pub const RATING: &str = "p.star-rating";
pub const AVAILABILITY: &str = ".instock.availability";
pub const IMAGE: &str = "img";
pub const NEXT_PAGE: &str = "li.next a";

/// Compiled selectors for every element the pipeline reads
#[derive(Debug, Clone)]
pub struct SiteSelectors {
    pub category_link: Selector,
    pub product_card: Selector,
    pub title_link: Selector,
    pub price: Selector,
    pub rating: Selector,
    pub availability: Selector,
    pub image: Selector,
    pub next_page: Selector,
}

impl SiteSelectors {
    /// Compiles the selectors for the store layout
    pub fn new() -> Result<Self, HarvestError> {
        Ok(Self {
            category_link: compile(CATEGORY_LINK)?,
            product_card: compile(PRODUCT_CARD)?,
            title_link: compile(TITLE_LINK)?,
            price: compile(PRICE)?,
            rating: compile(RATING)?,
            availability: compile(AVAILABILITY)?,
            image: compile(IMAGE)?,
            next_page: compile(NEXT_PAGE)?,
        })
    }
}

/// Compiles one selector, keeping the offending text in the error
fn compile(css: &str) -> Result<Selector, HarvestError> {
    Selector::parse(css).map_err(|e| HarvestError::Selector {
        selector: css.to_string(),
        message: format!("{:?}", e),
    })
}
