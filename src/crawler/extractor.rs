//! Record extraction from listing pages
//!
//! This module turns the product cards of one listing page into
//! [`RawBookRecord`]s:
//! - title from the heading link's `title` attribute
//! - price from the price display text
//! - rating from the star-rating class word
//! - availability from the stock status text
//! - image URL from the card image, resolved against the site base URL
//!
//! Records come back in document order. Ids are assigned later by the
//! coordinator.

use crate::catalog::{clean_text, parse_price, rating_from_token, RawBookRecord, UNKNOWN_CATEGORY};
use crate::crawler::selectors::SiteSelectors;
use crate::url::resolve_image_url;
use crate::HarvestError;
use scraper::{ElementRef, Html};
use url::Url;

/// A product card whose required fields could not be read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedCard {
    /// Zero-based position of the card on its page
    pub position: usize,
    pub reason: String,
}

impl MalformedCard {
    /// Converts the card failure into the run-aborting extraction error
    pub fn into_error(self, page_url: &Url) -> HarvestError {
        HarvestError::Extraction {
            url: page_url.to_string(),
            message: format!("card {}: {}", self.position, self.reason),
        }
    }
}

/// Extracts every card on the page, failing on the first malformed one
///
/// # Arguments
///
/// * `document` - The parsed listing page
/// * `page_url` - The listing page URL, used in error messages
/// * `category_name` - The category being walked
/// * `base_url` - Site root for image resolution
/// * `selectors` - Compiled site selectors
pub fn extract_page(
    document: &Html,
    page_url: &Url,
    category_name: &str,
    base_url: &Url,
    selectors: &SiteSelectors,
) -> Result<Vec<RawBookRecord>, HarvestError> {
    extract_cards(document, category_name, base_url, selectors)
        .into_iter()
        .map(|card| card.map_err(|malformed| malformed.into_error(page_url)))
        .collect()
}

/// Extracts every card on the page, keeping a per-card outcome
///
/// Used when malformed cards are skipped instead of aborting the run.
pub fn extract_cards(
    document: &Html,
    category_name: &str,
    base_url: &Url,
    selectors: &SiteSelectors,
) -> Vec<Result<RawBookRecord, MalformedCard>> {
    let category = category_label(category_name);

    document
        .select(&selectors.product_card)
        .enumerate()
        .map(|(position, card)| {
            extract_card(card, &category, base_url, selectors)
                .map_err(|reason| MalformedCard { position, reason })
        })
        .collect()
}

/// Normalized category name, or `Unknown` when nothing is left
pub fn category_label(category_name: &str) -> String {
    let cleaned = clean_text(category_name);
    if cleaned.is_empty() {
        UNKNOWN_CATEGORY.to_string()
    } else {
        cleaned
    }
}

/// Reads one product card
fn extract_card(
    card: ElementRef<'_>,
    category: &str,
    base_url: &Url,
    selectors: &SiteSelectors,
) -> Result<RawBookRecord, String> {
    let title = card
        .select(&selectors.title_link)
        .next()
        .and_then(|link| link.value().attr("title"))
        .map(clean_text)
        .ok_or_else(|| "missing title".to_string())?;

    let price_text = first_text(card, &selectors.price).ok_or_else(|| "missing price".to_string())?;
    let price =
        parse_price(&price_text).ok_or_else(|| format!("unparseable price '{}'", price_text.trim()))?;

    let rating = extract_rating(card, selectors);

    let availability = first_text(card, &selectors.availability)
        .map(|text| clean_text(&text))
        .ok_or_else(|| "missing availability".to_string())?;

    let image_src = card
        .select(&selectors.image)
        .next()
        .and_then(|img| img.value().attr("src"))
        .ok_or_else(|| "missing image".to_string())?;
    let image_url = resolve_image_url(base_url, image_src)
        .map_err(|e| format!("bad image path '{}': {}", image_src, e))?;

    Ok(RawBookRecord {
        title,
        price,
        rating,
        availability,
        category: category.to_string(),
        image_url: image_url.to_string(),
    })
}

/// Rating from the class token right after `star-rating`; 0 when absent or unknown
fn extract_rating(card: ElementRef<'_>, selectors: &SiteSelectors) -> u8 {
    card.select(&selectors.rating)
        .next()
        .and_then(|p| p.value().attr("class"))
        .and_then(|classes| {
            classes
                .split_whitespace()
                .skip_while(|class| *class != "star-rating")
                .nth(1)
        })
        .map(rating_from_token)
        .unwrap_or(0)
}

/// Concatenated text of the first element matching `selector`
fn first_text(card: ElementRef<'_>, selector: &scraper::Selector) -> Option<String> {
    card.select(selector)
        .next()
        .map(|element| element.text().collect::<String>())
}
