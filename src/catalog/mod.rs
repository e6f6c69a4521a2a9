//! Catalog domain types
//!
//! This module holds the records produced by a scrape run:
//! - `RawBookRecord` - one product card, before an id is assigned
//! - `BookRecord` - a finished, immutable catalog entry
//! - `CategoryIndex` - the ordered category name -> listing URL mapping
//! - `IdSequence` - the per-run id counter

mod text;

pub use text::{clean_text, parse_price, rating_from_token, RATING_VOCABULARY};

use serde::{Deserialize, Serialize};
use url::Url;

/// Category name used when the supplied name is empty or no taxonomy exists
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// A book extracted from a listing page, before id assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBookRecord {
    pub title: String,
    pub price: f64,
    /// 1-5, or 0 when the rating token is missing or unrecognized
    pub rating: u8,
    pub availability: String,
    pub category: String,
    /// Absolute image URL
    pub image_url: String,
}

/// A catalog entry with its run-unique id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: u32,
    pub title: String,
    pub price: f64,
    pub rating: u8,
    pub availability: String,
    pub category: String,
    pub image_url: String,
}

impl BookRecord {
    /// Attaches an id to a raw record
    pub fn from_raw(id: u32, raw: RawBookRecord) -> Self {
        Self {
            id,
            title: raw.title,
            price: raw.price,
            rating: raw.rating,
            availability: raw.availability,
            category: raw.category,
            image_url: raw.image_url,
        }
    }
}

/// A product card dropped under the skip policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardFailure {
    pub category: String,
    pub page_url: String,
    /// Zero-based position of the card on its page
    pub position: usize,
    pub reason: String,
}

/// Hands out ids 1, 2, 3, ... in the order records are received
///
/// One sequence lives for exactly one orchestration call; a new run starts
/// again at 1.
#[derive(Debug)]
pub struct IdSequence {
    next: u32,
}

impl IdSequence {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Consumes a raw record and returns it with the next id
    pub fn assign(&mut self, raw: RawBookRecord) -> BookRecord {
        let record = BookRecord::from_raw(self.next, raw);
        self.next += 1;
        record
    }

    /// Number of ids handed out so far
    pub fn issued(&self) -> u32 {
        self.next - 1
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::new()
    }
}

/// A category discovered in the site navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    /// First listing page of the category
    pub url: Url,
}

/// Ordered mapping of category name to its first listing page
///
/// Insertion order follows the navigation markup and drives global id order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryIndex {
    entries: Vec<Category>,
}

impl CategoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a category, or replaces the URL of an existing name in place
    pub fn insert(&mut self, name: impl Into<String>, url: Url) {
        let name = name.into();
        match self.entries.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.url = url,
            None => self.entries.push(Category { name, url }),
        }
    }

    /// Replaces an empty index with the synthetic `Unknown -> site root` entry
    pub fn or_fallback(mut self, site_root: &Url) -> Self {
        if self.entries.is_empty() {
            self.insert(UNKNOWN_CATEGORY, site_root.clone());
        }
        self
    }

    #[cfg(test)]
    pub(crate) fn get(&self, name: &str) -> Option<&Url> {
        self.entries.iter().find(|c| c.name == name).map(|c| &c.url)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.entries.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a CategoryIndex {
    type Item = &'a Category;
    type IntoIter = std::slice::Iter<'a, Category>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
