//! Statistics generation from the catalog database
//!
//! This module provides functionality for extracting and displaying
//! catalog statistics from the storage layer.

use crate::catalog::RATING_VOCABULARY;
use crate::storage::{RunRecord, Storage};
use crate::HarvestError;

/// Catalog statistics summary
#[derive(Debug, Clone, Default)]
pub struct CatalogStatistics {
    /// Number of stored books
    pub total_books: u64,

    /// Book count per category, by category name
    pub categories: Vec<(String, u64)>,

    /// Book count per rating (0 = unrated)
    pub rating_breakdown: Vec<(u8, u64)>,

    /// Mean price, absent for an empty catalog
    pub average_price: Option<f64>,

    /// Entries in the failure log
    pub failed_books: u64,

    /// The most recent scrape run, if any
    pub latest_run: Option<RunRecord>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(CatalogStatistics)` - Successfully loaded statistics
/// * `Err(HarvestError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage) -> Result<CatalogStatistics, HarvestError> {
    Ok(CatalogStatistics {
        total_books: storage.count_books()?,
        categories: storage.category_counts()?,
        rating_breakdown: storage.rating_breakdown()?,
        average_price: storage.average_price()?,
        failed_books: storage.count_failures()?,
        latest_run: storage.get_latest_run()?,
    })
}

/// Display label for a rating value
fn rating_label(rating: u8) -> &'static str {
    RATING_VOCABULARY
        .iter()
        .find(|(_, value)| *value == rating)
        .map(|(word, _)| *word)
        .unwrap_or("Unrated")
}

/// Formats statistics as a plain-text report
pub fn format_statistics(stats: &CatalogStatistics) -> String {
    let mut out = String::new();

    out.push_str("=== Catalog Statistics ===\n\n");

    out.push_str("Overview:\n");
    out.push_str(&format!("  Total books: {}\n", stats.total_books));
    out.push_str(&format!("  Categories: {}\n", stats.categories.len()));
    match stats.average_price {
        Some(price) => out.push_str(&format!("  Average price: {:.2}\n", price)),
        None => out.push_str("  Average price: n/a\n"),
    }
    out.push_str(&format!("  Failed records: {}\n\n", stats.failed_books));

    if let Some(run) = &stats.latest_run {
        out.push_str("Latest Run:\n");
        out.push_str(&format!("  Run {} ({})\n", run.id, run.status.to_db_string()));
        out.push_str(&format!("  Started: {}\n", run.started_at));
        if let Some(finished) = &run.finished_at {
            out.push_str(&format!("  Finished: {}\n", finished));
        }
        if let Some(books) = run.books_scraped {
            out.push_str(&format!("  Books scraped: {}\n", books));
        }
        out.push('\n');
    }

    if !stats.categories.is_empty() {
        out.push_str("Books by Category:\n");
        for (category, count) in &stats.categories {
            out.push_str(&format!("  {}: {}\n", category, count));
        }
        out.push('\n');
    }

    if !stats.rating_breakdown.is_empty() {
        out.push_str("Books by Rating:\n");
        for (rating, count) in &stats.rating_breakdown {
            let percentage = if stats.total_books > 0 {
                (*count as f64 / stats.total_books as f64) * 100.0
            } else {
                0.0
            };
            out.push_str(&format!(
                "  {} ({}): {} ({:.1}%)\n",
                rating_label(*rating),
                rating,
                count,
                percentage
            ));
        }
    }

    out
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CatalogStatistics) {
    print!("{}", format_statistics(stats));
}
