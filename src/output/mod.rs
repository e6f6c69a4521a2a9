//! Output module for catalog reports and exports
//!
//! This module handles:
//! - Catalog statistics loaded from the database
//! - Exporting the catalog as JSON

mod json;
pub mod stats;

pub use json::{format_catalog_json, write_catalog_json};
pub use stats::{format_statistics, load_statistics, print_statistics, CatalogStatistics};
