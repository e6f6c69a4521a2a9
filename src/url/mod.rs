//! URL handling module for Catalog-Sweep
//!
//! This module resolves the relative links found in listing markup:
//! category hrefs and image paths against the site base URL, and
//! "next page" hrefs against the directory of the current page.

mod resolve;

// Re-export main functions
pub use resolve::{resolve_href, resolve_image_url, sibling_url};
