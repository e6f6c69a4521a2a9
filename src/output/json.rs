//! JSON catalog export
//!
//! Writes the catalog as a JSON array of book objects with the fields
//! `id`, `title`, `price`, `rating`, `availability`, `category` and `image_url`.

use crate::catalog::BookRecord;
use crate::HarvestError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes the catalog to `output_path` as pretty-printed JSON
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the catalog
/// * `Err(HarvestError)` - The file could not be created or written
pub fn write_catalog_json(books: &[BookRecord], output_path: &Path) -> Result<(), HarvestError> {
    let mut writer = BufWriter::new(File::create(output_path)?);
    serde_json::to_writer_pretty(&mut writer, books)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    tracing::info!("Wrote {} books to {}", books.len(), output_path.display());
    Ok(())
}

/// Formats the catalog as a JSON string
pub fn format_catalog_json(books: &[BookRecord]) -> Result<String, HarvestError> {
    Ok(serde_json::to_string_pretty(books)?)
}
