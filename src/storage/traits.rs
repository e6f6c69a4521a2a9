//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::catalog::BookRecord;
use crate::storage::{FailureRecord, RunRecord, StoreReport};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Book not found: {0}")]
    BookNotFound(u32),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Ingestion sink for finished catalogs
///
/// Inserting an id that is already stored is not an error; the existing row
/// is kept. A record that fails to insert is reported in
/// [`StoreReport::failures`] and does not stop the rest of the batch.
pub trait BookSink {
    /// Stores a batch of records
    ///
    /// # Returns
    ///
    /// * `Ok(StoreReport)` - Per-record outcome
    /// * `Err(StorageError)` - The batch itself could not be started or committed
    fn store(&mut self, records: &[BookRecord]) -> StorageResult<StoreReport>;
}

/// Trait for storage backend implementations
///
/// This trait defines every database operation the CLI and reports need
/// on top of ingestion.
pub trait Storage: BookSink {
    // ===== Run Management =====

    /// Creates a new scrape run
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Marks a run as completed with a finish timestamp and book count
    fn complete_run(&mut self, run_id: i64, books_scraped: u32) -> StorageResult<()>;

    /// Marks a run as failed with a finish timestamp
    fn fail_run(&mut self, run_id: i64) -> StorageResult<()>;

    // ===== Books =====

    /// Gets a book by its catalog id
    fn get_book(&self, id: u32) -> StorageResult<BookRecord>;

    /// Gets all stored books ordered by id
    fn list_books(&self) -> StorageResult<Vec<BookRecord>>;

    /// Counts stored books
    fn count_books(&self) -> StorageResult<u64>;

    // ===== Failure Log =====

    /// Gets logged store failures, oldest first
    fn list_failures(&self) -> StorageResult<Vec<FailureRecord>>;

    /// Counts logged store failures
    fn count_failures(&self) -> StorageResult<u64>;

    // ===== Statistics =====

    /// Book count per category, ordered by category name
    fn category_counts(&self) -> StorageResult<Vec<(String, u64)>>;

    /// Book count per rating value (0-5), ordered by rating
    fn rating_breakdown(&self) -> StorageResult<Vec<(u8, u64)>>;

    /// Mean price over all stored books, `None` when there are none
    fn average_price(&self) -> StorageResult<Option<f64>>;
}
