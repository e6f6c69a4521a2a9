//! Storage module for persisting scraped catalogs
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Insert-or-ignore ingestion of book records with per-record failure isolation
//! - Failure logging for records that could not be stored
//! - Run tracking

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{BookSink, Storage, StorageError, StorageResult};

use crate::catalog::BookRecord;
use crate::HarvestError;

use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(HarvestError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> Result<SqliteStorage, HarvestError> {
    SqliteStorage::new(path)
}

/// Stores a scraped catalog and closes its run
///
/// The run is marked completed with the catalog size once the batch is
/// committed. If storing or completing fails, the run is marked failed
/// before the error is returned, so it never stays `running`.
pub fn finish_run<S: Storage + ?Sized>(
    storage: &mut S,
    run_id: i64,
    books: &[BookRecord],
) -> Result<StoreReport, HarvestError> {
    let outcome = storage
        .store(books)
        .and_then(|report| storage.complete_run(run_id, books.len() as u32).map(|_| report));

    match outcome {
        Ok(report) => Ok(report),
        Err(e) => {
            tracing::error!("Storing catalog for run {} failed: {}", run_id, e);
            if let Err(mark_err) = storage.fail_run(run_id) {
                tracing::error!("Could not mark run {} as failed: {}", run_id, mark_err);
            }
            Err(e.into())
        }
    }
}

/// Outcome of handing a batch of records to a sink
#[derive(Debug, Clone, Default)]
pub struct StoreReport {
    /// Records whose insert succeeded, including ids that were already present
    pub saved: Vec<BookRecord>,
    /// Records that could not be stored, each with its error
    pub failures: Vec<StoreFailure>,
}

impl StoreReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A record the sink rejected
#[derive(Debug, Clone)]
pub struct StoreFailure {
    pub record: BookRecord,
    pub error: String,
}

/// A row of the failure log
#[derive(Debug, Clone)]
pub struct FailureRecord {
    pub id: i64,
    pub title: String,
    pub error: String,
    pub created_at: String,
}

/// Represents a scrape run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    /// Set when the run completes
    pub books_scraped: Option<u32>,
}

/// Status of a scrape run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
