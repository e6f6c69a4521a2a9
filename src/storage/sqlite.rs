//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the storage traits.

use crate::catalog::BookRecord;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{BookSink, Storage, StorageError, StorageResult};
use crate::storage::{FailureRecord, RunRecord, RunStatus, StoreFailure, StoreReport};
use crate::HarvestError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const INSERT_BOOK_SQL: &str = "INSERT OR IGNORE INTO books
    (id, title, price, category, rating, availability, image_url)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";

const INSERT_FAILURE_SQL: &str =
    "INSERT INTO failed_books (title, error, created_at) VALUES (?1, ?2, ?3)";

const SELECT_BOOK_COLUMNS: &str =
    "SELECT id, title, price, rating, availability, category, image_url FROM books";

const SELECT_RUN_COLUMNS: &str =
    "SELECT id, started_at, finished_at, config_hash, status, books_scraped FROM runs";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(HarvestError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, HarvestError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, HarvestError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

/// Rejects values the books table cannot hold meaningfully
fn check_record(record: &BookRecord) -> Result<(), String> {
    if record.title.trim().is_empty() {
        return Err("empty title".to_string());
    }
    if !record.price.is_finite() || record.price < 0.0 {
        return Err(format!("invalid price {}", record.price));
    }
    if record.rating > 5 {
        return Err(format!("rating {} out of range", record.rating));
    }
    Ok(())
}

fn book_from_row(row: &Row<'_>) -> rusqlite::Result<BookRecord> {
    Ok(BookRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        price: row.get(2)?,
        rating: row.get::<_, Option<u8>>(3)?.unwrap_or(0),
        availability: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        category: row.get(5)?,
        image_url: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
    })
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?).unwrap_or(RunStatus::Running),
        books_scraped: row.get(5)?,
    })
}

impl BookSink for SqliteStorage {
    fn store(&mut self, records: &[BookRecord]) -> StorageResult<StoreReport> {
        let tx = self.conn.transaction()?;
        let mut report = StoreReport::default();

        {
            let mut insert_book = tx.prepare(INSERT_BOOK_SQL)?;
            let mut insert_failure = tx.prepare(INSERT_FAILURE_SQL)?;

            for record in records {
                let outcome = check_record(record).and_then(|_| {
                    insert_book
                        .execute(params![
                            record.id,
                            record.title,
                            record.price,
                            record.category,
                            record.rating,
                            record.availability,
                            record.image_url
                        ])
                        .map_err(|e| e.to_string())
                });

                match outcome {
                    Ok(_) => report.saved.push(record.clone()),
                    Err(error) => {
                        tracing::warn!("Failed to store book {} '{}': {}", record.id, record.title, error);
                        insert_failure.execute(params![record.title, error, Utc::now().to_rfc3339()])?;
                        report.failures.push(StoreFailure {
                            record: record.clone(),
                            error,
                        });
                    }
                }
            }
        }

        tx.commit()?;

        tracing::debug!(
            "Stored batch of {}: {} saved, {} failed",
            records.len(),
            report.saved.len(),
            report.failures.len()
        );
        Ok(report)
    }
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_RUN_COLUMNS),
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                &format!("{} ORDER BY id DESC LIMIT 1", SELECT_RUN_COLUMNS),
                [],
                run_from_row,
            )
            .optional()?;

        Ok(run)
    }

    fn complete_run(&mut self, run_id: i64, books_scraped: u32) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, books_scraped = ?3 WHERE id = ?4",
            params![RunStatus::Completed.to_db_string(), now, books_scraped, run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn fail_run(&mut self, run_id: i64) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![RunStatus::Failed.to_db_string(), now, run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    // ===== Books =====

    fn get_book(&self, id: u32) -> StorageResult<BookRecord> {
        self.conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_BOOK_COLUMNS),
                params![id],
                book_from_row,
            )
            .optional()?
            .ok_or(StorageError::BookNotFound(id))
    }

    fn list_books(&self) -> StorageResult<Vec<BookRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} ORDER BY id", SELECT_BOOK_COLUMNS))?;
        let books = stmt
            .query_map([], book_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(books)
    }

    fn count_books(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ===== Failure Log =====

    fn list_failures(&self) -> StorageResult<Vec<FailureRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title, error, created_at FROM failed_books ORDER BY id")?;
        let failures = stmt
            .query_map([], |row| {
                Ok(FailureRecord {
                    id: row.get(0)?,
                    title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    error: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    created_at: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(failures)
    }

    fn count_failures(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM failed_books", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ===== Statistics =====

    fn category_counts(&self) -> StorageResult<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT category, COUNT(*) FROM books GROUP BY category ORDER BY category",
        )?;
        let counts = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get::<_, i64>(1)? as u64)))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(counts)
    }

    fn rating_breakdown(&self) -> StorageResult<Vec<(u8, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT COALESCE(rating, 0) AS r, COUNT(*) FROM books GROUP BY r ORDER BY r",
        )?;
        let breakdown = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get::<_, i64>(1)? as u64)))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(breakdown)
    }

    fn average_price(&self) -> StorageResult<Option<f64>> {
        let average = self
            .conn
            .query_row("SELECT AVG(price) FROM books", [], |row| row.get(0))?;
        Ok(average)
    }
}
