//! Storage module for persisting products
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Title-keyed reconciliation of scraped batches
//! - Filtered product queries and catalog statistics

mod reconcile;
mod schema;
mod sqlite;
mod traits;

pub use reconcile::{reconcile, ReconcileOutcome};
pub use schema::initialize_schema;
pub use sqlite::SqliteStorage;
pub use traits::{
    PriceSummary, ProductFilter, ProductSession, ProductStore, StorageError, StorageResult,
};

use std::path::Path;

/// Initializes or opens a storage database
///
/// Missing parent directories are created first.
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(StorageError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    SqliteStorage::new(path)
}
