//! Storage traits and error types
//!
//! This module defines the trait interfaces for storage backends and
//! associated error types.

use crate::product::{PersistedProduct, ProductRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Optional filters for product queries
///
/// Unset fields do not constrain the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductFilter {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Case-insensitive substring of the title
    pub name: Option<String>,
    /// Exact category
    pub category: Option<String>,
    pub min_rating: Option<f64>,
    pub skip: u32,
    pub limit: u32,
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            min_price: None,
            max_price: None,
            name: None,
            category: None,
            min_rating: None,
            skip: 0,
            limit: 100,
        }
    }
}

/// Aggregate price figures; all zero when the store is empty
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSummary {
    pub average: f64,
    pub min: f64,
    pub max: f64,
}

/// A unit of work over the products table
///
/// The reconciler only needs these three operations; implementations decide
/// how they map onto a transaction.
pub trait ProductSession {
    /// Looks up a product by exact title
    fn find_by_title(&self, title: &str) -> StorageResult<Option<PersistedProduct>>;

    /// Inserts a new product and returns its generated ID
    fn insert_product(&self, record: &ProductRecord, now: &str) -> StorageResult<i64>;

    /// Writes every mutable field of an existing product
    fn update_product(&self, product: &PersistedProduct) -> StorageResult<()>;
}

/// Trait for product store implementations
pub trait ProductStore {
    // ===== Reconciliation =====

    /// Upserts a batch of records by title inside one transaction
    ///
    /// Either every record is applied or none is.
    ///
    /// # Returns
    ///
    /// The number of records processed
    fn save_products(&mut self, records: &[ProductRecord]) -> StorageResult<usize>;

    // ===== Queries =====

    /// Gets a product by ID
    fn get_product(&self, id: i64) -> StorageResult<Option<PersistedProduct>>;

    /// Gets a product by title
    fn get_product_by_title(&self, title: &str) -> StorageResult<Option<PersistedProduct>>;

    /// Lists products matching the filter, ordered by ID
    fn query_products(&self, filter: &ProductFilter) -> StorageResult<Vec<PersistedProduct>>;

    /// Lists distinct categories
    fn list_categories(&self) -> StorageResult<Vec<String>>;

    /// Deletes every product
    ///
    /// # Returns
    ///
    /// The number of deleted rows
    fn delete_all_products(&mut self) -> StorageResult<usize>;

    // ===== Statistics =====

    /// Gets total product count
    fn count_products(&self) -> StorageResult<u64>;

    /// Gets average/min/max price
    fn price_summary(&self) -> StorageResult<PriceSummary>;

    /// Gets product count per rating
    fn rating_distribution(&self) -> StorageResult<BTreeMap<u8, u64>>;

    /// Gets product count per category
    fn category_counts(&self) -> StorageResult<BTreeMap<String, u64>>;
}
