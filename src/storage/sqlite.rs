//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the storage traits.

use crate::product::{PersistedProduct, ProductRecord};
use crate::storage::reconcile::reconcile;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{
    PriceSummary, ProductFilter, ProductSession, ProductStore, StorageResult,
};
use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

const PRODUCT_COLUMNS: &str =
    "id, title, price, category, rating, image_url, created_at, updated_at";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (or creates) a database file and ensures the schema exists
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        // The API and background crawls hold separate connections
        conn.busy_timeout(Duration::from_secs(5))?;
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

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn row_to_product(row: &Row<'_>) -> rusqlite::Result<PersistedProduct> {
    Ok(PersistedProduct {
        id: row.get(0)?,
        title: row.get(1)?,
        price: row.get(2)?,
        category: row.get(3)?,
        rating: row.get(4)?,
        image_url: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// Escapes LIKE wildcards so user input matches literally
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

// A transaction derefs to its connection, so the reconciler runs against
// `&*tx` and inherits the transaction's scope.
impl ProductSession for Connection {
    fn find_by_title(&self, title: &str) -> StorageResult<Option<PersistedProduct>> {
        let product = self
            .query_row(
                &format!("SELECT {} FROM products WHERE title = ?1", PRODUCT_COLUMNS),
                params![title],
                row_to_product,
            )
            .optional()?;
        Ok(product)
    }

    fn insert_product(&self, record: &ProductRecord, now: &str) -> StorageResult<i64> {
        self.execute(
            "INSERT INTO products (title, price, category, rating, image_url, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.title,
                record.price,
                record.category,
                record.rating,
                record.image_url,
                now
            ],
        )?;
        Ok(self.last_insert_rowid())
    }

    fn update_product(&self, product: &PersistedProduct) -> StorageResult<()> {
        self.execute(
            "UPDATE products SET price = ?1, category = ?2, rating = ?3, image_url = ?4,
             updated_at = ?5 WHERE id = ?6",
            params![
                product.price,
                product.category,
                product.rating,
                product.image_url,
                product.updated_at,
                product.id
            ],
        )?;
        Ok(())
    }
}

impl ProductStore for SqliteStorage {
    // ===== Reconciliation =====

    fn save_products(&mut self, records: &[ProductRecord]) -> StorageResult<usize> {
        let now = Utc::now().to_rfc3339();

        // Dropping the transaction on any early return rolls it back
        let tx = self.conn.transaction()?;
        let outcome = reconcile(&*tx, records, &now)?;
        tx.commit()?;

        tracing::info!(
            "Saved {} products ({} new, {} updated)",
            outcome.processed(),
            outcome.created,
            outcome.updated
        );
        Ok(outcome.processed())
    }

    // ===== Queries =====

    fn get_product(&self, id: i64) -> StorageResult<Option<PersistedProduct>> {
        let product = self
            .conn
            .query_row(
                &format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS),
                params![id],
                row_to_product,
            )
            .optional()?;
        Ok(product)
    }

    fn get_product_by_title(&self, title: &str) -> StorageResult<Option<PersistedProduct>> {
        self.conn.find_by_title(title)
    }

    fn query_products(&self, filter: &ProductFilter) -> StorageResult<Vec<PersistedProduct>> {
        let mut clauses: Vec<String> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(min_price) = filter.min_price {
            values.push(Value::Real(min_price));
            clauses.push(format!("price >= ?{}", values.len()));
        }
        if let Some(max_price) = filter.max_price {
            values.push(Value::Real(max_price));
            clauses.push(format!("price <= ?{}", values.len()));
        }
        if let Some(name) = filter.name.as_deref().filter(|n| !n.is_empty()) {
            values.push(Value::Text(like_pattern(name)));
            clauses.push(format!("title LIKE ?{} ESCAPE '\\'", values.len()));
        }
        if let Some(category) = filter.category.as_deref().filter(|c| !c.is_empty()) {
            values.push(Value::Text(category.to_string()));
            clauses.push(format!("category = ?{}", values.len()));
        }
        if let Some(min_rating) = filter.min_rating {
            values.push(Value::Real(min_rating));
            clauses.push(format!("rating >= ?{}", values.len()));
        }

        let mut sql = format!("SELECT {} FROM products", PRODUCT_COLUMNS);
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        values.push(Value::Integer(i64::from(filter.limit)));
        let limit_idx = values.len();
        values.push(Value::Integer(i64::from(filter.skip)));
        let offset_idx = values.len();
        sql.push_str(&format!(
            " ORDER BY id LIMIT ?{} OFFSET ?{}",
            limit_idx, offset_idx
        ));

        let mut stmt = self.conn.prepare(&sql)?;
        let products = stmt
            .query_map(params_from_iter(values.iter()), row_to_product)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(products)
    }

    fn list_categories(&self) -> StorageResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT category FROM products ORDER BY category")?;
        let categories = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    fn delete_all_products(&mut self) -> StorageResult<usize> {
        let deleted = self.conn.execute("DELETE FROM products", [])?;
        Ok(deleted)
    }

    // ===== Statistics =====

    fn count_products(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn price_summary(&self) -> StorageResult<PriceSummary> {
        let summary = self.conn.query_row(
            "SELECT AVG(price), MIN(price), MAX(price) FROM products",
            [],
            |row| {
                Ok(PriceSummary {
                    average: row.get::<_, Option<f64>>(0)?.unwrap_or(0.0),
                    min: row.get::<_, Option<f64>>(1)?.unwrap_or(0.0),
                    max: row.get::<_, Option<f64>>(2)?.unwrap_or(0.0),
                })
            },
        )?;
        Ok(summary)
    }

    fn rating_distribution(&self) -> StorageResult<BTreeMap<u8, u64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT rating, COUNT(*) FROM products GROUP BY rating")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, u8>(0)?, row.get::<_, i64>(1)? as u64))
        })?;

        let mut distribution = BTreeMap::new();
        for row in rows {
            let (rating, count) = row?;
            distribution.insert(rating, count);
        }
        Ok(distribution)
    }

    fn category_counts(&self) -> StorageResult<BTreeMap<String, u64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT category, COUNT(*) FROM products GROUP BY category")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
        })?;

        let mut counts = BTreeMap::new();
        for row in rows {
            let (category, count) = row?;
            counts.insert(category, count);
        }
        Ok(counts)
    }
}
