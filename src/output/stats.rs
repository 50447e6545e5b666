//! Statistics generation from the product database
//!
//! This module provides functionality for extracting and displaying
//! catalog statistics from the storage layer.

use crate::storage::{PriceSummary, ProductStore, StorageResult};
use serde::Serialize;
use std::collections::BTreeMap;

/// Catalog statistics summary
///
/// Serializes to the JSON body served by `GET /stats/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogStatistics {
    /// Number of stored products
    pub total_products: u64,

    /// Average, minimum and maximum price
    pub price_stats: PriceSummary,

    /// Product count keyed by star rating
    pub rating_distribution: BTreeMap<u8, u64>,

    /// Product count keyed by category
    pub categories: BTreeMap<String, u64>,
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
/// * `Err(StorageError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn ProductStore) -> StorageResult<CatalogStatistics> {
    Ok(CatalogStatistics {
        total_products: storage.count_products()?,
        price_stats: storage.price_summary()?,
        rating_distribution: storage.rating_distribution()?,
        categories: storage.category_counts()?,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CatalogStatistics) {
    println!("=== Catalog Statistics ===\n");

    println!("Overview:");
    println!("  Total products: {}", stats.total_products);
    println!();

    println!("Prices:");
    println!("  Average: {:.2}", stats.price_stats.average);
    println!("  Min: {:.2}", stats.price_stats.min);
    println!("  Max: {:.2}", stats.price_stats.max);
    println!();

    if !stats.rating_distribution.is_empty() {
        println!("Ratings:");
        for (rating, count) in stats.rating_distribution.iter().rev() {
            let percentage = if stats.total_products > 0 {
                (*count as f64 / stats.total_products as f64) * 100.0
            } else {
                0.0
            };
            println!("  {} stars: {} ({:.1}%)", rating, count, percentage);
        }
        println!();
    }

    if !stats.categories.is_empty() {
        println!("Categories ({}):", stats.categories.len());
        // Sort categories by count (descending)
        let mut category_counts: Vec<_> = stats.categories.iter().collect();
        category_counts.sort_by(|a, b| b.1.cmp(a.1));

        for (category, count) in category_counts {
            println!("  - {}: {}", category, count);
        }
    }
}
