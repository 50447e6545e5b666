//! Product data model
//!
//! - `ProductRecord`: a product as extracted from one catalog page
//! - `PersistedProduct`: the stored counterpart with identity and timestamps
//! - `StarRating`: the fixed label table behind the rating field

mod rating;

pub use rating::{StarRating, RATING_BASE_CLASS};

use serde::{Deserialize, Serialize};

/// Category assigned to every product; listing pages carry no per-product category
pub const DEFAULT_CATEGORY: &str = "books";

/// A product extracted from a catalog page, before persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Natural key used for reconciliation
    pub title: String,
    pub price: f64,
    pub category: String,
    /// Always within 0..=5
    pub rating: u8,
    pub image_url: Option<String>,
}

/// A product as stored, with its generated identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedProduct {
    pub id: i64,
    pub title: String,
    pub price: f64,
    pub category: String,
    pub rating: u8,
    pub image_url: Option<String>,
    pub created_at: String,
    /// None until the product has been seen a second time
    pub updated_at: Option<String>,
}

impl PersistedProduct {
    /// Overwrites every mutable field from a freshly scraped record
    ///
    /// Identity, title and creation time are kept. The caller is responsible
    /// for stamping `updated_at`.
    pub fn merge_from(&mut self, record: &ProductRecord) {
        self.price = record.price;
        self.category = record.category.clone();
        self.rating = record.rating;
        self.image_url = record.image_url.clone();
    }
}
