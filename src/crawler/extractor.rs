//! Product extraction from catalog listing pages
//!
//! Each listing page holds a grid of `article.product_pod` cards. Every card
//! is handled on its own: a malformed card is logged and skipped without
//! affecting its neighbours.
//!
//! # Field rules
//!
//! | Field | Source | Fallback |
//! |-------|--------|----------|
//! | title | `h3 a[title]` | card skipped |
//! | price | `div.product_price p.price_color` text, cleaned | card skipped if node missing, 0.0 if unparseable |
//! | category | constant | - |
//! | rating | `p.star-rating` class token | 0 |
//! | image_url | `div.image_container img[src]`, resolved | none |

use crate::product::{ProductRecord, StarRating, DEFAULT_CATEGORY};
use crate::url::resolve_image_url;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use thiserror::Error;

/// Characters removed before the digit filter: currency symbols and the
/// `Â` left behind when a UTF-8 pound sign is decoded as Latin-1
const CURRENCY_ARTIFACTS: [char; 4] = ['£', '€', '$', 'Â'];

/// Why a single product card was rejected
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Product card has no title link")]
    MissingTitleLink,

    #[error("Product card has no price")]
    MissingPrice,

    #[error("Title link has no title attribute")]
    MissingTitle,
}

struct CatalogSelectors {
    product: Selector,
    title: Selector,
    price: Selector,
    rating: Selector,
    image: Selector,
}

#[allow(clippy::expect_used)]
fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("hardcoded selector is valid")
}

static SELECTORS: LazyLock<CatalogSelectors> = LazyLock::new(|| CatalogSelectors {
    product: selector("article.product_pod"),
    title: selector("h3 a"),
    price: selector("div.product_price p.price_color"),
    rating: selector("p.star-rating"),
    image: selector("div.image_container img"),
});

/// Extracts every product on a listing page, in document order
///
/// # Arguments
///
/// * `document` - The parsed listing page
/// * `base_url` - Normalized crawl base, used to resolve image paths
///
/// # Example
///
/// ```
/// use catalog_harvest::crawler::extract_products;
/// use scraper::Html;
///
/// let html = r#"<article class="product_pod">
///   <h3><a href="x.html" title="Sharp Objects">Sharp...</a></h3>
///   <div class="product_price"><p class="price_color">£47.82</p></div>
/// </article>"#;
/// let products = extract_products(&Html::parse_document(html), "https://site.example");
/// assert_eq!(products[0].title, "Sharp Objects");
/// assert_eq!(products[0].price, 47.82);
/// ```
pub fn extract_products(document: &Html, base_url: &str) -> Vec<ProductRecord> {
    let entries: Vec<ElementRef<'_>> = document.select(&SELECTORS.product).collect();
    tracing::info!("Found {} product entries on page", entries.len());

    let mut products = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        match extract_product(*entry, base_url) {
            Ok(product) => {
                tracing::debug!("Extracted product: {} ({:.2})", product.title, product.price);
                products.push(product);
            }
            Err(e) => {
                tracing::warn!("Skipping product entry {}: {}", index, e);
            }
        }
    }

    tracing::info!(
        "Extracted {} products from {} entries",
        products.len(),
        entries.len()
    );
    products
}

/// Converts one product card into a record
pub fn extract_product(entry: ElementRef<'_>, base_url: &str) -> Result<ProductRecord, ExtractError> {
    let link = entry
        .select(&SELECTORS.title)
        .next()
        .ok_or(ExtractError::MissingTitleLink)?;
    let price_node = entry
        .select(&SELECTORS.price)
        .next()
        .ok_or(ExtractError::MissingPrice)?;

    // The visible link text is truncated; the attribute carries the full title
    let title = link
        .value()
        .attr("title")
        .filter(|t| !t.trim().is_empty())
        .ok_or(ExtractError::MissingTitle)?
        .to_string();

    let price_text = price_node.text().collect::<String>();
    let price = parse_price(price_text.trim());

    let rating_classes = entry
        .select(&SELECTORS.rating)
        .next()
        .and_then(|node| node.value().attr("class"));
    let rating = StarRating::from_class_list(rating_classes).value();

    let image_url = entry
        .select(&SELECTORS.image)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(|src| resolve_image_url(base_url, src));

    Ok(ProductRecord {
        title,
        price,
        category: DEFAULT_CATEGORY.to_string(),
        rating,
        image_url,
    })
}

/// Strips currency symbols, whitespace and encoding artifacts, then keeps
/// only digits and decimal points
pub fn clean_price(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && !CURRENCY_ARTIFACTS.contains(c))
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect()
}

/// Parses a price label, falling back to 0.0 when nothing numeric survives cleaning
pub fn parse_price(raw: &str) -> f64 {
    let cleaned = clean_price(raw);
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            tracing::error!(
                "Could not parse price '{}' (cleaned to '{}'), defaulting to 0.0",
                raw,
                cleaned
            );
            0.0
        }
    }
}
