//! Integration tests for Catalog-Harvest
//!
//! Crawl tests stand up a fake catalog with wiremock; API tests drive the
//! router in-process.

mod api_tests;
mod crawl_tests;

use catalog_harvest::config::{Config, CrawlerConfig};

/// Renders one product card the way the catalog does
pub fn product_card(title: &str, price: &str, rating: &str, image: &str) -> String {
    format!(
        r#"<li class="col-xs-6"><article class="product_pod">
            <div class="image_container"><a href="book.html"><img src="{image}" alt="{title}" class="thumbnail"></a></div>
            <p class="star-rating {rating}"><i class="icon-star"></i></p>
            <h3><a href="book.html" title="{title}">{title}</a></h3>
            <div class="product_price"><p class="price_color">{price}</p></div>
        </article></li>"#
    )
}

/// Wraps cards in a listing page
pub fn catalog_page(cards: &[String]) -> String {
    format!(
        "<html><head><title>All products</title></head><body><ol class=\"row\">{}</ol></body></html>",
        cards.concat()
    )
}

/// Config with millisecond pacing so tests run quickly
pub fn fast_config(base_url: &str, database_path: &str) -> Config {
    let mut config = Config::default();
    config.crawler = CrawlerConfig {
        base_url: base_url.to_string(),
        pages: 1,
        max_retries: 2,
        request_timeout_secs: 5,
        backoff_unit_ms: 5,
        min_page_delay_ms: 1,
        max_page_delay_ms: 3,
    };
    config.storage.database_path = database_path.to_string();
    config
}
