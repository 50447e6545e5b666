//! Crawl orchestration across catalog pages
//!
//! The crawler walks pages strictly in order, one at a time:
//! - Page 1 is the base URL; pages 2..=N live under `catalogue/page-{n}.html`
//! - Each page is fetched (with retries), extracted, then followed by a
//!   randomized pause before the next request
//! - A first-page failure ends the crawl; later failures skip that page

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::crawler::extractor::extract_products;
use crate::crawler::fetcher::{build_http_client, fetch_page, RetryPolicy};
use crate::product::ProductRecord;
use crate::url::{catalogue_page_url, normalize_base_url};
use crate::HarvestError;
use rand::Rng;
use reqwest::Client;
use std::time::Duration;

/// Drives one crawl over a catalog
pub struct Crawler {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
    min_page_delay: Duration,
    max_page_delay: Duration,
}

impl Crawler {
    /// Creates a crawler for the given catalog root
    ///
    /// # Arguments
    ///
    /// * `base_url` - Catalog root; trailing slashes are dropped
    /// * `config` - Retry, timeout and pacing settings
    /// * `user_agent` - Identity sent with every request
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to crawl
    /// * `Err(HarvestError)` - Invalid base URL or HTTP client setup failure
    pub fn new(
        base_url: &str,
        config: &CrawlerConfig,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, HarvestError> {
        let base_url = normalize_base_url(base_url)?;
        let client = build_http_client(user_agent, config.request_timeout())?;

        Ok(Self {
            client,
            base_url,
            retry: RetryPolicy::from_config(config),
            min_page_delay: Duration::from_millis(config.min_page_delay_ms),
            max_page_delay: Duration::from_millis(config.max_page_delay_ms),
        })
    }

    /// The normalized catalog root
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Crawls pages 1..=num_pages and returns every product found
    ///
    /// Never fails: unavailable pages are logged and skipped, and an
    /// unavailable first page yields an empty result without touching the
    /// rest of the catalog. A `num_pages` of 0 still fetches the base page.
    pub async fn crawl(&self, num_pages: u32) -> Vec<ProductRecord> {
        let last_page = num_pages.max(1);
        let mut products = Vec::new();

        for page in 1..=last_page {
            let url = catalogue_page_url(&self.base_url, page);
            tracing::info!("Scraping page {}/{}: {}", page, last_page, url);

            let page_products = match fetch_page(&self.client, &url, &self.retry).await {
                Ok(document) => extract_products(&document, &self.base_url),
                Err(e) if page == 1 => {
                    tracing::error!("Could not fetch the catalog root, aborting crawl: {}", e);
                    return products;
                }
                Err(e) => {
                    tracing::warn!("Skipping page {}: {}", page, e);
                    continue;
                }
            };

            tracing::info!("Found {} products on page {}", page_products.len(), page);
            products.extend(page_products);

            if page < last_page {
                let pause = self.page_delay();
                tracing::debug!("Sleeping {}ms before next page", pause.as_millis());
                tokio::time::sleep(pause).await;
            }
        }

        tracing::info!("Crawl finished with {} products", products.len());
        products
    }

    /// Draws the pause taken after a fetched page
    fn page_delay(&self) -> Duration {
        let min = self.min_page_delay.as_millis() as u64;
        let max = self.max_page_delay.as_millis() as u64;
        if max <= min {
            return self.min_page_delay;
        }
        Duration::from_millis(rand::rng().random_range(min..=max))
    }
}
