//! Crawler module for catalog fetching and extraction
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry and backoff
//! - Product extraction from listing pages
//! - Sequential, paced traversal of the catalog

mod coordinator;
mod extractor;
mod fetcher;

pub use coordinator::Crawler;
pub use extractor::{clean_price, extract_product, extract_products, parse_price, ExtractError};
pub use fetcher::{build_http_client, fetch_page, PageDocument, RetryPolicy};
