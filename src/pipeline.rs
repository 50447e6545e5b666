//! Crawl-then-save pipeline and its background launcher
//!
//! [`Pipeline::run`] crawls the requested pages and upserts the results in
//! one transaction. [`CrawlLauncher`] runs pipelines on the tokio runtime so
//! the caller can respond before the crawl finishes.

use crate::config::{Config, CrawlerConfig, UserAgentConfig};
use crate::crawler::Crawler;
use crate::storage::{open_storage, ProductStore};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::Instrument;

/// What to crawl: a catalog root and how many pages of it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlRequest {
    pub url: String,
    pub pages: u32,
}

impl CrawlRequest {
    pub fn new(url: impl Into<String>, pages: u32) -> Self {
        Self {
            url: url.into(),
            pages,
        }
    }

    /// The request described by the `[crawler]` section
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(config.base_url.clone(), config.pages)
    }
}

/// Wires the crawler's output into the product store
#[derive(Debug, Clone)]
pub struct Pipeline {
    crawler: CrawlerConfig,
    user_agent: UserAgentConfig,
    database_path: PathBuf,
}

impl Pipeline {
    pub fn new(config: &Config) -> Self {
        Self {
            crawler: config.crawler.clone(),
            user_agent: config.user_agent.clone(),
            database_path: PathBuf::from(&config.storage.database_path),
        }
    }

    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    /// The request used when a trigger leaves url or pages unset
    pub fn default_request(&self) -> CrawlRequest {
        CrawlRequest::from_config(&self.crawler)
    }

    /// Crawls and saves, returning the number of records processed
    ///
    /// Unavailable pages never fail the run; only an invalid base URL or a
    /// storage error does. The store is opened for the save step alone and
    /// released before this returns, whatever the outcome.
    pub async fn run(&self, request: &CrawlRequest) -> Result<usize> {
        let span = tracing::info_span!("pipeline", url = %request.url, pages = request.pages);

        async move {
            tracing::info!("Starting crawl");
            let crawler = Crawler::new(&request.url, &self.crawler, &self.user_agent)?;
            let records = crawler.crawl(request.pages).await;
            tracing::info!("Scraped {} products, saving", records.len());

            // rusqlite is blocking; keep it off the async workers
            let path = self.database_path.clone();
            let saved = tokio::task::spawn_blocking(move || {
                let mut storage = open_storage(&path)?;
                storage.save_products(&records)
            })
            .await??;

            tracing::info!("Pipeline complete: {} products saved", saved);
            Ok(saved)
        }
        .instrument(span)
        .await
    }
}

/// Fire-and-forget entry point for crawls
///
/// Launches are serialized: a crawl started while another is running waits
/// for it before touching the store.
#[derive(Debug, Clone)]
pub struct CrawlLauncher {
    pipeline: Arc<Pipeline>,
    gate: Arc<Mutex<()>>,
}

impl CrawlLauncher {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            gate: Arc::new(Mutex::new(())),
        }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Schedules a crawl and returns immediately
    ///
    /// The outcome is only logged. The returned handle lets callers that
    /// care (the CLI and tests) wait for completion.
    pub fn start_crawl(&self, request: CrawlRequest) -> JoinHandle<()> {
        let pipeline = Arc::clone(&self.pipeline);
        let gate = Arc::clone(&self.gate);

        tracing::info!("Queued crawl of {} ({} pages)", request.url, request.pages);

        tokio::spawn(async move {
            let _guard = gate.lock().await;
            if let Err(e) = pipeline.run(&request).await {
                tracing::error!("Crawl of {} failed: {}", request.url, e);
            }
        })
    }
}
