use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Catalog-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub storage: StorageConfig,
    pub server: ServerConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Catalog root; page 1 of the crawl
    pub base_url: String,

    /// Number of catalog pages to visit
    pub pages: u32,

    /// Total fetch attempts per page, including the first
    pub max_retries: u32,

    /// Per-request timeout (seconds)
    pub request_timeout_secs: u64,

    /// Base unit for exponential backoff between attempts (milliseconds)
    pub backoff_unit_ms: u64,

    /// Lower bound of the pause after each fetched page (milliseconds)
    pub min_page_delay_ms: u64,

    /// Upper bound of the pause after each fetched page (milliseconds)
    pub max_page_delay_ms: u64,
}

impl CrawlerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn backoff_unit(&self) -> Duration {
        Duration::from_millis(self.backoff_unit_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://books.toscrape.com".to_string(),
            pages: 5,
            max_retries: 3,
            request_timeout_secs: 10,
            backoff_unit_ms: 1000,
            min_page_delay_ms: 1000,
            max_page_delay_ms: 3000,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: String,

    /// Email address for crawler-related contact
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the identity header: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "CatalogHarvest".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/catalog-harvest".to_string(),
            contact_email: "crawler@example.com".to_string(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StorageConfig {
    /// Path to the SQLite database file
    pub database_path: String,
}

impl StorageConfig {
    /// Accepts either a plain path or a SQLite URL
    ///
    /// `sqlite:///rel.db` is relative and `sqlite:////abs.db` absolute, as
    /// SQLAlchemy-style URLs spell them. A bare `sqlite://` prefix is also
    /// stripped.
    pub fn set_database(&mut self, raw: &str) {
        let path = raw
            .strip_prefix("sqlite:///")
            .or_else(|| raw.strip_prefix("sqlite://"))
            .unwrap_or(raw);
        self.database_path = path.to_string();
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: "./products.db".to_string(),
        }
    }
}

/// Query API listener configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}
