//! Catalog-Harvest main entry point
//!
//! This is the command-line interface for the Catalog-Harvest scraper.

use anyhow::Context;
use catalog_harvest::api::{router, AppState};
use catalog_harvest::config::{load_config_with_hash, validate, Config};
use catalog_harvest::storage::open_storage;
use catalog_harvest::{CrawlLauncher, CrawlRequest, Pipeline};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Catalog-Harvest: a polite catalog scraper
///
/// Crawls a paginated product catalog, upserts what it finds into SQLite
/// keyed by title, and serves the stored products over a small JSON API.
#[derive(Parser, Debug)]
#[command(name = "catalog-harvest")]
#[command(version)]
#[command(about = "A polite catalog scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Run one crawl in the foreground and exit
    #[arg(long, conflicts_with_all = ["stats", "dry_run"])]
    crawl: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["crawl", "dry_run"])]
    stats: bool,

    /// Validate config and show the effective settings without doing anything
    #[arg(long, conflicts_with_all = ["crawl", "stats"])]
    dry_run: bool,

    /// Catalog root to crawl
    #[arg(long)]
    url: Option<String>,

    /// Number of catalog pages to crawl
    #[arg(long)]
    pages: Option<u32>,

    /// Database path or `sqlite:///` URL
    #[arg(long, env = "DATABASE_PATH")]
    database: Option<String>,

    /// SQLite URL, used when no database path is given
    #[arg(long, env = "DATABASE_URL", hide = true)]
    database_url: Option<String>,

    /// Address the API listens on
    #[arg(long, env = "HOST")]
    host: Option<String>,

    /// Port the API listens on
    #[arg(long, env = "PORT")]
    port: Option<u16>,
}

impl Cli {
    /// Applies command-line and environment overrides on top of the file
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(url) = &self.url {
            config.crawler.base_url = url.clone();
        }
        if let Some(pages) = self.pages {
            config.crawler.pages = pages;
        }
        if let Some(database) = self.database.as_ref().or(self.database_url.as_ref()) {
            config.storage.set_database(database);
        }
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (cfg, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    cli.apply_overrides(&mut config);
    validate(&config).context("Invalid configuration")?;

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.crawl {
        handle_crawl(&config).await?;
    } else {
        handle_serve(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// `RUST_LOG` takes precedence when set.
fn setup_logging(verbose: u8, quiet: bool) {
    let default_filter = if quiet {
        "error"
    } else {
        match verbose {
            0 => "catalog_harvest=info,tower_http=info,warn",
            1 => "catalog_harvest=debug,tower_http=debug,info",
            2 => "catalog_harvest=trace,debug",
            _ => "trace",
        }
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Catalog-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Base URL: {}", config.crawler.base_url);
    println!("  Pages: {}", config.crawler.pages);
    println!("  Max attempts per page: {}", config.crawler.max_retries);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  Backoff unit: {}ms", config.crawler.backoff_unit_ms);
    println!(
        "  Page delay: {}-{}ms",
        config.crawler.min_page_delay_ms, config.crawler.max_page_delay_ms
    );

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nStorage:");
    println!("  Database: {}", config.storage.database_path);

    println!("\nServer:");
    println!("  Listen: {}", config.server.bind_address());

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use catalog_harvest::output::{load_statistics, print_statistics};

    println!("Database: {}\n", config.storage.database_path);

    let storage = open_storage(Path::new(&config.storage.database_path))
        .context("Failed to open database")?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --crawl mode: one pipeline run in the foreground
async fn handle_crawl(config: &Config) -> anyhow::Result<()> {
    let pipeline = Pipeline::new(config);
    let request = CrawlRequest::from_config(&config.crawler);

    let saved = pipeline.run(&request).await.context("Crawl failed")?;
    println!("✓ Saved {} products to {}", saved, config.storage.database_path);

    Ok(())
}

/// Default mode: serve the query API
async fn handle_serve(config: Config) -> anyhow::Result<()> {
    let storage = open_storage(Path::new(&config.storage.database_path))
        .context("Failed to open database")?;
    let launcher = CrawlLauncher::new(Pipeline::new(&config));
    let app = router(AppState::new(storage, launcher));

    let addr = config.server.bind_address();
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
