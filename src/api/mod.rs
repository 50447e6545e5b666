//! HTTP query API over the product store
//!
//! Thin JSON layer built with axum: product listing and lookup, catalog
//! statistics, and a fire-and-forget trigger for new crawls.

mod handlers;

pub use handlers::{ScrapeParams, ScrapeResponse};

use crate::pipeline::CrawlLauncher;
use crate::storage::{SqliteStorage, StorageError, StorageResult};
use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    storage: Arc<Mutex<SqliteStorage>>,
    launcher: CrawlLauncher,
}

impl AppState {
    pub fn new(storage: SqliteStorage, launcher: CrawlLauncher) -> Self {
        Self {
            storage: Arc::new(Mutex::new(storage)),
            launcher,
        }
    }

    /// Runs a store operation on the blocking pool
    ///
    /// rusqlite calls can wait on the busy timeout while a crawl holds the
    /// write lock, so they never run on the async workers.
    async fn with_storage<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteStorage) -> StorageResult<T> + Send + 'static,
    {
        let storage = Arc::clone(&self.storage);
        tokio::task::spawn_blocking(move || {
            let mut guard = storage
                .lock()
                .map_err(|_| ApiError::Internal("storage lock poisoned".to_string()))?;
            op(&mut *guard).map_err(ApiError::from)
        })
        .await
        .map_err(|e| ApiError::Internal(format!("storage task failed: {}", e)))?
    }
}

/// Errors returned to API clients as `{"detail": ...}`
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Product not found")]
    NotFound,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Storage(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

/// Builds the application router
pub fn router(state: AppState) -> Router {
    // Allow any origin; the API carries no credentials
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/scrape/", post(handlers::start_scrape))
        .route(
            "/products/",
            get(handlers::list_products).delete(handlers::delete_products),
        )
        .route("/products/:id", get(handlers::get_product))
        .route("/categories/", get(handlers::list_categories))
        .route("/stats/", get(handlers::stats))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
