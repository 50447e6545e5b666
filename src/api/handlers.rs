use super::{ApiError, AppState};
use crate::output::{load_statistics, CatalogStatistics};
use crate::pipeline::CrawlRequest;
use crate::product::PersistedProduct;
use crate::storage::{ProductFilter, ProductStore};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Query string of `POST /scrape/`; unset values fall back to the config
///
/// `pages` accepts any integer so the trigger never rejects a request;
/// values below 1 crawl the base page only.
#[derive(Debug, Default, Deserialize)]
pub struct ScrapeParams {
    pub url: Option<String>,
    pub pages: Option<i64>,
}

impl ScrapeParams {
    fn into_request(self, defaults: CrawlRequest) -> CrawlRequest {
        let pages = match self.pages {
            Some(pages) => pages.clamp(1, i64::from(u32::MAX)) as u32,
            None => defaults.pages,
        };
        CrawlRequest::new(self.url.unwrap_or(defaults.url), pages)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScrapeResponse {
    pub status: String,
    pub message: String,
    pub url: String,
    pub pages: u32,
}

/// Queues a crawl and acknowledges at once
pub async fn start_scrape(
    State(state): State<AppState>,
    Query(params): Query<ScrapeParams>,
) -> Json<ScrapeResponse> {
    let request = params.into_request(state.launcher.pipeline().default_request());

    let response = ScrapeResponse {
        status: "success".to_string(),
        message: format!(
            "Scraping started in the background for {}, {} pages",
            request.url, request.pages
        ),
        url: request.url.clone(),
        pages: request.pages,
    };

    // Detached; the outcome only reaches the logs
    drop(state.launcher.start_crawl(request));

    Json(response)
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Vec<PersistedProduct>>, ApiError> {
    let products = state
        .with_storage(move |storage| storage.query_products(&filter))
        .await?;
    Ok(Json(products))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PersistedProduct>, ApiError> {
    state
        .with_storage(move |storage| storage.get_product(id))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

pub async fn delete_products(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let deleted = state
        .with_storage(|storage| storage.delete_all_products())
        .await?;
    tracing::info!("Deleted {} products", deleted);

    Ok(Json(json!({
        "status": "success",
        "message": format!("Deleted {} products from the database", deleted),
        "deleted": deleted,
    })))
}

pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    let categories = state
        .with_storage(|storage| storage.list_categories())
        .await?;
    Ok(Json(categories))
}

pub async fn stats(State(state): State<AppState>) -> Result<Json<CatalogStatistics>, ApiError> {
    let stats = state
        .with_storage(|storage| load_statistics(&*storage))
        .await?;
    Ok(Json(stats))
}
