//! Integration tests for the query API
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot`.

use crate::fast_config;
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use catalog_harvest::api::{router, AppState, ScrapeResponse};
use catalog_harvest::storage::{ProductStore, SqliteStorage};
use catalog_harvest::{CrawlLauncher, Pipeline, ProductRecord};
use serde_json::Value;
use tower::ServiceExt;

fn record(title: &str, price: f64, category: &str, rating: u8) -> ProductRecord {
    ProductRecord {
        title: title.to_string(),
        price,
        category: category.to_string(),
        rating,
        image_url: None,
    }
}

/// Router over an in-memory store seeded with the given records
fn test_app(records: &[ProductRecord]) -> (Router, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("crawls.db");
    let config = fast_config("http://127.0.0.1:9", &db_path.display().to_string());

    let mut storage = SqliteStorage::new_in_memory().unwrap();
    storage.save_products(records).unwrap();

    let launcher = CrawlLauncher::new(Pipeline::new(&config));
    (router(AppState::new(storage, launcher)), dir)
}

fn seeded_app() -> (Router, tempfile::TempDir) {
    test_app(&[
        record("A Light in the Attic", 51.77, "books", 3),
        record("Tipping the Velvet", 53.74, "books", 1),
        record("Soumission", 50.10, "fiction", 1),
        record("Sharp Objects", 47.82, "fiction", 4),
    ])
}

async fn send(app: Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn titles(body: &Value) -> Vec<String> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health() {
    let (app, _dir) = test_app(&[]);
    let (status, body) = send(app, Method::GET, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_list_products_unfiltered() {
    let (app, _dir) = seeded_app();
    let (status, body) = send(app, Method::GET, "/products/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 4);
    assert_eq!(body[0]["title"], "A Light in the Attic");
    assert_eq!(body[0]["rating"], 3);
    assert!(body[0]["created_at"].is_string());
    assert!(body[0]["updated_at"].is_null());
}

#[tokio::test]
async fn test_list_products_with_filters() {
    let (app, _dir) = seeded_app();
    let (_, body) = send(
        app.clone(),
        Method::GET,
        "/products/?min_price=50&max_price=52&category=books",
    )
    .await;
    assert_eq!(titles(&body), vec!["A Light in the Attic"]);

    let (_, body) = send(app.clone(), Method::GET, "/products/?name=SHARP").await;
    assert_eq!(titles(&body), vec!["Sharp Objects"]);

    let (_, body) = send(app.clone(), Method::GET, "/products/?min_rating=3").await;
    assert_eq!(titles(&body), vec!["A Light in the Attic", "Sharp Objects"]);

    let (_, body) = send(app, Method::GET, "/products/?skip=1&limit=2").await;
    assert_eq!(titles(&body), vec!["Tipping the Velvet", "Soumission"]);
}

#[tokio::test]
async fn test_get_product_by_id() {
    let (app, _dir) = seeded_app();

    let (status, body) = send(app.clone(), Method::GET, "/products/2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Tipping the Velvet");

    let (status, body) = send(app, Method::GET, "/products/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Product not found");
}

#[tokio::test]
async fn test_categories() {
    let (app, _dir) = seeded_app();
    let (status, body) = send(app, Method::GET, "/categories/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!(["books", "fiction"]));
}

#[tokio::test]
async fn test_stats_empty_store() {
    let (app, _dir) = test_app(&[]);
    let (status, body) = send(app, Method::GET, "/stats/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_products"], 0);
    assert_eq!(body["price_stats"]["average"], 0.0);
    assert_eq!(body["rating_distribution"], serde_json::json!({}));
    assert_eq!(body["categories"], serde_json::json!({}));
}

#[tokio::test]
async fn test_stats_populated_store() {
    let (app, _dir) = seeded_app();
    let (_, body) = send(app, Method::GET, "/stats/").await;

    assert_eq!(body["total_products"], 4);
    assert_eq!(body["price_stats"]["min"], 47.82);
    assert_eq!(body["price_stats"]["max"], 53.74);
    assert_eq!(body["rating_distribution"]["1"], 2);
    assert_eq!(body["categories"]["fiction"], 2);
}

#[tokio::test]
async fn test_delete_all_products() {
    let (app, _dir) = seeded_app();

    let (status, body) = send(app.clone(), Method::DELETE, "/products/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], 4);

    let (_, body) = send(app, Method::GET, "/products/").await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_scrape_acknowledges_immediately() {
    let (app, _dir) = test_app(&[]);

    let (status, body) = send(
        app.clone(),
        Method::POST,
        "/scrape/?url=http://127.0.0.1:9&pages=2",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let ack: ScrapeResponse = serde_json::from_value(body).unwrap();
    assert_eq!(ack.status, "success");
    assert_eq!(ack.url, "http://127.0.0.1:9");
    assert_eq!(ack.pages, 2);

    // Unset parameters fall back to the configured crawl
    let (_, body) = send(app, Method::POST, "/scrape/").await;
    assert_eq!(body["url"], "http://127.0.0.1:9");
    assert_eq!(body["pages"], 1);
}

#[tokio::test]
async fn test_scrape_accepts_non_positive_pages() {
    let (app, _dir) = test_app(&[]);

    let (status, body) = send(app, Method::POST, "/scrape/?pages=-1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["pages"], 1);
}

#[tokio::test]
async fn test_store_contention_does_not_stall_other_requests() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("shared.db");
    let config = fast_config("http://127.0.0.1:9", &db_path.display().to_string());

    let storage = SqliteStorage::new(&db_path).unwrap();
    let app = router(AppState::new(
        storage,
        CrawlLauncher::new(Pipeline::new(&config)),
    ));

    // A second connection holds the write lock, as a crawl's save step would
    let writer = rusqlite::Connection::open(&db_path).unwrap();
    writer.execute_batch("BEGIN IMMEDIATE").unwrap();

    let blocked = tokio::spawn(send(app.clone(), Method::DELETE, "/products/"));
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let (status, _) = tokio::time::timeout(
        std::time::Duration::from_secs(1),
        send(app, Method::GET, "/health"),
    )
    .await
    .expect("health check stalled behind a blocked store call");
    assert_eq!(status, StatusCode::OK);

    writer.execute_batch("COMMIT").unwrap();
    let (status, body) = blocked.await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], 0);
}
