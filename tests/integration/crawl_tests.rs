//! Integration tests for the crawler and pipeline
//!
//! These tests use wiremock to serve a fake catalog and exercise the full
//! fetch, extract and save cycle end-to-end.

use crate::{catalog_page, fast_config, product_card};
use catalog_harvest::crawler::Crawler;
use catalog_harvest::storage::{ProductStore, SqliteStorage};
use catalog_harvest::{CrawlLauncher, CrawlRequest, Pipeline};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mounts a listing page with one product per title
async fn mount_page(server: &MockServer, page_path: &str, titles: &[&str]) {
    let cards: Vec<String> = titles
        .iter()
        .map(|t| product_card(t, "£10.00", "Four", "media/cache/x.jpg"))
        .collect();

    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(catalog_page(&cards))
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

fn titles(records: &[catalog_harvest::ProductRecord]) -> Vec<&str> {
    records.iter().map(|r| r.title.as_str()).collect()
}

#[tokio::test]
async fn test_crawl_skips_failed_interior_page() {
    let server = MockServer::start().await;
    let config = fast_config(&server.uri(), ":memory:");

    mount_page(&server, "/", &["p1"]).await;
    mount_page(&server, "/catalogue/page-2.html", &["p2"]).await;
    Mock::given(method("GET"))
        .and(path("/catalogue/page-3.html"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;
    mount_page(&server, "/catalogue/page-4.html", &["p4"]).await;
    mount_page(&server, "/catalogue/page-5.html", &["p5"]).await;

    let crawler = Crawler::new(&server.uri(), &config.crawler, &config.user_agent).unwrap();
    let records = crawler.crawl(5).await;

    assert_eq!(titles(&records), vec!["p1", "p2", "p4", "p5"]);
}

#[tokio::test]
async fn test_first_page_failure_aborts_crawl() {
    let server = MockServer::start().await;
    let config = fast_config(&server.uri(), ":memory:");

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/catalogue/page-2.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(catalog_page(&[])))
        .expect(0)
        .mount(&server)
        .await;

    let crawler = Crawler::new(&server.uri(), &config.crawler, &config.user_agent).unwrap();
    let records = crawler.crawl(3).await;

    assert!(records.is_empty());
}

#[tokio::test]
async fn test_fetch_recovers_after_transient_error() {
    let server = MockServer::start().await;
    let config = fast_config(&server.uri(), ":memory:");

    // Mounted first, so it answers the first request only
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_page(&server, "/", &["recovered"]).await;

    let crawler = Crawler::new(&server.uri(), &config.crawler, &config.user_agent).unwrap();
    let records = crawler.crawl(1).await;

    assert_eq!(titles(&records), vec!["recovered"]);
}

#[tokio::test]
async fn test_crawl_sends_identity_header() {
    let server = MockServer::start().await;
    let config = fast_config(&server.uri(), ":memory:");
    let expected_agent = config.user_agent.header_value();

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", expected_agent.as_str()))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(catalog_page(&[product_card(
                "identified",
                "£1.00",
                "One",
                "a.jpg",
            )])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let crawler = Crawler::new(&server.uri(), &config.crawler, &config.user_agent).unwrap();
    let records = crawler.crawl(1).await;

    assert_eq!(titles(&records), vec!["identified"]);
}

#[tokio::test]
async fn test_crawled_fields_are_normalized() {
    let server = MockServer::start().await;
    let config = fast_config(&server.uri(), ":memory:");

    let cards = vec![
        product_card("Relative", "Â£51.77", "Three", "media/cache/a.jpg"),
        product_card("Rooted", "£12.50", "Five", "/media/b.jpg"),
        product_card("Odd", "garbage", "Unknown", "c.jpg"),
    ];
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(catalog_page(&cards)))
        .mount(&server)
        .await;

    let base = server.uri();
    let crawler = Crawler::new(&format!("{}/", base), &config.crawler, &config.user_agent).unwrap();
    let records = crawler.crawl(1).await;

    assert_eq!(records.len(), 3);

    assert_eq!(records[0].price, 51.77);
    assert_eq!(records[0].rating, 3);
    assert_eq!(
        records[0].image_url.as_deref(),
        Some(format!("{}/../media/cache/a.jpg", base).as_str())
    );

    assert_eq!(records[1].rating, 5);
    assert_eq!(
        records[1].image_url.as_deref(),
        Some(format!("{}/media/b.jpg", base).as_str())
    );

    assert_eq!(records[2].price, 0.0);
    assert_eq!(records[2].rating, 0);
    assert_eq!(records[2].category, "books");
}

#[tokio::test]
async fn test_pipeline_is_idempotent() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("products.db");
    let config = fast_config(&server.uri(), &db_path.display().to_string());

    mount_page(&server, "/", &["a", "b"]).await;
    mount_page(&server, "/catalogue/page-2.html", &["c"]).await;

    let pipeline = Pipeline::new(&config);
    let request = CrawlRequest::new(server.uri(), 2);

    assert_eq!(pipeline.run(&request).await.unwrap(), 3);
    let first = SqliteStorage::new(&db_path)
        .unwrap()
        .get_product_by_title("a")
        .unwrap()
        .unwrap();

    assert_eq!(pipeline.run(&request).await.unwrap(), 3);
    let storage = SqliteStorage::new(&db_path).unwrap();
    let second = storage.get_product_by_title("a").unwrap().unwrap();

    assert_eq!(storage.count_products().unwrap(), 3);
    assert_eq!(second.id, first.id);
    assert_eq!(second.created_at, first.created_at);
    assert!(first.updated_at.is_none());
    assert!(second.updated_at.is_some());
}

#[tokio::test]
async fn test_launcher_runs_crawls_in_background() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("products.db");
    let config = fast_config(&server.uri(), &db_path.display().to_string());

    mount_page(&server, "/", &["first"]).await;

    let launcher = CrawlLauncher::new(Pipeline::new(&config));
    let first = launcher.start_crawl(CrawlRequest::new(server.uri(), 1));
    let second = launcher.start_crawl(CrawlRequest::new(server.uri(), 1));
    first.await.unwrap();
    second.await.unwrap();

    let storage = SqliteStorage::new(&db_path).unwrap();
    assert_eq!(storage.count_products().unwrap(), 1);
    let stored = storage.get_product_by_title("first").unwrap().unwrap();
    assert!(stored.updated_at.is_some());
}
