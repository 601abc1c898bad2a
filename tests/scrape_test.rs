mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use job_aggregator::{
    dto::job_dto::ScrapeRequest,
    error::{Error, Result},
    models::source::{IngestBatch, StartupCompany, StartupJob},
    router,
    services::{ingest_service::IngestService, scraper_client::JobSource},
    AppState,
};
use mockall::mock;
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;

use common::MemoryJobStore;

mock! {
    pub Source {}

    #[async_trait]
    impl JobSource for Source {
        async fn fetch(&self, request: &ScrapeRequest) -> Result<Vec<IngestBatch>>;
    }
}

fn request(value: JsonValue) -> ScrapeRequest {
    serde_json::from_value(value).unwrap()
}

fn scraped_batches() -> Vec<IngestBatch> {
    let company = StartupCompany {
        company_name: Some("Acme".into()),
        job_data: vec![StartupJob {
            job_url: Some("https://www.ycombinator.com/companies/acme/jobs/42-backend".into()),
            job_title: Some("Backend".into()),
            ..StartupJob::default()
        }],
        ..StartupCompany::default()
    };
    let rows = vec![json!({
        "site": "indeed",
        "job_url": "https://indeed.com/viewjob?jk=1",
        "title": "Rust Engineer",
    })
    .as_object()
    .cloned()
    .unwrap()];
    vec![
        IngestBatch::JobBoard(rows),
        IngestBatch::StartupDirectory(vec![company]),
    ]
}

#[tokio::test]
async fn scrape_without_saving_returns_normalized_jobs() {
    let store = MemoryJobStore::new();
    let mut source = MockSource::new();
    source
        .expect_fetch()
        .times(1)
        .returning(|_| Ok(scraped_batches()));

    let req = request(json!({
        "site_names": ["ycombinator", "indeed"],
        "company_name": "acme",
    }));
    let outcome = IngestService::new(Arc::new(store.clone()))
        .scrape_and_ingest(&source, &req)
        .await
        .unwrap();

    assert_eq!(outcome.jobs.len(), 2);
    assert_eq!(outcome.jobs[0].site.as_deref(), Some("indeed"));
    assert_eq!(outcome.jobs[1].job_id.as_deref(), Some("42-backend"));
    assert!(outcome.summary.is_none());
    assert!(store.rows().is_empty());
}

#[tokio::test]
async fn scrape_with_saving_ingests_every_batch() {
    let store = MemoryJobStore::new();
    let mut source = MockSource::new();
    source
        .expect_fetch()
        .returning(|_| Ok(scraped_batches()));

    let req = request(json!({
        "site_names": ["ycombinator", "indeed"],
        "company_name": "acme",
        "save_to_db": true,
    }));
    let outcome = IngestService::new(Arc::new(store.clone()))
        .scrape_and_ingest(&source, &req)
        .await
        .unwrap();

    let summary = outcome.summary.unwrap();
    assert_eq!(summary.inserted_count, 2);
    assert_eq!(summary.skipped_count, 0);
    assert_eq!(store.rows().len(), 2);
}

#[tokio::test]
async fn source_failure_fails_the_whole_call() {
    let store = MemoryJobStore::new();
    let mut source = MockSource::new();
    source
        .expect_fetch()
        .returning(|_| Err(Error::Source("503 Service Unavailable".into())));

    let req = request(json!({ "search_term": "rust", "location": "Berlin", "save_to_db": true }));
    let result = IngestService::new(Arc::new(store.clone()))
        .scrape_and_ingest(&source, &req)
        .await;

    assert!(matches!(result, Err(Error::Source(_))));
    assert!(store.rows().is_empty());
}

#[tokio::test]
async fn scrape_endpoint_reports_found_jobs_and_db_result() {
    let store = MemoryJobStore::new();
    let mut source = MockSource::new();
    source
        .expect_fetch()
        .withf(|req| req.wants_startup_directory())
        .returning(|_| Ok(scraped_batches()));

    let state = AppState::new(Arc::new(store.clone()), Some(Arc::new(source)));
    let body = json!({
        "site_names": ["ycombinator", "indeed"],
        "company_name": "acme",
        "save_to_db": true,
    });
    let response = router(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/scrape")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["jobs_found"], 2);
    assert_eq!(
        body["db_result"],
        json!({ "inserted_count": 2, "skipped_count": 0 })
    );
}

#[tokio::test]
async fn scrape_endpoint_maps_source_failure_to_bad_gateway() {
    let store = MemoryJobStore::new();
    let mut source = MockSource::new();
    source
        .expect_fetch()
        .returning(|_| Err(Error::Source("connection refused".into())));

    let state = AppState::new(Arc::new(store), Some(Arc::new(source)));
    let body = json!({ "search_term": "rust", "location": "Berlin" });
    let response = router(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/scrape")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
