use axum::{
    extract::Path,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use job_aggregator::{
    dto::job_dto::ScrapeRequest,
    error::Error,
    models::source::IngestBatch,
    services::scraper_client::{JobSource, ScraperClient},
};
use serde_json::{json, Value as JsonValue};
use tokio::net::TcpListener;

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn sidecar() -> Router {
    Router::new()
        .route(
            "/jobs",
            post(|Json(body): Json<JsonValue>| async move {
                Json(json!([{
                    "site": "indeed",
                    "job_url": "https://indeed.com/viewjob?jk=1",
                    "title": body["search_term"],
                }]))
            }),
        )
        .route(
            "/companies/:name",
            get(|Path(name): Path<String>| async move {
                if name != "acme robotics" {
                    return Err(StatusCode::NOT_FOUND);
                }
                Ok(Json(json!({
                    "company_name": "Acme Robotics",
                    "job_data": [{ "job_url": "https://www.ycombinator.com/companies/acme/jobs/7-ops" }]
                })))
            }),
        )
}

fn request(value: JsonValue) -> ScrapeRequest {
    serde_json::from_value(value).unwrap()
}

#[tokio::test]
async fn job_board_rows_come_before_startup_jobs() {
    let base = serve(sidecar()).await;
    let client = ScraperClient::new(reqwest::Client::new(), base);

    let batches = client
        .fetch(&request(json!({
            "site_names": ["ycombinator", "indeed"],
            "search_term": "rust",
            "company_name": "Acme Robotics",
        })))
        .await
        .unwrap();

    assert_eq!(batches.len(), 2);
    match &batches[0] {
        IngestBatch::JobBoard(rows) => assert_eq!(rows[0]["title"], json!("rust")),
        other => panic!("expected job-board rows first, got {:?}", other),
    }
    match &batches[1] {
        IngestBatch::StartupDirectory(companies) => {
            assert_eq!(companies[0].company_name.as_deref(), Some("Acme Robotics"));
        }
        other => panic!("expected startup companies second, got {:?}", other),
    }
}

#[tokio::test]
async fn error_status_from_sidecar_is_a_source_failure() {
    let base = serve(sidecar()).await;
    let client = ScraperClient::new(reqwest::Client::new(), base);

    let result = client.fetch_company("Globex").await;
    assert!(matches!(result, Err(Error::Source(_))));

    let empty = serve(Router::new()).await;
    let client = ScraperClient::new(reqwest::Client::new(), empty);
    let result = client
        .fetch(&request(json!({ "search_term": "rust", "location": "Berlin" })))
        .await;
    assert!(matches!(result, Err(Error::Source(_))));
}
