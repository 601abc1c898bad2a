pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::services::{
    ingest_service::IngestService, job_store::JobStore, scraper_client::JobSource,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn JobStore>,
    pub ingest_service: IngestService,
    pub scraper: Option<Arc<dyn JobSource>>,
}

impl AppState {
    pub fn new(store: Arc<dyn JobStore>, scraper: Option<Arc<dyn JobSource>>) -> Self {
        let ingest_service = IngestService::new(store.clone());
        Self {
            store,
            ingest_service,
            scraper,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/scrape", post(routes::scrape::scrape_jobs))
        .route("/api/jobs", get(routes::jobs::list_jobs))
        .route("/api/jobs/ingest", post(routes::jobs::ingest_jobs))
        .with_state(state)
        .layer(middleware::cors::permissive_cors())
        .layer(TraceLayer::new_for_http())
}
