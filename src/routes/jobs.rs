use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::job_dto::{JobListQuery, JobListResponse},
    error::Result,
    models::source::IngestBatch,
    AppState,
};

#[axum::debug_handler]
pub async fn list_jobs(
    State(state): State<AppState>,
    query: std::result::Result<Query<JobListQuery>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(query) = query?;
    query.validate()?;
    let page = state.store.list(&query).await?;
    Ok(Json(JobListResponse::from_page(page, &query)))
}

#[axum::debug_handler]
pub async fn ingest_jobs(
    State(state): State<AppState>,
    payload: std::result::Result<Json<IngestBatch>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(batch) = payload?;
    let summary = state.ingest_service.ingest(batch).await;
    Ok(Json(summary))
}
