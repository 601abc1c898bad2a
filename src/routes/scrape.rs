use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::job_dto::{ScrapeRequest, ScrapeResponse},
    error::{Error, Result},
    AppState,
};

#[axum::debug_handler]
pub async fn scrape_jobs(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ScrapeRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload?;
    payload.check_required_fields().map_err(Error::BadRequest)?;
    payload.validate()?;

    let scraper = state
        .scraper
        .clone()
        .ok_or_else(|| Error::Source("No scraper is configured (set SCRAPER_URL)".to_string()))?;

    let outcome = state
        .ingest_service
        .scrape_and_ingest(scraper.as_ref(), &payload)
        .await?;

    Ok(Json(ScrapeResponse {
        status: "success".to_string(),
        jobs_found: outcome.jobs.len(),
        jobs_data: outcome.jobs,
        db_result: outcome.summary,
    }))
}
