use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Serialize;
use tracing::{info, instrument, warn};
use url::Url;

use crate::dto::job_dto::ScrapeRequest;
use crate::error::{Error, Result};
use crate::models::source::{IngestBatch, RawRecord, StartupCompany};

/// Anything that can turn a scrape request into batches of source records.
#[async_trait]
pub trait JobSource: Send + Sync {
    async fn fetch(&self, request: &ScrapeRequest) -> Result<Vec<IngestBatch>>;
}

#[derive(Debug, Serialize)]
struct JobBoardQuery<'a> {
    site_name: Vec<String>,
    search_term: Option<&'a str>,
    google_search_term: String,
    location: Option<&'a str>,
    results_wanted: u32,
    hours_old: u32,
    country_indeed: &'a str,
    linkedin_fetch_description: bool,
}

impl<'a> From<&'a ScrapeRequest> for JobBoardQuery<'a> {
    fn from(request: &'a ScrapeRequest) -> Self {
        Self {
            site_name: request.job_board_sites(),
            search_term: request.search_term.as_deref(),
            google_search_term: request.effective_google_search_term(),
            location: request.location.as_deref(),
            results_wanted: request.results_wanted,
            hours_old: request.hours_old,
            country_indeed: &request.country_indeed,
            linkedin_fetch_description: request.linkedin_fetch_description,
        }
    }
}

/// HTTP client for the scraper sidecar.
#[derive(Clone)]
pub struct ScraperClient {
    client: Client,
    base_url: String,
}

impl ScraperClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn fetch_job_board(&self, request: &ScrapeRequest) -> Result<Vec<RawRecord>> {
        let url = format!("{}/jobs", self.base_url);
        info!("Fetching job-board rows from: {}", url);
        let response = self
            .client
            .post(&url)
            .json(&JobBoardQuery::from(request))
            .send()
            .await
            .map_err(source_failure)?;
        let rows = ensure_success(response)
            .await?
            .json::<Vec<RawRecord>>()
            .await
            .map_err(source_failure)?;
        Ok(rows)
    }

    /// `{base}/companies/{name}`, lowercased and percent-encoded.
    pub fn company_url(&self, company_name: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("Invalid scraper URL {}: {}", self.base_url, e)))?;
        let name = company_name.trim().to_lowercase();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("Scraper URL {} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(["companies", name.as_str()]);
        Ok(url)
    }

    pub async fn fetch_company(&self, company_name: &str) -> Result<StartupCompany> {
        let url = self.company_url(company_name)?;
        info!("Fetching startup company from: {}", url);
        let response = self.client.get(url).send().await.map_err(source_failure)?;
        let company = ensure_success(response)
            .await?
            .json::<StartupCompany>()
            .await
            .map_err(source_failure)?;
        Ok(company)
    }
}

#[async_trait]
impl JobSource for ScraperClient {
    #[instrument(skip(self, request), fields(sites = ?request.site_names))]
    async fn fetch(&self, request: &ScrapeRequest) -> Result<Vec<IngestBatch>> {
        let mut batches = Vec::new();

        if !request.job_board_sites().is_empty() {
            let rows = self.fetch_job_board(request).await?;
            batches.push(IngestBatch::JobBoard(rows));
        }

        if request.wants_startup_directory() {
            let name = request.company_name.as_deref().unwrap_or_default();
            let company = self.fetch_company(name).await?;
            batches.push(IngestBatch::StartupDirectory(vec![company]));
        }

        Ok(batches)
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    warn!(%status, "Scraper returned an error response");
    Err(Error::Source(format!("{} {}", status, body)))
}

fn source_failure(err: reqwest::Error) -> Error {
    Error::Source(err.to_string())
}
