use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::job::{JobRecord, StoredJob};
use crate::services::ingest_service::IngestSummary;
use crate::services::job_store::JobPage;

pub const STARTUP_SITE: &str = "ycombinator";

#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate)]
#[serde(default)]
pub struct JobListQuery {
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<i64>,
    #[validate(range(min = 0))]
    pub offset: Option<i64>,
    pub search: Option<String>,
}

impl JobListQuery {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(100).clamp(1, 1000)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobListResponse {
    pub status: String,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub data: Vec<StoredJob>,
}

impl JobListResponse {
    pub fn from_page(page: JobPage, query: &JobListQuery) -> Self {
        Self {
            status: "success".to_string(),
            total: page.total,
            limit: query.limit(),
            offset: query.offset(),
            data: page.items,
        }
    }
}

fn default_site_names() -> Vec<String> {
    vec!["indeed".into(), "linkedin".into(), "google".into()]
}

fn default_results_wanted() -> u32 {
    100
}

fn default_hours_old() -> u32 {
    72
}

fn default_country() -> String {
    "usa".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScrapeRequest {
    #[serde(default = "default_site_names")]
    #[validate(length(min = 1))]
    pub site_names: Vec<String>,
    #[serde(default)]
    pub search_term: Option<String>,
    #[serde(default)]
    pub google_search_term: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default = "default_results_wanted")]
    #[validate(range(min = 1, max = 1000))]
    pub results_wanted: u32,
    #[serde(default = "default_hours_old")]
    pub hours_old: u32,
    #[serde(default = "default_country")]
    pub country_indeed: String,
    #[serde(default = "default_true")]
    pub linkedin_fetch_description: bool,
    #[serde(default)]
    pub save_to_db: bool,
    #[serde(default)]
    pub company_name: Option<String>,
}

impl ScrapeRequest {
    pub fn wants_startup_directory(&self) -> bool {
        self.site_names.iter().any(|s| s == STARTUP_SITE)
    }

    /// Job-board sites, i.e. everything except the startup directory.
    pub fn job_board_sites(&self) -> Vec<String> {
        self.site_names
            .iter()
            .filter(|s| s.as_str() != STARTUP_SITE)
            .cloned()
            .collect()
    }

    pub fn effective_google_search_term(&self) -> String {
        match (&self.google_search_term, &self.search_term) {
            (Some(term), _) if !term.trim().is_empty() => term.clone(),
            (_, Some(search)) => format!("{} jobs", search),
            _ => String::new(),
        }
    }

    /// Field rules that depend on which sites were requested.
    pub fn check_required_fields(&self) -> std::result::Result<(), String> {
        let blank = |v: &Option<String>| v.as_deref().map(str::trim).unwrap_or("").is_empty();
        if !self.wants_startup_directory() {
            if blank(&self.search_term) {
                return Err("search_term is required".to_string());
            }
            if blank(&self.location) {
                return Err("location is required".to_string());
            }
        } else if blank(&self.company_name) {
            return Err("company_name is required for YCombinator scraping".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeResponse {
    pub status: String,
    pub jobs_found: usize,
    pub jobs_data: Vec<JobRecord>,
    pub db_result: Option<IngestSummary>,
}
