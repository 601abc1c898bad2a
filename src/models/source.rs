use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// A scraped or pushed row: arbitrary keys, loosely typed values.
pub type RawRecord = Map<String, JsonValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    JobBoard,
    StartupDirectory,
    Canonical,
}

impl SourceKind {
    /// Prefix used for identifiers derived from the job URL.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            SourceKind::StartupDirectory => "yc",
            SourceKind::JobBoard | SourceKind::Canonical => "js",
        }
    }

    pub fn default_site(&self) -> &'static str {
        match self {
            SourceKind::StartupDirectory => "ycombinator",
            SourceKind::JobBoard | SourceKind::Canonical => "jobspy",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StartupJob {
    pub job_url: Option<String>,
    pub job_title: Option<String>,
    pub job_description: Option<String>,
    pub job_salary_range: Option<String>,
    pub job_tags: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StartupCompany {
    pub company_name: Option<String>,
    pub company_description: Option<String>,
    pub company_url: Option<String>,
    pub company_image: Option<String>,
    pub company_social_links: Vec<String>,
    pub company_tags: Vec<String>,
    pub job_data: Vec<StartupJob>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "source_kind", content = "records", rename_all = "snake_case")]
pub enum IngestBatch {
    JobBoard(Vec<RawRecord>),
    StartupDirectory(Vec<StartupCompany>),
    Canonical(Vec<RawRecord>),
}

impl IngestBatch {
    pub fn kind(&self) -> SourceKind {
        match self {
            IngestBatch::JobBoard(_) => SourceKind::JobBoard,
            IngestBatch::StartupDirectory(_) => SourceKind::StartupDirectory,
            IngestBatch::Canonical(_) => SourceKind::Canonical,
        }
    }
}
