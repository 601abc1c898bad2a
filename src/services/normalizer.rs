use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::models::job::{JobRecord, Salary, SalaryInterval};
use crate::models::source::{IngestBatch, RawRecord, SourceKind, StartupCompany, StartupJob};
use crate::services::identity;
use crate::services::salary_parser::parse_salary_range;
use crate::services::tag_classifier::{classify_company_tags, classify_job_tags, CompanyTags};

const STARTUP_SALARY_SOURCE: &str = "ycombinator";

/// A source row that cannot become a job record because it has no URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingUrl {
    pub title: Option<String>,
}

pub type Normalized = std::result::Result<JobRecord, MissingUrl>;

pub fn normalize_batch(batch: IngestBatch) -> Vec<Normalized> {
    let kind = batch.kind();
    match batch {
        IngestBatch::JobBoard(rows) => rows
            .into_iter()
            .map(|raw| normalize_job_board(raw, kind))
            .collect(),
        IngestBatch::StartupDirectory(companies) => companies
            .iter()
            .flat_map(normalize_startup_company)
            .collect(),
        IngestBatch::Canonical(rows) => rows
            .into_iter()
            .map(|raw| normalize_canonical(raw, kind))
            .collect(),
    }
}

pub fn normalize_job_board(mut raw: RawRecord, kind: SourceKind) -> Normalized {
    identity::promote_generic_id(&mut raw);

    let title = text(&raw, "title");
    let Some(job_url) = text(&raw, "job_url") else {
        return Err(MissingUrl { title });
    };

    Ok(JobRecord {
        job_id: text(&raw, "job_id"),
        site: text(&raw, "site").or_else(|| Some(kind.default_site().to_string())),
        job_url,
        job_url_direct: text(&raw, "job_url_direct"),
        title,
        company: text(&raw, "company"),
        location: text(&raw, "location"),
        date_posted: timestamp(&raw, "date_posted"),
        job_type: text(&raw, "job_type"),
        salary: Salary {
            min_amount: decimal(&raw, "min_amount"),
            max_amount: decimal(&raw, "max_amount"),
            currency: text(&raw, "currency"),
            interval: interval(&raw),
            source: text(&raw, "salary_source"),
        },
        is_remote: boolean(&raw, "is_remote"),
        job_level: text(&raw, "job_level"),
        job_function: text(&raw, "job_function"),
        listing_type: text(&raw, "listing_type"),
        emails: text(&raw, "emails"),
        description: text(&raw, "description"),
        company_industry: text(&raw, "company_industry"),
        company_url: text(&raw, "company_url"),
        company_logo: text(&raw, "company_logo"),
        company_url_direct: text(&raw, "company_url_direct"),
        company_addresses: text(&raw, "company_addresses"),
        company_num_employees: text(&raw, "company_num_employees"),
        company_revenue: text(&raw, "company_revenue"),
        company_description: text(&raw, "company_description"),
        company_rating: decimal(&raw, "company_rating"),
        company_reviews_count: integer(&raw, "company_reviews_count"),
        skills: text(&raw, "skills"),
        experience_range: text(&raw, "experience_range"),
        vacancy_count: integer(&raw, "vacancy_count"),
        work_from_home_type: text(&raw, "work_from_home_type"),
    })
}

/// One record per job listed under the company. The vacancy count is the
/// number of jobs the company has in this batch.
pub fn normalize_startup_company(company: &StartupCompany) -> Vec<Normalized> {
    let company_tags = classify_company_tags(&company.company_tags);
    let company_url = company
        .company_social_links
        .iter()
        .find(|link| {
            link.contains("https://") && !link.contains("twitter") && !link.contains("facebook")
        })
        .cloned();
    let vacancy_count = i32::try_from(company.job_data.len()).ok();

    company
        .job_data
        .iter()
        .map(|job| {
            normalize_startup_job(company, job, &company_tags, company_url.clone(), vacancy_count)
        })
        .collect()
}

fn normalize_startup_job(
    company: &StartupCompany,
    job: &StartupJob,
    company_tags: &CompanyTags,
    company_url: Option<String>,
    vacancy_count: Option<i32>,
) -> Normalized {
    let title = non_empty(job.job_title.as_deref());
    let Some(job_url) = non_empty(job.job_url.as_deref()) else {
        return Err(MissingUrl { title });
    };

    let tags = classify_job_tags(&job.job_tags);
    let mut salary = job
        .job_salary_range
        .as_deref()
        .map(parse_salary_range)
        .unwrap_or_default();
    salary.source = Some(STARTUP_SALARY_SOURCE.to_string());

    Ok(JobRecord {
        job_id: last_path_segment(&job_url),
        site: Some(SourceKind::StartupDirectory.default_site().to_string()),
        job_url_direct: Some(job_url.clone()),
        job_url,
        title,
        company: non_empty(company.company_name.as_deref()),
        location: tags.location.or_else(|| company_tags.location.clone()),
        date_posted: None,
        job_type: tags.job_type,
        salary,
        is_remote: Some(tags.is_remote),
        description: non_empty(job.job_description.as_deref()),
        company_industry: company_tags.industry.clone(),
        company_url,
        company_logo: non_empty(company.company_image.as_deref()),
        company_url_direct: non_empty(company.company_url.as_deref()),
        company_addresses: company_tags.location.clone(),
        company_num_employees: company_tags.size.clone(),
        company_description: non_empty(company.company_description.as_deref()),
        experience_range: tags.experience_range,
        vacancy_count,
        work_from_home_type: tags.is_remote.then(|| "remote".to_string()),
        ..JobRecord::default()
    })
}

/// Canonical records get the same lenient coercion as job-board rows. The
/// salary may arrive nested, the way `JobRecord` serializes it, or flat.
fn normalize_canonical(mut raw: RawRecord, kind: SourceKind) -> Normalized {
    if let Some(JsonValue::Object(salary)) = raw.remove("salary") {
        for (key, value) in salary {
            let key = match key.as_str() {
                "source" => "salary_source".to_string(),
                _ => key,
            };
            raw.entry(key).or_insert(value);
        }
    }
    normalize_job_board(raw, kind)
}

/// Text after the last `/`. A trailing slash yields nothing, which leaves
/// the id to be derived from the URL.
fn last_path_segment(job_url: &str) -> Option<String> {
    non_empty(job_url.rsplit('/').next())
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn is_null_text(s: &str) -> bool {
    s.is_empty() || ["nan", "none", "null"].contains(&s.to_ascii_lowercase().as_str())
}

fn text(raw: &RawRecord, key: &str) -> Option<String> {
    match raw.get(key)? {
        JsonValue::String(s) => {
            let s = s.trim();
            (!is_null_text(s)).then(|| s.to_string())
        }
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        JsonValue::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .filter_map(|item| match item {
                    JsonValue::String(s) if !is_null_text(s.trim()) => Some(s.trim().to_string()),
                    JsonValue::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        JsonValue::Null | JsonValue::Object(_) => None,
    }
}

fn decimal(raw: &RawRecord, key: &str) -> Option<Decimal> {
    let parsed = match raw.get(key)? {
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Some(Decimal::from(i)),
            None => n.as_f64().and_then(Decimal::from_f64),
        },
        JsonValue::String(s) if is_null_text(s.trim()) => return None,
        JsonValue::String(s) => Decimal::from_str(s.trim())
            .or_else(|_| Decimal::from_scientific(s.trim()))
            .ok(),
        JsonValue::Null => return None,
        _ => None,
    };
    if parsed.is_none() {
        debug!(field = key, value = ?raw.get(key), "Dropping non-numeric value");
    }
    parsed
}

fn integer(raw: &RawRecord, key: &str) -> Option<i32> {
    let whole = |f: f64| (f.is_finite() && f.fract() == 0.0).then_some(f as i64);
    let parsed = match raw.get(key)? {
        JsonValue::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(whole)),
        JsonValue::String(s) if is_null_text(s.trim()) => return None,
        JsonValue::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole))
        }
        JsonValue::Null => return None,
        _ => None,
    }
    .and_then(|i| i32::try_from(i).ok());
    if parsed.is_none() {
        debug!(field = key, value = ?raw.get(key), "Dropping non-integer value");
    }
    parsed
}

/// Truthy/falsy spellings accepted for boolean columns.
pub fn parse_bool_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

fn boolean(raw: &RawRecord, key: &str) -> Option<bool> {
    match raw.get(key)? {
        JsonValue::Bool(b) => Some(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        JsonValue::String(s) if is_null_text(s.trim()) => None,
        JsonValue::String(s) => {
            let parsed = parse_bool_flag(s);
            if parsed.is_none() {
                warn!(field = key, value = %s, "Unrecognized boolean spelling");
            }
            parsed
        }
        _ => None,
    }
}

fn timestamp(raw: &RawRecord, key: &str) -> Option<DateTime<Utc>> {
    let parsed = match raw.get(key)? {
        JsonValue::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        JsonValue::String(s) if is_null_text(s.trim()) => return None,
        JsonValue::String(s) => parse_timestamp(s.trim()),
        JsonValue::Null => return None,
        _ => None,
    };
    if parsed.is_none() {
        debug!(field = key, value = ?raw.get(key), "Dropping unparseable timestamp");
    }
    parsed
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn interval(raw: &RawRecord) -> Option<SalaryInterval> {
    let value = text(raw, "interval")?;
    let parsed = SalaryInterval::parse(&value);
    if parsed.is_none() {
        debug!(value = %value, "Dropping unknown salary interval");
    }
    parsed
}
