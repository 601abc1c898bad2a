use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SalaryInterval {
    Yearly,
    Monthly,
    Weekly,
    Daily,
    Hourly,
}

impl SalaryInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            SalaryInterval::Yearly => "yearly",
            SalaryInterval::Monthly => "monthly",
            SalaryInterval::Weekly => "weekly",
            SalaryInterval::Daily => "daily",
            SalaryInterval::Hourly => "hourly",
        }
    }

    /// Lenient parse; unknown spellings yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "yearly" | "annual" | "annually" | "year" => Some(SalaryInterval::Yearly),
            "monthly" | "month" => Some(SalaryInterval::Monthly),
            "weekly" | "week" => Some(SalaryInterval::Weekly),
            "daily" | "day" => Some(SalaryInterval::Daily),
            "hourly" | "hour" => Some(SalaryInterval::Hourly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Salary {
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    pub currency: Option<String>,
    pub interval: Option<SalaryInterval>,
    pub source: Option<String>,
}

/// The normalized job posting every source is mapped into.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobRecord {
    pub job_id: Option<String>,
    pub site: Option<String>,
    pub job_url: String,
    pub job_url_direct: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub date_posted: Option<DateTime<Utc>>,
    pub job_type: Option<String>,
    pub salary: Salary,
    pub is_remote: Option<bool>,
    pub job_level: Option<String>,
    pub job_function: Option<String>,
    pub listing_type: Option<String>,
    pub emails: Option<String>,
    pub description: Option<String>,
    pub company_industry: Option<String>,
    pub company_url: Option<String>,
    pub company_logo: Option<String>,
    pub company_url_direct: Option<String>,
    pub company_addresses: Option<String>,
    pub company_num_employees: Option<String>,
    pub company_revenue: Option<String>,
    pub company_description: Option<String>,
    pub company_rating: Option<Decimal>,
    pub company_reviews_count: Option<i32>,
    pub skills: Option<String>,
    pub experience_range: Option<String>,
    pub vacancy_count: Option<i32>,
    pub work_from_home_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Timestamp,
    Numeric,
    Boolean,
    Integer,
}

impl ColumnType {
    pub fn sql(&self) -> &'static str {
        match self {
            ColumnType::Text => "TEXT",
            ColumnType::Timestamp => "TIMESTAMPTZ",
            ColumnType::Numeric => "NUMERIC",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Integer => "INTEGER",
        }
    }
}

/// Storage columns in table order. The surrogate `id` is not listed.
pub const JOB_COLUMNS: &[(&str, ColumnType)] = &[
    ("job_id", ColumnType::Text),
    ("site", ColumnType::Text),
    ("job_url", ColumnType::Text),
    ("job_url_direct", ColumnType::Text),
    ("title", ColumnType::Text),
    ("company", ColumnType::Text),
    ("location", ColumnType::Text),
    ("date_posted", ColumnType::Timestamp),
    ("job_type", ColumnType::Text),
    ("salary_source", ColumnType::Text),
    ("interval", ColumnType::Text),
    ("min_amount", ColumnType::Numeric),
    ("max_amount", ColumnType::Numeric),
    ("currency", ColumnType::Text),
    ("is_remote", ColumnType::Boolean),
    ("job_level", ColumnType::Text),
    ("job_function", ColumnType::Text),
    ("listing_type", ColumnType::Text),
    ("emails", ColumnType::Text),
    ("description", ColumnType::Text),
    ("company_industry", ColumnType::Text),
    ("company_url", ColumnType::Text),
    ("company_logo", ColumnType::Text),
    ("company_url_direct", ColumnType::Text),
    ("company_addresses", ColumnType::Text),
    ("company_num_employees", ColumnType::Text),
    ("company_revenue", ColumnType::Text),
    ("company_description", ColumnType::Text),
    ("skills", ColumnType::Text),
    ("experience_range", ColumnType::Text),
    ("company_rating", ColumnType::Numeric),
    ("company_reviews_count", ColumnType::Integer),
    ("vacancy_count", ColumnType::Integer),
    ("work_from_home_type", ColumnType::Text),
];

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Text(String),
    Timestamp(DateTime<Utc>),
    Numeric(Decimal),
    Boolean(bool),
    Integer(i32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: &'static str,
    pub value: ColumnValue,
}

impl JobRecord {
    /// Non-null columns of this record, in `JOB_COLUMNS` order.
    pub fn columns(&self) -> Vec<Column> {
        let mut out = Vec::with_capacity(JOB_COLUMNS.len());
        let mut push = |name: &'static str, value: Option<ColumnValue>| {
            if let Some(value) = value {
                out.push(Column { name, value });
            }
        };
        let text = |v: &Option<String>| v.clone().map(ColumnValue::Text);

        push("job_id", text(&self.job_id));
        push("site", text(&self.site));
        push(
            "job_url",
            Some(self.job_url.clone())
                .filter(|u| !u.is_empty())
                .map(ColumnValue::Text),
        );
        push("job_url_direct", text(&self.job_url_direct));
        push("title", text(&self.title));
        push("company", text(&self.company));
        push("location", text(&self.location));
        push("date_posted", self.date_posted.map(ColumnValue::Timestamp));
        push("job_type", text(&self.job_type));
        push("salary_source", text(&self.salary.source));
        push(
            "interval",
            self.salary
                .interval
                .map(|i| ColumnValue::Text(i.as_str().to_string())),
        );
        push("min_amount", self.salary.min_amount.map(ColumnValue::Numeric));
        push("max_amount", self.salary.max_amount.map(ColumnValue::Numeric));
        push("currency", text(&self.salary.currency));
        push("is_remote", self.is_remote.map(ColumnValue::Boolean));
        push("job_level", text(&self.job_level));
        push("job_function", text(&self.job_function));
        push("listing_type", text(&self.listing_type));
        push("emails", text(&self.emails));
        push("description", text(&self.description));
        push("company_industry", text(&self.company_industry));
        push("company_url", text(&self.company_url));
        push("company_logo", text(&self.company_logo));
        push("company_url_direct", text(&self.company_url_direct));
        push("company_addresses", text(&self.company_addresses));
        push("company_num_employees", text(&self.company_num_employees));
        push("company_revenue", text(&self.company_revenue));
        push("company_description", text(&self.company_description));
        push("skills", text(&self.skills));
        push("experience_range", text(&self.experience_range));
        push("company_rating", self.company_rating.map(ColumnValue::Numeric));
        push(
            "company_reviews_count",
            self.company_reviews_count.map(ColumnValue::Integer),
        );
        push("vacancy_count", self.vacancy_count.map(ColumnValue::Integer));
        push("work_from_home_type", text(&self.work_from_home_type));
        out
    }

    /// Rebuilds a record from stored columns. Columns of an unexpected
    /// type are ignored.
    pub fn from_columns(columns: Vec<Column>) -> Self {
        let mut job = JobRecord::default();
        for Column { name, value } in columns {
            match value {
                ColumnValue::Text(s) => {
                    let slot = match name {
                        "job_id" => &mut job.job_id,
                        "site" => &mut job.site,
                        "job_url" => {
                            job.job_url = s;
                            continue;
                        }
                        "interval" => {
                            job.salary.interval = SalaryInterval::parse(&s);
                            continue;
                        }
                        "job_url_direct" => &mut job.job_url_direct,
                        "title" => &mut job.title,
                        "company" => &mut job.company,
                        "location" => &mut job.location,
                        "job_type" => &mut job.job_type,
                        "salary_source" => &mut job.salary.source,
                        "currency" => &mut job.salary.currency,
                        "job_level" => &mut job.job_level,
                        "job_function" => &mut job.job_function,
                        "listing_type" => &mut job.listing_type,
                        "emails" => &mut job.emails,
                        "description" => &mut job.description,
                        "company_industry" => &mut job.company_industry,
                        "company_url" => &mut job.company_url,
                        "company_logo" => &mut job.company_logo,
                        "company_url_direct" => &mut job.company_url_direct,
                        "company_addresses" => &mut job.company_addresses,
                        "company_num_employees" => &mut job.company_num_employees,
                        "company_revenue" => &mut job.company_revenue,
                        "company_description" => &mut job.company_description,
                        "skills" => &mut job.skills,
                        "experience_range" => &mut job.experience_range,
                        "work_from_home_type" => &mut job.work_from_home_type,
                        _ => continue,
                    };
                    *slot = Some(s);
                }
                ColumnValue::Timestamp(ts) if name == "date_posted" => job.date_posted = Some(ts),
                ColumnValue::Numeric(d) => match name {
                    "min_amount" => job.salary.min_amount = Some(d),
                    "max_amount" => job.salary.max_amount = Some(d),
                    "company_rating" => job.company_rating = Some(d),
                    _ => {}
                },
                ColumnValue::Boolean(b) if name == "is_remote" => job.is_remote = Some(b),
                ColumnValue::Integer(n) => match name {
                    "company_reviews_count" => job.company_reviews_count = Some(n),
                    "vacancy_count" => job.vacancy_count = Some(n),
                    _ => {}
                },
                _ => {}
            }
        }
        job
    }
}

/// A persisted row: the canonical record plus its surrogate key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredJob {
    pub id: i64,
    #[serde(flatten)]
    pub job: JobRecord,
}
