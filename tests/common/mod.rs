#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use job_aggregator::{
    dto::job_dto::JobListQuery,
    error::{Error, Result},
    models::job::{Column, ColumnValue, JobRecord, StoredJob},
    services::job_store::{JobPage, JobStore, JobTransaction},
};

#[derive(Default)]
struct Tables {
    rows: Vec<StoredJob>,
    next_id: i64,
}

/// Keeps committed rows in memory. Inserts for URLs in `fail_urls` error out
/// the way a constraint violation would; `fail_begin` and `fail_commit` act
/// like a lost connection.
#[derive(Clone, Default)]
pub struct MemoryJobStore {
    tables: Arc<Mutex<Tables>>,
    fail_urls: Arc<HashSet<String>>,
    fail_begin: bool,
    fail_commit: bool,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(urls: &[&str]) -> Self {
        Self {
            tables: Arc::default(),
            fail_urls: Arc::new(urls.iter().map(|u| u.to_string()).collect()),
            ..Self::default()
        }
    }

    pub fn failing_begin() -> Self {
        Self {
            fail_begin: true,
            ..Self::default()
        }
    }

    pub fn failing_commit() -> Self {
        Self {
            fail_commit: true,
            ..Self::default()
        }
    }

    pub fn rows(&self) -> Vec<StoredJob> {
        self.tables.lock().unwrap().rows.clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.rows().into_iter().map(|r| r.job.job_url).collect()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn begin(&self) -> Result<Box<dyn JobTransaction>> {
        if self.fail_begin {
            return Err(Error::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(Box::new(MemoryTransaction {
            tables: self.tables.clone(),
            fail_urls: self.fail_urls.clone(),
            fail_commit: self.fail_commit,
            pending: Vec::new(),
        }))
    }

    async fn list(&self, query: &JobListQuery) -> Result<JobPage> {
        let needle = query.search.as_ref().map(|s| s.to_lowercase());
        let matches = |job: &JobRecord| match &needle {
            None => true,
            Some(n) => [&job.title, &job.company, &job.location]
                .iter()
                .any(|f| f.as_deref().map(|v| v.to_lowercase().contains(n)).unwrap_or(false)),
        };

        let filtered: Vec<StoredJob> = self
            .rows()
            .into_iter()
            .filter(|r| matches(&r.job))
            .collect();
        let total = filtered.len() as i64;
        let items = filtered
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit() as usize)
            .collect();
        Ok(JobPage { items, total })
    }
}

struct MemoryTransaction {
    tables: Arc<Mutex<Tables>>,
    fail_urls: Arc<HashSet<String>>,
    fail_commit: bool,
    pending: Vec<JobRecord>,
}

#[async_trait]
impl JobTransaction for MemoryTransaction {
    async fn exists_by_url(&mut self, job_url: &str) -> Result<bool> {
        let committed = self
            .tables
            .lock()
            .unwrap()
            .rows
            .iter()
            .any(|r| r.job.job_url == job_url);
        Ok(committed || self.pending.iter().any(|j| j.job_url == job_url))
    }

    async fn insert(&mut self, columns: &[Column]) -> Result<()> {
        let url = columns.iter().find_map(|c| match (&c.value, c.name) {
            (ColumnValue::Text(v), "job_url") => Some(v.clone()),
            _ => None,
        });
        if let Some(url) = &url {
            if self.fail_urls.contains(url) {
                return Err(Error::Internal(format!("value too long for {}", url)));
            }
        }
        self.pending.push(JobRecord::from_columns(columns.to_vec()));
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        if self.fail_commit {
            self.pending.clear();
            return Err(Error::Database(sqlx::Error::WorkerCrashed));
        }
        let mut tables = self.tables.lock().unwrap();
        for job in self.pending.drain(..) {
            tables.next_id += 1;
            let id = tables.next_id;
            tables.rows.push(StoredJob { id, job });
        }
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.pending.clear();
        Ok(())
    }
}
