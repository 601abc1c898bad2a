use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::dto::job_dto::ScrapeRequest;
use crate::error::{Error, Result};
use crate::models::job::JobRecord;
use crate::models::source::{IngestBatch, SourceKind};
use crate::services::identity;
use crate::services::job_store::{JobStore, JobTransaction};
use crate::services::normalizer::{self, Normalized};
use crate::services::scraper_client::JobSource;

/// Rows with fewer non-null columns than this are not worth storing.
pub const MIN_PROJECTED_COLUMNS: usize = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestSummary {
    pub inserted_count: usize,
    pub skipped_count: usize,
}

impl IngestSummary {
    fn record(&mut self, outcome: &RecordOutcome) {
        match outcome {
            RecordOutcome::Inserted => self.inserted_count += 1,
            RecordOutcome::Skipped(_) | RecordOutcome::Failed(_) => self.skipped_count += 1,
        }
    }

    fn merge(&mut self, other: IngestSummary) {
        self.inserted_count += other.inserted_count;
        self.skipped_count += other.skipped_count;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingUrl,
    Duplicate,
    InsufficientData,
}

#[derive(Debug)]
pub enum RecordOutcome {
    Inserted,
    Skipped(SkipReason),
    Failed(Error),
}

pub struct ScrapeOutcome {
    pub jobs: Vec<JobRecord>,
    pub summary: Option<IngestSummary>,
}

#[derive(Clone)]
pub struct IngestService {
    store: Arc<dyn JobStore>,
}

impl IngestService {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self { store }
    }

    /// Persists every record of the batch independently. Row-level problems
    /// are counted, never returned.
    #[instrument(skip(self, batch), fields(source_kind = ?batch.kind()))]
    pub async fn ingest(&self, batch: IngestBatch) -> IngestSummary {
        let kind = batch.kind();
        self.ingest_normalized(kind, normalizer::normalize_batch(batch))
            .await
    }

    async fn ingest_normalized(&self, kind: SourceKind, records: Vec<Normalized>) -> IngestSummary {
        let mut summary = IngestSummary::default();
        for record in records {
            let outcome = match record {
                Ok(job) => self.ingest_record(job, kind).await,
                Err(missing) => {
                    info!(title = ?missing.title, "Skipping job without URL");
                    RecordOutcome::Skipped(SkipReason::MissingUrl)
                }
            };
            summary.record(&outcome);
        }
        info!(
            inserted = summary.inserted_count,
            skipped = summary.skipped_count,
            "Imported {} rows into database. Skipped {} rows.",
            summary.inserted_count,
            summary.skipped_count
        );
        summary
    }

    pub async fn ingest_record(&self, mut job: JobRecord, kind: SourceKind) -> RecordOutcome {
        if !identity::ensure_job_id(&mut job, kind.id_prefix()) {
            info!(title = ?job.title, "Skipping job without URL");
            return RecordOutcome::Skipped(SkipReason::MissingUrl);
        }

        let mut tx = match self.store.begin().await {
            Ok(tx) => tx,
            Err(err) => {
                warn!(error = %err, job_url = %job.job_url, "Could not open transaction");
                return RecordOutcome::Failed(err);
            }
        };

        match Self::apply(tx.as_mut(), &job).await {
            Ok(RecordOutcome::Inserted) => match tx.commit().await {
                Ok(()) => RecordOutcome::Inserted,
                Err(err) => {
                    warn!(error = %err, job_url = %job.job_url, "Error committing job");
                    RecordOutcome::Failed(err)
                }
            },
            Ok(outcome) => {
                if let Err(err) = tx.rollback().await {
                    warn!(error = %err, job_url = %job.job_url, "Rollback failed");
                }
                outcome
            }
            Err(err) => {
                warn!(error = %err, job_url = %job.job_url, "Error inserting job");
                if let Err(rb) = tx.rollback().await {
                    warn!(error = %rb, job_url = %job.job_url, "Rollback failed");
                }
                RecordOutcome::Failed(err)
            }
        }
    }

    async fn apply(tx: &mut dyn JobTransaction, job: &JobRecord) -> Result<RecordOutcome> {
        if tx.exists_by_url(&job.job_url).await? {
            debug!(job_url = %job.job_url, "Skipping existing job");
            return Ok(RecordOutcome::Skipped(SkipReason::Duplicate));
        }

        let columns = job.columns();
        if columns.len() < MIN_PROJECTED_COLUMNS {
            info!(title = ?job.title, "Skipping job with insufficient data");
            return Ok(RecordOutcome::Skipped(SkipReason::InsufficientData));
        }

        tx.insert(&columns).await?;
        Ok(RecordOutcome::Inserted)
    }

    /// Pulls batches from the scraper and, when asked, stores them. A scraper
    /// failure fails the whole call since there is nothing to ingest.
    #[instrument(skip(self, source, request))]
    pub async fn scrape_and_ingest(
        &self,
        source: &dyn JobSource,
        request: &ScrapeRequest,
    ) -> Result<ScrapeOutcome> {
        let batches = source.fetch(request).await?;

        let mut jobs = Vec::new();
        let mut summary = request.save_to_db.then(IngestSummary::default);

        for batch in batches {
            let kind = batch.kind();
            let normalized = normalizer::normalize_batch(batch);
            jobs.extend(normalized.iter().filter_map(|r| r.as_ref().ok().cloned()));
            info!(source_kind = ?kind, found = normalized.len(), "Scraped jobs");

            if let Some(total) = summary.as_mut() {
                total.merge(self.ingest_normalized(kind, normalized).await);
            }
        }

        Ok(ScrapeOutcome { jobs, summary })
    }
}
