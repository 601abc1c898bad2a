use async_trait::async_trait;
use sqlx::postgres::{PgRow, Postgres};
use sqlx::{PgPool, Row, Transaction};
use tracing::info;

use crate::config::validate_identifier;
use crate::dto::job_dto::JobListQuery;
use crate::error::{Error, Result};
use crate::models::job::{Column, ColumnType, ColumnValue, JobRecord, StoredJob, JOB_COLUMNS};

pub struct JobPage {
    pub items: Vec<StoredJob>,
    pub total: i64,
}

/// One short-lived unit of work. Dropping it without `commit` discards
/// everything it wrote.
#[async_trait]
pub trait JobTransaction: Send {
    async fn exists_by_url(&mut self, job_url: &str) -> Result<bool>;
    async fn insert(&mut self, columns: &[Column]) -> Result<()>;
    async fn commit(&mut self) -> Result<()>;
    async fn rollback(&mut self) -> Result<()>;
}

#[async_trait]
pub trait JobStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn JobTransaction>>;
    async fn list(&self, query: &JobListQuery) -> Result<JobPage>;
}

#[derive(Clone)]
pub struct PgJobStore {
    pool: PgPool,
    table: String,
}

impl PgJobStore {
    pub fn new(pool: PgPool, table: impl Into<String>) -> Result<Self> {
        let table = table.into();
        validate_identifier(&table)?;
        Ok(Self { pool, table })
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        let columns = JOB_COLUMNS
            .iter()
            .map(|(name, ty)| format!("{} {}", name, ty.sql()))
            .collect::<Vec<_>>()
            .join(",\n                ");
        let create_table = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                id BIGSERIAL PRIMARY KEY,
                {columns}
            )
            "#,
            table = self.table,
            columns = columns,
        );
        sqlx::query(&create_table).execute(&self.pool).await?;

        // Lookup index only; duplicates are kept out by the ingest path.
        let create_index = format!(
            "CREATE INDEX IF NOT EXISTS idx_{table}_job_url ON {table} (job_url)",
            table = self.table
        );
        sqlx::query(&create_index).execute(&self.pool).await?;

        info!(table = %self.table, "Jobs table is ready");
        Ok(())
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn begin(&self) -> Result<Box<dyn JobTransaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgJobTransaction {
            tx: Some(tx),
            table: self.table.clone(),
        }))
    }

    async fn list(&self, query: &JobListQuery) -> Result<JobPage> {
        let limit = query.limit();
        let offset = query.offset();

        let where_clause = if query.search.is_some() {
            "WHERE title ILIKE $1 OR company ILIKE $1 OR location ILIKE $1"
        } else {
            ""
        };
        let pattern = query.search.as_ref().map(|s| format!("%{}%", s));
        let (limit_arg, offset_arg) = if pattern.is_some() { (2, 3) } else { (1, 2) };

        let column_list = JOB_COLUMNS
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(", ");
        let items_query = format!(
            "SELECT id, {} FROM {} {} ORDER BY id LIMIT ${} OFFSET ${}",
            column_list, self.table, where_clause, limit_arg, offset_arg
        );
        let total_query = format!("SELECT COUNT(*) FROM {} {}", self.table, where_clause);

        let mut items_statement = sqlx::query(&items_query);
        if let Some(p) = &pattern {
            items_statement = items_statement.bind(p);
        }
        let rows = items_statement
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let mut total_statement = sqlx::query_scalar::<_, i64>(&total_query);
        if let Some(p) = &pattern {
            total_statement = total_statement.bind(p);
        }
        let total = total_statement.fetch_one(&self.pool).await?;

        let items = rows
            .iter()
            .map(row_to_stored_job)
            .collect::<Result<Vec<_>>>()?;

        Ok(JobPage { items, total })
    }
}

fn row_to_stored_job(row: &PgRow) -> Result<StoredJob> {
    let mut columns = Vec::with_capacity(JOB_COLUMNS.len());
    for (name, ty) in JOB_COLUMNS {
        let value = match ty {
            ColumnType::Text => row.try_get::<Option<String>, _>(*name)?.map(ColumnValue::Text),
            ColumnType::Timestamp => row
                .try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(*name)?
                .map(ColumnValue::Timestamp),
            ColumnType::Numeric => row
                .try_get::<Option<rust_decimal::Decimal>, _>(*name)?
                .map(ColumnValue::Numeric),
            ColumnType::Boolean => row.try_get::<Option<bool>, _>(*name)?.map(ColumnValue::Boolean),
            ColumnType::Integer => row.try_get::<Option<i32>, _>(*name)?.map(ColumnValue::Integer),
        };
        if let Some(value) = value {
            columns.push(Column { name: *name, value });
        }
    }
    Ok(StoredJob {
        id: row.try_get("id")?,
        job: JobRecord::from_columns(columns),
    })
}

pub struct PgJobTransaction {
    tx: Option<Transaction<'static, Postgres>>,
    table: String,
}

impl PgJobTransaction {
    fn tx(&mut self) -> Result<&mut Transaction<'static, Postgres>> {
        self.tx
            .as_mut()
            .ok_or_else(|| Error::Internal("Transaction already finished".to_string()))
    }
}

#[async_trait]
impl JobTransaction for PgJobTransaction {
    async fn exists_by_url(&mut self, job_url: &str) -> Result<bool> {
        let query = format!("SELECT 1 FROM {} WHERE job_url = $1 LIMIT 1", self.table);
        let tx = self.tx()?;

        // Held until commit/rollback, so concurrent ingests of one URL
        // cannot both pass the existence check.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(job_url)
            .execute(&mut **tx)
            .await?;

        let found = sqlx::query(&query)
            .bind(job_url)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(found.is_some())
    }

    async fn insert(&mut self, columns: &[Column]) -> Result<()> {
        if columns.is_empty() {
            return Err(Error::BadRequest("Nothing to insert".to_string()));
        }
        let names = columns.iter().map(|c| c.name).collect::<Vec<_>>().join(", ");
        let placeholders = (1..=columns.len())
            .map(|i| format!("${}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table, names, placeholders
        );

        let mut statement = sqlx::query(&sql);
        for column in columns {
            statement = match &column.value {
                ColumnValue::Text(v) => statement.bind(v),
                ColumnValue::Timestamp(v) => statement.bind(v),
                ColumnValue::Numeric(v) => statement.bind(v),
                ColumnValue::Boolean(v) => statement.bind(v),
                ColumnValue::Integer(v) => statement.bind(v),
            };
        }

        let tx = self.tx()?;
        statement.execute(&mut **tx).await?;
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            tx.commit().await?;
        }
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            tx.rollback().await?;
        }
        Ok(())
    }
}
