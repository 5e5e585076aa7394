// src/storage/postgres.rs
use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder, Row};

use crate::extractors::LongRecord;
use crate::storage::RECORD_COLUMNS;
use crate::utils::error::StorageError;

// 6 bind parameters per row; Postgres caps a statement at 65535.
const INSERT_CHUNK_ROWS: usize = 1000;

static TABLE_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$").expect("Failed to compile TABLE_NAME_RE")
});

/// Writes the long-format table into PostgreSQL.
pub struct PostgresSink {
    pool: PgPool,
}

impl PostgresSink {
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect(database_url)
            .await?;
        tracing::debug!("Connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// `SELECT version()`, used as a connectivity check.
    pub async fn server_version(&self) -> Result<String, StorageError> {
        let row = sqlx::query("SELECT version()").fetch_one(&self.pool).await?;
        Ok(row.try_get::<String, _>(0)?)
    }

    /// Replaces the full contents of `table` with `records`.
    ///
    /// The table is dropped and recreated inside one transaction, so readers
    /// see either the old table or the complete new one.
    pub async fn replace_table(&self, table: &str, records: &[LongRecord]) -> Result<u64, StorageError> {
        validate_table_name(table)?;

        let mut tx = self.pool.begin().await?;
        sqlx::query(&format!("DROP TABLE IF EXISTS \"{}\"", table))
            .execute(&mut *tx)
            .await?;
        sqlx::query(&create_table_sql(table)).execute(&mut *tx).await?;

        let mut inserted = 0;
        for chunk in records.chunks(INSERT_CHUNK_ROWS) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(insert_prefix(table));
            builder.push_values(chunk, |mut row, record| {
                row.push_bind(record.sheet_name.clone())
                    .push_bind(record.table_name.clone())
                    .push_bind(record.region.clone())
                    .push_bind(record.period.clone())
                    .push_bind(record.value)
                    .push_bind(record.is_heading_total);
            });
            inserted += builder.build().execute(&mut *tx).await?.rows_affected();
        }

        tx.commit().await?;
        tracing::info!("Replaced table \"{}\" with {} rows", table, inserted);
        Ok(inserted)
    }
}

pub fn validate_table_name(table: &str) -> Result<(), StorageError> {
    if TABLE_NAME_RE.is_match(table) {
        Ok(())
    } else {
        Err(StorageError::InvalidTable(table.to_string()))
    }
}

fn create_table_sql(table: &str) -> String {
    format!(
        "CREATE TABLE \"{}\" (\
         sheet_name TEXT, \
         table_name TEXT, \
         region TEXT, \
         period TEXT, \
         value DOUBLE PRECISION, \
         is_heading_total BOOLEAN)",
        table
    )
}

fn insert_prefix(table: &str) -> String {
    format!("INSERT INTO \"{}\" ({}) ", table, RECORD_COLUMNS.join(", "))
}
