use std::{fs, path::Path, str::FromStr};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};

use shared::domain::Taxpayer;

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

/// A taxpayer row as persisted, including the server-side registration
/// timestamp that fixes the listing order.
#[derive(Debug, Clone)]
pub struct StoredTaxpayer {
    pub record: Taxpayer,
    pub created_at: DateTime<Utc>,
}

/// Outcome of an insert attempt. A duplicate tid is an expected condition,
/// not a query failure, so it is reported as data rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    DuplicateTid,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    /// All taxpayers in registration order.
    pub async fn list_taxpayers(&self) -> Result<Vec<StoredTaxpayer>> {
        let rows = sqlx::query(
            "SELECT tid, first_name, last_name, address, created_at
             FROM taxpayers ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(stored_taxpayer_from_row).collect()
    }

    /// Inserts a taxpayer; the tid column carries a UNIQUE constraint, so a
    /// key collision surfaces as `InsertOutcome::DuplicateTid`.
    pub async fn insert_taxpayer(&self, record: &Taxpayer) -> Result<InsertOutcome> {
        let result = sqlx::query(
            "INSERT INTO taxpayers (tid, first_name, last_name, address, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&record.tid)
        .bind(&record.first_name)
        .bind(&record.last_name)
        .bind(&record.address)
        .bind(Utc::now())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(InsertOutcome::Inserted),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Ok(InsertOutcome::DuplicateTid)
            }
            Err(err) => Err(err).context("failed to insert taxpayer"),
        }
    }

    pub async fn find_taxpayer_by_tid(&self, tid: &str) -> Result<Option<StoredTaxpayer>> {
        let row = sqlx::query(
            "SELECT tid, first_name, last_name, address, created_at
             FROM taxpayers WHERE tid = ?1",
        )
        .bind(tid)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(stored_taxpayer_from_row).transpose()
    }
}

fn stored_taxpayer_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<StoredTaxpayer> {
    Ok(StoredTaxpayer {
        record: Taxpayer {
            tid: row.try_get("tid")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            address: row.try_get("address")?,
        },
        created_at: row.try_get("created_at")?,
    })
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return Ok(());
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();
    if path.is_empty() {
        return Ok(());
    }

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!(
                    "failed to create parent directory '{}' for database url '{database_url}'",
                    parent.display()
                )
            })?;
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
