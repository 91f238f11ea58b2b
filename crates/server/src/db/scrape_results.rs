//! Database operations for scrape results.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;

use partshed_core::{ItemId, ScrapeResultId};

use super::RepositoryError;
use crate::models::ScrapeResult;

/// Internal row type for scrape result queries.
#[derive(Debug, sqlx::FromRow)]
struct ScrapeResultRow {
    id: i32,
    item_id: i32,
    source_url: Option<String>,
    scraped_data: Value,
    created_at: DateTime<Utc>,
}

impl From<ScrapeResultRow> for ScrapeResult {
    fn from(row: ScrapeResultRow) -> Self {
        Self {
            id: ScrapeResultId::new(row.id),
            item_id: ItemId::new(row.item_id),
            source_url: row.source_url,
            scraped_data: row.scraped_data,
            created_at: row.created_at,
        }
    }
}

/// Repository for scrape result database operations.
pub struct ScrapeResultRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ScrapeResultRepository<'a> {
    /// Create a new scrape result repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist one scraped payload against an item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(
        &self,
        item_id: ItemId,
        source_url: Option<&str>,
        scraped_data: &Value,
    ) -> Result<ScrapeResult, RepositoryError> {
        let row: ScrapeResultRow = sqlx::query_as(
            r"
            INSERT INTO scrape_results (item_id, source_url, scraped_data)
            VALUES ($1, $2, $3)
            RETURNING id, item_id, source_url, scraped_data, created_at
            ",
        )
        .bind(item_id.as_i32())
        .bind(source_url)
        .bind(scraped_data)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Get a scrape result by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ScrapeResultId) -> Result<Option<ScrapeResult>, RepositoryError> {
        let row: Option<ScrapeResultRow> = sqlx::query_as(
            r"
            SELECT id, item_id, source_url, scraped_data, created_at
            FROM scrape_results
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// List an item's scrape results, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_item(
        &self,
        item_id: ItemId,
    ) -> Result<Vec<ScrapeResult>, RepositoryError> {
        let rows: Vec<ScrapeResultRow> = sqlx::query_as(
            r"
            SELECT id, item_id, source_url, scraped_data, created_at
            FROM scrape_results
            WHERE item_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(item_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Delete a scrape result.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the result does not exist, or
    /// `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: ScrapeResultId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM scrape_results WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
