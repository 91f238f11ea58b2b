//! Database operations for OCR results.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use partshed_core::{ItemId, OcrResultId};

use super::RepositoryError;
use crate::models::OcrResult;

/// Internal row type for OCR result queries.
#[derive(Debug, sqlx::FromRow)]
struct OcrResultRow {
    id: i32,
    item_id: i32,
    raw_text: Option<String>,
    processed_text: Option<String>,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<OcrResultRow> for OcrResult {
    fn from(row: OcrResultRow) -> Self {
        Self {
            id: OcrResultId::new(row.id),
            item_id: ItemId::new(row.item_id),
            raw_text: row.raw_text,
            processed_text: row.processed_text,
            image_url: row.image_url,
            created_at: row.created_at,
        }
    }
}

/// Repository for OCR result database operations.
pub struct OcrResultRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OcrResultRepository<'a> {
    /// Create a new OCR result repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Attach extracted text to an item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(
        &self,
        item_id: ItemId,
        raw_text: Option<&str>,
        processed_text: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<OcrResult, RepositoryError> {
        let row: OcrResultRow = sqlx::query_as(
            r"
            INSERT INTO ocr_results (item_id, raw_text, processed_text, image_url)
            VALUES ($1, $2, $3, $4)
            RETURNING id, item_id, raw_text, processed_text, image_url, created_at
            ",
        )
        .bind(item_id.as_i32())
        .bind(raw_text)
        .bind(processed_text)
        .bind(image_url)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// List an item's OCR results, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_item(&self, item_id: ItemId) -> Result<Vec<OcrResult>, RepositoryError> {
        let rows: Vec<OcrResultRow> = sqlx::query_as(
            r"
            SELECT id, item_id, raw_text, processed_text, image_url, created_at
            FROM ocr_results
            WHERE item_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(item_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Delete an OCR result.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the result does not exist, or
    /// `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: OcrResultId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM ocr_results WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
