//! Database operations for item images.
//!
//! This module owns the primary-image invariant: at most one image per item
//! is primary, and `items.thumbnail_url` mirrors the primary image's URL.
//! Every multi-statement maintenance path runs in a transaction.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use partshed_core::{ImageId, ItemId};

use super::RepositoryError;
use crate::models::Image;

/// Internal row type for image queries.
#[derive(Debug, sqlx::FromRow)]
struct ImageRow {
    id: i32,
    item_id: i32,
    url: String,
    is_primary: bool,
    created_at: DateTime<Utc>,
}

impl From<ImageRow> for Image {
    fn from(row: ImageRow) -> Self {
        Self {
            id: ImageId::new(row.id),
            item_id: ItemId::new(row.item_id),
            url: row.url,
            is_primary: row.is_primary,
            created_at: row.created_at,
        }
    }
}

/// Repository for image database operations.
pub struct ImageRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ImageRepository<'a> {
    /// Create a new image repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Attach an uploaded image to an item.
    ///
    /// When `is_primary` is set, the item's thumbnail is pointed at the new
    /// image. Note this path does not demote an existing primary; callers
    /// that need exactly one primary use [`Self::set_primary`] afterwards.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item does not exist, or
    /// `RepositoryError::Database` if a statement fails.
    pub async fn insert(
        &self,
        item_id: ItemId,
        url: &str,
        is_primary: bool,
    ) -> Result<Image, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<i32> = sqlx::query_scalar("SELECT id FROM items WHERE id = $1")
            .bind(item_id.as_i32())
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(RepositoryError::NotFound);
        }

        let row: ImageRow = sqlx::query_as(
            r"
            INSERT INTO images (item_id, url, is_primary)
            VALUES ($1, $2, $3)
            RETURNING id, item_id, url, is_primary, created_at
            ",
        )
        .bind(item_id.as_i32())
        .bind(url)
        .bind(is_primary)
        .fetch_one(&mut *tx)
        .await?;

        if is_primary {
            sqlx::query("UPDATE items SET thumbnail_url = $1, updated_at = NOW() WHERE id = $2")
                .bind(url)
                .bind(item_id.as_i32())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(row.into())
    }

    /// List an item's images, primary first, then newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_item(&self, item_id: ItemId) -> Result<Vec<Image>, RepositoryError> {
        let rows: Vec<ImageRow> = sqlx::query_as(
            r"
            SELECT id, item_id, url, is_primary, created_at
            FROM images
            WHERE item_id = $1
            ORDER BY is_primary DESC, created_at DESC
            ",
        )
        .bind(item_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get an image by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ImageId) -> Result<Option<Image>, RepositoryError> {
        let row: Option<ImageRow> = sqlx::query_as(
            "SELECT id, item_id, url, is_primary, created_at FROM images WHERE id = $1",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Delete an image, repairing the invariant when it was the primary:
    /// the most recently created remaining image is promoted and the
    /// thumbnail follows it, or the thumbnail is cleared when none remain.
    ///
    /// Returns the deleted image so the caller can remove the file on disk.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the image does not exist, or
    /// `RepositoryError::Database` if a statement fails.
    pub async fn delete(&self, id: ImageId) -> Result<Image, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<ImageRow> = sqlx::query_as(
            r"
            DELETE FROM images
            WHERE id = $1
            RETURNING id, item_id, url, is_primary, created_at
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(&mut *tx)
        .await?;
        let deleted: Image = row.ok_or(RepositoryError::NotFound)?.into();

        if deleted.is_primary {
            let successor: Option<ImageRow> = sqlx::query_as(
                r"
                UPDATE images
                SET is_primary = TRUE
                WHERE id = (
                    SELECT id FROM images
                    WHERE item_id = $1
                    ORDER BY created_at DESC
                    LIMIT 1
                )
                RETURNING id, item_id, url, is_primary, created_at
                ",
            )
            .bind(deleted.item_id.as_i32())
            .fetch_optional(&mut *tx)
            .await?;

            let thumbnail = successor.as_ref().map(|img| img.url.clone());
            sqlx::query("UPDATE items SET thumbnail_url = $1, updated_at = NOW() WHERE id = $2")
                .bind(thumbnail)
                .bind(deleted.item_id.as_i32())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(deleted)
    }

    /// Make an image the sole primary for its item and point the item's
    /// thumbnail at it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the image does not exist, or
    /// `RepositoryError::Database` if a statement fails.
    pub async fn set_primary(&self, id: ImageId) -> Result<Image, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<ImageRow> = sqlx::query_as(
            "SELECT id, item_id, url, is_primary, created_at FROM images WHERE id = $1",
        )
        .bind(id.as_i32())
        .fetch_optional(&mut *tx)
        .await?;
        let target: Image = row.ok_or(RepositoryError::NotFound)?.into();

        sqlx::query("UPDATE images SET is_primary = FALSE WHERE item_id = $1")
            .bind(target.item_id.as_i32())
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE images SET is_primary = TRUE WHERE id = $1")
            .bind(id.as_i32())
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE items SET thumbnail_url = $1, updated_at = NOW() WHERE id = $2")
            .bind(&target.url)
            .bind(target.item_id.as_i32())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Image {
            is_primary: true,
            ..target
        })
    }
}
