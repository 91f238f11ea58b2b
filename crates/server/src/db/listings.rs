//! Database operations for e-commerce listings.

use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;

use partshed_core::{AuditAction, ItemId, ListingId, ListingStatus, UserId};

use super::audit::AuditRepository;
use super::RepositoryError;
use crate::models::{Listing, NewAuditEntry};

const LISTING_COLUMNS: &str =
    "id, item_id, platform, platform_listing_id, listing_url, listing_status, \
     created_at, updated_at";

/// Internal row type for listing queries.
#[derive(Debug, sqlx::FromRow)]
struct ListingRow {
    id: i32,
    item_id: i32,
    platform: String,
    platform_listing_id: Option<String>,
    listing_url: Option<String>,
    listing_status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ListingRow> for Listing {
    type Error = RepositoryError;

    fn try_from(row: ListingRow) -> Result<Self, Self::Error> {
        let listing_status = row
            .listing_status
            .parse::<ListingStatus>()
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;
        Ok(Self {
            id: ListingId::new(row.id),
            item_id: ItemId::new(row.item_id),
            platform: row.platform,
            platform_listing_id: row.platform_listing_id,
            listing_url: row.listing_url,
            listing_status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn snapshot(listing: &Listing) -> Result<serde_json::Value, RepositoryError> {
    serde_json::to_value(listing).map_err(|e| RepositoryError::DataCorruption(e.to_string()))
}

/// Column values for a new listing row.
#[derive(Debug)]
pub struct NewListing<'a> {
    pub item_id: ItemId,
    pub platform: &'a str,
    pub platform_listing_id: &'a str,
    pub listing_url: &'a str,
}

/// Repository for e-commerce listing database operations.
pub struct ListingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ListingRepository<'a> {
    /// Create a new listing repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist a listing published to an external platform, active, with its
    /// audit entry. Single creates audit as CREATE_LISTING, batch members as
    /// BATCH_CREATE_LISTING; both record `{platform, listing_data}` as the
    /// changes payload.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a statement fails.
    pub async fn create(
        &self,
        listing: &NewListing<'_>,
        action: AuditAction,
        changes: serde_json::Value,
        actor: UserId,
    ) -> Result<Listing, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: ListingRow = sqlx::query_as(&format!(
            r"
            INSERT INTO ecommerce_listings
                (item_id, platform, platform_listing_id, listing_url, listing_status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {LISTING_COLUMNS}
            "
        ))
        .bind(listing.item_id.as_i32())
        .bind(listing.platform)
        .bind(listing.platform_listing_id)
        .bind(listing.listing_url)
        .bind(ListingStatus::Active.as_str())
        .fetch_one(&mut *tx)
        .await?;
        let listing: Listing = row.try_into()?;

        AuditRepository::record(
            &mut tx,
            &NewAuditEntry {
                user_id: actor,
                action,
                table_name: "ecommerce_listings",
                record_id: listing.id.as_i32(),
                changes,
            },
        )
        .await?;

        tx.commit().await?;
        Ok(listing)
    }

    /// List an item's listings, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_item(&self, item_id: ItemId) -> Result<Vec<Listing>, RepositoryError> {
        let rows: Vec<ListingRow> = sqlx::query_as(&format!(
            "SELECT {LISTING_COLUMNS} FROM ecommerce_listings \
             WHERE item_id = $1 ORDER BY created_at DESC"
        ))
        .bind(item_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Update a listing's status with an UPDATE_LISTING audit entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the listing does not exist, or
    /// `RepositoryError::Database` if a statement fails.
    pub async fn update_status(
        &self,
        id: ListingId,
        status: ListingStatus,
        actor: UserId,
    ) -> Result<Listing, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<i32> =
            sqlx::query_scalar("SELECT id FROM ecommerce_listings WHERE id = $1")
                .bind(id.as_i32())
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Err(RepositoryError::NotFound);
        }

        let row: ListingRow = sqlx::query_as(&format!(
            r"
            UPDATE ecommerce_listings
            SET listing_status = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING {LISTING_COLUMNS}
            "
        ))
        .bind(status.as_str())
        .bind(id.as_i32())
        .fetch_one(&mut *tx)
        .await?;
        let listing: Listing = row.try_into()?;

        AuditRepository::record(
            &mut tx,
            &NewAuditEntry {
                user_id: actor,
                action: AuditAction::UpdateListing,
                table_name: "ecommerce_listings",
                record_id: listing.id.as_i32(),
                changes: json!({ "status": status.as_str() }),
            },
        )
        .await?;

        tx.commit().await?;
        Ok(listing)
    }

    /// Delete a listing with a DELETE_LISTING audit entry holding the full
    /// final snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the listing does not exist, or
    /// `RepositoryError::Database` if a statement fails.
    pub async fn delete(&self, id: ListingId, actor: UserId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<ListingRow> = sqlx::query_as(&format!(
            "DELETE FROM ecommerce_listings WHERE id = $1 RETURNING {LISTING_COLUMNS}"
        ))
        .bind(id.as_i32())
        .fetch_optional(&mut *tx)
        .await?;
        let listing: Listing = row.ok_or(RepositoryError::NotFound)?.try_into()?;

        AuditRepository::record(
            &mut tx,
            &NewAuditEntry {
                user_id: actor,
                action: AuditAction::DeleteListing,
                table_name: "ecommerce_listings",
                record_id: listing.id.as_i32(),
                changes: snapshot(&listing)?,
            },
        )
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
