//! Item image model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use partshed_core::{ImageId, ItemId};

/// A photo attached to an item.
///
/// Invariant: at most one image per item has `is_primary = true`; the
/// primary image's URL is mirrored into `items.thumbnail_url`. The
/// [`crate::db::ImageRepository`] maintains this on set-primary and delete.
#[derive(Debug, Clone, Serialize)]
pub struct Image {
    pub id: ImageId,
    pub item_id: ItemId,
    pub url: String,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}
