//! E-commerce listing model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use partshed_core::{ItemId, ListingId, ListingStatus};

/// A record of an item offered on an external e-commerce platform.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub id: ListingId,
    pub item_id: ItemId,
    /// Platform name, lowercased (e.g., "ebay", "shopify").
    pub platform: String,
    /// The platform's own identifier for the listing.
    pub platform_listing_id: Option<String>,
    pub listing_url: Option<String>,
    pub listing_status: ListingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
