//! Inventory item model and the optional-field bags used to filter and
//! mutate it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use partshed_core::ItemId;

use crate::models::{Image, Listing, OcrResult, ScrapeResult};

/// Default page number when the caller omits one (pagination is 1-indexed).
pub const DEFAULT_PAGE: i64 = 1;
/// Default page size when the caller omits one.
pub const DEFAULT_LIMIT: i64 = 20;

/// A single inventory part/product record.
#[derive(Debug, Clone, Serialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub part_number: Option<String>,
    pub vehicle_make: Option<String>,
    pub vehicle_model: Option<String>,
    pub color: Option<String>,
    pub item_type: Option<String>,
    pub bay: Option<String>,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub weight: Option<Decimal>,
    pub width: Option<Decimal>,
    pub height: Option<Decimal>,
    pub depth: Option<Decimal>,
    pub price: Option<Decimal>,
    pub thumbnail_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An item together with all of its dependent records, as returned by
/// `GET /api/items/{id}`.
#[derive(Debug, Serialize)]
pub struct ItemDetail {
    #[serde(flatten)]
    pub item: Item,
    pub images: Vec<Image>,
    pub ocr_results: Vec<OcrResult>,
    pub scrape_results: Vec<ScrapeResult>,
    pub ecommerce_listings: Vec<Listing>,
}

/// Input for creating a new item. Only `name` is required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateItemInput {
    pub name: String,
    pub part_number: Option<String>,
    pub vehicle_make: Option<String>,
    pub vehicle_model: Option<String>,
    pub color: Option<String>,
    pub item_type: Option<String>,
    pub bay: Option<String>,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub weight: Option<Decimal>,
    pub width: Option<Decimal>,
    pub height: Option<Decimal>,
    pub depth: Option<Decimal>,
    pub price: Option<Decimal>,
    pub thumbnail_url: Option<String>,
}

/// Partial update bag for an item. Fields left `None` are not touched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateItemInput {
    pub name: Option<String>,
    pub part_number: Option<String>,
    pub vehicle_make: Option<String>,
    pub vehicle_model: Option<String>,
    pub color: Option<String>,
    pub item_type: Option<String>,
    pub bay: Option<String>,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub weight: Option<Decimal>,
    pub width: Option<Decimal>,
    pub height: Option<Decimal>,
    pub depth: Option<Decimal>,
    pub price: Option<Decimal>,
    pub thumbnail_url: Option<String>,
}

impl UpdateItemInput {
    /// True when the bag contributes no assignable field. Such an update
    /// short-circuits: no write, no timestamp touch, no audit entry.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.part_number.is_none()
            && self.vehicle_make.is_none()
            && self.vehicle_model.is_none()
            && self.color.is_none()
            && self.item_type.is_none()
            && self.bay.is_none()
            && self.sku.is_none()
            && self.description.is_none()
            && self.notes.is_none()
            && self.weight.is_none()
            && self.width.is_none()
            && self.height.is_none()
            && self.depth.is_none()
            && self.price.is_none()
            && self.thumbnail_url.is_none()
    }
}

/// Optional-field bag for filtering, sorting, and paginating the item list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemFilter {
    pub name: Option<String>,
    pub part_number: Option<String>,
    pub vehicle_make: Option<String>,
    pub vehicle_model: Option<String>,
    pub item_type: Option<String>,
    pub bay: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl ItemFilter {
    /// The 1-indexed page to return.
    #[must_use]
    pub fn page(&self) -> i64 {
        self.page.filter(|p| *p >= 1).unwrap_or(DEFAULT_PAGE)
    }

    /// Page size.
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit.filter(|l| *l >= 1).unwrap_or(DEFAULT_LIMIT)
    }

    /// Row offset derived from page and limit.
    #[must_use]
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

/// Pager metadata so the SPA can render controls without a second request.
#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub total_items: i64,
    pub total_pages: i64,
    pub current_page: i64,
    pub limit: i64,
}

/// One page of items plus pager metadata.
#[derive(Debug, Serialize)]
pub struct ItemPage {
    pub items: Vec<Item>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_input_empty_detection() {
        let input = UpdateItemInput::default();
        assert!(input.is_empty());

        let input = UpdateItemInput {
            price: Some(Decimal::new(9999, 2)),
            ..Default::default()
        };
        assert!(!input.is_empty());
    }

    #[test]
    fn test_filter_pagination_defaults() {
        let filter = ItemFilter::default();
        assert_eq!(filter.page(), 1);
        assert_eq!(filter.limit(), 20);
        assert_eq!(filter.offset(), 0);
    }

    #[test]
    fn test_filter_offset_is_one_indexed() {
        let filter = ItemFilter {
            page: Some(3),
            limit: Some(25),
            ..Default::default()
        };
        assert_eq!(filter.offset(), 50);
    }

    #[test]
    fn test_filter_rejects_nonpositive_page() {
        let filter = ItemFilter {
            page: Some(0),
            limit: Some(-5),
            ..Default::default()
        };
        assert_eq!(filter.page(), 1);
        assert_eq!(filter.limit(), 20);
    }
}
