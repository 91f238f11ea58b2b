//! Marketplace collaborator: platform payload builders and the publish seam.
//!
//! Real platform integrations are out of scope, so the default client is a
//! stub returning a deterministic remote listing. The trait exists so a real
//! eBay/Shopify client can slot in without touching the handlers.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value, json};

use crate::models::Item;

use super::CollaboratorError;

const BRAND: &str = "partshed";

/// Platforms we can build listing payloads for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Ebay,
    Shopify,
}

impl Platform {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ebay => "ebay",
            Self::Shopify => "shopify",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed case-insensitively; anything unknown is an unsupported platform.
impl FromStr for Platform {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ebay" => Ok(Self::Ebay),
            "shopify" => Ok(Self::Shopify),
            _ => Err(()),
        }
    }
}

/// The platform's identifiers for a published listing.
#[derive(Debug, Clone)]
pub struct RemoteListing {
    pub id: String,
    pub url: String,
}

/// Publishes listing payloads to an external platform.
#[async_trait]
pub trait MarketplaceClient: Send + Sync {
    async fn publish(
        &self,
        platform: Platform,
        payload: &Value,
    ) -> Result<RemoteListing, CollaboratorError>;
}

/// Default client: simulates a successful publish with a deterministic
/// id/url shape instead of calling a platform API.
pub struct StubMarketplaceClient;

#[async_trait]
impl MarketplaceClient for StubMarketplaceClient {
    async fn publish(
        &self,
        platform: Platform,
        _payload: &Value,
    ) -> Result<RemoteListing, CollaboratorError> {
        let millis = Utc::now().timestamp_millis();
        Ok(RemoteListing {
            id: format!("{platform}-{millis}"),
            url: format!("https://{platform}.com/listing/{millis}"),
        })
    }
}

/// Build the platform-specific payload for an item, with caller-supplied
/// listing data taking precedence over item fields.
#[must_use]
pub fn build_listing_payload(platform: Platform, item: &Item, listing_data: &Value) -> Value {
    match platform {
        Platform::Ebay => build_ebay_payload(item, listing_data),
        Platform::Shopify => build_shopify_payload(item, listing_data),
    }
}

fn default_sku(item: &Item) -> String {
    format!("{BRAND}-{}", item.id)
}

/// `listing_data[key]` when it is a non-null value, else the item fallback.
fn data_or<'a>(listing_data: &'a Value, key: &str, fallback: Option<&'a Value>) -> Value {
    listing_data
        .get(key)
        .filter(|v| !v.is_null())
        .or(fallback)
        .cloned()
        .unwrap_or(Value::Null)
}

fn build_ebay_payload(item: &Item, listing_data: &Value) -> Value {
    let sku = listing_data
        .get("sku")
        .and_then(Value::as_str)
        .map_or_else(|| default_sku(item), str::to_owned);
    let description = item.description.clone().map(Value::String);
    let price = item.price.map(|p| json!(p));

    let mut aspects = Map::new();
    aspects.insert("Brand".to_owned(), json!([BRAND]));
    aspects.insert(
        "MPN".to_owned(),
        json!([item.part_number.clone().unwrap_or_else(|| default_sku(item))]),
    );
    if let Some(make) = &item.vehicle_make {
        aspects.insert("Vehicle Make".to_owned(), json!([make]));
    }
    if let Some(model) = &item.vehicle_model {
        aspects.insert("Vehicle Model".to_owned(), json!([model]));
    }

    json!({
        "sku": sku,
        "product": {
            "title": data_or(listing_data, "title", Some(&json!(item.name))),
            "description": data_or(listing_data, "description", description.as_ref()),
            "aspects": aspects,
            "imageUrls": [item.thumbnail_url],
        },
        "availability": {
            "shipToLocationAvailability": {
                "quantity": data_or(listing_data, "quantity", Some(&json!(1))),
            },
        },
        "condition": data_or(listing_data, "condition", Some(&json!("USED_EXCELLENT"))),
        "packageWeightAndSize": {
            "weight": { "value": item.weight, "unit": "POUND" },
            "dimensions": {
                "length": item.depth,
                "width": item.width,
                "height": item.height,
                "unit": "INCH",
            },
        },
        "price": {
            "value": data_or(listing_data, "price", price.as_ref()),
            "currency": "USD",
        },
    })
}

fn build_shopify_payload(item: &Item, listing_data: &Value) -> Value {
    let sku = listing_data
        .get("sku")
        .and_then(Value::as_str)
        .map_or_else(|| default_sku(item), str::to_owned);
    let description = item.description.clone().map(Value::String);
    let price = item.price.map(|p| json!(p));

    let tags: Vec<&str> = [
        Some(BRAND),
        item.vehicle_make.as_deref(),
        item.vehicle_model.as_deref(),
        item.part_number.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect();

    json!({
        "product": {
            "title": data_or(listing_data, "title", Some(&json!(item.name))),
            "body_html": data_or(listing_data, "description", description.as_ref()),
            "vendor": BRAND,
            "product_type": data_or(listing_data, "category", Some(&json!("Auto Parts"))),
            "tags": tags,
            "variants": [{
                "price": data_or(listing_data, "price", price.as_ref()),
                "sku": sku,
                "inventory_quantity": data_or(listing_data, "quantity", Some(&json!(1))),
                "weight": item.weight,
                "weight_unit": "lb",
                "requires_shipping": true,
            }],
            "images": [{ "src": item.thumbnail_url }],
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use partshed_core::ItemId;
    use rust_decimal::Decimal;

    fn item() -> Item {
        Item {
            id: ItemId::new(7),
            name: "Brake Rotor".to_owned(),
            part_number: Some("PN-7".to_owned()),
            vehicle_make: Some("Honda".to_owned()),
            vehicle_model: None,
            color: None,
            item_type: None,
            bay: None,
            sku: None,
            description: Some("Front rotor".to_owned()),
            notes: None,
            weight: Some(Decimal::new(45, 1)),
            width: None,
            height: None,
            depth: None,
            price: Some(Decimal::new(8999, 2)),
            thumbnail_url: Some("/uploads/images/rotor.jpg".to_owned()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_platform_parses_case_insensitively() {
        assert_eq!("eBay".parse(), Ok(Platform::Ebay));
        assert_eq!("SHOPIFY".parse(), Ok(Platform::Shopify));
        assert_eq!("amazon".parse::<Platform>(), Err(()));
    }

    #[test]
    fn test_ebay_payload_falls_back_to_item_fields() {
        let payload = build_ebay_payload(&item(), &json!({}));
        assert_eq!(payload["sku"], "partshed-7");
        assert_eq!(payload["product"]["title"], "Brake Rotor");
        assert_eq!(payload["product"]["description"], "Front rotor");
        assert_eq!(payload["product"]["aspects"]["Brand"], json!(["partshed"]));
        assert_eq!(payload["product"]["aspects"]["MPN"], json!(["PN-7"]));
        assert_eq!(
            payload["product"]["aspects"]["Vehicle Make"],
            json!(["Honda"])
        );
        // No model on the item, so the aspect is omitted entirely.
        assert!(payload["product"]["aspects"].get("Vehicle Model").is_none());
        assert_eq!(payload["condition"], "USED_EXCELLENT");
        assert_eq!(payload["price"]["value"], json!(Decimal::new(8999, 2)));
    }

    #[test]
    fn test_listing_data_overrides_item_fields() {
        let payload = build_ebay_payload(
            &item(),
            &json!({ "title": "OEM Brake Rotor", "price": 99.5, "quantity": 3 }),
        );
        assert_eq!(payload["product"]["title"], "OEM Brake Rotor");
        assert_eq!(payload["price"]["value"], 99.5);
        assert_eq!(
            payload["availability"]["shipToLocationAvailability"]["quantity"],
            3
        );
    }

    #[test]
    fn test_shopify_payload_shape() {
        let payload = build_shopify_payload(&item(), &json!({}));
        assert_eq!(payload["product"]["vendor"], "partshed");
        assert_eq!(payload["product"]["product_type"], "Auto Parts");
        assert_eq!(
            payload["product"]["tags"],
            json!(["partshed", "Honda", "PN-7"])
        );
        assert_eq!(payload["product"]["variants"][0]["sku"], "partshed-7");
        assert_eq!(payload["product"]["variants"][0]["weight_unit"], "lb");
        assert_eq!(
            payload["product"]["images"][0]["src"],
            "/uploads/images/rotor.jpg"
        );
    }

    #[tokio::test]
    async fn test_stub_publish_shape() {
        let client = StubMarketplaceClient;
        let listing = client
            .publish(Platform::Ebay, &json!({}))
            .await
            .expect("stub publish");
        assert!(listing.id.starts_with("ebay-"));
        assert!(listing.url.starts_with("https://ebay.com/listing/"));
    }
}
