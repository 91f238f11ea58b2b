//! Scrape result model and the mapping from scraped payloads onto item
//! fields.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use partshed_core::{ItemId, ScrapeResultId};

/// Externally sourced structured data about an item.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeResult {
    pub id: ScrapeResultId,
    pub item_id: ItemId,
    pub source_url: Option<String>,
    /// Opaque key/value payload exactly as the scraper returned it.
    pub scraped_data: Value,
    pub created_at: DateTime<Utc>,
}

/// Item fields extracted from a scraped payload.
///
/// Scraper sources disagree on field names, so each target field reads a
/// fixed list of source keys in precedence order: the first present key
/// wins and later spellings are ignored. The table:
///
/// | item field    | source keys, preferred first      |
/// |---------------|-----------------------------------|
/// | name          | `title`, `name`                   |
/// | part_number   | `part_number`, `sku`              |
/// | vehicle_make  | `vehicle_make`, `make`            |
/// | vehicle_model | `vehicle_model`, `model`          |
/// | width         | `width`, `dimensions.width`       |
/// | height        | `height`, `dimensions.height`     |
/// | depth         | `depth`, `dimensions.depth`       |
/// | thumbnail_url | `image_url`, `thumbnail`          |
/// | weight, color, price, description | same-name key |
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrapedFields {
    pub name: Option<String>,
    pub part_number: Option<String>,
    pub vehicle_make: Option<String>,
    pub vehicle_model: Option<String>,
    pub weight: Option<Decimal>,
    pub width: Option<Decimal>,
    pub height: Option<Decimal>,
    pub depth: Option<Decimal>,
    pub color: Option<String>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
}

impl ScrapedFields {
    /// Map a scraped payload onto item fields using the precedence table.
    #[must_use]
    pub fn from_value(data: &Value) -> Self {
        let dimensions = data.get("dimensions");
        Self {
            name: first_string(data, &["title", "name"]),
            part_number: first_string(data, &["part_number", "sku"]),
            vehicle_make: first_string(data, &["vehicle_make", "make"]),
            vehicle_model: first_string(data, &["vehicle_model", "model"]),
            weight: get_decimal(data, "weight"),
            width: get_decimal(data, "width")
                .or_else(|| dimensions.and_then(|d| get_decimal(d, "width"))),
            height: get_decimal(data, "height")
                .or_else(|| dimensions.and_then(|d| get_decimal(d, "height"))),
            depth: get_decimal(data, "depth")
                .or_else(|| dimensions.and_then(|d| get_decimal(d, "depth"))),
            color: first_string(data, &["color"]),
            price: get_decimal(data, "price"),
            description: first_string(data, &["description"]),
            thumbnail_url: first_string(data, &["image_url", "thumbnail"]),
        }
    }

    /// True when the payload mapped onto no item field at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.part_number.is_none()
            && self.vehicle_make.is_none()
            && self.vehicle_model.is_none()
            && self.weight.is_none()
            && self.width.is_none()
            && self.height.is_none()
            && self.depth.is_none()
            && self.color.is_none()
            && self.price.is_none()
            && self.description.is_none()
            && self.thumbnail_url.is_none()
    }

    /// Names of the fields this payload will write, for the ENRICH audit
    /// entry.
    #[must_use]
    pub fn applied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.name.is_some() {
            fields.push("name");
        }
        if self.part_number.is_some() {
            fields.push("part_number");
        }
        if self.vehicle_make.is_some() {
            fields.push("vehicle_make");
        }
        if self.vehicle_model.is_some() {
            fields.push("vehicle_model");
        }
        if self.weight.is_some() {
            fields.push("weight");
        }
        if self.width.is_some() {
            fields.push("width");
        }
        if self.height.is_some() {
            fields.push("height");
        }
        if self.depth.is_some() {
            fields.push("depth");
        }
        if self.color.is_some() {
            fields.push("color");
        }
        if self.price.is_some() {
            fields.push("price");
        }
        if self.description.is_some() {
            fields.push("description");
        }
        if self.thumbnail_url.is_some() {
            fields.push("thumbnail_url");
        }
        fields
    }
}

/// Read the first present non-empty string among `keys`.
fn first_string(data: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| data.get(*key))
        .find_map(|v| v.as_str())
        .map(str::to_owned)
        .filter(|s| !s.is_empty())
}

/// Read a numeric field that sources send as either a JSON number or a
/// numeric string.
fn get_decimal(data: &Value, key: &str) -> Option<Decimal> {
    match data.get(key)? {
        Value::Number(n) => n.to_string().parse().ok(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_title_preferred_over_name() {
        let data = json!({ "title": "Brake Rotor", "name": "rotor-generic" });
        let fields = ScrapedFields::from_value(&data);
        assert_eq!(fields.name.as_deref(), Some("Brake Rotor"));
    }

    #[test]
    fn test_name_used_when_title_absent() {
        let data = json!({ "name": "Brake Rotor" });
        let fields = ScrapedFields::from_value(&data);
        assert_eq!(fields.name.as_deref(), Some("Brake Rotor"));
    }

    #[test]
    fn test_flat_width_preferred_over_nested_dimensions() {
        let data = json!({ "width": 12.5, "dimensions": { "width": 99 } });
        let fields = ScrapedFields::from_value(&data);
        assert_eq!(fields.width, Some("12.5".parse().expect("decimal")));
    }

    #[test]
    fn test_nested_dimensions_used_as_fallback() {
        let data = json!({ "dimensions": { "width": 12, "height": "3.25", "depth": 8 } });
        let fields = ScrapedFields::from_value(&data);
        assert_eq!(fields.width, Some(Decimal::from(12)));
        assert_eq!(fields.height, Some("3.25".parse().expect("decimal")));
        assert_eq!(fields.depth, Some(Decimal::from(8)));
    }

    #[test]
    fn test_part_number_preferred_over_sku() {
        let data = json!({ "sku": "SKU-1", "part_number": "PN-7" });
        let fields = ScrapedFields::from_value(&data);
        assert_eq!(fields.part_number.as_deref(), Some("PN-7"));
    }

    #[test]
    fn test_thumbnail_precedence() {
        let data = json!({ "thumbnail": "/t.jpg", "image_url": "/full.jpg" });
        let fields = ScrapedFields::from_value(&data);
        assert_eq!(fields.thumbnail_url.as_deref(), Some("/full.jpg"));
    }

    #[test]
    fn test_numeric_strings_parse() {
        let data = json!({ "price": "89.99", "weight": 4 });
        let fields = ScrapedFields::from_value(&data);
        assert_eq!(fields.price, Some("89.99".parse().expect("decimal")));
        assert_eq!(fields.weight, Some(Decimal::from(4)));
    }

    #[test]
    fn test_empty_payload_maps_to_nothing() {
        let fields = ScrapedFields::from_value(&json!({}));
        assert!(fields.is_empty());
        assert!(fields.applied_fields().is_empty());
    }

    #[test]
    fn test_applied_fields_lists_only_present() {
        let data = json!({ "title": "Strut", "price": 45 });
        let fields = ScrapedFields::from_value(&data);
        assert_eq!(fields.applied_fields(), vec!["name", "price"]);
    }
}
