//! Database operations for inventory items.
//!
//! Listing and partial updates assemble their SQL at runtime with
//! [`sqlx::QueryBuilder`]. The items query and its count query share one
//! predicate builder so the two can never disagree about which rows are in
//! the page.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use partshed_core::{AuditAction, ItemId, ScrapeResultId, UserId};

use super::audit::{AuditRepository, ChangeSet};
use super::RepositoryError;
use crate::models::{
    CreateItemInput, Item, ItemFilter, ItemPage, NewAuditEntry, Pagination, ScrapedFields,
    UpdateItemInput,
};

/// Columns selected for every item read, in `ItemRow` field order.
const ITEM_COLUMNS: &str = "id, name, part_number, vehicle_make, vehicle_model, color, \
     item_type, bay, sku, description, notes, weight, width, height, depth, price, \
     thumbnail_url, created_at, updated_at";

/// Columns callers may sort by. Anything else falls back to `created_at`.
const SORT_COLUMNS: [&str; 5] = ["name", "part_number", "price", "created_at", "updated_at"];

/// Internal row type for item queries.
#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    id: i32,
    name: String,
    part_number: Option<String>,
    vehicle_make: Option<String>,
    vehicle_model: Option<String>,
    color: Option<String>,
    item_type: Option<String>,
    bay: Option<String>,
    sku: Option<String>,
    description: Option<String>,
    notes: Option<String>,
    weight: Option<Decimal>,
    width: Option<Decimal>,
    height: Option<Decimal>,
    depth: Option<Decimal>,
    price: Option<Decimal>,
    thumbnail_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Self {
            id: ItemId::new(row.id),
            name: row.name,
            part_number: row.part_number,
            vehicle_make: row.vehicle_make,
            vehicle_model: row.vehicle_model,
            color: row.color,
            item_type: row.item_type,
            bay: row.bay,
            sku: row.sku,
            description: row.description,
            notes: row.notes,
            weight: row.weight,
            width: row.width,
            height: row.height,
            depth: row.depth,
            price: row.price,
            thumbnail_url: row.thumbnail_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Append the filter predicates to a builder whose statement already ends in
/// `WHERE 1=1`. Values are always bound, never interpolated. Shared by the
/// page query and the count query.
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &ItemFilter) {
    if let Some(name) = &filter.name {
        builder.push(" AND name ILIKE ").push_bind(format!("%{name}%"));
    }
    if let Some(part_number) = &filter.part_number {
        builder
            .push(" AND part_number ILIKE ")
            .push_bind(format!("%{part_number}%"));
    }
    if let Some(vehicle_make) = &filter.vehicle_make {
        builder
            .push(" AND vehicle_make ILIKE ")
            .push_bind(format!("%{vehicle_make}%"));
    }
    if let Some(vehicle_model) = &filter.vehicle_model {
        builder
            .push(" AND vehicle_model ILIKE ")
            .push_bind(format!("%{vehicle_model}%"));
    }
    if let Some(item_type) = &filter.item_type {
        builder.push(" AND item_type = ").push_bind(item_type.clone());
    }
    if let Some(bay) = &filter.bay {
        builder.push(" AND bay = ").push_bind(bay.clone());
    }
    if let Some(min_price) = filter.min_price {
        builder.push(" AND price >= ").push_bind(min_price);
    }
    if let Some(max_price) = filter.max_price {
        builder.push(" AND price <= ").push_bind(max_price);
    }
}

/// Resolve the ORDER BY column and direction against the allow-list. The
/// returned strings are the only sort text ever pushed into a statement.
fn resolve_sort(filter: &ItemFilter) -> (&'static str, &'static str) {
    let column = filter
        .sort_by
        .as_deref()
        .and_then(|requested| SORT_COLUMNS.iter().find(|col| **col == requested))
        .copied()
        .unwrap_or("created_at");
    let direction = if filter.sort_order.as_deref() == Some("asc") {
        "ASC"
    } else {
        "DESC"
    };
    (column, direction)
}

/// Append `field = <bind>` assignments for every present field of the update
/// bag, plus the unconditional `updated_at = NOW()`. The builder must end in
/// `UPDATE items SET `.
fn push_assignments(builder: &mut QueryBuilder<'_, Postgres>, input: &UpdateItemInput) {
    let mut assignments = builder.separated(", ");
    if let Some(name) = &input.name {
        assignments.push("name = ").push_bind_unseparated(name.clone());
    }
    if let Some(part_number) = &input.part_number {
        assignments
            .push("part_number = ")
            .push_bind_unseparated(part_number.clone());
    }
    if let Some(vehicle_make) = &input.vehicle_make {
        assignments
            .push("vehicle_make = ")
            .push_bind_unseparated(vehicle_make.clone());
    }
    if let Some(vehicle_model) = &input.vehicle_model {
        assignments
            .push("vehicle_model = ")
            .push_bind_unseparated(vehicle_model.clone());
    }
    if let Some(color) = &input.color {
        assignments.push("color = ").push_bind_unseparated(color.clone());
    }
    if let Some(item_type) = &input.item_type {
        assignments
            .push("item_type = ")
            .push_bind_unseparated(item_type.clone());
    }
    if let Some(bay) = &input.bay {
        assignments.push("bay = ").push_bind_unseparated(bay.clone());
    }
    if let Some(sku) = &input.sku {
        assignments.push("sku = ").push_bind_unseparated(sku.clone());
    }
    if let Some(description) = &input.description {
        assignments
            .push("description = ")
            .push_bind_unseparated(description.clone());
    }
    if let Some(notes) = &input.notes {
        assignments.push("notes = ").push_bind_unseparated(notes.clone());
    }
    if let Some(weight) = input.weight {
        assignments.push("weight = ").push_bind_unseparated(weight);
    }
    if let Some(width) = input.width {
        assignments.push("width = ").push_bind_unseparated(width);
    }
    if let Some(height) = input.height {
        assignments.push("height = ").push_bind_unseparated(height);
    }
    if let Some(depth) = input.depth {
        assignments.push("depth = ").push_bind_unseparated(depth);
    }
    if let Some(price) = input.price {
        assignments.push("price = ").push_bind_unseparated(price);
    }
    if let Some(thumbnail_url) = &input.thumbnail_url {
        assignments
            .push("thumbnail_url = ")
            .push_bind_unseparated(thumbnail_url.clone());
    }
    assignments.push("updated_at = NOW()");
}

/// Serialize an item for a full-snapshot audit payload.
fn snapshot(item: &Item) -> Result<serde_json::Value, RepositoryError> {
    serde_json::to_value(item).map_err(|e| RepositoryError::DataCorruption(e.to_string()))
}

/// Diff two item states into a changed-fields-only audit payload.
fn diff(old: &Item, new: &Item) -> ChangeSet {
    let mut changes = ChangeSet::new();
    changes.record("name", &old.name, &new.name);
    changes.record("part_number", &old.part_number, &new.part_number);
    changes.record("vehicle_make", &old.vehicle_make, &new.vehicle_make);
    changes.record("vehicle_model", &old.vehicle_model, &new.vehicle_model);
    changes.record("color", &old.color, &new.color);
    changes.record("item_type", &old.item_type, &new.item_type);
    changes.record("bay", &old.bay, &new.bay);
    changes.record("sku", &old.sku, &new.sku);
    changes.record("description", &old.description, &new.description);
    changes.record("notes", &old.notes, &new.notes);
    changes.record("weight", &old.weight, &new.weight);
    changes.record("width", &old.width, &new.width);
    changes.record("height", &old.height, &new.height);
    changes.record("depth", &old.depth, &new.depth);
    changes.record("price", &old.price, &new.price);
    changes.record("thumbnail_url", &old.thumbnail_url, &new.thumbnail_url);
    changes
}

/// Run the dynamic UPDATE on the caller's connection and return the new row.
async fn update_row(
    conn: &mut PgConnection,
    id: ItemId,
    input: &UpdateItemInput,
) -> Result<Item, RepositoryError> {
    let mut builder = QueryBuilder::new("UPDATE items SET ");
    push_assignments(&mut builder, input);
    builder.push(" WHERE id = ").push_bind(id.as_i32());
    builder.push(" RETURNING ").push(ITEM_COLUMNS);

    let row: ItemRow = builder.build_query_as().fetch_one(conn).await?;
    Ok(row.into())
}

/// Repository for inventory item database operations.
pub struct ItemRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ItemRepository<'a> {
    /// Create a new item repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List items matching the filter, with pager metadata.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either query fails.
    pub async fn list(&self, filter: &ItemFilter) -> Result<ItemPage, RepositoryError> {
        let mut count_builder = QueryBuilder::new("SELECT COUNT(*) FROM items WHERE 1=1");
        push_filters(&mut count_builder, filter);
        let total_items: i64 = count_builder
            .build_query_scalar()
            .fetch_one(self.pool)
            .await?;

        let mut builder = QueryBuilder::new(format!("SELECT {ITEM_COLUMNS} FROM items WHERE 1=1"));
        push_filters(&mut builder, filter);
        let (column, direction) = resolve_sort(filter);
        builder.push(format!(" ORDER BY {column} {direction}"));
        builder.push(" LIMIT ").push_bind(filter.limit());
        builder.push(" OFFSET ").push_bind(filter.offset());

        let rows: Vec<ItemRow> = builder.build_query_as().fetch_all(self.pool).await?;

        let limit = filter.limit();
        Ok(ItemPage {
            items: rows.into_iter().map(Into::into).collect(),
            pagination: Pagination {
                total_items,
                total_pages: (total_items + limit - 1) / limit,
                current_page: filter.page(),
                limit,
            },
        })
    }

    /// Get an item by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ItemId) -> Result<Option<Item>, RepositoryError> {
        let row: Option<ItemRow> =
            sqlx::query_as(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = $1"))
                .bind(id.as_i32())
                .fetch_optional(self.pool)
                .await?;

        Ok(row.map(Into::into))
    }

    /// Create an item and its CREATE audit entry in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn create(
        &self,
        input: &CreateItemInput,
        actor: UserId,
    ) -> Result<Item, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: ItemRow = sqlx::query_as(&format!(
            r"
            INSERT INTO items (
                name, part_number, vehicle_make, vehicle_model, color, item_type,
                bay, sku, description, notes, weight, width, height, depth, price,
                thumbnail_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {ITEM_COLUMNS}
            "
        ))
        .bind(&input.name)
        .bind(&input.part_number)
        .bind(&input.vehicle_make)
        .bind(&input.vehicle_model)
        .bind(&input.color)
        .bind(&input.item_type)
        .bind(&input.bay)
        .bind(&input.sku)
        .bind(&input.description)
        .bind(&input.notes)
        .bind(input.weight)
        .bind(input.width)
        .bind(input.height)
        .bind(input.depth)
        .bind(input.price)
        .bind(&input.thumbnail_url)
        .fetch_one(&mut *tx)
        .await?;

        let item: Item = row.into();
        AuditRepository::record(
            &mut tx,
            &NewAuditEntry {
                user_id: actor,
                action: AuditAction::Create,
                table_name: "items",
                record_id: item.id.as_i32(),
                changes: snapshot(&item)?,
            },
        )
        .await?;

        tx.commit().await?;
        Ok(item)
    }

    /// Create a bare item outside any audit scope. Used when an OCR upload
    /// arrives without an item to attach to.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_minimal(
        &self,
        name: &str,
        thumbnail_url: Option<&str>,
    ) -> Result<Item, RepositoryError> {
        let row: ItemRow = sqlx::query_as(&format!(
            "INSERT INTO items (name, thumbnail_url) VALUES ($1, $2) RETURNING {ITEM_COLUMNS}"
        ))
        .bind(name)
        .bind(thumbnail_url)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Apply a partial update and its changed-fields UPDATE audit entry in
    /// one transaction. An empty bag short-circuits and returns the current
    /// row with no write and no audit entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item does not exist, or
    /// `RepositoryError::Database` if a statement fails.
    pub async fn update(
        &self,
        id: ItemId,
        input: &UpdateItemInput,
        actor: UserId,
    ) -> Result<Item, RepositoryError> {
        let old = self.get(id).await?.ok_or(RepositoryError::NotFound)?;
        if input.is_empty() {
            return Ok(old);
        }

        let mut tx = self.pool.begin().await?;
        let item = update_row(&mut tx, id, input).await?;

        let changes = diff(&old, &item);
        if !changes.is_empty() {
            AuditRepository::record(
                &mut tx,
                &NewAuditEntry {
                    user_id: actor,
                    action: AuditAction::Update,
                    table_name: "items",
                    record_id: item.id.as_i32(),
                    changes: changes.into_value(),
                },
            )
            .await?;
        }

        tx.commit().await?;
        Ok(item)
    }

    /// Delete an item (dependents cascade) and record a DELETE audit entry
    /// holding the full final snapshot, in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item does not exist, or
    /// `RepositoryError::Database` if a statement fails.
    pub async fn delete(&self, id: ItemId, actor: UserId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<ItemRow> =
            sqlx::query_as(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = $1"))
                .bind(id.as_i32())
                .fetch_optional(&mut *tx)
                .await?;
        let item: Item = row.ok_or(RepositoryError::NotFound)?.into();

        sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id.as_i32())
            .execute(&mut *tx)
            .await?;

        AuditRepository::record(
            &mut tx,
            &NewAuditEntry {
                user_id: actor,
                action: AuditAction::Delete,
                table_name: "items",
                record_id: item.id.as_i32(),
                changes: snapshot(&item)?,
            },
        )
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Apply scraped fields as a partial update with an ENRICH audit entry
    /// naming the source scrape result and the fields written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item does not exist, or
    /// `RepositoryError::Database` if a statement fails.
    pub async fn apply_enrichment(
        &self,
        id: ItemId,
        fields: &ScrapedFields,
        source: ScrapeResultId,
        actor: UserId,
    ) -> Result<Item, RepositoryError> {
        let current = self.get(id).await?.ok_or(RepositoryError::NotFound)?;
        if fields.is_empty() {
            return Ok(current);
        }

        let input = UpdateItemInput {
            name: fields.name.clone(),
            part_number: fields.part_number.clone(),
            vehicle_make: fields.vehicle_make.clone(),
            vehicle_model: fields.vehicle_model.clone(),
            color: fields.color.clone(),
            description: fields.description.clone(),
            weight: fields.weight,
            width: fields.width,
            height: fields.height,
            depth: fields.depth,
            price: fields.price,
            thumbnail_url: fields.thumbnail_url.clone(),
            ..Default::default()
        };

        let mut tx = self.pool.begin().await?;
        let item = update_row(&mut tx, id, &input).await?;

        AuditRepository::record(
            &mut tx,
            &NewAuditEntry {
                user_id: actor,
                action: AuditAction::Enrich,
                table_name: "items",
                record_id: item.id.as_i32(),
                changes: json!({
                    "scrape_result_id": source,
                    "applied_fields": fields.applied_fields(),
                }),
            },
        )
        .await?;

        tx.commit().await?;
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_filter() -> ItemFilter {
        ItemFilter {
            name: Some("rotor".to_owned()),
            part_number: Some("PN".to_owned()),
            vehicle_make: Some("Honda".to_owned()),
            vehicle_model: Some("Civic".to_owned()),
            item_type: Some("brake".to_owned()),
            bay: Some("A3".to_owned()),
            min_price: Some(Decimal::new(1000, 2)),
            max_price: Some(Decimal::new(20000, 2)),
            ..Default::default()
        }
    }

    fn where_clause(filter: &ItemFilter) -> String {
        let mut builder = QueryBuilder::new("WHERE 1=1");
        push_filters(&mut builder, filter);
        builder.sql().to_owned()
    }

    #[test]
    fn test_list_and_count_share_predicates() {
        let filter = full_filter();

        let mut count_builder = QueryBuilder::new("SELECT COUNT(*) FROM items WHERE 1=1");
        push_filters(&mut count_builder, &filter);
        let mut page_builder = QueryBuilder::new("SELECT id FROM items WHERE 1=1");
        push_filters(&mut page_builder, &filter);

        let count_where = count_builder
            .sql()
            .split_once("WHERE")
            .map(|(_, rest)| rest.to_owned());
        let page_where = page_builder
            .sql()
            .split_once("WHERE")
            .map(|(_, rest)| rest.to_owned());
        assert_eq!(count_where, page_where);
    }

    #[test]
    fn test_filters_bind_rather_than_interpolate() {
        let sql = where_clause(&full_filter());
        assert!(sql.contains("name ILIKE $1"));
        assert!(sql.contains("part_number ILIKE $2"));
        assert!(sql.contains("vehicle_make ILIKE $3"));
        assert!(sql.contains("vehicle_model ILIKE $4"));
        assert!(sql.contains("item_type = $5"));
        assert!(sql.contains("bay = $6"));
        assert!(sql.contains("price >= $7"));
        assert!(sql.contains("price <= $8"));
        assert!(!sql.contains("rotor"));
    }

    #[test]
    fn test_empty_filter_adds_no_predicates() {
        assert_eq!(where_clause(&ItemFilter::default()), "WHERE 1=1");
    }

    #[test]
    fn test_sort_defaults_to_created_at_desc() {
        assert_eq!(resolve_sort(&ItemFilter::default()), ("created_at", "DESC"));
    }

    #[test]
    fn test_sort_rejects_unknown_column() {
        let filter = ItemFilter {
            sort_by: Some("price; DROP TABLE items".to_owned()),
            sort_order: Some("asc".to_owned()),
            ..Default::default()
        };
        assert_eq!(resolve_sort(&filter), ("created_at", "ASC"));
    }

    #[test]
    fn test_sort_accepts_allow_listed_column() {
        let filter = ItemFilter {
            sort_by: Some("price".to_owned()),
            sort_order: Some("asc".to_owned()),
            ..Default::default()
        };
        assert_eq!(resolve_sort(&filter), ("price", "ASC"));

        let filter = ItemFilter {
            sort_by: Some("name".to_owned()),
            sort_order: Some("descending".to_owned()),
            ..Default::default()
        };
        assert_eq!(resolve_sort(&filter), ("name", "DESC"));
    }

    #[test]
    fn test_assignments_cover_present_fields_only() {
        let mut builder = QueryBuilder::new("UPDATE items SET ");
        push_assignments(
            &mut builder,
            &UpdateItemInput {
                name: Some("Strut".to_owned()),
                price: Some(Decimal::new(4500, 2)),
                ..Default::default()
            },
        );
        let sql = builder.sql();
        assert_eq!(sql, "UPDATE items SET name = $1, price = $2, updated_at = NOW()");
    }

    #[test]
    fn test_diff_reports_only_changed_fields() {
        let old = Item {
            id: ItemId::new(1),
            name: "Strut".to_owned(),
            part_number: None,
            vehicle_make: None,
            vehicle_model: None,
            color: None,
            item_type: None,
            bay: None,
            sku: None,
            description: None,
            notes: None,
            weight: None,
            width: None,
            height: None,
            depth: None,
            price: Some(Decimal::new(8999, 2)),
            thumbnail_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let new = Item {
            price: Some(Decimal::new(9999, 2)),
            ..old.clone()
        };

        let changes = diff(&old, &new).into_value();
        assert_eq!(
            changes,
            json!({ "price": { "old": "89.99", "new": "99.99" } })
        );
    }
}
