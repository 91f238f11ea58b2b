//! E-commerce listing endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};

use partshed_core::{AuditAction, ItemId, ListingId, ListingStatus};

use crate::clients::{Platform, build_listing_payload};
use crate::db::{ItemRepository, ListingRepository, NewListing, RepositoryError};
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::{Item, Listing};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/create-listing", post(create_listing))
        .route("/batch-create", post(batch_create))
        // GET reads {id} as an item id, PUT/DELETE as a listing id.
        .route(
            "/listings/{id}",
            get(list_listings).put(update_listing).delete(delete_listing),
        )
}

fn parse_platform(platform: &str) -> Result<Platform, AppError> {
    platform
        .parse()
        .map_err(|()| AppError::BadRequest("Unsupported platform".to_owned()))
}

#[derive(Debug, Deserialize)]
struct CreateListingRequest {
    item_id: Option<i32>,
    platform: Option<String>,
    listing_data: Option<Value>,
}

/// POST /api/ecommerce/create-listing
async fn create_listing(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<CreateListingRequest>,
) -> Result<Json<Value>, AppError> {
    let (Some(item_id), Some(platform_name), Some(listing_data)) =
        (request.item_id, request.platform, request.listing_data)
    else {
        return Err(AppError::BadRequest(
            "Item ID, platform, and listing data are required".to_owned(),
        ));
    };

    let item = ItemRepository::new(state.pool())
        .get(ItemId::new(item_id))
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".to_owned()))?;
    let platform = parse_platform(&platform_name)?;

    let payload = build_listing_payload(platform, &item, &listing_data);
    let remote = state.marketplace().publish(platform, &payload).await?;

    let listing = ListingRepository::new(state.pool())
        .create(
            &NewListing {
                item_id: item.id,
                platform: platform.as_str(),
                platform_listing_id: &remote.id,
                listing_url: &remote.url,
            },
            AuditAction::CreateListing,
            json!({ "platform": &platform_name, "listing_data": &listing_data }),
            user.id,
        )
        .await?;

    Ok(Json(json!({
        "msg": format!("Listing created on {platform_name}"),
        "listing": listing,
    })))
}

/// GET /api/ecommerce/listings/{item_id}
async fn list_listings(
    State(state): State<AppState>,
    RequireAuth(_): RequireAuth,
    Path(item_id): Path<i32>,
) -> Result<Json<Vec<Listing>>, AppError> {
    let item_id = ItemId::new(item_id);
    if ItemRepository::new(state.pool()).get(item_id).await?.is_none() {
        return Err(AppError::NotFound("Item not found".to_owned()));
    }

    let listings = ListingRepository::new(state.pool())
        .list_for_item(item_id)
        .await?;
    Ok(Json(listings))
}

#[derive(Debug, Deserialize)]
struct UpdateListingRequest {
    status: Option<String>,
}

/// PUT /api/ecommerce/listings/{id}
async fn update_listing(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
    Json(request): Json<UpdateListingRequest>,
) -> Result<Json<Listing>, AppError> {
    let Some(status) = request.status else {
        return Err(AppError::BadRequest("Status is required".to_owned()));
    };
    let status = status
        .parse::<ListingStatus>()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let listing = ListingRepository::new(state.pool())
        .update_status(ListingId::new(id), status, user.id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Listing not found".to_owned()),
            other => other.into(),
        })?;
    Ok(Json(listing))
}

/// DELETE /api/ecommerce/listings/{id}
async fn delete_listing(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    ListingRepository::new(state.pool())
        .delete(ListingId::new(id), user.id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Listing not found".to_owned()),
            other => other.into(),
        })?;

    Ok(Json(json!({ "msg": "Listing removed" })))
}

#[derive(Debug, Deserialize)]
struct BatchCreateRequest {
    items: Option<Vec<i32>>,
    platform: Option<String>,
    listing_template: Option<Value>,
}

/// The template merged with per-item fallbacks for title, description,
/// price, and SKU.
fn merge_template(template: &Value, item: &Item) -> Value {
    let mut data = template
        .as_object()
        .cloned()
        .unwrap_or_default();

    if !data.contains_key("title") {
        data.insert("title".to_owned(), json!(item.name));
    }
    if !data.contains_key("description") {
        data.insert("description".to_owned(), json!(item.description));
    }
    if !data.contains_key("price") {
        data.insert("price".to_owned(), json!(item.price));
    }
    if !data.contains_key("sku") {
        data.insert("sku".to_owned(), json!(format!("partshed-{}", item.id)));
    }
    Value::Object(data)
}

/// POST /api/ecommerce/batch-create
///
/// Partial-success semantics: each item is attempted independently and a
/// failure is reported in `errors` without failing the batch.
async fn batch_create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<BatchCreateRequest>,
) -> Result<Json<Value>, AppError> {
    let (Some(items), Some(platform_name), Some(template)) =
        (request.items, request.platform, request.listing_template)
    else {
        return Err(AppError::BadRequest(
            "Items array, platform, and listing template are required".to_owned(),
        ));
    };
    if items.is_empty() {
        return Err(AppError::BadRequest(
            "Items array, platform, and listing template are required".to_owned(),
        ));
    }
    let platform = parse_platform(&platform_name)?;

    let item_repo = ItemRepository::new(state.pool());
    let listing_repo = ListingRepository::new(state.pool());

    let mut listings = Vec::new();
    let mut errors = Vec::new();

    for item_id in items {
        let item = match item_repo.get(ItemId::new(item_id)).await {
            Ok(Some(item)) => item,
            Ok(None) => {
                errors.push(json!({ "item_id": item_id, "error": "Item not found" }));
                continue;
            }
            Err(e) => {
                errors.push(json!({ "item_id": item_id, "error": e.to_string() }));
                continue;
            }
        };

        let listing_data = merge_template(&template, &item);
        let payload = build_listing_payload(platform, &item, &listing_data);

        let result = async {
            let remote = state.marketplace().publish(platform, &payload).await?;
            let listing = listing_repo
                .create(
                    &NewListing {
                        item_id: item.id,
                        platform: platform.as_str(),
                        platform_listing_id: &remote.id,
                        listing_url: &remote.url,
                    },
                    AuditAction::BatchCreateListing,
                    json!({ "platform": &platform_name, "listing_data": &listing_data }),
                    user.id,
                )
                .await?;
            Ok::<Listing, AppError>(listing)
        }
        .await;

        match result {
            Ok(listing) => listings.push(listing),
            Err(e) => errors.push(json!({ "item_id": item_id, "error": e.to_string() })),
        }
    }

    Ok(Json(json!({
        "msg": format!("Batch created {} listings on {platform_name}", listings.len()),
        "successful": listings.len(),
        "failed": errors.len(),
        "listings": listings,
        "errors": errors,
    })))
}
