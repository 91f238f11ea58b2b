//! Inventory item endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde_json::{Value, json};

use partshed_core::ItemId;

use crate::db::{
    ImageRepository, ItemRepository, ListingRepository, OcrResultRepository, RepositoryError,
    ScrapeResultRepository,
};
use crate::error::{AppError, FieldError};
use crate::middleware::RequireAuth;
use crate::models::{CreateItemInput, Item, ItemDetail, ItemFilter, ItemPage, UpdateItemInput};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/{id}", get(get_item).put(update_item).delete(delete_item))
}

fn item_not_found(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::NotFound("Item not found".to_owned()),
        other => other.into(),
    }
}

/// GET /api/items
async fn list_items(
    State(state): State<AppState>,
    RequireAuth(_): RequireAuth,
    Query(filter): Query<ItemFilter>,
) -> Result<Json<ItemPage>, AppError> {
    let page = ItemRepository::new(state.pool()).list(&filter).await?;
    Ok(Json(page))
}

/// GET /api/items/{id} - the item with all of its dependent records.
async fn get_item(
    State(state): State<AppState>,
    RequireAuth(_): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Json<ItemDetail>, AppError> {
    let id = ItemId::new(id);
    let pool = state.pool();

    let item = ItemRepository::new(pool)
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".to_owned()))?;

    let images = ImageRepository::new(pool).list_for_item(id).await?;
    let ocr_results = OcrResultRepository::new(pool).list_for_item(id).await?;
    let scrape_results = ScrapeResultRepository::new(pool).list_for_item(id).await?;
    let ecommerce_listings = ListingRepository::new(pool).list_for_item(id).await?;

    Ok(Json(ItemDetail {
        item,
        images,
        ocr_results,
        scrape_results,
        ecommerce_listings,
    }))
}

/// POST /api/items
async fn create_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(input): Json<CreateItemInput>,
) -> Result<(StatusCode, Json<Item>), AppError> {
    if input.name.trim().is_empty() {
        return Err(AppError::Validation(vec![FieldError::new(
            "name",
            "Name is required",
        )]));
    }

    let item = ItemRepository::new(state.pool())
        .create(&input, user.id)
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/items/{id}
async fn update_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
    Json(input): Json<UpdateItemInput>,
) -> Result<Json<Item>, AppError> {
    let item = ItemRepository::new(state.pool())
        .update(ItemId::new(id), &input, user.id)
        .await
        .map_err(item_not_found)?;
    Ok(Json(item))
}

/// DELETE /api/items/{id}
async fn delete_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    ItemRepository::new(state.pool())
        .delete(ItemId::new(id), user.id)
        .await
        .map_err(item_not_found)?;
    Ok(Json(json!({ "msg": "Item removed" })))
}
