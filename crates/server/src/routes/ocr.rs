//! OCR endpoints.

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    routing::{get, post},
};
use chrono::Utc;
use serde_json::{Value, json};

use partshed_core::{ItemId, OcrResultId};

use crate::db::{ItemRepository, OcrResultRepository, RepositoryError};
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::OcrResult;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload))
        // GET reads {id} as an item id, DELETE as an OCR result id.
        .route("/results/{id}", get(list_results).delete(delete_result))
}

/// POST /api/ocr/upload
///
/// Stores the image, runs it through the OCR collaborator, and attaches the
/// result to the given item. Without an `item_id` a new item is minted with
/// the image as its thumbnail.
async fn upload(
    State(state): State<AppState>,
    RequireAuth(_): RequireAuth,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut item_id: Option<i32> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        match field.name() {
            Some("image") => {
                let filename = field.file_name().unwrap_or("image").to_owned();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                file = Some((filename, bytes.to_vec()));
            }
            Some("item_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                item_id = Some(
                    text.parse()
                        .map_err(|_| AppError::BadRequest("Invalid item_id".to_owned()))?,
                );
            }
            _ => {}
        }
    }

    let Some((filename, bytes)) = file else {
        return Err(AppError::BadRequest("No image file uploaded".to_owned()));
    };

    let stored = state.uploads().save_image(&filename, &bytes).await?;
    let extraction = state.ocr().extract(bytes, stored.filename.clone()).await?;

    let pool = state.pool();
    let items = ItemRepository::new(pool);
    let results = OcrResultRepository::new(pool);

    if let Some(item_id) = item_id {
        let item_id = ItemId::new(item_id);
        if items.get(item_id).await?.is_none() {
            return Err(AppError::NotFound("Item not found".to_owned()));
        }

        let ocr_result = results
            .insert(
                item_id,
                extraction.text.as_deref(),
                extraction.processed_text.as_deref(),
                Some(&stored.url),
            )
            .await?;

        return Ok(Json(json!({
            "ocr_result": ocr_result,
            "item_id": item_id,
        })));
    }

    // No target item: mint one named after the capture time.
    let name = format!("Item from OCR {}", Utc::now().to_rfc3339());
    let item = items.create_minimal(&name, Some(&stored.url)).await?;
    let ocr_result = results
        .insert(
            item.id,
            extraction.text.as_deref(),
            extraction.processed_text.as_deref(),
            Some(&stored.url),
        )
        .await?;

    Ok(Json(json!({
        "ocr_result": ocr_result,
        "item": item,
    })))
}

/// GET /api/ocr/results/{item_id}
async fn list_results(
    State(state): State<AppState>,
    RequireAuth(_): RequireAuth,
    Path(item_id): Path<i32>,
) -> Result<Json<Vec<OcrResult>>, AppError> {
    let item_id = ItemId::new(item_id);
    if ItemRepository::new(state.pool()).get(item_id).await?.is_none() {
        return Err(AppError::NotFound("Item not found".to_owned()));
    }

    let results = OcrResultRepository::new(state.pool())
        .list_for_item(item_id)
        .await?;
    Ok(Json(results))
}

/// DELETE /api/ocr/results/{id}
async fn delete_result(
    State(state): State<AppState>,
    RequireAuth(_): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    OcrResultRepository::new(state.pool())
        .delete(OcrResultId::new(id))
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("OCR result not found".to_owned()),
            other => other.into(),
        })?;

    Ok(Json(json!({ "msg": "OCR result removed" })))
}
