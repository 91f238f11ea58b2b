//! Upload endpoints: images, general files, and primary-image management.

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    routing::{get, post, put},
};
use serde_json::{Value, json};

use partshed_core::{ImageId, ItemId};

use crate::db::{ImageRepository, ItemRepository, RepositoryError};
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::Image;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/image", post(upload_image))
        .route("/file", post(upload_file))
        // GET reads {id} as an item id, DELETE as an image id, mirroring
        // the SPA's existing contract.
        .route("/images/{id}", get(list_images).delete(delete_image))
        .route("/images/{id}/set-primary", put(set_primary_image))
}

/// One file plus the text fields that arrived alongside it.
struct UploadForm {
    file: Option<(String, String, Vec<u8>)>,
    item_id: Option<i32>,
    is_primary: bool,
}

/// Drain a multipart body looking for one file field with the given name.
async fn read_form(mut multipart: Multipart, file_field: &str) -> Result<UploadForm, AppError> {
    let mut form = UploadForm {
        file: None,
        item_id: None,
        is_primary: false,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        match field.name() {
            Some(name) if name == file_field => {
                let filename = field.file_name().unwrap_or(file_field).to_owned();
                let mimetype = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_owned();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.file = Some((filename, mimetype, bytes.to_vec()));
            }
            Some("item_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.item_id = Some(
                    text.parse()
                        .map_err(|_| AppError::BadRequest("Invalid item_id".to_owned()))?,
                );
            }
            Some("is_primary") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.is_primary = text == "true";
            }
            _ => {}
        }
    }

    Ok(form)
}

/// POST /api/uploads/image
///
/// With `item_id`, the stored image is attached to that item; marking it
/// primary also points the item's thumbnail at it.
async fn upload_image(
    State(state): State<AppState>,
    RequireAuth(_): RequireAuth,
    multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let form = read_form(multipart, "image").await?;
    let Some((filename, mimetype, bytes)) = form.file else {
        return Err(AppError::BadRequest("No image file uploaded".to_owned()));
    };

    let stored = state.uploads().save_image(&filename, &bytes).await?;

    if let Some(item_id) = form.item_id {
        let image = ImageRepository::new(state.pool())
            .insert(ItemId::new(item_id), &stored.url, form.is_primary)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AppError::NotFound("Item not found".to_owned()),
                other => other.into(),
            })?;

        return Ok(Json(json!({
            "image": image,
            "item_id": item_id,
            "url": stored.url,
        })));
    }

    Ok(Json(json!({
        "url": stored.url,
        "filename": stored.filename,
        "size": stored.size,
        "mimetype": mimetype,
    })))
}

/// POST /api/uploads/file
async fn upload_file(
    State(state): State<AppState>,
    RequireAuth(_): RequireAuth,
    multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let form = read_form(multipart, "file").await?;
    let Some((filename, mimetype, bytes)) = form.file else {
        return Err(AppError::BadRequest("No file uploaded".to_owned()));
    };

    let stored = state.uploads().save_file(&filename, &bytes).await?;

    Ok(Json(json!({
        "url": stored.url,
        "filename": stored.filename,
        "size": stored.size,
        "mimetype": mimetype,
    })))
}

/// GET /api/uploads/images/{item_id}
async fn list_images(
    State(state): State<AppState>,
    RequireAuth(_): RequireAuth,
    Path(item_id): Path<i32>,
) -> Result<Json<Vec<Image>>, AppError> {
    let item_id = ItemId::new(item_id);
    let exists = ItemRepository::new(state.pool()).get(item_id).await?;
    if exists.is_none() {
        return Err(AppError::NotFound("Item not found".to_owned()));
    }

    let images = ImageRepository::new(state.pool())
        .list_for_item(item_id)
        .await?;
    Ok(Json(images))
}

/// DELETE /api/uploads/images/{id}
async fn delete_image(
    State(state): State<AppState>,
    RequireAuth(_): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    let deleted = ImageRepository::new(state.pool())
        .delete(ImageId::new(id))
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Image not found".to_owned()),
            other => other.into(),
        })?;

    // Best effort: the row is gone either way.
    if let Err(e) = state.uploads().remove_by_url(&deleted.url).await {
        tracing::warn!(url = %deleted.url, error = %e, "failed to remove image file");
    }

    Ok(Json(json!({ "msg": "Image removed" })))
}

/// PUT /api/uploads/images/{id}/set-primary
async fn set_primary_image(
    State(state): State<AppState>,
    RequireAuth(_): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    let image = ImageRepository::new(state.pool())
        .set_primary(ImageId::new(id))
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Image not found".to_owned()),
            other => other.into(),
        })?;

    Ok(Json(json!({
        "msg": "Image set as primary",
        "image_id": image.id,
        "item_id": image.item_id,
    })))
}
