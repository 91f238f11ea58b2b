//! Scraper endpoints: external search, enrichment, stored results.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};

use partshed_core::{ItemId, ScrapeResultId};

use crate::db::{ItemRepository, RepositoryError, ScrapeResultRepository};
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::{ScrapeResult, ScrapedFields};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/search", post(search))
        .route("/enrich/{item_id}", post(enrich))
        // GET reads {id} as an item id, DELETE as a scrape result id.
        .route("/results/{id}", get(list_results).delete(delete_result))
}

fn default_sources() -> Vec<String> {
    vec!["general".to_owned(), "specialized".to_owned()]
}

#[derive(Debug, Deserialize)]
struct SearchRequest {
    query: Option<String>,
    item_id: Option<i32>,
    #[serde(default = "default_sources")]
    sources: Vec<String>,
}

/// POST /api/scraper/search
///
/// With an `item_id` every hit is persisted against the item; without one
/// the hits are returned transiently.
async fn search(
    State(state): State<AppState>,
    RequireAuth(_): RequireAuth,
    Json(request): Json<SearchRequest>,
) -> Result<Json<Value>, AppError> {
    let query = request
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::BadRequest("Search query is required".to_owned()))?;

    let hits = state.scraper().search(query, &request.sources).await?;

    if let Some(item_id) = request.item_id {
        let item_id = ItemId::new(item_id);
        if ItemRepository::new(state.pool()).get(item_id).await?.is_none() {
            return Err(AppError::NotFound("Item not found".to_owned()));
        }

        let repo = ScrapeResultRepository::new(state.pool());
        let mut stored = Vec::with_capacity(hits.len());
        for hit in &hits {
            stored.push(
                repo.insert(item_id, hit.source_url.as_deref(), &hit.data)
                    .await?,
            );
        }

        return Ok(Json(json!({
            "scrape_results": stored,
            "item_id": item_id,
        })));
    }

    Ok(Json(json!({ "results": hits })))
}

#[derive(Debug, Deserialize)]
struct EnrichRequest {
    scrape_result_id: Option<i32>,
}

/// POST /api/scraper/enrich/{item_id}
///
/// Maps a stored scrape payload onto item fields and applies it as a
/// partial update.
async fn enrich(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(item_id): Path<i32>,
    Json(request): Json<EnrichRequest>,
) -> Result<Json<Value>, AppError> {
    let Some(scrape_result_id) = request.scrape_result_id else {
        return Err(AppError::BadRequest("Scrape result ID is required".to_owned()));
    };
    let item_id = ItemId::new(item_id);
    let scrape_result_id = ScrapeResultId::new(scrape_result_id);

    let pool = state.pool();
    let items = ItemRepository::new(pool);
    let item = items
        .get(item_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".to_owned()))?;

    let scrape_result = ScrapeResultRepository::new(pool)
        .get(scrape_result_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Scrape result not found".to_owned()))?;

    let fields = ScrapedFields::from_value(&scrape_result.scraped_data);
    if fields.is_empty() {
        return Ok(Json(json!({
            "msg": "No fields to update",
            "item": item,
        })));
    }

    let item = items
        .apply_enrichment(item_id, &fields, scrape_result_id, user.id)
        .await?;

    Ok(Json(json!({
        "msg": "Item enriched with scraped data",
        "item": item,
    })))
}

/// GET /api/scraper/results/{item_id}
async fn list_results(
    State(state): State<AppState>,
    RequireAuth(_): RequireAuth,
    Path(item_id): Path<i32>,
) -> Result<Json<Vec<ScrapeResult>>, AppError> {
    let item_id = ItemId::new(item_id);
    if ItemRepository::new(state.pool()).get(item_id).await?.is_none() {
        return Err(AppError::NotFound("Item not found".to_owned()));
    }

    let results = ScrapeResultRepository::new(state.pool())
        .list_for_item(item_id)
        .await?;
    Ok(Json(results))
}

/// DELETE /api/scraper/results/{id}
async fn delete_result(
    State(state): State<AppState>,
    RequireAuth(_): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    ScrapeResultRepository::new(state.pool())
        .delete(ScrapeResultId::new(id))
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Scrape result not found".to_owned()),
            other => other.into(),
        })?;

    Ok(Json(json!({ "msg": "Scrape result removed" })))
}
