//! HTTP route handlers.
//!
//! Route structure:
//! ```text
//! /api
//! ├── /auth        - register, login, current user, profile update
//! ├── /items       - inventory CRUD with filtering and pagination
//! ├── /uploads     - image/file uploads, primary-image management
//! ├── /ocr         - OCR upload and results
//! ├── /scraper     - external search, enrichment, results
//! └── /ecommerce   - marketplace listings, batch creation
//! ```
//!
//! Everything except `/api/auth/register` and `/api/auth/login` requires a
//! bearer token.

pub mod auth;
pub mod ecommerce;
pub mod items;
pub mod ocr;
pub mod scraper;
pub mod uploads;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth::routes())
        .nest("/api/items", items::routes())
        .nest("/api/uploads", uploads::routes())
        .nest("/api/ocr", ocr::routes())
        .nest("/api/scraper", scraper::routes())
        .nest("/api/ecommerce", ecommerce::routes())
}
