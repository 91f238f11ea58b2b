//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::clients::{
    HttpOcrClient, HttpScraperClient, MarketplaceClient, OcrClient, ScraperClient,
    StubMarketplaceClient,
};
use crate::config::ServerConfig;
use crate::services::UploadStore;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Collaborator clients are trait objects so
/// tests can swap in fakes with [`AppState::with_collaborators`].
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    ocr: Arc<dyn OcrClient>,
    scraper: Arc<dyn ScraperClient>,
    marketplace: Arc<dyn MarketplaceClient>,
    uploads: UploadStore,
}

impl AppState {
    /// Create the production state: HTTP collaborator clients plus the
    /// stubbed marketplace (no real platform integration is configured).
    #[must_use]
    pub fn new(config: ServerConfig, pool: PgPool) -> Self {
        let http = reqwest::Client::new();
        let ocr = Arc::new(HttpOcrClient::new(
            http.clone(),
            config.ocr_service_url.clone(),
        ));
        let scraper = Arc::new(HttpScraperClient::new(
            http,
            config.scraper_service_url.clone(),
        ));
        Self::with_collaborators(config, pool, ocr, scraper, Arc::new(StubMarketplaceClient))
    }

    /// Create state with explicit collaborator implementations.
    #[must_use]
    pub fn with_collaborators(
        config: ServerConfig,
        pool: PgPool,
        ocr: Arc<dyn OcrClient>,
        scraper: Arc<dyn ScraperClient>,
        marketplace: Arc<dyn MarketplaceClient>,
    ) -> Self {
        let uploads = UploadStore::new(&config.uploads_dir);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                ocr,
                scraper,
                marketplace,
                uploads,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the OCR collaborator.
    #[must_use]
    pub fn ocr(&self) -> &dyn OcrClient {
        self.inner.ocr.as_ref()
    }

    /// Get a reference to the scraper collaborator.
    #[must_use]
    pub fn scraper(&self) -> &dyn ScraperClient {
        self.inner.scraper.as_ref()
    }

    /// Get a reference to the marketplace collaborator.
    #[must_use]
    pub fn marketplace(&self) -> &dyn MarketplaceClient {
        self.inner.marketplace.as_ref()
    }

    /// Get a reference to the upload store.
    #[must_use]
    pub fn uploads(&self) -> &UploadStore {
        &self.inner.uploads
    }
}
