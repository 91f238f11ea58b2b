//! Outbound collaborator interfaces: OCR, scraper, and marketplace.
//!
//! Each collaborator is a trait held as `Arc<dyn ...>` in the application
//! state, so handlers stay testable without a network and the marketplace
//! seam can grow a real client later.

pub mod marketplace;
pub mod ocr;
pub mod scraper;

use thiserror::Error;

pub use marketplace::{
    MarketplaceClient, Platform, RemoteListing, StubMarketplaceClient, build_listing_payload,
};
pub use ocr::{HttpOcrClient, OcrClient, OcrExtraction};
pub use scraper::{HttpScraperClient, ScrapeHit, ScraperClient};

/// Errors from outbound collaborator calls.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// Transport-level failure (connect, timeout, non-2xx status).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The collaborator answered with a body we cannot use.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}
