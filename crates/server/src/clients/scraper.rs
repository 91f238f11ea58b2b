//! Scraper collaborator client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::CollaboratorError;

/// One scraped page: where it came from and what was found there.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeHit {
    pub source_url: Option<String>,
    pub data: Value,
}

/// Searches external part catalogs and marketplaces.
#[async_trait]
pub trait ScraperClient: Send + Sync {
    /// Run one search across the given sources.
    async fn search(
        &self,
        query: &str,
        sources: &[String],
    ) -> Result<Vec<ScrapeHit>, CollaboratorError>;
}

/// Production client posting JSON searches to the scraper service.
pub struct HttpScraperClient {
    http: reqwest::Client,
    url: String,
}

impl HttpScraperClient {
    #[must_use]
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }
}

/// Envelope the scraper service wraps its hits in.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<ScrapeHit>,
}

#[async_trait]
impl ScraperClient for HttpScraperClient {
    async fn search(
        &self,
        query: &str,
        sources: &[String],
    ) -> Result<Vec<ScrapeHit>, CollaboratorError> {
        let response = self
            .http
            .post(&self.url)
            .json(&json!({ "query": query, "sources": sources }))
            .send()
            .await?
            .error_for_status()?;

        let body = response
            .json::<SearchResponse>()
            .await
            .map_err(|e| CollaboratorError::UnexpectedResponse(e.to_string()))?;
        Ok(body.results)
    }
}
