//! OCR collaborator client.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use super::CollaboratorError;

/// Text extracted from one image by the OCR service.
#[derive(Debug, Clone, Deserialize)]
pub struct OcrExtraction {
    pub text: Option<String>,
    pub processed_text: Option<String>,
}

/// Extracts text from part photos.
#[async_trait]
pub trait OcrClient: Send + Sync {
    /// Run OCR over one image.
    async fn extract(&self, image: Vec<u8>, filename: String)
    -> Result<OcrExtraction, CollaboratorError>;
}

/// Production client posting multipart images to the OCR service.
pub struct HttpOcrClient {
    http: reqwest::Client,
    url: String,
}

impl HttpOcrClient {
    #[must_use]
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }
}

#[async_trait]
impl OcrClient for HttpOcrClient {
    async fn extract(
        &self,
        image: Vec<u8>,
        filename: String,
    ) -> Result<OcrExtraction, CollaboratorError> {
        let form = Form::new().part("image", Part::bytes(image).file_name(filename));

        let response = self
            .http
            .post(&self.url)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;

        let extraction = response
            .json::<OcrExtraction>()
            .await
            .map_err(|e| CollaboratorError::UnexpectedResponse(e.to_string()))?;
        Ok(extraction)
    }
}
