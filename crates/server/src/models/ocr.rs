//! OCR result model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use partshed_core::{ItemId, OcrResultId};

/// Text extracted from an uploaded photo by the OCR collaborator.
#[derive(Debug, Clone, Serialize)]
pub struct OcrResult {
    pub id: OcrResultId,
    pub item_id: ItemId,
    /// Raw text as returned by the OCR engine.
    pub raw_text: Option<String>,
    /// Normalized variant (whitespace collapsed, part numbers uppercased).
    pub processed_text: Option<String>,
    /// Relative URL of the source image under `/uploads/images/`.
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}
