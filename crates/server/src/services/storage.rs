//! Local filesystem storage for uploaded files.
//!
//! Files land under `{root}/images/` or `{root}/files/` and are served back
//! at the relative URLs `/uploads/images/{name}` and `/uploads/files/{name}`.

use std::path::{Component, Path, PathBuf};

use chrono::Utc;
use rand::Rng;
use thiserror::Error;

use crate::error::AppError;

/// Extensions accepted for image uploads.
const IMAGE_EXTENSIONS: [&str; 6] = ["jpeg", "jpg", "png", "gif", "bmp", "tiff"];

/// Errors from saving or removing uploaded files.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The file is not an accepted image type.
    #[error("only image files are allowed")]
    NotAnImage,

    /// A stored URL pointing outside the upload root.
    #[error("invalid upload path: {0}")]
    InvalidPath(String),

    /// Filesystem failure.
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::NotAnImage => Self::BadRequest("Only image files are allowed".to_owned()),
            UploadError::InvalidPath(p) => Self::BadRequest(format!("Invalid upload path: {p}")),
            UploadError::Io(e) => Self::Internal(format!("upload storage failed: {e}")),
        }
    }
}

/// A file persisted to the upload root.
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Relative URL the SPA can fetch the file from.
    pub url: String,
    pub filename: String,
    pub size: usize,
}

/// Saves uploads under a configured root directory.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Save an image upload, enforcing the image extension allow-list.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::NotAnImage` for a disallowed extension, or
    /// `UploadError::Io` if the write fails.
    pub async fn save_image(
        &self,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<StoredFile, UploadError> {
        if !is_allowed_image(original_name) {
            return Err(UploadError::NotAnImage);
        }
        self.save("images", "image", original_name, bytes).await
    }

    /// Save an arbitrary file upload. No type restriction.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::Io` if the write fails.
    pub async fn save_file(
        &self,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<StoredFile, UploadError> {
        self.save("files", "file", original_name, bytes).await
    }

    async fn save(
        &self,
        subdir: &str,
        prefix: &str,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<StoredFile, UploadError> {
        let dir = self.root.join(subdir);
        tokio::fs::create_dir_all(&dir).await?;

        let filename = unique_name(prefix, original_name);
        tokio::fs::write(dir.join(&filename), bytes).await?;

        Ok(StoredFile {
            url: format!("/uploads/{subdir}/{filename}"),
            filename,
            size: bytes.len(),
        })
    }

    /// Delete the file behind a stored `/uploads/...` URL. Missing files are
    /// not an error; the database row is the source of truth.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::InvalidPath` for URLs escaping the upload root,
    /// or `UploadError::Io` on filesystem failure other than not-found.
    pub async fn remove_by_url(&self, url: &str) -> Result<(), UploadError> {
        let relative = url
            .strip_prefix("/uploads/")
            .ok_or_else(|| UploadError::InvalidPath(url.to_owned()))?;
        let relative = Path::new(relative);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(UploadError::InvalidPath(url.to_owned()));
        }

        match tokio::fs::remove_file(self.root.join(relative)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// `{prefix}-{millis}-{rand}{ext}`, unique enough for one upload directory.
fn unique_name(prefix: &str, original_name: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: u32 = rand::rng().random_range(0..1_000_000_000);
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default();
    format!("{prefix}-{millis}-{suffix}{ext}")
}

fn is_allowed_image(original_name: &str) -> bool {
    Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_name_format() {
        let name = unique_name("image", "Photo.JPG");
        assert!(name.starts_with("image-"));
        assert!(name.ends_with(".jpg"));
        assert_eq!(name.matches('-').count(), 2);
    }

    #[test]
    fn test_unique_name_without_extension() {
        let name = unique_name("file", "README");
        assert!(name.starts_with("file-"));
        assert!(!name.contains('.'));
    }

    #[test]
    fn test_image_extension_allow_list() {
        assert!(is_allowed_image("rotor.png"));
        assert!(is_allowed_image("rotor.TIFF"));
        assert!(!is_allowed_image("rotor.svg"));
        assert!(!is_allowed_image("rotor.pdf"));
        assert!(!is_allowed_image("rotor"));
    }

    #[tokio::test]
    async fn test_save_and_remove_roundtrip() {
        let dir = std::env::temp_dir().join(format!("partshed-test-{}", std::process::id()));
        let store = UploadStore::new(&dir);

        let stored = store
            .save_image("part.jpg", b"not really a jpeg")
            .await
            .expect("save");
        assert!(stored.url.starts_with("/uploads/images/image-"));
        assert_eq!(stored.size, 17);

        store.remove_by_url(&stored.url).await.expect("remove");
        // Second removal is a no-op, not an error.
        store.remove_by_url(&stored.url).await.expect("idempotent");

        tokio::fs::remove_dir_all(&dir).await.expect("cleanup");
    }

    #[tokio::test]
    async fn test_remove_rejects_traversal() {
        let store = UploadStore::new("uploads");
        assert!(
            store
                .remove_by_url("/uploads/../../etc/passwd")
                .await
                .is_err()
        );
        assert!(store.remove_by_url("/elsewhere/file.txt").await.is_err());
    }
}
