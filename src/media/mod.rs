//! Image files attached to business and event forms.
//!
//! Files are read asynchronously and can be abandoned through a
//! [`CancellationToken`] when the form that requested them goes away.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::multipart::Part;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::api::validation::{is_allowed_image_type, validate_image_file_name};

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    UnsupportedFormat(String),

    #[error("Image load cancelled")]
    Cancelled,
}

/// An image ready to be attached to a multipart body
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl ImageUpload {
    /// Wrap in-memory image bytes. The format is inferred from the file name
    /// and must be on the allow-list.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, MediaError> {
        let file_name = file_name.into();
        validate_image_file_name(&file_name).map_err(MediaError::UnsupportedFormat)?;

        let content_type = mime_guess::from_path(&file_name)
            .first()
            .map(|m| m.essence_str().to_string())
            .ok_or_else(|| {
                MediaError::UnsupportedFormat(format!("Unknown image type for {}", file_name))
            })?;

        if !is_allowed_image_type(&content_type) {
            return Err(MediaError::UnsupportedFormat(format!(
                "Unsupported image type {} for {}",
                content_type, file_name
            )));
        }

        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, MediaError> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        // Reject by name before paying for the read
        validate_image_file_name(&file_name).map_err(MediaError::UnsupportedFormat)?;

        let bytes = tokio::fs::read(path).await.map_err(|source| MediaError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(file = %path.display(), size = bytes.len(), "Loaded image");
        Self::new(file_name, bytes)
    }

    /// Like [`ImageUpload::from_path`], abandoning the read once `cancel` fires
    pub async fn from_path_cancellable(
        path: impl AsRef<Path>,
        cancel: &CancellationToken,
    ) -> Result<Self, MediaError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(MediaError::Cancelled),
            result = Self::from_path(path) => result,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// `data:` URL suitable for an inline preview
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.content_type, STANDARD.encode(&self.bytes))
    }

    pub(crate) fn to_part(&self) -> reqwest::Result<Part> {
        Part::bytes(self.bytes.clone())
            .file_name(self.file_name.clone())
            .mime_str(&self.content_type)
    }
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Load a preview for a picked file, or stop early if the picker is closed
pub async fn load_preview(
    path: impl AsRef<Path>,
    cancel: &CancellationToken,
) -> Result<String, MediaError> {
    let image = ImageUpload::from_path_cancellable(path, cancel).await?;
    Ok(image.data_url())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_is_inferred() {
        let image = ImageUpload::new("cover.jpg", vec![0xFF, 0xD8]).unwrap();
        assert_eq!(image.content_type(), "image/jpeg");

        let image = ImageUpload::new("logo.webp", vec![1]).unwrap();
        assert_eq!(image.content_type(), "image/webp");
    }

    #[test]
    fn test_disallowed_formats_are_rejected() {
        assert!(matches!(
            ImageUpload::new("vector.svg", vec![1]),
            Err(MediaError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            ImageUpload::new("menu.pdf", vec![1]),
            Err(MediaError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_data_url() {
        let image = ImageUpload::new("dot.png", b"png".to_vec()).unwrap();
        assert_eq!(image.data_url(), "data:image/png;base64,cG5n");
    }

    #[test]
    fn test_debug_omits_bytes() {
        let image = ImageUpload::new("dot.gif", vec![0; 2048]).unwrap();
        let debug = format!("{:?}", image);
        assert!(debug.contains("size: 2048"));
        assert!(!debug.contains("0, 0, 0"));
    }

    #[tokio::test]
    async fn test_load_preview_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("avatar.bmp");
        tokio::fs::write(&path, b"BM").await.unwrap();

        let cancel = CancellationToken::new();
        let preview = load_preview(&path, &cancel).await.unwrap();
        assert_eq!(preview, "data:image/bmp;base64,Qk0=");
    }

    #[tokio::test]
    async fn test_cancelled_load_returns_cancelled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.png");
        tokio::fs::write(&path, b"png").await.unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = ImageUpload::from_path_cancellable(&path, &cancel).await;
        assert!(matches!(result, Err(MediaError::Cancelled)));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let result = ImageUpload::from_path("/nonexistent/cover.png").await;
        assert!(matches!(result, Err(MediaError::Io { .. })));
    }
}
