//! Local-disk storage for uploaded business assets, served under `/uploads`.

use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

/// URL prefix the upload directory is mounted at.
pub const PUBLIC_PREFIX: &str = "/uploads";

// Raster formats only; SVG is refused.
const ALLOWED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "webp", "gif"];

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("unsupported file type (allowed: png, jpg, jpeg, webp, gif)")]
    UnsupportedType,

    #[error("empty upload")]
    Empty,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` under a fresh name and return its public URL.
    ///
    /// The extension comes from the client file name, falling back to the
    /// content type; anything outside the image whitelist is refused.
    pub async fn save(
        &self,
        file_name: Option<&str>,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<String, UploadError> {
        if bytes.is_empty() {
            return Err(UploadError::Empty);
        }
        let ext = file_name
            .and_then(extension_of)
            .or_else(|| content_type.and_then(extension_for_mime))
            .ok_or(UploadError::UnsupportedType)?;

        tokio::fs::create_dir_all(&self.root).await?;
        let name = format!("{}.{}", Uuid::now_v7(), ext);
        tokio::fs::write(self.root.join(&name), bytes).await?;

        tracing::debug!(file = %name, size = bytes.len(), "upload stored");
        Ok(format!("{PUBLIC_PREFIX}/{name}"))
    }

    /// Delete a file previously returned by [`save`](Self::save).
    ///
    /// URLs outside the upload prefix, or that try to leave the upload
    /// directory, are ignored. Missing files are not an error.
    pub async fn remove(&self, url: &str) -> Result<(), UploadError> {
        let Some(name) = url
            .strip_prefix(PUBLIC_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
        else {
            return Ok(());
        };
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Ok(());
        }

        match tokio::fs::remove_file(self.root.join(name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn extension_of(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.iter().copied().find(|allowed| *allowed == ext)
}

fn extension_for_mime(content_type: &str) -> Option<&'static str> {
    match content_type.split(';').next()?.trim() {
        "image/png" => Some("png"),
        "image/jpeg" => Some("jpg"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}
