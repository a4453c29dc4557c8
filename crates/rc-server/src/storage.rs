//! On-disk layout for uploaded media.

use std::path::{Path, PathBuf};

use axum::extract::multipart::{Field, MultipartError};
use rc_core::VideoId;
use tokio::io::AsyncWriteExt;

/// Paths of the two files stored for one video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPaths {
    pub video: PathBuf,
    pub thumbnail: PathBuf,
}

impl StoredPaths {
    /// `{upload_dir}/{id}.mp4` and `{upload_dir}/{id}.jpg`.
    pub fn for_video(upload_dir: &Path, id: VideoId) -> Self {
        Self {
            video: upload_dir.join(format!("{id}.mp4")),
            thumbnail: upload_dir.join(format!("{id}.jpg")),
        }
    }

    /// Remove both files, ignoring any that are already gone.
    pub async fn remove(&self) {
        remove_quietly(&self.video).await;
        remove_quietly(&self.thumbnail).await;
    }
}

pub(crate) fn multipart_error(e: MultipartError) -> rc_core::Error {
    rc_core::Error::Validation(format!("invalid multipart body: {}", e.body_text()))
}

/// Stream a multipart field to `path`, returning the number of bytes written.
pub async fn write_field(field: &mut Field<'_>, path: &Path) -> rc_core::Result<u64> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut written = 0u64;
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}

/// Best-effort delete.
pub async fn remove_quietly(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!(path = %path.display(), "Removed stored file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to remove stored file"),
    }
}
