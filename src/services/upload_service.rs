use std::path::{Path, PathBuf};

use actix_multipart::{Field, Multipart};
use chrono::Utc;
use futures::StreamExt;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

pub const AVATAR_FIELD: &str = "avatar";
const FALLBACK_FILE_NAME: &str = "upload";

#[derive(Error, Debug)]
pub enum UploadError {
    /// The request body is not a readable multipart form.
    #[error("Multipart error: {0}")]
    MultipartError(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

/// Writes uploaded files into a local directory served under `/uploads`.
pub struct UploadService {
    upload_dir: PathBuf,
}

impl UploadService {
    pub async fn open(upload_dir: impl Into<PathBuf>) -> Result<Self, UploadError> {
        let upload_dir = upload_dir.into();
        tokio::fs::create_dir_all(&upload_dir)
            .await
            .map_err(|e| UploadError::StorageError(format!("{}: {}", upload_dir.display(), e)))?;

        Ok(Self { upload_dir })
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Saves the first file sent in the `avatar` field and returns its stored
    /// name. `None` when the form carried no such file.
    pub async fn save_avatar(&self, mut payload: Multipart) -> Result<Option<String>, UploadError> {
        let mut stored = None;

        while let Some(item) = payload.next().await {
            let mut field = item.map_err(|e| UploadError::MultipartError(e.to_string()))?;

            let file_name = field
                .content_disposition()
                .filter(|cd| cd.get_name() == Some(AVATAR_FIELD))
                .and_then(|cd| cd.get_filename())
                .map(str::to_string);

            let Some(file_name) = file_name.filter(|_| stored.is_none()) else {
                // Drain fields we do not keep so the stream can advance.
                while let Some(chunk) = field.next().await {
                    chunk.map_err(|e| UploadError::MultipartError(e.to_string()))?;
                }
                continue;
            };

            let name = stored_file_name(&file_name);
            let path = self.upload_dir.join(&name);
            if let Err(err) = write_field(&mut field, &path).await {
                if let Err(remove_err) = tokio::fs::remove_file(&path).await {
                    log::warn!("Failed to remove partial upload {}: {}", path.display(), remove_err);
                }
                return Err(err);
            }

            log::info!("Stored upload {} ({})", name, path.display());
            stored = Some(name);
        }

        Ok(stored)
    }
}

async fn write_field(field: &mut Field, path: &Path) -> Result<(), UploadError> {
    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|e| UploadError::StorageError(format!("{}: {}", path.display(), e)))?;

    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| UploadError::MultipartError(e.to_string()))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| UploadError::StorageError(e.to_string()))?;
    }
    file.flush()
        .await
        .map_err(|e| UploadError::StorageError(e.to_string()))
}

/// `<unix millis>-<original name>`, keeping only the last path component of
/// the client-supplied name.
pub fn stored_file_name(original: &str) -> String {
    let base = original
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .unwrap_or(FALLBACK_FILE_NAME);

    format!("{}-{}", Utc::now().timestamp_millis(), base)
}
