use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::{fs, io::AsyncWriteExt};
use uuid::Uuid;

use crate::{
    config::UploadConfig,
    error::{AppError, Result},
    models::PLACEHOLDER_IMAGE,
};

/// Directory under the public root that holds uploaded images.
pub const UPLOADS_DIR: &str = "uploads";

const ALLOWED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// Cap on the client part of a stored name; the timestamp, uuid and temp
/// suffix must still fit in a 255-byte file name and the `image` column.
const MAX_CLIENT_NAME_LEN: usize = 120;

/// Writes product images under `<public_dir>/uploads` and hands back the
/// relative reference stored on the product row.
#[derive(Debug, Clone)]
pub struct ImageUploader {
    public_dir: PathBuf,
    max_size: usize,
}

impl ImageUploader {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            public_dir: config.public_dir.clone(),
            max_size: config.max_image_size,
        }
    }

    pub fn public_dir(&self) -> &Path {
        &self.public_dir
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.public_dir.join(UPLOADS_DIR)
    }

    /// Creates the uploads directory if needed; used at startup and by readiness checks.
    pub async fn ensure_ready(&self) -> Result<()> {
        let dir = self.uploads_dir();
        fs::create_dir_all(&dir).await.map_err(|e| {
            AppError::ConfigError(format!(
                "Uploads directory {} is not usable: {}",
                dir.display(),
                e
            ))
        })
    }

    pub async fn store(&self, bytes: &[u8], original_name: &str) -> Result<String> {
        if bytes.is_empty() {
            return Err(AppError::Upload("The uploaded image is empty.".to_string()));
        }

        if bytes.len() > self.max_size {
            return Err(AppError::Upload(format!(
                "The image may not be greater than {} kilobytes.",
                self.max_size / 1024
            )));
        }

        let file_name = sanitize_file_name(original_name);
        if !has_allowed_extension(&file_name) {
            return Err(AppError::Upload(format!(
                "The image must be a file of type: {}.",
                ALLOWED_EXTENSIONS.join(", ")
            )));
        }

        let unique_name = format!(
            "{}_{}_{}",
            Utc::now().timestamp(),
            Uuid::new_v4().simple(),
            file_name
        );

        let dir = self.uploads_dir();
        self.write_atomically(&dir, &unique_name, bytes)
            .await
            .map_err(|e| {
                tracing::error!("Failed to write image {} to {}: {}", unique_name, dir.display(), e);
                AppError::Upload("The image could not be saved.".to_string())
            })?;

        let reference = format!("{}/{}", UPLOADS_DIR, unique_name);
        tracing::info!("Stored product image {}", reference);

        Ok(reference)
    }

    async fn write_atomically(&self, dir: &Path, name: &str, bytes: &[u8]) -> std::io::Result<()> {
        fs::create_dir_all(dir).await?;

        let target = dir.join(name);
        let temp = dir.join(format!(".{}.tmp", name));

        {
            let mut file = fs::OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(&temp)
                .await?;
            file.write_all(bytes).await?;
            file.sync_all().await?;
        }

        if let Err(e) = fs::rename(&temp, &target).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e);
        }

        Ok(())
    }

    /// Deletes a stored upload. Returns `false` for the placeholder, for
    /// references outside the uploads directory, and for files already gone.
    pub async fn remove(&self, reference: &str) -> Result<bool> {
        if reference == PLACEHOLDER_IMAGE {
            return Ok(false);
        }

        let Some(name) = reference.strip_prefix(&format!("{}/", UPLOADS_DIR)) else {
            return Ok(false);
        };

        if name.is_empty() || name.contains('/') || name.contains('\\') || name.starts_with('.') {
            return Ok(false);
        }

        match fs::remove_file(self.uploads_dir().join(name)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::InternalError(format!(
                "Failed to remove image {}: {}",
                reference, e
            ))),
        }
    }

    /// Best-effort cleanup; failures are only logged.
    pub async fn discard(&self, reference: &str) {
        if let Err(e) = self.remove(reference).await {
            tracing::warn!("Could not clean up image {}: {}", reference, e);
        }
    }
}

/// Keeps the final path component and only `[A-Za-z0-9._-]`, shortening the
/// stem so the result fits in `MAX_CLIENT_NAME_LEN` with its extension intact.
fn sanitize_file_name(original_name: &str) -> String {
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        return "image".to_string();
    }

    truncate_stem(cleaned, MAX_CLIENT_NAME_LEN)
}

// Input is ASCII after sanitizing, so byte slicing stays on char boundaries.
fn truncate_stem(name: &str, max_len: usize) -> String {
    if name.len() <= max_len {
        return name.to_string();
    }

    match name.rfind('.') {
        Some(dot) if name.len() - dot < max_len => {
            let extension = &name[dot..];
            let stem = &name[..max_len - extension.len()];
            format!("{}{}", stem, extension)
        }
        _ => name[..max_len].to_string(),
    }
}

fn has_allowed_extension(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
