use crate::backend::{clean_key, detect_content_type};
use crate::{StorageBackend, StorageError, StorageMetadata, StorageResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

/// Filesystem backend rooted at `base_path`.
///
/// Writes go to a uniquely named sibling and are renamed into place, so two
/// writers racing on the same key never leave a torn file behind.
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Validate and sanitize the storage path to prevent directory traversal
    fn validate_path(&self, path: &str) -> StorageResult<PathBuf> {
        let clean_path = clean_key(path)?;
        let full_path = self.base_path.join(clean_path);

        // Ensure the path is within our base directory
        if !full_path.starts_with(&self.base_path) {
            return Err(StorageError::InvalidPath(format!(
                "Path outside base directory: {}",
                path
            )));
        }

        Ok(full_path)
    }

    /// Ensure the parent directory exists
    async fn ensure_parent_dir(&self, file_path: &Path) -> StorageResult<()> {
        if let Some(parent) = file_path.parent() {
            if !fs::try_exists(parent).await? {
                debug!("Creating directory: {:?}", parent);
                fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }

    fn temp_path(file_path: &Path) -> PathBuf {
        let file_name = file_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        file_path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()))
    }
}

#[async_trait]
impl StorageBackend for LocalStorage {
    async fn read(&self, path: &str) -> StorageResult<Vec<u8>> {
        let file_path = self.validate_path(path)?;

        debug!("Reading file from: {:?}", file_path);

        match fs::read(&file_path).await {
            Ok(data) => {
                debug!("Read file: {} bytes", data.len());
                Ok(data)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        let file_path = self.validate_path(path)?;
        Ok(fs::try_exists(&file_path).await?)
    }

    async fn save(&self, path: &str, data: &[u8]) -> StorageResult<StorageMetadata> {
        let file_path = self.validate_path(path)?;

        debug!("Saving file at: {:?}", file_path);

        self.ensure_parent_dir(&file_path).await?;

        let tmp_path = Self::temp_path(&file_path);
        {
            let mut file = fs::File::create(&tmp_path).await?;
            file.write_all(data).await?;
            file.sync_all().await?;
        }

        if let Err(e) = fs::rename(&tmp_path, &file_path).await {
            if let Err(cleanup) = fs::remove_file(&tmp_path).await {
                warn!("Could not remove temporary file {:?}: {}", tmp_path, cleanup);
            }
            return Err(e.into());
        }

        let content_type = detect_content_type(path);

        debug!(
            "Saved file: {} bytes, content-type: {:?}",
            data.len(),
            content_type
        );

        Ok(StorageMetadata {
            size: data.len() as u64,
            content_type,
            etag: None, // Local storage doesn't generate ETags
        })
    }
}
