use crate::StorageResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageMetadata {
    pub size: u64,
    pub content_type: Option<String>,
    pub etag: Option<String>,
}

/// Byte-level access to a namespace of slash-separated keys.
///
/// Backends must be safe for concurrent reads and for concurrent writes to
/// distinct keys. Writing a key that already exists is not part of the
/// contract; callers check [`StorageBackend::exists`] first.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Read the full contents of `path`, failing with `NotFound` if absent.
    async fn read(&self, path: &str) -> StorageResult<Vec<u8>>;

    async fn exists(&self, path: &str) -> StorageResult<bool>;

    /// Persist `data` at `path`, creating any intermediate structure.
    async fn save(&self, path: &str, data: &[u8]) -> StorageResult<StorageMetadata>;
}

/// Detect content type from file extension
pub(crate) fn detect_content_type(path: &str) -> Option<String> {
    let extension = std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => Some("image/jpeg".to_string()),
        Some("png") => Some("image/png".to_string()),
        Some("gif") => Some("image/gif".to_string()),
        Some("webp") => Some("image/webp".to_string()),
        Some("bmp") => Some("image/bmp".to_string()),
        Some("tif") | Some("tiff") => Some("image/tiff".to_string()),
        Some("ico") => Some("image/x-icon".to_string()),
        Some("avif") => Some("image/avif".to_string()),
        _ => Some("application/octet-stream".to_string()),
    }
}

/// Normalize a storage key, rejecting traversal sequences.
pub(crate) fn clean_key(path: &str) -> StorageResult<&str> {
    let clean_path = path.trim_start_matches('/');

    if clean_path.is_empty() {
        return Err(crate::StorageError::InvalidPath("Empty path".to_string()));
    }

    if clean_path.split('/').any(|segment| segment == ".." || segment == ".") {
        return Err(crate::StorageError::InvalidPath(format!(
            "Path contains invalid sequences: {}",
            path
        )));
    }

    Ok(clean_path)
}
