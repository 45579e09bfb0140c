use crate::backend::{clean_key, detect_content_type};
use crate::{StorageBackend, StorageError, StorageMetadata, StorageResult};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Process-local backend keeping every object in a map.
#[derive(Default)]
pub struct MemoryStorage {
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    /// Sorted list of stored keys.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn read(&self, path: &str) -> StorageResult<Vec<u8>> {
        let key = clean_key(path)?;
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        let key = clean_key(path)?;
        Ok(self.objects.read().await.contains_key(key))
    }

    async fn save(&self, path: &str, data: &[u8]) -> StorageResult<StorageMetadata> {
        let key = clean_key(path)?;
        debug!("Saving object in memory: key={}, {} bytes", key, data.len());

        self.objects
            .write()
            .await
            .insert(key.to_string(), data.to_vec());

        Ok(StorageMetadata {
            size: data.len() as u64,
            content_type: detect_content_type(path),
            etag: None,
        })
    }
}
