use crate::{StorageBackend, StorageRegistry, StorageResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Registry identifier of the backend: "local", "memory" or "s3".
    pub backend: String,
    pub local: LocalStorageConfig,
    #[cfg(feature = "s3")]
    pub s3: S3StorageConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: "local".to_string(),
            local: LocalStorageConfig::default(),
            #[cfg(feature = "s3")]
            s3: S3StorageConfig::default(),
        }
    }
}

impl StorageConfig {
    pub fn local(base_path: impl Into<PathBuf>) -> Self {
        Self {
            backend: "local".to_string(),
            local: LocalStorageConfig {
                base_path: base_path.into(),
            },
            ..Default::default()
        }
    }

    /// Create a storage backend from the configuration using the built-in registry
    pub fn create_backend(&self) -> StorageResult<Arc<dyn StorageBackend>> {
        StorageRegistry::with_defaults().create(self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalStorageConfig {
    pub base_path: PathBuf,
}

impl Default for LocalStorageConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("."),
        }
    }
}

#[cfg(feature = "s3")]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct S3StorageConfig {
    pub bucket: String,
    pub region: String,
    pub prefix: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub endpoint: Option<String>,
}

#[cfg(feature = "s3")]
impl Default for S3StorageConfig {
    fn default() -> Self {
        Self {
            bucket: "thumbcache-media".to_string(),
            region: "us-east-1".to_string(),
            prefix: None,
            access_key_id: None,
            secret_access_key: None,
            endpoint: None,
        }
    }
}
