use crate::{LocalStorage, MemoryStorage, StorageBackend, StorageConfig, StorageError, StorageResult};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Builds a backend from the storage section of the configuration.
pub type BackendFactory =
    Arc<dyn Fn(&StorageConfig) -> StorageResult<Arc<dyn StorageBackend>> + Send + Sync>;

/// Maps backend identifiers to factories.
///
/// A service resolves its backend once, when it is constructed.
#[derive(Clone, Default)]
pub struct StorageRegistry {
    factories: HashMap<String, BackendFactory>,
}

impl StorageRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with `local`, `memory` and, with the `s3` feature, `s3`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register("local", |config: &StorageConfig| {
            Ok(Arc::new(LocalStorage::new(config.local.base_path.clone())) as Arc<dyn StorageBackend>)
        });

        registry.register("memory", |_: &StorageConfig| {
            Ok(Arc::new(MemoryStorage::new()) as Arc<dyn StorageBackend>)
        });

        #[cfg(feature = "s3")]
        registry.register("s3", create_s3_backend);

        registry
    }

    /// Register `factory` under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&StorageConfig) -> StorageResult<Arc<dyn StorageBackend>> + Send + Sync + 'static,
    {
        let name = name.into().to_lowercase();
        debug!("Registering storage backend '{}'", name);
        self.factories.insert(name, Arc::new(factory));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(&name.to_lowercase())
    }

    /// Instantiate the backend named by `config.backend`.
    pub fn create(&self, config: &StorageConfig) -> StorageResult<Arc<dyn StorageBackend>> {
        let name = config.backend.to_lowercase();
        let factory = self.factories.get(&name).ok_or_else(|| {
            StorageError::Backend(format!("Unknown storage backend: {}", config.backend))
        })?;

        debug!("Creating storage backend '{}'", name);
        factory(config)
    }
}

impl fmt::Debug for StorageRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("StorageRegistry")
            .field("backends", &names)
            .finish()
    }
}

#[cfg(feature = "s3")]
fn create_s3_backend(config: &StorageConfig) -> StorageResult<Arc<dyn StorageBackend>> {
    use crate::S3Storage;

    let s3 = &config.s3;
    let mut config_builder = aws_sdk_s3::config::Builder::new()
        .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
        .region(aws_sdk_s3::config::Region::new(s3.region.clone()));

    // Set custom endpoint if provided (for S3-compatible services like R2)
    if let Some(endpoint_url) = &s3.endpoint {
        config_builder = config_builder
            .endpoint_url(endpoint_url)
            .force_path_style(true);
    }

    if let (Some(access_key), Some(secret_key)) = (&s3.access_key_id, &s3.secret_access_key) {
        let credentials = aws_sdk_s3::config::Credentials::new(
            access_key,
            secret_key,
            None,
            None,
            "thumbcache-config",
        );
        config_builder = config_builder.credentials_provider(credentials);
    }

    let client = aws_sdk_s3::Client::from_conf(config_builder.build());
    let mut storage = S3Storage::new(client, s3.bucket.clone(), s3.region.clone());
    if let Some(prefix) = &s3.prefix {
        storage = storage.with_prefix(prefix.clone());
    }

    Ok(Arc::new(storage))
}
