pub mod backend;
pub mod config;
pub mod error;
pub mod local;
pub mod memory;
pub mod registry;

#[cfg(feature = "s3")]
pub mod s3;


pub use backend::{StorageBackend, StorageMetadata};
pub use config::{LocalStorageConfig, StorageConfig};
pub use error::{StorageError, StorageResult};
pub use local::LocalStorage;
pub use memory::MemoryStorage;
pub use registry::{BackendFactory, StorageRegistry};

#[cfg(feature = "s3")]
pub use config::S3StorageConfig;
#[cfg(feature = "s3")]
pub use s3::S3Storage;
