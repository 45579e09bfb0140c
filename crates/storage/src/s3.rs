use crate::backend::{clean_key, detect_content_type};
use crate::{StorageBackend, StorageError, StorageMetadata, StorageResult};
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, error};

/// Object-store backend; keys map one-to-one onto S3 object keys.
///
/// `PutObject` replaces an object atomically, so concurrent writers of the
/// same key never expose a partial object.
pub struct S3Storage {
    client: Client,
    bucket: String,
    region: String,
    prefix: Option<String>,
}

impl S3Storage {
    pub fn new(client: Client, bucket: String, region: String) -> Self {
        debug!(
            "Initializing S3 storage client for bucket '{}' in region '{}'",
            bucket, region
        );

        Self {
            client,
            bucket,
            region,
            prefix: None,
        }
    }

    /// Place every key under `prefix/` inside the bucket.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let prefix = prefix.trim_matches('/');
        self.prefix = (!prefix.is_empty()).then(|| prefix.to_string());
        self
    }

    /// Validate and sanitize the S3 object key
    fn validate_key(&self, path: &str) -> StorageResult<String> {
        let clean_path = clean_key(path)?;

        Ok(match &self.prefix {
            Some(prefix) => format!("{}/{}", prefix, clean_path),
            None => clean_path.to_string(),
        })
    }
}

#[async_trait]
impl StorageBackend for S3Storage {
    async fn read(&self, path: &str) -> StorageResult<Vec<u8>> {
        let key = self.validate_key(path)?;

        debug!(
            "Retrieving object from S3: bucket={}, region={}, key={}",
            self.bucket, self.region, key
        );

        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
            .map_err(|e| {
                let no_such_key = e
                    .as_service_error()
                    .map(|service_error| service_error.is_no_such_key())
                    .unwrap_or(false);
                if no_such_key {
                    StorageError::NotFound(path.to_string())
                } else {
                    error!("Failed to retrieve object from S3: {}", e);
                    StorageError::Backend(format!("S3 get_object failed: {}", e))
                }
            })?;

        let data = result
            .body
            .collect()
            .await
            .map_err(|e| {
                error!("Failed to read S3 object body: {}", e);
                StorageError::Backend(format!("Failed to read S3 body: {}", e))
            })?
            .into_bytes()
            .to_vec();

        debug!("Retrieved object from S3: {} bytes", data.len());
        Ok(data)
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        let key = self.validate_key(path)?;

        debug!(
            "Checking if object exists in S3: bucket={}, key={}",
            self.bucket, key
        );

        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
        {
            Ok(_) => {
                debug!("Object exists in S3: {}", key);
                Ok(true)
            }
            Err(e) => {
                let not_found = e
                    .as_service_error()
                    .map(|service_error| service_error.is_not_found())
                    .unwrap_or(false);
                if not_found {
                    debug!("Object does not exist in S3: {}", key);
                    Ok(false)
                } else {
                    error!("Failed to check object existence in S3: {}", e);
                    Err(StorageError::Backend(format!(
                        "S3 head_object failed: {}",
                        e
                    )))
                }
            }
        }
    }

    async fn save(&self, path: &str, data: &[u8]) -> StorageResult<StorageMetadata> {
        let key = self.validate_key(path)?;
        let content_type = detect_content_type(path);

        debug!(
            "Storing object in S3: bucket={}, region={}, key={}",
            self.bucket, self.region, key
        );

        let mut put_request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(data.to_vec()));

        if let Some(ct) = &content_type {
            put_request = put_request.content_type(ct);
        }

        let result = put_request.send().await.map_err(|e| {
            error!("Failed to store object in S3: {}", e);
            StorageError::Backend(format!("S3 put_object failed: {}", e))
        })?;

        debug!(
            "Stored object in S3: {} bytes, etag: {:?}",
            data.len(),
            result.e_tag()
        );

        Ok(StorageMetadata {
            size: data.len() as u64,
            content_type,
            etag: result.e_tag().map(|s| s.to_string()),
        })
    }
}
