use thumbcache_storage::StorageError;
use thiserror::Error;

pub type ThumbnailResult<T> = Result<T, ThumbnailError>;

#[derive(Debug, Error)]
pub enum ThumbnailError {
    #[error("Invalid thumbnail size: {0}")]
    InvalidSize(String),

    #[error("Invalid thumbnail option: {0}")]
    InvalidOption(String),

    #[error("Original image not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[source] StorageError),

    #[error("Image encoding error: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ThumbnailError {
    pub fn invalid_size<S: Into<String>>(msg: S) -> Self {
        Self::InvalidSize(msg.into())
    }

    pub fn invalid_option<S: Into<String>>(msg: S) -> Self {
        Self::InvalidOption(msg.into())
    }

    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
}

impl From<StorageError> for ThumbnailError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(path) => Self::NotFound(path),
            other => Self::Storage(other),
        }
    }
}
