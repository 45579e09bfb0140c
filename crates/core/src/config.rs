use crate::options::parse_format;
use crate::{ThumbnailError, ThumbnailResult};
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use thumbcache_storage::StorageConfig;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ThumbnailConfig {
    /// Storage prefix under which originals live.
    pub media_root: String,
    /// Storage prefix under which thumbnails are written.
    pub thumbnail_root: String,
    /// Public URL prefix of originals.
    pub media_url: String,
    /// Public URL prefix of thumbnails.
    pub thumbnail_url: String,
    /// Output format used when a request names none; `None` keeps the
    /// format of the original.
    pub default_format: Option<String>,
    pub storage: StorageConfig,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            media_root: "media".to_string(),
            thumbnail_root: "media".to_string(),
            media_url: "/".to_string(),
            thumbnail_url: "/".to_string(),
            default_format: None,
            storage: StorageConfig::default(),
        }
    }
}

impl ThumbnailConfig {
    /// Validate the configuration and resolve its defaults.
    pub fn resolve(&self) -> ThumbnailResult<ResolvedConfig> {
        let default_format = match self.default_format.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(name) => Some(parse_format(name).map_err(|e| {
                ThumbnailError::configuration(format!("default_format: {}", e))
            })?),
        };

        Ok(ResolvedConfig {
            media_root: self.media_root.clone(),
            thumbnail_root: self.thumbnail_root.clone(),
            media_url: self.media_url.clone(),
            thumbnail_url: self.thumbnail_url.clone(),
            default_format,
        })
    }
}

/// Immutable view of [`ThumbnailConfig`] held by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub media_root: String,
    pub thumbnail_root: String,
    pub media_url: String,
    pub thumbnail_url: String,
    pub default_format: Option<ImageFormat>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let resolved = ThumbnailConfig::default().resolve().unwrap();
        assert_eq!(resolved.media_root, "media");
        assert_eq!(resolved.thumbnail_root, "media");
        assert_eq!(resolved.media_url, "/");
        assert_eq!(resolved.thumbnail_url, "/");
        assert_eq!(resolved.default_format, None);
    }

    #[test]
    fn test_default_format_is_validated() {
        let config = ThumbnailConfig {
            default_format: Some("WEBP".to_string()),
            ..Default::default()
        };
        assert_eq!(config.resolve().unwrap().default_format, Some(ImageFormat::WebP));

        let config = ThumbnailConfig {
            default_format: Some("doc".to_string()),
            ..Default::default()
        };
        assert!(matches!(config.resolve(), Err(ThumbnailError::Configuration(_))));
    }

    #[test]
    fn test_partial_deserialization_keeps_defaults() {
        let config: ThumbnailConfig = serde_json::from_str(
            r#"{"thumbnail_root": "cache", "storage": {"backend": "memory"}}"#,
        )
        .unwrap();

        assert_eq!(config.media_root, "media");
        assert_eq!(config.thumbnail_root, "cache");
        assert_eq!(config.storage.backend, "memory");
    }
}
