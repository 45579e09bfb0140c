use crate::config::{ResolvedConfig, ThumbnailConfig};
use crate::naming::thumbnail_filename;
use crate::options::{format_extension, parse_format};
use crate::transform::{encode, transform};
use crate::{SizeSpec, ThumbnailError, ThumbnailOptions, ThumbnailResult};
use image::ImageFormat;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thumbcache_storage::{StorageBackend, StorageRegistry};
use tracing::{debug, info, warn};

/// Outcome of a thumbnail request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ThumbnailRef {
    /// The thumbnail exists (cached or just generated).
    Thumbnail { url: String, path: String },
    /// The original could not be decoded; its resolved path (and public
    /// URL) are handed back instead of a thumbnail.
    Fallback {
        original_path: String,
        original_url: String,
    },
}

impl ThumbnailRef {
    /// The reference string: the thumbnail URL, or the original's path on
    /// fallback.
    pub fn as_str(&self) -> &str {
        match self {
            ThumbnailRef::Thumbnail { url, .. } => url,
            ThumbnailRef::Fallback { original_path, .. } => original_path,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ThumbnailRef::Fallback { .. })
    }
}

impl fmt::Display for ThumbnailRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a derived thumbnail lives.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Target {
    path: String,
    url: String,
}

impl Target {
    fn into_ref(self) -> ThumbnailRef {
        ThumbnailRef::Thumbnail {
            url: self.url,
            path: self.path,
        }
    }
}

/// Serves thumbnails from storage, generating them on first request.
///
/// There is no lock around the exists-then-save sequence. Concurrent
/// identical requests may both generate and both save the same bytes; the
/// backends write atomically so the last rename wins.
pub struct ThumbnailService {
    config: ResolvedConfig,
    storage: Arc<dyn StorageBackend>,
}

impl ThumbnailService {
    pub fn new(config: &ThumbnailConfig, storage: Arc<dyn StorageBackend>) -> ThumbnailResult<Self> {
        Ok(Self {
            config: config.resolve()?,
            storage,
        })
    }

    /// Build the service with the backend named in `config.storage`.
    pub fn from_config(config: &ThumbnailConfig, registry: &StorageRegistry) -> ThumbnailResult<Self> {
        let storage = registry
            .create(&config.storage)
            .map_err(|e| ThumbnailError::configuration(e.to_string()))?;
        Self::new(config, storage)
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<dyn StorageBackend> {
        &self.storage
    }

    /// Return a reference to the thumbnail of `original` at `size`.
    ///
    /// `original` is relative to the media root (`photos/a.jpg`). When the
    /// output format is known up front (explicit or configured default) a
    /// cache hit touches nothing but `exists`; otherwise the original is read
    /// once to detect its format. An original that cannot be decoded yields
    /// [`ThumbnailRef::Fallback`] and nothing is written.
    pub async fn get_thumbnail(
        &self,
        original: &str,
        size: &SizeSpec,
        options: &ThumbnailOptions,
    ) -> ThumbnailResult<ThumbnailRef> {
        options.validate()?;
        size.validate()?;

        let (subdir, filename) = split_original(original)?;
        let original_path = join_segments(&self.config.media_root, &[subdir, filename]);
        let fallback = || ThumbnailRef::Fallback {
            original_path: original_path.clone(),
            original_url: join_segments(&self.config.media_url, &[subdir, filename]),
        };

        let mut source = None;
        let format = match self.requested_format(options)? {
            Some(format) => format,
            None => {
                let bytes = self.storage.read(&original_path).await?;
                match image::guess_format(&bytes) {
                    Ok(format) => {
                        source = Some(bytes);
                        format
                    }
                    Err(e) => {
                        warn!("Thumbnail could not load image {}: {}", original_path, e);
                        return Ok(fallback());
                    }
                }
            }
        };

        if !format.writing_enabled() {
            return Err(ThumbnailError::invalid_option(format!(
                "{:?} images cannot be encoded; request an explicit format for {}",
                format, original_path
            )));
        }

        let target = self.target(subdir, filename, size, options, format);

        if self.storage.exists(&target.path).await? {
            debug!("Thumbnail cache hit: {}", target.path);
            return Ok(target.into_ref());
        }

        debug!("Thumbnail cache miss: {}", target.path);

        let bytes = match source {
            Some(bytes) => bytes,
            None => self.storage.read(&original_path).await?,
        };

        let image = match image::load_from_memory(&bytes) {
            Ok(image) => image,
            Err(e) => {
                warn!("Thumbnail could not load image {}: {}", original_path, e);
                return Ok(fallback());
            }
        };

        let thumbnail = transform(
            &image,
            size.dimensions(),
            options.crop,
            options.background.as_ref(),
            options.color_mode,
        );
        let encoded = encode(&thumbnail, format, options.quality)?;
        let metadata = self.storage.save(&target.path, &encoded).await?;

        info!(
            "Generated thumbnail {} ({}x{}, {} bytes)",
            target.path,
            thumbnail.width(),
            thumbnail.height(),
            metadata.size
        );

        Ok(target.into_ref())
    }

    /// Explicit per-call format, else the configured default.
    fn requested_format(&self, options: &ThumbnailOptions) -> ThumbnailResult<Option<ImageFormat>> {
        match options.format.as_deref() {
            Some(name) => parse_format(name).map(Some),
            None => Ok(self.config.default_format),
        }
    }

    fn target(
        &self,
        subdir: &str,
        filename: &str,
        size: &SizeSpec,
        options: &ThumbnailOptions,
        format: ImageFormat,
    ) -> Target {
        let thumbnail_name = thumbnail_filename(
            filename,
            size,
            options.crop,
            options.background.as_ref(),
            options.quality,
            options.color_mode,
            format_extension(format),
        );

        Target {
            path: join_segments(&self.config.thumbnail_root, &[subdir, &thumbnail_name]),
            url: join_segments(&self.config.thumbnail_url, &[subdir, &thumbnail_name]),
        }
    }
}

/// Split `photos/2024/a.jpg` into (`photos/2024`, `a.jpg`).
fn split_original(original: &str) -> ThumbnailResult<(&str, &str)> {
    let original = original.trim_start_matches('/');
    let (subdir, filename) = original.rsplit_once('/').unwrap_or(("", original));

    if filename.is_empty() {
        return Err(ThumbnailError::invalid_option(format!(
            "original '{}' does not name a file",
            original
        )));
    }

    Ok((subdir, filename))
}

/// Join `parts` onto `base` with single slashes, skipping empty parts.
///
/// A leading slash on `base` is kept, so `"/"` + `photos` gives `/photos`.
fn join_segments(base: &str, parts: &[&str]) -> String {
    let mut joined = base.trim_end_matches('/').to_string();

    for part in parts {
        let part = part.trim_matches('/');
        if part.is_empty() {
            continue;
        }
        if !joined.is_empty() || base.starts_with('/') {
            joined.push('/');
        }
        joined.push_str(part);
    }

    joined
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_original() {
        assert_eq!(split_original("photos/a.jpg").unwrap(), ("photos", "a.jpg"));
        assert_eq!(split_original("/photos/2024/a.jpg").unwrap(), ("photos/2024", "a.jpg"));
        assert_eq!(split_original("a.jpg").unwrap(), ("", "a.jpg"));
        assert!(split_original("photos/").is_err());
        assert!(split_original("").is_err());
    }

    #[test]
    fn test_join_segments() {
        assert_eq!(join_segments("media", &["photos", "a.jpg"]), "media/photos/a.jpg");
        assert_eq!(join_segments("media/", &["", "a.jpg"]), "media/a.jpg");
        assert_eq!(join_segments("/", &["photos", "a.jpg"]), "/photos/a.jpg");
        assert_eq!(join_segments("", &["photos", "a.jpg"]), "photos/a.jpg");
        assert_eq!(
            join_segments("https://cdn.example.com/thumbs/", &["photos", "a.jpg"]),
            "https://cdn.example.com/thumbs/photos/a.jpg"
        );
    }

    #[test]
    fn test_reference_strings() {
        let hit = ThumbnailRef::Thumbnail {
            url: "/photos/a_100x100_fit_90.jpg".to_string(),
            path: "media/photos/a_100x100_fit_90.jpg".to_string(),
        };
        assert_eq!(hit.to_string(), "/photos/a_100x100_fit_90.jpg");
        assert!(!hit.is_fallback());

        let fallback = ThumbnailRef::Fallback {
            original_path: "media/photos/a.jpg".to_string(),
            original_url: "/photos/a.jpg".to_string(),
        };
        assert_eq!(fallback.as_str(), "media/photos/a.jpg");
        assert!(fallback.is_fallback());
    }
}
