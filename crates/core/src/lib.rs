//! Parameter-fingerprinted thumbnail cache.
//!
//! [`ThumbnailService::get_thumbnail`] derives a filename from the original
//! and the requested size and options, returns the cached thumbnail when
//! storage already holds it, and otherwise resizes, encodes and saves it.

pub mod config;
pub mod error;
pub mod naming;
pub mod options;
pub mod service;
pub mod size;
pub mod transform;

pub use config::{ResolvedConfig, ThumbnailConfig};
pub use error::{ThumbnailError, ThumbnailResult};
pub use naming::thumbnail_filename;
pub use options::{Background, ColorMode, CropMode, ThumbnailOptions, DEFAULT_QUALITY};
pub use service::{ThumbnailRef, ThumbnailService};
pub use size::{SizeSpec, MAX_DIMENSION};
