//! Parsing of requested thumbnail sizes.
//!
//! A size is written either as a single integer (`"100"`, a square) or as
//! `"WxH"`. Every accepted spelling renders back to the same canonical
//! `"WxH"` string, which is what ends up in derived filenames.
//!
//! Neither side may exceed [`MAX_DIMENSION`]; the pipeline allocates a full
//! buffer of the requested size, so the bound is checked before any pixel
//! work starts.

use crate::{ThumbnailError, ThumbnailResult};
use std::fmt;
use std::str::FromStr;

/// Largest accepted width or height, in pixels.
pub const MAX_DIMENSION: u32 = 8192;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeSpec {
    /// A square target of the given side.
    Square(u32),
    /// An explicit width and height.
    Exact { width: u32, height: u32 },
}

impl SizeSpec {
    pub fn square(side: u32) -> ThumbnailResult<Self> {
        let size = Self::Square(side);
        size.validate()?;
        Ok(size)
    }

    pub fn new(width: u32, height: u32) -> ThumbnailResult<Self> {
        let size = Self::Exact { width, height };
        size.validate()?;
        Ok(size)
    }

    /// Check both sides are within `1..=MAX_DIMENSION`.
    ///
    /// The variants are public, so values built directly are re-checked
    /// here before use.
    pub fn validate(&self) -> ThumbnailResult<()> {
        let (width, height) = self.dimensions();

        if width == 0 || height == 0 {
            return Err(ThumbnailError::invalid_size(format!(
                "{}x{}: both dimensions must be greater than zero",
                width, height
            )));
        }

        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(ThumbnailError::invalid_size(format!(
                "{}x{}: dimensions must not exceed {}",
                width, height, MAX_DIMENSION
            )));
        }

        Ok(())
    }

    /// Parse `"N"` or `"WxH"` (the separator is case-insensitive).
    pub fn parse(spec: &str) -> ThumbnailResult<Self> {
        let trimmed = spec.trim();
        let lowered = trimmed.to_ascii_lowercase();

        match lowered.split_once('x') {
            Some((width, height)) => {
                Self::new(parse_dimension(spec, width)?, parse_dimension(spec, height)?)
            }
            None => Self::square(parse_dimension(spec, &lowered)?),
        }
    }

    pub fn width(&self) -> u32 {
        self.dimensions().0
    }

    pub fn height(&self) -> u32 {
        self.dimensions().1
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match *self {
            Self::Square(side) => (side, side),
            Self::Exact { width, height } => (width, height),
        }
    }

    /// Canonical `"WxH"` form, independent of how the size was spelled.
    pub fn aspect_string(&self) -> String {
        let (width, height) = self.dimensions();
        format!("{}x{}", width, height)
    }
}

fn parse_dimension(spec: &str, component: &str) -> ThumbnailResult<u32> {
    let component = component.trim();
    if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ThumbnailError::invalid_size(format!(
            "'{}': expected a positive integer or INTxINT",
            spec
        )));
    }

    let value: u32 = component.parse().map_err(|_| {
        ThumbnailError::invalid_size(format!(
            "'{}': expected a positive integer or INTxINT",
            spec
        ))
    })?;

    if value == 0 {
        return Err(ThumbnailError::invalid_size(format!(
            "'{}': dimensions must be greater than zero",
            spec
        )));
    }

    Ok(value)
}

impl FromStr for SizeSpec {
    type Err = ThumbnailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<u32> for SizeSpec {
    type Error = ThumbnailError;

    fn try_from(side: u32) -> Result<Self, Self::Error> {
        Self::square(side)
    }
}

impl TryFrom<(u32, u32)> for SizeSpec {
    type Error = ThumbnailError;

    fn try_from((width, height): (u32, u32)) -> Result<Self, Self::Error> {
        Self::new(width, height)
    }
}

impl fmt::Display for SizeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.aspect_string())
    }
}
