use crate::{ThumbnailError, ThumbnailResult};
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_QUALITY: u8 = 90;

/// How the source is fitted into the requested box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropMode {
    /// Scale and center-crop to exactly fill the box.
    #[default]
    Fit,
    /// Scale down to fit inside the box, never cropping or upscaling.
    Thumbnail,
}

impl CropMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CropMode::Fit => "fit",
            CropMode::Thumbnail => "thumbnail",
        }
    }
}

impl fmt::Display for CropMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CropMode {
    type Err = ThumbnailError;

    /// `"fit"` selects [`CropMode::Fit`]; any other token means contain mode.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case("fit") {
            Ok(CropMode::Fit)
        } else {
            Ok(CropMode::Thumbnail)
        }
    }
}

/// Fill used when padding a thumbnail onto a square canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Background {
    pub color: [u8; 3],
}

impl Background {
    pub const WHITE: Background = Background {
        color: [0xFF, 0xFF, 0xFF],
    };

    pub fn new(color: [u8; 3]) -> Self {
        Self { color }
    }

    /// Parse a background flag or color.
    ///
    /// Falsy tokens (`""`, `false`, `no`, `none`, `0`) mean no padding,
    /// truthy ones (`true`, `yes`, `1`, `white`) the default white fill,
    /// and `#rrggbb` / `rrggbb` an explicit color.
    pub fn parse(value: &str) -> ThumbnailResult<Option<Self>> {
        let value = value.trim().to_ascii_lowercase();

        match value.as_str() {
            "" | "false" | "no" | "none" | "0" | "off" => Ok(None),
            "true" | "yes" | "1" | "on" | "white" => Ok(Some(Self::WHITE)),
            "black" => Ok(Some(Self::new([0, 0, 0]))),
            hex => parse_hex_color(hex).map(|color| Some(Self::new(color))),
        }
    }

    /// Filename token: `bg` for the default fill, `bg-rrggbb` otherwise.
    pub fn token(&self) -> String {
        if *self == Self::WHITE {
            "bg".to_string()
        } else {
            let [r, g, b] = self.color;
            format!("bg-{:02x}{:02x}{:02x}", r, g, b)
        }
    }
}

impl Default for Background {
    fn default() -> Self {
        Self::WHITE
    }
}

fn parse_hex_color(value: &str) -> ThumbnailResult<[u8; 3]> {
    let hex = value.strip_prefix('#').unwrap_or(value);
    let invalid = || ThumbnailError::invalid_option(format!("background color '{}'", value));

    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
    };

    Ok([channel(0..2)?, channel(2..4)?, channel(4..6)?])
}

/// Pixel layout the transformed image is normalized to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Rgb,
    Rgba,
    Gray,
    GrayAlpha,
}

impl ColorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorMode::Rgb => "rgb",
            ColorMode::Rgba => "rgba",
            ColorMode::Gray => "gray",
            ColorMode::GrayAlpha => "grayalpha",
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorMode {
    type Err = ThumbnailError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "rgb" => Ok(ColorMode::Rgb),
            "rgba" => Ok(ColorMode::Rgba),
            "gray" | "grey" | "l" | "luma" => Ok(ColorMode::Gray),
            "grayalpha" | "greyalpha" | "la" => Ok(ColorMode::GrayAlpha),
            other => Err(ThumbnailError::invalid_option(format!(
                "unknown color mode '{}'. Expected rgb, rgba, gray or grayalpha",
                other
            ))),
        }
    }
}

/// Per-call options of a thumbnail request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailOptions {
    pub crop: CropMode,
    pub background: Option<Background>,
    /// Encoder quality, 1 to 100.
    pub quality: u8,
    /// Explicit output format (`"png"`, `"jpg"`, ...). Takes precedence over
    /// the configured default format.
    pub format: Option<String>,
    pub color_mode: ColorMode,
}

impl Default for ThumbnailOptions {
    fn default() -> Self {
        Self {
            crop: CropMode::Fit,
            background: None,
            quality: DEFAULT_QUALITY,
            format: None,
            color_mode: ColorMode::Rgb,
        }
    }
}

impl ThumbnailOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn crop(mut self, crop: CropMode) -> Self {
        self.crop = crop;
        self
    }

    pub fn background(mut self, background: Background) -> Self {
        self.background = Some(background);
        self
    }

    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn color_mode(mut self, color_mode: ColorMode) -> Self {
        self.color_mode = color_mode;
        self
    }

    pub fn validate(&self) -> ThumbnailResult<()> {
        if !(1..=100).contains(&self.quality) {
            return Err(ThumbnailError::invalid_option(format!(
                "quality must be between 1 and 100, got {}",
                self.quality
            )));
        }

        if let Some(format) = &self.format {
            parse_format(format)?;
        }

        Ok(())
    }
}

/// Resolve a format name or extension to an encodable [`ImageFormat`].
pub fn parse_format(name: &str) -> ThumbnailResult<ImageFormat> {
    let name = name.trim().trim_start_matches('.');
    let format = ImageFormat::from_extension(name)
        .ok_or_else(|| ThumbnailError::invalid_option(format!("unknown image format '{}'", name)))?;

    if !format.writing_enabled() {
        return Err(ThumbnailError::invalid_option(format!(
            "image format '{}' cannot be encoded",
            name
        )));
    }

    Ok(format)
}

/// Canonical file extension for `format` (`jpg` for JPEG).
pub fn format_extension(format: ImageFormat) -> &'static str {
    format.extensions_str().first().copied().unwrap_or("img")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crop_mode_tokens() {
        assert_eq!("fit".parse::<CropMode>().unwrap(), CropMode::Fit);
        assert_eq!("FIT".parse::<CropMode>().unwrap(), CropMode::Fit);
        assert_eq!("thumbnail".parse::<CropMode>().unwrap(), CropMode::Thumbnail);
        assert_eq!("contain".parse::<CropMode>().unwrap(), CropMode::Thumbnail);
    }

    #[test]
    fn test_background_parsing() {
        assert_eq!(Background::parse("").unwrap(), None);
        assert_eq!(Background::parse("false").unwrap(), None);
        assert_eq!(Background::parse("true").unwrap(), Some(Background::WHITE));
        assert_eq!(
            Background::parse("#10ff00").unwrap(),
            Some(Background::new([0x10, 0xff, 0x00]))
        );
        assert!(Background::parse("#12345").is_err());
        assert!(Background::parse("purple").is_err());
    }

    #[test]
    fn test_background_tokens() {
        assert_eq!(Background::WHITE.token(), "bg");
        assert_eq!(Background::new([0, 0, 0]).token(), "bg-000000");
    }

    #[test]
    fn test_quality_bounds() {
        assert!(ThumbnailOptions::new().quality(1).validate().is_ok());
        assert!(ThumbnailOptions::new().quality(100).validate().is_ok());
        assert!(ThumbnailOptions::new().quality(0).validate().is_err());
        assert!(ThumbnailOptions::new().quality(101).validate().is_err());
    }

    #[test]
    fn test_format_resolution() {
        assert_eq!(parse_format("JPEG").unwrap(), ImageFormat::Jpeg);
        assert_eq!(parse_format("jpg").unwrap(), ImageFormat::Jpeg);
        assert_eq!(parse_format(".png").unwrap(), ImageFormat::Png);
        assert_eq!(format_extension(ImageFormat::Jpeg), "jpg");
        assert_eq!(format_extension(ImageFormat::Png), "png");
        assert!(ThumbnailOptions::new().format("tga2").validate().is_err());
    }
}
