//! Pixel pipeline applied to a decoded original.
//!
//! Resizing (cover or contain), optional square padding, then color-mode
//! normalization, in that order. Every step returns a new image; the
//! caller's decoded original is never modified.

use crate::{Background, ColorMode, CropMode, ThumbnailResult};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{ColorType, DynamicImage, GenericImageView, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::borrow::Cow;
use std::io::Cursor;

const RESAMPLING_FILTER: FilterType = FilterType::Lanczos3;

/// Run the full pipeline for a target box of `size` (width, height).
pub fn transform(
    image: &DynamicImage,
    size: (u32, u32),
    crop: CropMode,
    background: Option<&Background>,
    color_mode: ColorMode,
) -> DynamicImage {
    let resized = resize(image, size, crop);

    let padded = match background {
        Some(background) => pad_to_square(&resized, background),
        None => resized,
    };

    normalize_color(padded, color_mode)
}

/// Cover for [`CropMode::Fit`], contain (without upscaling) otherwise.
pub fn resize(image: &DynamicImage, (width, height): (u32, u32), crop: CropMode) -> DynamicImage {
    match crop {
        CropMode::Fit => image.resize_to_fill(width, height, RESAMPLING_FILTER),
        CropMode::Thumbnail => {
            if image.width() <= width && image.height() <= height {
                image.clone()
            } else {
                image.resize(width, height, RESAMPLING_FILTER)
            }
        }
    }
}

/// Center `image` on a square canvas whose side is its longer dimension.
pub fn pad_to_square(image: &DynamicImage, background: &Background) -> DynamicImage {
    let (width, height) = image.dimensions();
    let side = width.max(height);
    let x = i64::from((side - width) / 2);
    let y = i64::from((side - height) / 2);
    let [r, g, b] = background.color;

    if image.color().has_alpha() {
        let mut canvas = RgbaImage::from_pixel(side, side, Rgba([r, g, b, 0xFF]));
        imageops::replace(&mut canvas, &image.to_rgba8(), x, y);
        DynamicImage::ImageRgba8(canvas)
    } else {
        let mut canvas = RgbImage::from_pixel(side, side, Rgb([r, g, b]));
        imageops::replace(&mut canvas, &image.to_rgb8(), x, y);
        DynamicImage::ImageRgb8(canvas)
    }
}

/// Normalize the pixel layout.
///
/// An RGB-family request keeps RGBA as is and promotes any other
/// alpha-carrying layout (gray+alpha included) to RGBA. `Gray` always
/// yields single-channel luminance.
pub fn normalize_color(image: DynamicImage, mode: ColorMode) -> DynamicImage {
    match mode {
        ColorMode::Rgb | ColorMode::Rgba => match image.color() {
            ColorType::Rgba8 => image,
            color if color.has_alpha() => DynamicImage::ImageRgba8(image.to_rgba8()),
            ColorType::Rgb8 if mode == ColorMode::Rgb => image,
            _ if mode == ColorMode::Rgb => DynamicImage::ImageRgb8(image.to_rgb8()),
            _ => DynamicImage::ImageRgba8(image.to_rgba8()),
        },
        ColorMode::Gray => match image.color() {
            ColorType::L8 => image,
            _ => DynamicImage::ImageLuma8(image.to_luma8()),
        },
        ColorMode::GrayAlpha => match image.color() {
            ColorType::La8 => image,
            _ => DynamicImage::ImageLumaA8(image.to_luma_alpha8()),
        },
    }
}

/// Encode `image` as `format`.
///
/// `quality` drives the JPEG encoder; the other encoders shipped by the
/// `image` crate are lossless and ignore it. JPEG cannot carry alpha or
/// 16-bit samples, so such layouts are flattened to RGB8 first.
pub fn encode(image: &DynamicImage, format: ImageFormat, quality: u8) -> ThumbnailResult<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());

    match format {
        ImageFormat::Jpeg => {
            let encodable = match image.color() {
                ColorType::L8 | ColorType::Rgb8 => Cow::Borrowed(image),
                _ => Cow::Owned(DynamicImage::ImageRgb8(image.to_rgb8())),
            };
            encodable.write_with_encoder(JpegEncoder::new_with_quality(&mut cursor, quality))?;
        }
        other => image.write_to(&mut cursor, other)?,
    }

    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayAlphaImage, GrayImage, LumaA};

    fn rgb_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        }))
    }

    #[test]
    fn test_fit_produces_exact_dimensions() {
        let source = rgb_image(400, 300);

        for (w, h) in [(100, 100), (50, 120), (300, 40), (800, 600)] {
            let result = transform(&source, (w, h), CropMode::Fit, None, ColorMode::Rgb);
            assert_eq!(result.dimensions(), (w, h));
        }

        // Source untouched
        assert_eq!(source.dimensions(), (400, 300));
    }

    #[test]
    fn test_contain_stays_within_bounds_and_keeps_ratio() {
        let source = rgb_image(400, 300);

        let result = transform(&source, (100, 100), CropMode::Thumbnail, None, ColorMode::Rgb);
        assert_eq!(result.dimensions(), (100, 75));

        let result = transform(&source, (200, 50), CropMode::Thumbnail, None, ColorMode::Rgb);
        let (w, h) = result.dimensions();
        assert!(w <= 200 && h <= 50);
        let ratio = w as f64 / h as f64;
        assert!((ratio - 4.0 / 3.0).abs() < 0.05, "ratio {}", ratio);
    }

    #[test]
    fn test_contain_never_upscales() {
        let source = rgb_image(40, 30);
        let result = transform(&source, (100, 100), CropMode::Thumbnail, None, ColorMode::Rgb);
        assert_eq!(result.dimensions(), (40, 30));
    }

    #[test]
    fn test_background_pads_to_centered_square() {
        let source = DynamicImage::ImageRgb8(RgbImage::from_pixel(10, 4, Rgb([255, 0, 0])));
        let background = Background::new([0, 0, 255]);

        let padded = pad_to_square(&source, &background);
        assert_eq!(padded.dimensions(), (10, 10));

        let padded = padded.to_rgb8();
        // Offset is floor((10 - 4) / 2) = 3 on the y axis.
        assert_eq!(padded.get_pixel(0, 2), &Rgb([0, 0, 255]));
        assert_eq!(padded.get_pixel(0, 3), &Rgb([255, 0, 0]));
        assert_eq!(padded.get_pixel(9, 6), &Rgb([255, 0, 0]));
        assert_eq!(padded.get_pixel(9, 7), &Rgb([0, 0, 255]));
    }

    #[test]
    fn test_background_offset_rounds_down() {
        let source = DynamicImage::ImageRgb8(RgbImage::from_pixel(3, 6, Rgb([10, 10, 10])));

        let padded = pad_to_square(&source, &Background::WHITE).to_rgb8();
        assert_eq!(padded.dimensions(), (6, 6));
        // floor((6 - 3) / 2) = 1
        assert_eq!(padded.get_pixel(0, 0), &Rgb([255, 255, 255]));
        assert_eq!(padded.get_pixel(1, 0), &Rgb([10, 10, 10]));
        assert_eq!(padded.get_pixel(3, 5), &Rgb([10, 10, 10]));
        assert_eq!(padded.get_pixel(4, 5), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_background_after_contain_resize() {
        let source = rgb_image(400, 300);
        let result = transform(
            &source,
            (100, 100),
            CropMode::Thumbnail,
            Some(&Background::WHITE),
            ColorMode::Rgb,
        );
        assert_eq!(result.dimensions(), (100, 100));
    }

    #[test]
    fn test_rgba_is_preserved_for_rgb_request() {
        let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([1, 2, 3, 4])));
        let result = normalize_color(source, ColorMode::Rgb);
        assert_eq!(result.color(), ColorType::Rgba8);
        assert_eq!(result.to_rgba8().get_pixel(0, 0), &Rgba([1, 2, 3, 4]));
    }

    #[test]
    fn test_gray_alpha_is_promoted_to_rgba() {
        let source = DynamicImage::ImageLumaA8(GrayAlphaImage::from_pixel(4, 4, LumaA([90, 10])));
        let result = normalize_color(source, ColorMode::Rgb);
        assert_eq!(result.color(), ColorType::Rgba8);
    }

    #[test]
    fn test_plain_images_convert_to_requested_mode() {
        let gray = DynamicImage::ImageLuma8(GrayImage::new(4, 4));
        assert_eq!(normalize_color(gray.clone(), ColorMode::Rgb).color(), ColorType::Rgb8);
        assert_eq!(normalize_color(gray, ColorMode::Rgba).color(), ColorType::Rgba8);
    }

    #[test]
    fn test_gray_request_is_single_channel() {
        let sources = [
            rgb_image(4, 4),
            DynamicImage::ImageRgba8(RgbaImage::new(4, 4)),
            DynamicImage::ImageLumaA8(GrayAlphaImage::new(4, 4)),
        ];

        for source in sources {
            let result = normalize_color(source, ColorMode::Gray);
            assert_eq!(result.color(), ColorType::L8);
            assert_eq!(result.color().channel_count(), 1);
        }
    }

    #[test]
    fn test_encode_jpeg_flattens_alpha() {
        let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(16, 16, Rgba([200, 10, 10, 128])));
        let bytes = encode(&source, ImageFormat::Jpeg, 80).unwrap();

        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (16, 16));
    }

    #[test]
    fn test_encode_is_deterministic() {
        let source = rgb_image(64, 48);
        let result = transform(&source, (32, 32), CropMode::Fit, None, ColorMode::Rgb);

        let first = encode(&result, ImageFormat::Jpeg, 85).unwrap();
        let second = encode(&result, ImageFormat::Jpeg, 85).unwrap();
        assert_eq!(first, second);

        let png = encode(&result, ImageFormat::Png, 85).unwrap();
        assert_eq!(image::guess_format(&png).unwrap(), ImageFormat::Png);
    }
}
