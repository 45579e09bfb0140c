//! Derived filenames.
//!
//! The stem of the original is joined with one token per output-affecting
//! parameter, in a fixed order, using `_`:
//!
//! ```text
//! <stem>_<WxH>_<crop>[_<bg>][_<colormode>]_<quality>.<ext>
//! ```
//!
//! Optional tokens are emitted only when the parameter departs from the
//! default, so `photo.jpg` at 100, fit, quality 85 becomes
//! `photo_100x100_fit_85.jpg`. Stems that already contain `_` are not
//! escaped; a crafted stem can therefore mimic the tokens of another
//! parameter set.

use crate::{Background, ColorMode, CropMode, SizeSpec};

const DELIMITER: char = '_';

/// Build the cache filename for a thumbnail of `original_filename`.
pub fn thumbnail_filename(
    original_filename: &str,
    size: &SizeSpec,
    crop: CropMode,
    background: Option<&Background>,
    quality: u8,
    color_mode: ColorMode,
    extension: &str,
) -> String {
    let (stem, _) = split_extension(original_filename);

    let mut tokens = vec![size.aspect_string(), crop.to_string()];
    if let Some(background) = background {
        tokens.push(background.token());
    }
    if color_mode != ColorMode::Rgb {
        tokens.push(color_mode.to_string());
    }
    tokens.push(quality.to_string());

    let mut name = String::from(stem);
    for token in tokens {
        name.push(DELIMITER);
        name.push_str(&token);
    }

    let extension = extension.trim_start_matches('.');
    if !extension.is_empty() {
        name.push('.');
        name.push_str(extension);
    }

    name
}

/// Split `filename` into stem and extension at the last dot.
///
/// A leading dot is part of the stem, so `.hidden` has no extension.
pub fn split_extension(filename: &str) -> (&str, Option<&str>) {
    match filename.rfind('.') {
        Some(index) if index > 0 => (&filename[..index], Some(&filename[index + 1..])),
        _ => (filename, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(spec: &str) -> SizeSpec {
        SizeSpec::parse(spec).unwrap()
    }

    #[test]
    fn test_basic_filename() {
        let name = thumbnail_filename(
            "a.jpg",
            &size("100"),
            CropMode::Fit,
            None,
            85,
            ColorMode::Rgb,
            "jpg",
        );
        assert_eq!(name, "a_100x100_fit_85.jpg");
    }

    #[test]
    fn test_filename_is_spelling_invariant() {
        let square = thumbnail_filename("a.png", &size("64"), CropMode::Fit, None, 90, ColorMode::Rgb, "png");
        let exact = thumbnail_filename("a.png", &size("64x64"), CropMode::Fit, None, 90, ColorMode::Rgb, "png");
        assert_eq!(square, exact);
    }

    #[test]
    fn test_filename_is_deterministic() {
        let build = || {
            thumbnail_filename(
                "holiday.photo.jpeg",
                &size("320x200"),
                CropMode::Thumbnail,
                Some(&Background::WHITE),
                70,
                ColorMode::Gray,
                "webp",
            )
        };
        assert_eq!(build(), build());
        assert_eq!(build(), "holiday.photo_320x200_thumbnail_bg_gray_70.webp");
    }

    #[test]
    fn test_each_field_changes_filename() {
        let base = thumbnail_filename("a.jpg", &size("100"), CropMode::Fit, None, 90, ColorMode::Rgb, "jpg");

        let variants = [
            thumbnail_filename("b.jpg", &size("100"), CropMode::Fit, None, 90, ColorMode::Rgb, "jpg"),
            thumbnail_filename("a.jpg", &size("100x99"), CropMode::Fit, None, 90, ColorMode::Rgb, "jpg"),
            thumbnail_filename("a.jpg", &size("100"), CropMode::Thumbnail, None, 90, ColorMode::Rgb, "jpg"),
            thumbnail_filename("a.jpg", &size("100"), CropMode::Fit, Some(&Background::WHITE), 90, ColorMode::Rgb, "jpg"),
            thumbnail_filename("a.jpg", &size("100"), CropMode::Fit, Some(&Background::new([1, 2, 3])), 90, ColorMode::Rgb, "jpg"),
            thumbnail_filename("a.jpg", &size("100"), CropMode::Fit, None, 89, ColorMode::Rgb, "jpg"),
            thumbnail_filename("a.jpg", &size("100"), CropMode::Fit, None, 90, ColorMode::Gray, "jpg"),
            thumbnail_filename("a.jpg", &size("100"), CropMode::Fit, None, 90, ColorMode::Rgb, "png"),
        ];

        for variant in &variants {
            assert_ne!(variant, &base);
        }
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("a.jpg"), ("a", Some("jpg")));
        assert_eq!(split_extension("a.b.png"), ("a.b", Some("png")));
        assert_eq!(split_extension("README"), ("README", None));
        assert_eq!(split_extension(".hidden"), (".hidden", None));
    }
}
