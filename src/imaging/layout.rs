//! Pixel-layout fitting: pure functions, no I/O.
//!
//! Each encoder accepts a limited set of pixel layouts. Before resizing, the
//! source raster is moved into a layout the target can store: unchanged when
//! the target supports it, otherwise 8-bit RGBA (8-bit RGB for containers
//! without an alpha channel).

use super::params::TargetFormat;
use image::{ColorType, DynamicImage};

/// Whether `format` can encode `color` without conversion.
pub fn supports_layout(format: TargetFormat, color: ColorType) -> bool {
    use ColorType::*;
    match format {
        TargetFormat::Png => matches!(color, L8 | La8 | Rgb8 | Rgba8 | L16 | La16 | Rgb16 | Rgba16),
        TargetFormat::Bmp | TargetFormat::Webp => matches!(color, L8 | La8 | Rgb8 | Rgba8),
        TargetFormat::Jpeg => matches!(color, L8 | Rgb8),
        TargetFormat::Avif => matches!(color, Rgb8 | Rgba8),
        // Icon containers always carry straight 8-bit RGBA.
        TargetFormat::Ico | TargetFormat::Icns => color == Rgba8,
    }
}

/// The layout a raster of `color` ends up in for `format`.
pub fn target_layout(format: TargetFormat, color: ColorType) -> ColorType {
    if supports_layout(format, color) {
        color
    } else if format.supports_alpha() {
        ColorType::Rgba8
    } else {
        ColorType::Rgb8
    }
}

/// Convert `image` into the layout [`target_layout`] picks for `format`.
pub fn fit_layout(image: DynamicImage, format: TargetFormat) -> DynamicImage {
    match target_layout(format, image.color()) {
        layout if layout == image.color() => image,
        ColorType::Rgb8 => DynamicImage::ImageRgb8(image.into_rgb8()),
        _ => DynamicImage::ImageRgba8(image.into_rgba8()),
    }
}
