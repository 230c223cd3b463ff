//! Apple ICNS encoding via the `icns` crate.
//!
//! The `image` crate has no ICNS encoder. A single-resolution icon is one
//! [`IconFamily`] element holding the raster as RGBA. Only the square sizes
//! in [`SLOTS`] have an element type; any other resolution is an encode
//! failure.

use super::backend::BackendError;
use ::icns::{IconFamily, IconType, Image, PixelFormat};
use image::DynamicImage;

/// PNG-backed icon types by edge length in pixels.
///
/// Retina variants share their pixel size with a standard type, so the
/// standard one is written. 1024 only exists as the 512@2x type.
const SLOTS: &[(u32, IconType)] = &[
    (16, IconType::RGBA32_16x16),
    (32, IconType::RGBA32_32x32),
    (64, IconType::RGBA32_64x64),
    (128, IconType::RGBA32_128x128),
    (256, IconType::RGBA32_256x256),
    (512, IconType::RGBA32_512x512),
    (1024, IconType::RGBA32_512x512_2x),
];

/// Edge lengths an ICNS icon can be written at.
pub fn supported_sizes() -> impl Iterator<Item = u32> {
    SLOTS.iter().map(|(size, _)| *size)
}

/// Icon type for a `width` × `height` icon, if the container has one.
fn slot_for(width: u32, height: u32) -> Option<IconType> {
    if width != height {
        return None;
    }
    SLOTS
        .iter()
        .find(|(size, _)| *size == width)
        .map(|(_, icon_type)| *icon_type)
}

/// Encode a raster as a single-element ICNS file.
pub fn encode_icns(image: &DynamicImage) -> Result<Vec<u8>, BackendError> {
    let (width, height) = (image.width(), image.height());
    let icon_type = slot_for(width, height).ok_or_else(|| {
        BackendError::Encode(format!(
            "ICNS has no icon slot for {width}x{height} (square sizes only: {})",
            supported_sizes()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    })?;

    let encode_err = |e: std::io::Error| BackendError::Encode(format!("ICNS: {e}"));
    let rgba = Image::from_data(PixelFormat::RGBA, width, height, image.to_rgba8().into_raw())
        .map_err(encode_err)?;

    let mut family = IconFamily::new();
    family
        .add_icon_with_type(&rgba, icon_type)
        .map_err(encode_err)?;

    let mut out = Vec::new();
    family.write(&mut out).map_err(encode_err)?;
    Ok(out)
}
