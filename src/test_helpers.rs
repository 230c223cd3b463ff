//! Shared test utilities.
//!
//! Fixture writers for source files and shorthand constructors for entries.
//! Sources written with [`touch`] are empty and only satisfy existence checks;
//! use [`write_test_png`] when a real decoder reads them.

use crate::entry::{ResolvedEntry, TransformEntry};
use crate::imaging::TargetFormat;
use image::{Rgba, RgbaImage};
use std::path::Path;

// =========================================================================
// Fixture files
// =========================================================================

/// Create an empty file, including parent directories.
pub fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, "").unwrap();
}

/// Write a real `width` × `height` PNG with a diagonal gradient.
pub fn write_test_png(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 128, 255])
    });
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

// =========================================================================
// Entries
// =========================================================================

pub fn entry(
    source: &str,
    destination: &str,
    resolution: &str,
    format: TargetFormat,
    append_resolution: bool,
) -> TransformEntry {
    TransformEntry {
        source: source.into(),
        destination: destination.into(),
        resolution: resolution.into(),
        format,
        append_resolution,
    }
}

pub fn resolved(
    source: &Path,
    destination: &Path,
    width: u32,
    height: u32,
    format: TargetFormat,
) -> ResolvedEntry {
    ResolvedEntry {
        source: source.to_path_buf(),
        destination: destination.to_path_buf(),
        width,
        height,
        format,
    }
}
