//! Target encodings.
//!
//! [`TargetFormat`] names *what* an entry is encoded into. It carries the
//! canonical lowercase file extension used by destination naming and the
//! matching `image` crate format where one exists. ICNS has no encoder in the
//! `image` crate and is written by [`icns`](super::icns).

use image::ImageFormat;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    Png,
    Bmp,
    Ico,
    Icns,
    #[serde(alias = "jpg")]
    Jpeg,
    /// Lossless WebP.
    Webp,
    Avif,
}

impl TargetFormat {
    pub const ALL: [TargetFormat; 7] = [
        TargetFormat::Png,
        TargetFormat::Bmp,
        TargetFormat::Ico,
        TargetFormat::Icns,
        TargetFormat::Jpeg,
        TargetFormat::Webp,
        TargetFormat::Avif,
    ];

    /// Canonical lowercase file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            TargetFormat::Png => "png",
            TargetFormat::Bmp => "bmp",
            TargetFormat::Ico => "ico",
            TargetFormat::Icns => "icns",
            TargetFormat::Jpeg => "jpg",
            TargetFormat::Webp => "webp",
            TargetFormat::Avif => "avif",
        }
    }

    /// Display name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            TargetFormat::Png => "PNG",
            TargetFormat::Bmp => "BMP",
            TargetFormat::Ico => "ICO",
            TargetFormat::Icns => "ICNS",
            TargetFormat::Jpeg => "JPEG",
            TargetFormat::Webp => "WebP",
            TargetFormat::Avif => "AVIF",
        }
    }

    /// The `image` crate format, or `None` when we encode it ourselves.
    pub fn image_format(self) -> Option<ImageFormat> {
        match self {
            TargetFormat::Png => Some(ImageFormat::Png),
            TargetFormat::Bmp => Some(ImageFormat::Bmp),
            TargetFormat::Ico => Some(ImageFormat::Ico),
            TargetFormat::Icns => None,
            TargetFormat::Jpeg => Some(ImageFormat::Jpeg),
            TargetFormat::Webp => Some(ImageFormat::WebP),
            TargetFormat::Avif => Some(ImageFormat::Avif),
        }
    }

    /// Whether the container can store an alpha channel.
    pub fn supports_alpha(self) -> bool {
        !matches!(self, TargetFormat::Jpeg)
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown target format {0:?}")]
pub struct UnknownFormat(pub String);

impl FromStr for TargetFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(TargetFormat::Png),
            "bmp" => Ok(TargetFormat::Bmp),
            "ico" => Ok(TargetFormat::Ico),
            "icns" => Ok(TargetFormat::Icns),
            "jpeg" | "jpg" => Ok(TargetFormat::Jpeg),
            "webp" => Ok(TargetFormat::Webp),
            "avif" => Ok(TargetFormat::Avif),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}
