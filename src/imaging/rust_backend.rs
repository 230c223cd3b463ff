//! Pure Rust codec backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Probe | `ImageReader::with_guessed_format` (magic bytes, never the extension) |
//! | Decode (PNG, BMP, ICO, GIF, JPEG, TIFF, WebP) | `image` crate decoders |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Encode → PNG, BMP, ICO, JPEG, WebP, AVIF | `image::codecs::*` encoders, format defaults |
//! | Encode → ICNS | [`icns`](super::icns), one `IconFamily` element |

use super::backend::{BackendError, ImageBackend};
use super::icns;
use super::params::TargetFormat;
use image::codecs::avif::AvifEncoder;
use image::codecs::bmp::BmpEncoder;
use image::codecs::ico::IcoEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::LazyLock;

/// Source formats whose decoders are compiled in, with the extensions used
/// when expanding a source directory.
///
/// AVIF is deliberately absent: the `"avif"` feature only enables the
/// encoder, yet `ImageFormat::reading_enabled()` reports it as readable.
const SOURCE_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("png", ImageFormat::Png),
    ("bmp", ImageFormat::Bmp),
    ("ico", ImageFormat::Ico),
    ("gif", ImageFormat::Gif),
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    SOURCE_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Largest allocation a single resize may make, in bytes.
///
/// A `WIDTHxHEIGHT` that parses can still describe a raster no machine holds,
/// and a failed allocation aborts the process instead of the entry. Targets
/// over this ceiling fail at the resize stage.
pub const MAX_RESIZE_BYTES: u64 = 1 << 30;

/// Bytes `resize_exact` allocates: a 32-bit float RGBA intermediate of the
/// source width by the target height, then the target itself.
fn resize_footprint(image: &DynamicImage, width: u32, height: u32) -> Option<u64> {
    let intermediate = u64::from(image.width())
        .checked_mul(u64::from(height))?
        .checked_mul(16)?;
    let target = u64::from(width)
        .checked_mul(u64::from(height))?
        .checked_mul(u64::from(image.color().bytes_per_pixel()))?;
    intermediate.checked_add(target)
}

/// Returns the set of file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Whether a sniffed format can be decoded by this backend.
fn is_decodable(format: ImageFormat) -> bool {
    SOURCE_CANDIDATES
        .iter()
        .any(|(_, candidate)| *candidate == format && format.reading_enabled())
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Open a file for decoding with no format hint, so only the magic bytes
/// decide what it is.
fn open_sniffed(path: &Path) -> Result<ImageReader<BufReader<File>>, BackendError> {
    let file = File::open(path)?;
    Ok(ImageReader::new(BufReader::new(file)).with_guessed_format()?)
}

impl ImageBackend for RustBackend {
    fn probe(&self, path: &Path) -> Result<Option<ImageFormat>, BackendError> {
        let reader = open_sniffed(path)?;
        Ok(reader.format().filter(|f| is_decodable(*f)))
    }

    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError> {
        open_sniffed(path)?
            .decode()
            .map_err(|e| BackendError::Decode(format!("{}: {}", path.display(), e)))
    }

    fn resize(
        &self,
        image: &DynamicImage,
        width: u32,
        height: u32,
    ) -> Result<DynamicImage, BackendError> {
        let fits = resize_footprint(image, width, height)
            .is_some_and(|bytes| bytes <= MAX_RESIZE_BYTES);
        if width == 0 || height == 0 || !fits {
            return Err(BackendError::InvalidDimensions { width, height });
        }
        Ok(image.resize_exact(width, height, FilterType::Lanczos3))
    }

    fn encode(&self, image: &DynamicImage, format: TargetFormat) -> Result<Vec<u8>, BackendError> {
        let mut buf = Vec::new();
        let written = match format {
            TargetFormat::Icns => return icns::encode_icns(image),
            TargetFormat::Png => image.write_with_encoder(PngEncoder::new(&mut buf)),
            TargetFormat::Bmp => image.write_with_encoder(BmpEncoder::new(&mut buf)),
            TargetFormat::Ico => image.write_with_encoder(IcoEncoder::new(&mut buf)),
            TargetFormat::Jpeg => image.write_with_encoder(JpegEncoder::new(&mut buf)),
            TargetFormat::Webp => image.write_with_encoder(WebPEncoder::new_lossless(&mut buf)),
            TargetFormat::Avif => image.write_with_encoder(AvifEncoder::new(&mut buf)),
        };
        written.map_err(|e| BackendError::Encode(format!("{format}: {e}")))?;
        Ok(buf)
    }
}
