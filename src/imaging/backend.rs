//! Codec adapter trait and shared types.
//!
//! The [`ImageBackend`] trait defines the four operations the transform
//! engine needs: probe, decode, resize and encode. Keeping them separate lets
//! the engine attribute a failure to the exact stage that produced it.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use the recording [`MockBackend`](tests::MockBackend).

use super::params::TargetFormat;
use image::{DynamicImage, ImageFormat};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("encode failed: {0}")]
    Encode(String),
    #[error("cannot render a {width}x{height} image")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Trait for image codec backends.
pub trait ImageBackend: Sync {
    /// Identify the container by its magic bytes.
    ///
    /// `Ok(None)` means the file was readable but is not an image this
    /// backend can decode.
    fn probe(&self, path: &Path) -> Result<Option<ImageFormat>, BackendError>;

    /// Decode a source file into an in-memory raster.
    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError>;

    /// Scale to exactly `width` × `height`, ignoring the aspect ratio.
    fn resize(
        &self,
        image: &DynamicImage,
        width: u32,
        height: u32,
    ) -> Result<DynamicImage, BackendError>;

    /// Encode a raster into the bytes of the target container.
    fn encode(&self, image: &DynamicImage, format: TargetFormat) -> Result<Vec<u8>, BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Mock backend that records operations instead of doing pixel work.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    ///
    /// Every existing file probes as PNG and decodes to a blank
    /// `source_dims` raster, unless its file name is listed in
    /// `unrecognized` or `undecodable`.
    pub struct MockBackend {
        pub source_dims: (u32, u32),
        pub unrecognized: HashSet<String>,
        pub undecodable: HashSet<String>,
        pub failing_formats: HashSet<TargetFormat>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Probe(String),
        Decode(String),
        Resize { width: u32, height: u32 },
        Encode(TargetFormat),
    }

    impl Default for MockBackend {
        fn default() -> Self {
            Self {
                source_dims: (64, 64),
                unrecognized: HashSet::new(),
                undecodable: HashSet::new(),
                failing_formats: HashSet::new(),
                operations: Mutex::new(Vec::new()),
            }
        }
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn rejecting(file_name: &str) -> Self {
            let mut backend = Self::new();
            backend.unrecognized.insert(file_name.to_string());
            backend
        }

        pub fn undecodable(file_name: &str) -> Self {
            let mut backend = Self::new();
            backend.undecodable.insert(file_name.to_string());
            backend
        }

        pub fn failing_encode(format: TargetFormat) -> Self {
            let mut backend = Self::new();
            backend.failing_formats.insert(format);
            backend
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        fn record(&self, op: RecordedOp) {
            self.operations.lock().unwrap().push(op);
        }
    }

    fn file_name(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    impl ImageBackend for MockBackend {
        fn probe(&self, path: &Path) -> Result<Option<ImageFormat>, BackendError> {
            self.record(RecordedOp::Probe(path.to_string_lossy().to_string()));
            std::fs::metadata(path)?;
            if self.unrecognized.contains(&file_name(path)) {
                return Ok(None);
            }
            Ok(Some(ImageFormat::Png))
        }

        fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError> {
            self.record(RecordedOp::Decode(path.to_string_lossy().to_string()));
            if self.undecodable.contains(&file_name(path)) {
                return Err(BackendError::Decode(format!(
                    "truncated file {}",
                    path.display()
                )));
            }
            let (w, h) = self.source_dims;
            Ok(DynamicImage::new_rgba8(w, h))
        }

        fn resize(
            &self,
            _image: &DynamicImage,
            width: u32,
            height: u32,
        ) -> Result<DynamicImage, BackendError> {
            self.record(RecordedOp::Resize { width, height });
            if width == 0 || height == 0 {
                return Err(BackendError::InvalidDimensions { width, height });
            }
            Ok(DynamicImage::new_rgba8(width, height))
        }

        fn encode(
            &self,
            _image: &DynamicImage,
            format: TargetFormat,
        ) -> Result<Vec<u8>, BackendError> {
            self.record(RecordedOp::Encode(format));
            if self.failing_formats.contains(&format) {
                return Err(BackendError::Encode(format!("{format} rejected the raster")));
            }
            Ok(format!("mock {}", format.extension()).into_bytes())
        }
    }

    #[test]
    fn mock_probes_existing_files_as_png() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("icon.png");
        std::fs::write(&path, "").unwrap();

        let backend = MockBackend::new();
        assert_eq!(backend.probe(&path).unwrap(), Some(ImageFormat::Png));
        assert!(backend.probe(&tmp.path().join("missing.png")).is_err());
    }

    #[test]
    fn mock_reports_unrecognized_files() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        let backend = MockBackend::rejecting("notes.txt");
        assert_eq!(backend.probe(&path).unwrap(), None);
    }

    #[test]
    fn mock_records_pipeline() {
        let backend = MockBackend::new();
        let raster = backend.decode(Path::new("/src/icon.png")).unwrap();
        let resized = backend.resize(&raster, 16, 16).unwrap();
        backend.encode(&resized, TargetFormat::Ico).unwrap();

        assert_eq!(
            backend.get_operations(),
            vec![
                RecordedOp::Decode("/src/icon.png".into()),
                RecordedOp::Resize {
                    width: 16,
                    height: 16
                },
                RecordedOp::Encode(TargetFormat::Ico),
            ]
        );
    }
}
