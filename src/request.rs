//! Typed request builder.
//!
//! One [`ImageFormatRequest`] per source image collects the conversions
//! wanted from it. Three shapes cover every configuration form:
//!
//! ```text
//! to_png("16x16", "out/*", true)                     one entry
//! to_png_all(&["16x16", "32x32"], "out/*")          one entry per size, appended names
//! to_png_pairs(&["16x16", "32x32"], &["a.png", "b.png"])   size i → destination i
//! ```
//!
//! The list form always appends the resolution so sizes sharing one
//! destination template don't collide. The pairwise form never does; each
//! size already has its own name.

use crate::config::ConfigError;
use crate::entry::TransformEntry;
use crate::imaging::TargetFormat;
use std::path::{Path, PathBuf};

/// Builder for the entries produced from one source.
#[derive(Debug, Clone)]
pub struct ImageFormatRequest {
    source: PathBuf,
    entries: Vec<TransformEntry>,
}

impl ImageFormatRequest {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            entries: Vec::new(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Request one conversion.
    pub fn to(
        &mut self,
        format: TargetFormat,
        resolution: &str,
        destination: impl AsRef<Path>,
        append_resolution: bool,
    ) -> &mut Self {
        self.entries.push(TransformEntry {
            source: self.source.clone(),
            destination: destination.as_ref().to_path_buf(),
            resolution: resolution.to_string(),
            format,
            append_resolution,
        });
        self
    }

    /// Request every resolution into one destination template.
    pub fn to_all<R: AsRef<str>>(
        &mut self,
        format: TargetFormat,
        resolutions: &[R],
        destination: impl AsRef<Path>,
    ) -> &mut Self {
        for resolution in resolutions {
            self.to(format, resolution.as_ref(), &destination, true);
        }
        self
    }

    /// Request `resolutions[i]` into `destinations[i]`.
    ///
    /// Fails without adding anything when the lists differ in length.
    pub fn to_pairs<R: AsRef<str>, D: AsRef<Path>>(
        &mut self,
        format: TargetFormat,
        resolutions: &[R],
        destinations: &[D],
    ) -> Result<&mut Self, ConfigError> {
        if resolutions.len() != destinations.len() {
            return Err(ConfigError::Validation(format!(
                "{}: {} resolutions but {} destinations",
                self.source.display(),
                resolutions.len(),
                destinations.len()
            )));
        }
        for (resolution, destination) in resolutions.iter().zip(destinations) {
            self.to(format, resolution.as_ref(), destination, false);
        }
        Ok(self)
    }

    pub fn to_png(
        &mut self,
        resolution: &str,
        destination: impl AsRef<Path>,
        append: bool,
    ) -> &mut Self {
        self.to(TargetFormat::Png, resolution, destination, append)
    }

    pub fn to_png_all<R: AsRef<str>>(
        &mut self,
        resolutions: &[R],
        destination: impl AsRef<Path>,
    ) -> &mut Self {
        self.to_all(TargetFormat::Png, resolutions, destination)
    }

    pub fn to_png_pairs<R: AsRef<str>, D: AsRef<Path>>(
        &mut self,
        resolutions: &[R],
        destinations: &[D],
    ) -> Result<&mut Self, ConfigError> {
        self.to_pairs(TargetFormat::Png, resolutions, destinations)
    }

    pub fn to_ico(
        &mut self,
        resolution: &str,
        destination: impl AsRef<Path>,
        append: bool,
    ) -> &mut Self {
        self.to(TargetFormat::Ico, resolution, destination, append)
    }

    pub fn to_ico_all<R: AsRef<str>>(
        &mut self,
        resolutions: &[R],
        destination: impl AsRef<Path>,
    ) -> &mut Self {
        self.to_all(TargetFormat::Ico, resolutions, destination)
    }

    pub fn to_ico_pairs<R: AsRef<str>, D: AsRef<Path>>(
        &mut self,
        resolutions: &[R],
        destinations: &[D],
    ) -> Result<&mut Self, ConfigError> {
        self.to_pairs(TargetFormat::Ico, resolutions, destinations)
    }

    pub fn to_bmp(
        &mut self,
        resolution: &str,
        destination: impl AsRef<Path>,
        append: bool,
    ) -> &mut Self {
        self.to(TargetFormat::Bmp, resolution, destination, append)
    }

    pub fn to_bmp_all<R: AsRef<str>>(
        &mut self,
        resolutions: &[R],
        destination: impl AsRef<Path>,
    ) -> &mut Self {
        self.to_all(TargetFormat::Bmp, resolutions, destination)
    }

    pub fn to_bmp_pairs<R: AsRef<str>, D: AsRef<Path>>(
        &mut self,
        resolutions: &[R],
        destinations: &[D],
    ) -> Result<&mut Self, ConfigError> {
        self.to_pairs(TargetFormat::Bmp, resolutions, destinations)
    }

    pub fn to_icns(
        &mut self,
        resolution: &str,
        destination: impl AsRef<Path>,
        append: bool,
    ) -> &mut Self {
        self.to(TargetFormat::Icns, resolution, destination, append)
    }

    pub fn to_icns_all<R: AsRef<str>>(
        &mut self,
        resolutions: &[R],
        destination: impl AsRef<Path>,
    ) -> &mut Self {
        self.to_all(TargetFormat::Icns, resolutions, destination)
    }

    pub fn to_icns_pairs<R: AsRef<str>, D: AsRef<Path>>(
        &mut self,
        resolutions: &[R],
        destinations: &[D],
    ) -> Result<&mut Self, ConfigError> {
        self.to_pairs(TargetFormat::Icns, resolutions, destinations)
    }

    pub fn entries(&self) -> &[TransformEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<TransformEntry> {
        self.entries
    }
}
