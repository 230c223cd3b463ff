//! Transform configuration.
//!
//! A batch is described by one `transform.toml`. Every key is optional except
//! the request tables themselves:
//!
//! ```toml
//! base_dir = "."                 # Relative to the config file
//! app_name = "Viewer"            # Fills {app_name} in destinations
//! no_auto_binding = false        # Don't register with a packaging host
//! include_global = true          # Task runs also process [[global]] entries
//! append_resolution = true       # Default for single-resolution requests
//! resolution_delimiter = "-"     # icon-16x16.png
//! dry_run = false
//!
//! [processing]
//! max_processes = 4              # Omit for auto = CPU cores
//!
//! [[task]]
//! source = "icons/icon.png"
//! format = "png"
//! resolutions = ["16x16", "32x32"]
//! destination = "build/icons/*"
//! ```
//!
//! ## Request shapes
//!
//! | Keys | Entries | Default append |
//! |---|---|---|
//! | `resolution` + `destination` | one | top-level `append_resolution` |
//! | `resolutions` + `destination` | one per size | `true` |
//! | `resolutions` + `destinations` | size *i* → destination *i* | `false` |
//!
//! A request's own `append_resolution` overrides the default. A `source` that
//! is a directory expands to every decodable image directly inside it, in
//! file-name order.
//!
//! Structural errors (unknown keys, missing or conflicting keys, mismatched
//! list lengths) abort loading. Everything about individual entries, like a
//! missing source or a malformed resolution, is left to validation, where it
//! rejects that entry only.

use crate::entry::{EntrySet, Scope};
use crate::imaging::{TargetFormat, supported_input_extensions};
use crate::naming::DEFAULT_DELIMITER;
use crate::request::ImageFormatRequest;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Default config file name looked up by the CLI.
pub const CONFIG_FILENAME: &str = "transform.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Batch configuration loaded from `transform.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransformConfig {
    /// Directory relative paths resolve against. Relative values are taken
    /// from the config file's directory.
    pub base_dir: Option<PathBuf>,
    /// Application name for `{app_name}` destinations.
    pub app_name: Option<String>,
    pub no_auto_binding: bool,
    pub include_global: bool,
    pub append_resolution: bool,
    pub resolution_delimiter: String,
    pub dry_run: bool,
    pub processing: ProcessingConfig,
    /// Requests shared by every run.
    pub global: Vec<RequestConfig>,
    /// Requests of this run.
    pub task: Vec<RequestConfig>,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            base_dir: None,
            app_name: None,
            no_auto_binding: false,
            include_global: true,
            append_resolution: true,
            resolution_delimiter: DEFAULT_DELIMITER.to_string(),
            dry_run: false,
            processing: ProcessingConfig::default(),
            global: Vec::new(),
            task: Vec::new(),
        }
    }
}

/// One `[[global]]` or `[[task]]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestConfig {
    pub source: PathBuf,
    pub format: TargetFormat,
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default)]
    pub resolutions: Vec<String>,
    #[serde(default)]
    pub destination: Option<PathBuf>,
    #[serde(default)]
    pub destinations: Vec<PathBuf>,
    #[serde(default)]
    pub append_resolution: Option<bool>,
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

impl RequestConfig {
    fn validate(&self, table: &str, index: usize) -> Result<(), ConfigError> {
        let at = || format!("{table}[{index}] ({})", self.source.display());
        match (&self.resolution, self.resolutions.is_empty()) {
            (Some(_), false) => {
                return Err(ConfigError::Validation(format!(
                    "{}: set either resolution or resolutions, not both",
                    at()
                )));
            }
            (None, true) => {
                return Err(ConfigError::Validation(format!(
                    "{}: missing resolution",
                    at()
                )));
            }
            _ => {}
        }
        match (&self.destination, self.destinations.is_empty()) {
            (Some(_), false) => {
                return Err(ConfigError::Validation(format!(
                    "{}: set either destination or destinations, not both",
                    at()
                )));
            }
            (None, true) => {
                return Err(ConfigError::Validation(format!(
                    "{}: missing destination",
                    at()
                )));
            }
            _ => {}
        }
        if !self.destinations.is_empty() {
            if self.resolution.is_some() {
                return Err(ConfigError::Validation(format!(
                    "{}: destinations needs a resolutions list",
                    at()
                )));
            }
            if self.destinations.len() != self.resolutions.len() {
                return Err(ConfigError::Validation(format!(
                    "{}: {} resolutions but {} destinations",
                    at(),
                    self.resolutions.len(),
                    self.destinations.len()
                )));
            }
        }
        Ok(())
    }

    /// Add this request's entries for one concrete source.
    fn add_to(
        &self,
        request: &mut ImageFormatRequest,
        default_append: bool,
    ) -> Result<(), ConfigError> {
        match (&self.resolution, &self.destination) {
            (Some(resolution), Some(destination)) => {
                let append = self.append_resolution.unwrap_or(default_append);
                request.to(self.format, resolution, destination, append);
            }
            (None, Some(destination)) => match self.append_resolution {
                Some(append) => {
                    for resolution in &self.resolutions {
                        request.to(self.format, resolution, destination, append);
                    }
                }
                None => {
                    request.to_all(self.format, &self.resolutions, destination);
                }
            },
            _ => match self.append_resolution {
                Some(append) => {
                    for (resolution, destination) in self.resolutions.iter().zip(&self.destinations)
                    {
                        request.to(self.format, resolution, destination, append);
                    }
                }
                None => {
                    request.to_pairs(self.format, &self.resolutions, &self.destinations)?;
                }
            },
        }
        Ok(())
    }
}

impl TransformConfig {
    /// Validate structure. Entry-level problems are not checked here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resolution_delimiter.contains(['/', '\\']) {
            return Err(ConfigError::Validation(
                "resolution_delimiter must not contain a path separator".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        for (i, request) in self.global.iter().enumerate() {
            request.validate("global", i)?;
        }
        for (i, request) in self.task.iter().enumerate() {
            request.validate("task", i)?;
        }
        Ok(())
    }

    /// The directory relative paths resolve against.
    pub fn resolve_base_dir(&self, config_dir: &Path) -> PathBuf {
        match &self.base_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => config_dir.join(dir),
            None => config_dir.to_path_buf(),
        }
    }

    /// Build the entry set for both scopes.
    ///
    /// `base_dir` is only used to find directory sources; entry paths stay
    /// as written.
    pub fn entry_set(&self, base_dir: &Path) -> Result<EntrySet, ConfigError> {
        let mut set = EntrySet::new();
        for (scope, requests) in [(Scope::Global, &self.global), (Scope::Task, &self.task)] {
            for request in requests {
                for source in expand_source(&request.source, base_dir)? {
                    let mut builder = ImageFormatRequest::new(source);
                    request.add_to(&mut builder, self.append_resolution)?;
                    set.extend(scope, builder.into_entries());
                }
            }
        }
        Ok(set)
    }
}

/// Expand a directory source into the image files directly inside it.
///
/// Anything that is not a directory, including a missing path, passes through
/// for validation to judge.
fn expand_source(source: &Path, base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let on_disk = if source.is_absolute() {
        source.to_path_buf()
    } else {
        base_dir.join(source)
    };
    if !on_disk.is_dir() {
        return Ok(vec![source.to_path_buf()]);
    }

    let extensions = supported_input_extensions();
    let mut files = Vec::new();
    for entry in WalkDir::new(&on_disk)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| ConfigError::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_image = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| extensions.contains(&e.to_ascii_lowercase().as_str()));
        if is_image {
            files.push(source.join(entry.file_name()));
        }
    }

    if files.is_empty() {
        warn!(source = %source.display(), "directory source contains no images");
    } else {
        debug!(source = %source.display(), count = files.len(), "expanded directory source");
    }
    Ok(files)
}

/// Load and validate a config file.
pub fn load_config(path: &Path) -> Result<TransformConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: TransformConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `transform.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# imgform configuration
# =====================
# Every top-level key is optional; values shown are the defaults.
# Relative paths resolve against base_dir.

# Directory relative sources and destinations resolve against.
# Relative to this file; defaults to this file's directory.
# base_dir = "."

# Name substituted for {app_name} in destinations. Entries using the
# placeholder are rejected when no name is available.
# app_name = "MyApp"

# Don't register the transform task with a packaging host.
no_auto_binding = false

# Task runs also process the [[global]] requests (before their own).
include_global = true

# Whether single-resolution requests insert the resolution into the file
# name. Requests with a resolutions list and one destination always
# append; paired destinations never do, unless the request says otherwise.
append_resolution = true

# Joins file stem and resolution: icon-16x16.png
resolution_delimiter = "-"

# Report what would be written without touching the filesystem.
dry_run = false

# ---------------------------------------------------------------------------
# Parallel processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers. Omit to use all CPU cores.
# Values above the core count are clamped down.
# max_processes = 4

# ---------------------------------------------------------------------------
# Requests
# ---------------------------------------------------------------------------
# format: png, bmp, ico, icns, jpeg, webp, avif
# destination: a path, or a directory followed by * to name outputs after
#              the source.
# source: an image, or a directory (every image directly inside it).
#
# [[global]]
# source = "branding/logo.png"
# format = "png"
# resolution = "512x512"
# destination = "build/branding/*"
#
# [[task]]
# source = "icons/icon.png"
# format = "ico"
# resolutions = ["16x16", "32x32", "48x48"]
# destination = "build/icons/*"
#
# [[task]]
# source = "icons/icon.png"
# format = "icns"
# resolutions = ["128x128", "256x256"]
# destinations = ["build/{app_name}.icns", "build/{app_name}@2x.icns"]
"##
}
