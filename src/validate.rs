//! Validation pipeline: raw entries in, executable entries out.
//!
//! Every entry runs through the same stages, independently of the others:
//!
//! 1. **Source resolution**: relative sources are joined onto the base
//!    directory and made absolute, with `.` and `..` folded away; the file
//!    must exist.
//! 2. **Format sniffing**: the content (not the extension) must be an image
//!    the backend decodes.
//! 3. **Resolution parsing**: see [`crate::resolution`].
//! 4. **Placeholder expansion**: `{app_name}` needs an application name.
//!
//! Survivors get a concrete destination from [`crate::naming`]. Entries are
//! validated in parallel with rayon, so nothing here may depend on another
//! entry. The one cross-entry rule, unique destinations, runs afterwards as a
//! sequential pass in input order: the first entry claiming a destination
//! keeps it, later ones are rejected.
//!
//! A rejection never aborts the batch. Each carries the original entry and
//! exactly one reason.

use crate::entry::{ResolvedEntry, TransformEntry};
use crate::imaging::ImageBackend;
use crate::naming::{self, DEFAULT_DELIMITER};
use crate::resolution::{ResolutionError, parse_resolution};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Why an entry was excluded from execution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    #[error("source not found: {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error("unrecognized image format: {}", .0.display())]
    UnrecognizedFormat(PathBuf),
    #[error("invalid resolution: {0}")]
    InvalidResolution(#[from] ResolutionError),
    #[error("destination {} uses {{app_name}} but no application name is set", .0.display())]
    UnresolvedPlaceholder(PathBuf),
    #[error("destination {} is already produced by another entry", .0.display())]
    DuplicateDestination(PathBuf),
}

/// A rejected entry and its reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub entry: TransformEntry,
    pub reason: RejectReason,
}

/// Result of validating a batch.
#[derive(Debug, Clone, Default)]
pub struct Validation {
    /// Executable entries, in input order.
    pub resolved: Vec<ResolvedEntry>,
    pub rejected: Vec<Rejection>,
}

impl Validation {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Inputs shared by every entry of a batch.
#[derive(Debug, Clone)]
pub struct ValidationContext {
    /// Directory relative sources and destinations are resolved against.
    pub base_dir: PathBuf,
    /// Joins a file stem and an appended resolution.
    pub delimiter: String,
    pub app_name: Option<String>,
}

impl ValidationContext {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            delimiter: DEFAULT_DELIMITER.to_string(),
            app_name: None,
        }
    }

    /// Absolute, lexically clean form of `path`. A relative base directory
    /// is taken against the working directory.
    fn absolutize(&self, path: &Path) -> PathBuf {
        let joined = self.base_dir.join(path);
        let absolute = std::path::absolute(&joined).unwrap_or(joined);
        normalize(&absolute)
    }
}

/// Drop `.` components and fold `..` into the preceding name, without
/// touching the filesystem. `..` at the root stays at the root.
fn normalize(path: &Path) -> PathBuf {
    let mut clean = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match clean.components().next_back() {
                Some(Component::Normal(_)) => {
                    clean.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => clean.push(component),
            },
            other => clean.push(other),
        }
    }
    clean
}

/// Validate a batch of entries.
pub fn validate(
    backend: &impl ImageBackend,
    entries: &[TransformEntry],
    ctx: &ValidationContext,
) -> Validation {
    let results: Vec<Result<ResolvedEntry, RejectReason>> = entries
        .par_iter()
        .map(|entry| validate_entry(backend, entry, ctx))
        .collect();

    let mut validation = Validation::default();
    let mut claimed: HashSet<PathBuf> = HashSet::new();

    for (entry, result) in entries.iter().zip(results) {
        let outcome = result.and_then(|resolved| {
            if claimed.insert(resolved.destination.clone()) {
                Ok(resolved)
            } else {
                Err(RejectReason::DuplicateDestination(resolved.destination))
            }
        });
        match outcome {
            Ok(resolved) => validation.resolved.push(resolved),
            Err(reason) => {
                debug!(source = %entry.source.display(), %reason, "rejected entry");
                validation.rejected.push(Rejection {
                    entry: entry.clone(),
                    reason,
                });
            }
        }
    }

    validation
}

/// Validate one entry and resolve its destination.
pub fn validate_entry(
    backend: &impl ImageBackend,
    entry: &TransformEntry,
    ctx: &ValidationContext,
) -> Result<ResolvedEntry, RejectReason> {
    let source = ctx.absolutize(&entry.source);
    if !source.is_file() {
        return Err(RejectReason::SourceNotFound(source));
    }

    match backend.probe(&source) {
        Ok(Some(_)) => {}
        Ok(None) | Err(_) => return Err(RejectReason::UnrecognizedFormat(source)),
    }

    let resolution = parse_resolution(&entry.resolution)?;

    let template = naming::expand_placeholders(&entry.destination, ctx.app_name.as_deref())
        .ok_or_else(|| RejectReason::UnresolvedPlaceholder(entry.destination.clone()))?;

    let destination = naming::resolve_destination(
        &source,
        &ctx.absolutize(&template),
        entry.resolution.trim(),
        entry.format,
        entry.append_resolution,
        &ctx.delimiter,
    );

    Ok(ResolvedEntry {
        source,
        destination,
        width: resolution.width,
        height: resolution.height,
        format: entry.format,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::TargetFormat;
    use crate::imaging::backend::tests::MockBackend;
    use crate::test_helpers::{entry, touch};
    use tempfile::TempDir;

    fn ctx(base: &Path) -> ValidationContext {
        ValidationContext::new(base)
    }

    #[test]
    fn resolves_relative_paths_against_base_dir() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("icons/icon.png"));

        let e = entry("icons/icon.png", "build/out/*", "16x16", TargetFormat::Png, true);
        let resolved = validate_entry(&MockBackend::new(), &e, &ctx(tmp.path())).unwrap();

        assert_eq!(resolved.source, tmp.path().join("icons/icon.png"));
        assert_eq!(
            resolved.destination,
            tmp.path().join("build/out/icon-16x16.png")
        );
        assert_eq!((resolved.width, resolved.height), (16, 16));
        assert_eq!(resolved.format, TargetFormat::Png);
    }

    #[test]
    fn absolute_paths_are_kept() {
        let tmp = TempDir::new().unwrap();
        let other = TempDir::new().unwrap();
        let source = other.path().join("icon.png");
        touch(&source);
        let dest = other.path().join("out/app.ico");

        let e = TransformEntry {
            source: source.clone(),
            destination: dest.clone(),
            resolution: "32x32".into(),
            format: TargetFormat::Ico,
            append_resolution: false,
        };
        let resolved = validate_entry(&MockBackend::new(), &e, &ctx(tmp.path())).unwrap();
        assert_eq!(resolved.source, source);
        assert_eq!(resolved.destination, dest);
    }

    #[test]
    fn missing_source_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let e = entry("nope.png", "out/*", "16x16", TargetFormat::Png, true);
        let err = validate_entry(&MockBackend::new(), &e, &ctx(tmp.path())).unwrap_err();
        assert_eq!(err, RejectReason::SourceNotFound(tmp.path().join("nope.png")));
    }

    #[test]
    fn directory_source_is_not_found() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join("icons")).unwrap();
        let e = entry("icons", "out/*", "16x16", TargetFormat::Png, true);
        assert!(matches!(
            validate_entry(&MockBackend::new(), &e, &ctx(tmp.path())),
            Err(RejectReason::SourceNotFound(_))
        ));
    }

    #[test]
    fn unrecognized_source_is_rejected() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("notes.txt"));
        let e = entry("notes.txt", "out/*", "16x16", TargetFormat::Png, true);
        let err = validate_entry(&MockBackend::rejecting("notes.txt"), &e, &ctx(tmp.path()))
            .unwrap_err();
        assert!(matches!(err, RejectReason::UnrecognizedFormat(_)));
    }

    #[test]
    fn invalid_resolution_is_rejected() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("icon.png"));
        let e = entry("icon.png", "out/*", "64x64x", TargetFormat::Png, true);
        let err = validate_entry(&MockBackend::new(), &e, &ctx(tmp.path())).unwrap_err();
        assert!(matches!(
            err,
            RejectReason::InvalidResolution(ResolutionError::WrongPartCount { .. })
        ));
    }

    #[test]
    fn source_checked_before_resolution() {
        let tmp = TempDir::new().unwrap();
        let e = entry("missing.png", "out/*", "garbage", TargetFormat::Png, true);
        assert!(matches!(
            validate_entry(&MockBackend::new(), &e, &ctx(tmp.path())),
            Err(RejectReason::SourceNotFound(_))
        ));
    }

    #[test]
    fn zero_resolution_passes_validation() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("icon.png"));
        let e = entry("icon.png", "out/*", "0x0", TargetFormat::Png, true);
        let resolved = validate_entry(&MockBackend::new(), &e, &ctx(tmp.path())).unwrap();
        assert_eq!((resolved.width, resolved.height), (0, 0));
    }

    #[test]
    fn appended_resolution_uses_trimmed_raw_string() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("icon.png"));
        let e = entry("icon.png", "out/*", " 32x32 ", TargetFormat::Png, true);
        let resolved = validate_entry(&MockBackend::new(), &e, &ctx(tmp.path())).unwrap();
        assert_eq!(resolved.destination, tmp.path().join("out/icon-32x32.png"));
    }

    #[test]
    fn app_name_placeholder_needs_a_name() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("icon.png"));
        let e = entry("icon.png", "pkg/{app_name}.icns", "128x128", TargetFormat::Icns, false);

        let err = validate_entry(&MockBackend::new(), &e, &ctx(tmp.path())).unwrap_err();
        assert!(matches!(err, RejectReason::UnresolvedPlaceholder(_)));

        let mut named = ctx(tmp.path());
        named.app_name = Some("Viewer".into());
        let resolved = validate_entry(&MockBackend::new(), &e, &named).unwrap();
        assert_eq!(resolved.destination, tmp.path().join("pkg/Viewer.icns"));
    }

    #[test]
    fn batch_keeps_valid_entries_and_reports_each_rejection() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("icon.png"));

        let entries = vec![
            entry("icon.png", "out/*", "16x16", TargetFormat::Png, true),
            entry("icon.png", "out/*", "64x64x", TargetFormat::Png, true),
            entry("missing.png", "out/*", "16x16", TargetFormat::Png, true),
            entry("icon.png", "out/*", "32x32", TargetFormat::Png, true),
        ];
        let v = validate(&MockBackend::new(), &entries, &ctx(tmp.path()));

        let dests: Vec<_> = v.resolved.iter().map(|r| r.destination.clone()).collect();
        assert_eq!(
            dests,
            vec![
                tmp.path().join("out/icon-16x16.png"),
                tmp.path().join("out/icon-32x32.png"),
            ]
        );
        assert_eq!(v.rejected.len(), 2);
        assert!(v.rejected.iter().any(|r| r.entry.resolution == "64x64x"
            && matches!(r.reason, RejectReason::InvalidResolution(_))));
        assert!(v.rejected.iter().any(
            |r| r.entry.source == Path::new("missing.png")
                && matches!(r.reason, RejectReason::SourceNotFound(_))
        ));
    }

    #[test]
    fn duplicate_destination_keeps_first_entry() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("a/icon.png"));
        touch(&tmp.path().join("b/icon.png"));

        let entries = vec![
            entry("a/icon.png", "out/*", "16x16", TargetFormat::Png, true),
            entry("b/icon.png", "out/*", "16x16", TargetFormat::Png, true),
        ];
        let v = validate(&MockBackend::new(), &entries, &ctx(tmp.path()));

        assert_eq!(v.resolved.len(), 1);
        assert_eq!(v.resolved[0].source, tmp.path().join("a/icon.png"));
        assert_eq!(v.rejected.len(), 1);
        assert_eq!(
            v.rejected[0].reason,
            RejectReason::DuplicateDestination(tmp.path().join("out/icon-16x16.png"))
        );
    }

    #[test]
    fn dot_segments_do_not_hide_a_duplicate() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("icon.png"));

        let entries = vec![
            entry("icon.png", "out/*", "16x16", TargetFormat::Png, true),
            entry("./icon.png", "x/../out/./*", "16x16", TargetFormat::Png, true),
        ];
        let v = validate(&MockBackend::new(), &entries, &ctx(tmp.path()));

        assert_eq!(v.resolved.len(), 1);
        assert_eq!(
            v.resolved[0].destination,
            tmp.path().join("out/icon-16x16.png")
        );
        assert_eq!(
            v.rejected[0].reason,
            RejectReason::DuplicateDestination(tmp.path().join("out/icon-16x16.png"))
        );
    }

    #[test]
    fn relative_base_dir_yields_absolute_paths() {
        // Tests run from the package root, which holds Cargo.toml.
        let cwd = std::env::current_dir().unwrap();
        let e = entry("Cargo.toml", "out/*", "16x16", TargetFormat::Png, true);
        let resolved =
            validate_entry(&MockBackend::new(), &e, &ValidationContext::new(".")).unwrap();

        assert!(resolved.source.is_absolute());
        assert_eq!(resolved.source, cwd.join("Cargo.toml"));
        assert_eq!(resolved.destination, cwd.join("out/Cargo-16x16.png"));
    }

    #[test]
    fn normalize_folds_dot_segments() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize(Path::new("/a/b/..")), PathBuf::from("/a"));
    }

    #[test]
    fn caller_entries_are_not_mutated() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("icon.png"));
        let entries = vec![entry("icon.png", "out/*", "16x16", TargetFormat::Png, true)];
        let before = entries.clone();

        validate(&MockBackend::new(), &entries, &ctx(tmp.path()));
        assert_eq!(entries, before);
    }

    #[test]
    fn reasons_render_for_humans() {
        let reason = RejectReason::UnresolvedPlaceholder("out/{app_name}.ico".into());
        assert_eq!(
            reason.to_string(),
            "destination out/{app_name}.ico uses {app_name} but no application name is set"
        );
    }
}
