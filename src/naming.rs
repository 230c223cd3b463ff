//! Destination file naming.
//!
//! A destination is either a **wildcard template** (`out/icons/*`) whose file
//! name is derived from the source, or an **explicit path**
//! (`out/logo-small.ico`). The append-resolution policy decides whether the
//! resolution is spliced into the name, so one source can fan out into many
//! sizes inside one directory without collisions:
//!
//! | Template | Source | Append | Result |
//! |---|---|---|---|
//! | `out/*` | `icon.png` | yes | `out/icon-16x16.png` |
//! | `out/*` | `icon.png` | no | `out/icon.png` |
//! | `out/*` | `LICENSE` | yes | `out/LICENSE-16x16` |
//! | `out/app.ico` | `icon.png` | yes | `out/app-16x16.ico` |
//! | `out/app.ico` | `icon.png` | no | `out/app.ico` (passthrough) |
//!
//! Derived names always use the target format's lowercase extension. An
//! explicit destination without the append policy is used verbatim, even
//! when its extension disagrees with the format or it has none at all.
//!
//! Templates may also contain the `{app_name}` placeholder, expanded by
//! [`expand_placeholders`] before naming.

use crate::imaging::TargetFormat;
use std::path::{Path, PathBuf};

/// File-name component that requests a name derived from the source.
pub const WILDCARD: &str = "*";

/// Placeholder replaced with the application name.
pub const APP_NAME_PLACEHOLDER: &str = "{app_name}";

/// Default delimiter between a file stem and its resolution.
pub const DEFAULT_DELIMITER: &str = "-";

/// Compute the concrete destination path for one entry.
///
/// Pure and deterministic: the same inputs always give the same path.
pub fn resolve_destination(
    source: &Path,
    template: &Path,
    resolution: &str,
    format: TargetFormat,
    append_resolution: bool,
    delimiter: &str,
) -> PathBuf {
    let parent = template.parent().unwrap_or(Path::new(""));
    let ext = format.extension();

    match template.file_name() {
        Some(name) if name == WILDCARD => {
            let source_name = source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let file_name = match split_extension(&source_name) {
                (stem, None) if append_resolution => format!("{stem}{delimiter}{resolution}"),
                (stem, None) => stem.to_string(),
                (stem, Some(_)) if append_resolution => {
                    format!("{stem}{delimiter}{resolution}.{ext}")
                }
                (stem, Some(_)) => format!("{stem}.{ext}"),
            };
            parent.join(file_name)
        }
        Some(name) if append_resolution => {
            let name = name.to_string_lossy();
            let (stem, _) = split_extension(&name);
            parent.join(format!("{stem}{delimiter}{resolution}.{ext}"))
        }
        _ => template.to_path_buf(),
    }
}

/// Split `name` at its last dot into stem and extension.
///
/// A leading dot (`.hidden`) is part of the stem, not an extension separator.
fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(pos) if pos > 0 => (&name[..pos], Some(&name[pos + 1..])),
        _ => (name, None),
    }
}

/// Whether a destination template references `{app_name}`.
pub fn uses_app_name(template: &Path) -> bool {
    template.to_string_lossy().contains(APP_NAME_PLACEHOLDER)
}

/// Replace `{app_name}` in a destination template.
///
/// Returns `None` when the template needs an application name and none is
/// available. Templates without the placeholder pass through unchanged.
pub fn expand_placeholders(template: &Path, app_name: Option<&str>) -> Option<PathBuf> {
    if !uses_app_name(template) {
        return Some(template.to_path_buf());
    }
    let app_name = app_name.map(str::trim).filter(|n| !n.is_empty())?;
    Some(PathBuf::from(
        template
            .to_string_lossy()
            .replace(APP_NAME_PLACEHOLDER, app_name),
    ))
}
