//! CLI output formatting.
//!
//! Every formatter is a pure function returning display lines; the `print_*`
//! wrappers only write them to stdout. Paths are shown relative to the base
//! directory when they live under it.
//!
//! # Output Format
//!
//! ## Run
//!
//! ```text
//! wrote out/icon-16x16.png (16x16 PNG)
//!     Source: icons/icon.png
//! failed out/app.icns (100x100 ICNS)
//!     Source: icons/icon.png
//!     Encoding: encode failed: ICNS has no icon slot for 100x100 (...)
//! rejected icons/missing.png → out/*
//!     Reason: source not found: /project/icons/missing.png
//! ```
//!
//! ## Dry run
//!
//! ```text
//! would write out/icon-16x16.png (16x16 PNG)
//!     Source: icons/icon.png
//! ```
//!
//! ## Status
//!
//! ```text
//! 1 of 3 outputs missing
//!     out/icon-48x48.png
//! ```

use crate::entry::ResolvedEntry;
use crate::process::TransformEvent;
use crate::validate::Rejection;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Show `path` relative to `base` when it is inside it.
fn display_path(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn entry_header(verb: &str, entry: &ResolvedEntry, base: &Path) -> String {
    format!(
        "{} {} ({} {})",
        verb,
        display_path(&entry.destination, base),
        entry.resolution(),
        entry.format
    )
}

fn source_line(source: &Path, base: &Path) -> String {
    format!("    Source: {}", display_path(source, base))
}

/// Format one progress event as display lines.
pub fn format_transform_event(event: &TransformEvent, base: &Path) -> Vec<String> {
    match event {
        TransformEvent::Rejected { entry, reason } => vec![
            format!(
                "rejected {} \u{2192} {}",
                display_path(&entry.source, base),
                entry.destination.display()
            ),
            format!("    Reason: {}", reason),
        ],
        TransformEvent::Preview(entry) => vec![
            entry_header("would write", entry, base),
            source_line(&entry.source, base),
        ],
        TransformEvent::Written { entry } => vec![
            entry_header("wrote", entry, base),
            source_line(&entry.source, base),
        ],
        TransformEvent::Failed {
            entry,
            stage,
            reason,
        } => {
            let mut label = stage.to_string();
            if let Some(first) = label.get_mut(0..1) {
                first.make_ascii_uppercase();
            }
            vec![
                entry_header("failed", entry, base),
                source_line(&entry.source, base),
                format!("    {}: {}", label, reason),
            ]
        }
    }
}

/// Format the rejections of a validation pass.
pub fn format_rejections(rejections: &[Rejection], base: &Path) -> Vec<String> {
    rejections
        .iter()
        .flat_map(|r| {
            format_transform_event(
                &TransformEvent::Rejected {
                    entry: r.entry.clone(),
                    reason: r.reason.clone(),
                },
                base,
            )
        })
        .collect()
}

/// Format the output listing, one path per line.
pub fn format_outputs(outputs: &BTreeSet<PathBuf>, base: &Path) -> Vec<String> {
    outputs.iter().map(|p| display_path(p, base)).collect()
}

/// Format the up-to-date status of a batch.
pub fn format_status(total: usize, missing: &BTreeSet<PathBuf>, base: &Path) -> Vec<String> {
    if missing.is_empty() {
        return vec![format!("Up to date ({} outputs)", total)];
    }
    let mut lines = vec![format!("{} of {} outputs missing", missing.len(), total)];
    lines.extend(missing.iter().map(|p| format!("    {}", display_path(p, base))));
    lines
}

/// Format a run skipped because every valid output exists. Rejections are
/// still reported; they never count against freshness.
pub fn format_up_to_date(total: usize, rejections: &[Rejection], base: &Path) -> Vec<String> {
    let mut lines = format_rejections(rejections, base);
    lines.extend(format_status(total, &BTreeSet::new(), base));
    lines
}

pub fn print_rejections(rejections: &[Rejection], base: &Path) {
    for line in format_rejections(rejections, base) {
        println!("{}", line);
    }
}

pub fn print_outputs(outputs: &BTreeSet<PathBuf>, base: &Path) {
    for line in format_outputs(outputs, base) {
        println!("{}", line);
    }
}

pub fn print_up_to_date(total: usize, rejections: &[Rejection], base: &Path) {
    for line in format_up_to_date(total, rejections, base) {
        println!("{}", line);
    }
}

pub fn print_status(total: usize, missing: &BTreeSet<PathBuf>, base: &Path) {
    for line in format_status(total, missing, base) {
        println!("{}", line);
    }
}
