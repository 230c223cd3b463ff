//! Execution engine: load, resize, encode, write.
//!
//! Each resolved entry walks a small state machine:
//!
//! ```text
//! Pending → Loading → Resizing → Encoding → Written
//!    │          │          │          │
//!    └──────────┴──────────┴──────────┴──→ Failed { stage, reason }
//!    │
//!    └──→ Skipped   (dry run only)
//! ```
//!
//! | Stage | Work |
//! |---|---|
//! | Pending | create the destination's parent directories |
//! | Loading | decode the source raster |
//! | Resizing | fit the pixel layout to the target, resize to exact size |
//! | Encoding | encode in memory, write through a temp file, rename over the destination |
//!
//! Entries are independent and run in parallel with rayon; validation has
//! already made destinations unique, so no two workers share an output.
//! A failure never aborts the batch. If the destination did not exist before
//! the attempt, nothing is left at that path afterwards.
//!
//! Progress is reported as [`TransformEvent`]s over an optional channel; the
//! CLI renders them with [`crate::output::format_transform_event`].

use crate::entry::{ResolvedEntry, TransformEntry};
use crate::imaging::{BackendError, ImageBackend, fit_layout};
use crate::validate::RejectReason;
use rayon::prelude::*;
use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::debug;

/// Prefix of in-flight temp files next to their destination.
const TEMP_PREFIX: &str = ".imgform-";
const TEMP_SUFFIX: &str = ".part";

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("IO failure: {0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Backend(#[from] BackendError),
}

/// Execution stage of one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Pending,
    Loading,
    Resizing,
    Encoding,
    Written,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Pending => "pending",
            Stage::Loading => "loading",
            Stage::Resizing => "resizing",
            Stage::Encoding => "encoding",
            Stage::Written => "written",
        };
        f.write_str(name)
    }
}

/// Terminal state of one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Written { path: PathBuf },
    Failed { stage: Stage, reason: String },
    /// Dry run: nothing was touched.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub entry: ResolvedEntry,
    pub status: Status,
}

impl Outcome {
    pub fn is_failed(&self) -> bool {
        matches!(self.status, Status::Failed { .. })
    }
}

/// Progress events emitted while a batch is validated and executed.
#[derive(Debug, Clone)]
pub enum TransformEvent {
    /// Excluded by validation; never reaches execution.
    Rejected {
        entry: TransformEntry,
        reason: RejectReason,
    },
    /// Dry run: what would be written.
    Preview(ResolvedEntry),
    Written {
        entry: ResolvedEntry,
    },
    Failed {
        entry: ResolvedEntry,
        stage: Stage,
        reason: String,
    },
}

/// Execute resolved entries.
///
/// Outcomes are returned in input order. With `dry_run` set, no file or
/// directory is created and every entry comes back [`Status::Skipped`].
pub fn execute(
    backend: &impl ImageBackend,
    entries: &[ResolvedEntry],
    dry_run: bool,
    events: Option<Sender<TransformEvent>>,
) -> Vec<Outcome> {
    if dry_run {
        return entries
            .iter()
            .map(|entry| {
                if let Some(tx) = &events {
                    tx.send(TransformEvent::Preview(entry.clone())).ok();
                }
                Outcome {
                    entry: entry.clone(),
                    status: Status::Skipped,
                }
            })
            .collect();
    }

    entries
        .par_iter()
        .map(|entry| {
            let status = match transform_entry(backend, entry) {
                Ok(()) => Status::Written {
                    path: entry.destination.clone(),
                },
                Err((stage, err)) => Status::Failed {
                    stage,
                    reason: err.to_string(),
                },
            };
            if let Some(tx) = &events {
                let event = match &status {
                    Status::Failed { stage, reason } => TransformEvent::Failed {
                        entry: entry.clone(),
                        stage: *stage,
                        reason: reason.clone(),
                    },
                    _ => TransformEvent::Written {
                        entry: entry.clone(),
                    },
                };
                tx.send(event).ok();
            }
            Outcome {
                entry: entry.clone(),
                status,
            }
        })
        .collect()
}

/// Run one entry to completion, cleaning up on failure.
fn transform_entry(
    backend: &impl ImageBackend,
    entry: &ResolvedEntry,
) -> Result<(), (Stage, TransformError)> {
    let existed_before = entry.destination.exists();
    let result = run_stages(backend, entry);
    if let Err((stage, err)) = &result {
        debug!(
            destination = %entry.destination.display(),
            %stage,
            error = %err,
            "entry failed"
        );
        if !existed_before && entry.destination.exists() {
            std::fs::remove_file(&entry.destination).ok();
        }
    }
    result
}

fn run_stages(
    backend: &impl ImageBackend,
    entry: &ResolvedEntry,
) -> Result<(), (Stage, TransformError)> {
    let fail = |stage: Stage| move |e: BackendError| (stage, TransformError::from(e));

    if let Some(parent) = entry.destination.parent() {
        std::fs::create_dir_all(parent).map_err(|e| (Stage::Pending, TransformError::from(e)))?;
    }

    let source = backend.decode(&entry.source).map_err(fail(Stage::Loading))?;

    let raster = backend
        .resize(&fit_layout(source, entry.format), entry.width, entry.height)
        .map_err(fail(Stage::Resizing))?;

    let bytes = backend
        .encode(&raster, entry.format)
        .map_err(fail(Stage::Encoding))?;
    write_atomic(&entry.destination, &bytes)
        .map_err(|e| (Stage::Encoding, TransformError::from(e)))?;

    debug!(destination = %entry.destination.display(), "written");
    Ok(())
}

/// Write `bytes` to a temp file beside `dest`, then rename it into place.
fn write_atomic(dest: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(TEMP_SUFFIX)
        .tempfile_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(dest).map_err(|e| e.error)?;
    Ok(())
}

/// Summary of one batch run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchStats {
    pub written: u32,
    pub failed: u32,
    pub skipped: u32,
    pub rejected: u32,
}

impl BatchStats {
    pub fn from_outcomes(outcomes: &[Outcome], rejected: usize) -> Self {
        let mut stats = Self {
            rejected: rejected as u32,
            ..Self::default()
        };
        for outcome in outcomes {
            match outcome.status {
                Status::Written { .. } => stats.written += 1,
                Status::Failed { .. } => stats.failed += 1,
                Status::Skipped => stats.skipped += 1,
            }
        }
        stats
    }

    pub fn total(&self) -> u32 {
        self.written + self.failed + self.skipped + self.rejected
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.rejected == 0
    }
}

impl fmt::Display for BatchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.skipped > 0 {
            write!(f, "{} previewed", self.skipped)?;
        } else {
            write!(f, "{} written", self.written)?;
        }
        if self.failed > 0 {
            write!(f, ", {} failed", self.failed)?;
        }
        if self.rejected > 0 {
            write!(f, ", {} rejected", self.rejected)?;
        }
        if self.failed > 0 || self.rejected > 0 {
            write!(f, " ({} total)", self.total())?;
        }
        Ok(())
    }
}
