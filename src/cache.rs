//! Up-to-date oracle for incremental builds.
//!
//! A batch is up to date when every destination it would write already
//! exists. That is the whole rule: no content hashes, no modification times,
//! and sources are never opened. A changed source with an existing output is
//! therefore *not* rebuilt; callers that need a rebuild pass `--force` or
//! delete the output.
//!
//! The oracle consumes the same resolved entries as the execution engine, so
//! it sees exactly the paths a run would produce. Rejected entries produce no
//! output and are ignored.

use crate::entry::ResolvedEntry;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Whether every destination already exists. An empty batch is up to date.
pub fn is_up_to_date(entries: &[ResolvedEntry]) -> bool {
    entries.par_iter().all(|e| e.destination.exists())
}

/// Every destination the batch would write, sorted and deduplicated.
pub fn output_paths(entries: &[ResolvedEntry]) -> BTreeSet<PathBuf> {
    entries.iter().map(|e| e.destination.clone()).collect()
}

/// Destinations that do not exist yet, sorted.
pub fn missing_outputs(entries: &[ResolvedEntry]) -> BTreeSet<PathBuf> {
    entries
        .iter()
        .filter(|e| !e.destination.exists())
        .map(|e| e.destination.clone())
        .collect()
}
