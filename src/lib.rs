//! # imgform
//!
//! Declarative batch image transformation. A list of requests names source
//! images, target sizes, destinations and formats; imgform validates them,
//! works out concrete file names, and resizes and re-encodes each one. A bad
//! request or a failing conversion affects that entry alone, never the batch.
//!
//! # Pipeline
//!
//! ```text
//! transform.toml ──→ EntrySet ──→ validate ──→ ResolvedEntry ──→ execute ──→ files
//!   (config)        (entry)     (validate)      (+ naming)       (process)
//!                                                    │
//!                                                    └──→ is_up_to_date (cache)
//! ```
//!
//! The up-to-date check and the executor consume the same resolved entries,
//! so "would this run write anything" and "what would it write" can't
//! disagree.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`resolution`] | `WIDTHxHEIGHT` parser |
//! | [`naming`] | Destination synthesis: wildcard templates, appended resolutions, `{app_name}` |
//! | [`imaging`] | Codec adapter: sniff, decode, resize, encode (incl. ICNS) |
//! | [`entry`] | Transform entries, scopes and the append-only entry set |
//! | [`request`] | Typed builder producing entries from one source |
//! | [`validate`] | Per-entry validation with non-fatal rejections |
//! | [`process`] | Parallel execution with atomic writes and failure cleanup |
//! | [`cache`] | Existence-based up-to-date oracle |
//! | [`task`] | Build-facing surface and optional packaging host |
//! | [`config`] | `transform.toml` loading and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Sniff, Don't Trust Extensions
//!
//! Sources are identified by their magic bytes. A text file named `icon.png`
//! is rejected at validation instead of failing halfway through a run, and a
//! PNG without an extension still works.
//!
//! ## Exact Sizes
//!
//! Resizing never preserves the aspect ratio: `16x32` means sixteen by
//! thirty-two. Icon pipelines ask for exact slot sizes and a silently
//! letterboxed icon is worse than a stretched one.
//!
//! ## Existence-Only Freshness
//!
//! A batch is up to date when every output exists. No hashing and no
//! timestamps, so the check is cheap enough to run before every build and
//! never reads a source.

pub mod cache;
pub mod config;
pub mod entry;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod process;
pub mod request;
pub mod resolution;
pub mod task;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_helpers;
