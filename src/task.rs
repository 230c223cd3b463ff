//! The transform task: entries, settings and a backend bound together.
//!
//! [`TransformTask`] is what a build driver talks to. It owns a frozen
//! [`EntrySnapshot`] and answers four questions about a scope:
//!
//! - [`resolved_entries`](TransformTask::resolved_entries): what would run
//! - [`output_paths`](TransformTask::output_paths): what would be written
//! - [`is_up_to_date`](TransformTask::is_up_to_date): can the run be skipped
//! - [`execute`](TransformTask::execute): run it
//!
//! Each call validates afresh, so a source created between two calls is
//! picked up by the second.
//!
//! ## Packaging hosts
//!
//! A build may embed the task in a larger packaging step that knows the
//! application's name and wants to run the transform as a dependency. That
//! host is optional; [`TransformTask::bind_host`] takes `None` when there is
//! none. `no_auto_binding` keeps the name lookup but skips the dependency
//! registration.

use crate::cache;
use crate::config::TransformConfig;
use crate::entry::{EntrySnapshot, ResolvedEntry, Scope, TransformEntry};
use crate::imaging::{ImageBackend, RustBackend};
use crate::naming::DEFAULT_DELIMITER;
use crate::process::{self, BatchStats, Outcome, TransformEvent};
use crate::validate::{self, Rejection, Validation, ValidationContext};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use tracing::debug;

/// Name the task registers under with a packaging host.
pub const TASK_NAME: &str = "transformImages";

/// Optional capability of the surrounding build.
pub trait PackagingHost {
    /// Application name, if the host knows one.
    fn app_name(&self) -> Option<String>;

    /// Make the host's packaging step depend on `task`.
    fn add_dependency(&mut self, task: &str);
}

/// Settings shared by every run of a task.
#[derive(Debug, Clone)]
pub struct TaskSettings {
    pub base_dir: PathBuf,
    pub delimiter: String,
    /// Task-scope runs also process global entries, before their own.
    pub include_global: bool,
    pub app_name: Option<String>,
    pub no_auto_binding: bool,
}

impl TaskSettings {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            delimiter: DEFAULT_DELIMITER.to_string(),
            include_global: true,
            app_name: None,
            no_auto_binding: false,
        }
    }

    pub fn from_config(config: &TransformConfig, base_dir: &Path) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
            delimiter: config.resolution_delimiter.clone(),
            include_global: config.include_global,
            app_name: config.app_name.clone(),
            no_auto_binding: config.no_auto_binding,
        }
    }

    /// The application name, treating a blank one as unset.
    fn named_app(&self) -> Option<&str> {
        self.app_name.as_deref().filter(|name| !name.trim().is_empty())
    }

    fn validation_context(&self) -> ValidationContext {
        ValidationContext {
            base_dir: self.base_dir.clone(),
            delimiter: self.delimiter.clone(),
            app_name: self.named_app().map(str::to_string),
        }
    }
}

/// Result of [`TransformTask::execute`].
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub rejected: Vec<Rejection>,
    pub outcomes: Vec<Outcome>,
}

impl Report {
    pub fn stats(&self) -> BatchStats {
        BatchStats::from_outcomes(&self.outcomes, self.rejected.len())
    }

    /// No entry was rejected and none failed.
    pub fn is_success(&self) -> bool {
        self.stats().is_success()
    }
}

pub struct TransformTask<B: ImageBackend = RustBackend> {
    settings: TaskSettings,
    entries: EntrySnapshot,
    backend: B,
}

impl TransformTask<RustBackend> {
    pub fn new(settings: TaskSettings, entries: EntrySnapshot) -> Self {
        Self::with_backend(settings, entries, RustBackend::new())
    }
}

impl<B: ImageBackend> TransformTask<B> {
    pub fn with_backend(settings: TaskSettings, entries: EntrySnapshot, backend: B) -> Self {
        Self {
            settings,
            entries,
            backend,
        }
    }

    pub fn settings(&self) -> &TaskSettings {
        &self.settings
    }

    /// Attach to an optional packaging host.
    ///
    /// Takes the host's application name unless a non-blank one is
    /// configured, and
    /// registers [`TASK_NAME`] as a dependency unless `no_auto_binding` is
    /// set. Returns whether the dependency was registered.
    pub fn bind_host(&mut self, host: Option<&mut dyn PackagingHost>) -> bool {
        let Some(host) = host else {
            return false;
        };
        if self.settings.named_app().is_none() {
            self.settings.app_name = host.app_name();
        }
        if self.settings.no_auto_binding {
            debug!("auto binding disabled, not registering with host");
            return false;
        }
        host.add_dependency(TASK_NAME);
        true
    }

    /// Raw entries a run over `scope` processes, in order.
    pub fn entries(&self, scope: Scope) -> Vec<TransformEntry> {
        self.entries.select(scope, self.settings.include_global)
    }

    pub fn validate(&self, scope: Scope) -> Validation {
        validate::validate(
            &self.backend,
            &self.entries(scope),
            &self.settings.validation_context(),
        )
    }

    /// Entries that would execute, with concrete destinations.
    pub fn resolved_entries(&self, scope: Scope) -> Vec<ResolvedEntry> {
        self.validate(scope).resolved
    }

    pub fn output_paths(&self, scope: Scope) -> BTreeSet<PathBuf> {
        cache::output_paths(&self.resolved_entries(scope))
    }

    /// Whether every output of `scope` already exists.
    pub fn is_up_to_date(&self, scope: Scope) -> bool {
        cache::is_up_to_date(&self.resolved_entries(scope))
    }

    /// Validate and execute `scope`.
    ///
    /// Rejections are reported as [`TransformEvent::Rejected`] before any
    /// entry runs.
    pub fn execute(
        &self,
        scope: Scope,
        dry_run: bool,
        events: Option<Sender<TransformEvent>>,
    ) -> Report {
        self.execute_validated(self.validate(scope), dry_run, events)
    }

    /// Execute an already validated batch.
    pub fn execute_validated(
        &self,
        validation: Validation,
        dry_run: bool,
        events: Option<Sender<TransformEvent>>,
    ) -> Report {
        if let Some(tx) = &events {
            for rejection in &validation.rejected {
                tx.send(TransformEvent::Rejected {
                    entry: rejection.entry.clone(),
                    reason: rejection.reason.clone(),
                })
                .ok();
            }
        }
        let outcomes = process::execute(&self.backend, &validation.resolved, dry_run, events);
        Report {
            rejected: validation.rejected,
            outcomes,
        }
    }
}
