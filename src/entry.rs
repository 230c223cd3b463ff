//! Transform entries: the unit of work.
//!
//! A [`TransformEntry`] is a plain value describing one requested
//! conversion, exactly as the configuration surface produced it: paths may be
//! relative, the destination may be a wildcard template, and the resolution
//! is an unparsed string. Validation never mutates an entry; it produces a
//! separate [`ResolvedEntry`] with absolute paths and parsed dimensions.
//!
//! Entries are grouped by [`Scope`]. The global scope is shared by every run,
//! the task scope belongs to a single run. Scopes are collected into an
//! append-only [`EntrySet`] and frozen into an immutable [`EntrySnapshot`]
//! before anything is validated.

use crate::imaging::TargetFormat;
use crate::resolution::Resolution;
use std::path::PathBuf;

/// One requested source → destination conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformEntry {
    /// Absolute, or relative to the task's base directory.
    pub source: PathBuf,
    /// Destination path; a final component of `*` derives the file name
    /// from the source.
    pub destination: PathBuf,
    /// Raw `WIDTHxHEIGHT` string.
    pub resolution: String,
    pub format: TargetFormat,
    /// Insert `<delimiter><resolution>` before the extension.
    pub append_resolution: bool,
}

/// An entry that passed validation: absolute paths, parsed resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedEntry {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub width: u32,
    pub height: u32,
    pub format: TargetFormat,
}

impl ResolvedEntry {
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }
}

/// Which collection an entry was registered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Shared entries, included in task runs unless the policy excludes them.
    Global,
    /// Entries specific to one task run.
    Task,
}

/// Append-only collection of entries per scope.
#[derive(Debug, Default)]
pub struct EntrySet {
    global: Vec<TransformEntry>,
    task: Vec<TransformEntry>,
}

impl EntrySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, scope: Scope, entry: TransformEntry) -> &mut Self {
        self.scope_mut(scope).push(entry);
        self
    }

    pub fn extend(
        &mut self,
        scope: Scope,
        entries: impl IntoIterator<Item = TransformEntry>,
    ) -> &mut Self {
        self.scope_mut(scope).extend(entries);
        self
    }

    fn scope_mut(&mut self, scope: Scope) -> &mut Vec<TransformEntry> {
        match scope {
            Scope::Global => &mut self.global,
            Scope::Task => &mut self.task,
        }
    }

    /// Consume the builder into an immutable snapshot.
    pub fn freeze(self) -> EntrySnapshot {
        EntrySnapshot {
            global: self.global,
            task: self.task,
        }
    }
}

/// Immutable view of every registered entry.
#[derive(Debug, Clone, Default)]
pub struct EntrySnapshot {
    global: Vec<TransformEntry>,
    task: Vec<TransformEntry>,
}

impl EntrySnapshot {
    /// Entries registered directly in `scope`.
    pub fn scope(&self, scope: Scope) -> &[TransformEntry] {
        match scope {
            Scope::Global => &self.global,
            Scope::Task => &self.task,
        }
    }

    /// Entries a run over `scope` processes.
    ///
    /// A task run merges the global entries in front of its own when
    /// `include_global` is set. A global run only ever sees global entries.
    pub fn select(&self, scope: Scope, include_global: bool) -> Vec<TransformEntry> {
        match scope {
            Scope::Global => self.global.clone(),
            Scope::Task if include_global => {
                self.global.iter().chain(&self.task).cloned().collect()
            }
            Scope::Task => self.task.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.global.len() + self.task.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(source: &str) -> TransformEntry {
        TransformEntry {
            source: source.into(),
            destination: "out/*".into(),
            resolution: "16x16".into(),
            format: TargetFormat::Png,
            append_resolution: true,
        }
    }

    #[test]
    fn scopes_are_kept_apart() {
        let mut set = EntrySet::new();
        set.push(Scope::Global, entry("a.png"))
            .push(Scope::Task, entry("b.png"));
        let snap = set.freeze();

        assert_eq!(snap.scope(Scope::Global), &[entry("a.png")]);
        assert_eq!(snap.scope(Scope::Task), &[entry("b.png")]);
        assert_eq!(snap.len(), 2);
    }

    #[test]
    fn task_selection_merges_global_first() {
        let mut set = EntrySet::new();
        set.extend(Scope::Task, [entry("t1.png"), entry("t2.png")]);
        set.push(Scope::Global, entry("g.png"));
        let snap = set.freeze();

        let sources: Vec<_> = snap
            .select(Scope::Task, true)
            .into_iter()
            .map(|e| e.source)
            .collect();
        assert_eq!(
            sources,
            vec![
                PathBuf::from("g.png"),
                PathBuf::from("t1.png"),
                PathBuf::from("t2.png")
            ]
        );
    }

    #[test]
    fn task_selection_can_exclude_global() {
        let mut set = EntrySet::new();
        set.push(Scope::Global, entry("g.png"));
        set.push(Scope::Task, entry("t.png"));
        let snap = set.freeze();

        assert_eq!(snap.select(Scope::Task, false), vec![entry("t.png")]);
    }

    #[test]
    fn global_selection_ignores_task_entries() {
        let mut set = EntrySet::new();
        set.push(Scope::Global, entry("g.png"));
        set.push(Scope::Task, entry("t.png"));
        let snap = set.freeze();

        assert_eq!(snap.select(Scope::Global, false), vec![entry("g.png")]);
        assert_eq!(snap.select(Scope::Global, true), vec![entry("g.png")]);
    }

    #[test]
    fn empty_snapshot() {
        assert!(EntrySet::new().freeze().is_empty());
    }
}
