// src/session/watch_state.rs

use std::collections::BTreeMap;
use std::time::SystemTime;

use crate::routing::{DirtyTarget, SkipReason};

/// Modification time as seen by a scan. `None` means the file was missing,
/// which compares like "time zero".
pub type Mtime = Option<SystemTime>;

/// Per-path record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEntry {
    /// Resolved once and never looked at again.
    Skipped(SkipReason),
    /// Routed; `derived` is empty for files with no rule mapping.
    Tracked { mtime: Mtime, derived: Vec<DirtyTarget> },
}

/// All paths seen so far, keyed by root-relative path. A path absent from
/// the map is untracked.
#[derive(Debug, Default)]
pub struct WatchState {
    entries: BTreeMap<String, WatchEntry>,
}

impl WatchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&WatchEntry> {
        self.entries.get(path)
    }

    pub fn is_known(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn is_tracked(&self, path: &str) -> bool {
        matches!(self.entries.get(path), Some(WatchEntry::Tracked { .. }))
    }

    pub fn track(&mut self, path: impl Into<String>, mtime: Mtime, derived: Vec<DirtyTarget>) {
        self.entries
            .insert(path.into(), WatchEntry::Tracked { mtime, derived });
    }

    pub fn skip(&mut self, path: impl Into<String>, reason: SkipReason) {
        self.entries.insert(path.into(), WatchEntry::Skipped(reason));
    }

    /// Record a freshly observed mtime for a tracked path.
    ///
    /// Returns the derived targets to mark dirty if the time changed, `None`
    /// if unchanged or the path is not tracked.
    pub fn observe(&mut self, path: &str, observed: Mtime) -> Option<Vec<DirtyTarget>> {
        match self.entries.get_mut(path) {
            Some(WatchEntry::Tracked { mtime, derived }) if *mtime != observed => {
                *mtime = observed;
                Some(derived.clone())
            }
            _ => None,
        }
    }

    /// Paths currently in the `Tracked` state.
    pub fn tracked_paths(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, e)| matches!(e, WatchEntry::Tracked { .. }))
            .map(|(p, _)| p.clone())
            .collect()
    }

    pub fn tracked_count(&self) -> usize {
        self.entries
            .values()
            .filter(|e| matches!(e, WatchEntry::Tracked { .. }))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.entries.len() - self.tracked_count()
    }
}
