// src/scan/polling.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::fs::FileSystem;
use crate::routing::{RouteOutcome, RuleRouter, SkipReason};
use crate::scan::{ScanStats, Scanner};
use crate::session::{Mtime, Session};

/// Scanner that walks the tree through a [`FileSystem`] and compares
/// modification times.
#[derive(Debug)]
pub struct PollingScanner {
    fs: Arc<dyn FileSystem>,
    root: PathBuf,
    router: RuleRouter,
    db_change_advice: String,
}

impl PollingScanner {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        root: impl Into<PathBuf>,
        router: RuleRouter,
        db_change_advice: impl Into<String>,
    ) -> Self {
        Self {
            fs,
            root: root.into(),
            router,
            db_change_advice: db_change_advice.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every file under the root, depth first, each directory sorted.
    /// Symlinked directories are not descended into.
    fn walk(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut stack = vec![self.root.clone()];

        while let Some(dir) = stack.pop() {
            let mut entries = match self.fs.read_dir(&dir) {
                Ok(entries) => entries,
                Err(err) if dir != self.root => {
                    warn!(dir = ?dir, error = %err, "cannot read directory; skipping it");
                    continue;
                }
                Err(err) => {
                    return Err(err).with_context(|| format!("scanning watch root {:?}", self.root));
                }
            };
            entries.sort();

            let mut subdirs = Vec::new();
            for path in entries {
                if self.fs.is_dir(&path) {
                    if self.fs.is_symlink(&path) {
                        debug!(dir = ?path, "not following symlinked directory");
                        continue;
                    }
                    subdirs.push(path);
                } else if self.fs.is_file(&path) {
                    files.push(path);
                }
            }
            // Reverse so the stack pops them in sorted order.
            stack.extend(subdirs.into_iter().rev());
        }

        Ok(files)
    }

    fn stat(&self, rel: &str) -> Mtime {
        self.fs.modified(&self.root.join(rel)).ok()
    }

    /// Route a path seen for the first time and record the outcome.
    fn track_new(&self, session: &mut Session, rel: String, stats: &mut ScanStats) {
        match self.router.route(&rel) {
            RouteOutcome::Skipped(reason) => {
                match &reason {
                    SkipReason::DbChange => {
                        println!("DB File:\t{rel} {}", self.db_change_advice);
                    }
                    SkipReason::RoutingFailure { template } => {
                        println!("Routing failure:\t{rel} ({template})");
                    }
                    _ => {}
                }
                debug!(path = %rel, ?reason, "skipping file");
                if reason.is_reported() {
                    session.skipped.push(rel.clone());
                }
                session.watch.skip(rel, reason);
                stats.newly_skipped += 1;
            }
            RouteOutcome::Unmapped => {
                println!("Missing test mapping:\t{rel}");
                let mtime = self.stat(&rel);
                session.unmapped.push(rel.clone());
                session.watch.track(rel, mtime, Vec::new());
                stats.unmapped += 1;
            }
            RouteOutcome::Derived(targets) => {
                info!(path = %rel, tests = ?targets, "tracking");
                session.dirty.mark_dirty(&targets);
                let mtime = self.stat(&rel);
                session.watch.track(rel, mtime, targets);
                stats.newly_tracked += 1;
            }
        }
    }

    fn check_tracked(&self, session: &mut Session, rel: &str, stats: &mut ScanStats) {
        let observed = self.stat(rel);
        if let Some(targets) = session.watch.observe(rel, observed) {
            println!("File updated:\t{rel}");
            session.dirty.mark_dirty(&targets);
            stats.updated += 1;
        }
    }
}

impl Scanner for PollingScanner {
    fn full_scan(&mut self, session: &mut Session) -> Result<ScanStats> {
        let mut stats = ScanStats::default();

        for path in self.walk()? {
            let Some(rel) = relative_str(&self.root, &path) else {
                warn!(path = ?path, root = ?self.root, "could not relativize path");
                continue;
            };
            stats.visited += 1;

            if !session.watch.is_known(&rel) {
                self.track_new(session, rel, &mut stats);
            } else if session.watch.is_tracked(&rel) {
                self.check_tracked(session, &rel, &mut stats);
            }
        }

        debug!(?stats, "full scan finished");
        Ok(stats)
    }

    fn targeted_check(&mut self, session: &mut Session) -> ScanStats {
        let mut stats = ScanStats::default();
        for rel in session.watch.tracked_paths() {
            stats.visited += 1;
            self.check_tracked(session, &rel, &mut stats);
        }
        stats
    }
}

/// Convert a path into a string relative to `root`, with forward slashes.
fn relative_str(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    Some(rel.to_string_lossy().replace('\\', "/"))
}
