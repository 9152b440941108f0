// src/session/mod.rs

//! Mutable state of one watch session.
//!
//! [`Session`] bundles the watch table, the dirty registry and the report
//! lists. It is owned by the main loop and lent out by `&mut` to the scanner
//! and the test runner; nothing else holds on to it.

pub mod dirty;
pub mod watch_state;

pub use dirty::DirtyRegistry;
pub use watch_state::{Mtime, WatchEntry, WatchState};

use std::collections::BTreeSet;

use crate::routing::TestTypes;

#[derive(Debug)]
pub struct Session {
    pub watch: WatchState,
    pub dirty: DirtyRegistry,
    /// Skipped paths worth reporting (excluded directories are left out).
    pub skipped: Vec<String>,
    /// Eligible paths that no rule matched.
    pub unmapped: Vec<String>,
    /// Derived test paths that were missing on disk when a batch was built.
    pub missing_tests: BTreeSet<String>,
}

impl Session {
    pub fn new(types: TestTypes) -> Self {
        Self {
            watch: WatchState::new(),
            dirty: DirtyRegistry::new(types),
            skipped: Vec::new(),
            unmapped: Vec::new(),
            missing_tests: BTreeSet::new(),
        }
    }
}
