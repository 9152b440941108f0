// src/scan/mod.rs

//! Change detection by polling.
//!
//! [`Scanner`] is the seam between change detection and everything
//! downstream: the main loop only asks for a full scan or a targeted check,
//! and never sees how changes are found.

pub mod polling;

pub use polling::PollingScanner;

use anyhow::Result;

use crate::session::Session;

/// Counters from one scan, used for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Files visited (full scan) or tracked files re-stat'ed (targeted).
    pub visited: usize,
    pub newly_tracked: usize,
    pub newly_skipped: usize,
    pub unmapped: usize,
    pub updated: usize,
}

pub trait Scanner {
    /// Walk the whole tree: route new paths, re-check tracked ones.
    fn full_scan(&mut self, session: &mut Session) -> Result<ScanStats>;

    /// Re-stat only the already tracked paths.
    fn targeted_check(&mut self, session: &mut Session) -> ScanStats;
}
