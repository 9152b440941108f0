// src/engine/mod.rs

//! Main loop of warmrun.
//!
//! The pure interrupt state machine lives in [`escalation`] and the scan
//! cadence in [`schedule`]; the async shell that drives scanner, supervisor
//! and runner is [`main_loop`].

pub mod escalation;
pub mod main_loop;
pub mod schedule;

use std::time::Duration;

pub use escalation::{Escalation, LoopEvent, LoopState};
pub use main_loop::MainLoop;
pub use schedule::{ScanMode, ScanSchedule};

use crate::config::ConfigFile;
use crate::session::Session;

/// A user interrupt (Ctrl+C) forwarded to the main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interrupt;

/// Timings and switches for the main loop.
#[derive(Debug, Clone, Copy)]
pub struct LoopOptions {
    pub full_scan_every: u32,
    pub tick_interval: Duration,
    pub worker_warmup: Duration,
    pub force_scan_window: Duration,
    pub force_scan_interval: Duration,
    /// List skipped/unmapped/missing paths in the final summary.
    pub verbose: bool,
}

impl LoopOptions {
    pub fn from_config(cfg: &ConfigFile, verbose: bool) -> Self {
        Self {
            full_scan_every: cfg.full_scan_every,
            tick_interval: cfg.timing.tick_interval,
            worker_warmup: cfg.timing.worker_warmup,
            force_scan_window: cfg.timing.force_scan_window,
            force_scan_interval: cfg.timing.force_scan_interval,
            verbose,
        }
    }
}

/// What a finished session looked like.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub tracked: usize,
    pub registered_tests: usize,
    pub batches: u64,
    pub worker_starts: u64,
    pub worker_crashes: u64,
    pub skipped: Vec<String>,
    pub unmapped: Vec<String>,
    pub missing_tests: Vec<String>,
}

impl Summary {
    pub(crate) fn from_session(session: &Session) -> Self {
        Self {
            tracked: session.watch.tracked_count(),
            registered_tests: session.dirty.len(),
            skipped: session.skipped.clone(),
            unmapped: session.unmapped.clone(),
            missing_tests: session.missing_tests.iter().cloned().collect(),
            ..Self::default()
        }
    }
}
