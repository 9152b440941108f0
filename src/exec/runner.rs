// src/exec/runner.rs

use std::path::PathBuf;
use std::sync::Arc;

use regex::Regex;
use tracing::{error, warn};

use crate::fs::FileSystem;
use crate::session::Session;

use super::batch::BatchExecutor;

/// Outcome of one pass over the dirty registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Tests that existed on disk and went into the batch, sorted.
    pub submitted: Vec<String>,
    /// Dirty tests with no file on disk; never submitted.
    pub missing: Vec<String>,
    /// Batch output with noise removed (unless running with full trace).
    pub lines: Vec<String>,
    /// Set when the batch command itself could not be run.
    pub failure: Option<String>,
}

/// Builds a batch from the dirty registry and submits it.
#[derive(Debug)]
pub struct TestRunner {
    fs: Arc<dyn FileSystem>,
    root: PathBuf,
    noise: Vec<Regex>,
    full_trace: bool,
}

impl TestRunner {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        root: impl Into<PathBuf>,
        noise: Vec<Regex>,
        full_trace: bool,
    ) -> Self {
        Self {
            fs,
            root: root.into(),
            noise,
            full_trace,
        }
    }

    /// Submit every dirty test that exists on disk as one batch.
    ///
    /// Returns `None` when nothing was dirty. Every dirty flag is cleared,
    /// including those of missing tests, which are recorded on the session
    /// (once per path) instead. A failing batch is reported, not retried.
    pub async fn run_dirty<B>(&self, session: &mut Session, executor: &mut B) -> Option<BatchReport>
    where
        B: BatchExecutor + ?Sized,
    {
        if !session.dirty.has_dirty() {
            return None;
        }

        let mut report = BatchReport::default();
        for test in session.dirty.dirty() {
            session.dirty.clear(&test);
            if self.fs.is_file(&self.root.join(&test)) {
                report.submitted.push(test);
            } else {
                warn!(test = %test, "derived test file does not exist");
                session.missing_tests.insert(test.clone());
                report.missing.push(test);
            }
        }

        if !report.submitted.is_empty() {
            match executor.run_batch(report.submitted.clone()).await {
                Ok(output) => report.lines = self.filter_output(&output),
                Err(err) => {
                    error!(error = %err, "batch failed");
                    report.failure = Some(err.to_string());
                }
            }
        }

        Some(report)
    }

    /// Drop noise lines from raw batch output.
    pub fn filter_output(&self, raw: &str) -> Vec<String> {
        raw.lines()
            .filter(|line| self.full_trace || !self.noise.iter().any(|re| re.is_match(line)))
            .map(str::to_string)
            .collect()
    }
}
