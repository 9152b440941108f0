// src/exec/batch.rs

//! Submitting a batch of tests to the warm worker.

use std::borrow::Cow;
use std::path::PathBuf;
use std::process::Stdio;

use anyhow::Context;
use tracing::{debug, info};

use crate::config::validate::TESTS_PLACEHOLDER;
use crate::errors::Result;

use super::{shell_command, BoxFuture};

/// Trait abstracting how a batch reaches the worker.
///
/// Production code uses [`CommandBatchExecutor`]; tests record the batches
/// instead of spawning anything.
pub trait BatchExecutor: Send {
    /// Run `tests` (root-relative paths) as one batch and return the
    /// combined stdout/stderr.
    fn run_batch(&mut self, tests: Vec<String>) -> BoxFuture<'_, Result<String>>;
}

/// Runs `batch_cmd` through the shell with `{tests}` substituted.
#[derive(Debug, Clone)]
pub struct CommandBatchExecutor {
    template: String,
    root: PathBuf,
}

impl CommandBatchExecutor {
    pub fn new(template: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            template: template.into(),
            root: root.into(),
        }
    }

    /// The shell line for `tests`, without output redirection.
    ///
    /// Each path is quoted for the context `{tests}` sits in, so names with
    /// spaces or shell syntax reach the command verbatim.
    pub fn command_line(&self, tests: &[String]) -> String {
        let mut line = String::with_capacity(self.template.len());
        let mut rest = 0;
        for (idx, _) in self.template.match_indices(TESTS_PLACEHOLDER) {
            line.push_str(&self.template[rest..idx]);
            let quoting = quoting_at(&self.template[..idx]);
            let quoted: Vec<String> = tests.iter().map(|t| quote(t, quoting)).collect();
            line.push_str(&quoted.join(" "));
            rest = idx + TESTS_PLACEHOLDER.len();
        }
        line.push_str(&self.template[rest..]);
        line
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quoting {
    Bare,
    Single,
    Double,
}

/// Quote state of `sh` at the end of `prefix`.
fn quoting_at(prefix: &str) -> Quoting {
    let mut state = Quoting::Bare;
    let mut chars = prefix.chars();
    while let Some(c) = chars.next() {
        state = match (state, c) {
            (Quoting::Bare | Quoting::Double, '\\') => {
                chars.next();
                state
            }
            (Quoting::Bare, '\'') => Quoting::Single,
            (Quoting::Single, '\'') => Quoting::Bare,
            (Quoting::Bare, '"') => Quoting::Double,
            (Quoting::Double, '"') => Quoting::Bare,
            (state, _) => state,
        };
    }
    state
}

fn quote(test: &str, quoting: Quoting) -> String {
    match quoting {
        Quoting::Bare => shell_escape::escape(Cow::from(test)).into_owned(),
        Quoting::Single => test.replace('\'', r"'\''"),
        Quoting::Double => {
            let mut out = String::with_capacity(test.len());
            for c in test.chars() {
                if matches!(c, '$' | '`' | '"' | '\\') {
                    out.push('\\');
                }
                out.push(c);
            }
            out
        }
    }
}

impl BatchExecutor for CommandBatchExecutor {
    fn run_batch(&mut self, tests: Vec<String>) -> BoxFuture<'_, Result<String>> {
        let line = format!("{} 2>&1", self.command_line(&tests));
        let root = self.root.clone();

        Box::pin(async move {
            info!(count = tests.len(), "submitting batch");
            debug!(cmd = %line, "batch command");

            let output = shell_command(&line)
                .current_dir(&root)
                .stdin(Stdio::null())
                .kill_on_drop(true)
                .output()
                .await
                .with_context(|| format!("running batch command '{line}'"))?;

            debug!(exit_code = ?output.status.code(), "batch finished");

            let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
            if !output.stderr.is_empty() {
                text.push_str(&String::from_utf8_lossy(&output.stderr));
            }
            Ok(text)
        })
    }
}
