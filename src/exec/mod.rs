// src/exec/mod.rs

//! Process side of warmrun.
//!
//! - [`worker`]: the long-lived worker process and how it is launched.
//! - [`supervisor`]: keeps exactly one worker alive across loop iterations.
//! - [`batch`]: submits one batch of tests to the worker.
//! - [`runner`]: turns the dirty registry into a batch and a report.
//! - [`signals`]: pid probing and signal delivery.

pub mod batch;
pub mod runner;
pub mod signals;
pub mod supervisor;
pub mod worker;

use std::future::Future;
use std::pin::Pin;

use tokio::process::Command;

pub use batch::{BatchExecutor, CommandBatchExecutor};
pub use runner::{BatchReport, TestRunner};
pub use supervisor::{WorkerState, WorkerSupervisor};
pub use worker::{ShellWorkerLauncher, WorkerLauncher, WorkerProcess};

/// Boxed future returned by the object-safe process traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Build a shell command appropriate for the platform.
pub(crate) fn shell_command(line: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(line);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(line);
        c
    }
}
