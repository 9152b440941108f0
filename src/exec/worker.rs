// src/exec/worker.rs

//! The long-lived worker process.
//!
//! [`WorkerLauncher`] is the seam between the supervisor and the OS: the
//! production [`ShellWorkerLauncher`] spawns `start_cmd` through the shell,
//! tests plug in a fake that never touches a real process.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{shell_command, signals, BoxFuture};

/// Lines of worker output kept for the shutdown report.
const MAX_BUFFERED_LINES: usize = 500;

/// A running (or recently exited) worker.
pub trait WorkerProcess: Send {
    /// OS pid, if the process has not been reaped yet.
    fn pid(&self) -> Option<u32>;

    /// `Ok(None)` while the process is alive, `Ok(Some(code))` once it exited.
    fn try_exit_code(&mut self) -> Result<Option<i32>>;

    /// Ask the worker to stop.
    fn interrupt(&mut self) -> Result<()>;

    /// Wait for the process to exit and collect whatever it printed.
    fn drain_output(&mut self) -> BoxFuture<'_, Result<Vec<String>>>;
}

/// Starts workers and probes pids that outlived their handle.
pub trait WorkerLauncher: Send {
    fn launch(&mut self) -> Result<Box<dyn WorkerProcess>>;

    fn pid_alive(&self, pid: u32) -> bool;

    fn force_kill(&self, pid: u32) -> Result<()>;
}

/// Launches `start_cmd` via `sh -c` in the watch root.
#[derive(Debug, Clone)]
pub struct ShellWorkerLauncher {
    start_cmd: String,
    root: PathBuf,
    shutdown_grace: Duration,
}

impl ShellWorkerLauncher {
    pub fn new(start_cmd: impl Into<String>, root: impl Into<PathBuf>, shutdown_grace: Duration) -> Self {
        Self {
            start_cmd: start_cmd.into(),
            root: root.into(),
            shutdown_grace,
        }
    }
}

impl WorkerLauncher for ShellWorkerLauncher {
    fn launch(&mut self) -> Result<Box<dyn WorkerProcess>> {
        // `exec` so that the pid we signal is the worker, not the shell.
        let line = if cfg!(unix) {
            format!("exec {}", self.start_cmd)
        } else {
            self.start_cmd.clone()
        };

        info!(cmd = %self.start_cmd, root = %self.root.display(), "starting worker process");

        let mut cmd = shell_command(&line);
        cmd.current_dir(&self.root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawning worker '{}'", self.start_cmd))?;

        let output = Arc::new(Mutex::new(VecDeque::new()));
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_reader("stdout", stdout, Arc::clone(&output)));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_reader("stderr", stderr, Arc::clone(&output)));
        }

        Ok(Box::new(ChildWorker {
            child,
            output,
            readers,
            grace: self.shutdown_grace,
        }))
    }

    fn pid_alive(&self, pid: u32) -> bool {
        signals::pid_alive(pid)
    }

    fn force_kill(&self, pid: u32) -> Result<()> {
        signals::force_kill(pid)
    }
}

fn spawn_reader<R>(
    stream: &'static str,
    reader: R,
    sink: Arc<Mutex<VecDeque<String>>>,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            debug!(stream, "worker: {}", line);
            if let Ok(mut buf) = sink.lock() {
                if buf.len() == MAX_BUFFERED_LINES {
                    buf.pop_front();
                }
                buf.push_back(line);
            }
        }
    })
}

struct ChildWorker {
    child: Child,
    output: Arc<Mutex<VecDeque<String>>>,
    readers: Vec<JoinHandle<()>>,
    grace: Duration,
}

impl WorkerProcess for ChildWorker {
    fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    fn try_exit_code(&mut self) -> Result<Option<i32>> {
        let status = self.child.try_wait().context("polling worker status")?;
        Ok(status.map(|s| s.code().unwrap_or(-1)))
    }

    fn interrupt(&mut self) -> Result<()> {
        let Some(pid) = self.child.id() else {
            return Ok(());
        };
        if cfg!(unix) {
            signals::interrupt(pid)
        } else {
            self.child.start_kill().context("killing worker")
        }
    }

    fn drain_output(&mut self) -> BoxFuture<'_, Result<Vec<String>>> {
        Box::pin(async move {
            match tokio::time::timeout(self.grace, self.child.wait()).await {
                Ok(status) => {
                    let status = status.context("waiting for worker to exit")?;
                    debug!(exit_code = ?status.code(), "worker exited");
                }
                Err(_) => {
                    warn!(grace = ?self.grace, "worker ignored the interrupt; killing it");
                    self.child.kill().await.context("killing worker")?;
                }
            }

            for reader in self.readers.drain(..) {
                if tokio::time::timeout(self.grace, reader).await.is_err() {
                    debug!("worker output pipe still open; not waiting for it");
                }
            }

            let lines = match self.output.lock() {
                Ok(mut buf) => buf.drain(..).collect(),
                Err(_) => Vec::new(),
            };
            Ok(lines)
        })
    }
}
