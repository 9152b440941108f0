// src/exec/supervisor.rs

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::errors::{Result, WarmrunError};

use super::worker::{WorkerLauncher, WorkerProcess};

/// Lifecycle of the single worker process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Absent,
    Starting,
    Running,
    CrashedUnexpected,
    ShuttingDown,
}

/// What we know about the current worker.
///
/// A handle with a pid but no process is stale: the process object was lost
/// while the OS process may still exist.
struct WorkerHandle {
    pid: Option<u32>,
    process: Option<Box<dyn WorkerProcess>>,
    started_at: Instant,
}

/// Keeps exactly one worker alive between loop iterations.
pub struct WorkerSupervisor<L> {
    launcher: L,
    handle: Option<WorkerHandle>,
    state: WorkerState,
    warmup: Duration,
    restart_attempts: u32,
    starts: u64,
    crashes: u64,
}

impl<L: WorkerLauncher> WorkerSupervisor<L> {
    pub fn new(launcher: L, warmup: Duration, restart_attempts: u32) -> Self {
        Self {
            launcher,
            handle: None,
            state: WorkerState::Absent,
            warmup,
            restart_attempts: restart_attempts.max(1),
            starts: 0,
            crashes: 0,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn pid(&self) -> Option<u32> {
        self.handle.as_ref().and_then(|h| h.pid)
    }

    /// Number of successful launches so far.
    pub fn starts(&self) -> u64 {
        self.starts
    }

    /// Number of times the worker was found dead when it should have been alive.
    pub fn crashes(&self) -> u64 {
        self.crashes
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Record a worker known only by pid, e.g. one left behind by an earlier
    /// run. The next `ensure_running` or `shutdown` terminates it.
    pub fn adopt(&mut self, pid: u32) {
        warn!(pid, "adopting worker pid without a process handle");
        self.handle = Some(WorkerHandle {
            pid: Some(pid),
            process: None,
            started_at: Instant::now(),
        });
        self.state = WorkerState::Running;
    }

    /// Make sure a live worker exists, starting or restarting it as needed.
    ///
    /// Fails with [`WarmrunError::WorkerCrash`] when the worker dies right
    /// after start `restart_attempts` times within this call.
    pub async fn ensure_running(&mut self) -> Result<()> {
        let mut crashed = 0u32;
        loop {
            if self.handle.as_ref().is_some_and(|h| h.process.is_none()) {
                self.shutdown().await;
            }

            if self.handle.is_none() {
                self.start().await?;
            }

            if self.poll_alive() {
                self.state = WorkerState::Running;
                return Ok(());
            }

            crashed += 1;
            self.crashes += 1;
            self.state = WorkerState::CrashedUnexpected;
            warn!(attempt = crashed, "worker exited unexpectedly");
            println!("\nWorker exited unexpectedly; restarting.");
            self.shutdown().await;

            if crashed >= self.restart_attempts {
                return Err(WarmrunError::WorkerCrash { attempts: crashed });
            }
        }
    }

    async fn start(&mut self) -> Result<()> {
        self.state = WorkerState::Starting;
        let process = match self.launcher.launch() {
            Ok(process) => process,
            Err(err) => {
                self.state = WorkerState::Absent;
                return Err(WarmrunError::WorkerSpawn(format!("{err:#}")));
            }
        };

        let pid = process.pid();
        info!(?pid, warmup = ?self.warmup, "worker started; warming up");
        self.handle = Some(WorkerHandle {
            pid,
            process: Some(process),
            started_at: Instant::now(),
        });
        self.starts += 1;

        tokio::time::sleep(self.warmup).await;
        Ok(())
    }

    fn poll_alive(&mut self) -> bool {
        let Some(process) = self.handle.as_mut().and_then(|h| h.process.as_mut()) else {
            return false;
        };
        match process.try_exit_code() {
            Ok(None) => true,
            Ok(Some(code)) => {
                warn!(exit_code = code, "worker is no longer running");
                false
            }
            Err(err) => {
                warn!(error = %err, "could not poll worker status");
                false
            }
        }
    }

    /// Stop the worker if there is one and forget it.
    ///
    /// A live worker is interrupted and its output drained. A stale pid is
    /// force-killed if it still exists. The supervisor ends up `Absent`.
    pub async fn shutdown(&mut self) {
        let Some(mut handle) = self.handle.take() else {
            self.state = WorkerState::Absent;
            return;
        };
        self.state = WorkerState::ShuttingDown;
        debug!(uptime = ?handle.started_at.elapsed(), pid = ?handle.pid, "shutting worker down");

        match handle.process.as_mut() {
            Some(process) => {
                let alive = handle.pid.is_some_and(|pid| self.launcher.pid_alive(pid));
                if alive {
                    if let Err(err) = process.interrupt() {
                        warn!(error = %err, "failed to interrupt worker");
                    }
                }
                match process.drain_output().await {
                    Ok(lines) => {
                        for line in lines {
                            debug!(pid = ?handle.pid, "worker output: {}", line);
                        }
                    }
                    Err(err) => warn!(error = %err, "failed to collect worker output"),
                }
            }
            None => {
                if let Some(pid) = handle.pid {
                    if self.launcher.pid_alive(pid) {
                        warn!(pid, "stale worker still alive; killing it");
                        if let Err(err) = self.launcher.force_kill(pid) {
                            warn!(pid, error = %err, "failed to kill stale worker");
                        }
                    } else {
                        debug!(pid, "stale worker already gone");
                    }
                }
            }
        }

        self.state = WorkerState::Absent;
    }
}
