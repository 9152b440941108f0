#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail};
use warmrun::errors::{Result, WarmrunError};
use warmrun::exec::{BatchExecutor, BoxFuture, WorkerLauncher, WorkerProcess};

#[derive(Debug)]
struct LauncherState {
    next_pid: u32,
    /// Workers launched while this is non-zero exit immediately.
    crash_next: u32,
    fail_launch: bool,
    /// Pids the fake "OS" considers alive.
    alive: HashSet<u32>,
    launches: u32,
    interrupts: Vec<u32>,
    force_kills: Vec<u32>,
    drained: u32,
}

/// A fake launcher that:
/// - hands out workers with increasing pids, never spawning anything
/// - can make upcoming workers die right after start
/// - records interrupts, drains and force-kills
#[derive(Debug, Clone)]
pub struct FakeLauncher {
    state: Arc<Mutex<LauncherState>>,
}

impl Default for FakeLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(LauncherState {
                next_pid: 4000,
                crash_next: 0,
                fail_launch: false,
                alive: HashSet::new(),
                launches: 0,
                interrupts: Vec::new(),
                force_kills: Vec::new(),
                drained: 0,
            })),
        }
    }

    pub fn crash_next(&self, n: u32) {
        self.state.lock().unwrap().crash_next = n;
    }

    pub fn fail_launches(&self, fail: bool) {
        self.state.lock().unwrap().fail_launch = fail;
    }

    /// Simulate every running worker dying on its own.
    pub fn kill_all(&self) {
        self.state.lock().unwrap().alive.clear();
    }

    /// Pretend a process with this pid exists.
    pub fn set_alive(&self, pid: u32) {
        self.state.lock().unwrap().alive.insert(pid);
    }

    pub fn is_alive(&self, pid: u32) -> bool {
        self.state.lock().unwrap().alive.contains(&pid)
    }

    pub fn launches(&self) -> u32 {
        self.state.lock().unwrap().launches
    }

    pub fn interrupts(&self) -> Vec<u32> {
        self.state.lock().unwrap().interrupts.clone()
    }

    pub fn force_kills(&self) -> Vec<u32> {
        self.state.lock().unwrap().force_kills.clone()
    }

    pub fn drained(&self) -> u32 {
        self.state.lock().unwrap().drained
    }
}

impl WorkerLauncher for FakeLauncher {
    fn launch(&mut self) -> anyhow::Result<Box<dyn WorkerProcess>> {
        let mut state = self.state.lock().unwrap();
        if state.fail_launch {
            bail!("launch refused by test");
        }
        let pid = state.next_pid;
        state.next_pid += 1;
        state.launches += 1;
        if state.crash_next > 0 {
            state.crash_next -= 1;
        } else {
            state.alive.insert(pid);
        }
        Ok(Box::new(FakeWorker {
            pid,
            state: Arc::clone(&self.state),
        }))
    }

    fn pid_alive(&self, pid: u32) -> bool {
        self.is_alive(pid)
    }

    fn force_kill(&self, pid: u32) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.force_kills.push(pid);
        state.alive.remove(&pid);
        Ok(())
    }
}

struct FakeWorker {
    pid: u32,
    state: Arc<Mutex<LauncherState>>,
}

impl WorkerProcess for FakeWorker {
    fn pid(&self) -> Option<u32> {
        Some(self.pid)
    }

    fn try_exit_code(&mut self) -> anyhow::Result<Option<i32>> {
        let alive = self.state.lock().unwrap().alive.contains(&self.pid);
        Ok(if alive { None } else { Some(1) })
    }

    fn interrupt(&mut self) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.interrupts.push(self.pid);
        state.alive.remove(&self.pid);
        Ok(())
    }

    fn drain_output(&mut self) -> BoxFuture<'_, anyhow::Result<Vec<String>>> {
        let state = Arc::clone(&self.state);
        let pid = self.pid;
        Box::pin(async move {
            state.lock().unwrap().drained += 1;
            Ok(vec![format!("worker {pid} stopped")])
        })
    }
}

/// A fake batch executor that records every batch and replies with canned
/// output.
#[derive(Debug, Clone, Default)]
pub struct RecordingBatchExecutor {
    batches: Arc<Mutex<Vec<Vec<String>>>>,
    output: String,
    fail: bool,
}

impl RecordingBatchExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, output: &str) -> Self {
        self.output = output.to_string();
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().unwrap().clone()
    }
}

impl BatchExecutor for RecordingBatchExecutor {
    fn run_batch(&mut self, tests: Vec<String>) -> BoxFuture<'_, Result<String>> {
        let batches = Arc::clone(&self.batches);
        let output = self.output.clone();
        let fail = self.fail;

        Box::pin(async move {
            batches.lock().unwrap().push(tests);
            if fail {
                return Err(WarmrunError::Other(anyhow!("batch command failed")));
            }
            Ok(output)
        })
    }
}
