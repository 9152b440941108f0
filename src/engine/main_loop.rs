// src/engine/main_loop.rs

//! Async shell around the session.
//!
//! One iteration ("tick"): make sure the worker is up, scan (full or
//! targeted), submit dirty tests, sleep. Interrupts arrive on an mpsc
//! channel and are raced against the current tick or force-scan window.

use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::exec::{BatchExecutor, TestRunner, WorkerLauncher, WorkerSupervisor};
use crate::report;
use crate::routing::GroupToken;
use crate::scan::Scanner;
use crate::session::Session;

use super::escalation::{Escalation, LoopEvent, LoopState};
use super::schedule::{ScanMode, ScanSchedule};
use super::{Interrupt, LoopOptions, Summary};

/// How a raced phase ended.
enum Wake {
    Finished,
    Interrupted,
}

pub struct MainLoop<S, L, B> {
    session: Session,
    scanner: S,
    supervisor: WorkerSupervisor<L>,
    executor: B,
    runner: TestRunner,
    schedule: ScanSchedule,
    escalation: Escalation,
    options: LoopOptions,
    batches: u64,
}

impl<S, L, B> MainLoop<S, L, B>
where
    S: Scanner,
    L: WorkerLauncher,
    B: BatchExecutor,
{
    pub fn new(
        session: Session,
        scanner: S,
        supervisor: WorkerSupervisor<L>,
        executor: B,
        runner: TestRunner,
        options: LoopOptions,
    ) -> Self {
        Self {
            session,
            scanner,
            supervisor,
            executor,
            runner,
            schedule: ScanSchedule::new(options.full_scan_every),
            escalation: Escalation::new(),
            options,
            batches: 0,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> LoopState {
        self.escalation.state()
    }

    /// Run until a second interrupt arrives within the force-scan window.
    pub async fn run(mut self, mut interrupts: mpsc::Receiver<Interrupt>) -> Result<Summary> {
        info!("watch loop started");

        loop {
            match self.escalation.state() {
                LoopState::Running => {
                    let wake = tokio::select! {
                        biased;
                        Some(Interrupt) = interrupts.recv() => Wake::Interrupted,
                        _ = self.tick() => Wake::Finished,
                    };
                    if let Wake::Interrupted = wake {
                        self.interrupted();
                    }
                }
                LoopState::ForceScanWindow => {
                    let wake = tokio::select! {
                        biased;
                        Some(Interrupt) = interrupts.recv() => Wake::Interrupted,
                        _ = self.force_scan_window() => Wake::Finished,
                    };
                    match wake {
                        Wake::Interrupted => self.interrupted(),
                        Wake::Finished => {
                            debug!("force-scan window elapsed");
                            self.escalation.step(LoopEvent::WindowElapsed);
                        }
                    }
                }
                LoopState::ShuttingDown => break,
            }
        }

        Ok(self.finish().await)
    }

    /// One full scan and one batch, then shut down.
    pub async fn run_once(mut self) -> Result<Summary> {
        self.supervisor.ensure_running().await?;
        self.scanner.full_scan(&mut self.session)?;
        self.run_tests().await;
        Ok(self.finish().await)
    }

    fn interrupted(&mut self) {
        match self.escalation.step(LoopEvent::Interrupt) {
            LoopState::ForceScanWindow => {
                info!("interrupt received; opening force-scan window");
                println!("\nInterrupt again to really quit.");
            }
            LoopState::ShuttingDown => info!("second interrupt received; shutting down"),
            LoopState::Running => {}
        }
    }

    /// Start or restart the worker; `false` when it could not be brought up.
    async fn worker_ready(&mut self) -> bool {
        match self.supervisor.ensure_running().await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "worker unavailable; will retry");
                false
            }
        }
    }

    async fn tick(&mut self) {
        let worker_ready = self.worker_ready().await;

        match self.schedule.next_mode() {
            ScanMode::Full => self.full_scan(),
            ScanMode::Targeted => {
                let stats = self.scanner.targeted_check(&mut self.session);
                debug!(?stats, "targeted check finished");
            }
        }

        // Dirty flags stay set until a live worker can take the batch.
        if worker_ready {
            self.run_tests().await;
        }

        sleep(self.options.tick_interval).await;
    }

    async fn force_scan_window(&mut self) {
        self.worker_ready().await;
        sleep(self.options.worker_warmup).await;

        println!("Forcing scan and run...");
        let deadline = Instant::now() + self.options.force_scan_window;
        while Instant::now() < deadline {
            let worker_ready = self.worker_ready().await;
            self.full_scan();
            self.session.dirty.mark_group(&GroupToken::All);
            if worker_ready {
                self.run_tests().await;
            }
            sleep(self.options.force_scan_interval).await;
        }
    }

    fn full_scan(&mut self) {
        match self.scanner.full_scan(&mut self.session) {
            Ok(stats) => debug!(?stats, "full scan finished"),
            Err(err) => warn!(error = %err, "full scan failed"),
        }
    }

    async fn run_tests(&mut self) {
        if let Some(batch) = self
            .runner
            .run_dirty(&mut self.session, &mut self.executor)
            .await
        {
            if !batch.submitted.is_empty() {
                self.batches += 1;
            }
            report::print_batch(&batch, &self.session.unmapped);
        }
    }

    async fn finish(mut self) -> Summary {
        self.supervisor.shutdown().await;

        let mut summary = Summary::from_session(&self.session);
        summary.batches = self.batches;
        summary.worker_starts = self.supervisor.starts();
        summary.worker_crashes = self.supervisor.crashes();

        report::print_summary(&summary, self.options.verbose);
        summary
    }
}
