// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod report;
pub mod routing;
pub mod scan;
pub mod session;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{load_config, ConfigFile};
use crate::engine::{Interrupt, LoopOptions, MainLoop};
use crate::exec::{CommandBatchExecutor, ShellWorkerLauncher, TestRunner, WorkerSupervisor};
use crate::fs::{FileSystem, RealFileSystem};
use crate::scan::PollingScanner;
use crate::session::Session;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - scanner, dirty registry and test runner over the real filesystem
/// - the worker supervisor and batch executor
/// - Ctrl-C forwarding into the main loop
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_config(args.config.as_deref().map(Path::new))?;

    if args.dry_run {
        report::print_dry_run(&cfg);
        debug!("dry-run complete (no execution)");
        return Ok(());
    }

    let root = std::env::current_dir().context("resolving the watch root")?;
    let main_loop = build_main_loop(&cfg, &root, &args);

    if args.once {
        main_loop.run_once().await?;
        return Ok(());
    }

    let (tx, rx) = mpsc::channel::<Interrupt>(8);
    tokio::spawn(async move {
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            if tx.send(Interrupt).await.is_err() {
                return;
            }
        }
    });

    info!(root = %root.display(), rules = cfg.router.rules().len(), "watching");
    main_loop.run(rx).await?;
    Ok(())
}

fn build_main_loop(
    cfg: &ConfigFile,
    root: &Path,
    args: &CliArgs,
) -> MainLoop<PollingScanner, ShellWorkerLauncher, CommandBatchExecutor> {
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);

    let session = Session::new(cfg.types.clone());
    let scanner = PollingScanner::new(
        Arc::clone(&fs),
        root,
        cfg.router.clone(),
        cfg.db_change_advice.clone(),
    );
    let launcher = ShellWorkerLauncher::new(cfg.start_cmd.clone(), root, cfg.timing.shutdown_grace);
    let supervisor =
        WorkerSupervisor::new(launcher, cfg.timing.worker_warmup, cfg.restart_attempts);
    let executor = CommandBatchExecutor::new(cfg.batch_cmd.clone(), root);
    let runner = TestRunner::new(fs, root, cfg.noise.clone(), args.full_trace());

    MainLoop::new(
        session,
        scanner,
        supervisor,
        executor,
        runner,
        LoopOptions::from_config(cfg, args.verbose()),
    )
}
