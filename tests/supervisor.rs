// tests/supervisor.rs

mod common;
use crate::common::fakes::FakeLauncher;
use crate::common::{init_tracing, with_timeout};

use std::error::Error;
use std::time::Duration;

use warmrun::errors::WarmrunError;
use warmrun::exec::{WorkerState, WorkerSupervisor};

type TestResult = Result<(), Box<dyn Error>>;

fn supervisor(launcher: &FakeLauncher, attempts: u32) -> WorkerSupervisor<FakeLauncher> {
    WorkerSupervisor::new(launcher.clone(), Duration::ZERO, attempts)
}

#[tokio::test]
async fn starts_worker_once_and_reuses_it() -> TestResult {
    init_tracing();
    let launcher = FakeLauncher::new();
    let mut sup = supervisor(&launcher, 3);
    assert_eq!(sup.state(), WorkerState::Absent);

    with_timeout(sup.ensure_running()).await?;
    with_timeout(sup.ensure_running()).await?;

    assert_eq!(launcher.launches(), 1);
    assert_eq!(sup.state(), WorkerState::Running);
    assert_eq!(sup.pid(), Some(4000));
    Ok(())
}

#[tokio::test]
async fn crashed_worker_is_detected_and_restarted() -> TestResult {
    let launcher = FakeLauncher::new();
    let mut sup = supervisor(&launcher, 3);
    sup.ensure_running().await?;

    launcher.kill_all();
    sup.ensure_running().await?;

    assert_eq!(launcher.launches(), 2);
    assert_eq!(sup.crashes(), 1);
    assert_eq!(sup.pid(), Some(4001));
    assert!(launcher.is_alive(4001));
    assert_eq!(sup.state(), WorkerState::Running);
    Ok(())
}

#[tokio::test]
async fn worker_dying_during_warmup_is_restarted() -> TestResult {
    let launcher = FakeLauncher::new();
    launcher.crash_next(2);
    let mut sup = supervisor(&launcher, 3);

    sup.ensure_running().await?;

    assert_eq!(launcher.launches(), 3);
    assert_eq!(sup.crashes(), 2);
    assert_eq!(sup.state(), WorkerState::Running);
    Ok(())
}

#[tokio::test]
async fn repeated_crashes_give_up_with_worker_crash() -> TestResult {
    let launcher = FakeLauncher::new();
    launcher.crash_next(10);
    let mut sup = supervisor(&launcher, 3);

    match sup.ensure_running().await {
        Err(WarmrunError::WorkerCrash { attempts }) => assert_eq!(attempts, 3),
        other => panic!("expected WorkerCrash, got {other:?}"),
    }
    assert_eq!(launcher.launches(), 3);
    assert_eq!(sup.state(), WorkerState::Absent);

    // The next call starts over.
    launcher.crash_next(0);
    sup.ensure_running().await?;
    assert_eq!(sup.state(), WorkerState::Running);
    Ok(())
}

#[tokio::test]
async fn launch_failure_is_a_spawn_error() -> TestResult {
    let launcher = FakeLauncher::new();
    launcher.fail_launches(true);
    let mut sup = supervisor(&launcher, 3);

    assert!(matches!(
        sup.ensure_running().await,
        Err(WarmrunError::WorkerSpawn(_))
    ));
    assert_eq!(sup.state(), WorkerState::Absent);
    Ok(())
}

#[tokio::test]
async fn shutdown_interrupts_and_drains_live_worker() -> TestResult {
    let launcher = FakeLauncher::new();
    let mut sup = supervisor(&launcher, 3);
    sup.ensure_running().await?;

    sup.shutdown().await;

    assert_eq!(launcher.interrupts(), vec![4000]);
    assert_eq!(launcher.drained(), 1);
    assert!(launcher.force_kills().is_empty());
    assert_eq!(sup.state(), WorkerState::Absent);
    assert_eq!(sup.pid(), None);
    Ok(())
}

#[tokio::test]
async fn shutdown_without_worker_is_a_no_op() -> TestResult {
    let launcher = FakeLauncher::new();
    let mut sup = supervisor(&launcher, 3);

    sup.shutdown().await;

    assert!(launcher.interrupts().is_empty());
    assert_eq!(sup.state(), WorkerState::Absent);
    Ok(())
}

#[tokio::test]
async fn stale_pid_is_force_killed_before_restart() -> TestResult {
    let launcher = FakeLauncher::new();
    launcher.set_alive(777);
    let mut sup = supervisor(&launcher, 3);
    sup.adopt(777);

    sup.ensure_running().await?;

    assert_eq!(launcher.force_kills(), vec![777]);
    assert!(!launcher.is_alive(777));
    assert_eq!(launcher.launches(), 1);
    assert_eq!(sup.pid(), Some(4000));
    Ok(())
}

#[tokio::test]
async fn dead_stale_pid_is_just_forgotten() -> TestResult {
    let launcher = FakeLauncher::new();
    let mut sup = supervisor(&launcher, 3);
    sup.adopt(778);

    sup.shutdown().await;

    assert!(launcher.force_kills().is_empty());
    assert_eq!(sup.state(), WorkerState::Absent);
    Ok(())
}
