// tests/shell_process.rs
#![cfg(unix)]

mod common;
use crate::common::{init_tracing, with_timeout};

use std::error::Error;
use std::time::Duration;

use warmrun::errors::WarmrunError;
use warmrun::exec::{
    BatchExecutor, CommandBatchExecutor, ShellWorkerLauncher, WorkerLauncher, WorkerState,
    WorkerSupervisor,
};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn command_line_substitutes_the_test_list() {
    let exec = CommandBatchExecutor::new("ruby -e 'load %w[{tests}]'", ".");
    let tests = vec!["test/a_test.rb".to_string(), "test/b_test.rb".to_string()];

    assert_eq!(
        exec.command_line(&tests),
        "ruby -e 'load %w[test/a_test.rb test/b_test.rb]'"
    );
}

#[tokio::test]
async fn batch_output_includes_stdout_and_stderr() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let mut exec = CommandBatchExecutor::new("echo running {tests}; echo oops >&2", dir.path());

    let output = with_timeout(exec.run_batch(vec!["a_test.rb".to_string(), "b_test.rb".to_string()]))
        .await?;

    assert!(output.contains("running a_test.rb b_test.rb"));
    assert!(output.contains("oops"));
    Ok(())
}

#[test]
fn command_line_quotes_paths_for_their_context() {
    let tests = vec!["test/it's_test.rb".to_string(), "test/a b_test.rb".to_string()];

    let bare = CommandBatchExecutor::new("run {tests}", ".");
    assert_eq!(
        bare.command_line(&tests),
        r"run 'test/it'\''s_test.rb' 'test/a b_test.rb'"
    );

    let single = CommandBatchExecutor::new("ruby -e 'load %w[{tests}]'", ".");
    assert_eq!(
        single.command_line(&tests),
        r"ruby -e 'load %w[test/it'\''s_test.rb test/a b_test.rb]'"
    );

    let double = CommandBatchExecutor::new(r#"ruby -e "%w[{tests}]""#, ".");
    let tests = vec!["test/$(x)_test.rb".to_string()];
    assert_eq!(double.command_line(&tests), r#"ruby -e "%w[test/\$(x)_test.rb]""#);
}

#[tokio::test]
async fn odd_test_names_reach_the_batch_verbatim() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let tests = vec![
        "test/$(echo INJECTED)_test.rb".to_string(),
        "test/a b_test.rb".to_string(),
        "test/x;true_test.rb".to_string(),
    ];

    // One argument per line: spaces do not split a name.
    let mut bare = CommandBatchExecutor::new(r"printf '%s\n' {tests}", dir.path());
    let output = with_timeout(bare.run_batch(tests.clone())).await?;
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines, tests.iter().map(String::as_str).collect::<Vec<_>>());

    // Inside a double-quoted argument, as in the built-in batch command.
    let mut double = CommandBatchExecutor::new(r#"printf '%s\n' "[{tests}]""#, dir.path());
    let output = with_timeout(double.run_batch(tests.clone())).await?;
    assert_eq!(output.trim_end(), format!("[{}]", tests.join(" ")));
    assert!(!output.contains("test/INJECTED"));
    Ok(())
}

#[tokio::test]
async fn real_worker_starts_and_stops_on_interrupt() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let launcher = ShellWorkerLauncher::new("sleep 30", dir.path(), Duration::from_secs(2));
    let mut sup = WorkerSupervisor::new(launcher, Duration::from_millis(50), 1);

    with_timeout(sup.ensure_running()).await?;
    let pid = sup.pid().expect("running worker has a pid");
    assert_eq!(sup.state(), WorkerState::Running);
    assert!(sup.launcher().pid_alive(pid));

    with_timeout(sup.shutdown()).await;
    assert_eq!(sup.state(), WorkerState::Absent);
    assert!(!sup.launcher().pid_alive(pid));
    Ok(())
}

#[tokio::test]
async fn worker_that_exits_immediately_is_a_crash() -> TestResult {
    let dir = tempfile::tempdir()?;
    let launcher = ShellWorkerLauncher::new("false", dir.path(), Duration::from_secs(1));
    let mut sup = WorkerSupervisor::new(launcher, Duration::from_millis(100), 2);

    match with_timeout(sup.ensure_running()).await {
        Err(WarmrunError::WorkerCrash { attempts }) => assert_eq!(attempts, 2),
        other => panic!("expected WorkerCrash, got {other:?}"),
    }
    assert_eq!(sup.starts(), 2);
    Ok(())
}
