// tests/test_runner.rs

mod common;
use crate::common::builders::ConfigFileBuilder;
use crate::common::fakes::RecordingBatchExecutor;
use crate::common::project::{mock_path, mock_tree, rails_config, rails_tree, scanner_for};
use crate::common::{init_tracing, with_timeout};

use std::error::Error;
use std::sync::Arc;

use warmrun::exec::TestRunner;
use warmrun::fs::FileSystem;
use warmrun::fs::mock::MockFileSystem;
use warmrun::routing::{DirtyTarget, GroupToken};
use warmrun::scan::Scanner;
use warmrun::session::Session;

type TestResult = Result<(), Box<dyn Error>>;

fn runner(fs: &MockFileSystem, noise: &[&str], full_trace: bool) -> TestRunner {
    let shared: Arc<dyn FileSystem> = Arc::new(fs.clone());
    let noise = noise
        .iter()
        .map(|p| regex::Regex::new(&format!("^(?:{p})")).unwrap())
        .collect();
    TestRunner::new(shared, ".", noise, full_trace)
}

#[tokio::test]
async fn nothing_dirty_means_no_batch() -> TestResult {
    let fs = rails_tree();
    let cfg = rails_config();
    let mut session = Session::new(cfg.types.clone());
    let mut executor = RecordingBatchExecutor::new();

    let report = runner(&fs, &[], false)
        .run_dirty(&mut session, &mut executor)
        .await;

    assert!(report.is_none());
    assert!(executor.batches().is_empty());
    Ok(())
}

#[tokio::test]
async fn dirty_tests_go_out_as_one_batch_and_are_cleared() -> TestResult {
    init_tracing();
    let fs = rails_tree();
    let cfg = rails_config();
    let (mut scanner, mut session) = scanner_for(&fs, &cfg);
    scanner.full_scan(&mut session)?;
    let mut executor = RecordingBatchExecutor::new().with_output("5 tests, 0 failures\n");

    let report = with_timeout(runner(&fs, &[], false).run_dirty(&mut session, &mut executor))
        .await
        .expect("dirty tests should produce a report");

    let batches = executor.batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), 5);
    assert_eq!(report.submitted, batches[0]);
    assert_eq!(report.lines, vec!["5 tests, 0 failures".to_string()]);
    assert!(!session.dirty.has_dirty());
    Ok(())
}

#[tokio::test]
async fn missing_test_file_is_recorded_once_and_left_out() -> TestResult {
    let fs = mock_tree(&["app/models/widget.rb", "test/models/article_test.rb"]);
    let cfg = rails_config();
    let (mut scanner, mut session) = scanner_for(&fs, &cfg);
    scanner.full_scan(&mut session)?;
    let mut executor = RecordingBatchExecutor::new();
    let runner = runner(&fs, &[], false);

    let report = runner
        .run_dirty(&mut session, &mut executor)
        .await
        .expect("report");

    assert_eq!(report.missing, vec!["test/models/widget_test.rb".to_string()]);
    assert_eq!(report.submitted, vec!["test/models/article_test.rb".to_string()]);
    assert!(session.missing_tests.contains("test/models/widget_test.rb"));
    assert_eq!(session.missing_tests.len(), 1);

    // Not retried on the next pass.
    assert!(runner.run_dirty(&mut session, &mut executor).await.is_none());
    assert_eq!(session.missing_tests.len(), 1);

    // Re-derived by a later change: tried again, but recorded only once.
    fs.touch(mock_path("app/models/widget.rb"));
    scanner.targeted_check(&mut session);
    let report = runner
        .run_dirty(&mut session, &mut executor)
        .await
        .expect("report");
    assert_eq!(report.missing.len(), 1);
    assert!(report.submitted.is_empty());
    assert_eq!(session.missing_tests.len(), 1);
    assert_eq!(executor.batches().len(), 1);
    Ok(())
}

#[tokio::test]
async fn repeated_forced_runs_do_not_grow_missing_list() -> TestResult {
    let fs = mock_tree(&["app/models/widget.rb", "test/models/article_test.rb"]);
    let cfg = rails_config();
    let (mut scanner, mut session) = scanner_for(&fs, &cfg);
    scanner.full_scan(&mut session)?;
    let mut executor = RecordingBatchExecutor::new();
    let runner = runner(&fs, &[], false);

    for _ in 0..5 {
        session.dirty.mark_group(&GroupToken::All);
        let report = runner
            .run_dirty(&mut session, &mut executor)
            .await
            .expect("report");
        assert_eq!(report.missing, vec!["test/models/widget_test.rb".to_string()]);
    }

    assert_eq!(session.missing_tests.len(), 1);
    assert_eq!(executor.batches().len(), 5);
    Ok(())
}

#[tokio::test]
async fn noise_is_filtered_unless_full_trace() -> TestResult {
    let fs = mock_tree(&["test/models/article_test.rb"]);
    let cfg = ConfigFileBuilder::new()
        .with_rule(r"test/.*_test\.rb$", &["SELF"])
        .build();
    let output = "1 tests\n  at org/jruby/RubyKernel.java:1\n  at /opt/jruby-9.4/lib/x.rb\nok\n";

    let mut session = Session::new(cfg.types.clone());
    session
        .dirty
        .mark_dirty(&[DirtyTarget::test("test/models/article_test.rb")]);
    let mut executor = RecordingBatchExecutor::new().with_output(output);
    let noise = [r".*/jruby-[^/]+/.*", r".*(RubyBasicObject|RubyKernel).*"];

    let report = runner(&fs, &noise, false)
        .run_dirty(&mut session, &mut executor)
        .await
        .expect("report");
    assert_eq!(report.lines, vec!["1 tests".to_string(), "ok".to_string()]);

    session
        .dirty
        .mark_dirty(&[DirtyTarget::test("test/models/article_test.rb")]);
    let report = runner(&fs, &noise, true)
        .run_dirty(&mut session, &mut executor)
        .await
        .expect("report");
    assert_eq!(report.lines.len(), 4);
    Ok(())
}

#[tokio::test]
async fn failing_batch_is_reported_not_retried() -> TestResult {
    let fs = mock_tree(&["test/models/article_test.rb"]);
    let cfg = rails_config();
    let mut session = Session::new(cfg.types.clone());
    session
        .dirty
        .mark_dirty(&[DirtyTarget::test("test/models/article_test.rb")]);
    let mut executor = RecordingBatchExecutor::new().failing();

    let report = runner(&fs, &[], false)
        .run_dirty(&mut session, &mut executor)
        .await
        .expect("report");

    assert!(report.failure.is_some());
    assert!(!session.dirty.has_dirty());
    Ok(())
}
