// src/report.rs

//! User-facing console output.
//!
//! Logs go to stderr through `tracing`; this module owns what the user
//! actually reads on stdout.

use chrono::Local;

use crate::config::ConfigFile;
use crate::engine::Summary;
use crate::exec::BatchReport;
use crate::routing::{ControlToken, GroupToken, Target};

/// Banner timestamp, e.g. `Mon Oct 19 14:03:11 2026`.
pub fn timestamp() -> String {
    Local::now().format("%a %b %e %H:%M:%S %Y").to_string()
}

pub fn print_batch(report: &BatchReport, unmapped: &[String]) {
    println!("\n---- {} ----", timestamp());

    for path in unmapped {
        println!("Missing test for file:\t{path}");
    }
    for test in &report.missing {
        println!("Missing a test file:\t{test}");
    }

    println!("Submitted {} test files", report.submitted.len());
    if let Some(failure) = &report.failure {
        println!("Batch failed: {failure}");
        return;
    }

    println!("Results ----");
    for line in &report.lines {
        println!("{line}");
    }
}

pub fn print_summary(summary: &Summary, verbose: bool) {
    println!("\nDone test monitoring.");
    println!(
        "  {} files tracked, {} tests registered, {} batches run",
        summary.tracked, summary.registered_tests, summary.batches
    );
    print_list("skipped files", &summary.skipped, verbose);
    print_list("files without a test mapping", &summary.unmapped, verbose);
    print_list("missing test files", &summary.missing_tests, verbose);
}

fn print_list(label: &str, items: &[String], verbose: bool) {
    if items.is_empty() {
        return;
    }
    println!("  {} {label}", items.len());
    if verbose {
        for item in items {
            println!("    {item}");
        }
    }
}

fn describe_target(target: &Target) -> String {
    match target {
        Target::Literal(template) => template.clone(),
        Target::Group(GroupToken::All) => "ALL".to_string(),
        Target::Group(GroupToken::Type(name)) => name.clone(),
        Target::Control(ControlToken::SelfPath) => "SELF".to_string(),
        Target::Control(ControlToken::Ignore) => "IGNORE".to_string(),
        Target::Control(ControlToken::DbChange) => "DBCHANGE".to_string(),
    }
}

/// Simple dry-run output: settings, types and the rule table in order.
pub fn print_dry_run(cfg: &ConfigFile) {
    println!("warmrun dry-run");
    println!("  config.full_scan_every = {}", cfg.full_scan_every);
    println!("  config.tick_interval = {:?}", cfg.timing.tick_interval);
    println!("  config.worker_warmup = {:?}", cfg.timing.worker_warmup);
    println!("  config.force_scan_window = {:?}", cfg.timing.force_scan_window);
    println!("  config.force_scan_interval = {:?}", cfg.timing.force_scan_interval);
    println!("  config.restart_attempts = {}", cfg.restart_attempts);
    println!("  worker.start_cmd = {}", cfg.start_cmd);
    println!("  worker.batch_cmd = {}", cfg.batch_cmd);
    println!();

    println!("types:");
    for (name, pattern) in cfg.types.iter() {
        println!("  {name} = {}", pattern.as_str());
    }
    println!();

    println!("rules ({}):", cfg.router.rules().len());
    for (index, rule) in cfg.router.rules().iter().enumerate() {
        let targets: Vec<String> = rule.targets().iter().map(describe_target).collect();
        println!("  {:>2}. {}", index + 1, rule.source());
        println!("      -> {}", targets.join(", "));
    }
}
