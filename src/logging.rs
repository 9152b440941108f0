// src/logging.rs

//! Logging setup for `warmrun` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `--debug` (debug) or `--verbose` (info)
//! 3. `WARMRUN_LOG` environment variable (e.g. "info", "debug")
//! 4. default to `warn`
//!
//! Logs are sent to STDERR so that stdout carries only the results banner,
//! advisories and test output.

use anyhow::Result;
use tracing_subscriber::fmt;

use crate::cli::{CliArgs, LogLevel};

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(args: &CliArgs) -> Result<()> {
    let level = resolve_level(args);

    fmt()
        .with_max_level(level)
        .with_target(args.debug)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn resolve_level(args: &CliArgs) -> tracing::Level {
    if let Some(lvl) = args.log_level {
        return level_from_log_level(lvl);
    }
    if args.debug {
        return tracing::Level::DEBUG;
    }
    if args.verbose {
        return tracing::Level::INFO;
    }
    std::env::var("WARMRUN_LOG")
        .ok()
        .and_then(|s| parse_level_str(&s))
        .unwrap_or(tracing::Level::WARN)
}

fn level_from_log_level(lvl: LogLevel) -> tracing::Level {
    match lvl {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    }
}

fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}
