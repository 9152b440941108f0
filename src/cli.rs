// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `warmrun`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "warmrun",
    version,
    about = "Watch a source tree and re-run only the impacted tests on a warm worker.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Without this flag, `Warmrun.toml` in the working directory is used if
    /// present, otherwise the built-in Rails rule table.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Print tracking decisions and the submitted commands.
    #[arg(long)]
    pub verbose: bool,

    /// Show full test output (noise suppression turned off).
    #[arg(long)]
    pub full_trace: bool,

    /// Debug mode: implies --verbose and --full-trace plus internal diagnostics.
    #[arg(long)]
    pub debug: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// Overrides --verbose/--debug and `WARMRUN_LOG`.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate the config, print the rule table, run nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// Start the worker, do one full scan, run the dirty tests and exit.
    #[arg(long)]
    pub once: bool,
}

impl CliArgs {
    pub fn verbose(&self) -> bool {
        self.verbose || self.debug
    }

    pub fn full_trace(&self) -> bool {
        self.full_trace || self.debug
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
