// src/config/model.rs

use std::collections::BTreeMap;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;

use crate::routing::{RuleRouter, TestTypes};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [config]
/// full_scan_every = 10
/// tick_interval = "2s"
///
/// [worker]
/// start_cmd = "jruby --ng-server"
/// batch_cmd = "jruby --ng -e 'load %w[{tests}]'"
///
/// [filter]
/// eligible = '.*\.(rb|erb|yml)$'
///
/// [types]
/// MODELS = 'test/models/.*_test\.rb$'
///
/// [[rule]]
/// pattern = 'app/models/(?P<singular>.*)\.rb$'
/// targets = ["test/models/SINGULAR_test.rb"]
/// ```
///
/// Every section except `[[rule]]` is optional and falls back to the
/// built-in defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    /// Loop timings and scan cadence from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// Worker and batch commands from `[worker]`.
    #[serde(default)]
    pub worker: WorkerSection,

    /// Eligibility, exclusion and output-noise patterns from `[filter]`.
    #[serde(default)]
    pub filter: FilterSection,

    /// Named test types: token name -> pattern over test paths.
    #[serde(default)]
    pub types: BTreeMap<String, String>,

    /// Ordered routing rules from `[[rule]]`. First match wins.
    #[serde(default, rename = "rule")]
    pub rules: Vec<RuleConfig>,
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigSection {
    /// Run a full scan every N loop iterations (the first iteration always scans).
    #[serde(default = "default_full_scan_every")]
    pub full_scan_every: u32,

    /// Sleep between loop iterations, e.g. `"2s"`.
    #[serde(default = "default_tick_interval")]
    pub tick_interval: String,

    /// Time given to a freshly started worker before it is polled.
    #[serde(default = "default_worker_warmup")]
    pub worker_warmup: String,

    /// How long the force-scan window stays open after a first interrupt.
    #[serde(default = "default_force_scan_window")]
    pub force_scan_window: String,

    /// Pause between forced runs inside the window.
    #[serde(default = "default_force_scan_interval")]
    pub force_scan_interval: String,

    /// Crashed starts tolerated per `ensure_running` call.
    #[serde(default = "default_restart_attempts")]
    pub restart_attempts: u32,

    /// Printed after the path of a changed database file.
    #[serde(default = "default_db_change_advice")]
    pub db_change_advice: String,
}

fn default_full_scan_every() -> u32 {
    10
}

fn default_tick_interval() -> String {
    "2s".to_string()
}

fn default_worker_warmup() -> String {
    "3s".to_string()
}

fn default_force_scan_window() -> String {
    "10s".to_string()
}

fn default_force_scan_interval() -> String {
    "3s".to_string()
}

fn default_restart_attempts() -> u32 {
    3
}

fn default_db_change_advice() -> String {
    "consider rake db:test:prepare".to_string()
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            full_scan_every: default_full_scan_every(),
            tick_interval: default_tick_interval(),
            worker_warmup: default_worker_warmup(),
            force_scan_window: default_force_scan_window(),
            force_scan_interval: default_force_scan_interval(),
            restart_attempts: default_restart_attempts(),
            db_change_advice: default_db_change_advice(),
        }
    }
}

/// `[worker]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkerSection {
    /// Shell command that starts the long-lived worker.
    #[serde(default = "default_start_cmd")]
    pub start_cmd: String,

    /// Shell command submitting one batch; `{tests}` becomes the
    /// space-separated test list.
    #[serde(default = "default_batch_cmd")]
    pub batch_cmd: String,

    /// How long to wait for the worker to exit after an interrupt.
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace: String,
}

fn default_start_cmd() -> String {
    "jruby --ng-server".to_string()
}

fn default_batch_cmd() -> String {
    r#"jruby --ng -I.:lib:test -rubygems -e "%w[{tests}].each { |f| require f }""#.to_string()
}

fn default_shutdown_grace() -> String {
    "5s".to_string()
}

impl Default for WorkerSection {
    fn default() -> Self {
        Self {
            start_cmd: default_start_cmd(),
            batch_cmd: default_batch_cmd(),
            shutdown_grace: default_shutdown_grace(),
        }
    }
}

/// `[filter]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterSection {
    /// Only paths matching this pattern are routed at all.
    #[serde(default = "default_eligible")]
    pub eligible: String,

    /// Eligible paths that are silently skipped (VCS metadata, temp dirs).
    #[serde(default = "default_excluded")]
    pub excluded: String,

    /// Batch output lines matching any of these are hidden unless
    /// `--full-trace` is given.
    #[serde(default = "default_noise")]
    pub noise: Vec<String>,
}

fn default_eligible() -> String {
    r".*\.(rb|erb|yml)$".to_string()
}

fn default_excluded() -> String {
    r"(\.git|tmp)/.*".to_string()
}

fn default_noise() -> Vec<String> {
    vec![
        r".*/jruby-[^/]+/.*".to_string(),
        r".*(RubyBasicObject|RubyKernel|RubyProc|RubyArray).*".to_string(),
    ]
}

impl Default for FilterSection {
    fn default() -> Self {
        Self {
            eligible: default_eligible(),
            excluded: default_excluded(),
            noise: default_noise(),
        }
    }
}

/// One `[[rule]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    /// Pattern matched from the start of the root-relative path.
    pub pattern: String,

    /// Literal paths (possibly with SINGULAR/PLURAL), `ALL`, a `[types]`
    /// name, or one of `SELF`, `IGNORE`, `DBCHANGE`.
    pub targets: Vec<String>,
}

/// Parsed durations from `[config]` and `[worker]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub tick_interval: Duration,
    pub worker_warmup: Duration,
    pub force_scan_window: Duration,
    pub force_scan_interval: Duration,
    pub shutdown_grace: Duration,
}

/// Validated configuration: patterns compiled, targets classified,
/// durations parsed.
///
/// Only produced through `TryFrom<RawConfigFile>` (see `validate.rs`).
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub full_scan_every: u32,
    pub restart_attempts: u32,
    pub db_change_advice: String,
    pub timing: Timing,
    pub start_cmd: String,
    pub batch_cmd: String,
    pub router: RuleRouter,
    pub types: TestTypes,
    pub noise: Vec<Regex>,
}
