#![allow(dead_code)]

use std::collections::BTreeMap;

use warmrun::config::{
    ConfigFile, ConfigSection, FilterSection, RawConfigFile, RuleConfig, WorkerSection,
};

/// Builder for `ConfigFile` to simplify test setup.
///
/// Starts from the built-in sections with every timing set to zero and no
/// types or rules.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection {
                    tick_interval: "0ms".to_string(),
                    worker_warmup: "0ms".to_string(),
                    force_scan_window: "0ms".to_string(),
                    force_scan_interval: "0ms".to_string(),
                    ..ConfigSection::default()
                },
                worker: WorkerSection {
                    start_cmd: "true".to_string(),
                    batch_cmd: "echo {tests}".to_string(),
                    shutdown_grace: "100ms".to_string(),
                },
                filter: FilterSection::default(),
                types: BTreeMap::new(),
                rules: Vec::new(),
            },
        }
    }

    pub fn with_type(mut self, name: &str, pattern: &str) -> Self {
        self.config
            .types
            .insert(name.to_string(), pattern.to_string());
        self
    }

    pub fn with_rule(mut self, pattern: &str, targets: &[&str]) -> Self {
        self.config.rules.push(RuleConfig {
            pattern: pattern.to_string(),
            targets: targets.iter().map(|t| t.to_string()).collect(),
        });
        self
    }

    pub fn with_eligible(mut self, pattern: &str) -> Self {
        self.config.filter.eligible = pattern.to_string();
        self
    }

    pub fn with_noise(mut self, pattern: &str) -> Self {
        self.config.filter.noise.push(pattern.to_string());
        self
    }

    pub fn with_full_scan_every(mut self, every: u32) -> Self {
        self.config.config.full_scan_every = every;
        self
    }

    pub fn with_restart_attempts(mut self, attempts: u32) -> Self {
        self.config.config.restart_attempts = attempts;
        self
    }

    pub fn with_force_scan_window(mut self, window: &str) -> Self {
        self.config.config.force_scan_window = window.to_string();
        self
    }

    pub fn with_tick_interval(mut self, tick: &str) -> Self {
        self.config.config.tick_interval = tick.to_string();
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
