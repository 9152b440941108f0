// src/config/validate.rs

use std::collections::BTreeMap;
use std::time::Duration;

use regex::Regex;

use crate::config::duration::parse_duration;
use crate::config::model::{ConfigFile, RawConfigFile, RuleConfig, Timing};
use crate::errors::{Result, WarmrunError};
use crate::routing::{ChangeRule, ControlToken, GroupToken, RuleRouter, Target, TestTypes};

/// Placeholder the batch command must contain.
pub const TESTS_PLACEHOLDER: &str = "{tests}";

const RESERVED_TOKENS: &[&str] = &["ALL", "SELF", "IGNORE", "DBCHANGE"];

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::WarmrunError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        ensure_has_rules(&raw)?;
        validate_global_config(&raw)?;

        let timing = Timing {
            tick_interval: duration_field("config.tick_interval", &raw.config.tick_interval)?,
            worker_warmup: duration_field("config.worker_warmup", &raw.config.worker_warmup)?,
            force_scan_window: duration_field(
                "config.force_scan_window",
                &raw.config.force_scan_window,
            )?,
            force_scan_interval: duration_field(
                "config.force_scan_interval",
                &raw.config.force_scan_interval,
            )?,
            shutdown_grace: duration_field("worker.shutdown_grace", &raw.worker.shutdown_grace)?,
        };

        let types = compile_types(&raw.types)?;
        let router = RuleRouter::new(
            compile_anchored(&raw.filter.eligible)?,
            compile_anchored(&raw.filter.excluded)?,
            raw.rules
                .iter()
                .enumerate()
                .map(|(index, rule)| compile_rule(index, rule, &types))
                .collect::<Result<Vec<_>>>()?,
        );
        let noise = raw
            .filter
            .noise
            .iter()
            .map(|p| compile_anchored(p))
            .collect::<Result<Vec<_>>>()?;

        Ok(ConfigFile {
            full_scan_every: raw.config.full_scan_every,
            restart_attempts: raw.config.restart_attempts,
            db_change_advice: raw.config.db_change_advice,
            timing,
            start_cmd: raw.worker.start_cmd,
            batch_cmd: raw.worker.batch_cmd,
            router,
            types,
            noise,
        })
    }
}

/// Compile `pattern` so that it only matches from the start of a path.
pub fn compile_anchored(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{pattern})")).map_err(|source| WarmrunError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

fn ensure_has_rules(cfg: &RawConfigFile) -> Result<()> {
    if cfg.rules.is_empty() {
        return Err(WarmrunError::ConfigError(
            "config must contain at least one [[rule]] entry".to_string(),
        ));
    }
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.full_scan_every == 0 {
        return Err(WarmrunError::ConfigError(
            "[config].full_scan_every must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.config.restart_attempts == 0 {
        return Err(WarmrunError::ConfigError(
            "[config].restart_attempts must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.worker.start_cmd.trim().is_empty() {
        return Err(WarmrunError::ConfigError(
            "[worker].start_cmd must not be empty".to_string(),
        ));
    }
    if !cfg.worker.batch_cmd.contains(TESTS_PLACEHOLDER) {
        return Err(WarmrunError::ConfigError(format!(
            "[worker].batch_cmd must contain the {TESTS_PLACEHOLDER} placeholder"
        )));
    }
    Ok(())
}

fn duration_field(field: &str, value: &str) -> Result<Duration> {
    parse_duration(value)
        .map_err(|e| WarmrunError::ConfigError(format!("invalid duration for {field}: {e}")))
}

fn is_token(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_uppercase() || c == '_')
}

fn compile_types(raw: &BTreeMap<String, String>) -> Result<TestTypes> {
    let mut patterns = BTreeMap::new();
    for (name, pattern) in raw {
        if RESERVED_TOKENS.contains(&name.as_str()) {
            return Err(WarmrunError::ConfigError(format!(
                "[types].{name} shadows a built-in token"
            )));
        }
        if !is_token(name) {
            return Err(WarmrunError::ConfigError(format!(
                "[types].{name}: type names must be upper-case (A-Z and _)"
            )));
        }
        patterns.insert(name.clone(), compile_anchored(pattern)?);
    }
    Ok(TestTypes::new(patterns))
}

fn compile_rule(index: usize, rule: &RuleConfig, types: &TestTypes) -> Result<ChangeRule> {
    if rule.targets.is_empty() {
        return Err(WarmrunError::ConfigError(format!(
            "rule #{} ('{}') has no targets",
            index + 1,
            rule.pattern
        )));
    }
    let targets = rule
        .targets
        .iter()
        .map(|raw| parse_target(raw, types))
        .collect::<Result<Vec<_>>>()
        .map_err(|e| match e {
            WarmrunError::ConfigError(msg) => WarmrunError::ConfigError(format!(
                "rule #{} ('{}'): {msg}",
                index + 1,
                rule.pattern
            )),
            other => other,
        })?;
    Ok(ChangeRule::new(
        compile_anchored(&rule.pattern)?,
        rule.pattern.clone(),
        targets,
    ))
}

fn parse_target(raw: &str, types: &TestTypes) -> Result<Target> {
    let target = match raw {
        "SELF" => Target::Control(ControlToken::SelfPath),
        "IGNORE" => Target::Control(ControlToken::Ignore),
        "DBCHANGE" => Target::Control(ControlToken::DbChange),
        "ALL" => Target::Group(GroupToken::All),
        name if types.contains(name) => Target::Group(GroupToken::Type(name.to_string())),
        name if is_token(name) => {
            return Err(WarmrunError::ConfigError(format!(
                "unknown target token '{name}' (not SELF, IGNORE, DBCHANGE, ALL or a [types] name)"
            )));
        }
        "" => {
            return Err(WarmrunError::ConfigError(
                "empty target path".to_string(),
            ));
        }
        path => Target::Literal(path.to_string()),
    };
    Ok(target)
}
