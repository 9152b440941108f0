// src/routing/rules.rs

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use tracing::{debug, warn};

use super::inflect::NameCapture;
use super::{ControlToken, DirtyTarget, RouteOutcome, SkipReason, Target};

/// A compiled `[[rule]]` entry.
#[derive(Clone)]
pub struct ChangeRule {
    pattern: Regex,
    source: String,
    targets: Vec<Target>,
}

impl fmt::Debug for ChangeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeRule")
            .field("pattern", &self.source)
            .field("targets", &self.targets)
            .finish()
    }
}

impl ChangeRule {
    /// `pattern` must already be anchored (see `config::validate`).
    pub fn new(pattern: Regex, source: impl Into<String>, targets: Vec<Target>) -> Self {
        Self {
            pattern,
            source: source.into(),
            targets,
        }
    }

    /// The pattern as written in the config.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }
}

/// Named test-type classification patterns (`[types]`).
#[derive(Clone, Default)]
pub struct TestTypes {
    patterns: BTreeMap<String, Regex>,
}

impl fmt::Debug for TestTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.patterns.keys()).finish()
    }
}

impl TestTypes {
    pub fn new(patterns: BTreeMap<String, Regex>) -> Self {
        Self { patterns }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.patterns.contains_key(name)
    }

    /// `None` when the type is unknown.
    pub fn classifies(&self, name: &str, test_path: &str) -> Option<bool> {
        self.patterns.get(name).map(|re| re.is_match(test_path))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Regex)> {
        self.patterns.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Evaluates a path against the eligibility filters and the rule table.
#[derive(Debug, Clone)]
pub struct RuleRouter {
    eligible: Regex,
    excluded: Regex,
    rules: Vec<ChangeRule>,
}

impl RuleRouter {
    pub fn new(eligible: Regex, excluded: Regex, rules: Vec<ChangeRule>) -> Self {
        Self {
            eligible,
            excluded,
            rules,
        }
    }

    pub fn rules(&self) -> &[ChangeRule] {
        &self.rules
    }

    /// Route a root-relative path (`"app/models/article.rb"`).
    ///
    /// Only the first matching rule is ever consulted.
    pub fn route(&self, path: &str) -> RouteOutcome {
        if !self.eligible.is_match(path) {
            let reason = if self.excluded.is_match(path) {
                SkipReason::Excluded
            } else {
                SkipReason::Ineligible
            };
            return RouteOutcome::Skipped(reason);
        }

        let Some((index, rule, caps)) = self
            .rules
            .iter()
            .enumerate()
            .find_map(|(i, rule)| rule.pattern.captures(path).map(|c| (i, rule, c)))
        else {
            return RouteOutcome::Unmapped;
        };

        debug!(path, rule = index, pattern = %rule.source, "rule matched");

        let capture = caps
            .name("singular")
            .map(|m| NameCapture::Singular(m.as_str()))
            .or_else(|| caps.name("plural").map(|m| NameCapture::Plural(m.as_str())));
        let whole = caps.get(0).map_or(path, |m| m.as_str());

        let mut derived: Vec<DirtyTarget> = Vec::with_capacity(rule.targets.len());
        for target in &rule.targets {
            let next = match target {
                Target::Control(ControlToken::Ignore) => {
                    return RouteOutcome::Skipped(SkipReason::Ignored);
                }
                Target::Control(ControlToken::DbChange) => {
                    return RouteOutcome::Skipped(SkipReason::DbChange);
                }
                Target::Control(ControlToken::SelfPath) => DirtyTarget::test(whole),
                Target::Group(token) => DirtyTarget::Group(token.clone()),
                Target::Literal(template) => match &capture {
                    Some(capture) => DirtyTarget::Test(capture.fill(template)),
                    None => {
                        warn!(path, template = %template, "rule has no singular/plural capture for template");
                        return RouteOutcome::Skipped(SkipReason::RoutingFailure {
                            template: template.clone(),
                        });
                    }
                },
            };
            if !derived.contains(&next) {
                derived.push(next);
            }
        }

        RouteOutcome::Derived(derived)
    }
}
