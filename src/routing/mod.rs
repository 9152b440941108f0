// src/routing/mod.rs

//! Change-to-test routing.
//!
//! A changed path is first run through a coarse eligibility filter, then
//! through an ordered rule table where the first matching pattern wins.
//! The matching rule's targets turn into [`DirtyTarget`]s: concrete test
//! paths, or group tokens that are expanded later by the dirty registry.
//!
//! - [`inflect`] holds the singular/plural heuristics for templates.
//! - [`rules`] holds the compiled table and the [`RuleRouter`].

pub mod inflect;
pub mod rules;

pub use inflect::{derive_plural, derive_singular, NameCapture};
pub use rules::{ChangeRule, RuleRouter, TestTypes};

/// Token naming a group of registered tests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroupToken {
    /// Every registered test.
    All,
    /// Registered tests whose path matches the named type pattern.
    Type(String),
}

/// Control tokens that change what happens to the file itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlToken {
    /// The changed file is itself the test.
    SelfPath,
    /// Never track this file.
    Ignore,
    /// Schema/migration file: print an advisory and never track it.
    DbChange,
}

/// One compiled entry of a rule's target list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Test path template with optional `SINGULAR` / `PLURAL` placeholders.
    Literal(String),
    Group(GroupToken),
    Control(ControlToken),
}

/// What a tracked file marks dirty when it changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DirtyTarget {
    Test(String),
    Group(GroupToken),
}

impl DirtyTarget {
    pub fn test(path: impl Into<String>) -> Self {
        DirtyTarget::Test(path.into())
    }
}

/// Why a path ended up permanently skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Failed the eligibility filter.
    Ineligible,
    /// Failed the eligibility filter and sits under an excluded directory;
    /// not worth reporting.
    Excluded,
    /// Matched a rule with `IGNORE`.
    Ignored,
    /// Matched a rule with `DBCHANGE`.
    DbChange,
    /// A literal template needed a capture the rule did not provide.
    RoutingFailure { template: String },
}

impl SkipReason {
    /// Whether the path belongs in the skipped-files report.
    pub fn is_reported(&self) -> bool {
        !matches!(self, SkipReason::Excluded)
    }
}

/// Result of routing one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    Skipped(SkipReason),
    /// Eligible, but no rule matched.
    Unmapped,
    Derived(Vec<DirtyTarget>),
}
