// src/session/dirty.rs

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::routing::{DirtyTarget, GroupToken, TestTypes};

/// Test path -> dirty flag.
///
/// Only concrete test paths are stored. Group tokens are expanded against
/// the entries registered at the moment they are marked, so `ALL` on an
/// empty registry marks nothing. Entries are never removed.
#[derive(Debug)]
pub struct DirtyRegistry {
    types: TestTypes,
    tests: BTreeMap<String, bool>,
}

impl DirtyRegistry {
    pub fn new(types: TestTypes) -> Self {
        Self {
            types,
            tests: BTreeMap::new(),
        }
    }

    pub fn mark_dirty<'a, I>(&mut self, targets: I)
    where
        I: IntoIterator<Item = &'a DirtyTarget>,
    {
        for target in targets {
            match target {
                DirtyTarget::Test(path) => {
                    self.tests.insert(path.clone(), true);
                }
                DirtyTarget::Group(token) => self.mark_group(token),
            }
        }
    }

    pub fn mark_group(&mut self, token: &GroupToken) {
        match token {
            GroupToken::All => {
                for dirty in self.tests.values_mut() {
                    *dirty = true;
                }
                debug!(count = self.tests.len(), "marked every registered test dirty");
            }
            GroupToken::Type(name) => {
                if !self.types.contains(name) {
                    warn!(token = %name, "unknown test type token; nothing marked");
                    return;
                }
                let types = &self.types;
                let mut marked = 0usize;
                for (path, dirty) in self.tests.iter_mut() {
                    if types.classifies(name, path) == Some(true) {
                        *dirty = true;
                        marked += 1;
                    }
                }
                debug!(token = %name, marked, "marked test type dirty");
            }
        }
    }

    pub fn has_dirty(&self) -> bool {
        self.tests.values().any(|d| *d)
    }

    pub fn is_dirty(&self, path: &str) -> bool {
        self.tests.get(path).copied().unwrap_or(false)
    }

    /// Dirty test paths in sorted order.
    pub fn dirty(&self) -> Vec<String> {
        self.tests
            .iter()
            .filter(|(_, d)| **d)
            .map(|(p, _)| p.clone())
            .collect()
    }

    pub fn clear(&mut self, path: &str) {
        if let Some(dirty) = self.tests.get_mut(path) {
            *dirty = false;
        }
    }

    /// Every registered test path, clean or dirty.
    pub fn registered(&self) -> impl Iterator<Item = &str> {
        self.tests.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}
