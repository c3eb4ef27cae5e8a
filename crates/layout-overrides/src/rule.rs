/*
 * rule.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Override rules.
//!
//! A rule document is a list of records. Each record has a `filters`
//! section and a payload, written either as an `overrides` record or as the
//! rule's remaining keys:
//!
//! ```yaml
//! - filters: { type: light }
//!   overrides: { style: { color: red } }
//! - filters: { name: "/^kitchen_/" }
//!   visible: false
//! ```
//!
//! Rules are compiled once per run so patterns are not rebuilt per element.

use crate::filter::{FilterSpec, matches_record};
use crate::node::{Node, Record};

pub const FILTERS_KEY: &str = "filters";
pub const OVERRIDES_KEY: &str = "overrides";

/// One compiled override rule.
#[derive(Debug, Clone, Default)]
pub struct Rule {
    filters: FilterSpec,
    payload: Record,
}

impl Rule {
    pub fn new(filters: FilterSpec, payload: Record) -> Self {
        Rule { filters, payload }
    }

    /// Compile a rule record.
    ///
    /// A `filters` value that is not a record matches every element.
    pub fn from_record(record: &Record) -> Self {
        let filters = record
            .get(FILTERS_KEY)
            .and_then(Node::as_record)
            .map(FilterSpec::from_record)
            .unwrap_or_default();

        let payload = match record.get(OVERRIDES_KEY) {
            Some(Node::Record(overrides)) => overrides.clone(),
            _ => record
                .iter()
                .filter(|(key, _)| *key != FILTERS_KEY && *key != OVERRIDES_KEY)
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        };

        Rule { filters, payload }
    }

    pub fn filters(&self) -> &FilterSpec {
        &self.filters
    }

    pub fn payload(&self) -> &Record {
        &self.payload
    }

    pub fn matches(&self, element: &Record) -> bool {
        matches_record(element, &self.filters)
    }
}

/// An ordered list of rules. Order matters: later rules merge over earlier ones.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
    skipped: usize,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        RuleSet { rules, skipped: 0 }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Compile a rule document.
    ///
    /// Entries that are not records are skipped. Anything other than a
    /// sequence yields an empty rule set.
    pub fn from_node(node: &Node) -> Self {
        let Some(entries) = node.as_sequence() else {
            if !node.is_null() {
                tracing::debug!("Rule document is not a list; no rules applied");
            }
            return Self::empty();
        };

        let mut rules = Vec::with_capacity(entries.len());
        let mut skipped = 0;
        for (index, entry) in entries.iter().enumerate() {
            match entry {
                Node::Record(record) => rules.push(Rule::from_record(record)),
                _ => {
                    tracing::debug!(index, "Skipping rule entry that is not a record");
                    skipped += 1;
                }
            }
        }
        RuleSet { rules, skipped }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Number of entries in the source list, skipped ones included.
    ///
    /// A list of only malformed entries still counts as a rule list: nothing
    /// matches it, but it does not fall back to rescaling every element.
    pub fn entry_count(&self) -> usize {
        self.rules.len() + self.skipped
    }

    /// Number of entries dropped by [`RuleSet::from_node`].
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        RuleSet::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
