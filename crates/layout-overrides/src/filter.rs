/*
 * filter.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Element matching.
//!
//! A filter specification maps attribute names to expectations. Every
//! expectation must hold for an element to match:
//!
//! - a record expects the attribute to be a record matching it recursively
//! - a string shaped like `/pattern/flags` is a regular expression tested
//!   against the attribute's text form
//! - any other value must be structurally equal to the attribute
//!
//! Nothing in here fails. Malformed patterns and shape mismatches are
//! ordinary non-matches.

use crate::error::PatternError;
use crate::node::{Node, Record};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

/// `/body/flags`, where the body is a single line and flags are word characters.
static PATTERN_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/([^\n\r\x{2028}\x{2029}]*)/([A-Za-z0-9_]*)$")
        .expect("pattern shape regex is valid")
});

const KNOWN_FLAGS: &str = "dgimsuvy";

const WORD_CLASS: &str = "[0-9A-Za-z_]";
const NOT_WORD_CLASS: &str = "[^0-9A-Za-z_]";
const WORD_BOUNDARY: &str =
    "(?:(?<=[0-9A-Za-z_])(?![0-9A-Za-z_])|(?<![0-9A-Za-z_])(?=[0-9A-Za-z_]))";
const NOT_WORD_BOUNDARY: &str =
    "(?:(?<=[0-9A-Za-z_])(?=[0-9A-Za-z_])|(?<![0-9A-Za-z_])(?![0-9A-Za-z_]))";

/// A compiled `/pattern/flags` filter value.
///
/// Compilation happens once, when the rule is built. A pattern that fails to
/// compile is kept (with its error) and never matches.
#[derive(Debug, Clone)]
pub struct FilterPattern {
    source: String,
    compiled: Result<fancy_regex::Regex, PatternError>,
}

impl FilterPattern {
    /// Parse a filter string. Returns `None` if it is not pattern-shaped.
    pub fn parse(text: &str) -> Option<Self> {
        let captures = PATTERN_SHAPE.captures(text)?;
        let compiled = compile_pattern(&captures[1], &captures[2]);
        if let Err(error) = &compiled {
            tracing::debug!(pattern = text, error = %error, "Filter pattern will never match");
        }
        Some(FilterPattern {
            source: text.to_string(),
            compiled,
        })
    }

    /// The filter value as written, slashes and flags included.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The compile error, if the pattern is malformed.
    pub fn error(&self) -> Option<&PatternError> {
        self.compiled.as_ref().err()
    }

    pub fn is_valid(&self) -> bool {
        self.compiled.is_ok()
    }

    /// Test `text`. A pattern that gives up while backtracking does not match.
    pub fn is_match(&self, text: &str) -> bool {
        let Ok(regex) = &self.compiled else {
            return false;
        };
        regex.is_match(text).unwrap_or_else(|error| {
            tracing::debug!(pattern = %self.source, error = %error, "Filter pattern gave up");
            false
        })
    }
}

fn compile_pattern(body: &str, flags: &str) -> Result<fancy_regex::Regex, PatternError> {
    let mut seen = String::with_capacity(flags.len());
    for flag in flags.chars() {
        if !KNOWN_FLAGS.contains(flag) {
            return Err(PatternError::UnknownFlag { flag });
        }
        if seen.contains(flag) {
            return Err(PatternError::DuplicateFlag { flag });
        }
        seen.push(flag);
    }
    if seen.contains('u') && seen.contains('v') {
        return Err(PatternError::ConflictingFlags);
    }

    // `g` and `d` change nothing for a yes/no test; `u` and `v` are how the
    // engine reads text anyway.
    let inline: String = seen.chars().filter(|flag| "ims".contains(*flag)).collect();
    let mut pattern = String::with_capacity(body.len() + 16);
    if !inline.is_empty() {
        pattern.push_str(&format!("(?{})", inline));
    }
    let body = ascii_word_classes(body);
    if seen.contains('y') {
        pattern.push_str(&format!(r"\A(?:{})", body));
    } else {
        pattern.push_str(&body);
    }

    fancy_regex::Regex::new(&pattern).map_err(|error| PatternError::Syntax(error.to_string()))
}

/// Rewrite `\d`, `\w` and `\b` (and their negations) to their ASCII meaning.
///
/// Inside a character class only `\d` and `\w` are rewritten.
fn ascii_word_classes(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    let mut in_class = false;

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let Some(escaped) = chars.next() else {
                    out.push(c);
                    break;
                };
                let replacement = match (in_class, escaped) {
                    (false, 'd') => Some("[0-9]"),
                    (false, 'D') => Some("[^0-9]"),
                    (false, 'w') => Some(WORD_CLASS),
                    (false, 'W') => Some(NOT_WORD_CLASS),
                    (false, 'b') => Some(WORD_BOUNDARY),
                    (false, 'B') => Some(NOT_WORD_BOUNDARY),
                    (true, 'd') => Some("0-9"),
                    (true, 'w') => Some("0-9A-Za-z_"),
                    _ => None,
                };
                match replacement {
                    Some(text) => out.push_str(text),
                    None => {
                        out.push(c);
                        out.push(escaped);
                    }
                }
            }
            '[' if !in_class => {
                in_class = true;
                out.push(c);
            }
            ']' if in_class => {
                in_class = false;
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// What a filter expects of one attribute.
#[derive(Debug, Clone)]
pub enum Expectation {
    /// Wildcard; matches present and absent attributes alike.
    Any,

    /// Regular expression tested against the attribute's text form.
    Pattern(FilterPattern),

    /// The attribute must be a record matching this nested specification.
    Nested(FilterSpec),

    /// The attribute must be structurally equal to this value.
    /// `null` also accepts an absent attribute.
    Equals(Node),
}

impl Expectation {
    /// Interpret a filter value taken from a rule document.
    pub fn from_node(node: &Node) -> Self {
        match node {
            Node::Record(record) => Expectation::Nested(FilterSpec::from_record(record)),
            Node::Scalar(_) => match node.as_str().and_then(FilterPattern::parse) {
                Some(pattern) => Expectation::Pattern(pattern),
                None => Expectation::Equals(node.clone()),
            },
            Node::Sequence(_) => Expectation::Equals(node.clone()),
        }
    }

    /// Test an attribute value (`None` when the attribute is absent).
    pub fn matches(&self, actual: Option<&Node>) -> bool {
        match self {
            Expectation::Any => true,
            Expectation::Pattern(pattern) => {
                let text = actual.map(Node::to_match_string).unwrap_or_default();
                pattern.is_match(&text)
            }
            Expectation::Nested(spec) => match actual {
                Some(Node::Record(record)) => matches_record(record, spec),
                _ => false,
            },
            Expectation::Equals(expected) => match actual {
                Some(actual) => actual == expected,
                None => expected.is_null(),
            },
        }
    }
}

/// A filter specification: attribute name to expectation, all of which must hold.
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    entries: IndexMap<String, Expectation>,
}

impl FilterSpec {
    /// An empty specification, which matches everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an expectation (builder style).
    pub fn with(mut self, key: impl Into<String>, expectation: Expectation) -> Self {
        self.insert(key, expectation);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, expectation: Expectation) {
        self.entries.insert(key.into(), expectation);
    }

    /// Build a specification from a rule's `filters` record.
    pub fn from_record(record: &Record) -> Self {
        FilterSpec {
            entries: record
                .iter()
                .map(|(key, value)| (key.clone(), Expectation::from_node(value)))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Expectation> {
        self.entries.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Expectation)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }
}

/// Does `element` satisfy `filters`?
///
/// A non-record element is treated as a record without attributes.
pub fn matches_filters(element: &Node, filters: &FilterSpec) -> bool {
    filters
        .iter()
        .all(|(key, expectation)| expectation.matches(element.get(key)))
}

/// [`matches_filters`] for an element already known to be a record.
pub fn matches_record(element: &Record, filters: &FilterSpec) -> bool {
    filters
        .iter()
        .all(|(key, expectation)| expectation.matches(element.get(key)))
}
