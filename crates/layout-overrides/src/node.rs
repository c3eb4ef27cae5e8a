/*
 * node.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Document tree representation.
//!
//! Layout documents arrive as YAML (or JSON) and have no schema the engine
//! knows about. They are modelled as a small tagged tree: scalars, ordered
//! sequences, and records with string keys. Records keep insertion order so
//! that re-serialized output matches the input layout.

use indexmap::IndexMap;

/// A keyed mapping with insertion order preserved.
pub type Record = IndexMap<String, Node>;

/// Atomic document values.
#[derive(Debug, Clone)]
pub enum Scalar {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

/// A node of a layout document.
#[derive(Debug, Clone)]
pub enum Node {
    /// Atomic values (strings, numbers, booleans, null).
    Scalar(Scalar),

    /// Ordered sequences. Never merged item-wise.
    Sequence(Vec<Node>),

    /// Keyed records. The only nodes that can be elements.
    Record(Record),
}

impl Node {
    /// Create a null node.
    pub fn null() -> Self {
        Node::Scalar(Scalar::Null)
    }

    /// Create a string node.
    pub fn string(value: impl Into<String>) -> Self {
        Node::Scalar(Scalar::String(value.into()))
    }

    /// Create an empty record node.
    pub fn empty_record() -> Self {
        Node::Record(Record::new())
    }

    /// Build a record node from key/value pairs, keeping their order.
    pub fn record<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Node)>,
    {
        Node::Record(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Node::Scalar(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, Node::Sequence(_))
    }

    pub fn is_record(&self) -> bool {
        matches!(self, Node::Record(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Scalar(Scalar::Null))
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Node::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_record_mut(&mut self) -> Option<&mut Record> {
        match self {
            Node::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self {
            Node::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Numeric value of integer and float scalars.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Node::Scalar(Scalar::Integer(i)) => Some(*i as f64),
            Node::Scalar(Scalar::Float(f)) => Some(*f),
            _ => None,
        }
    }

    /// Look up an attribute. Non-record nodes have no attributes.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_record().and_then(|record| record.get(key))
    }

    /// Turn this node into a record if it is not one already, and return it.
    ///
    /// Any previous non-record value is discarded.
    pub fn make_record(&mut self) -> &mut Record {
        if !self.is_record() {
            *self = Node::empty_record();
        }
        match self {
            Node::Record(record) => record,
            _ => unreachable!("node was just replaced by a record"),
        }
    }

    /// The text a pattern filter is tested against.
    ///
    /// Null becomes the empty string and numbers use their shortest decimal
    /// form. Sequences join their items with commas; records collapse to
    /// `[object Object]`.
    pub fn to_match_string(&self) -> String {
        match self {
            Node::Scalar(scalar) => scalar.to_match_string(),
            Node::Sequence(items) => items
                .iter()
                .map(|item| {
                    if item.is_null() {
                        String::new()
                    } else {
                        item.to_match_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(","),
            Node::Record(_) => "[object Object]".to_string(),
        }
    }

    /// Loose numeric reading of any node.
    ///
    /// Null and `false` are `0`, `true` is `1`. Strings must be a complete
    /// number literal (surrounding whitespace allowed, blank is `0`). A
    /// sequence reads as its text form, so `[50]` is `50` and `[1, 2]` is
    /// NaN. Records are NaN.
    pub fn to_number(&self) -> f64 {
        match self {
            Node::Scalar(Scalar::Null) => 0.0,
            Node::Scalar(Scalar::Bool(b)) => f64::from(u8::from(*b)),
            Node::Scalar(Scalar::Integer(i)) => *i as f64,
            Node::Scalar(Scalar::Float(f)) => *f,
            Node::Scalar(Scalar::String(s)) => parse_number_literal(s),
            Node::Sequence(_) => parse_number_literal(&self.to_match_string()),
            Node::Record(_) => f64::NAN,
        }
    }
}

fn parse_number_literal(text: &str) -> f64 {
    let text = text.trim();
    if text.is_empty() {
        return 0.0;
    }
    match text {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match text.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return u64::from_str_radix(&text[2..], radix).map_or(f64::NAN, |n| n as f64);
    }

    if !text
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return f64::NAN;
    }
    text.parse().unwrap_or(f64::NAN)
}

impl Scalar {
    fn to_match_string(&self) -> String {
        match self {
            Scalar::Null => String::new(),
            Scalar::Bool(b) => b.to_string(),
            Scalar::Integer(i) => i.to_string(),
            Scalar::Float(f) => format_number(*f),
            Scalar::String(s) => s.clone(),
        }
    }
}

/// Format a number the way it is written back into documents.
///
/// Integral values drop their fractional part (`100`, not `100.0`). Very
/// large and very small magnitudes use exponent form (`1e+21`, `1.5e-7`).
pub(crate) fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if value == 0.0 {
        "0".to_string()
    } else if value.abs() >= 1e21 || value.abs() < 1e-6 {
        exponent_form(value)
    } else {
        value.to_string()
    }
}

fn exponent_form(value: f64) -> String {
    let text = format!("{:e}", value);
    match text.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => text,
    }
}

/// Structural equality.
///
/// Records compare without regard to key order. Integers and floats compare
/// by numeric value, so `1` equals `1.0`; NaN equals nothing.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Node::Scalar(a), Node::Scalar(b)) => a == b,
            (Node::Sequence(a), Node::Sequence(b)) => a == b,
            (Node::Record(a), Node::Record(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(key, value)| b.get(key).is_some_and(|other| value == other))
            }
            _ => false,
        }
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scalar::Null, Scalar::Null) => true,
            (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
            (Scalar::String(a), Scalar::String(b)) => a == b,
            (Scalar::Integer(a), Scalar::Integer(b)) => a == b,
            (Scalar::Float(a), Scalar::Float(b)) => a == b,
            (Scalar::Integer(a), Scalar::Float(b)) | (Scalar::Float(b), Scalar::Integer(a)) => {
                *a as f64 == *b
            }
            _ => false,
        }
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::Scalar(Scalar::Bool(value))
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Node::Scalar(Scalar::Integer(value))
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Node::Scalar(Scalar::Float(value))
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::string(value)
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::string(value)
    }
}

impl From<Vec<Node>> for Node {
    fn from(items: Vec<Node>) -> Self {
        Node::Sequence(items)
    }
}

impl From<Record> for Node {
    fn from(record: Record) -> Self {
        Node::Record(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_equality_ignores_key_order() {
        let a = Node::record([("x", Node::from(1_i64)), ("y", Node::from("two"))]);
        let b = Node::record([("y", Node::from("two")), ("x", Node::from(1_i64))]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_record_equality_requires_same_keys() {
        let a = Node::record([("x", Node::from(1_i64))]);
        let b = Node::record([("x", Node::from(1_i64)), ("y", Node::null())]);
        assert_ne!(a, b);
        assert_ne!(b, a);
    }

    #[test]
    fn test_sequence_equality_is_ordered() {
        let a = Node::from(vec![Node::from(1_i64), Node::from(2_i64)]);
        let b = Node::from(vec![Node::from(2_i64), Node::from(1_i64)]);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_numeric_equality_across_kinds() {
        assert_eq!(Node::from(1_i64), Node::from(1.0));
        assert_ne!(Node::from(1_i64), Node::from(1.5));
        assert_ne!(Node::from(f64::NAN), Node::from(f64::NAN));
    }

    #[test]
    fn test_scalar_kinds_do_not_coerce() {
        assert_ne!(Node::from("1"), Node::from(1_i64));
        assert_ne!(Node::from(true), Node::from(1_i64));
        assert_ne!(Node::null(), Node::from(""));
    }

    #[test]
    fn test_make_record_replaces_scalar() {
        let mut node = Node::from("flat");
        node.make_record().insert("k".into(), Node::from(1_i64));
        assert_eq!(node, Node::record([("k", Node::from(1_i64))]));
    }

    #[test]
    fn test_make_record_keeps_existing_record() {
        let mut node = Node::record([("a", Node::from(1_i64))]);
        node.make_record();
        assert_eq!(node.get("a"), Some(&Node::from(1_i64)));
    }

    #[test]
    fn test_match_string_forms() {
        assert_eq!(Node::null().to_match_string(), "");
        assert_eq!(Node::from(true).to_match_string(), "true");
        assert_eq!(Node::from(42_i64).to_match_string(), "42");
        assert_eq!(Node::from(2.0).to_match_string(), "2");
        assert_eq!(Node::from(2.5).to_match_string(), "2.5");
        assert_eq!(
            Node::from(vec![Node::from("a"), Node::null(), Node::from(3_i64)]).to_match_string(),
            "a,,3"
        );
        assert_eq!(Node::empty_record().to_match_string(), "[object Object]");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(100.0), "100");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(33.33), "33.33");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
        assert_eq!(format_number(0.000001), "0.000001");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(-1.5e-7), "-1.5e-7");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(1.2345678901234568e20), "123456789012345680000");
    }

    #[test]
    fn test_to_number() {
        assert_eq!(Node::null().to_number(), 0.0);
        assert_eq!(Node::from(true).to_number(), 1.0);
        assert_eq!(Node::from(false).to_number(), 0.0);
        assert_eq!(Node::from(7_i64).to_number(), 7.0);
        assert_eq!(Node::from(" 12.5 ").to_number(), 12.5);
        assert_eq!(Node::from("").to_number(), 0.0);
        assert_eq!(Node::from("0x10").to_number(), 16.0);
        assert_eq!(Node::from("-Infinity").to_number(), f64::NEG_INFINITY);
        assert!(Node::from("50%").to_number().is_nan());
        assert!(Node::from("inf").to_number().is_nan());
        assert_eq!(Node::Sequence(vec![Node::from(50_i64)]).to_number(), 50.0);
        assert_eq!(Node::Sequence(vec![]).to_number(), 0.0);
        assert!(Node::Sequence(vec![Node::from(1_i64), Node::from(2_i64)]).to_number().is_nan());
        assert!(Node::empty_record().to_number().is_nan());
    }

    #[test]
    fn test_get_on_non_record() {
        assert!(Node::from("x").get("anything").is_none());
        assert!(Node::Sequence(vec![]).get("0").is_none());
    }
}
