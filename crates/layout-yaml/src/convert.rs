/*
 * convert.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Conversions between parser values and [`Node`].

use layout_overrides::{Node, Record, Scalar};
use yaml_rust2::Yaml;
use yaml_rust2::yaml::Hash;

/// Convert a loaded YAML value.
///
/// Scalar mapping keys are stringified (`1: x` has key `"1"`). Sequence or
/// mapping keys cannot name an attribute and are dropped.
pub fn node_from_yaml(value: &Yaml) -> Node {
    match value {
        Yaml::Null | Yaml::BadValue | Yaml::Alias(_) => Node::null(),
        Yaml::Boolean(b) => Node::from(*b),
        Yaml::Integer(n) => Node::from(*n),
        Yaml::Real(s) => match value.as_f64() {
            Some(f) => Node::from(f),
            None => Node::string(s.clone()),
        },
        Yaml::String(s) => Node::string(s.clone()),
        Yaml::Array(items) => Node::Sequence(items.iter().map(node_from_yaml).collect()),
        Yaml::Hash(entries) => {
            let mut record = Record::with_capacity(entries.len());
            for (key, value) in entries {
                match yaml_key(key) {
                    Some(key) => {
                        record.insert(key, node_from_yaml(value));
                    }
                    None => tracing::warn!(?key, "Dropping mapping entry with a non-scalar key"),
                }
            }
            Node::Record(record)
        }
    }
}

fn yaml_key(key: &Yaml) -> Option<String> {
    match key {
        Yaml::String(s) | Yaml::Real(s) => Some(s.clone()),
        Yaml::Integer(n) => Some(n.to_string()),
        Yaml::Boolean(b) => Some(b.to_string()),
        Yaml::Null => Some("null".to_string()),
        _ => None,
    }
}

/// Convert a node back into a YAML value for emitting.
pub fn node_to_yaml(node: &Node) -> Yaml {
    match node {
        Node::Scalar(scalar) => match scalar {
            Scalar::Null => Yaml::Null,
            Scalar::Bool(b) => Yaml::Boolean(*b),
            Scalar::Integer(n) => Yaml::Integer(*n),
            Scalar::Float(f) => Yaml::Real(yaml_float(*f)),
            Scalar::String(s) => Yaml::String(s.clone()),
        },
        Node::Sequence(items) => Yaml::Array(items.iter().map(node_to_yaml).collect()),
        Node::Record(record) => {
            let mut hash = Hash::new();
            for (key, value) in record {
                hash.insert(Yaml::String(key.clone()), node_to_yaml(value));
            }
            Yaml::Hash(hash)
        }
    }
}

fn yaml_float(value: f64) -> String {
    if value.is_nan() {
        ".nan".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { ".inf" } else { "-.inf" }.to_string()
    } else {
        // Debug keeps the fractional part, so `2.0` is read back as a float.
        format!("{:?}", value)
    }
}

/// Convert a parsed JSON value.
///
/// Numbers that fit an `i64` become integers, all others floats.
pub fn node_from_json(value: &serde_json::Value) -> Node {
    match value {
        serde_json::Value::Null => Node::null(),
        serde_json::Value::Bool(b) => Node::from(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Node::from(i),
            None => n.as_f64().map_or_else(Node::null, Node::from),
        },
        serde_json::Value::String(s) => Node::string(s.clone()),
        serde_json::Value::Array(items) => {
            Node::Sequence(items.iter().map(node_from_json).collect())
        }
        serde_json::Value::Object(map) => Node::Record(
            map.iter()
                .map(|(key, value)| (key.clone(), node_from_json(value)))
                .collect(),
        ),
    }
}
