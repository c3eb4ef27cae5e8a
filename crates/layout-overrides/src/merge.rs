/*
 * merge.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Writing rule payloads into elements.
//!
//! Records merge key by key, recursively. Everything else (scalars and
//! whole sequences) replaces what was there. When a record meets a
//! non-record the record wins and the old value is dropped.

use crate::node::{Node, Record};
use crate::rule::{FILTERS_KEY, OVERRIDES_KEY, Rule};

/// Merge `source` over `target`, returning a new record.
///
/// Neither input is modified. Keys absent from `source` keep their `target`
/// value; new keys are appended after the existing ones.
pub fn deep_merge(target: &Record, source: &Record) -> Record {
    let mut output = target.clone();
    for (key, value) in source {
        let merged = merge_value(output.get(key), value);
        output.insert(key.clone(), merged);
    }
    output
}

fn merge_value(existing: Option<&Node>, incoming: &Node) -> Node {
    match incoming {
        Node::Record(source) => {
            let empty = Record::new();
            let base = existing.and_then(Node::as_record).unwrap_or(&empty);
            Node::Record(deep_merge(base, source))
        }
        _ => incoming.clone(),
    }
}

/// Apply a rule's payload to a matched element, in place.
///
/// `filters` and `overrides` keys are never written, whichever form the
/// rule was written in.
pub fn merge_rule(element: &mut Record, rule: &Rule) {
    merge_payload(element, rule.payload());
}

/// Apply a payload record to an element, in place.
pub fn merge_payload(element: &mut Record, payload: &Record) {
    for (key, value) in payload {
        if key == FILTERS_KEY || key == OVERRIDES_KEY {
            continue;
        }
        let merged = merge_value(element.get(key), value);
        element.insert(key.clone(), merged);
    }
}
