/*
 * rules.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Rule files: JSON with comments.

use crate::convert::node_from_json;
use crate::error::Result;
use layout_overrides::{Node, RuleSet};
use once_cell::sync::Lazy;
use regex::Regex;

static BLOCK_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());

// `//` preceded by `\` or `:` is kept, so URLs like `https://` survive.
static LINE_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)(^|[^\\:])//[^\r\n]*").unwrap());

/// Remove `/* ... */` and `//` comments from relaxed JSON.
///
/// This is a textual pass. Comment markers inside string literals are
/// removed too, except `://`.
pub fn strip_json_comments(text: &str) -> String {
    let without_blocks = BLOCK_COMMENT.replace_all(text, "");
    LINE_COMMENT
        .replace_all(&without_blocks, "${1}")
        .into_owned()
}

/// Parse rule text into a node.
///
/// Blank text is an empty rule list.
pub fn parse_rules(text: &str) -> Result<Node> {
    if text.trim().is_empty() {
        return Ok(Node::Sequence(Vec::new()));
    }
    let value: serde_json::Value = serde_json::from_str(&strip_json_comments(text))?;
    Ok(node_from_json(&value))
}

/// Parse and compile rule text.
pub fn load_rules(text: &str) -> Result<RuleSet> {
    let rules = RuleSet::from_node(&parse_rules(text)?);
    if rules.skipped() > 0 {
        tracing::warn!(skipped = rules.skipped(), "Some rule entries are not objects");
    }
    Ok(rules)
}
