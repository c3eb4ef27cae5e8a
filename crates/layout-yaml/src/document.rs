/*
 * document.rs
 * Copyright (c) 2025 Posit, PBC
 */

use crate::convert::{node_from_yaml, node_to_yaml};
use crate::error::Result;
use layout_overrides::Node;
use yaml_rust2::{YamlEmitter, YamlLoader};

/// Parse the first YAML document in `text`.
///
/// Returns `Ok(None)` when there is no document at all (blank input or
/// comments only).
pub fn load_document(text: &str) -> Result<Option<Node>> {
    let docs = YamlLoader::load_from_str(text)?;
    if docs.len() > 1 {
        tracing::debug!(documents = docs.len(), "Ignoring documents after the first");
    }
    Ok(docs.first().map(node_from_yaml))
}

/// Serialize `document` as YAML.
///
/// Key order follows the node. No document marker is written and the text
/// ends with a newline.
pub fn dump_document(document: &Node) -> Result<String> {
    let mut out = String::new();
    YamlEmitter::new(&mut out).dump(&node_to_yaml(document))?;

    let body = out
        .strip_prefix("---\n")
        .or_else(|| out.strip_prefix("---"))
        .unwrap_or(&out)
        .trim_start_matches(' ');
    let mut text = body.to_string();
    text.push('\n');
    Ok(text)
}
