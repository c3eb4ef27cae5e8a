/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Text formats for `layout-overrides`.
//!
//! Layout documents are YAML, loaded and dumped through `yaml-rust2`. Rule
//! files are relaxed JSON: plain JSON that may carry `//` and `/* */`
//! comments. Both are converted to and from [`layout_overrides::Node`].
//!
//! ```rust
//! use layout_yaml::{dump_document, load_document, load_rules};
//! use layout_overrides::apply_overrides;
//!
//! let mut layout = load_document("elements:\n  - type: light\n").unwrap().unwrap();
//! let rules = load_rules(r#"[
//!   // every light gets an icon
//!   { "filters": { "type": "light" }, "overrides": { "icon": "lamp" } }
//! ]"#).unwrap();
//!
//! apply_overrides(&mut layout, &rules, 1.0);
//! assert!(dump_document(&layout).unwrap().contains("icon: lamp"));
//! ```

mod convert;
mod document;
mod error;
mod rules;

pub use convert::{node_from_json, node_from_yaml, node_to_yaml};
pub use document::{dump_document, load_document};
pub use error::{LayoutYamlError, Result};
pub use rules::{load_rules, parse_rules, strip_json_comments};
