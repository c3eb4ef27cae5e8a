/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Rule-based overrides for nested layout documents.
//!
//! A layout document is a tree of records and sequences in which records
//! listed under an `elements` attribute are *elements*. Override rules pick
//! elements with a filter specification and merge a payload into them;
//! matched elements can also have their `style.scale` percentage rescaled.
//!
//! The crate does no I/O. Parsing and serializing documents is left to the
//! caller (see the `layout-yaml` crate).
//!
//! # Key Features
//!
//! - **Filters**: literal equality, `/regex/flags` strings and nested records
//! - **Deep merge**: records merge recursively, everything else is replaced
//! - **Ordered rules**: rules apply in list order and see each other's effects
//! - **Scaling**: compounding percentage scale, either for matched elements or,
//!   with no rules at all, for every element
//!
//! # Example
//!
//! ```rust
//! use layout_overrides::{Node, RuleSet, apply_overrides};
//!
//! let mut layout = Node::record([(
//!     "elements",
//!     Node::Sequence(vec![Node::record([("type", Node::from("light"))])]),
//! )]);
//! let rules = RuleSet::from_node(&Node::Sequence(vec![Node::record([
//!     ("filters", Node::record([("type", Node::from("light"))])),
//!     ("overrides", Node::record([("icon", Node::from("mdi:lamp"))])),
//! ])]));
//!
//! let report = apply_overrides(&mut layout, &rules, 1.0);
//! assert_eq!(report.elements_matched, 1);
//! ```

mod engine;
mod error;
mod filter;
mod merge;
mod node;
mod rule;
mod scale;
mod traverse;

pub use engine::{
    OverrideEngine,
    OverrideMode,
    OverrideOptions,
    OverrideReport,
    apply_overrides,
    apply_overrides_to_copy,
    apply_overrides_with_options,
};

pub use error::PatternError;

pub use filter::{
    Expectation,
    FilterPattern,
    FilterSpec,
    matches_filters,
    matches_record,
};

pub use merge::{deep_merge, merge_payload, merge_rule};

pub use node::{Node, Record, Scalar};

pub use rule::{FILTERS_KEY, OVERRIDES_KEY, Rule, RuleSet};

pub use scale::{SCALE_KEY, STYLE_KEY, apply_scale, format_percent, is_effective_factor};

pub use traverse::{DEFAULT_CHILD_KEY, count_elements, for_each_element, traverse};
