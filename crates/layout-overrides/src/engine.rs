/*
 * engine.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The override pass.
//!
//! One walk over the document. With rules, each element is tested against
//! every rule in order, matching rules merge immediately (so later rules see
//! earlier ones), and elements that matched anything are rescaled once.
//! With an empty rule list (or no list at all) the pass only rescales, and
//! does so for every element.

use crate::merge::merge_rule;
use crate::node::Node;
use crate::rule::RuleSet;
use crate::scale::{apply_scale, is_effective_factor};
use crate::traverse::{DEFAULT_CHILD_KEY, traverse};

/// Which of the two passes ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverrideMode {
    /// No rules: every element is rescaled.
    #[default]
    ScaleOnly,

    /// Rules were given: only matched elements are changed.
    Rules,
}

/// Counters describing one override pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideReport {
    pub mode: OverrideMode,
    /// Elements reached by the walk.
    pub elements_visited: usize,
    /// Elements matched by at least one rule.
    pub elements_matched: usize,
    /// Total (element, rule) matches.
    pub rule_matches: usize,
    /// Elements whose scale was rewritten.
    pub elements_scaled: usize,
}

/// Options for an override pass.
#[derive(Debug, Clone, PartialEq)]
pub struct OverrideOptions {
    /// Multiplier for `style.scale` (default `1`, meaning no rescaling).
    pub scale_factor: f64,
    /// Attribute holding child elements (default `elements`).
    pub child_key: String,
}

impl Default for OverrideOptions {
    fn default() -> Self {
        Self {
            scale_factor: 1.0,
            child_key: DEFAULT_CHILD_KEY.to_string(),
        }
    }
}

impl OverrideOptions {
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    pub fn with_child_key(mut self, child_key: impl Into<String>) -> Self {
        self.child_key = child_key.into();
        self
    }
}

/// Apply `rules` to `document` in place, using the default child key.
///
/// The caller's document is modified; use [`apply_overrides_to_copy`] to
/// keep it.
pub fn apply_overrides(document: &mut Node, rules: &RuleSet, scale_factor: f64) -> OverrideReport {
    let options = OverrideOptions::default().with_scale_factor(scale_factor);
    apply_overrides_with_options(document, rules, &options)
}

/// Apply `rules` to a clone of `document`, leaving the original untouched.
pub fn apply_overrides_to_copy(
    document: &Node,
    rules: &RuleSet,
    scale_factor: f64,
) -> (Node, OverrideReport) {
    let mut copy = document.clone();
    let report = apply_overrides(&mut copy, rules, scale_factor);
    (copy, report)
}

/// Apply `rules` to `document` in place.
pub fn apply_overrides_with_options(
    document: &mut Node,
    rules: &RuleSet,
    options: &OverrideOptions,
) -> OverrideReport {
    if rules.entry_count() == 0 {
        return apply_scale_only(document, options);
    }

    tracing::debug!(
        rules = rules.len(),
        scale_factor = options.scale_factor,
        "Applying override rules"
    );

    let mut report = OverrideReport {
        mode: OverrideMode::Rules,
        ..Default::default()
    };
    let rescale = is_effective_factor(options.scale_factor);

    traverse(document, &options.child_key, &mut |element| {
        report.elements_visited += 1;

        let mut matched = 0;
        for rule in rules {
            if rule.matches(element) {
                merge_rule(element, rule);
                matched += 1;
            }
        }
        if matched == 0 {
            return;
        }

        tracing::trace!(rules = matched, "Element matched");
        report.elements_matched += 1;
        report.rule_matches += matched;
        apply_scale(element, options.scale_factor);
        if rescale {
            report.elements_scaled += 1;
        }
    });

    report
}

fn apply_scale_only(document: &mut Node, options: &OverrideOptions) -> OverrideReport {
    let mut report = OverrideReport::default();
    if !is_effective_factor(options.scale_factor) {
        tracing::debug!("No rules and no scale factor; document left unchanged");
        return report;
    }

    tracing::debug!(scale_factor = options.scale_factor, "Rescaling every element");
    traverse(document, &options.child_key, &mut |element| {
        report.elements_visited += 1;
        apply_scale(element, options.scale_factor);
        report.elements_scaled += 1;
    });
    report
}

/// A rule set bundled with its options, for processing several documents.
#[derive(Debug, Clone, Default)]
pub struct OverrideEngine {
    rules: RuleSet,
    options: OverrideOptions,
}

impl OverrideEngine {
    pub fn new(rules: RuleSet, options: OverrideOptions) -> Self {
        Self { rules, options }
    }

    /// Compile a rule document and bundle it with `options`.
    pub fn from_rules_node(rules: &Node, options: OverrideOptions) -> Self {
        Self::new(RuleSet::from_node(rules), options)
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn options(&self) -> &OverrideOptions {
        &self.options
    }

    /// Apply the rules to `document` in place.
    pub fn apply(&self, document: &mut Node) -> OverrideReport {
        apply_overrides_with_options(document, &self.rules, &self.options)
    }

    /// Apply the rules to a clone of `document`.
    pub fn apply_to_copy(&self, document: &Node) -> (Node, OverrideReport) {
        let mut copy = document.clone();
        let report = self.apply(&mut copy);
        (copy, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterSpec;
    use crate::node::Record;
    use crate::rule::Rule;
    use pretty_assertions::assert_eq;

    fn layout(elements: Vec<Node>) -> Node {
        Node::record([("elements", Node::Sequence(elements))])
    }

    fn rules(entries: Vec<Node>) -> RuleSet {
        RuleSet::from_node(&Node::Sequence(entries))
    }

    fn first_element(doc: &Node) -> &Node {
        &doc.get("elements").and_then(Node::as_sequence).unwrap()[0]
    }

    #[test]
    fn test_matching_rule_merges_style() {
        let mut doc = layout(vec![Node::record([
            ("type", Node::from("light")),
            ("name", Node::from("lamp1")),
        ])]);
        let rules = rules(vec![Node::record([
            ("filters", Node::record([("type", Node::from("light"))])),
            ("overrides", Node::record([("style", Node::record([("color", Node::from("red"))]))])),
        ])]);

        let report = apply_overrides(&mut doc, &rules, 1.0);

        assert_eq!(
            doc,
            layout(vec![Node::record([
                ("type", Node::from("light")),
                ("name", Node::from("lamp1")),
                ("style", Node::record([("color", Node::from("red"))])),
            ])])
        );
        assert_eq!(report.mode, OverrideMode::Rules);
        assert_eq!(report.elements_matched, 1);
        assert_eq!(report.elements_scaled, 0);
    }

    #[test]
    fn test_no_rules_rescales_every_element() {
        let mut doc = layout(vec![
            Node::record([
                ("type", Node::from("light")),
                ("style", Node::record([("scale", Node::from("50%"))])),
            ]),
            Node::record([("type", Node::from("switch"))]),
        ]);

        let report = apply_overrides(&mut doc, &RuleSet::empty(), 2.0);

        let items = doc.get("elements").and_then(Node::as_sequence).unwrap();
        assert_eq!(items[0].get("style").and_then(|s| s.get("scale")), Some(&Node::from("100%")));
        assert_eq!(items[1].get("style").and_then(|s| s.get("scale")), Some(&Node::from("200%")));
        assert_eq!(report.mode, OverrideMode::ScaleOnly);
        assert_eq!(report.elements_scaled, 2);
    }

    #[test]
    fn test_no_rules_and_unit_factor_changes_nothing() {
        let original = layout(vec![Node::record([("type", Node::from("light"))])]);
        let mut doc = original.clone();
        let report = apply_overrides(&mut doc, &RuleSet::empty(), 1.0);
        assert_eq!(doc, original);
        assert_eq!(report, OverrideReport::default());
    }

    #[test]
    fn test_later_rule_wins() {
        let mut doc = layout(vec![Node::record([("type", Node::from("light"))])]);
        let rules = rules(vec![
            Node::record([
                ("filters", Node::record([("type", Node::from("light"))])),
                ("a", Node::from(1_i64)),
            ]),
            Node::record([
                ("filters", Node::record([("type", Node::from("light"))])),
                ("a", Node::from(2_i64)),
            ]),
        ]);

        let report = apply_overrides(&mut doc, &rules, 1.0);

        assert_eq!(first_element(&doc).get("a"), Some(&Node::from(2_i64)));
        assert_eq!(report.rule_matches, 2);
        assert_eq!(report.elements_matched, 1);
    }

    #[test]
    fn test_later_rules_see_earlier_merges() {
        let mut doc = layout(vec![Node::record([("type", Node::from("light"))])]);
        let rules = rules(vec![
            Node::record([
                ("filters", Node::record([("type", Node::from("light"))])),
                ("overrides", Node::record([("room", Node::from("kitchen"))])),
            ]),
            Node::record([
                ("filters", Node::record([("room", Node::from("kitchen"))])),
                ("overrides", Node::record([("visible", Node::from(false))])),
            ]),
        ]);

        apply_overrides(&mut doc, &rules, 1.0);

        assert_eq!(first_element(&doc).get("visible"), Some(&Node::from(false)));
    }

    #[test]
    fn test_scale_applied_once_per_matched_element() {
        let mut doc = layout(vec![
            Node::record([("type", Node::from("light"))]),
            Node::record([("type", Node::from("switch"))]),
        ]);
        let always = |key: &str| {
            Node::record([
                ("filters", Node::record([("type", Node::from("light"))])),
                (key, Node::from(true)),
            ])
        };
        let rules = rules(vec![always("a"), always("b")]);

        let report = apply_overrides(&mut doc, &rules, 2.0);

        let items = doc.get("elements").and_then(Node::as_sequence).unwrap();
        assert_eq!(items[0].get("style").and_then(|s| s.get("scale")), Some(&Node::from("200%")));
        assert_eq!(items[1].get("style"), None);
        assert_eq!(report.elements_scaled, 1);
        assert_eq!(report.elements_visited, 2);
    }

    #[test]
    fn test_nested_elements_are_matched() {
        let mut doc = layout(vec![Node::record([
            ("type", Node::from("grid")),
            (
                "elements",
                Node::Sequence(vec![Node::record([("type", Node::from("light"))])]),
            ),
        ])]);
        let rules = rules(vec![Node::record([
            ("filters", Node::record([("type", Node::from("light"))])),
            ("color", Node::from("red")),
        ])]);

        let report = apply_overrides(&mut doc, &rules, 1.0);

        let inner = first_element(&doc)
            .get("elements")
            .and_then(Node::as_sequence)
            .unwrap();
        assert_eq!(inner[0].get("color"), Some(&Node::from("red")));
        assert_eq!(first_element(&doc).get("color"), None);
        assert_eq!(report.elements_visited, 2);
    }

    #[test]
    fn test_rules_never_write_reserved_keys() {
        let mut doc = layout(vec![Node::record([("type", Node::from("light"))])]);
        let rules = rules(vec![Node::record([
            ("filters", Node::record([("type", Node::from("light"))])),
            ("overrides", Node::record([("x", Node::from(1_i64))])),
        ])]);

        apply_overrides(&mut doc, &rules, 1.0);

        let element = first_element(&doc);
        assert!(element.get("filters").is_none());
        assert!(element.get("overrides").is_none());
        assert_eq!(element.get("x"), Some(&Node::from(1_i64)));
    }

    #[test]
    fn test_non_record_rules_are_skipped() {
        let mut doc = layout(vec![Node::record([("type", Node::from("light"))])]);
        let rules = rules(vec![
            Node::from(42_i64),
            Node::record([
                ("filters", Node::record([("type", Node::from("light"))])),
                ("x", Node::from(1_i64)),
            ]),
        ]);

        let report = apply_overrides(&mut doc, &rules, 1.0);

        assert_eq!(report.mode, OverrideMode::Rules);
        assert_eq!(first_element(&doc).get("x"), Some(&Node::from(1_i64)));
    }

    #[test]
    fn test_only_invalid_rules_stay_in_rules_mode() {
        let mut doc = layout(vec![Node::record([("type", Node::from("light"))])]);
        let rules = rules(vec![Node::from("junk")]);

        let report = apply_overrides(&mut doc, &rules, 2.0);

        assert_eq!(report.mode, OverrideMode::Rules);
        assert_eq!(report.elements_visited, 1);
        assert_eq!(report.elements_matched, 0);
        assert_eq!(report.elements_scaled, 0);
        assert_eq!(first_element(&doc), &Node::record([("type", Node::from("light"))]));
        assert!(first_element(&doc).get("style").and_then(|s| s.get("scale")).is_none());
    }

    #[test]
    fn test_copy_leaves_original_untouched() {
        let original = layout(vec![Node::record([("type", Node::from("light"))])]);
        let rules = RuleSet::new(vec![Rule::new(
            FilterSpec::new(),
            [("x".to_string(), Node::from(1_i64))].into_iter().collect::<Record>(),
        )]);

        let (updated, report) = apply_overrides_to_copy(&original, &rules, 1.0);

        assert!(first_element(&original).get("x").is_none());
        assert_eq!(first_element(&updated).get("x"), Some(&Node::from(1_i64)));
        assert_eq!(report.elements_matched, 1);
    }

    #[test]
    fn test_engine_with_custom_child_key() {
        let engine = OverrideEngine::from_rules_node(
            &Node::Sequence(vec![Node::record([
                ("filters", Node::record([("kind", Node::from("/^gau/"))])),
                ("min", Node::from(0_i64)),
            ])]),
            OverrideOptions::default()
                .with_child_key("cards")
                .with_scale_factor(0.5),
        );
        let doc = Node::record([(
            "cards",
            Node::Sequence(vec![
                Node::record([("kind", Node::from("gauge"))]),
                Node::record([("kind", Node::from("button"))]),
            ]),
        )]);

        let (updated, report) = engine.apply_to_copy(&doc);

        let cards = updated.get("cards").and_then(Node::as_sequence).unwrap();
        assert_eq!(cards[0].get("min"), Some(&Node::from(0_i64)));
        assert_eq!(cards[0].get("style").and_then(|s| s.get("scale")), Some(&Node::from("50%")));
        assert!(cards[1].get("min").is_none());
        assert_eq!(report.elements_visited, 2);
        assert_eq!(engine.rules().len(), 1);
    }
}
