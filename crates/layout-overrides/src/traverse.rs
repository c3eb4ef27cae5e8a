/*
 * traverse.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Element discovery.
//!
//! An element is any record sitting in a child list, the sequence stored
//! under the child key (`elements` by default) of some record. The walk is
//! pre-order: an element is visited before anything nested inside it, and
//! siblings are visited in document order. Records reachable through other
//! attributes are searched too, so child lists may appear at any depth.

use crate::node::{Node, Record};

/// Child-list attribute used by layout documents.
pub const DEFAULT_CHILD_KEY: &str = "elements";

/// Visit every element reachable from `node`, allowing mutation.
///
/// `visit` runs on an element before the element itself is searched, so
/// changes it makes (including to the element's own child list) are seen by
/// the rest of the walk. Each element position is visited exactly once.
pub fn traverse<F>(node: &mut Node, child_key: &str, visit: &mut F)
where
    F: FnMut(&mut Record),
{
    match node {
        Node::Scalar(_) => {}
        Node::Sequence(items) => {
            for item in items.iter_mut() {
                traverse(item, child_key, visit);
            }
        }
        Node::Record(record) => {
            if let Some(Node::Sequence(children)) = record.get_mut(child_key) {
                for child in children.iter_mut() {
                    if let Node::Record(element) = child {
                        visit(element);
                    }
                    traverse(child, child_key, visit);
                }
            }

            for (key, value) in record.iter_mut() {
                if key == child_key && value.is_sequence() {
                    continue;
                }
                traverse(value, child_key, visit);
            }
        }
    }
}

/// Read-only counterpart of [`traverse`].
pub fn for_each_element<F>(node: &Node, child_key: &str, visit: &mut F)
where
    F: FnMut(&Record),
{
    match node {
        Node::Scalar(_) => {}
        Node::Sequence(items) => {
            for item in items {
                for_each_element(item, child_key, visit);
            }
        }
        Node::Record(record) => {
            if let Some(Node::Sequence(children)) = record.get(child_key) {
                for child in children {
                    if let Node::Record(element) = child {
                        visit(element);
                    }
                    for_each_element(child, child_key, visit);
                }
            }

            for (key, value) in record {
                if key == child_key && value.is_sequence() {
                    continue;
                }
                for_each_element(value, child_key, visit);
            }
        }
    }
}

/// Number of elements in a document.
pub fn count_elements(node: &Node, child_key: &str) -> usize {
    let mut count = 0;
    for_each_element(node, child_key, &mut |_| count += 1);
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn named(name: &str, children: Vec<Node>) -> Node {
        if children.is_empty() {
            Node::record([("name", Node::from(name))])
        } else {
            Node::record([
                ("name", Node::from(name)),
                ("elements", Node::Sequence(children)),
            ])
        }
    }

    fn visit_order(doc: &mut Node) -> Vec<String> {
        let mut names = Vec::new();
        traverse(doc, DEFAULT_CHILD_KEY, &mut |element| {
            if let Some(name) = element.get("name").and_then(Node::as_str) {
                names.push(name.to_string());
            }
        });
        names
    }

    #[test]
    fn test_scalars_are_ignored() {
        let mut doc = Node::from("just text");
        assert!(visit_order(&mut doc).is_empty());
    }

    #[test]
    fn test_root_is_not_an_element() {
        let mut doc = named("root", vec![named("a", vec![])]);
        assert_eq!(visit_order(&mut doc), vec!["a"]);
    }

    #[test]
    fn test_pre_order_each_position_once() {
        let mut doc = named(
            "root",
            vec![
                named("a", vec![named("a1", vec![named("a1x", vec![])]), named("a2", vec![])]),
                named("b", vec![]),
            ],
        );
        assert_eq!(visit_order(&mut doc), vec!["a", "a1", "a1x", "a2", "b"]);
    }

    #[test]
    fn test_top_level_sequence_of_views() {
        let mut doc = Node::Sequence(vec![
            named("view1", vec![named("x", vec![])]),
            named("view2", vec![named("y", vec![])]),
        ]);
        assert_eq!(visit_order(&mut doc), vec!["x", "y"]);
    }

    #[test]
    fn test_child_lists_under_other_attributes() {
        let mut doc = Node::record([
            ("title", Node::from("Home")),
            (
                "views",
                Node::Sequence(vec![Node::record([(
                    "sections",
                    Node::Sequence(vec![named("card", vec![named("inner", vec![])])]),
                )])]),
            ),
        ]);
        // `sections` is not a child list, but the record inside it is searched
        assert_eq!(visit_order(&mut doc), vec!["inner"]);
    }

    #[test]
    fn test_child_list_visited_before_sibling_attributes() {
        let mut doc = Node::record([
            ("header", named("header", vec![named("h", vec![])])),
            ("elements", Node::Sequence(vec![named("e", vec![])])),
        ]);
        assert_eq!(visit_order(&mut doc), vec!["e", "h"]);
    }

    #[test]
    fn test_non_record_children_are_searched_not_visited() {
        let mut doc = named(
            "root",
            vec![
                Node::from("stray"),
                Node::Sequence(vec![named("hidden", vec![named("deep", vec![])])]),
            ],
        );
        assert_eq!(visit_order(&mut doc), vec!["deep"]);
    }

    #[test]
    fn test_non_sequence_child_key_is_searched_as_attribute() {
        let mut doc = Node::record([(
            "elements",
            named("not-a-list", vec![named("child", vec![])]),
        )]);
        assert_eq!(visit_order(&mut doc), vec!["child"]);
    }

    #[test]
    fn test_visit_sees_children_added_by_visit() {
        let mut doc = named("root", vec![named("a", vec![])]);
        let mut seen = Vec::new();
        traverse(&mut doc, DEFAULT_CHILD_KEY, &mut |element| {
            let name = element.get("name").and_then(Node::as_str).unwrap_or("").to_string();
            if name == "a" {
                element.insert(
                    "elements".into(),
                    Node::Sequence(vec![named("added", vec![])]),
                );
            }
            seen.push(name);
        });
        assert_eq!(seen, vec!["a", "added"]);
    }

    #[test]
    fn test_custom_child_key() {
        let mut doc = Node::record([(
            "cards",
            Node::Sequence(vec![Node::record([("name", Node::from("c"))])]),
        )]);
        let mut count = 0;
        traverse(&mut doc, "cards", &mut |_| count += 1);
        assert_eq!(count, 1);
        assert_eq!(count_elements(&doc, DEFAULT_CHILD_KEY), 0);
    }

    #[test]
    fn test_count_elements_matches_traverse() {
        let mut doc = named(
            "root",
            vec![named("a", vec![named("b", vec![])]), named("c", vec![])],
        );
        let count = count_elements(&doc, DEFAULT_CHILD_KEY);
        assert_eq!(count, visit_order(&mut doc).len());
        assert_eq!(count, 3);
    }
}
