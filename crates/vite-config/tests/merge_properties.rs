/*
 * merge_properties.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Property-based tests for configuration edits.
 *
 * Documents are generated as arbitrary ConfigNode trees, some of them with a
 * well-formed `references` sequence and some with fields of the wrong kind,
 * so both the success and the MalformedDocument paths are exercised.
 */

use indexmap::IndexMap;
use proptest::prelude::*;
use vite_config::{ConfigNode, Edit, FieldPath, Scalar, ensure_listed_type, ensure_reference};

// ============================================================================
// Generators
// ============================================================================

fn arb_scalar() -> impl Strategy<Value = ConfigNode> {
    prop_oneof![
        Just(ConfigNode::Scalar(Scalar::Null)),
        any::<bool>().prop_map(|b| ConfigNode::Scalar(Scalar::Bool(b))),
        any::<i64>().prop_map(|n| ConfigNode::Scalar(Scalar::Number(n.into()))),
        "[a-z./]{0,8}".prop_map(ConfigNode::string),
    ]
}

/// Keys biased towards the fields the edits look at.
fn arb_key() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("references".to_string()),
        Just("compilerOptions".to_string()),
        Just("types".to_string()),
        Just("path".to_string()),
        "[a-z]{1,6}",
    ]
}

fn arb_node() -> impl Strategy<Value = ConfigNode> {
    arb_scalar().prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(ConfigNode::Sequence),
            prop::collection::vec((arb_key(), inner), 0..4).prop_map(ConfigNode::mapping),
        ]
    })
}

fn arb_reference_path() -> impl Strategy<Value = String> {
    "\\./[a-z]{1,4}\\.json"
}

fn reference(path: &str) -> ConfigNode {
    ConfigNode::mapping([("path", ConfigNode::string(path))])
}

/// A mapping whose `references` lists distinct paths.
fn arb_references_doc() -> impl Strategy<Value = ConfigNode> {
    (
        prop::collection::vec((arb_key(), arb_node()), 0..3),
        prop::collection::btree_set(arb_reference_path(), 0..4),
    )
        .prop_map(|(fields, paths)| {
            let mut root: IndexMap<String, ConfigNode> = fields.into_iter().collect();
            let entries = paths.iter().map(|path| reference(path)).collect();
            root.insert("references".to_string(), ConfigNode::Sequence(entries));
            ConfigNode::Mapping(root)
        })
}

/// A mapping with no `references` field at the top level.
fn arb_doc_without_references() -> impl Strategy<Value = ConfigNode> {
    prop::collection::vec((arb_key(), arb_node()), 0..4).prop_map(|fields| {
        let mut root: IndexMap<String, ConfigNode> = fields.into_iter().collect();
        root.shift_remove("references");
        ConfigNode::Mapping(root)
    })
}

/// Any document, well-formed or not.
fn arb_doc() -> impl Strategy<Value = ConfigNode> {
    prop_oneof![
        arb_references_doc(),
        arb_doc_without_references(),
        arb_node().prop_map(|node| ConfigNode::mapping([("references", node)])),
        arb_node(),
    ]
}

fn arb_field_path() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(arb_key(), 1..4)
}

fn arb_type_name() -> impl Strategy<Value = String> {
    "[a-z]{1,6}(/[a-z]{1,6})?"
}

fn reference_paths(doc: &ConfigNode) -> Vec<String> {
    doc.get("references")
        .and_then(ConfigNode::as_sequence)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry.get("path").and_then(ConfigNode::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

// ============================================================================
// ensure_reference
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A second application changes nothing.
    #[test]
    fn test_reference_is_idempotent(doc in arb_doc(), path in arb_reference_path()) {
        let mut once = doc;
        if ensure_reference(&mut once, &path).is_ok() {
            let mut twice = once.clone();
            prop_assert_eq!(ensure_reference(&mut twice, &path).unwrap(), Edit::Unchanged);
            prop_assert_eq!(twice, once);
        }
    }

    /// Without `references` the document is left alone.
    #[test]
    fn test_reference_without_references_is_no_op(
        doc in arb_doc_without_references(),
        path in arb_reference_path(),
    ) {
        let mut edited = doc.clone();
        prop_assert_eq!(ensure_reference(&mut edited, &path).unwrap(), Edit::Unchanged);
        prop_assert_eq!(edited, doc);
    }

    /// New references are appended in the order they were ensured.
    #[test]
    fn test_references_keep_append_order(
        doc in arb_references_doc(),
        first in arb_reference_path(),
        second in arb_reference_path(),
    ) {
        let existing = reference_paths(&doc);
        prop_assume!(first != second);
        prop_assume!(!existing.contains(&first) && !existing.contains(&second));

        let mut edited = doc;
        prop_assert_eq!(ensure_reference(&mut edited, &first).unwrap(), Edit::Changed);
        prop_assert_eq!(ensure_reference(&mut edited, &second).unwrap(), Edit::Changed);

        let mut expected = existing;
        expected.push(first);
        expected.push(second);
        prop_assert_eq!(reference_paths(&edited), expected);
    }

    /// Every path is listed exactly once after a merge.
    #[test]
    fn test_reference_never_duplicates(doc in arb_references_doc(), path in arb_reference_path()) {
        let mut edited = doc;
        ensure_reference(&mut edited, &path).unwrap();

        let paths = reference_paths(&edited);
        prop_assert_eq!(paths.iter().filter(|p| **p == path).count(), 1);
        let mut unique = paths.clone();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(unique.len(), paths.len());
    }

    /// A failed edit leaves the document as it was.
    #[test]
    fn test_failed_reference_changes_nothing(doc in arb_doc(), path in arb_reference_path()) {
        let mut edited = doc.clone();
        if ensure_reference(&mut edited, &path).is_err() {
            prop_assert_eq!(edited, doc);
        }
    }
}

// ============================================================================
// ensure_listed_type
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A second application changes nothing.
    #[test]
    fn test_listed_type_is_idempotent(
        doc in arb_doc(),
        segments in arb_field_path(),
        type_name in arb_type_name(),
    ) {
        let field_path = FieldPath::new(segments).unwrap();
        let mut once = doc;
        if ensure_listed_type(&mut once, &field_path, &type_name).is_ok() {
            let mut twice = once.clone();
            prop_assert_eq!(
                ensure_listed_type(&mut twice, &field_path, &type_name).unwrap(),
                Edit::Unchanged
            );
            prop_assert_eq!(twice, once);
        }
    }

    /// A failed edit leaves the document as it was.
    #[test]
    fn test_failed_listed_type_changes_nothing(
        doc in arb_doc(),
        segments in arb_field_path(),
        type_name in arb_type_name(),
    ) {
        let field_path = FieldPath::new(segments).unwrap();
        let mut edited = doc.clone();
        if ensure_listed_type(&mut edited, &field_path, &type_name).is_err() {
            prop_assert_eq!(edited, doc);
        }
    }
}
