/*
 * merge.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Idempotent edits of configuration documents.
 *
 * Each edit validates the shape of everything it will touch before it
 * mutates anything, so a failed edit leaves the document exactly as it was.
 * Applying an edit twice gives the same document as applying it once.
 */

use crate::path::FieldPath;
use crate::types::{ConfigError, ConfigNode, ConfigResult, NodeKind};
use tracing::debug;

const REFERENCES: &str = "references";
const PATH: &str = "path";

/// Outcome of an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Edit {
    /// The document was modified
    Changed,
    /// The document already satisfied the edit
    Unchanged,
}

impl Edit {
    pub fn is_changed(self) -> bool {
        self == Edit::Changed
    }

    /// `Changed` if either edit changed the document.
    pub fn or(self, other: Edit) -> Edit {
        if self.is_changed() || other.is_changed() {
            Edit::Changed
        } else {
            Edit::Unchanged
        }
    }
}

/// Make sure `references` lists an entry whose `path` is `reference_path`.
///
/// A document without a `references` field is left alone. A missing entry
/// is appended as `{ "path": reference_path }` after the existing ones.
///
/// # Errors
///
/// `MalformedDocument` when the root is not a mapping, when `references` is
/// not a sequence, or when one of its entries is not a mapping with a string
/// `path`.
///
/// # Example
///
/// ```
/// use vite_config::{ConfigNode, Edit, ensure_reference};
///
/// let mut doc = ConfigNode::mapping([("references", ConfigNode::empty_sequence())]);
/// assert_eq!(ensure_reference(&mut doc, "./tsconfig.spec.json").unwrap(), Edit::Changed);
/// assert_eq!(ensure_reference(&mut doc, "./tsconfig.spec.json").unwrap(), Edit::Unchanged);
/// ```
pub fn ensure_reference(doc: &mut ConfigNode, reference_path: &str) -> ConfigResult<Edit> {
    let root = doc.expect_mapping("")?;
    let Some(references) = root.get(REFERENCES) else {
        debug!(reference = reference_path, "No references field, skipping");
        return Ok(Edit::Unchanged);
    };

    let entries = references.expect_sequence(REFERENCES)?;
    let mut present = false;
    for (index, entry) in entries.iter().enumerate() {
        let field = format!("{}[{}]", REFERENCES, index);
        let path = entry
            .expect_mapping(&field)?
            .get(PATH)
            .ok_or_else(|| {
                ConfigError::malformed(&format!("{}.{}", field, PATH), NodeKind::String, NodeKind::Null)
            })?
            .expect_str(&format!("{}.{}", field, PATH))?;
        present |= path == reference_path;
    }
    if present {
        return Ok(Edit::Unchanged);
    }

    let entries = doc
        .expect_mapping_mut("")?
        .get_mut(REFERENCES)
        .ok_or_else(|| ConfigError::malformed(REFERENCES, NodeKind::Sequence, NodeKind::Null))?
        .expect_sequence_mut(REFERENCES)?;
    entries.push(ConfigNode::mapping([(PATH, ConfigNode::string(reference_path))]));
    debug!(reference = reference_path, "Added reference");
    Ok(Edit::Changed)
}

/// Make sure the string sequence at `field_path` contains `type_name`.
///
/// Missing mappings along the path and a missing sequence at its end are
/// created. Existing elements keep their order; `type_name` is appended.
///
/// # Errors
///
/// `MalformedDocument` when a field along the path is not a mapping, when
/// the target is not a sequence, or when the sequence holds non-strings.
///
/// # Example
///
/// ```
/// use vite_config::{ConfigNode, Edit, FieldPath, ensure_listed_type};
///
/// let mut doc = ConfigNode::mapping([("compilerOptions", ConfigNode::empty_mapping())]);
/// let path: FieldPath = "compilerOptions.types".parse().unwrap();
/// assert_eq!(ensure_listed_type(&mut doc, &path, "vitest/importMeta").unwrap(), Edit::Changed);
/// ```
pub fn ensure_listed_type(
    doc: &mut ConfigNode,
    field_path: &FieldPath,
    type_name: &str,
) -> ConfigResult<Edit> {
    if check_listed_type(doc, field_path, type_name)? {
        return Ok(Edit::Unchanged);
    }

    let segments = field_path.segments();
    let (last, parents) = match segments.split_last() {
        Some(split) => split,
        None => return Err(ConfigError::InvalidFieldPath(String::new())),
    };

    let mut current = doc;
    for (depth, segment) in parents.iter().enumerate() {
        current = current
            .expect_mapping_mut(&field_path.prefix(depth))?
            .entry(segment.clone())
            .or_insert_with(ConfigNode::empty_mapping);
    }
    let list = current
        .expect_mapping_mut(&field_path.prefix(parents.len()))?
        .entry(last.clone())
        .or_insert_with(ConfigNode::empty_sequence)
        .expect_sequence_mut(&field_path.to_string())?;
    list.push(ConfigNode::string(type_name));

    debug!(field = %field_path, type_name, "Added type");
    Ok(Edit::Changed)
}

/// Validate the path for `ensure_listed_type`. Returns whether `type_name`
/// is already listed.
fn check_listed_type(
    doc: &ConfigNode,
    field_path: &FieldPath,
    type_name: &str,
) -> ConfigResult<bool> {
    let mut current = doc;
    for (depth, segment) in field_path.segments().iter().enumerate() {
        let map = current.expect_mapping(&field_path.prefix(depth))?;
        match map.get(segment) {
            Some(child) => current = child,
            // Everything from here on will be created.
            None => return Ok(false),
        }
    }

    let field = field_path.to_string();
    let items = current.expect_sequence(&field)?;
    let mut listed = false;
    for (index, item) in items.iter().enumerate() {
        listed |= item.expect_str(&format!("{}[{}]", field, index))? == type_name;
    }
    Ok(listed)
}
