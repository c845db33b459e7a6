/*
 * document.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Loading and writing configuration documents through a Tree.
 */

use crate::merge::Edit;
use crate::types::{ConfigError, ConfigNode, ConfigResult};
use serde_json::Value;
use tracing::debug;
use vite_devkit::{DevkitError, Tree, normalize_path, parse_jsonc, write_json};

/// A configuration file loaded from a tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDocument {
    path: String,
    root: ConfigNode,
}

impl ConfigDocument {
    /// Load the document at `path`.
    ///
    /// # Errors
    ///
    /// `NotFound` when the file is absent, `Parse` when it is not UTF-8 or
    /// not valid JSON with comments.
    pub fn read(tree: &dyn Tree, path: &str) -> ConfigResult<Self> {
        Self::read_optional(tree, path)?.ok_or_else(|| ConfigError::NotFound(normalize_path(path)))
    }

    /// Load the document at `path`, or `None` when the file is absent.
    pub fn read_optional(tree: &dyn Tree, path: &str) -> ConfigResult<Option<Self>> {
        let path = normalize_path(path);
        let text = match tree.read_string(&path) {
            Ok(Some(text)) => text,
            Ok(None) => return Ok(None),
            Err(DevkitError::InvalidUtf8(_)) => {
                return Err(ConfigError::Parse {
                    path,
                    message: "file is not valid UTF-8".to_string(),
                });
            }
            Err(err) => return Err(err.into()),
        };
        let value = parse_jsonc(&text).map_err(|message| ConfigError::Parse {
            path: path.clone(),
            message,
        })?;
        Ok(Some(ConfigDocument {
            path,
            root: ConfigNode::from(value),
        }))
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Apply an edit to the document root.
    ///
    /// Shape errors are tagged with this document's path.
    pub fn apply<F>(&mut self, edit: F) -> ConfigResult<Edit>
    where
        F: FnOnce(&mut ConfigNode) -> ConfigResult<Edit>,
    {
        edit(&mut self.root).map_err(|e| e.in_document(&self.path))
    }

    /// Serialize the document and stage it in the tree.
    pub fn write(&self, tree: &mut dyn Tree) -> ConfigResult<()> {
        let value = Value::from(self.root.clone());
        write_json(tree, &self.path, &value)?;
        Ok(())
    }
}

/// Load `path`, apply `edit`, and write the document back if it changed.
///
/// Nothing is staged when the edit fails. An edit closure that performs
/// several edits should use `?` so that a later failure discards the
/// earlier ones.
///
/// # Errors
///
/// `NotFound` when the file is absent, plus anything the edit reports.
pub fn update_config<F>(tree: &mut dyn Tree, path: &str, edit: F) -> ConfigResult<Edit>
where
    F: FnOnce(&mut ConfigNode) -> ConfigResult<Edit>,
{
    let document = ConfigDocument::read(tree, path)?;
    apply_and_write(tree, document, edit)
}

/// Like [`update_config`], but an absent file is left alone.
pub fn update_optional_config<F>(tree: &mut dyn Tree, path: &str, edit: F) -> ConfigResult<Edit>
where
    F: FnOnce(&mut ConfigNode) -> ConfigResult<Edit>,
{
    match ConfigDocument::read_optional(tree, path)? {
        Some(document) => apply_and_write(tree, document, edit),
        None => {
            debug!(path, "Configuration file absent, skipping");
            Ok(Edit::Unchanged)
        }
    }
}

fn apply_and_write<F>(tree: &mut dyn Tree, mut document: ConfigDocument, edit: F) -> ConfigResult<Edit>
where
    F: FnOnce(&mut ConfigNode) -> ConfigResult<Edit>,
{
    let result = document.apply(edit)?;
    if result.is_changed() {
        debug!(path = document.path(), "Writing configuration");
        document.write(tree)?;
    }
    Ok(result)
}
