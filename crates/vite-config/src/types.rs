/*
 * types.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Core type definitions for configuration documents.
 */

use indexmap::IndexMap;
use thiserror::Error;
use vite_devkit::DevkitError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// A node of a configuration document.
///
/// Documents are closed trees of three node kinds. Every field access goes
/// through an explicit shape check that reports a `MalformedDocument` error
/// instead of coercing a value of the wrong kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigNode {
    /// Key → node. Keys are unique; insertion order is kept so untouched
    /// siblings are written back where they were.
    Mapping(IndexMap<String, ConfigNode>),

    /// Ordered list of nodes.
    Sequence(Vec<ConfigNode>),

    /// Atomic value.
    Scalar(Scalar),
}

/// Atomic configuration values.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// `null`
    Null,
    /// `true` / `false`
    Bool(bool),
    /// Any JSON number
    Number(serde_json::Number),
    /// A string
    String(String),
}

/// The kind of a node, for shape checks and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Mapping,
    Sequence,
    String,
    Number,
    Bool,
    Null,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            NodeKind::Mapping => "mapping",
            NodeKind::Sequence => "sequence",
            NodeKind::String => "string",
            NodeKind::Number => "number",
            NodeKind::Bool => "boolean",
            NodeKind::Null => "null",
        };
        write!(f, "{}", name)
    }
}

impl ConfigNode {
    /// An empty mapping.
    pub fn empty_mapping() -> Self {
        ConfigNode::Mapping(IndexMap::new())
    }

    /// An empty sequence.
    pub fn empty_sequence() -> Self {
        ConfigNode::Sequence(Vec::new())
    }

    /// A string scalar.
    pub fn string(value: impl Into<String>) -> Self {
        ConfigNode::Scalar(Scalar::String(value.into()))
    }

    /// A mapping built from key/node pairs, in order.
    pub fn mapping<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ConfigNode)>,
    {
        ConfigNode::Mapping(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Kind of this node.
    pub fn kind(&self) -> NodeKind {
        match self {
            ConfigNode::Mapping(_) => NodeKind::Mapping,
            ConfigNode::Sequence(_) => NodeKind::Sequence,
            ConfigNode::Scalar(Scalar::String(_)) => NodeKind::String,
            ConfigNode::Scalar(Scalar::Number(_)) => NodeKind::Number,
            ConfigNode::Scalar(Scalar::Bool(_)) => NodeKind::Bool,
            ConfigNode::Scalar(Scalar::Null) => NodeKind::Null,
        }
    }

    /// Borrow as a mapping, if this is one.
    pub fn as_mapping(&self) -> Option<&IndexMap<String, ConfigNode>> {
        match self {
            ConfigNode::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Borrow as a sequence, if this is one.
    pub fn as_sequence(&self) -> Option<&[ConfigNode]> {
        match self {
            ConfigNode::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow as a string, if this is a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigNode::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Look up a key, if this is a mapping.
    pub fn get(&self, key: &str) -> Option<&ConfigNode> {
        self.as_mapping().and_then(|map| map.get(key))
    }

    /// Assert this node is a mapping.
    pub fn expect_mapping(&self, field: &str) -> ConfigResult<&IndexMap<String, ConfigNode>> {
        match self {
            ConfigNode::Mapping(map) => Ok(map),
            other => Err(ConfigError::malformed(field, NodeKind::Mapping, other.kind())),
        }
    }

    /// Assert this node is a mapping, mutably.
    pub fn expect_mapping_mut(
        &mut self,
        field: &str,
    ) -> ConfigResult<&mut IndexMap<String, ConfigNode>> {
        match self {
            ConfigNode::Mapping(map) => Ok(map),
            other => Err(ConfigError::malformed(field, NodeKind::Mapping, other.kind())),
        }
    }

    /// Assert this node is a sequence.
    pub fn expect_sequence(&self, field: &str) -> ConfigResult<&Vec<ConfigNode>> {
        match self {
            ConfigNode::Sequence(items) => Ok(items),
            other => Err(ConfigError::malformed(field, NodeKind::Sequence, other.kind())),
        }
    }

    /// Assert this node is a sequence, mutably.
    pub fn expect_sequence_mut(&mut self, field: &str) -> ConfigResult<&mut Vec<ConfigNode>> {
        match self {
            ConfigNode::Sequence(items) => Ok(items),
            other => Err(ConfigError::malformed(field, NodeKind::Sequence, other.kind())),
        }
    }

    /// Assert this node is a string scalar.
    pub fn expect_str(&self, field: &str) -> ConfigResult<&str> {
        match self {
            ConfigNode::Scalar(Scalar::String(s)) => Ok(s),
            other => Err(ConfigError::malformed(field, NodeKind::String, other.kind())),
        }
    }
}

/// Errors for configuration documents.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file is absent.
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    /// The file is present but not valid JSON (with comments).
    #[error("Failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    /// The document has the wrong shape at the targeted field.
    #[error(
        "Malformed document{}: expected {expected} at '{field}', found {found}",
        document_label(.document)
    )]
    MalformedDocument {
        /// Document path, when known
        document: Option<String>,
        /// Dotted path of the offending field (`<root>` for the document itself)
        field: String,
        /// Kind the edit requires
        expected: NodeKind,
        /// Kind actually present
        found: NodeKind,
    },

    /// A field path could not be parsed.
    #[error("Invalid field path: '{0}'")]
    InvalidFieldPath(String),

    /// Storage failure from the host tree.
    #[error(transparent)]
    Io(#[from] DevkitError),
}

fn document_label(document: &Option<String>) -> String {
    match document {
        Some(path) => format!(" {}", path),
        None => String::new(),
    }
}

impl ConfigError {
    /// Create a `MalformedDocument` error for `field`.
    pub fn malformed(field: &str, expected: NodeKind, found: NodeKind) -> Self {
        ConfigError::MalformedDocument {
            document: None,
            field: if field.is_empty() {
                "<root>".to_string()
            } else {
                field.to_string()
            },
            expected,
            found,
        }
    }

    /// Attach the document path to a `MalformedDocument` error.
    pub fn in_document(self, path: &str) -> Self {
        match self {
            ConfigError::MalformedDocument {
                document: None,
                field,
                expected,
                found,
            } => ConfigError::MalformedDocument {
                document: Some(path.to_string()),
                field,
                expected,
                found,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_kinds() {
        assert_eq!(ConfigNode::empty_mapping().kind(), NodeKind::Mapping);
        assert_eq!(ConfigNode::empty_sequence().kind(), NodeKind::Sequence);
        assert_eq!(ConfigNode::string("x").kind(), NodeKind::String);
        assert_eq!(ConfigNode::Scalar(Scalar::Bool(true)).kind(), NodeKind::Bool);
        assert_eq!(ConfigNode::Scalar(Scalar::Null).kind(), NodeKind::Null);
    }

    #[test]
    fn test_shape_assertions() {
        let node = ConfigNode::mapping([("types", ConfigNode::string("node"))]);
        assert!(node.expect_mapping("compilerOptions").is_ok());

        let err = node.get("types").unwrap().expect_sequence("compilerOptions.types").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MalformedDocument {
                expected: NodeKind::Sequence,
                found: NodeKind::String,
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_display() {
        let err = ConfigError::malformed("references", NodeKind::Sequence, NodeKind::String);
        assert_eq!(
            err.to_string(),
            "Malformed document: expected sequence at 'references', found string"
        );

        let err = err.in_document("apps/web/tsconfig.json");
        assert_eq!(
            err.to_string(),
            "Malformed document apps/web/tsconfig.json: expected sequence at 'references', found string"
        );

        let err = ConfigError::malformed("", NodeKind::Mapping, NodeKind::Sequence);
        assert!(err.to_string().contains("'<root>'"));
    }
}
