/*
 * path.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Dot-separated paths into a configuration document.
 */

use crate::types::ConfigError;
use std::fmt;
use std::str::FromStr;

/// A path to a field, e.g. `compilerOptions.types`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Build a path from its segments.
    ///
    /// # Errors
    ///
    /// `InvalidFieldPath` when there are no segments or one is empty.
    pub fn new<S: Into<String>>(segments: impl IntoIterator<Item = S>) -> Result<Self, ConfigError> {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() || segments.iter().any(|s| s.is_empty()) {
            return Err(ConfigError::InvalidFieldPath(segments.join(".")));
        }
        Ok(FieldPath { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The dotted form of the first `len` segments.
    pub(crate) fn prefix(&self, len: usize) -> String {
        self.segments[..len.min(self.segments.len())].join(".")
    }
}

impl FromStr for FieldPath {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ConfigError::InvalidFieldPath(s.to_string()));
        }
        FieldPath::new(s.split('.')).map_err(|_| ConfigError::InvalidFieldPath(s.to_string()))
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}
