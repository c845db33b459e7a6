/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Error type shared by the devkit utilities.
 */

use thiserror::Error;

/// Result type for devkit operations
pub type DevkitResult<T> = Result<T, DevkitError>;

/// Errors produced by tree access, JSON helpers, scaffolding and tasks.
#[derive(Debug, Error)]
pub enum DevkitError {
    /// Underlying storage failure
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Workspace-relative path being accessed
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// An expected file is absent
    #[error("Cannot find {0}")]
    NotFound(String),

    /// File content is not valid UTF-8
    #[error("Invalid UTF-8 in {0}")]
    InvalidUtf8(String),

    /// File is present but is not valid JSON (with comments)
    #[error("Failed to parse JSON in {path}: {message}")]
    Parse {
        /// Workspace-relative path of the file
        path: String,
        /// Parser message, including line and column
        message: String,
    },

    /// A value could not be converted to or from JSON
    #[error("Failed to convert JSON for {path}: {source}")]
    Json {
        /// Workspace-relative path of the file
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// No project with the given name exists in the workspace
    #[error("Cannot find configuration for '{0}'")]
    ProjectNotFound(String),

    /// Template rendering failed
    #[error("Template rendering failed for {path}: {message}")]
    TemplateRender {
        /// Template path (before substitution)
        path: String,
        /// What went wrong
        message: String,
    },

    /// A deferred task failed
    #[error("Task failed: {0}")]
    Task(String),
}

impl DevkitError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        DevkitError::Io {
            path: path.into(),
            source,
        }
    }
}
