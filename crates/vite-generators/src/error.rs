/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Error type for the generators.
 */

use thiserror::Error;
use vite_config::ConfigError;
use vite_devkit::DevkitError;

/// Result type for generator operations
pub type GeneratorResult<T> = Result<T, GeneratorError>;

/// Errors a generator can report.
///
/// A generator that fails has only staged changes in the tree; the host
/// discards them instead of flushing.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Tree, JSON, project lookup or scaffolding failure
    #[error(transparent)]
    Devkit(#[from] DevkitError),

    /// A configuration document could not be loaded or edited
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The generator options are unusable
    #[error("Invalid options: {0}")]
    InvalidOptions(String),
}

impl GeneratorError {
    /// Whether the named project does not exist.
    pub fn is_project_not_found(&self) -> bool {
        matches!(self, GeneratorError::Devkit(DevkitError::ProjectNotFound(_)))
    }
}
