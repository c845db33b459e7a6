/*
 * schema.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Generator options.
 *
 * Options are plain serde structs so they can come from a JSON options
 * file (camelCase keys, like the workspace's other JSON files) as well as
 * from command-line flags.
 */

use crate::error::{GeneratorError, GeneratorResult};
use serde::{Deserialize, Serialize};

/// UI framework whose Vite plugin should be configured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiFramework {
    /// React, via `@vitejs/plugin-react`
    React,

    /// No framework plugin
    #[default]
    None,
}

impl UiFramework {
    /// Get the lowercase identifier for this framework.
    pub fn id(&self) -> &'static str {
        match self {
            UiFramework::React => "react",
            UiFramework::None => "none",
        }
    }

    /// Parse a framework from its identifier.
    pub fn from_id(id: &str) -> GeneratorResult<Self> {
        match id.to_lowercase().as_str() {
            "react" => Ok(UiFramework::React),
            "none" => Ok(UiFramework::None),
            _ => Err(GeneratorError::InvalidOptions(format!(
                "unknown UI framework '{}' (expected 'react' or 'none')",
                id
            ))),
        }
    }
}

impl std::fmt::Display for UiFramework {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl std::str::FromStr for UiFramework {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UiFramework::from_id(s)
    }
}

/// Options of the vitest generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitestGeneratorSchema {
    /// Name of the project to set up
    pub project: String,

    #[serde(default)]
    pub ui_framework: UiFramework,

    /// Also run tests written inside source files (`import.meta.vitest`)
    #[serde(default)]
    pub in_source_tests: bool,

    /// Leave `vite.config.ts` alone
    #[serde(default)]
    pub skip_vite_config: bool,

    /// Name of the test target, when it should not be detected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_target: Option<String>,
}

impl VitestGeneratorSchema {
    /// Options for `project` with every other option at its default.
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            ..Self::default()
        }
    }

    /// Check the options before any file is touched.
    pub fn validate(&self) -> GeneratorResult<()> {
        if self.project.trim().is_empty() {
            return Err(GeneratorError::InvalidOptions(
                "a project name is required".to_string(),
            ));
        }
        if self
            .test_target
            .as_deref()
            .is_some_and(|target| target.trim().is_empty())
        {
            return Err(GeneratorError::InvalidOptions(
                "the test target name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Options of the init generator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitGeneratorSchema {
    #[serde(default)]
    pub ui_framework: UiFramework,
}
