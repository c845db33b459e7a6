/*
 * project.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Project configuration lookup and update.
 *
 * A project is configured either inline in `workspace.json`, through a
 * `workspace.json` entry pointing at its directory, or by a standalone
 * `project.json` discovered anywhere in the workspace. Updates are written
 * back to wherever the configuration was read from, merging into the
 * existing JSON so keys the caller did not touch keep their position.
 */

use crate::error::{DevkitError, DevkitResult};
use crate::json::{read_json_value, write_json};
use crate::path::{basename, dirname, join_path_fragments, normalize_path};
use crate::tree::Tree;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

const WORKSPACE_JSON: &str = "workspace.json";
const PROJECT_JSON: &str = "project.json";

/// Directories never searched for `project.json` files.
const IGNORED_DIRS: &[&str] = &["node_modules", ".git", "dist", "tmp", "coverage", ".nx"];

/// Configuration of a single target (build, serve, test, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetConfiguration {
    /// Executor running the target, e.g. `@nrwl/vite:test`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executor: Option<String>,

    /// Output paths cached by the task runner
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<String>>,

    /// Executor options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Map<String, Value>>,

    /// Named option overrides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configurations: Option<IndexMap<String, Map<String, Value>>>,

    /// Any other fields, kept as-is
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// Configuration of a workspace project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfiguration {
    /// Project name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Project directory, relative to the workspace root
    #[serde(default)]
    pub root: String,

    /// Source directory, relative to the workspace root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,

    /// `application` or `library`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,

    /// Targets by name
    #[serde(default)]
    pub targets: IndexMap<String, TargetConfiguration>,

    /// Any other fields, kept as-is
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl ProjectConfiguration {
    /// Create a configuration rooted at `root` with no targets.
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: normalize_path(&root.into()),
            ..Self::default()
        }
    }
}

/// Where a project's configuration lives.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ProjectSource {
    /// Inline object under `workspace.json` `projects`
    Inline,
    /// A `project.json` file
    File(String),
}

/// Read the configuration of the project named `name`.
///
/// # Errors
///
/// `ProjectNotFound` when no project has that name; parse errors from the
/// file that holds the configuration.
pub fn read_project_configuration(
    tree: &dyn Tree,
    name: &str,
) -> DevkitResult<ProjectConfiguration> {
    let (_, config) = locate_project(tree, name)?;
    Ok(config)
}

/// Write back the configuration of the project named `name`.
pub fn update_project_configuration(
    tree: &mut dyn Tree,
    name: &str,
    config: &ProjectConfiguration,
) -> DevkitResult<()> {
    let (source, _) = locate_project(tree, name)?;
    let updated = to_object(config, name)?;

    match source {
        ProjectSource::File(path) => {
            let original = read_json_value(tree, &path)?;
            let mut updated = updated;
            // project.json files derive their root from their location.
            if original.get("root").is_none() {
                updated.remove("root");
            }
            let merged = merge_preserving_order(original, Value::Object(updated));
            debug!(project = name, %path, "Updating project configuration");
            write_json(tree, &path, &merged)
        }
        ProjectSource::Inline => {
            let mut workspace = read_json_value(tree, WORKSPACE_JSON)?;
            let original = workspace
                .get("projects")
                .and_then(|p| p.get(name))
                .cloned()
                .unwrap_or(Value::Object(Map::new()));
            let merged = merge_preserving_order(original, Value::Object(updated));
            if let Some(projects) = workspace.get_mut("projects").and_then(Value::as_object_mut) {
                projects.insert(name.to_string(), merged);
            }
            debug!(project = name, "Updating inline project configuration");
            write_json(tree, WORKSPACE_JSON, &workspace)
        }
    }
}

/// Register a new project by writing `<root>/project.json`.
///
/// When the workspace has a `workspace.json`, the project is also listed
/// there by path.
pub fn add_project_configuration(
    tree: &mut dyn Tree,
    name: &str,
    config: &ProjectConfiguration,
) -> DevkitResult<()> {
    let root = normalize_path(&config.root);
    let mut object = Map::new();
    object.insert("name".to_string(), Value::String(name.to_string()));
    for (key, value) in to_object(config, name)? {
        if key != "name" && key != "root" {
            object.insert(key, value);
        }
    }
    write_json(tree, &join_path_fragments(&[root.as_str(), PROJECT_JSON]), &object)?;

    if tree.exists(WORKSPACE_JSON) {
        let mut workspace = read_json_value(tree, WORKSPACE_JSON)?;
        if let Some(map) = workspace.as_object_mut() {
            let projects = map
                .entry("projects")
                .or_insert_with(|| Value::Object(Map::new()));
            if let Some(projects) = projects.as_object_mut() {
                projects.insert(name.to_string(), Value::String(root));
            }
        }
        write_json(tree, WORKSPACE_JSON, &workspace)?;
    }
    Ok(())
}

fn to_object(config: &ProjectConfiguration, name: &str) -> DevkitResult<Map<String, Value>> {
    match serde_json::to_value(config) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Ok(Map::new()),
        Err(source) => Err(DevkitError::Json {
            path: name.to_string(),
            source,
        }),
    }
}

fn parse_config(value: Value, path: &str) -> DevkitResult<ProjectConfiguration> {
    serde_json::from_value(value).map_err(|source| DevkitError::Json {
        path: path.to_string(),
        source,
    })
}

fn locate_project(
    tree: &dyn Tree,
    name: &str,
) -> DevkitResult<(ProjectSource, ProjectConfiguration)> {
    if tree.exists(WORKSPACE_JSON) {
        let workspace = read_json_value(tree, WORKSPACE_JSON)?;
        match workspace.get("projects").and_then(|p| p.get(name)) {
            Some(Value::String(root)) => {
                let path = join_path_fragments(&[root.as_str(), PROJECT_JSON]);
                let mut config = parse_config(read_json_value(tree, &path)?, &path)?;
                config.root = normalize_path(root);
                return Ok((ProjectSource::File(path), config));
            }
            Some(inline @ Value::Object(_)) => {
                let mut config = parse_config(inline.clone(), WORKSPACE_JSON)?;
                config.root = normalize_path(&config.root);
                return Ok((ProjectSource::Inline, config));
            }
            _ => {}
        }
    }

    for path in find_project_files(tree, "") {
        let value = read_json_value(tree, &path)?;
        let root = dirname(&path);
        let project_name = value
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| basename(&root));
        if project_name == name {
            let mut config = parse_config(value, &path)?;
            config.root = root;
            return Ok((ProjectSource::File(path), config));
        }
    }

    Err(DevkitError::ProjectNotFound(name.to_string()))
}

fn find_project_files(tree: &dyn Tree, dir: &str) -> Vec<String> {
    let mut found = Vec::new();
    for child in tree.children(dir) {
        let path = join_path_fragments(&[dir, child.as_str()]);
        if tree.is_file(&path) {
            if child == PROJECT_JSON {
                found.push(path);
            }
        } else if !IGNORED_DIRS.contains(&child.as_str()) {
            found.extend(find_project_files(tree, &path));
        }
    }
    found
}

/// Merge `updated` into `original`, keeping the key order of `original`.
///
/// Keys present in both are updated in place (recursively for objects),
/// keys missing from `updated` are dropped, new keys are appended.
fn merge_preserving_order(original: Value, updated: Value) -> Value {
    match (original, updated) {
        (Value::Object(original), Value::Object(mut updated)) => {
            let mut merged = Map::new();
            for (key, old) in original {
                if let Some(new) = updated.remove(&key) {
                    merged.insert(key, merge_preserving_order(old, new));
                }
            }
            for (key, new) in updated {
                merged.insert(key, new);
            }
            Value::Object(merged)
        }
        (_, updated) => updated,
    }
}
