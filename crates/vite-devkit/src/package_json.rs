/*
 * package_json.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Root package.json dependency management.
 *
 * Generators declare the packages they need; the tree is updated right
 * away, while the actual installation is deferred to a `GeneratorCallback`
 * that asks the host's `PackageInstaller` to do it. The devkit itself never
 * spawns processes.
 */

use crate::error::{DevkitError, DevkitResult};
use crate::json::{read_json_value, write_json};
use crate::tasks::{GeneratorCallback, noop_task};
use crate::tree::Tree;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, info};

/// Path of the workspace package manifest.
pub const PACKAGE_JSON: &str = "package.json";

/// Package name → version range.
pub type Dependencies = IndexMap<String, String>;

/// Package manager used by the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    /// npm (default)
    Npm,
    /// Yarn
    Yarn,
    /// pnpm
    Pnpm,
}

impl PackageManager {
    /// Command name of this package manager.
    pub fn command(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Yarn => "yarn",
            PackageManager::Pnpm => "pnpm",
        }
    }

    /// Full install command line.
    pub fn install_command(&self) -> String {
        format!("{} install", self.command())
    }
}

impl std::fmt::Display for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.command())
    }
}

/// Detect the package manager from the lock file present in the tree.
pub fn detect_package_manager(tree: &dyn Tree) -> PackageManager {
    if tree.exists("yarn.lock") {
        PackageManager::Yarn
    } else if tree.exists("pnpm-lock.yaml") {
        PackageManager::Pnpm
    } else {
        PackageManager::Npm
    }
}

/// Host capability that installs the workspace's packages.
pub trait PackageInstaller {
    /// Install the packages declared in `<root>/package.json`.
    fn install(&self, root: &Path, package_manager: PackageManager) -> DevkitResult<()>;
}

/// Build a callback that asks `installer` to install packages.
pub fn install_packages_task(
    tree: &dyn Tree,
    installer: Rc<dyn PackageInstaller>,
) -> GeneratorCallback {
    let root: PathBuf = tree.root().to_path_buf();
    let package_manager = detect_package_manager(tree);
    Box::new(move || -> DevkitResult<()> {
        info!(%package_manager, root = %root.display(), "Installing packages");
        installer.install(&root, package_manager)
    })
}

/// Add dependencies and devDependencies to the root package.json.
///
/// A package already listed in the *other* section is left where it is.
/// Both sections are kept sorted by package name. Returns an install task
/// when package.json changed and a no-op task otherwise.
///
/// # Errors
///
/// `NotFound` when the workspace has no package.json.
pub fn add_dependencies_to_package_json(
    tree: &mut dyn Tree,
    dependencies: &Dependencies,
    dev_dependencies: &Dependencies,
    installer: Rc<dyn PackageInstaller>,
) -> DevkitResult<GeneratorCallback> {
    let mut package_json = read_json_value(tree, PACKAGE_JSON)?;
    let object = package_json
        .as_object_mut()
        .ok_or_else(|| DevkitError::Parse {
            path: PACKAGE_JSON.to_string(),
            message: "expected a JSON object".to_string(),
        })?;

    let current_deps = section(object, "dependencies");
    let current_dev_deps = section(object, "devDependencies");

    let deps: Dependencies = dependencies
        .iter()
        .filter(|(name, _)| !current_dev_deps.contains_key(name.as_str()))
        .map(|(n, v)| (n.clone(), v.clone()))
        .collect();
    let dev_deps: Dependencies = dev_dependencies
        .iter()
        .filter(|(name, _)| !current_deps.contains_key(name.as_str()))
        .map(|(n, v)| (n.clone(), v.clone()))
        .collect();

    let changed = needs_update(&current_deps, &deps) || needs_update(&current_dev_deps, &dev_deps);
    if !changed {
        debug!("package.json already has the requested dependencies");
        return Ok(noop_task());
    }

    object.insert(
        "dependencies".to_string(),
        Value::Object(merge_sorted(current_deps, &deps)),
    );
    object.insert(
        "devDependencies".to_string(),
        Value::Object(merge_sorted(current_dev_deps, &dev_deps)),
    );
    write_json(tree, PACKAGE_JSON, &package_json)?;

    Ok(install_packages_task(tree, installer))
}

fn section(object: &Map<String, Value>, key: &str) -> Map<String, Value> {
    object
        .get(key)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

fn needs_update(current: &Map<String, Value>, wanted: &Dependencies) -> bool {
    wanted
        .iter()
        .any(|(name, version)| current.get(name).and_then(Value::as_str) != Some(version.as_str()))
}

fn merge_sorted(current: Map<String, Value>, wanted: &Dependencies) -> Map<String, Value> {
    let mut entries: Vec<(String, Value)> = current.into_iter().collect();
    for (name, version) in wanted {
        match entries.iter_mut().find(|(existing, _)| existing == name) {
            Some(entry) => entry.1 = Value::String(version.clone()),
            None => entries.push((name.clone(), Value::String(version.clone()))),
        }
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries.into_iter().collect()
}
