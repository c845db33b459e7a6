/*
 * vite-devkit
 * Copyright (c) 2025 Posit, PBC
 *
 * Host-side utilities for workspace generators.
 *
 * Generators in this workspace never touch the disk or spawn processes.
 * Everything they need from the host is provided here, as explicit values
 * passed to each generator:
 *
 * - **Tree**: a virtual filesystem that stages changes until the host
 *   flushes them (`FsTree`).
 * - **JSON**: JSON-with-comments parsing and order-preserving writes.
 * - **Scaffolding**: `generate_files` renders embedded templates.
 * - **Projects**: read and update `project.json` / `workspace.json`.
 * - **Packages**: package.json dependency edits and a deferred install task.
 * - **Tasks**: `GeneratorCallback` and `run_tasks_in_serial`.
 *
 * # Usage
 *
 * ```ignore
 * use vite_devkit::{FsTree, Tree, format_files};
 *
 * let mut tree = FsTree::new("/path/to/workspace");
 * let task = some_generator(&mut tree, &options)?;
 * format_files(&mut tree)?;
 * tree.flush_changes()?;
 * task()?;
 * ```
 */

mod error;
mod format;
mod generate;
mod json;
mod package_json;
mod path;
mod project;
mod tasks;
mod tree;

pub mod testing;

pub use error::{DevkitError, DevkitResult};
pub use format::format_files;
pub use generate::{
    Substitutions, TemplateFile, generate_files, render_template, substitute_path,
};
pub use json::{parse_jsonc, read_json_value, serialize_json, write_json};
pub use package_json::{
    Dependencies, PACKAGE_JSON, PackageInstaller, PackageManager, add_dependencies_to_package_json,
    detect_package_manager, install_packages_task,
};
pub use path::{basename, dirname, join_path_fragments, normalize_path, offset_from_root};
pub use project::{
    ProjectConfiguration, TargetConfiguration, add_project_configuration,
    read_project_configuration, update_project_configuration,
};
pub use tasks::{GeneratorCallback, noop_task, run_tasks_in_serial};
pub use tree::{ChangeType, FileChange, FsTree, Tree};
