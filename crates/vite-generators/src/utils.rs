/*
 * utils.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Shared generator steps: target detection, the test target, and
 * `vite.config.ts`.
 */

use crate::error::GeneratorResult;
use crate::schema::UiFramework;
use crate::templates;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use vite_devkit::{
    DevkitError, Substitutions, TargetConfiguration, Tree, join_path_fragments, offset_from_root,
    read_project_configuration, render_template, update_project_configuration,
};

/// Executor of the test target written by the vitest generator.
pub const VITEST_EXECUTOR: &str = "@nrwl/vite:test";

/// Test target name used when the project has none.
pub const DEFAULT_TEST_TARGET: &str = "test";

const BUILD_EXECUTORS: &[&str] = &[
    "@nrwl/vite:build",
    "@nxext/vite:build",
    "@nrwl/js:babel",
    "@nrwl/js:swc",
    "@nrwl/webpack:webpack",
    "@nrwl/rollup:rollup",
    "@nrwl/web:rollup",
];

const SERVE_EXECUTORS: &[&str] = &[
    "@nrwl/vite:dev-server",
    "@nxext/vite:dev",
    "@nrwl/webpack:dev-server",
];

const TEST_EXECUTORS: &[&str] = &["@nrwl/vite:test", "@nxext/vite:test", "@nrwl/jest:jest"];

const VITE_CONFIG_FILES: &[&str] = &["vite.config.ts", "vite.config.js"];

/// Names of the targets a project already has, classified by executor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistingTargets {
    pub build_target: Option<String>,
    pub serve_target: Option<String>,
    pub test_target: Option<String>,
}

/// Classify `targets` by their executor.
///
/// When several targets use executors of the same kind, the last one wins.
/// Targets with other executors are ignored.
pub fn find_existing_targets(targets: &IndexMap<String, TargetConfiguration>) -> ExistingTargets {
    let mut found = ExistingTargets::default();
    for (name, target) in targets {
        let Some(executor) = target.executor.as_deref() else {
            continue;
        };
        if BUILD_EXECUTORS.contains(&executor) {
            found.build_target = Some(name.clone());
        } else if SERVE_EXECUTORS.contains(&executor) {
            found.serve_target = Some(name.clone());
        } else if TEST_EXECUTORS.contains(&executor) {
            found.test_target = Some(name.clone());
        }
    }
    found
}

/// Point the project's `target` at the vitest executor.
///
/// An existing target keeps its options and configurations, minus
/// `jestConfig`. A missing target is created with a coverage output and
/// `passWithNoTests`.
pub fn add_or_change_test_target(
    tree: &mut dyn Tree,
    project: &str,
    target: &str,
) -> GeneratorResult<()> {
    let mut config = read_project_configuration(tree, project)?;

    match config.targets.get_mut(target) {
        Some(existing) => {
            debug!(project, target, executor = ?existing.executor, "Converting test target");
            existing.executor = Some(VITEST_EXECUTOR.to_string());
            if let Some(options) = existing.options.as_mut() {
                options.remove("jestConfig");
            }
        }
        None => {
            let coverage = coverage_path(&config.root, project);
            let mut options = Map::new();
            options.insert("passWithNoTests".to_string(), Value::Bool(true));
            options.insert(
                "reportsDirectory".to_string(),
                Value::String(join_path_fragments(&[
                    offset_from_root(&config.root).as_str(),
                    coverage.as_str(),
                ])),
            );
            debug!(project, target, "Adding test target");
            config.targets.insert(
                target.to_string(),
                TargetConfiguration {
                    executor: Some(VITEST_EXECUTOR.to_string()),
                    outputs: Some(vec![coverage]),
                    options: Some(options),
                    ..TargetConfiguration::default()
                },
            );
        }
    }

    update_project_configuration(tree, project, &config)?;
    Ok(())
}

fn coverage_path(project_root: &str, project: &str) -> String {
    if project_root.is_empty() || project_root == "." {
        join_path_fragments(&["coverage", project])
    } else {
        join_path_fragments(&["coverage", project_root])
    }
}

/// Options for [`write_vite_config`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViteConfigOptions {
    pub project: String,
    pub ui_framework: UiFramework,
    pub in_source_tests: bool,
    /// Add the vitest `test` block
    pub include_vitest: bool,
}

/// Write `vite.config.ts` in the project root.
///
/// A project that already has a Vite config file keeps it; a warning is
/// logged instead.
pub fn write_vite_config(tree: &mut dyn Tree, options: &ViteConfigOptions) -> GeneratorResult<()> {
    let config = read_project_configuration(tree, &options.project)?;
    let root = config.root.as_str();

    if let Some(existing) = VITE_CONFIG_FILES
        .iter()
        .map(|file| join_path_fragments(&[root, file]))
        .find(|path| tree.exists(path))
    {
        warn!(
            path = %existing,
            "Vite config already exists; add the vitest settings to it manually"
        );
        return Ok(());
    }

    let offset = offset_from_root(root);
    let mut data = Substitutions::new();
    data.insert(
        "react".to_string(),
        Value::Bool(options.ui_framework == UiFramework::React),
    );
    data.insert("inSourceTests".to_string(), Value::Bool(options.in_source_tests));
    data.insert("includeVitest".to_string(), Value::Bool(options.include_vitest));
    data.insert(
        "tsConfigPathsRoot".to_string(),
        Value::String(if offset.is_empty() {
            "./".to_string()
        } else {
            offset.clone()
        }),
    );
    data.insert("offsetFromRoot".to_string(), Value::String(offset));

    let content = render_template(templates::vite::VITE_CONFIG_TS, &data).map_err(|message| {
        DevkitError::TemplateRender {
            path: "vite.config.ts".to_string(),
            message,
        }
    })?;

    let path = join_path_fragments(&[root, VITE_CONFIG_FILES[0]]);
    info!(%path, "Writing Vite config");
    tree.write_str(&path, &content);
    Ok(())
}
