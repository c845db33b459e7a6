/*
 * vitest.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * The vitest generator.
 *
 * Sets up Vitest for an existing project:
 *
 * 1. Creates or converts the project's test target.
 * 2. Runs the init generator (root package.json).
 * 3. Writes `vite.config.ts` unless asked not to.
 * 4. Scaffolds `tsconfig.spec.json`.
 * 5. References it from the project's `tsconfig.json`, and for in-source
 *    tests adds `vitest/importMeta` to the lib or app tsconfig.
 * 6. Formats the changed files.
 *
 * All edits are staged in the tree. The returned callback runs the deferred
 * tasks (package installation) in order once the host has flushed.
 */

use crate::error::GeneratorResult;
use crate::init::init_generator;
use crate::schema::{InitGeneratorSchema, VitestGeneratorSchema};
use crate::templates::VITEST_FILES;
use crate::utils::{
    DEFAULT_TEST_TARGET, ViteConfigOptions, add_or_change_test_target, find_existing_targets,
    write_vite_config,
};
use serde_json::Value;
use std::rc::Rc;
use tracing::{debug, info};
use vite_config::{
    ConfigNode, ConfigResult, Edit, FieldPath, ensure_listed_type, ensure_reference, update_config,
    update_optional_config,
};
use vite_devkit::{
    GeneratorCallback, PackageInstaller, Substitutions, Tree, format_files, generate_files,
    join_path_fragments, offset_from_root, read_project_configuration, run_tasks_in_serial,
};

const SPEC_TSCONFIG_REFERENCE: &str = "./tsconfig.spec.json";
const IMPORT_META_TYPE: &str = "vitest/importMeta";

/// Set up Vitest for `schema.project`.
///
/// # Errors
///
/// `InvalidOptions` for unusable options, `ProjectNotFound` when the project
/// does not exist, and `MalformedDocument` when a tsconfig file does not
/// have the expected shape. The tree may hold partial changes after an
/// error; the host must not flush it.
pub fn vitest_generator(
    tree: &mut dyn Tree,
    schema: &VitestGeneratorSchema,
    installer: Rc<dyn PackageInstaller>,
) -> GeneratorResult<GeneratorCallback> {
    schema.validate()?;
    let mut tasks: Vec<GeneratorCallback> = Vec::new();

    let project = read_project_configuration(tree, &schema.project)?;
    let test_target = schema
        .test_target
        .clone()
        .or_else(|| find_existing_targets(&project.targets).test_target)
        .unwrap_or_else(|| DEFAULT_TEST_TARGET.to_string());
    info!(project = %schema.project, root = %project.root, %test_target, "Setting up Vitest");

    add_or_change_test_target(tree, &schema.project, &test_target)?;

    let init_task = init_generator(
        tree,
        &InitGeneratorSchema {
            ui_framework: schema.ui_framework,
        },
        installer,
    )?;
    tasks.push(init_task);

    if !schema.skip_vite_config {
        write_vite_config(
            tree,
            &ViteConfigOptions {
                project: schema.project.clone(),
                ui_framework: schema.ui_framework,
                in_source_tests: schema.in_source_tests,
                include_vitest: true,
            },
        )?;
    }

    create_files(tree, schema, &project.root)?;
    update_ts_config(tree, schema, &project.root)?;

    format_files(tree)?;

    Ok(run_tasks_in_serial(tasks))
}

fn create_files(
    tree: &mut dyn Tree,
    schema: &VitestGeneratorSchema,
    project_root: &str,
) -> GeneratorResult<()> {
    let mut substitutions = match serde_json::to_value(schema) {
        Ok(Value::Object(map)) => map,
        _ => Substitutions::new(),
    };
    substitutions.insert("tmpl".to_string(), Value::String(String::new()));
    substitutions.insert(
        "projectRoot".to_string(),
        Value::String(project_root.to_string()),
    );
    substitutions.insert(
        "offsetFromRoot".to_string(),
        Value::String(offset_from_root(project_root)),
    );

    let written = generate_files(tree, &VITEST_FILES, project_root, &substitutions)?;
    debug!(files = ?written, "Scaffolded Vitest files");
    Ok(())
}

fn update_ts_config(
    tree: &mut dyn Tree,
    schema: &VitestGeneratorSchema,
    project_root: &str,
) -> GeneratorResult<()> {
    let tsconfig = join_path_fragments(&[project_root, "tsconfig.json"]);
    let edit = update_optional_config(tree, &tsconfig, |doc| {
        ensure_reference(doc, SPEC_TSCONFIG_REFERENCE)
    })?;
    if edit.is_changed() {
        debug!(path = %tsconfig, "Referenced tsconfig.spec.json");
    }

    if schema.in_source_tests {
        let lib = join_path_fragments(&[project_root, "tsconfig.lib.json"]);
        let app = join_path_fragments(&[project_root, "tsconfig.app.json"]);
        let target = [lib, app].into_iter().find(|path| tree.exists(path));
        match target {
            Some(path) => {
                if update_config(tree, &path, add_import_meta_type)?.is_changed() {
                    debug!(%path, "Added in-source test types");
                }
            }
            None => debug!(project_root, "No lib or app tsconfig for in-source test types"),
        }
    }
    Ok(())
}

fn add_import_meta_type(doc: &mut ConfigNode) -> ConfigResult<Edit> {
    let types: FieldPath = "compilerOptions.types".parse()?;
    ensure_listed_type(doc, &types, IMPORT_META_TYPE)
}
