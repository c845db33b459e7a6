/*
 * init.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * The init generator: Vite and Vitest packages in the root package.json.
 */

use crate::error::GeneratorResult;
use crate::schema::{InitGeneratorSchema, UiFramework};
use crate::versions::*;
use serde_json::{Map, Value};
use std::rc::Rc;
use tracing::{debug, info};
use vite_devkit::{
    Dependencies, GeneratorCallback, PACKAGE_JSON, PackageInstaller, Tree,
    add_dependencies_to_package_json, install_packages_task, read_json_value, write_json,
};

const NX_VITE_PACKAGE: &str = "@nrwl/vite";

/// Add the Vite toolchain to the workspace's devDependencies.
///
/// `@nrwl/vite` listed under `dependencies` is moved to `devDependencies`
/// first. Returns a task that installs packages when package.json changed,
/// and a no-op task otherwise.
pub fn init_generator(
    tree: &mut dyn Tree,
    schema: &InitGeneratorSchema,
    installer: Rc<dyn PackageInstaller>,
) -> GeneratorResult<GeneratorCallback> {
    let moved = move_to_dev_dependencies(tree)?;

    let dev_dependencies = dev_dependencies(schema.ui_framework);
    debug!(ui_framework = %schema.ui_framework, count = dev_dependencies.len(), "Checking Vite packages");
    let task = add_dependencies_to_package_json(
        tree,
        &Dependencies::new(),
        &dev_dependencies,
        installer.clone(),
    )?;
    if moved {
        // The move alone rewrote package.json.
        return Ok(install_packages_task(tree, installer));
    }
    Ok(task)
}

fn dev_dependencies(ui_framework: UiFramework) -> Dependencies {
    let mut deps: Dependencies = [
        (NX_VITE_PACKAGE, NX_VITE_VERSION),
        ("vite", VITE_VERSION),
        ("vitest", VITEST_VERSION),
        ("@vitest/ui", VITEST_UI_VERSION),
        ("vite-tsconfig-paths", VITE_TSCONFIG_PATHS_VERSION),
        ("vite-plugin-eslint", VITE_PLUGIN_ESLINT_VERSION),
    ]
    .into_iter()
    .map(|(name, version)| (name.to_string(), version.to_string()))
    .collect();

    if ui_framework == UiFramework::React {
        deps.insert(
            "@vitejs/plugin-react".to_string(),
            VITE_PLUGIN_REACT_VERSION.to_string(),
        );
    }
    deps
}

/// Returns whether package.json was rewritten.
fn move_to_dev_dependencies(tree: &mut dyn Tree) -> GeneratorResult<bool> {
    let mut package_json = read_json_value(tree, PACKAGE_JSON)?;
    let Some(object) = package_json.as_object_mut() else {
        return Ok(false);
    };

    let version = object
        .get_mut("dependencies")
        .and_then(Value::as_object_mut)
        .and_then(|deps| deps.shift_remove(NX_VITE_PACKAGE));
    let Some(version) = version else {
        return Ok(false);
    };

    let dev_dependencies = object
        .entry("devDependencies")
        .or_insert_with(|| Value::Object(Map::new()));
    if let Some(dev_dependencies) = dev_dependencies.as_object_mut() {
        dev_dependencies.insert(NX_VITE_PACKAGE.to_string(), version);
    }

    info!(package = NX_VITE_PACKAGE, "Moving package to devDependencies");
    write_json(tree, PACKAGE_JSON, &package_json)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::path::Path;
    use vite_devkit::testing::create_tree_with_empty_workspace;
    use vite_devkit::{DevkitResult, PackageManager};

    #[derive(Default)]
    struct RecordingInstaller {
        calls: RefCell<Vec<PackageManager>>,
    }

    impl PackageInstaller for RecordingInstaller {
        fn install(&self, _root: &Path, package_manager: PackageManager) -> DevkitResult<()> {
            self.calls.borrow_mut().push(package_manager);
            Ok(())
        }
    }

    #[test]
    fn test_adds_dev_dependencies() {
        let mut tree = create_tree_with_empty_workspace();
        let installer = Rc::new(RecordingInstaller::default());

        let task = init_generator(&mut tree, &InitGeneratorSchema::default(), installer.clone())
            .unwrap();

        let package_json = read_json_value(&tree, PACKAGE_JSON).unwrap();
        let dev_deps: Vec<&str> = package_json["devDependencies"]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(
            dev_deps,
            vec![
                "@nrwl/vite",
                "@vitest/ui",
                "vite",
                "vite-plugin-eslint",
                "vite-tsconfig-paths",
                "vitest"
            ]
        );
        assert_eq!(package_json["dependencies"], json!({}));

        task().unwrap();
        assert_eq!(*installer.calls.borrow(), vec![PackageManager::Npm]);
    }

    #[test]
    fn test_react_adds_plugin() {
        let mut tree = create_tree_with_empty_workspace();
        let schema = InitGeneratorSchema {
            ui_framework: UiFramework::React,
        };

        let _ = init_generator(&mut tree, &schema, Rc::new(RecordingInstaller::default()))
            .unwrap();

        let package_json = read_json_value(&tree, PACKAGE_JSON).unwrap();
        assert_eq!(
            package_json["devDependencies"]["@vitejs/plugin-react"],
            json!(VITE_PLUGIN_REACT_VERSION)
        );
    }

    #[test]
    fn test_moves_nx_vite_to_dev_dependencies() {
        let mut tree = create_tree_with_empty_workspace();
        write_json(
            &mut tree,
            PACKAGE_JSON,
            &json!({
                "name": "@proj/source",
                "dependencies": { "@nrwl/vite": "15.0.0", "react": "18.2.0" },
                "devDependencies": {}
            }),
        )
        .unwrap();

        let _ = init_generator(
            &mut tree,
            &InitGeneratorSchema::default(),
            Rc::new(RecordingInstaller::default()),
        )
        .unwrap();

        let package_json = read_json_value(&tree, PACKAGE_JSON).unwrap();
        assert_eq!(package_json["dependencies"], json!({ "react": "18.2.0" }));
        assert_eq!(
            package_json["devDependencies"]["@nrwl/vite"],
            json!(NX_VITE_VERSION)
        );
        assert!(package_json["dependencies"].get("@nrwl/vite").is_none());
    }

    #[test]
    fn test_move_alone_schedules_install() {
        let mut tree = create_tree_with_empty_workspace();
        let mut dev_dependencies: Map<String, Value> = dev_dependencies(UiFramework::None)
            .into_iter()
            .map(|(name, version)| (name, Value::String(version)))
            .collect();
        dev_dependencies.shift_remove(NX_VITE_PACKAGE);
        write_json(
            &mut tree,
            PACKAGE_JSON,
            &json!({
                "dependencies": { "@nrwl/vite": NX_VITE_VERSION },
                "devDependencies": dev_dependencies
            }),
        )
        .unwrap();
        let before = tree.read_string(PACKAGE_JSON).unwrap();
        let installer = Rc::new(RecordingInstaller::default());

        let task = init_generator(&mut tree, &InitGeneratorSchema::default(), installer.clone())
            .unwrap();
        task().unwrap();

        assert_ne!(tree.read_string(PACKAGE_JSON).unwrap(), before);
        let package_json = read_json_value(&tree, PACKAGE_JSON).unwrap();
        assert_eq!(package_json["dependencies"], json!({}));
        assert_eq!(
            package_json["devDependencies"]["@nrwl/vite"],
            json!(NX_VITE_VERSION)
        );
        assert_eq!(*installer.calls.borrow(), vec![PackageManager::Npm]);
    }

    #[test]
    fn test_second_run_schedules_no_install() {
        let mut tree = create_tree_with_empty_workspace();
        let installer = Rc::new(RecordingInstaller::default());
        let schema = InitGeneratorSchema::default();

        let _ = init_generator(&mut tree, &schema, installer.clone()).unwrap();
        let before = tree.read_string(PACKAGE_JSON).unwrap();

        let task = init_generator(&mut tree, &schema, installer.clone()).unwrap();
        task().unwrap();

        assert_eq!(tree.read_string(PACKAGE_JSON).unwrap(), before);
        assert!(installer.calls.borrow().is_empty());
    }
}
