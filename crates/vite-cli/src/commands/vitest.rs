//! Vitest command - configure Vitest for a project
//!
//! Options come from an optional JSON options file, overridden by flags.

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};
use tracing::info;
use vite_devkit::parse_jsonc;
use vite_generators::{UiFramework, VitestGeneratorSchema, vitest_generator};

use crate::host::{HostArgs, LoggingInstaller, run_generator};

/// Arguments for the vitest command.
pub struct VitestArgs {
    pub project: Option<String>,
    pub options: Option<PathBuf>,
    pub ui_framework: Option<String>,
    pub in_source_tests: bool,
    pub skip_vite_config: bool,
    pub test_target: Option<String>,
}

/// Execute the vitest command.
pub fn execute(host: &HostArgs, args: VitestArgs) -> Result<()> {
    let schema = build_schema(&args)?;
    let root = host.workspace_root()?;
    info!(root = %root.display(), project = %schema.project, "Running vitest generator");

    run_generator(&root, host.dry_run, |tree| {
        vitest_generator(tree, &schema, Rc::new(LoggingInstaller))
    })?;
    Ok(())
}

/// Merge the options file and the flags into generator options.
fn build_schema(args: &VitestArgs) -> Result<VitestGeneratorSchema> {
    let mut options = match &args.options {
        Some(path) => read_options_file(path)?,
        None => Map::new(),
    };

    if let Some(project) = &args.project {
        options.insert("project".to_string(), Value::String(project.clone()));
    }
    if let Some(id) = &args.ui_framework {
        let framework: UiFramework = id.parse()?;
        options.insert(
            "uiFramework".to_string(),
            Value::String(framework.id().to_string()),
        );
    }
    if args.in_source_tests {
        options.insert("inSourceTests".to_string(), Value::Bool(true));
    }
    if args.skip_vite_config {
        options.insert("skipViteConfig".to_string(), Value::Bool(true));
    }
    if let Some(target) = &args.test_target {
        options.insert("testTarget".to_string(), Value::String(target.clone()));
    }

    let schema: VitestGeneratorSchema =
        serde_json::from_value(Value::Object(options)).context("Invalid vitest options")?;
    schema.validate()?;
    Ok(schema)
}

fn read_options_file(path: &Path) -> Result<Map<String, Value>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read options file {}", path.display()))?;
    match parse_jsonc(&text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => bail!("Options file {} must contain a JSON object", path.display()),
        Err(message) => bail!("Failed to parse options file {}: {}", path.display(), message),
    }
}
