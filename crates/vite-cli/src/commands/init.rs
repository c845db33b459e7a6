//! Init command - add the Vite toolchain to package.json

use std::rc::Rc;

use anyhow::Result;
use tracing::info;
use vite_generators::{InitGeneratorSchema, UiFramework, init_generator};

use crate::host::{HostArgs, LoggingInstaller, run_generator};

/// Arguments for the init command.
pub struct InitArgs {
    pub ui_framework: Option<String>,
}

/// Execute the init command.
pub fn execute(host: &HostArgs, args: InitArgs) -> Result<()> {
    let schema = InitGeneratorSchema {
        ui_framework: match args.ui_framework.as_deref() {
            Some(id) => id.parse::<UiFramework>()?,
            None => UiFramework::default(),
        },
    };
    let root = host.workspace_root()?;
    info!(root = %root.display(), ui_framework = %schema.ui_framework, "Running init generator");

    run_generator(&root, host.dry_run, |tree| {
        init_generator(tree, &schema, Rc::new(LoggingInstaller))
    })?;
    Ok(())
}
