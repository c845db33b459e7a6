//! Generator host
//!
//! Runs a generator against the workspace on disk: stages its changes,
//! prints them, flushes them unless this is a dry run, and finally runs the
//! generator's deferred tasks.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{debug, info};
use vite_devkit::{
    DevkitResult, FileChange, FsTree, GeneratorCallback, PACKAGE_JSON, PackageInstaller,
    PackageManager, Tree,
};
use vite_generators::GeneratorResult;

/// Options shared by every command.
pub struct HostArgs {
    pub cwd: Option<PathBuf>,
    pub dry_run: bool,
}

impl HostArgs {
    /// The workspace root: `--cwd`, or the current directory.
    pub fn workspace_root(&self) -> Result<PathBuf> {
        let root = match &self.cwd {
            Some(cwd) => cwd.clone(),
            None => std::env::current_dir().context("Failed to get current directory")?,
        };
        if !root.join(PACKAGE_JSON).is_file() {
            bail!(
                "{} is not a workspace root (no {} found)",
                root.display(),
                PACKAGE_JSON
            );
        }
        Ok(root)
    }
}

/// Installer that tells the user which command to run.
///
/// Generators never spawn processes; the host only reports the install
/// command once the new package.json is on disk.
pub struct LoggingInstaller;

impl PackageInstaller for LoggingInstaller {
    fn install(&self, root: &Path, package_manager: PackageManager) -> DevkitResult<()> {
        info!(root = %root.display(), command = %package_manager.install_command(), "package.json changed");
        println!(
            "\nRun `{}` in {} to install the new packages.",
            package_manager.install_command(),
            root.display()
        );
        Ok(())
    }
}

/// Run `generator` on the workspace at `root`.
///
/// Nothing is written when the generator fails. On a dry run the changes
/// are printed but neither flushed nor followed by the deferred tasks.
pub fn run_generator<F>(root: &Path, dry_run: bool, generator: F) -> Result<Vec<FileChange>>
where
    F: FnOnce(&mut FsTree) -> GeneratorResult<GeneratorCallback>,
{
    let mut tree = FsTree::new(root);
    let task = generator(&mut tree).context("Generator failed; no files were changed")?;

    let changes = tree.list_changes();
    print_changes(&changes);

    if dry_run {
        println!("\nNOTE: The \"dryRun\" flag means no changes were made.");
        return Ok(changes);
    }

    let written = tree
        .flush_changes()
        .context("Failed to write the generated changes")?;
    debug!(files = written.len(), root = %tree.root().display(), "Flushed changes");

    task().context("Failed to run generator tasks")?;
    Ok(written)
}

fn print_changes(changes: &[FileChange]) {
    if changes.is_empty() {
        println!("No changes were made.");
        return;
    }
    for change in changes {
        println!("{} {}", change.change_type, change.path);
    }
}
