/*
 * tree.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Virtual workspace filesystem used by generators.
 *
 * Generators never touch the disk directly. They read and write through a
 * `Tree`, which stages every change in memory. The host decides whether to
 * flush the staged changes (a normal run) or just report them (a dry run).
 * Nothing reaches the disk unless the whole generator succeeded.
 *
 * # Atomicity
 *
 * `FsTree::flush_changes` writes each file to a temporary file in the same
 * directory and renames it over the target, so a file is either fully
 * replaced or left as it was.
 */

use crate::error::{DevkitError, DevkitResult};
use crate::path::normalize_path;
use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Kind of staged change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    /// File did not exist before
    Create,
    /// File existed and gets new content
    Update,
    /// File existed and is removed
    Delete,
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeType::Create => write!(f, "CREATE"),
            ChangeType::Update => write!(f, "UPDATE"),
            ChangeType::Delete => write!(f, "DELETE"),
        }
    }
}

/// A staged change, as reported by [`Tree::list_changes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    /// Workspace-relative path
    pub path: String,
    /// What happens to the file
    pub change_type: ChangeType,
    /// New content (`None` for deletions)
    pub content: Option<Vec<u8>>,
}

/// Virtual filesystem rooted at a workspace directory.
///
/// All paths are workspace-relative and forward-slash separated; every
/// implementation normalizes them with [`normalize_path`] before use.
pub trait Tree {
    /// Workspace root on the host filesystem.
    fn root(&self) -> &Path;

    /// Read file contents. Returns `Ok(None)` when the file does not exist.
    fn read(&self, path: &str) -> DevkitResult<Option<Vec<u8>>>;

    /// Read file contents as UTF-8.
    ///
    /// Default implementation reads bytes and converts to string.
    fn read_string(&self, path: &str) -> DevkitResult<Option<String>> {
        match self.read(path)? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| DevkitError::InvalidUtf8(normalize_path(path))),
            None => Ok(None),
        }
    }

    /// Stage new content for a file (creates or overwrites).
    fn write(&mut self, path: &str, content: &[u8]);

    /// Stage new text content for a file.
    fn write_str(&mut self, path: &str, content: &str) {
        self.write(path, content.as_bytes());
    }

    /// Whether a file or directory exists at `path`.
    fn exists(&self, path: &str) -> bool;

    /// Whether a file exists at `path`.
    fn is_file(&self, path: &str) -> bool;

    /// Stage removal of a file.
    fn delete(&mut self, path: &str);

    /// Names of the entries directly inside `dir`, sorted.
    fn children(&self, dir: &str) -> Vec<String>;

    /// Staged changes, in the order they were first made.
    fn list_changes(&self) -> Vec<FileChange>;
}

#[derive(Debug, Clone)]
enum Staged {
    Write(Vec<u8>),
    Delete,
}

/// A [`Tree`] that overlays staged changes on a workspace directory.
///
/// `FsTree::in_memory()` has no backing directory at all, which makes it the
/// tree of choice for tests.
#[derive(Debug, Clone)]
pub struct FsTree {
    root: PathBuf,
    backed: bool,
    staged: IndexMap<String, Staged>,
}

impl FsTree {
    /// Create a tree over an existing workspace directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            backed: true,
            staged: IndexMap::new(),
        }
    }

    /// Create a tree with no backing directory.
    pub fn in_memory() -> Self {
        Self {
            root: PathBuf::from("/virtual"),
            backed: false,
            staged: IndexMap::new(),
        }
    }

    fn disk_path(&self, path: &str) -> Option<PathBuf> {
        self.backed.then(|| self.root.join(path))
    }

    fn disk_is_file(&self, path: &str) -> bool {
        self.disk_path(path).is_some_and(|full| full.is_file())
    }

    fn disk_read(&self, path: &str) -> DevkitResult<Option<Vec<u8>>> {
        let Some(full) = self.disk_path(path) else {
            return Ok(None);
        };
        if !full.is_file() {
            return Ok(None);
        }
        fs::read(&full)
            .map(Some)
            .map_err(|e| DevkitError::io(path, e))
    }

    /// Commit every staged change to the backing directory.
    ///
    /// Returns the changes that were applied. For an in-memory tree the
    /// changes are simply discarded.
    pub fn flush_changes(&mut self) -> DevkitResult<Vec<FileChange>> {
        let changes = self.list_changes();
        if !self.backed {
            self.staged.clear();
            return Ok(changes);
        }

        for change in &changes {
            let full = self.root.join(&change.path);
            match (&change.change_type, &change.content) {
                (ChangeType::Delete, _) => {
                    debug!(path = %change.path, "Removing file");
                    match fs::remove_file(&full) {
                        Ok(()) => {}
                        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                        Err(e) => return Err(DevkitError::io(&change.path, e)),
                    }
                }
                (_, Some(content)) => {
                    debug!(path = %change.path, bytes = content.len(), "Writing file");
                    write_atomic(&full, content).map_err(|e| DevkitError::io(&change.path, e))?;
                }
                (_, None) => {}
            }
        }

        self.staged.clear();
        Ok(changes)
    }
}

impl Tree for FsTree {
    fn root(&self) -> &Path {
        &self.root
    }

    fn read(&self, path: &str) -> DevkitResult<Option<Vec<u8>>> {
        let path = normalize_path(path);
        match self.staged.get(&path) {
            Some(Staged::Write(content)) => Ok(Some(content.clone())),
            Some(Staged::Delete) => Ok(None),
            None => self.disk_read(&path),
        }
    }

    fn write(&mut self, path: &str, content: &[u8]) {
        let path = normalize_path(path);
        // Writing back the on-disk content is not a change.
        match self.disk_read(&path) {
            Ok(Some(existing)) if existing == content => {
                self.staged.shift_remove(&path);
                return;
            }
            Ok(_) => {}
            Err(err) => {
                warn!(%path, error = %err, "Cannot compare with the file on disk; staging the write");
            }
        }
        self.staged.insert(path, Staged::Write(content.to_vec()));
    }

    fn exists(&self, path: &str) -> bool {
        let path = normalize_path(path);
        if path.is_empty() {
            return true;
        }
        match self.staged.get(&path) {
            Some(Staged::Write(_)) => true,
            Some(Staged::Delete) => false,
            None => {
                let prefix = format!("{}/", path);
                let staged_below = self.staged.iter().any(|(staged_path, staged)| {
                    matches!(staged, Staged::Write(_)) && staged_path.starts_with(&prefix)
                });
                staged_below || self.disk_path(&path).is_some_and(|full| full.exists())
            }
        }
    }

    fn is_file(&self, path: &str) -> bool {
        let path = normalize_path(path);
        match self.staged.get(&path) {
            Some(Staged::Write(_)) => true,
            Some(Staged::Delete) => false,
            None => self.disk_is_file(&path),
        }
    }

    fn delete(&mut self, path: &str) {
        let path = normalize_path(path);
        if self.disk_is_file(&path) {
            self.staged.insert(path, Staged::Delete);
        } else {
            self.staged.shift_remove(&path);
        }
    }

    fn children(&self, dir: &str) -> Vec<String> {
        let dir = normalize_path(dir);
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{}/", dir)
        };

        let mut names = BTreeSet::new();
        if let Some(full) = self.disk_path(&dir) {
            if let Ok(entries) = fs::read_dir(full) {
                for entry in entries.flatten() {
                    let name = entry.file_name().to_string_lossy().into_owned();
                    let child = format!("{}{}", prefix, name);
                    if !matches!(self.staged.get(&child), Some(Staged::Delete)) {
                        names.insert(name);
                    }
                }
            }
        }

        for (staged_path, staged) in &self.staged {
            if !matches!(staged, Staged::Write(_)) {
                continue;
            }
            if let Some(rest) = staged_path.strip_prefix(&prefix) {
                if let Some(first) = rest.split('/').next() {
                    if !first.is_empty() {
                        names.insert(first.to_string());
                    }
                }
            }
        }

        names.into_iter().collect()
    }

    fn list_changes(&self) -> Vec<FileChange> {
        self.staged
            .iter()
            .map(|(path, staged)| match staged {
                Staged::Write(content) => FileChange {
                    path: path.clone(),
                    change_type: if self.disk_is_file(path) {
                        ChangeType::Update
                    } else {
                        ChangeType::Create
                    },
                    content: Some(content.clone()),
                },
                Staged::Delete => FileChange {
                    path: path.clone(),
                    change_type: ChangeType::Delete,
                    content: None,
                },
            })
            .collect()
    }
}

/// Replace `target` with `content`, or leave it untouched on failure.
fn write_atomic(target: &Path, content: &[u8]) -> std::io::Result<()> {
    let parent = target.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let permissions = match fs::metadata(target) {
        Ok(metadata) => Some(metadata.permissions()),
        Err(_) => default_permissions(),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    if let Some(permissions) = permissions {
        temp.as_file().set_permissions(permissions)?;
    }
    temp.persist(target).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}
