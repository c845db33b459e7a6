/*
 * path.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Workspace-relative path helpers.
 *
 * Paths inside a tree are always forward-slash separated and relative to
 * the workspace root, regardless of the host platform.
 */

/// Normalize a workspace-relative path.
///
/// Backslashes become forward slashes, `.` segments and empty segments are
/// dropped, and `..` pops the previous segment (leading `..` segments are
/// kept). The result never starts with `/` or `./`; the workspace root
/// itself normalizes to the empty string.
pub fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(last) if *last != ".." => {
                    segments.pop();
                }
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Join path fragments and normalize the result.
///
/// ```
/// use vite_devkit::join_path_fragments;
///
/// assert_eq!(join_path_fragments(&["apps/web", "tsconfig.json"]), "apps/web/tsconfig.json");
/// assert_eq!(join_path_fragments(&["", "tsconfig.json"]), "tsconfig.json");
/// ```
pub fn join_path_fragments(fragments: &[&str]) -> String {
    normalize_path(&fragments.join("/"))
}

/// Relative prefix leading from a project directory back to the workspace root.
///
/// Each segment of the normalized project root contributes one `../`. The
/// workspace root (`""` or `"."`) yields the empty string.
pub fn offset_from_root(project_root: &str) -> String {
    let normalized = normalize_path(project_root);
    if normalized.is_empty() {
        return String::new();
    }
    "../".repeat(normalized.split('/').count())
}

/// Parent directory of a workspace-relative path (`""` for top-level entries).
pub fn dirname(path: &str) -> String {
    let normalized = normalize_path(path);
    match normalized.rfind('/') {
        Some(index) => normalized[..index].to_string(),
        None => String::new(),
    }
}

/// Final segment of a workspace-relative path.
pub fn basename(path: &str) -> String {
    let normalized = normalize_path(path);
    match normalized.rfind('/') {
        Some(index) => normalized[index + 1..].to_string(),
        None => normalized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("./apps/web/"), "apps/web");
        assert_eq!(normalize_path("apps\\web\\src"), "apps/web/src");
        assert_eq!(normalize_path("apps/web/../api"), "apps/api");
        assert_eq!(normalize_path("/libs//ui"), "libs/ui");
        assert_eq!(normalize_path("../shared"), "../shared");
        assert_eq!(normalize_path("."), "");
        assert_eq!(normalize_path(""), "");
    }

    #[test]
    fn test_join_path_fragments() {
        assert_eq!(
            join_path_fragments(&["libs/ui", "tsconfig.lib.json"]),
            "libs/ui/tsconfig.lib.json"
        );
        assert_eq!(
            join_path_fragments(&["../../", "coverage", "libs/ui"]),
            "../../coverage/libs/ui"
        );
        assert_eq!(join_path_fragments(&[".", "vite.config.ts"]), "vite.config.ts");
    }

    #[test]
    fn test_offset_from_root() {
        assert_eq!(offset_from_root("apps/web"), "../../");
        assert_eq!(offset_from_root("libs/shared/ui"), "../../../");
        assert_eq!(offset_from_root("web/"), "../");
        assert_eq!(offset_from_root("."), "");
        assert_eq!(offset_from_root(""), "");
    }

    #[test]
    fn test_dirname_and_basename() {
        assert_eq!(dirname("apps/web/project.json"), "apps/web");
        assert_eq!(dirname("package.json"), "");
        assert_eq!(basename("apps/web/project.json"), "project.json");
        assert_eq!(basename("package.json"), "package.json");
    }
}
