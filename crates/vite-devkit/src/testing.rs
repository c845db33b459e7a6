/*
 * testing.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Fixtures for generator tests.
 */

use crate::tree::{FsTree, Tree};

/// An in-memory tree holding a minimal empty workspace.
///
/// Contains `package.json` (with empty dependency sections), `nx.json` and
/// `tsconfig.base.json`. There is no `workspace.json`; projects are
/// discovered from their `project.json` files.
pub fn create_tree_with_empty_workspace() -> FsTree {
    let mut tree = FsTree::in_memory();
    tree.write_str(
        "package.json",
        "{\n  \"name\": \"@proj/source\",\n  \"dependencies\": {},\n  \"devDependencies\": {}\n}\n",
    );
    tree.write_str(
        "nx.json",
        "{\n  \"npmScope\": \"proj\",\n  \"affected\": {\n    \"defaultBase\": \"main\"\n  }\n}\n",
    );
    tree.write_str(
        "tsconfig.base.json",
        "{\n  \"compilerOptions\": {\n    \"paths\": {}\n  }\n}\n",
    );
    tree
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::read_json_value;

    #[test]
    fn test_empty_workspace_files_parse() {
        let tree = create_tree_with_empty_workspace();
        for path in ["package.json", "nx.json", "tsconfig.base.json"] {
            assert!(read_json_value(&tree, path).is_ok(), "{path} should parse");
        }
        assert!(!tree.exists("workspace.json"));
    }
}
