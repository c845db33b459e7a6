/*
 * format.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Normalize the formatting of files a generator touched.
 */

use crate::error::DevkitResult;
use crate::json::{parse_jsonc, serialize_json};
use crate::tree::{ChangeType, Tree};
use tracing::{debug, warn};

/// Reformat every created or updated file in the tree.
///
/// `.json` files are re-serialized in the standard layout (two-space
/// indent, trailing newline, key order preserved). Other UTF-8 files get a
/// trailing newline if they lack one. Binary files are left alone.
pub fn format_files(tree: &mut dyn Tree) -> DevkitResult<()> {
    for change in tree.list_changes() {
        if change.change_type == ChangeType::Delete {
            continue;
        }
        let Some(content) = change.content else {
            continue;
        };
        let Ok(text) = String::from_utf8(content) else {
            continue;
        };

        let formatted = if change.path.ends_with(".json") {
            match parse_jsonc(&text) {
                Ok(value) => serialize_json(&value).unwrap_or_else(|_| text.clone()),
                Err(message) => {
                    warn!(path = %change.path, %message, "Skipping formatting of invalid JSON");
                    continue;
                }
            }
        } else if !text.is_empty() && !text.ends_with('\n') {
            format!("{}\n", text)
        } else {
            continue;
        };

        if formatted != text {
            debug!(path = %change.path, "Formatted file");
            tree.write_str(&change.path, &formatted);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::FsTree;

    #[test]
    fn test_format_json_and_text() {
        let mut tree = FsTree::in_memory();
        tree.write_str("apps/web/tsconfig.spec.json", "{\"extends\": \"./tsconfig.json\", \"include\": [\"src/**/*.spec.ts\",]}");
        tree.write_str("apps/web/vite.config.ts", "export default {};");
        tree.write_str("apps/web/broken.json", "{ nope");
        tree.write(
            "apps/web/logo.bin",
            &[0xff, 0xfe, 0x00],
        );

        format_files(&mut tree).unwrap();

        assert_eq!(
            tree.read_string("apps/web/tsconfig.spec.json").unwrap().unwrap(),
            "{\n  \"extends\": \"./tsconfig.json\",\n  \"include\": [\n    \"src/**/*.spec.ts\"\n  ]\n}\n"
        );
        assert_eq!(
            tree.read_string("apps/web/vite.config.ts").unwrap().unwrap(),
            "export default {};\n"
        );
        assert_eq!(
            tree.read_string("apps/web/broken.json").unwrap().unwrap(),
            "{ nope"
        );
        assert_eq!(tree.read("apps/web/logo.bin").unwrap(), Some(vec![0xff, 0xfe, 0x00]));
    }
}
