/*
 * json.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * JSON-with-comments parsing and JSON file helpers.
 *
 * Workspace configuration files (tsconfig, project.json) routinely carry
 * line and block comments and trailing commas. They are accepted on read;
 * writes always produce plain JSON, pretty-printed with two-space indent and
 * a trailing newline. Object keys keep their original order.
 */

use crate::error::{DevkitError, DevkitResult};
use crate::path::normalize_path;
use crate::tree::Tree;
use serde::Serialize;
use serde_json::Value;

/// Parse JSON text that may contain comments and trailing commas.
///
/// Comments are blanked out rather than removed, so line and column numbers
/// in the returned error message still point into the original text.
pub fn parse_jsonc(text: &str) -> Result<Value, String> {
    let stripped = strip_trailing_commas(&strip_comments(text));
    serde_json::from_str(&stripped).map_err(|e| e.to_string())
}

/// Serialize a value the way workspace files are written.
pub fn serialize_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    Ok(text)
}

/// Replace comments with whitespace, keeping newlines.
fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                out.push_str("  ");
                chars.next();
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    out.push(if next == '\r' { '\r' } else { ' ' });
                    chars.next();
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                out.push_str("  ");
                chars.next();
                let mut previous = '\0';
                for next in chars.by_ref() {
                    if previous == '*' && next == '/' {
                        out.push(' ');
                        break;
                    }
                    out.push(if next == '\n' || next == '\r' { next } else { ' ' });
                    previous = next;
                }
            }
            _ => out.push(c),
        }
    }

    out
}

/// Drop commas that are directly followed (ignoring whitespace) by `}` or `]`.
fn strip_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut index = 0;

    while index < chars.len() {
        let c = chars[index];
        if in_string {
            out.push(c);
            if c == '\\' {
                if let Some(&escaped) = chars.get(index + 1) {
                    out.push(escaped);
                    index += 1;
                }
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
            out.push(c);
        } else if c == ',' {
            let next = chars[index + 1..].iter().find(|ch| !ch.is_whitespace());
            if matches!(next, Some(&('}' | ']'))) {
                out.push(' ');
            } else {
                out.push(c);
            }
        } else {
            out.push(c);
        }
        index += 1;
    }

    out
}

/// Read a JSON file from the tree as an untyped value.
pub fn read_json_value(tree: &dyn Tree, path: &str) -> DevkitResult<Value> {
    let normalized = normalize_path(path);
    let text = tree
        .read_string(&normalized)?
        .ok_or_else(|| DevkitError::NotFound(normalized.clone()))?;
    parse_jsonc(&text).map_err(|message| DevkitError::Parse {
        path: normalized,
        message,
    })
}

/// Serialize a value and stage it at `path`.
pub fn write_json<T: Serialize + ?Sized>(
    tree: &mut dyn Tree,
    path: &str,
    value: &T,
) -> DevkitResult<()> {
    let text = serialize_json(value).map_err(|source| DevkitError::Json {
        path: normalize_path(path),
        source,
    })?;
    tree.write_str(path, &text);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::FsTree;
    use serde_json::json;

    #[test]
    fn test_parse_jsonc_comments_and_trailing_commas() {
        let text = r#"{
  // Base options
  "compilerOptions": {
    "strict": true, /* inline */
    "types": ["node",],
  },
  "files": [],
}"#;
        let value = parse_jsonc(text).unwrap();
        assert_eq!(
            value,
            json!({
                "compilerOptions": { "strict": true, "types": ["node"] },
                "files": []
            })
        );
    }

    #[test]
    fn test_parse_jsonc_keeps_comment_markers_inside_strings() {
        let text = r#"{ "url": "https://example.com/*x*/", "glob": "src/**/*.ts", "q": "a\"//b" }"#;
        let value = parse_jsonc(text).unwrap();
        assert_eq!(value["url"], "https://example.com/*x*/");
        assert_eq!(value["glob"], "src/**/*.ts");
        assert_eq!(value["q"], "a\"//b");
    }

    #[test]
    fn test_parse_jsonc_error_points_at_original_line() {
        let text = "{\n  // comment\n  \"a\": 1\n  \"b\": 2\n}";
        let message = parse_jsonc(text).unwrap_err();
        assert!(message.contains("line 4"), "unexpected message: {message}");
    }

    #[test]
    fn test_serialize_json_preserves_key_order() {
        let value = parse_jsonc(r#"{"z": 1, "a": {"y": true, "b": null}}"#).unwrap();
        let text = serialize_json(&value).unwrap();
        assert_eq!(
            text,
            "{\n  \"z\": 1,\n  \"a\": {\n    \"y\": true,\n    \"b\": null\n  }\n}\n"
        );
    }

    #[test]
    fn test_read_json_missing_file() {
        let tree = FsTree::in_memory();
        let err = read_json_value(&tree, "package.json").unwrap_err();
        assert!(matches!(err, DevkitError::NotFound(p) if p == "package.json"));
    }

    #[test]
    fn test_read_json_parse_error() {
        let mut tree = FsTree::in_memory();
        tree.write_str("package.json", "{ not json");
        let err = read_json_value(&tree, "package.json").unwrap_err();
        assert!(matches!(err, DevkitError::Parse { .. }));
    }

    #[test]
    fn test_write_json_is_pretty_with_trailing_newline() {
        let mut tree = FsTree::in_memory();
        write_json(&mut tree, "package.json", &json!({ "name": "ws", "private": true })).unwrap();

        let text = tree.read_string("package.json").unwrap().unwrap();
        assert_eq!(text, "{\n  \"name\": \"ws\",\n  \"private\": true\n}\n");
    }
}
