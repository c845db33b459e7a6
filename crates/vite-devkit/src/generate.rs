/*
 * generate.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Declarative template scaffolding.
 *
 * Generators describe the files they create as a list of `TemplateFile`s
 * embedded at compile time. `generate_files` renders them with a set of
 * substitutions and stages the results in a `Tree`:
 *
 * - **Paths**: every `__key__` segment is replaced by the substitution value
 *   for `key` (so `tsconfig.spec.json__tmpl__` with `tmpl = ""` becomes
 *   `tsconfig.spec.json`).
 * - **Templates**: rendered with a small EJS subset (see `render_template`).
 */

use crate::error::{DevkitError, DevkitResult};
use crate::path::join_path_fragments;
use crate::tree::Tree;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

/// Values available to path and template substitution.
pub type Substitutions = Map<String, Value>;

/// A file a generator scaffolds into the target directory.
#[derive(Debug, Clone, Copy)]
pub struct TemplateFile {
    /// Path relative to the target directory, possibly with `__key__` segments
    pub path: &'static str,

    /// EJS template rendered with the substitutions
    pub template: &'static str,
}

impl TemplateFile {
    /// Create a rendered template file definition.
    pub const fn template(path: &'static str, template: &'static str) -> Self {
        Self { path, template }
    }
}

/// Render `files` into `target_dir` and stage them in the tree.
///
/// Returns the workspace-relative paths that were written, in order.
///
/// # Errors
///
/// Returns `DevkitError::TemplateRender` if a template references an
/// unknown value or uses unsupported syntax. Nothing is staged in that case.
pub fn generate_files(
    tree: &mut dyn Tree,
    files: &[TemplateFile],
    target_dir: &str,
    substitutions: &Substitutions,
) -> DevkitResult<Vec<String>> {
    // Render everything first so a broken template stages nothing.
    let mut rendered = Vec::with_capacity(files.len());
    for file in files {
        let relative = substitute_path(file.path, substitutions);
        let path = join_path_fragments(&[target_dir, relative.as_str()]);
        let content = render_template(file.template, substitutions).map_err(|message| {
            DevkitError::TemplateRender {
                path: file.path.to_string(),
                message,
            }
        })?;
        rendered.push((path, content));
    }

    let mut written = Vec::with_capacity(rendered.len());
    for (path, content) in rendered {
        debug!(%path, "Generating file");
        tree.write_str(&path, &content);
        written.push(path);
    }
    Ok(written)
}

/// Replace `__key__` segments with substitution values.
pub fn substitute_path(path: &str, substitutions: &Substitutions) -> String {
    substitutions
        .iter()
        .fold(path.to_string(), |acc, (key, value)| {
            acc.replace(&format!("__{}__", key), &display_value(value))
        })
}

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<%([=\-]?)(.*?)%>").unwrap());
static IF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^if\s*\((.+)\)\s*\{$").unwrap());
static ELSE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\}\s*else\s*\{$").unwrap());

enum Token<'a> {
    Text(&'a str),
    Escaped(&'a str),
    Raw(&'a str),
    If(&'a str),
    Else,
    End,
}

struct Frame {
    condition: bool,
    in_else: bool,
}

fn tokenize(template: &str) -> Result<Vec<Token<'_>>, String> {
    let mut tokens = Vec::new();
    let mut last = 0;
    for captures in TAG_RE.captures_iter(template) {
        let whole = captures.get(0).map(|m| (m.start(), m.end())).unwrap_or((0, 0));
        if whole.0 > last {
            tokens.push(Token::Text(&template[last..whole.0]));
        }
        last = whole.1;

        let kind = captures.get(1).map_or("", |m| m.as_str());
        let code = captures.get(2).map_or("", |m| m.as_str()).trim();
        let token = match kind {
            "=" => Token::Escaped(code),
            "-" => Token::Raw(code),
            _ => {
                if let Some(condition) = IF_RE.captures(code).and_then(|c| c.get(1)) {
                    Token::If(condition.as_str().trim())
                } else if ELSE_RE.is_match(code) {
                    Token::Else
                } else if code == "}" {
                    Token::End
                } else {
                    return Err(format!("unsupported template code: {}", code));
                }
            }
        };
        tokens.push(token);
    }
    if last < template.len() {
        tokens.push(Token::Text(&template[last..]));
    }
    Ok(tokens)
}

/// Render an EJS-style template.
///
/// Supported tags:
///
/// - `<%= expr %>`: HTML-escaped output
/// - `<%- expr %>`: raw output
/// - `<% if (expr) { %>`, `<% } else { %>`, `<% } %>`: conditionals
///
/// An expression is a dotted lookup into `data` (`options.name`), optionally
/// negated with `!`. Looking up an unknown top-level name is an error, like
/// a `ReferenceError` in EJS; unknown nested properties are empty.
pub fn render_template(template: &str, data: &Substitutions) -> Result<String, String> {
    let tokens = tokenize(template)?;
    let mut out = String::with_capacity(template.len());
    let mut stack: Vec<Frame> = Vec::new();

    for token in tokens {
        let active = stack.iter().all(|f| f.condition != f.in_else);
        match token {
            Token::Text(text) => {
                if active {
                    out.push_str(text);
                }
            }
            Token::Escaped(expr) => {
                if active {
                    out.push_str(&escape_html(&display_value(&evaluate(expr, data)?)));
                }
            }
            Token::Raw(expr) => {
                if active {
                    out.push_str(&display_value(&evaluate(expr, data)?));
                }
            }
            Token::If(expr) => {
                let condition = active && is_truthy(&evaluate(expr, data)?);
                stack.push(Frame {
                    condition,
                    in_else: false,
                });
            }
            Token::Else => match stack.last_mut() {
                Some(frame) if !frame.in_else => frame.in_else = true,
                _ => return Err("`else` without matching `if`".to_string()),
            },
            Token::End => {
                if stack.pop().is_none() {
                    return Err("unbalanced `}`".to_string());
                }
            }
        }
    }

    if !stack.is_empty() {
        return Err("unclosed `if` block".to_string());
    }
    Ok(out)
}

fn evaluate(expr: &str, data: &Substitutions) -> Result<Value, String> {
    if let Some(inner) = expr.strip_prefix('!') {
        let value = evaluate(inner.trim(), data)?;
        return Ok(Value::Bool(!is_truthy(&value)));
    }

    let mut parts = expr.split('.');
    let head = parts.next().unwrap_or_default().trim();
    let mut current = data
        .get(head)
        .ok_or_else(|| format!("{} is not defined", head))?;
    for part in parts {
        match current.get(part.trim()) {
            Some(next) => current = next,
            None => return Ok(Value::Null),
        }
    }
    Ok(current.clone())
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::FsTree;
    use serde_json::json;

    fn data(value: Value) -> Substitutions {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_render_interpolation() {
        let data = data(json!({ "offsetFromRoot": "../../", "name": "web" }));
        let out = render_template("\"outDir\": \"<%= offsetFromRoot %>dist/out-tsc\"", &data)
            .unwrap();
        insta::assert_snapshot!(out, @r#""outDir": "../../dist/out-tsc""#);

        let out = render_template("project <%- name %>", &data).unwrap();
        assert_eq!(out, "project web");
    }

    #[test]
    fn test_render_escapes_html_only_for_escaped_tags() {
        let data = data(json!({ "title": "<a & 'b'>" }));
        assert_eq!(
            render_template("<%= title %>", &data).unwrap(),
            "&lt;a &amp; &#39;b&#39;&gt;"
        );
        assert_eq!(render_template("<%- title %>", &data).unwrap(), "<a & 'b'>");
    }

    #[test]
    fn test_render_conditionals() {
        let template = "a<% if (inSourceTests) { %>-in<% } else { %>-out<% } %>b";
        let on = data(json!({ "inSourceTests": true }));
        let off = data(json!({ "inSourceTests": false }));
        assert_eq!(render_template(template, &on).unwrap(), "a-inb");
        assert_eq!(render_template(template, &off).unwrap(), "a-outb");

        let negated = "<% if (!inSourceTests) { %>plain<% } %>";
        assert_eq!(render_template(negated, &off).unwrap(), "plain");
        assert_eq!(render_template(negated, &on).unwrap(), "");
    }

    #[test]
    fn test_render_nested_lookup_and_inactive_branch() {
        let data = data(json!({ "options": { "framework": "react" }, "flag": false }));
        assert_eq!(
            render_template("<%= options.framework %>/<%= options.missing %>", &data).unwrap(),
            "react/"
        );
        // Unknown names inside an inactive branch are never evaluated.
        assert_eq!(
            render_template("<% if (flag) { %><%= nope %><% } %>ok", &data).unwrap(),
            "ok"
        );
    }

    #[test]
    fn test_render_errors() {
        let empty = Substitutions::new();
        assert!(render_template("<%= missing %>", &empty)
            .unwrap_err()
            .contains("missing is not defined"));
        assert!(render_template("<% for (;;) { %>", &empty).is_err());
        assert!(render_template("<% } %>", &empty).is_err());
        assert!(render_template("<% if (x) { %>", &data(json!({ "x": 1 }))).is_err());
    }

    #[test]
    fn test_substitute_path() {
        let subs = data(json!({ "tmpl": "", "name": "web" }));
        assert_eq!(
            substitute_path("tsconfig.spec.json__tmpl__", &subs),
            "tsconfig.spec.json"
        );
        assert_eq!(substitute_path("src/__name__.ts", &subs), "src/web.ts");
    }

    #[test]
    fn test_generate_files_stages_rendered_output() {
        const FILES: &[TemplateFile] = &[
            TemplateFile::template("tsconfig.spec.json__tmpl__", "{ \"root\": \"<%= projectRoot %>\" }"),
            TemplateFile::template("src/__name__.ts", "export const name = '<%= name %>';\n"),
        ];
        let mut tree = FsTree::in_memory();
        let subs = data(json!({ "tmpl": "", "projectRoot": "apps/web", "name": "web" }));

        let written = generate_files(&mut tree, FILES, "apps/web", &subs).unwrap();

        assert_eq!(
            written,
            vec!["apps/web/tsconfig.spec.json", "apps/web/src/web.ts"]
        );
        assert_eq!(
            tree.read_string("apps/web/tsconfig.spec.json").unwrap().as_deref(),
            Some("{ \"root\": \"apps/web\" }")
        );
        assert_eq!(
            tree.read_string("apps/web/src/web.ts").unwrap().as_deref(),
            Some("export const name = 'web';\n")
        );
    }

    #[test]
    fn test_generate_files_broken_template_stages_nothing() {
        const FILES: &[TemplateFile] = &[
            TemplateFile::template("ok.txt", "fine"),
            TemplateFile::template("bad.txt", "<%= unknown %>"),
        ];
        let mut tree = FsTree::in_memory();

        let err = generate_files(&mut tree, FILES, "apps/web", &Substitutions::new()).unwrap_err();

        assert!(matches!(err, DevkitError::TemplateRender { .. }));
        assert!(tree.list_changes().is_empty());
    }
}
