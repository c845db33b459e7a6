/*
 * vite-config
 * Copyright (c) 2025 Posit, PBC
 *
 * Structured configuration documents and the idempotent edits generators
 * apply to them.
 *
 * A document is a tree of `ConfigNode`s (mapping, sequence, scalar) loaded
 * from a JSON-with-comments file in a `Tree`. Edits such as
 * `ensure_reference` and `ensure_listed_type` check the shape of the fields
 * they touch and report `ConfigError::MalformedDocument` instead of guessing.
 *
 * ```ignore
 * use vite_config::{ensure_reference, update_config};
 *
 * update_config(&mut tree, "apps/web/tsconfig.json", |doc| {
 *     ensure_reference(doc, "./tsconfig.spec.json")
 * })?;
 * ```
 */

mod convert;
mod document;
mod merge;
mod path;
mod types;

pub use document::{ConfigDocument, update_config, update_optional_config};
pub use merge::{Edit, ensure_listed_type, ensure_reference};
pub use path::FieldPath;
pub use types::{ConfigError, ConfigNode, ConfigResult, NodeKind, Scalar};
