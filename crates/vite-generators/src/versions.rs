/*
 * versions.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Package versions added to the workspace package.json.
 */

pub const NX_VITE_VERSION: &str = "~15.4.5";
pub const VITE_VERSION: &str = "^4.0.1";
pub const VITEST_VERSION: &str = "^0.25.8";
pub const VITEST_UI_VERSION: &str = "^0.25.8";
pub const VITE_TSCONFIG_PATHS_VERSION: &str = "^4.0.2";
pub const VITE_PLUGIN_ESLINT_VERSION: &str = "^1.8.1";
pub const VITE_PLUGIN_REACT_VERSION: &str = "^3.0.0";
