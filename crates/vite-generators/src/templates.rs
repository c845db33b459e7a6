/*
 * templates.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Templates embedded at compile time via `include_str!()`.
 */

use vite_devkit::TemplateFile;

/// Files scaffolded by the vitest generator.
pub mod vitest {
    /// `tsconfig.spec.json` template.
    pub const TSCONFIG_SPEC_JSON: &str =
        include_str!("../resources/templates/vitest/tsconfig.spec.json__tmpl__");
}

/// Vite configuration.
pub mod vite {
    /// `vite.config.ts` template.
    pub const VITE_CONFIG_TS: &str = include_str!("../resources/templates/vite/vite.config.ts.ejs");
}

/// Files the vitest generator writes into the project root.
pub static VITEST_FILES: [TemplateFile; 1] = [TemplateFile::template(
    "tsconfig.spec.json__tmpl__",
    vitest::TSCONFIG_SPEC_JSON,
)];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vitest_templates_exist() {
        assert_eq!(VITEST_FILES.len(), 1);
        assert!(VITEST_FILES[0].path.ends_with("__tmpl__"));
        assert!(vitest::TSCONFIG_SPEC_JSON.contains("vitest/globals"));
    }

    #[test]
    fn test_vite_config_template_exists() {
        assert!(vite::VITE_CONFIG_TS.contains("defineConfig"));
        assert!(vite::VITE_CONFIG_TS.contains("<% if (includeVitest) { %>"));
    }
}
