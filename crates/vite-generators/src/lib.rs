/*
 * vite-generators
 * Copyright (c) 2025 Posit, PBC
 *
 * Generators that set up Vite and Vitest in workspace projects.
 *
 * - `init_generator`: adds the Vite toolchain to the root package.json.
 * - `vitest_generator`: configures Vitest for one project (test target,
 *   `vite.config.ts`, `tsconfig.spec.json`, tsconfig references).
 *
 * Generators only stage changes in a `Tree` and return a
 * `GeneratorCallback` for deferred work. The host flushes the tree and then
 * runs the callback.
 */

mod error;
mod init;
mod schema;
mod templates;
mod utils;
mod versions;
mod vitest;

pub use error::{GeneratorError, GeneratorResult};
pub use init::init_generator;
pub use schema::{InitGeneratorSchema, UiFramework, VitestGeneratorSchema};
pub use utils::{
    DEFAULT_TEST_TARGET, ExistingTargets, VITEST_EXECUTOR, ViteConfigOptions,
    add_or_change_test_target, find_existing_targets, write_vite_config,
};
pub use vitest::vitest_generator;
