/*
 * tasks.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Deferred generator callbacks.
 *
 * Generators only edit the tree. Work that must happen after the tree has
 * been flushed (installing packages, for instance) is returned as a
 * `GeneratorCallback` and run by the host once the changes are on disk.
 */

use crate::error::DevkitResult;
use tracing::debug;

/// Work to run after a generator's changes have been flushed.
pub type GeneratorCallback = Box<dyn FnOnce() -> DevkitResult<()>>;

/// A callback that does nothing.
pub fn noop_task() -> GeneratorCallback {
    Box::new(|| -> DevkitResult<()> { Ok(()) })
}

/// Combine callbacks into one that runs them in order.
///
/// Execution stops at the first failing callback; later callbacks are not
/// run.
pub fn run_tasks_in_serial(tasks: Vec<GeneratorCallback>) -> GeneratorCallback {
    Box::new(move || -> DevkitResult<()> {
        let total = tasks.len();
        for (index, task) in tasks.into_iter().enumerate() {
            debug!(task = index + 1, total, "Running generator task");
            task()?;
        }
        Ok(())
    })
}
