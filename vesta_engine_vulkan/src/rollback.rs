//! Undo stack for multi-step Vulkan setup
//!
//! Each created object registers its teardown. If setup returns early the
//! stack unwinds in reverse creation order; `commit` hands ownership to the
//! finished value and forgets the teardowns.

use vesta_engine::engine_debug;

use crate::vulkan_device::SOURCE;

type Undo = Box<dyn FnOnce()>;

pub(crate) struct Rollback {
    steps: Vec<(&'static str, Undo)>,
}

impl Rollback {
    pub(crate) fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Register the teardown for `what`, which was just created
    pub(crate) fn push(&mut self, what: &'static str, undo: impl FnOnce() + 'static) {
        self.steps.push((what, Box::new(undo)));
    }

    pub(crate) fn len(&self) -> usize {
        self.steps.len()
    }

    /// Setup finished: drop the teardowns without running them
    pub(crate) fn commit(mut self) {
        self.steps.clear();
    }
}

impl Drop for Rollback {
    fn drop(&mut self) {
        while let Some((what, undo)) = self.steps.pop() {
            engine_debug!(SOURCE, "Setup failed, destroying {}", what);
            undo();
        }
    }
}

#[cfg(test)]
#[path = "rollback_tests.rs"]
mod tests;
