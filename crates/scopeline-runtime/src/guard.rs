use std::marker::PhantomData;
use std::sync::Arc;

use crate::branch::Branch;
use crate::frame::Frame;

/// Keeps a scope active on the branch it was entered on.
///
/// Dropping the guard restores the slot to exactly what it held before the
/// scope was entered. Guards must be dropped in reverse order of creation;
/// [`ScopeManager::with`](crate::ScopeManager::with) guarantees that.
/// A guard is not `Send`: it has to be released on the branch that took it.
#[must_use = "the scope is exited as soon as the guard is dropped"]
pub struct ScopeGuard {
    branch: Branch,
    previous: Option<Arc<Frame>>,
    depth: u32,
    _not_send: PhantomData<*const ()>,
}

impl ScopeGuard {
    pub(crate) fn new(branch: Branch, previous: Option<Arc<Frame>>, depth: u32) -> Self {
        Self {
            branch,
            previous,
            depth,
            _not_send: PhantomData,
        }
    }

    /// Branch the scope was entered on.
    pub fn branch(&self) -> &Branch {
        &self.branch
    }

    /// Depth of the entered scope above the root.
    pub fn depth(&self) -> u32 {
        self.depth
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        let released = self.branch.replace_top(self.previous.take());
        debug_assert!(
            std::thread::panicking() || released.as_ref().map(|frame| frame.depth()) == Some(self.depth),
            "scope guards dropped out of order on {}",
            self.branch.id()
        );
        tracing::trace!(branch = %self.branch.id(), depth = self.depth, "exited scope");
    }
}
