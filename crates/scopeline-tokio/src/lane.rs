use std::cell::RefCell;
use std::fmt;

use scopeline_runtime::{Branch, ForkJoin, MainLane};

tokio::task_local! {
    pub(crate) static TASK_BRANCH: RefCell<Branch>;
}

/// Fork/join substrate over Tokio tasks.
///
/// Every task started through [`spawn`](crate::spawn) carries its own branch
/// in a task-local cell. Code running outside such a task (the thread that
/// drives `block_on`, plain `tokio::spawn` tasks) falls back to a per-thread
/// branch, so polls on different worker threads never share a slot.
pub struct TaskLane {
    fallback: MainLane,
}

impl TaskLane {
    pub fn new() -> Self {
        Self {
            fallback: MainLane::new(),
        }
    }

    /// Whether the caller is inside a task that carries its own branch.
    pub fn in_task() -> bool {
        TASK_BRANCH.try_with(|_| ()).is_ok()
    }
}

impl Default for TaskLane {
    fn default() -> Self {
        Self::new()
    }
}

impl ForkJoin for TaskLane {
    fn current(&self) -> Branch {
        TASK_BRANCH
            .try_with(|cell| cell.borrow().clone())
            .unwrap_or_else(|_| self.fallback.current())
    }

    fn swap(&self, branch: Branch) -> Branch {
        match TASK_BRANCH.try_with(|cell| cell.replace(branch.clone())) {
            Ok(previous) => previous,
            Err(_) => self.fallback.swap(branch),
        }
    }
}

impl fmt::Debug for TaskLane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskLane")
            .field("thread_branch", &self.fallback.current().id())
            .finish()
    }
}
