//! The fork/join boundary between the scope runtime and whatever schedules
//! asynchronous work.
//!
//! A substrate owns the notion of "which branch is executing right now". The
//! runtime only ever asks it for the current branch; schedulers fork a branch
//! when work is queued and [`resume`] it when the work fires.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::branch::Branch;

/// Execution-context fork/join primitive.
pub trait ForkJoin: Send + Sync + 'static {
    /// The branch currently executing.
    fn current(&self) -> Branch;

    /// Installs `branch` as current and returns the branch it displaced.
    fn swap(&self, branch: Branch) -> Branch;

    /// Forks the current branch. Call this when asynchronous work is scheduled.
    fn fork(&self) -> Branch {
        self.current().fork()
    }
}

/// Runs `f` with `branch` installed as the current branch of `substrate`.
///
/// The previously current branch is reinstated when `f` returns or unwinds.
pub fn resume<S, R>(substrate: &S, branch: &Branch, f: impl FnOnce() -> R) -> R
where
    S: ForkJoin + ?Sized,
{
    let previous = substrate.swap(branch.clone());
    tracing::trace!(branch = %branch.id(), from = %previous.id(), "resumed branch");
    let _restore = Reinstate {
        substrate,
        previous: Some(previous),
    };
    f()
}

struct Reinstate<'a, S: ForkJoin + ?Sized> {
    substrate: &'a S,
    previous: Option<Branch>,
}

impl<S: ForkJoin + ?Sized> Drop for Reinstate<'_, S> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.substrate.swap(previous);
        }
    }
}

thread_local! {
    static THREAD_BRANCHES: RefCell<HashMap<u64, Branch>> = RefCell::new(HashMap::new());
}

static NEXT_LANE: AtomicU64 = AtomicU64::new(1);

/// Thread-lane substrate: one current-branch pointer per thread.
///
/// This is the default substrate. Each thread starts on its own detached
/// branch, so managers shared between threads never see each other's
/// synchronous nesting. Without a scheduler resuming forked branches it
/// degrades to plain synchronous nesting, which is all a program without
/// asynchronous continuations needs.
pub struct MainLane {
    id: u64,
}

impl MainLane {
    pub fn new() -> Self {
        Self {
            id: NEXT_LANE.fetch_add(1, Ordering::Relaxed),
        }
    }

    fn with_slot<R>(&self, f: impl FnOnce(&mut Branch) -> R) -> R {
        THREAD_BRANCHES.with(|slots| {
            let mut slots = slots.borrow_mut();
            f(slots.entry(self.id).or_insert_with(Branch::detached))
        })
    }
}

impl Default for MainLane {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MainLane {
    fn drop(&mut self) {
        // Slots on other threads go away with their thread.
        let released = THREAD_BRANCHES.try_with(|slots| slots.borrow_mut().remove(&self.id));
        drop(released);
    }
}

impl ForkJoin for MainLane {
    fn current(&self) -> Branch {
        self.with_slot(|slot| slot.clone())
    }

    fn swap(&self, branch: Branch) -> Branch {
        self.with_slot(|slot| std::mem::replace(slot, branch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resume_reinstates_previous_branch() {
        let lane = MainLane::new();
        let main = lane.current();
        let forked = lane.fork();

        let seen = resume(&lane, &forked, || lane.current());
        assert!(seen.same(&forked));
        assert!(lane.current().same(&main));
    }

    #[test]
    fn resume_reinstates_on_unwind() {
        let lane = MainLane::new();
        let main = lane.current();
        let forked = lane.fork();

        let fail = true;
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            resume(&lane, &forked, || {
                if fail {
                    panic!("continuation failed");
                }
            })
        }));
        assert!(outcome.is_err());
        assert!(lane.current().same(&main));
    }

    #[test]
    fn each_thread_has_its_own_current_branch() {
        let lane = std::sync::Arc::new(MainLane::new());
        let main = lane.current();
        let forked = lane.fork();
        let previous = lane.swap(forked.clone());
        assert!(previous.same(&main));

        let other = std::sync::Arc::clone(&lane);
        let seen = std::thread::spawn(move || other.current())
            .join()
            .expect("thread completes");
        assert!(!seen.same(&forked));
        assert!(!seen.same(&main));
        assert!(lane.current().same(&forked));
    }
}
