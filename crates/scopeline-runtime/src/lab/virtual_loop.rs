use parking_lot::Mutex;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use crate::branch::Branch;
use crate::substrate::{ForkJoin, MainLane, resume};

/// Handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId {
    deadline: u64,
    seq: u64,
}

impl TimerId {
    /// Virtual time, in milliseconds, at which the timer fires.
    pub fn deadline(self) -> u64 {
        self.deadline
    }
}

struct Task {
    branch: Branch,
    callback: Box<dyn FnOnce() + Send>,
}

#[derive(Default)]
struct Queue {
    next_seq: u64,
    timers: BTreeMap<TimerId, Task>,
    microtasks: VecDeque<Task>,
}

/// Event loop over a virtual millisecond clock.
///
/// Time only moves when [`tick`](Self::tick) is called. Timers fire in
/// deadline order, ties in scheduling order, and pending deferred completions
/// are drained after every timer callback. Callbacks may schedule more work
/// and may call `tick` themselves.
pub struct VirtualLoop {
    lane: MainLane,
    now: Mutex<u64>,
    queue: Mutex<Queue>,
}

impl VirtualLoop {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            lane: MainLane::new(),
            now: Mutex::new(0),
            queue: Mutex::new(Queue::default()),
        })
    }

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        *self.now.lock()
    }

    /// Schedules `callback` to run `delay_ms` from now on a fork of the
    /// current branch.
    pub fn set_timeout(&self, delay_ms: u64, callback: impl FnOnce() + Send + 'static) -> TimerId {
        let branch = self.fork();
        let deadline = self.now().saturating_add(delay_ms);
        let mut queue = self.queue.lock();
        let id = TimerId {
            deadline,
            seq: queue.next_seq,
        };
        queue.next_seq += 1;
        queue.timers.insert(
            id,
            Task {
                branch,
                callback: Box::new(callback),
            },
        );
        tracing::trace!(deadline, seq = id.seq, "timer scheduled");
        id
    }

    /// Cancels a timer. Returns `false` if it already fired or was cleared.
    pub fn clear_timeout(&self, id: TimerId) -> bool {
        self.queue.lock().timers.remove(&id).is_some()
    }

    /// Queues a deferred completion on a fork of the current branch.
    pub fn defer(&self, callback: impl FnOnce() + Send + 'static) {
        let branch = self.fork();
        self.queue.lock().microtasks.push_back(Task {
            branch,
            callback: Box::new(callback),
        });
    }

    /// Number of timers not yet fired.
    pub fn pending_timers(&self) -> usize {
        self.queue.lock().timers.len()
    }

    /// Runs every queued deferred completion, including ones queued meanwhile.
    pub fn drain(&self) {
        loop {
            let Some(task) = self.queue.lock().microtasks.pop_front() else {
                return;
            };
            self.run(task);
        }
    }

    /// Advances the clock by `ms`, firing every timer that falls due.
    pub fn tick(&self, ms: u64) {
        self.drain();
        let target = self.now().saturating_add(ms);
        while let Some(task) = self.pop_due(target) {
            self.run(task);
            self.drain();
        }
        let mut now = self.now.lock();
        *now = (*now).max(target);
    }

    /// Fires timers until none are left, advancing the clock as needed.
    pub fn run_until_idle(&self) {
        self.drain();
        loop {
            let next = self.queue.lock().timers.first_key_value().map(|(id, _)| id.deadline);
            let Some(deadline) = next else {
                return;
            };
            let now = self.now();
            self.tick(deadline.saturating_sub(now));
        }
    }

    fn pop_due(&self, target: u64) -> Option<Task> {
        let mut queue = self.queue.lock();
        let id = *queue.timers.first_key_value()?.0;
        if id.deadline > target {
            return None;
        }
        let task = queue.timers.remove(&id)?;
        drop(queue);

        let mut now = self.now.lock();
        *now = (*now).max(id.deadline);
        Some(task)
    }

    fn run(&self, task: Task) {
        let Task { branch, callback } = task;
        resume(self, &branch, callback);
    }
}

impl ForkJoin for VirtualLoop {
    fn current(&self) -> Branch {
        self.lane.current()
    }

    fn swap(&self, branch: Branch) -> Branch {
        self.lane.swap(branch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<&'static str>>>, impl Fn(&'static str) + Clone) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        (log, move |entry| sink.lock().push(entry))
    }

    #[test]
    fn timers_fire_in_deadline_then_fifo_order() {
        let lab = VirtualLoop::new();
        let (log, record) = recorder();

        let r = record.clone();
        lab.set_timeout(30, move || r("c"));
        let r = record.clone();
        lab.set_timeout(10, move || r("a"));
        let r = record.clone();
        lab.set_timeout(10, move || r("b"));

        lab.tick(10);
        assert_eq!(*log.lock(), vec!["a", "b"]);
        assert_eq!(lab.now(), 10);

        lab.tick(20);
        assert_eq!(*log.lock(), vec!["a", "b", "c"]);
        assert_eq!(lab.pending_timers(), 0);
    }

    #[test]
    fn cleared_timer_never_fires() {
        let lab = VirtualLoop::new();
        let (log, record) = recorder();

        let id = lab.set_timeout(5, move || record("cleared"));
        assert_eq!(id.deadline(), 5);
        assert!(lab.clear_timeout(id));
        assert!(!lab.clear_timeout(id));

        lab.tick(10);
        assert!(log.lock().is_empty());
    }

    #[test]
    fn deferred_work_drains_after_each_timer() {
        let lab = VirtualLoop::new();
        let (log, record) = recorder();

        let inner = Arc::clone(&lab);
        let r = record.clone();
        lab.set_timeout(1, move || {
            let deferred = r.clone();
            inner.defer(move || deferred("deferred"));
            r("timer 1");
        });
        let r = record.clone();
        lab.set_timeout(1, move || r("timer 2"));

        lab.tick(1);
        assert_eq!(*log.lock(), vec!["timer 1", "deferred", "timer 2"]);
    }

    #[test]
    fn callbacks_run_on_forked_branches_and_restore_current() {
        let lab = VirtualLoop::new();
        let main = lab.current();
        let seen = Arc::new(Mutex::new(None));

        let inner = Arc::clone(&lab);
        let slot = Arc::clone(&seen);
        lab.set_timeout(0, move || *slot.lock() = Some(inner.current()));
        lab.tick(0);

        let branch = seen.lock().take().expect("timer should have fired");
        assert!(!branch.same(&main));
        assert!(branch.parent().is_some_and(|parent| parent.same(&main)));
        assert!(lab.current().same(&main));
    }

    #[test]
    fn reentrant_tick_fires_nested_timers() {
        let lab = VirtualLoop::new();
        let (log, record) = recorder();

        let inner = Arc::clone(&lab);
        let r = record.clone();
        lab.set_timeout(500, move || {
            let nested = r.clone();
            inner.set_timeout(500, move || nested("nested"));
            inner.tick(500);
            r("outer");
        });
        lab.tick(500);

        assert_eq!(*log.lock(), vec!["nested", "outer"]);
        assert_eq!(lab.now(), 1000);
    }

    #[test]
    fn run_until_idle_advances_to_last_deadline() {
        let lab = VirtualLoop::new();
        let (log, record) = recorder();

        let r = record.clone();
        lab.set_timeout(250, move || r("late"));
        lab.set_timeout(20, move || record("early"));

        lab.run_until_idle();
        assert_eq!(*log.lock(), vec!["early", "late"]);
        assert_eq!(lab.now(), 250);
    }
}
