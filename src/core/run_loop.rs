//=========================================================================
// Run Loop
//=========================================================================
//
// Single-threaded cooperative scheduler behind every "later" in the core.
//
// Architecture:
//   defer()       → tasks: VecDeque<Task>        (next turn, FIFO)
//   set_timeout() → timers: BinaryHeap<Entry>    (deadline order)
//                         ↓
//   run_until_idle() / advance() drain both on the owning thread
//
// The clock is a monotonic Duration owned by the loop. Tests move it with
// `advance`; the framework thread advances it by measured wall time.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use log::trace;

//=== Task & TimerId ======================================================

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce()>;

/// Handle returned by [`RunLoop::set_timeout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

//=== TimerEntry ==========================================================

/// Heap entry; callbacks live in a side table so cleared timers can be
/// skipped lazily.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TimerEntry {
    deadline: Duration,
    id: TimerId,
}

impl Ord for TimerEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap: earliest deadline first, then arming order
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

//=== RunLoop =============================================================

struct RunLoopInner {
    now: Cell<Duration>,
    next_timer: Cell<u64>,
    tasks: RefCell<VecDeque<Task>>,
    timers: RefCell<BinaryHeap<TimerEntry>>,
    callbacks: RefCell<HashMap<TimerId, Task>>,
}

/// Cheaply clonable handle to the scheduler of one framework thread.
#[derive(Clone)]
pub struct RunLoop {
    inner: Rc<RunLoopInner>,
}

impl RunLoop {
    //--- Construction -----------------------------------------------------

    /// Creates an idle loop with its clock at zero.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RunLoopInner {
                now: Cell::new(Duration::ZERO),
                next_timer: Cell::new(0),
                tasks: RefCell::new(VecDeque::new()),
                timers: RefCell::new(BinaryHeap::new()),
                callbacks: RefCell::new(HashMap::new()),
            }),
        }
    }

    //--- Scheduling -------------------------------------------------------

    /// Queues `task` for a later turn. Never runs it synchronously.
    pub fn defer<F>(&self, task: F)
    where
        F: FnOnce() + 'static,
    {
        self.inner.tasks.borrow_mut().push_back(Box::new(task));
    }

    /// Arms a one-shot timer firing `delay` after the current clock.
    pub fn set_timeout<F>(&self, delay: Duration, task: F) -> TimerId
    where
        F: FnOnce() + 'static,
    {
        let id = TimerId(self.inner.next_timer.get());
        self.inner.next_timer.set(id.0 + 1);

        let deadline = self.inner.now.get() + delay;
        self.inner.callbacks.borrow_mut().insert(id, Box::new(task));
        self.inner.timers.borrow_mut().push(TimerEntry { deadline, id });

        trace!(target: "run_loop", "Timer {:?} armed for {:?}", id, deadline);
        id
    }

    /// Disarms a timer. Returns `false` if it already fired or was cleared.
    pub fn clear_timeout(&self, id: TimerId) -> bool {
        self.inner.callbacks.borrow_mut().remove(&id).is_some()
    }

    //--- Execution --------------------------------------------------------

    /// Runs deferred tasks until none are left, including tasks deferred
    /// while draining. Does not move the clock. Returns the task count.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        loop {
            let task = self.inner.tasks.borrow_mut().pop_front();
            match task {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => break,
            }
        }
        ran
    }

    /// Advances the clock by `by`, firing every timer that falls due in
    /// deadline order and draining deferred tasks after each one.
    pub fn advance(&self, by: Duration) {
        self.run_until_idle();

        let target = self.inner.now.get() + by;
        while let Some(entry) = self.pop_due(target) {
            self.inner.now.set(entry.deadline);

            let callback = self.inner.callbacks.borrow_mut().remove(&entry.id);
            if let Some(callback) = callback {
                trace!(target: "run_loop", "Timer {:?} fired", entry.id);
                callback();
            }
            self.run_until_idle();
        }

        self.inner.now.set(target);
        self.run_until_idle();
    }

    //--- Query API --------------------------------------------------------

    /// Current loop clock.
    pub fn now(&self) -> Duration {
        self.inner.now.get()
    }

    /// Time until the earliest armed timer, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        let callbacks = self.inner.callbacks.borrow();
        let now = self.inner.now.get();
        self.inner
            .timers
            .borrow()
            .iter()
            .filter(|entry| callbacks.contains_key(&entry.id))
            .map(|entry| entry.deadline.saturating_sub(now))
            .min()
    }

    /// True when no deferred task is queued and no timer is armed.
    pub fn is_idle(&self) -> bool {
        self.inner.tasks.borrow().is_empty() && self.inner.callbacks.borrow().is_empty()
    }

    //--- Internal Helpers -------------------------------------------------

    fn pop_due(&self, target: Duration) -> Option<TimerEntry> {
        let mut timers = self.inner.timers.borrow_mut();
        match timers.peek() {
            Some(entry) if entry.deadline <= target => timers.pop(),
            _ => None,
        }
    }
}

impl Default for RunLoop {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
