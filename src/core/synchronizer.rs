//=========================================================================
// Synchronizer
//=========================================================================
//
// Completion barrier with a timeout.
//
// Architecture:
//   Synchronizer::new(run_loop, timeout, callback)   arms the timeout
//   wrap(f) → g        pending += 1
//   g()                f(); pending -= 1; fire at zero
//   timeout            fire regardless of pending (forced continuation)
//
// The callback fires at most once, whichever path gets there first.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use log::{trace, warn};

//=== Internal Dependencies ===============================================

use crate::core::run_loop::{RunLoop, TimerId};

//=== Synchronizer ========================================================

pub struct Synchronizer {
    run_loop: RunLoop,
    pending: Cell<usize>,
    fired: Cell<bool>,
    timed_out: Cell<bool>,
    timer: Cell<Option<TimerId>>,
    callback: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl Synchronizer {
    //--- Construction -----------------------------------------------------

    /// Creates a barrier that runs `callback` once every wrapped callback
    /// has run, or once `timeout` elapses on `run_loop`.
    pub fn new<F>(run_loop: &RunLoop, timeout: Duration, callback: F) -> Rc<Self>
    where
        F: FnOnce() + 'static,
    {
        let sync = Rc::new(Self {
            run_loop: run_loop.clone(),
            pending: Cell::new(0),
            fired: Cell::new(false),
            timed_out: Cell::new(false),
            timer: Cell::new(None),
            callback: RefCell::new(Some(Box::new(callback))),
        });

        let armed = Rc::clone(&sync);
        let id = run_loop.set_timeout(timeout, move || armed.expire());
        sync.timer.set(Some(id));
        sync
    }

    //--- Wrapping ---------------------------------------------------------

    /// Registers one more completion the barrier waits for and returns the
    /// function that reports it.
    ///
    /// The count is taken here, not when the returned function runs, so a
    /// wrapped function that is never called holds the barrier until the
    /// timeout.
    pub fn wrap<F>(self: &Rc<Self>, f: F) -> impl FnOnce() + 'static
    where
        F: FnOnce() + 'static,
    {
        let this = self.register();
        move || {
            f();
            this.complete_one();
        }
    }

    /// Like [`wrap`](Self::wrap) for a callback taking one argument.
    pub fn wrap_with<T, F>(self: &Rc<Self>, f: F) -> impl FnOnce(T) + 'static
    where
        T: 'static,
        F: FnOnce(T) + 'static,
    {
        let this = self.register();
        move |value| {
            f(value);
            this.complete_one();
        }
    }

    /// Disarms the barrier without running its callback.
    pub fn cancel(&self) {
        if self.fired.replace(true) {
            return;
        }
        self.disarm();
        self.callback.borrow_mut().take();
    }

    //--- Query API --------------------------------------------------------

    pub fn has_fired(&self) -> bool {
        self.fired.get()
    }

    /// Whether the timeout forced the callback.
    pub fn timed_out(&self) -> bool {
        self.timed_out.get()
    }

    pub fn pending(&self) -> usize {
        self.pending.get()
    }

    //--- Internal Helpers -------------------------------------------------

    fn register(self: &Rc<Self>) -> Rc<Self> {
        self.pending.set(self.pending.get() + 1);
        Rc::clone(self)
    }

    fn complete_one(&self) {
        let remaining = self.pending.get().saturating_sub(1);
        self.pending.set(remaining);
        trace!(target: "sync", "Wrapped callback done ({} pending)", remaining);
        if remaining == 0 {
            self.fire();
        }
    }

    fn expire(&self) {
        self.timer.set(None);
        if self.fired.get() {
            return;
        }
        self.timed_out.set(true);
        warn!(
            target: "sync",
            "Synchronizer timed out with {} callback(s) pending; continuing",
            self.pending.get()
        );
        self.fire();
    }

    fn fire(&self) {
        if self.fired.replace(true) {
            return;
        }
        self.disarm();
        let callback = self.callback.borrow_mut().take();
        if let Some(callback) = callback {
            callback();
        }
    }

    fn disarm(&self) {
        if let Some(id) = self.timer.take() {
            self.run_loop.clear_timeout(id);
        }
    }
}

impl fmt::Debug for Synchronizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Synchronizer")
            .field("pending", &self.pending.get())
            .field("fired", &self.fired.get())
            .field("timed_out", &self.timed_out.get())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
