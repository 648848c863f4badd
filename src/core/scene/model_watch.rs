//=========================================================================
// Model Watchers
//=========================================================================
//
// Per-scene fan-out of model-change notifications.
//
// Architecture:
//   model_changed(model, who)
//     ├─ Idle       → enqueue, switch to Processing, drain FIFO, back to Idle
//     └─ Processing → enqueue only (drained by the outer call)
//
// Watcher callbacks therefore never run re-entrantly, and changes are
// delivered in the order they were submitted.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use log::trace;

//=== Types ===============================================================

/// Shared model handle; identity is pointer identity.
pub type ModelRef = Rc<dyn Any>;

/// Identity token of a watcher registration.
pub type WatcherRef = Rc<dyn Any>;

/// Extra data passed along with a change.
pub type ChangeDetails = Rc<dyn Any>;

pub type WatchFn = Rc<dyn Fn(&ModelRef, Option<&ChangeDetails>)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DispatchState {
    Idle,
    Processing,
}

struct Watcher {
    model: ModelRef,
    who: WatcherRef,
    callback: WatchFn,
}

struct ModelChange {
    model: ModelRef,
    who: Option<WatcherRef>,
    details: Option<ChangeDetails>,
}

//=== ModelWatchers =======================================================

pub struct ModelWatchers {
    watchers: RefCell<Vec<Rc<Watcher>>>,
    state: Cell<DispatchState>,
    queue: RefCell<VecDeque<ModelChange>>,
}

impl ModelWatchers {
    pub fn new() -> Self {
        Self {
            watchers: RefCell::new(Vec::new()),
            state: Cell::new(DispatchState::Idle),
            queue: RefCell::new(VecDeque::new()),
        }
    }

    //--- Registration -----------------------------------------------------

    /// Calls `callback` whenever `model` changes, unless the change was
    /// submitted by `who` itself.
    pub fn watch_model<F>(&self, model: &ModelRef, who: &WatcherRef, callback: F)
    where
        F: Fn(&ModelRef, Option<&ChangeDetails>) + 'static,
    {
        self.watchers.borrow_mut().push(Rc::new(Watcher {
            model: Rc::clone(model),
            who: Rc::clone(who),
            callback: Rc::new(callback),
        }));
    }

    /// Removes `who`'s registrations for `model`, or all of them when no
    /// model is given. Returns how many were removed.
    pub fn remove_watcher(&self, who: &WatcherRef, model: Option<&ModelRef>) -> usize {
        let mut watchers = self.watchers.borrow_mut();
        let before = watchers.len();
        watchers.retain(|w| {
            let same_who = Rc::ptr_eq(&w.who, who);
            let same_model = model.map_or(true, |m| Rc::ptr_eq(&w.model, m));
            !(same_who && same_model)
        });
        before - watchers.len()
    }

    pub fn clear(&self) {
        self.watchers.borrow_mut().clear();
        self.queue.borrow_mut().clear();
    }

    //--- Notification -----------------------------------------------------

    /// Notifies watchers of `model`, skipping those registered as `who`.
    pub fn model_changed(
        &self,
        model: &ModelRef,
        who: Option<&WatcherRef>,
        details: Option<ChangeDetails>,
    ) {
        self.queue.borrow_mut().push_back(ModelChange {
            model: Rc::clone(model),
            who: who.cloned(),
            details,
        });

        if self.state.get() == DispatchState::Processing {
            trace!(target: "scene", "Model change queued behind the one in progress");
            return;
        }

        self.state.set(DispatchState::Processing);
        let _idle = IdleOnDrop(&self.state);

        loop {
            let change = self.queue.borrow_mut().pop_front();
            match change {
                Some(change) => self.deliver(&change),
                None => break,
            }
        }
    }

    //--- Query API --------------------------------------------------------

    pub fn len(&self) -> usize {
        self.watchers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.watchers.borrow().is_empty()
    }

    pub fn is_processing(&self) -> bool {
        self.state.get() == DispatchState::Processing
    }

    //--- Internal Helpers -------------------------------------------------

    fn deliver(&self, change: &ModelChange) {
        let targets: Vec<Rc<Watcher>> = self
            .watchers
            .borrow()
            .iter()
            .filter(|w| Rc::ptr_eq(&w.model, &change.model))
            .filter(|w| !change.who.as_ref().is_some_and(|who| Rc::ptr_eq(&w.who, who)))
            .cloned()
            .collect();

        for watcher in targets {
            // Removed by an earlier callback of the same change.
            if !self.is_registered(&watcher) {
                continue;
            }
            (watcher.callback)(&change.model, change.details.as_ref());
        }
    }

    fn is_registered(&self, watcher: &Rc<Watcher>) -> bool {
        self.watchers.borrow().iter().any(|w| Rc::ptr_eq(w, watcher))
    }
}

impl Default for ModelWatchers {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the dispatcher to `Idle` even if a watcher panics.
struct IdleOnDrop<'a>(&'a Cell<DispatchState>);

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        self.0.set(DispatchState::Idle);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> WatcherRef {
        Rc::new(())
    }

    fn model() -> ModelRef {
        Rc::new(RefCell::new(Vec::<u32>::new()))
    }

    #[test]
    fn notifies_other_watchers_without_details() {
        let watchers = ModelWatchers::new();
        let m = model();
        let x = token();
        let y = token();

        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        watchers.watch_model(
            &m,
            &x,
            move |changed, details| sink.borrow_mut().push((changed.clone(), details.is_none())),
        );

        watchers.model_changed(&m, Some(&y), None);
        assert_eq!(calls.borrow().len(), 1);
        assert!(Rc::ptr_eq(&calls.borrow()[0].0, &m));
        assert!(calls.borrow()[0].1);

        // Self-notification is suppressed.
        watchers.model_changed(&m, Some(&x), None);
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn other_models_are_not_notified() {
        let watchers = ModelWatchers::new();
        let (m, other) = (model(), model());
        let hits = Rc::new(Cell::new(0));
        let sink = Rc::clone(&hits);
        watchers.watch_model(&m, &token(), move |_, _| sink.set(sink.get() + 1));

        watchers.model_changed(&other, None, None);
        assert_eq!(hits.get(), 0);
        watchers.model_changed(&m, None, None);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn reentrant_changes_drain_fifo_before_return() {
        let watchers = Rc::new(ModelWatchers::new());
        let (m1, m2) = (model(), model());
        let log = Rc::new(RefCell::new(Vec::new()));

        // W1 reacts to m1 by changing m2.
        let w1_log = Rc::clone(&log);
        let w1_watchers = Rc::clone(&watchers);
        let w1_m2 = Rc::clone(&m2);
        watchers.watch_model(
            &m1,
            &token(),
            move |_, _| {
                w1_log.borrow_mut().push("w1:start");
                w1_watchers.model_changed(&w1_m2, None, None);
                w1_log.borrow_mut().push("w1:end");
            },
        );

        let w2_log = Rc::clone(&log);
        watchers.watch_model(&m1, &token(), move |_, _| w2_log.borrow_mut().push("w2:m1"));

        let w3_log = Rc::clone(&log);
        watchers.watch_model(&m2, &token(), move |_, _| w3_log.borrow_mut().push("w3:m2"));

        watchers.model_changed(&m1, None, None);

        assert_eq!(*log.borrow(), vec!["w1:start", "w1:end", "w2:m1", "w3:m2"]);
        assert!(!watchers.is_processing());
    }

    #[test]
    fn remove_watcher_with_and_without_model() {
        let watchers = ModelWatchers::new();
        let (m1, m2) = (model(), model());
        let who = token();
        watchers.watch_model(&m1, &who, |_, _| {});
        watchers.watch_model(&m2, &who, |_, _| {});
        watchers.watch_model(&m2, &token(), |_, _| {});

        assert_eq!(watchers.remove_watcher(&who, Some(&m1)), 1);
        assert_eq!(watchers.len(), 2);
        assert_eq!(watchers.remove_watcher(&who, None), 1);
        assert_eq!(watchers.len(), 1);
    }

    #[test]
    fn watcher_removed_mid_delivery_is_skipped() {
        let watchers = Rc::new(ModelWatchers::new());
        let m = model();
        let victim = token();
        let hits = Rc::new(Cell::new(0));

        let remover = Rc::clone(&watchers);
        let remover_victim = Rc::clone(&victim);
        watchers.watch_model(
            &m,
            &token(),
            move |_, _| {
                remover.remove_watcher(&remover_victim, None);
            },
        );
        let sink = Rc::clone(&hits);
        watchers.watch_model(&m, &victim, move |_, _| sink.set(sink.get() + 1));

        watchers.model_changed(&m, None, None);
        assert_eq!(hits.get(), 0);
    }
}
