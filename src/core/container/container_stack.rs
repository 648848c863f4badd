//=========================================================================
// Container Stack
//=========================================================================
//
// Layered UI regions of one scene: the scene body, dialogs, submenus.
//
// Architecture:
//   push_container(element, layer, options)
//     ├─ cancel every open, cancellable container at layer <= new layer
//     └─ append the new container
//
//   Container lifecycle: pushed → (cancelled | removed), terminal
//
// A cancelled container leaves the stack before its callback runs.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;

//=== Internal Dependencies ===============================================

use crate::core::services::ElementRef;

//=== Layers ==============================================================

pub const SCENE_LAYER: i32 = 0;
pub const DIALOG_LAYER: i32 = 10;
pub const SUBMENU_LAYER: i32 = 20;

//=== ContainerOptions ====================================================

pub type CancelFn = Rc<dyn Fn()>;
pub type ClosedFn = Rc<dyn Fn() -> bool>;

/// Optional behaviour attached to a pushed container.
#[derive(Clone, Default)]
pub struct ContainerOptions {
    cancel: Option<CancelFn>,
    is_closed: Option<ClosedFn>,
}

impl ContainerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called when a later push or a scene deactivation dismisses the container.
    pub fn on_cancel<F>(mut self, cancel: F) -> Self
    where
        F: Fn() + 'static,
    {
        self.cancel = Some(Rc::new(cancel));
        self
    }

    /// Reports whether the container already closed by itself.
    pub fn closed_when<F>(mut self, is_closed: F) -> Self
    where
        F: Fn() -> bool + 'static,
    {
        self.is_closed = Some(Rc::new(is_closed));
        self
    }
}

//=== Container ===========================================================

/// One registered container.
#[derive(Clone)]
pub struct Container {
    element: ElementRef,
    layer: i32,
    options: ContainerOptions,
}

impl Container {
    pub fn element(&self) -> &ElementRef {
        &self.element
    }

    pub fn layer(&self) -> i32 {
        self.layer
    }

    pub fn is_cancellable(&self) -> bool {
        self.options.cancel.is_some()
    }

    pub fn is_open(&self) -> bool {
        !self.options.is_closed.as_ref().is_some_and(|closed| closed())
    }

    fn is_same(&self, element: &ElementRef) -> bool {
        Rc::ptr_eq(&self.element, element)
    }

    fn cancel(&self) {
        if let Some(cancel) = &self.options.cancel {
            cancel();
        }
    }
}

//=== ContainerStack ======================================================

#[derive(Default)]
pub struct ContainerStack {
    containers: RefCell<Vec<Container>>,
}

impl ContainerStack {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Stack Operations -------------------------------------------------

    /// Registers `element` at `layer`, first cancelling every open,
    /// cancellable container whose layer is at or below it.
    pub fn push_container(&self, element: ElementRef, layer: i32, options: ContainerOptions) {
        let cancelled = self.take_where(|c| c.layer <= layer);
        if !cancelled.is_empty() {
            debug!(target: "container", "Push at layer {} cancels {} container(s)", layer, cancelled.len());
        }
        for container in &cancelled {
            container.cancel();
        }

        self.containers.borrow_mut().push(Container {
            element,
            layer,
            options,
        });
    }

    /// Removes the container registered for `element`.
    pub fn remove_container(&self, element: &ElementRef) -> bool {
        let mut containers = self.containers.borrow_mut();
        match containers.iter().position(|c| c.is_same(element)) {
            Some(index) => {
                containers.remove(index);
                true
            }
            None => false,
        }
    }

    /// Cancels every open, cancellable container, topmost first.
    pub fn cancel_all(&self) -> usize {
        let cancelled = self.take_where(|_| true);
        for container in cancelled.iter().rev() {
            container.cancel();
        }
        cancelled.len()
    }

    /// Cancels the most recently pushed open, cancellable container above
    /// `layer`. Returns whether one was found.
    pub fn cancel_topmost_above(&self, layer: i32) -> bool {
        let snapshot = self.containers.borrow().clone();
        let target = snapshot
            .into_iter()
            .rev()
            .find(|c| c.layer > layer && c.is_cancellable() && c.is_open());

        match target {
            Some(container) => {
                self.remove_container(&container.element);
                debug!(target: "container", "Cancelled topmost container at layer {}", container.layer);
                container.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancels what is still open, then forgets every container.
    pub fn cleanup(&self) {
        self.cancel_all();
        self.containers.borrow_mut().clear();
    }

    //--- Query API --------------------------------------------------------

    /// The most recently pushed container.
    pub fn top_container(&self) -> Option<Container> {
        self.containers.borrow().last().cloned()
    }

    pub fn contains(&self, element: &ElementRef) -> bool {
        self.containers.borrow().iter().any(|c| c.is_same(element))
    }

    pub fn len(&self) -> usize {
        self.containers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.borrow().is_empty()
    }

    //--- Internal Helpers -------------------------------------------------

    /// Removes and returns, in push order, the open cancellable containers
    /// matching `filter`.
    fn take_where<P>(&self, filter: P) -> Vec<Container>
    where
        P: Fn(&Container) -> bool,
    {
        let snapshot = self.containers.borrow().clone();
        let (taken, kept): (Vec<_>, Vec<_>) = snapshot
            .into_iter()
            .partition(|c| filter(c) && c.is_cancellable() && c.is_open());
        *self.containers.borrow_mut() = kept;
        taken
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::DetachedElement;
    use std::cell::Cell;

    fn element() -> ElementRef {
        DetachedElement::new()
    }

    fn cancel_log(label: &'static str, log: &Rc<RefCell<Vec<&'static str>>>) -> ContainerOptions {
        let log = Rc::clone(log);
        ContainerOptions::new().on_cancel(move || log.borrow_mut().push(label))
    }

    //--- Cancellation on push ---------------------------------------------

    #[test]
    fn push_cancels_lower_or_equal_layers_only() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let stack = ContainerStack::new();
        stack.push_container(element(), SCENE_LAYER, cancel_log("body", &log));
        stack.push_container(element(), DIALOG_LAYER, cancel_log("dialog", &log));
        stack.push_container(element(), SUBMENU_LAYER, cancel_log("submenu", &log));

        // Each push cancelled the open container below it.
        assert_eq!(*log.borrow(), vec!["body", "dialog"]);
        log.borrow_mut().clear();

        stack.push_container(element(), DIALOG_LAYER, cancel_log("dialog2", &log));
        assert!(log.borrow().is_empty());
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn push_skips_closed_and_uncancellable_containers() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let stack = ContainerStack::new();
        let closed = Rc::new(Cell::new(true));
        let closed_flag = Rc::clone(&closed);

        stack.push_container(element(), SCENE_LAYER, ContainerOptions::new());
        stack.push_container(
            element(),
            DIALOG_LAYER,
            cancel_log("closed-dialog", &log).closed_when(move || closed_flag.get()),
        );
        stack.push_container(element(), DIALOG_LAYER, cancel_log("open-dialog", &log));

        assert_eq!(*log.borrow(), Vec::<&str>::new());
        closed.set(false);

        stack.push_container(element(), DIALOG_LAYER, ContainerOptions::new());
        assert_eq!(*log.borrow(), vec!["closed-dialog", "open-dialog"]);
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn cancel_callback_may_reenter_stack() {
        let stack = Rc::new(ContainerStack::new());
        let inner = Rc::clone(&stack);
        stack.push_container(
            element(),
            DIALOG_LAYER,
            ContainerOptions::new().on_cancel(move || {
                inner.push_container(element(), SCENE_LAYER, ContainerOptions::new());
            }),
        );

        stack.push_container(element(), DIALOG_LAYER, ContainerOptions::new());
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.top_container().map(|c| c.layer()), Some(DIALOG_LAYER));
    }

    //--- Removal and cancel_all -------------------------------------------

    #[test]
    fn remove_container_by_identity() {
        let stack = ContainerStack::new();
        let body = element();
        let dialog = element();
        stack.push_container(Rc::clone(&body), SCENE_LAYER, ContainerOptions::new());
        stack.push_container(Rc::clone(&dialog), DIALOG_LAYER, ContainerOptions::new());

        assert!(stack.remove_container(&dialog));
        assert!(!stack.remove_container(&dialog));
        assert!(stack.contains(&body));
        assert!(Rc::ptr_eq(stack.top_container().unwrap().element(), &body));
    }

    #[test]
    fn cancel_all_runs_topmost_first_and_keeps_body() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let stack = ContainerStack::new();
        stack.push_container(element(), SCENE_LAYER, ContainerOptions::new());
        stack.push_container(element(), SUBMENU_LAYER, cancel_log("top", &log));
        stack.push_container(element(), DIALOG_LAYER, cancel_log("low", &log));
        assert!(log.borrow().is_empty());

        assert_eq!(stack.cancel_all(), 2);
        assert_eq!(*log.borrow(), vec!["low", "top"]);
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.top_container().map(|c| c.layer()), Some(SCENE_LAYER));
    }

    #[test]
    fn cancel_topmost_above_dismisses_one_dialog() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let stack = ContainerStack::new();
        stack.push_container(element(), SCENE_LAYER, ContainerOptions::new());
        stack.push_container(element(), SUBMENU_LAYER, cancel_log("menu", &log));

        assert!(stack.cancel_topmost_above(SCENE_LAYER));
        assert_eq!(*log.borrow(), vec!["menu"]);
        assert!(!stack.cancel_topmost_above(SCENE_LAYER));
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn closed_predicate_may_read_the_stack() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let stack = Rc::new(ContainerStack::new());
        let inner = Rc::clone(&stack);
        stack.push_container(element(), SCENE_LAYER, ContainerOptions::new());
        stack.push_container(
            element(),
            DIALOG_LAYER,
            cancel_log("dialog", &log).closed_when(move || inner.len() == 0),
        );

        assert!(stack.cancel_topmost_above(SCENE_LAYER));
        assert_eq!(*log.borrow(), vec!["dialog"]);
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.top_container().map(|c| c.layer()), Some(SCENE_LAYER));
    }

    #[test]
    fn cleanup_empties_stack() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let stack = ContainerStack::new();
        stack.push_container(element(), SCENE_LAYER, ContainerOptions::new());
        stack.push_container(element(), DIALOG_LAYER, cancel_log("dialog", &log));

        stack.cleanup();
        assert_eq!(*log.borrow(), vec!["dialog"]);
        assert!(stack.is_empty());
        assert!(stack.top_container().is_none());
    }
}
