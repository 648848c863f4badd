//=========================================================================
// Commander Stack
//=========================================================================
//
// Ordered list of commanders; delivery runs last-pushed first and stops
// as soon as a handler stops propagation.
//
// Commanders are referenced, not owned: removal is always explicit.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::rc::Rc;

use log::trace;

//=== Internal Dependencies ===============================================

use super::{Commander, Event};
use crate::core::error::CommandError;

//=== CommanderStack ======================================================

/// Shared handle to a commander.
pub type CommanderRef = Rc<dyn Commander>;

/// LIFO chain of commanders.
#[derive(Default)]
pub struct CommanderStack {
    commanders: RefCell<Vec<CommanderRef>>,
}

impl CommanderStack {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Stack Operations -------------------------------------------------

    /// Pushes `commander` on top. Duplicates are kept as separate entries.
    pub fn push_commander(&self, commander: CommanderRef) {
        self.commanders.borrow_mut().push(commander);
    }

    /// Removes every reference to `commander`; returns how many were removed.
    pub fn remove_commander(&self, commander: &CommanderRef) -> usize {
        let mut commanders = self.commanders.borrow_mut();
        let before = commanders.len();
        commanders.retain(|c| !Rc::ptr_eq(c, commander));
        before - commanders.len()
    }

    pub fn clear(&self) {
        self.commanders.borrow_mut().clear();
    }

    //--- Dispatch ---------------------------------------------------------

    /// Delivers `event` to each commander, most recently pushed first,
    /// until one stops propagation.
    ///
    /// Handlers may push or remove commanders while the event travels; a
    /// commander removed mid-dispatch is skipped. Handler errors are
    /// returned immediately.
    pub fn send_event_to_commanders(&self, event: &mut Event) -> Result<(), CommandError> {
        let snapshot: Vec<CommanderRef> = self.commanders.borrow().iter().rev().cloned().collect();

        for commander in snapshot {
            if event.is_propagation_stopped() {
                break;
            }
            if !self.contains(&commander) {
                continue;
            }
            commander.handle_command(event)?;
        }

        trace!(
            target: "commander",
            "Dispatched {} (stopped: {})",
            event.event_type(),
            event.is_propagation_stopped()
        );
        Ok(())
    }

    //--- Query API --------------------------------------------------------

    pub fn contains(&self, commander: &CommanderRef) -> bool {
        self.commanders.borrow().iter().any(|c| Rc::ptr_eq(c, commander))
    }

    pub fn len(&self) -> usize {
        self.commanders.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commanders.borrow().is_empty()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::commander::commander_fn;

    fn recording(label: &'static str, log: &Rc<RefCell<Vec<&'static str>>>) -> CommanderRef {
        let log = Rc::clone(log);
        commander_fn(move |_| {
            log.borrow_mut().push(label);
            Ok(())
        })
    }

    fn stopping(label: &'static str, log: &Rc<RefCell<Vec<&'static str>>>) -> CommanderRef {
        let log = Rc::clone(log);
        commander_fn(move |event| {
            log.borrow_mut().push(label);
            event.stop_propagation();
            Ok(())
        })
    }

    #[test]
    fn delivers_most_recent_first() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let stack = CommanderStack::new();
        stack.push_commander(recording("a", &log));
        stack.push_commander(recording("b", &log));
        stack.push_commander(recording("c", &log));

        stack.send_event_to_commanders(&mut Event::back()).unwrap();
        assert_eq!(*log.borrow(), vec!["c", "b", "a"]);
    }

    #[test]
    fn stop_propagation_halts_delivery() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let stack = CommanderStack::new();
        stack.push_commander(recording("bottom", &log));
        stack.push_commander(stopping("middle", &log));
        stack.push_commander(recording("top", &log));

        let mut event = Event::back();
        stack.send_event_to_commanders(&mut event).unwrap();

        assert!(event.is_propagation_stopped());
        assert_eq!(*log.borrow(), vec!["top", "middle"]);
    }

    #[test]
    fn remove_commander_removes_all_duplicates() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let stack = CommanderStack::new();
        let twice = recording("twice", &log);
        stack.push_commander(Rc::clone(&twice));
        stack.push_commander(recording("other", &log));
        stack.push_commander(Rc::clone(&twice));

        assert_eq!(stack.remove_commander(&twice), 2);
        assert_eq!(stack.len(), 1);

        stack.send_event_to_commanders(&mut Event::back()).unwrap();
        assert_eq!(*log.borrow(), vec!["other"]);
    }

    #[test]
    fn lifo_order_survives_interleaved_push_and_remove() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let stack = CommanderStack::new();
        let a = recording("a", &log);
        let b = recording("b", &log);
        stack.push_commander(Rc::clone(&a));
        stack.push_commander(Rc::clone(&b));
        stack.remove_commander(&a);
        stack.push_commander(Rc::clone(&a));
        stack.push_commander(recording("c", &log));

        stack.send_event_to_commanders(&mut Event::back()).unwrap();
        assert_eq!(*log.borrow(), vec!["c", "a", "b"]);
    }

    #[test]
    fn handler_error_propagates_and_stops_dispatch() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let stack = CommanderStack::new();
        stack.push_commander(recording("never", &log));
        stack.push_commander(commander_fn(|_| Err(CommandError::from("broken"))));

        let result = stack.send_event_to_commanders(&mut Event::back());
        assert_eq!(result, Err(CommandError::Handler("broken".into())));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn commander_removed_mid_dispatch_is_skipped() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let stack = Rc::new(CommanderStack::new());
        let victim = recording("victim", &log);
        stack.push_commander(Rc::clone(&victim));

        let remover_stack = Rc::clone(&stack);
        let remover_victim = Rc::clone(&victim);
        stack.push_commander(commander_fn(move |_| {
            remover_stack.remove_commander(&remover_victim);
            Ok(())
        }));

        stack.send_event_to_commanders(&mut Event::back()).unwrap();
        assert!(log.borrow().is_empty());
    }
}
