//=========================================================================
// Scene Stack
//=========================================================================
//
// Ordered scenes of one stage. The last element is the current scene.
//
// Architecture:
//   push_scene(s)        setup → append → mark pending-hide
//   swap_scene(s)        cleanup top → push (nothing below is touched)
//   pop_scene(rv)        cleanup top, stash rv for the next activate()
//   pop_scenes_to(t, rv) cleanup until `t` is on top or the stack is empty
//
// A removed scene is cleaned up before the stack changes again.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use log::debug;

//=== Internal Dependencies ===============================================

use super::assistant::ReturnValue;
use super::registry::SceneTarget;
use super::SceneController;

//=== SceneStack ==========================================================

#[derive(Default)]
pub struct SceneStack {
    scenes: RefCell<Vec<Rc<SceneController>>>,
    pending_hide: RefCell<Vec<Rc<SceneController>>>,
    return_value: RefCell<Option<ReturnValue>>,
}

impl SceneStack {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Mutation ---------------------------------------------------------

    pub fn push_scene(&self, scene: Rc<SceneController>) {
        scene.setup();
        debug!(target: "scene", "Pushed '{}'", scene.name());
        self.scenes.borrow_mut().push(Rc::clone(&scene));
        self.pending_hide.borrow_mut().push(scene);
    }

    /// Replaces the current scene without activating or deactivating any
    /// scene below it.
    pub fn swap_scene(&self, scene: Rc<SceneController>) {
        self.remove_top();
        self.push_scene(scene);
    }

    /// Removes the current scene; `return_value` goes to the next
    /// `activate()`.
    pub fn pop_scene(&self, return_value: Option<ReturnValue>) -> Option<Rc<SceneController>> {
        let popped = self.remove_top();
        *self.return_value.borrow_mut() = return_value;
        popped
    }

    /// Pops until `target` is the current scene. An unknown target empties
    /// the stack. Returns how many scenes were removed.
    pub fn pop_scenes_to(&self, target: &SceneTarget, return_value: Option<ReturnValue>) -> usize {
        let mut popped = 0;
        while let Some(top) = self.current_scene() {
            if target.matches(&top) {
                break;
            }
            self.remove_top();
            popped += 1;
        }
        *self.return_value.borrow_mut() = return_value;
        popped
    }

    /// Deactivates and removes every scene, top first.
    pub fn pop_all(&self) -> usize {
        self.deactivate();
        let mut popped = 0;
        while self.remove_top().is_some() {
            popped += 1;
        }
        self.pending_hide.borrow_mut().clear();
        self.return_value.borrow_mut().take();
        popped
    }

    //--- Activation -------------------------------------------------------

    pub fn activate(&self) {
        if let Some(top) = self.current_scene() {
            if !top.is_active() {
                let return_value = self.return_value.borrow_mut().take();
                top.activate(return_value);
            }
        }
    }

    pub fn deactivate(&self) {
        if let Some(top) = self.current_scene() {
            if top.is_active() {
                top.deactivate();
            }
        }
    }

    /// Hides every pushed-but-not-shown scene other than `activating`,
    /// which is made visible.
    pub fn about_to_activate(&self, activating: &Rc<SceneController>) {
        let pending = std::mem::take(&mut *self.pending_hide.borrow_mut());
        for scene in pending.iter().filter(|s| !Rc::ptr_eq(s, activating)) {
            scene.element().set_visible(false);
        }
        activating.element().set_visible(true);
    }

    //--- Query API --------------------------------------------------------

    pub fn current_scene(&self) -> Option<Rc<SceneController>> {
        self.scenes.borrow().last().cloned()
    }

    pub fn scenes(&self) -> Vec<Rc<SceneController>> {
        self.scenes.borrow().clone()
    }

    /// The scene directly below `target`.
    pub fn parent_scene(&self, target: &Rc<SceneController>) -> Option<Rc<SceneController>> {
        let scenes = self.scenes.borrow();
        let index = scenes.iter().position(|s| Rc::ptr_eq(s, target))?;
        index.checked_sub(1).map(|below| Rc::clone(&scenes[below]))
    }

    /// Assistant state of the scene directly below `target`.
    pub fn parent_scene_assistant(&self, target: &Rc<SceneController>) -> Option<Rc<dyn Any>> {
        self.parent_scene(target)?.assistant_state()
    }

    pub fn contains(&self, scene: &Rc<SceneController>) -> bool {
        self.scenes.borrow().iter().any(|s| Rc::ptr_eq(s, scene))
    }

    pub fn len(&self) -> usize {
        self.scenes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.borrow().is_empty()
    }

    //--- Internal Helpers -------------------------------------------------

    fn remove_top(&self) -> Option<Rc<SceneController>> {
        let top = self.scenes.borrow_mut().pop()?;
        self.pending_hide.borrow_mut().retain(|s| !Rc::ptr_eq(s, &top));
        debug!(target: "scene", "Removed '{}'", top.name());
        top.cleanup();
        Some(top)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{detached_scene, named_assistant, CallLog};

    fn stack_of(names: &[&'static str], log: &CallLog) -> (SceneStack, Vec<Rc<SceneController>>) {
        let stack = SceneStack::new();
        let scenes: Vec<_> = names
            .iter()
            .map(|&name| detached_scene(name, named_assistant(name, log)))
            .collect();
        for scene in &scenes {
            stack.push_scene(Rc::clone(scene));
        }
        log.take();
        (stack, scenes)
    }

    #[test]
    fn push_sets_up_and_tops_the_stack() {
        let log = CallLog::new();
        let stack = SceneStack::new();
        let a = detached_scene("a", named_assistant("a", &log));

        stack.push_scene(Rc::clone(&a));
        assert!(a.is_set_up());
        assert!(Rc::ptr_eq(&stack.current_scene().unwrap(), &a));
        assert_eq!(log.take(), vec!["a:setup", "a:ready"]);
    }

    #[test]
    fn pop_delivers_return_value_on_next_activate() {
        let log = CallLog::new();
        let (stack, scenes) = stack_of(&["a", "b"], &log);
        stack.activate();
        assert!(scenes[1].is_active());

        stack.deactivate();
        stack.pop_scene(Some(Rc::new("picked")));
        stack.activate();

        assert!(scenes[0].is_active());
        assert!(scenes[1].is_cleaned_up());
        assert_eq!(log.take(), vec!["b:activate", "b:deactivate", "b:cleanup", "a:activate(picked)"]);
    }

    #[test]
    fn swap_leaves_scene_below_untouched() {
        let log = CallLog::new();
        let (stack, scenes) = stack_of(&["root", "a"], &log);
        let c = detached_scene("c", named_assistant("c", &log));

        stack.swap_scene(Rc::clone(&c));
        assert_eq!(log.take(), vec!["a:cleanup", "c:setup", "c:ready"]);
        assert_eq!(stack.len(), 2);
        assert!(!scenes[0].is_cleaned_up());
        assert!(Rc::ptr_eq(&stack.current_scene().unwrap(), &c));
    }

    #[test]
    fn pop_scenes_to_matches_identity_name_or_id() {
        let log = CallLog::new();
        let (stack, scenes) = stack_of(&["a", "b", "c", "d"], &log);

        assert_eq!(stack.pop_scenes_to(&SceneTarget::from("b"), None), 2);
        assert!(Rc::ptr_eq(&stack.current_scene().unwrap(), &scenes[1]));

        assert_eq!(stack.pop_scenes_to(&SceneTarget::from(&scenes[0]), None), 1);
        assert_eq!(stack.len(), 1);

        // Unknown target pops everything.
        assert_eq!(stack.pop_scenes_to(&SceneTarget::from("missing"), None), 1);
        assert!(stack.is_empty());
    }

    #[test]
    fn activation_only_touches_top_when_state_differs() {
        let log = CallLog::new();
        let (stack, _) = stack_of(&["a", "b"], &log);

        stack.activate();
        stack.activate();
        stack.deactivate();
        stack.deactivate();
        assert_eq!(log.take(), vec!["b:activate", "b:deactivate"]);
    }

    #[test]
    fn about_to_activate_hides_pending_scenes() {
        let log = CallLog::new();
        let (stack, scenes) = stack_of(&["a", "b", "c"], &log);

        stack.about_to_activate(&scenes[2]);
        assert!(!scenes[0].element().is_visible());
        assert!(!scenes[1].element().is_visible());
        assert!(scenes[2].element().is_visible());

        // The pending list was cleared.
        scenes[0].element().set_visible(true);
        stack.about_to_activate(&scenes[2]);
        assert!(scenes[0].element().is_visible());
    }

    #[test]
    fn parent_scene_assistant_is_the_one_below() {
        let log = CallLog::new();
        let stack = SceneStack::new();
        let a = detached_scene("a", named_assistant("a", &log).with_state(Rc::new(1u8)));
        let b = detached_scene("b", named_assistant("b", &log));
        stack.push_scene(Rc::clone(&a));
        stack.push_scene(Rc::clone(&b));

        let parent = stack.parent_scene_assistant(&b);
        assert_eq!(parent.and_then(|s| s.downcast_ref::<u8>().copied()), Some(1));
        assert!(stack.parent_scene_assistant(&a).is_none());
    }

    #[test]
    fn pop_all_deactivates_then_cleans_every_scene() {
        let log = CallLog::new();
        let (stack, scenes) = stack_of(&["a", "b"], &log);
        stack.activate();
        log.take();

        assert_eq!(stack.pop_all(), 2);
        assert_eq!(log.take(), vec!["b:deactivate", "b:cleanup", "a:cleanup"]);
        assert!(scenes.iter().all(|s| s.is_cleaned_up()));
        assert!(stack.is_empty());
    }
}
