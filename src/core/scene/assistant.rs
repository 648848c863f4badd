//=========================================================================
// Scene Assistant
//=========================================================================
//
// Application behaviour of one scene, as a fixed set of optional hooks.
//
// Every hook is optional. Presence is read once when the scene controller
// binds the assistant; a missing hook is simply never called.
//
// Lifecycle hooks are isolated: an `Err` or a panic is logged with the
// scene and hook name and the framework sequence carries on.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use log::error;

//=== Internal Dependencies ===============================================

use super::SceneController;
use crate::core::commander::Event;
use crate::core::error::{CommandError, HookError};
use crate::core::input::Orientation;
use crate::core::synchronizer::Synchronizer;

//=== Hook Types ==========================================================

pub type HookResult = Result<(), HookError>;

/// Value handed from a popped scene to the scene it uncovers.
pub type ReturnValue = Rc<dyn Any>;

/// Opaque notification travelling the notification chain.
pub type Notification = Rc<dyn Any>;

pub type SceneHook = Rc<dyn Fn(&SceneController) -> HookResult>;
pub type ActivateHook = Rc<dyn Fn(&SceneController, Option<&ReturnValue>) -> HookResult>;
pub type AboutToActivateHook = Rc<dyn Fn(&SceneController, &Rc<Synchronizer>) -> HookResult>;
pub type SceneCommandHook = Rc<dyn Fn(&SceneController, &mut Event) -> Result<(), CommandError>>;
pub type OrientationHook = Rc<dyn Fn(&SceneController, Orientation) -> HookResult>;
pub type SceneNotificationHook =
    Rc<dyn Fn(&SceneController, Notification) -> Option<Notification>>;

//=== SceneAssistant ======================================================

/// Hooks and state an application supplies for one scene.
#[derive(Clone, Default)]
pub struct SceneAssistant {
    pub(crate) setup: Option<SceneHook>,
    pub(crate) ready: Option<SceneHook>,
    pub(crate) cleanup: Option<SceneHook>,
    pub(crate) activate: Option<ActivateHook>,
    pub(crate) deactivate: Option<SceneHook>,
    pub(crate) about_to_activate: Option<AboutToActivateHook>,
    pub(crate) handle_command: Option<SceneCommandHook>,
    pub(crate) orientation_changed: Option<OrientationHook>,
    pub(crate) consider_for_notification: Option<SceneNotificationHook>,
    pub(crate) state: Option<Rc<dyn Any>>,
}

impl SceneAssistant {
    /// An assistant with no hooks.
    pub fn new() -> Self {
        Self::default()
    }

    //--- Lifecycle Hooks --------------------------------------------------

    /// Runs once while the scene is set up, before widgets are instantiated.
    pub fn on_setup<F>(mut self, hook: F) -> Self
    where
        F: Fn(&SceneController) -> HookResult + 'static,
    {
        self.setup = Some(Rc::new(hook));
        self
    }

    /// Runs at the end of setup, after widgets and menus exist.
    pub fn on_ready<F>(mut self, hook: F) -> Self
    where
        F: Fn(&SceneController) -> HookResult + 'static,
    {
        self.ready = Some(Rc::new(hook));
        self
    }

    pub fn on_cleanup<F>(mut self, hook: F) -> Self
    where
        F: Fn(&SceneController) -> HookResult + 'static,
    {
        self.cleanup = Some(Rc::new(hook));
        self
    }

    /// Runs when the scene becomes active; receives the value the popped
    /// scene above it returned, if any.
    pub fn on_activate<F>(mut self, hook: F) -> Self
    where
        F: Fn(&SceneController, Option<&ReturnValue>) -> HookResult + 'static,
    {
        self.activate = Some(Rc::new(hook));
        self
    }

    pub fn on_deactivate<F>(mut self, hook: F) -> Self
    where
        F: Fn(&SceneController) -> HookResult + 'static,
    {
        self.deactivate = Some(Rc::new(hook));
        self
    }

    /// Runs before the transition to this scene. Callbacks wrapped with the
    /// synchronizer hold the transition back until they run.
    pub fn on_about_to_activate<F>(mut self, hook: F) -> Self
    where
        F: Fn(&SceneController, &Rc<Synchronizer>) -> HookResult + 'static,
    {
        self.about_to_activate = Some(Rc::new(hook));
        self
    }

    //--- Event Hooks ------------------------------------------------------

    /// Makes the assistant a commander of its scene. Errors propagate to
    /// the sender of the event.
    pub fn on_command<F>(mut self, hook: F) -> Self
    where
        F: Fn(&SceneController, &mut Event) -> Result<(), CommandError> + 'static,
    {
        self.handle_command = Some(Rc::new(hook));
        self
    }

    pub fn on_orientation_changed<F>(mut self, hook: F) -> Self
    where
        F: Fn(&SceneController, Orientation) -> HookResult + 'static,
    {
        self.orientation_changed = Some(Rc::new(hook));
        self
    }

    /// Offered notifications; return `None` to consume one.
    pub fn on_notification<F>(mut self, hook: F) -> Self
    where
        F: Fn(&SceneController, Notification) -> Option<Notification> + 'static,
    {
        self.consider_for_notification = Some(Rc::new(hook));
        self
    }

    //--- State ------------------------------------------------------------

    /// Attaches application state reachable through
    /// `delegate_to_scene_assistant` and `parent_scene_assistant`.
    pub fn with_state<T: Any>(mut self, state: Rc<T>) -> Self {
        self.state = Some(state);
        self
    }

    pub fn state(&self) -> Option<&Rc<dyn Any>> {
        self.state.as_ref()
    }

    //--- Capabilities -----------------------------------------------------

    pub fn has_about_to_activate(&self) -> bool {
        self.about_to_activate.is_some()
    }

    pub fn handles_commands(&self) -> bool {
        self.handle_command.is_some()
    }
}

//=== Hook Isolation ======================================================

/// Runs one application hook, catching `Err` returns and panics.
///
/// Returns whether the hook succeeded. Failures are logged under `target`
/// with the owner and hook names.
pub(crate) fn run_isolated<F>(target: &'static str, owner: &str, hook: &'static str, f: F) -> bool
where
    F: FnOnce() -> HookResult,
{
    let outcome = panic::catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|payload| Err(HookError::Panicked(panic_message(payload.as_ref()))));

    match outcome {
        Ok(()) => true,
        Err(err) => {
            error!(target: target, "{}: {} hook failed: {}", owner, hook, err);
            false
        }
    }
}

/// Like [`run_isolated`] for hooks producing a value; `fallback` is
/// returned when the hook panics.
pub(crate) fn call_isolated<T, F>(
    target: &'static str,
    owner: &str,
    hook: &'static str,
    fallback: T,
    f: F,
) -> T
where
    F: FnOnce() -> T,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(payload) => {
            error!(
                target: target,
                "{}: {} hook failed: panicked: {}",
                owner,
                hook,
                panic_message(payload.as_ref())
            );
            fallback
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
