//=========================================================================
// Stage Assistant
//=========================================================================
//
// Optional application hooks for one stage. Mirrors the scene assistant:
// every hook may be absent, and presence is read once at bind time.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::rc::Rc;

//=== Internal Dependencies ===============================================

use super::StageController;
use crate::core::commander::Event;
use crate::core::error::CommandError;
use crate::core::scene::{HookResult, Notification};

//=== Hook Types ==========================================================

pub type StageHook = Rc<dyn Fn(&StageController) -> HookResult>;
pub type StageCommandHook = Rc<dyn Fn(&StageController, &mut Event) -> Result<(), CommandError>>;
pub type StageNotificationHook = Rc<dyn Fn(&StageController, Notification) -> Option<Notification>>;

//=== StageAssistant ======================================================

#[derive(Clone, Default)]
pub struct StageAssistant {
    pub(crate) setup: Option<StageHook>,
    pub(crate) cleanup: Option<StageHook>,
    pub(crate) handle_command: Option<StageCommandHook>,
    pub(crate) consider_for_notification: Option<StageNotificationHook>,
    pub(crate) state: Option<Rc<dyn Any>>,
}

impl StageAssistant {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs once when the stage is created, before any scene is pushed.
    pub fn on_setup<F>(mut self, hook: F) -> Self
    where
        F: Fn(&StageController) -> HookResult + 'static,
    {
        self.setup = Some(Rc::new(hook));
        self
    }

    pub fn on_cleanup<F>(mut self, hook: F) -> Self
    where
        F: Fn(&StageController) -> HookResult + 'static,
    {
        self.cleanup = Some(Rc::new(hook));
        self
    }

    /// Commands that the current scene did not stop reach this hook before
    /// the stage's default handling.
    pub fn on_command<F>(mut self, hook: F) -> Self
    where
        F: Fn(&StageController, &mut Event) -> Result<(), CommandError> + 'static,
    {
        self.handle_command = Some(Rc::new(hook));
        self
    }

    pub fn on_notification<F>(mut self, hook: F) -> Self
    where
        F: Fn(&StageController, Notification) -> Option<Notification> + 'static,
    {
        self.consider_for_notification = Some(Rc::new(hook));
        self
    }

    pub fn with_state<T: Any>(mut self, state: Rc<T>) -> Self {
        self.state = Some(state);
        self
    }

    pub fn state(&self) -> Option<&Rc<dyn Any>> {
        self.state.as_ref()
    }

    pub fn handles_commands(&self) -> bool {
        self.handle_command.is_some()
    }
}
