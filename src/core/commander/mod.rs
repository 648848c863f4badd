//=========================================================================
// Commander Chain
//=========================================================================
//
// Events and the objects that handle them.
//
// Architecture:
//   StageController::send_event_to_commanders(event)
//     ├─ scene CommanderStack  (last pushed first)
//     └─ stage CommanderStack  (only if the scene did not stop it)
//
// Propagation is an explicit flag on the event; handlers stop it with
// `stop_propagation()`.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::fmt;
use std::rc::Rc;

//=== Internal Dependencies ===============================================

use crate::core::error::CommandError;

//=== Module Declarations =================================================

mod commander_stack;

//=== Public API ==========================================================

pub use commander_stack::{CommanderRef, CommanderStack};

/// Command sent when the application menu's Preferences item is chosen.
pub const PREFS_COMMAND: &str = "palm-prefs-cmd";

/// Command sent when the application menu's Help item is chosen.
pub const HELP_COMMAND: &str = "palm-help-cmd";

//=== EventType ===========================================================

/// Kind of event travelling through the commander chain.
///
/// The framework interprets `Back`, `Command` and `CommandEnable`; any
/// other string is legal and passes through untouched as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventType {
    Back,
    Forward,
    Command,
    CommandEnable,
    StageActivate,
    StageDeactivate,
    Other(String),
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Back => "back",
            Self::Forward => "forward",
            Self::Command => "command",
            Self::CommandEnable => "commandEnable",
            Self::StageActivate => "stageActivate",
            Self::StageDeactivate => "stageDeactivate",
            Self::Other(name) => name,
        }
    }
}

impl From<&str> for EventType {
    fn from(name: &str) -> Self {
        match name {
            "back" => Self::Back,
            "forward" => Self::Forward,
            "command" => Self::Command,
            "commandEnable" => Self::CommandEnable,
            "stageActivate" => Self::StageActivate,
            "stageDeactivate" => Self::StageDeactivate,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//=== Event ===============================================================

/// An event dispatched through a commander chain.
pub struct Event {
    event_type: EventType,
    command: Option<String>,
    payload: Option<Rc<dyn Any>>,
    propagation_stopped: bool,
    default_prevented: bool,
}

impl Event {
    //--- Construction -----------------------------------------------------

    pub fn new(event_type: impl Into<EventType>) -> Self {
        Self {
            event_type: event_type.into(),
            command: None,
            payload: None,
            propagation_stopped: false,
            default_prevented: false,
        }
    }

    pub fn back() -> Self {
        Self::new(EventType::Back)
    }

    pub fn forward() -> Self {
        Self::new(EventType::Forward)
    }

    /// A `command` event, e.g. from a menu item.
    pub fn command(command: impl Into<String>) -> Self {
        Self::new(EventType::Command).with_command(command)
    }

    /// Asks the chain whether `command` is enabled. Any handler may call
    /// `prevent_default()` to disable it.
    pub fn command_enable(command: impl Into<String>) -> Self {
        Self::new(EventType::CommandEnable).with_command(command)
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn with_payload(mut self, payload: Rc<dyn Any>) -> Self {
        self.payload = Some(payload);
        self
    }

    //--- Accessors --------------------------------------------------------

    pub fn event_type(&self) -> &EventType {
        &self.event_type
    }

    pub fn is(&self, event_type: &EventType) -> bool {
        &self.event_type == event_type
    }

    pub fn command_name(&self) -> Option<&str> {
        self.command.as_deref()
    }

    pub fn payload(&self) -> Option<&Rc<dyn Any>> {
        self.payload.as_ref()
    }

    //--- Propagation ------------------------------------------------------

    /// Stops delivery to the remaining commanders.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("event_type", &self.event_type)
            .field("command", &self.command)
            .field("has_payload", &self.payload.is_some())
            .field("propagation_stopped", &self.propagation_stopped)
            .field("default_prevented", &self.default_prevented)
            .finish()
    }
}

//=== Commander Trait =====================================================

/// Anything that takes part in a commander chain.
pub trait Commander {
    /// Handles `event`. Errors abort the dispatch and reach the sender.
    fn handle_command(&self, event: &mut Event) -> Result<(), CommandError>;
}

/// Commander backed by a closure.
pub struct FnCommander<F>(F);

impl<F> Commander for FnCommander<F>
where
    F: Fn(&mut Event) -> Result<(), CommandError>,
{
    fn handle_command(&self, event: &mut Event) -> Result<(), CommandError> {
        (self.0)(event)
    }
}

/// Wraps a closure as a shareable commander.
pub fn commander_fn<F>(handler: F) -> CommanderRef
where
    F: Fn(&mut Event) -> Result<(), CommandError> + 'static,
{
    Rc::new(FnCommander(handler))
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_round_trips_reserved_names() {
        for name in ["back", "forward", "command", "commandEnable"] {
            assert_eq!(EventType::from(name).as_str(), name);
        }
        assert_eq!(EventType::from("back"), EventType::Back);
    }

    #[test]
    fn unknown_event_names_are_preserved() {
        let kind = EventType::from("my-app-refresh");
        assert_eq!(kind, EventType::Other("my-app-refresh".into()));
        assert_eq!(kind.to_string(), "my-app-refresh");
    }

    #[test]
    fn command_enable_carries_command_and_flags_start_clear() {
        let mut event = Event::command_enable(PREFS_COMMAND);
        assert!(event.is(&EventType::CommandEnable));
        assert_eq!(event.command_name(), Some(PREFS_COMMAND));
        assert!(!event.is_propagation_stopped());
        assert!(!event.is_default_prevented());

        event.prevent_default();
        event.stop_propagation();
        assert!(event.is_default_prevented());
        assert!(event.is_propagation_stopped());
    }

    #[test]
    fn payload_is_downcastable() {
        let event = Event::new("tick").with_payload(Rc::new(7u32));
        let value = event.payload().and_then(|p| p.downcast_ref::<u32>());
        assert_eq!(value, Some(&7));
    }

    #[test]
    fn fn_commander_forwards_to_closure() {
        let commander = commander_fn(|event| {
            event.stop_propagation();
            Ok(())
        });
        let mut event = Event::back();
        commander.handle_command(&mut event).unwrap();
        assert!(event.is_propagation_stopped());
    }
}
