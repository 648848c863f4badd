//=========================================================================
// Error Types
//=========================================================================
//
// Error taxonomy for the scene/stage core.
//
//   FrameworkError  → bookkeeping failures (halt only the operation)
//   HookError       → assistant hook failures (caught, logged, isolated)
//   CommandError    → commander failures (propagate to the dispatcher)
//   ViewError / WidgetError / LoadError / HostError → collaborator failures
//
//=========================================================================

//=== External Dependencies ===============================================

use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::transition::TransitionState;

//=== FrameworkError ======================================================

/// Failures of framework-internal operations.
///
/// These fail the single operation that raised them (one scene push, one
/// widget model update) and leave the rest of the stage untouched.
#[derive(Debug, Error)]
pub enum FrameworkError {
    #[error("scene '{0}' is not registered")]
    SceneNotRegistered(String),

    #[error("assistant for scene '{scene}' could not be constructed: {source}")]
    AssistantConstruction {
        scene: String,
        #[source]
        source: HookError,
    },

    #[error("view for scene '{scene}' could not be materialized: {source}")]
    View {
        scene: String,
        #[source]
        source: ViewError,
    },

    #[error("stage '{0}' already exists")]
    StageExists(String),

    #[error("stage '{0}' is closed")]
    StageClosed(String),

    #[error("widget '{widget}' was never set up in scene '{scene}'")]
    WidgetNotSetUp { widget: String, scene: String },

    #[error("transition cannot {action} while {state:?}")]
    TransitionState {
        action: &'static str,
        state: TransitionState,
    },
}

//=== HookError ===========================================================

/// Failure reported by an application-supplied assistant hook.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
    /// The hook returned an error.
    #[error("{0}")]
    Failed(String),

    /// The hook panicked; the payload message is kept when it is a string.
    #[error("panicked: {0}")]
    Panicked(String),
}

impl From<&str> for HookError {
    fn from(message: &str) -> Self {
        Self::Failed(message.to_string())
    }
}

impl From<String> for HookError {
    fn from(message: String) -> Self {
        Self::Failed(message)
    }
}

//=== CommandError ========================================================

/// Failure raised by a commander while handling an event.
///
/// Unlike lifecycle hooks, commander failures are not isolated: they abort
/// the dispatch and are returned to whoever sent the event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("command handler failed: {0}")]
    Handler(String),
}

impl From<&str> for CommandError {
    fn from(message: &str) -> Self {
        Self::Handler(message.to_string())
    }
}

//=== Collaborator Errors =================================================

/// Failure of the view/templating collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("template '{template}' failed to render: {reason}")]
    Render { template: String, reason: String },

    #[error("markup could not be converted to an element: {0}")]
    Convert(String),
}

/// Failure of the widget collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("widget error: {0}")]
pub struct WidgetError(pub String);

/// Failure of the source loader.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to load {sources:?}: {reason}")]
pub struct LoadError {
    pub sources: Vec<String>,
    pub reason: String,
}

/// Failure of a platform host bridge call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("host bridge disconnected")]
    Disconnected,

    #[error("host rejected the request: {0}")]
    Rejected(String),
}

//=========================================================================
// Unit Tests
//=========================================================================
