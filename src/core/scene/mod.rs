//=========================================================================
// Scene System
//=========================================================================
//
// Scenes, the assistants that give them behaviour, and the per-stage
// stack that orders them.
//
// Architecture:
//   SceneRegistry (name → SceneDescriptor)
//   SceneStack
//     └─ SceneController (one per pushed scene)
//          ├─ SceneAssistant   optional hooks
//          ├─ CommanderStack   scene commander, assistant, app commanders
//          ├─ ContainerStack   body, dialogs, submenus
//          ├─ ModelWatchers    serialized model-change fan-out
//          └─ RequestTracker   in-flight service requests
//
//=========================================================================

//=== Module Declarations =================================================

mod assistant;
mod model_watch;
mod registry;
mod requests;
mod scene_controller;
mod scene_stack;

//=== Public API ==========================================================

pub use assistant::{
    AboutToActivateHook, ActivateHook, HookResult, Notification, OrientationHook, ReturnValue,
    SceneAssistant, SceneCommandHook, SceneHook, SceneNotificationHook,
};
pub use model_watch::{ChangeDetails, ModelRef, ModelWatchers, WatchFn, WatcherRef};
pub use registry::{
    AssistantFactory, PopOptions, SceneArguments, SceneDescriptor, SceneRegistry, SceneTarget,
};
pub use requests::{RequestTracker, TrackedRequest};
pub use scene_controller::{AboutToActivateListener, SceneContext, SceneController, WidgetSetup};
pub use scene_stack::SceneStack;

pub(crate) use assistant::{call_isolated, run_isolated};
