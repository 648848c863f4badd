//=========================================================================
// Stage System
//=========================================================================
//
// Windows of an application and the pipeline that moves scenes in and
// out of them.
//
// Architecture:
//   AppController
//     └─ StageController (one per window)
//          ├─ StageAssistant    optional hooks
//          ├─ SceneStack        scenes, bottom to top
//          ├─ CommanderStack    stage commander, assistant, app commanders
//          └─ DeferredOpQueue   push/pop requests for the next pass
//
//=========================================================================

//=== Module Declarations =================================================

mod app_controller;
mod config;
mod deferred_ops;
mod stage_assistant;
mod stage_controller;

//=== Public API ==========================================================

pub use app_controller::AppController;
pub use config::StageConfig;
pub use deferred_ops::{DeferredBatch, DeferredOpQueue, DeferredSceneOp, SceneOperation};
pub use stage_assistant::{StageAssistant, StageCommandHook, StageHook, StageNotificationHook};
pub use stage_controller::{
    DispatchPhase, ModalDialog, StageController, StageEnvironment, StageType,
};
