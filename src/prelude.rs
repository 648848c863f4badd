//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use stagecraft::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Framework entry point
pub use crate::framework::{Framework, FrameworkBuilder};

// Stages
pub use crate::core::stage::{AppController, StageAssistant, StageConfig, StageController, StageType};

// Scenes
pub use crate::core::scene::{
    HookResult, PopOptions, SceneArguments, SceneAssistant, SceneController, SceneDescriptor,
};

// Commander chain
pub use crate::core::commander::{Commander, CommanderRef, Event, EventType};

// Input and transitions
pub use crate::core::input::{KeyCode, KeyEvent, Modifiers, Orientation};
pub use crate::core::transition::TransitionType;

// Errors
pub use crate::core::error::{CommandError, FrameworkError, HookError};
