//=========================================================================
// Stagecraft Library Root
//
// Scene and stage controllers for single-process application frameworks.
//
// Responsibilities:
// - Expose the framework core (`core`): stages, scenes, commanders,
//   transitions and the run loop that sequences them
// - Keep the winit host (`platform`) hidden from end users
// - Provide the `Framework` entry point that wires the two together
//
// Typical usage:
// ```no_run
// use stagecraft::FrameworkBuilder;
// use stagecraft::core::stage::StageAssistant;
//
// fn main() {
//     FrameworkBuilder::new().build().run(|_app| StageAssistant::new());
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` is usable without a window: every collaborator sits behind a
// trait in `core::services` and `core::platform_bridge`.
//
pub mod core;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `platform` contains the winit window host. `framework` defines the
// entry point and the framework thread.
//
mod framework;
mod platform;

//--- Public Exports ------------------------------------------------------

pub use framework::{Framework, FrameworkBuilder};
