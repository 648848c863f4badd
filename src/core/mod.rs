//=========================================================================
// Framework Core
//=========================================================================
//
// Everything that runs on the framework thread.
//
// Architecture:
// ```text
//  AppController
//   └─ StageController ──────────── CommanderStack (stage chain)
//        ├─ DeferredOpQueue          push / swap / pop / popTo
//        ├─ SceneStack
//        │    └─ SceneController ── CommanderStack (scene chain)
//        │         └─ ContainerStack
//        ├─ Synchronizer             about-to-activate barrier
//        └─ Transition               capture → prepare → run → cleanup
//
//  RunLoop drives every deferred task and timer above.
//  Services and PlatformHost are the seams to the outside world.
// ```
//
//=========================================================================

//=== Module Declarations =================================================

pub mod commander;
pub mod container;
pub mod error;
pub mod input;
pub mod platform_bridge;
pub mod run_loop;
pub mod scene;
pub mod services;
pub mod stage;
pub mod synchronizer;
pub mod transition;

#[cfg(test)]
pub(crate) mod testing;
