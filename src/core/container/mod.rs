//=========================================================================
// Containers
//=========================================================================
//
// Layered UI regions owned by a scene.
//
//   SUBMENU_LAYER (20)  ── app menus, pickers
//   DIALOG_LAYER  (10)  ── dialogs
//   SCENE_LAYER    (0)  ── the scene body
//
// Key events that are not commands go to the topmost container.
//
//=========================================================================

//=== Module Declarations =================================================

mod container_stack;

//=== Public API ==========================================================

pub use container_stack::{
    CancelFn, ClosedFn, Container, ContainerOptions, ContainerStack, DIALOG_LAYER, SCENE_LAYER,
    SUBMENU_LAYER,
};
