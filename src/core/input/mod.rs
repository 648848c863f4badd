//=========================================================================
// Stage Input
//=========================================================================
//
// Key input types shared by the host bridge and the stage controller.
//
// Components:
// - `event`: key codes, modifiers, key events, orientation
// - `back_keys`: which combinations mean "go back"
//
//=========================================================================

//=== Module Declarations =================================================

pub mod back_keys;
pub mod event;

//=== Public API ==========================================================

pub use back_keys::BackKeyMap;
pub use event::{KeyCode, KeyEvent, KeyPhase, Modifiers, Orientation};
