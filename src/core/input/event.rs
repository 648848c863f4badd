//=========================================================================
// Key Event Types
//=========================================================================
//
// Host-independent representation of the key input a stage receives.
//
// Event Flow:
// ```text
// Host window (winit)
//         ↓
//    KeyEvent (this module)
//         ↓
//    StageController key handler
//         ├─ back combination → `back` command through the commander chain
//         └─ anything else    → topmost container of the active scene
// ```
//
//=========================================================================

//=== KeyCode =============================================================

/// Physical key identifier.
///
/// Represents the physical key location, not the character produced.
/// `GestureBack` and `GestureForward` stand for the device gesture area,
/// which hosts report as keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    //--- Numeric Keys -----------------------------------------------------

    /// Number row: 0-9
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    //--- Alphabetic Keys --------------------------------------------------

    /// Letter keys: A-Z (physical location, not character)
    KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI,
    KeyJ, KeyK, KeyL, KeyM, KeyN, KeyO, KeyP, KeyQ, KeyR,
    KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,

    //--- Arrow Keys -------------------------------------------------------

    ArrowDown,
    ArrowLeft,
    ArrowRight,
    ArrowUp,

    //--- Special Keys -----------------------------------------------------

    Space,
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,

    //--- Gesture Area -----------------------------------------------------

    /// Back swipe in the gesture area.
    GestureBack,

    /// Forward swipe in the gesture area.
    GestureForward,

    /// Fallback for keys the host could not map.
    Unidentified,
}

//=== KeyPhase ============================================================

/// Which part of a key stroke an event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyPhase {
    Down,
    Press,
    Up,
}

//=== Modifiers ===========================================================

/// Modifier key state (Shift, Ctrl, Alt).
///
/// Modifiers must match exactly for a key combination to match: a
/// binding for `Escape` does not match `Shift+Escape`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    /// No modifiers held.
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
    };

    /// Shift only.
    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
        alt: false,
    };

    /// Ctrl only.
    pub const CTRL: Self = Self {
        shift: false,
        ctrl: true,
        alt: false,
    };

    /// Alt only.
    pub const ALT: Self = Self {
        shift: false,
        ctrl: false,
        alt: true,
    };
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

//=== KeyEvent ============================================================

/// One key event delivered to a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub key: KeyCode,
    pub modifiers: Modifiers,
    pub phase: KeyPhase,

    /// Auto-repeat of a held key.
    pub repeat: bool,
}

impl KeyEvent {
    /// Key-down without modifiers.
    pub fn down(key: KeyCode) -> Self {
        Self::new(key, KeyPhase::Down)
    }

    /// Key-up without modifiers.
    pub fn up(key: KeyCode) -> Self {
        Self::new(key, KeyPhase::Up)
    }

    /// Character-producing press without modifiers.
    pub fn press(key: KeyCode) -> Self {
        Self::new(key, KeyPhase::Press)
    }

    fn new(key: KeyCode, phase: KeyPhase) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
            phase,
            repeat: false,
        }
    }

    /// Returns the event with `modifiers` applied (consumes self).
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Returns the event marked as auto-repeat (consumes self).
    pub fn repeated(mut self) -> Self {
        self.repeat = true;
        self
    }

    pub fn is_down(&self) -> bool {
        self.phase == KeyPhase::Down
    }
}

//=== Orientation =========================================================

/// Device orientation reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    #[default]
    Up,
    Down,
    Left,
    Right,
}

impl Orientation {
    /// Left and right are the landscape orientations.
    pub fn is_landscape(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_phase() {
        assert_eq!(KeyEvent::down(KeyCode::KeyA).phase, KeyPhase::Down);
        assert_eq!(KeyEvent::up(KeyCode::KeyA).phase, KeyPhase::Up);
        assert_eq!(KeyEvent::press(KeyCode::KeyA).phase, KeyPhase::Press);
        assert!(KeyEvent::down(KeyCode::KeyA).is_down());
    }

    #[test]
    fn modifiers_participate_in_equality() {
        let plain = KeyEvent::down(KeyCode::Escape);
        let shifted = plain.with_modifiers(Modifiers::SHIFT);
        assert_ne!(plain, shifted);
        assert_eq!(shifted.modifiers, Modifiers::SHIFT);
    }

    #[test]
    fn repeated_marks_auto_repeat() {
        let event = KeyEvent::down(KeyCode::Enter).repeated();
        assert!(event.repeat);
    }

    #[test]
    fn landscape_orientations() {
        assert!(Orientation::Left.is_landscape());
        assert!(Orientation::Right.is_landscape());
        assert!(!Orientation::Up.is_landscape());
        assert_eq!(Orientation::default(), Orientation::Up);
    }
}
