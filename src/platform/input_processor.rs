//=========================================================================
// Input Processor
//=========================================================================
//
// Converts winit keyboard input into stage KeyEvents.
//
// Architecture:
//   winit KeyEvent → InputProcessor → KeyEvent(s) → HostEvent::Key
//
// Stateful modifier tracking: caches modifier state from ModifiersChanged
// events and applies it to every subsequent key event. A pressed key that
// produces text yields a `Down` followed by a `Press`. Unmapped keys are
// filtered.
//
//=========================================================================

//=== External Dependencies ===============================================

use winit::{
    event::{ElementState, KeyEvent as WinitKeyEvent},
    keyboard::{KeyCode as WinitKeyCode, ModifiersState, PhysicalKey},
};

//=== Internal Dependencies ===============================================

use crate::core::input::{KeyCode, KeyEvent, KeyPhase, Modifiers};

//=== InputProcessor ======================================================

pub(crate) struct InputProcessor {
    current_modifiers: Modifiers,
}

impl InputProcessor {
    pub(crate) fn new() -> Self {
        Self {
            current_modifiers: Modifiers::NONE,
        }
    }

    //--- Modifier State Management ----------------------------------------

    /// Updates cached modifier state (applied to subsequent events).
    pub(crate) fn update_modifiers(&mut self, modifiers_state: ModifiersState) {
        self.current_modifiers = Modifiers::from(modifiers_state);
    }

    pub(crate) fn current_modifiers(&self) -> Modifiers {
        self.current_modifiers
    }

    //--- Event Processing -------------------------------------------------

    /// Converts a winit key event; empty for unmapped keys.
    pub(crate) fn process_key_event(&self, key_event: &WinitKeyEvent) -> Vec<KeyEvent> {
        let key = match key_event.physical_key {
            PhysicalKey::Code(code) => KeyCode::from(code),
            _ => return Vec::new(),
        };
        let produces_text = key_event.text.as_ref().is_some_and(|text| !text.is_empty());
        self.key_events(key, key_event.state, key_event.repeat, produces_text)
    }

    //--- Internal Helpers -------------------------------------------------

    fn key_events(&self, key: KeyCode, state: ElementState, repeat: bool, produces_text: bool) -> Vec<KeyEvent> {
        if key == KeyCode::Unidentified {
            return Vec::new();
        }

        let make = |phase: KeyPhase| KeyEvent {
            key,
            modifiers: self.current_modifiers,
            phase,
            repeat,
        };

        match state {
            ElementState::Pressed if produces_text => vec![make(KeyPhase::Down), make(KeyPhase::Press)],
            ElementState::Pressed => vec![make(KeyPhase::Down)],
            ElementState::Released => vec![make(KeyPhase::Up)],
        }
    }
}

//=========================================================================
// Winit Conversions
//=========================================================================

/// Winit normalizes platform keys (macOS Cmd → Ctrl, Option → Alt).
impl From<ModifiersState> for Modifiers {
    fn from(state: ModifiersState) -> Self {
        Self {
            shift: state.shift_key(),
            ctrl: state.control_key(),
            alt: state.alt_key(),
        }
    }
}

/// Maps A-Z, 0-9, arrows and common special keys. The browser navigation
/// keys stand in for the gesture area. Everything else is `Unidentified`.
impl From<WinitKeyCode> for KeyCode {
    fn from(code: WinitKeyCode) -> Self {
        use WinitKeyCode::*;
        match code {
            //--- Digits -------------------------------------------------------

            Digit0 => KeyCode::Digit0,
            Digit1 => KeyCode::Digit1,
            Digit2 => KeyCode::Digit2,
            Digit3 => KeyCode::Digit3,
            Digit4 => KeyCode::Digit4,
            Digit5 => KeyCode::Digit5,
            Digit6 => KeyCode::Digit6,
            Digit7 => KeyCode::Digit7,
            Digit8 => KeyCode::Digit8,
            Digit9 => KeyCode::Digit9,

            //--- Letters ------------------------------------------------------

            KeyA => KeyCode::KeyA,
            KeyB => KeyCode::KeyB,
            KeyC => KeyCode::KeyC,
            KeyD => KeyCode::KeyD,
            KeyE => KeyCode::KeyE,
            KeyF => KeyCode::KeyF,
            KeyG => KeyCode::KeyG,
            KeyH => KeyCode::KeyH,
            KeyI => KeyCode::KeyI,
            KeyJ => KeyCode::KeyJ,
            KeyK => KeyCode::KeyK,
            KeyL => KeyCode::KeyL,
            KeyM => KeyCode::KeyM,
            KeyN => KeyCode::KeyN,
            KeyO => KeyCode::KeyO,
            KeyP => KeyCode::KeyP,
            KeyQ => KeyCode::KeyQ,
            KeyR => KeyCode::KeyR,
            KeyS => KeyCode::KeyS,
            KeyT => KeyCode::KeyT,
            KeyU => KeyCode::KeyU,
            KeyV => KeyCode::KeyV,
            KeyW => KeyCode::KeyW,
            KeyX => KeyCode::KeyX,
            KeyY => KeyCode::KeyY,
            KeyZ => KeyCode::KeyZ,

            //--- Arrows -------------------------------------------------------

            ArrowUp => KeyCode::ArrowUp,
            ArrowDown => KeyCode::ArrowDown,
            ArrowLeft => KeyCode::ArrowLeft,
            ArrowRight => KeyCode::ArrowRight,

            //--- Special ------------------------------------------------------

            Space => KeyCode::Space,
            Enter => KeyCode::Enter,
            Escape => KeyCode::Escape,
            Tab => KeyCode::Tab,
            Backspace => KeyCode::Backspace,
            Delete => KeyCode::Delete,

            //--- Gesture Area -------------------------------------------------

            BrowserBack => KeyCode::GestureBack,
            BrowserForward => KeyCode::GestureForward,

            _ => KeyCode::Unidentified,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn make_modifiers(shift: bool, ctrl: bool, alt: bool) -> ModifiersState {
        let mut state = ModifiersState::empty();
        if shift { state.insert(ModifiersState::SHIFT); }
        if ctrl { state.insert(ModifiersState::CONTROL); }
        if alt { state.insert(ModifiersState::ALT); }
        state
    }

    #[test]
    fn starts_with_no_modifiers() {
        let processor = InputProcessor::new();
        assert_eq!(processor.current_modifiers(), Modifiers::NONE);
    }

    #[test]
    fn modifiers_apply_to_later_events() {
        let mut processor = InputProcessor::new();
        processor.update_modifiers(make_modifiers(true, false, true));

        let events = processor.key_events(KeyCode::Escape, ElementState::Pressed, false, false);
        assert_eq!(events.len(), 1);
        assert!(events[0].modifiers.shift && events[0].modifiers.alt);
        assert!(!events[0].modifiers.ctrl);
    }

    #[test]
    fn text_keys_produce_down_then_press() {
        let processor = InputProcessor::new();
        let events = processor.key_events(KeyCode::KeyA, ElementState::Pressed, false, true);
        let phases: Vec<_> = events.iter().map(|e| e.phase).collect();
        assert_eq!(phases, vec![KeyPhase::Down, KeyPhase::Press]);
    }

    #[test]
    fn release_produces_up_and_keeps_repeat_flag() {
        let processor = InputProcessor::new();
        let up = processor.key_events(KeyCode::KeyA, ElementState::Released, false, true);
        assert_eq!(up, vec![KeyEvent::up(KeyCode::KeyA)]);

        let held = processor.key_events(KeyCode::ArrowDown, ElementState::Pressed, true, false);
        assert!(held[0].repeat);
    }

    #[test]
    fn unmapped_keys_are_filtered() {
        let processor = InputProcessor::new();
        assert_eq!(KeyCode::from(WinitKeyCode::F13), KeyCode::Unidentified);
        assert!(processor
            .key_events(KeyCode::Unidentified, ElementState::Pressed, false, false)
            .is_empty());
    }

    #[test]
    fn browser_navigation_maps_to_gesture_area() {
        assert_eq!(KeyCode::from(WinitKeyCode::BrowserBack), KeyCode::GestureBack);
        assert_eq!(KeyCode::from(WinitKeyCode::BrowserForward), KeyCode::GestureForward);
        assert_eq!(KeyCode::from(WinitKeyCode::KeyZ), KeyCode::KeyZ);
    }
}
