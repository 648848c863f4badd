//=========================================================================
// Back Key Map
//=========================================================================
//
// The set of key combinations a stage turns into a `back` command.
//
// Architecture:
//   (key, modifiers) → HashSet → is_back_key()
//
// Modifiers must match exactly.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashSet;

//=== Internal Dependencies ===============================================

use super::event::{KeyCode, Modifiers};

//=== BackKeyMap ==========================================================

/// Key combinations that mean "go back".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackKeyMap {
    bindings: HashSet<(KeyCode, Modifiers)>,
}

impl BackKeyMap {
    /// Creates an empty map (nothing is a back key).
    pub fn empty() -> Self {
        Self {
            bindings: HashSet::new(),
        }
    }

    //--- Binding API ------------------------------------------------------

    /// Binds a key with modifiers (exact match required).
    pub fn bind(&mut self, key: KeyCode, modifiers: Modifiers) {
        self.bindings.insert((key, modifiers));
    }

    /// Removes one binding (exact modifier match).
    pub fn unbind(&mut self, key: KeyCode, modifiers: Modifiers) {
        self.bindings.remove(&(key, modifiers));
    }

    /// Removes every binding of `key`, whatever its modifiers.
    pub fn unbind_all_variants(&mut self, key: KeyCode) {
        self.bindings.retain(|&(k, _)| k != key);
    }

    //--- Query API --------------------------------------------------------

    pub fn is_back_key(&self, key: KeyCode, modifiers: Modifiers) -> bool {
        self.bindings.contains(&(key, modifiers))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Default for BackKeyMap {
    /// `Escape` and the gesture-area back swipe, without modifiers.
    fn default() -> Self {
        let mut map = Self::empty();
        map.bind(KeyCode::Escape, Modifiers::NONE);
        map.bind(KeyCode::GestureBack, Modifiers::NONE);
        map
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_binds_escape_and_gesture_back() {
        let map = BackKeyMap::default();
        assert!(map.is_back_key(KeyCode::Escape, Modifiers::NONE));
        assert!(map.is_back_key(KeyCode::GestureBack, Modifiers::NONE));
        assert!(!map.is_back_key(KeyCode::Backspace, Modifiers::NONE));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn modifiers_must_match_exactly() {
        let map = BackKeyMap::default();
        assert!(!map.is_back_key(KeyCode::Escape, Modifiers::SHIFT));
    }

    #[test]
    fn unbind_all_variants_removes_every_modifier_combination() {
        let mut map = BackKeyMap::empty();
        map.bind(KeyCode::Backspace, Modifiers::NONE);
        map.bind(KeyCode::Backspace, Modifiers::ALT);
        map.bind(KeyCode::Escape, Modifiers::NONE);

        map.unbind_all_variants(KeyCode::Backspace);

        assert!(!map.is_back_key(KeyCode::Backspace, Modifiers::NONE));
        assert!(!map.is_back_key(KeyCode::Backspace, Modifiers::ALT));
        assert!(map.is_back_key(KeyCode::Escape, Modifiers::NONE));
    }

    #[test]
    fn unbind_removes_single_binding() {
        let mut map = BackKeyMap::default();
        map.unbind(KeyCode::Escape, Modifiers::NONE);
        assert!(!map.is_back_key(KeyCode::Escape, Modifiers::NONE));
        assert!(!map.is_empty());
    }
}
