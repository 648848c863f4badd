//=========================================================================
// Stage Configuration
//=========================================================================
//
// Per-stage tunables, built fluently like the framework builder.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

//=== Internal Dependencies ===============================================

use crate::core::input::{BackKeyMap, KeyCode, Modifiers};

//=== StageConfig =========================================================

/// Configuration shared by the stages an application creates.
///
/// # Default Values
///
/// - **Synchronizer timeout**: 500 ms
/// - **Transitions**: enabled
/// - **Back keys**: `Escape` and the gesture-area back swipe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageConfig {
    sync_timeout: Duration,
    transitions: bool,
    back_keys: BackKeyMap,
}

impl StageConfig {
    pub const DEFAULT_SYNC_TIMEOUT: Duration = Duration::from_millis(500);

    pub fn new() -> Self {
        Self {
            sync_timeout: Self::DEFAULT_SYNC_TIMEOUT,
            transitions: true,
            back_keys: BackKeyMap::default(),
        }
    }

    /// Sets how long activation waits on about-to-activate callbacks
    /// before continuing anyway.
    ///
    /// # Panics
    ///
    /// Panics if `timeout` is zero.
    pub fn with_sync_timeout(mut self, timeout: Duration) -> Self {
        assert!(!timeout.is_zero(), "Sync timeout must be positive");
        self.sync_timeout = timeout;
        self
    }

    /// Enables or disables scene transitions. Without transitions a batch
    /// activates its top scene as soon as the synchronizer fires.
    pub fn with_transitions(mut self, enabled: bool) -> Self {
        self.transitions = enabled;
        self
    }

    pub fn with_back_key(mut self, key: KeyCode, modifiers: Modifiers) -> Self {
        self.back_keys.bind(key, modifiers);
        self
    }

    pub fn without_back_key(mut self, key: KeyCode, modifiers: Modifiers) -> Self {
        self.back_keys.unbind(key, modifiers);
        self
    }

    //--- Accessors --------------------------------------------------------

    pub fn sync_timeout(&self) -> Duration {
        self.sync_timeout
    }

    pub fn transitions_enabled(&self) -> bool {
        self.transitions
    }

    pub fn back_keys(&self) -> &BackKeyMap {
        &self.back_keys
    }
}

impl Default for StageConfig {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
