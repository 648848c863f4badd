//=========================================================================
// Platform Bridge
//=========================================================================
//
// Bridges the platform host (winit or a test double) with the framework.
//
// Components:
// - `interface`: host events, host commands and the PlatformHost trait
// - `event_collector`: framework-side event collection per frame
//
//=========================================================================

//=== Module Declarations =================================================

pub(crate) mod event_collector;
pub mod interface;

//=== Public API ==========================================================

pub use interface::{ChannelHost, HostCommand, HostEvent, NullHost, PlatformHost};

pub(crate) use event_collector::{EventCollector, TickControl};
