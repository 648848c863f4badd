//=========================================================================
// Platform Bridge Interface
//=========================================================================
//
// Contract between the framework thread and the platform host.
//
//   host      → framework: HostEvent   (input, focus, window lifecycle)
//   framework → host:      PlatformHost calls, or HostCommand over a
//                          channel when the host lives on another thread
//
// Host calls are fire-and-forget: callers log failures and move on.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::Sender;
use log::trace;

//=== Internal Dependencies ===============================================

use crate::core::error::HostError;
use crate::core::input::{KeyEvent, Orientation};

//=== HostEvent ===========================================================

/// Events sent from the platform host to the framework thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Key { stage: String, event: KeyEvent },

    /// Primary-button tap anywhere in the stage.
    Tap { stage: String },

    Focus { stage: String, focused: bool },

    Orientation { stage: String, orientation: Orientation },

    /// Menu or system command addressed to the stage.
    Command { stage: String, command: String },

    /// The native window is gone; the stage must be torn down.
    WindowClosed { stage: String },

    /// The whole application is exiting.
    Shutdown,
}

impl HostEvent {
    /// Stage the event is addressed to, if any.
    pub fn stage(&self) -> Option<&str> {
        match self {
            Self::Key { stage, .. }
            | Self::Tap { stage }
            | Self::Focus { stage, .. }
            | Self::Orientation { stage, .. }
            | Self::Command { stage, .. }
            | Self::WindowClosed { stage } => Some(stage),
            Self::Shutdown => None,
        }
    }
}

//=== PlatformHost ========================================================

/// Side effects the framework asks of the native host. Every method
/// defaults to succeeding without doing anything.
pub trait PlatformHost {
    fn set_full_screen(&self, _stage: &str, _enabled: bool) -> Result<(), HostError> {
        Ok(())
    }

    fn enable_landscape_key_remap(&self, _stage: &str, _enabled: bool) -> Result<(), HostError> {
        Ok(())
    }

    fn show_new_content_indicator(&self, _stage: &str) -> Result<(), HostError> {
        Ok(())
    }

    fn set_clipboard(&self, _stage: &str, _text: &str) -> Result<(), HostError> {
        Ok(())
    }

    fn activate_window(&self, _stage: &str) -> Result<(), HostError> {
        Ok(())
    }

    fn deactivate_window(&self, _stage: &str) -> Result<(), HostError> {
        Ok(())
    }

    fn hide_splash_screen(&self, _stage: &str) -> Result<(), HostError> {
        Ok(())
    }

    fn close_window(&self, _stage: &str) -> Result<(), HostError> {
        Ok(())
    }
}

/// Host that ignores every request.
pub struct NullHost;

impl PlatformHost for NullHost {}

//=== HostCommand =========================================================

/// A [`PlatformHost`] call in message form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    SetFullScreen { stage: String, enabled: bool },
    EnableLandscapeKeyRemap { stage: String, enabled: bool },
    ShowNewContentIndicator { stage: String },
    SetClipboard { stage: String, text: String },
    ActivateWindow { stage: String },
    DeactivateWindow { stage: String },
    HideSplashScreen { stage: String },
    CloseWindow { stage: String },
}

//=== ChannelHost =========================================================

/// Forwards host calls as [`HostCommand`]s to a host on another thread.
pub struct ChannelHost {
    sender: Sender<HostCommand>,
}

impl ChannelHost {
    pub fn new(sender: Sender<HostCommand>) -> Self {
        Self { sender }
    }

    fn send(&self, command: HostCommand) -> Result<(), HostError> {
        trace!(target: "platform", "Host command {:?}", command);
        self.sender.send(command).map_err(|_| HostError::Disconnected)
    }
}

impl PlatformHost for ChannelHost {
    fn set_full_screen(&self, stage: &str, enabled: bool) -> Result<(), HostError> {
        self.send(HostCommand::SetFullScreen {
            stage: stage.to_string(),
            enabled,
        })
    }

    fn enable_landscape_key_remap(&self, stage: &str, enabled: bool) -> Result<(), HostError> {
        self.send(HostCommand::EnableLandscapeKeyRemap {
            stage: stage.to_string(),
            enabled,
        })
    }

    fn show_new_content_indicator(&self, stage: &str) -> Result<(), HostError> {
        self.send(HostCommand::ShowNewContentIndicator {
            stage: stage.to_string(),
        })
    }

    fn set_clipboard(&self, stage: &str, text: &str) -> Result<(), HostError> {
        self.send(HostCommand::SetClipboard {
            stage: stage.to_string(),
            text: text.to_string(),
        })
    }

    fn activate_window(&self, stage: &str) -> Result<(), HostError> {
        self.send(HostCommand::ActivateWindow {
            stage: stage.to_string(),
        })
    }

    fn deactivate_window(&self, stage: &str) -> Result<(), HostError> {
        self.send(HostCommand::DeactivateWindow {
            stage: stage.to_string(),
        })
    }

    fn hide_splash_screen(&self, stage: &str) -> Result<(), HostError> {
        self.send(HostCommand::HideSplashScreen {
            stage: stage.to_string(),
        })
    }

    fn close_window(&self, stage: &str) -> Result<(), HostError> {
        self.send(HostCommand::CloseWindow {
            stage: stage.to_string(),
        })
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn channel_host_sends_commands() {
        let (tx, rx) = unbounded();
        let host = ChannelHost::new(tx);

        host.set_full_screen("main", true).unwrap();
        host.close_window("main").unwrap();

        assert_eq!(
            rx.try_recv().unwrap(),
            HostCommand::SetFullScreen {
                stage: "main".into(),
                enabled: true
            }
        );
        assert_eq!(rx.try_recv().unwrap(), HostCommand::CloseWindow { stage: "main".into() });
    }

    #[test]
    fn channel_host_reports_disconnect() {
        let (tx, rx) = unbounded();
        let host = ChannelHost::new(tx);
        drop(rx);

        assert_eq!(host.hide_splash_screen("main"), Err(HostError::Disconnected));
    }

    #[test]
    fn null_host_accepts_everything() {
        assert!(NullHost.set_clipboard("main", "text").is_ok());
        assert!(NullHost.activate_window("main").is_ok());
    }

    #[test]
    fn events_name_their_stage() {
        assert_eq!(HostEvent::Tap { stage: "main".into() }.stage(), Some("main"));
        assert_eq!(HostEvent::Shutdown.stage(), None);
    }
}
