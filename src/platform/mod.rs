//=========================================================================
// Platform Subsystem
//
// Hosts the main stage in a winit window and bridges it with the
// framework thread over two channels.
//
// Architecture:
// ```text
//  Main Thread:                     Framework Thread:
//  ┌──────────────────────────┐    ┌──────────────────────┐
//  │  Winit Event Loop        │    │  AppController       │
//  │   ↓                      │    │   └─ StageController │
//  │  InputProcessor          │    │        (scenes,      │
//  │   └─ sticky modifiers    │    │         commanders)  │
//  │   ↓                      │    │                      │
//  │  HostEvent ──────────────┼───>│  EventCollector      │
//  │                          │    │                      │
//  │  apply_command <─────────┼────┤  ChannelHost         │
//  └──────────────────────────┘    └──────────────────────┘
//                                   HostCommand
// ```
//
// Host commands are drained on every `about_to_wait`; the loop wakes at
// least every `COMMAND_POLL` to do so. A disconnected command channel
// means the framework thread is done, and the event loop exits.
//
//=========================================================================

//=== Submodules ==========================================================

mod input_processor;

//=== External Crates =====================================================

use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use log::*;
use thiserror::Error;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Fullscreen, UserAttentionType, Window, WindowAttributes, WindowId},
};

//=== Internal Imports ====================================================

use crate::core::platform_bridge::{HostCommand, HostEvent};
use input_processor::InputProcessor;

//=== PlatformError =======================================================

/// Platform initialization and runtime errors. Both are fatal.
#[derive(Debug, Error)]
pub(crate) enum PlatformError {
    #[error("Event loop creation failed: {0}")]
    EventLoopCreation(winit::error::EventLoopError),

    #[error("Event loop error: {0}")]
    EventLoopExecution(winit::error::EventLoopError),
}

//=== PlatformControl =====================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlatformControl {
    Continue,
    Exit,
}

//=== Platform ============================================================

/// Window host for the main stage.
///
/// This type is NOT Send/Sync and must stay on the main thread.
pub(crate) struct Platform {
    /// OS window handle (None until `resumed()` called).
    window: Option<Window>,

    title: String,
    stage: String,
    splash_visible: bool,
    landscape_key_remap: bool,
    clipboard: Option<String>,

    event_sender: Sender<HostEvent>,
    command_receiver: Receiver<HostCommand>,
    input_processor: InputProcessor,
}

impl Platform {
    const COMMAND_POLL: Duration = Duration::from_millis(16);

    //--- Construction -----------------------------------------------------

    /// Does not create the window yet; that happens in `resumed()`.
    pub fn new(
        event_sender: Sender<HostEvent>,
        command_receiver: Receiver<HostCommand>,
        title: &str,
        stage: &str,
    ) -> Self {
        info!(target: "platform", "Platform subsystem initialized for stage '{}'", stage);
        Self {
            window: None,
            title: title.to_string(),
            stage: stage.to_string(),
            splash_visible: true,
            landscape_key_remap: false,
            clipboard: None,
            event_sender,
            command_receiver,
            input_processor: InputProcessor::new(),
        }
    }

    //--- Execution --------------------------------------------------------

    /// Runs the winit event loop on the calling (main) thread until the
    /// stage window closes or the framework thread goes away.
    pub fn run(mut self) -> Result<(), PlatformError> {
        debug!(target: "platform", "Starting Winit event loop");

        let event_loop = EventLoop::new().map_err(PlatformError::EventLoopCreation)?;
        event_loop
            .run_app(&mut self)
            .map_err(PlatformError::EventLoopExecution)
    }

    //--- Internal Helpers -------------------------------------------------

    fn send(&self, event: HostEvent) {
        if self.event_sender.send(event).is_err() {
            warn!(target: "platform", "Framework channel disconnected, dropping host event");
        }
    }

    fn window_title(&self) -> String {
        if self.splash_visible {
            format!("{} (loading)", self.title)
        } else {
            self.title.clone()
        }
    }

    /// Applies every queued host command.
    fn drain_commands(&mut self) -> PlatformControl {
        loop {
            match self.command_receiver.try_recv() {
                Ok(command) => {
                    if self.apply_command(command) == PlatformControl::Exit {
                        return PlatformControl::Exit;
                    }
                }
                Err(TryRecvError::Empty) => return PlatformControl::Continue,
                Err(TryRecvError::Disconnected) => {
                    info!(target: "platform", "Framework thread finished");
                    return PlatformControl::Exit;
                }
            }
        }
    }

    fn apply_command(&mut self, command: HostCommand) -> PlatformControl {
        trace!(target: "platform", "Applying {:?}", command);
        let stage = match &command {
            HostCommand::SetFullScreen { stage, .. }
            | HostCommand::EnableLandscapeKeyRemap { stage, .. }
            | HostCommand::ShowNewContentIndicator { stage }
            | HostCommand::SetClipboard { stage, .. }
            | HostCommand::ActivateWindow { stage }
            | HostCommand::DeactivateWindow { stage }
            | HostCommand::HideSplashScreen { stage }
            | HostCommand::CloseWindow { stage } => stage,
        };
        if *stage != self.stage {
            debug!(target: "platform", "No window for stage '{}', ignoring {:?}", stage, command);
            return PlatformControl::Continue;
        }

        match command {
            HostCommand::SetFullScreen { enabled, .. } => {
                if let Some(window) = &self.window {
                    window.set_fullscreen(enabled.then_some(Fullscreen::Borderless(None)));
                }
            }
            HostCommand::EnableLandscapeKeyRemap { enabled, .. } => {
                debug!(target: "platform", "Landscape key remap {}", if enabled { "on" } else { "off" });
                self.landscape_key_remap = enabled;
            }
            HostCommand::ShowNewContentIndicator { .. } => {
                if let Some(window) = &self.window {
                    window.request_user_attention(Some(UserAttentionType::Informational));
                }
            }
            HostCommand::SetClipboard { text, .. } => {
                debug!(target: "platform", "Clipboard set ({} bytes)", text.len());
                self.clipboard = Some(text);
            }
            HostCommand::ActivateWindow { .. } => {
                if let Some(window) = &self.window {
                    window.set_minimized(false);
                    window.focus_window();
                }
            }
            HostCommand::DeactivateWindow { .. } => {
                if let Some(window) = &self.window {
                    window.set_minimized(true);
                }
            }
            HostCommand::HideSplashScreen { .. } => {
                self.splash_visible = false;
                let title = self.window_title();
                if let Some(window) = &self.window {
                    window.set_title(&title);
                }
            }
            HostCommand::CloseWindow { stage } => {
                info!(target: "platform", "Closing window of stage '{}'", stage);
                self.window = None;
                self.send(HostEvent::WindowClosed { stage });
                return PlatformControl::Exit;
            }
        }
        PlatformControl::Continue
    }

    //--- Test Accessors ---------------------------------------------------

    #[cfg(test)]
    pub(crate) fn window(&self) -> Option<&Window> {
        self.window.as_ref()
    }
}

//=== Winit Integration ===================================================

impl ApplicationHandler for Platform {
    /// Creates the window if it doesn't exist yet. On mobile, this may be
    /// called multiple times (suspend/resume cycle).
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            debug!(target: "platform", "Window already exists (mobile resume?)");
            return;
        }

        let attrs = WindowAttributes::default()
            .with_title(self.window_title())
            .with_inner_size(LogicalSize::new(320, 480));

        match event_loop.create_window(attrs) {
            Ok(window) => {
                info!(
                    target: "platform",
                    "Window created: {}x{} @ {}x DPI",
                    window.inner_size().width,
                    window.inner_size().height,
                    window.scale_factor()
                );
                self.window = Some(window);
            }
            Err(e) => {
                error!(target: "platform", "Window creation failed: {}", e);
                self.send(HostEvent::WindowClosed {
                    stage: self.stage.clone(),
                });
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!(target: "platform", "Window close requested");
                self.window = None;
                self.send(HostEvent::WindowClosed {
                    stage: self.stage.clone(),
                });
                event_loop.exit();
            }

            WindowEvent::Focused(focused) => {
                self.send(HostEvent::Focus {
                    stage: self.stage.clone(),
                    focused,
                });
            }

            WindowEvent::ModifiersChanged(state) => {
                trace!(target: "platform::input", "Modifiers changed: {:?}", state);
                self.input_processor.update_modifiers(state.state());
            }

            WindowEvent::KeyboardInput { event: key_event, .. } => {
                let events = self.input_processor.process_key_event(&key_event);
                if events.is_empty() {
                    trace!(target: "platform::input", "Unmapped key ignored");
                }
                for event in events {
                    self.send(HostEvent::Key {
                        stage: self.stage.clone(),
                        event,
                    });
                }
            }

            WindowEvent::MouseInput {
                state: ElementState::Released,
                button: MouseButton::Left,
                ..
            } => {
                self.send(HostEvent::Tap {
                    stage: self.stage.clone(),
                });
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.drain_commands() == PlatformControl::Exit {
            event_loop.exit();
            return;
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now() + Self::COMMAND_POLL));
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    struct Fixture {
        platform: Platform,
        events: Receiver<HostEvent>,
        commands: Sender<HostCommand>,
    }

    fn fixture() -> Fixture {
        let (event_tx, events) = unbounded();
        let (commands, command_rx) = unbounded();
        Fixture {
            platform: Platform::new(event_tx, command_rx, "Test", "main"),
            events,
            commands,
        }
    }

    #[test]
    fn window_is_created_lazily() {
        let f = fixture();
        assert!(f.platform.window().is_none());
    }

    #[test]
    fn close_window_reports_closure_and_exits() {
        let mut f = fixture();
        f.commands
            .send(HostCommand::CloseWindow { stage: "main".into() })
            .unwrap();

        assert_eq!(f.platform.drain_commands(), PlatformControl::Exit);
        assert_eq!(
            f.events.try_recv().unwrap(),
            HostEvent::WindowClosed { stage: "main".into() }
        );
    }

    #[test]
    fn commands_for_other_stages_are_ignored() {
        let mut f = fixture();
        f.commands
            .send(HostCommand::CloseWindow { stage: "dashboard".into() })
            .unwrap();

        assert_eq!(f.platform.drain_commands(), PlatformControl::Continue);
        assert!(f.events.try_recv().is_err());
    }

    #[test]
    fn splash_and_clipboard_are_tracked_without_a_window() {
        let mut f = fixture();
        assert_eq!(f.platform.window_title(), "Test (loading)");

        f.commands
            .send(HostCommand::HideSplashScreen { stage: "main".into() })
            .unwrap();
        f.commands
            .send(HostCommand::SetClipboard {
                stage: "main".into(),
                text: "copied".into(),
            })
            .unwrap();
        f.commands
            .send(HostCommand::EnableLandscapeKeyRemap {
                stage: "main".into(),
                enabled: true,
            })
            .unwrap();

        assert_eq!(f.platform.drain_commands(), PlatformControl::Continue);
        assert_eq!(f.platform.window_title(), "Test");
        assert_eq!(f.platform.clipboard.as_deref(), Some("copied"));
        assert!(f.platform.landscape_key_remap);
    }

    #[test]
    fn framework_disconnect_exits() {
        let mut f = fixture();
        drop(f.commands);
        assert_eq!(f.platform.drain_commands(), PlatformControl::Exit);
    }

    #[test]
    fn send_survives_disconnected_framework() {
        let f = fixture();
        drop(f.events);
        f.platform.send(HostEvent::Tap { stage: "main".into() });
    }

    #[test]
    fn platform_error_is_error_trait() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<PlatformError>();
    }
}
