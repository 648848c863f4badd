//=========================================================================
// Stagecraft Framework
//
// Main entry point: wires the winit host to a framework thread that owns
// the application's stages.
//
// Architecture:
// ```text
//     FrameworkBuilder  ──build()──>  Framework  ──run(setup)──>  [Runtime]
//         │                              │
//         ├─ with_stage_config()         ├─ spawns the framework thread
//         ├─ with_channel_capacity()     │    (RunLoop, AppController)
//         ├─ with_title()                ├─ runs the platform
//         └─ with_main_stage()           └─ blocks until exit
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use std::rc::Rc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender};
use log::{error, info, warn};

//=== Internal Dependencies ===============================================

use crate::core::platform_bridge::{ChannelHost, EventCollector, HostCommand, HostEvent, TickControl};
use crate::core::run_loop::RunLoop;
use crate::core::services::Services;
use crate::core::stage::{AppController, StageAssistant, StageConfig, StageType};
use crate::platform::Platform;

//=== FrameworkBuilder ====================================================

/// Builder for configuring and constructing a [`Framework`].
///
/// # Default Values
///
/// - **Stage config**: [`StageConfig::default`]
/// - **Channel capacity**: 128 events
/// - **Title**: "Stagecraft"
/// - **Main stage**: "main"
///
/// # Examples
///
/// ```no_run
/// use stagecraft::FrameworkBuilder;
/// use stagecraft::core::scene::{SceneAssistant, SceneDescriptor};
/// use stagecraft::core::stage::StageAssistant;
///
/// FrameworkBuilder::new()
///     .with_title("Mail")
///     .build()
///     .run(|app| {
///         app.register_scene(SceneDescriptor::new("inbox", |_| Ok(SceneAssistant::new())));
///         StageAssistant::new().on_setup(|stage| {
///             stage.push_scene("inbox");
///             Ok(())
///         })
///     });
/// ```
pub struct FrameworkBuilder {
    stage_config: StageConfig,
    channel_capacity: usize,
    title: String,
    main_stage: String,
}

impl FrameworkBuilder {
    pub fn new() -> Self {
        Self {
            stage_config: StageConfig::default(),
            channel_capacity: 128,
            title: "Stagecraft".to_string(),
            main_stage: "main".to_string(),
        }
    }

    /// Sets the configuration every stage is created with.
    pub fn with_stage_config(mut self, config: StageConfig) -> Self {
        self.stage_config = config;
        self
    }

    /// Sets the capacity of both host channels.
    ///
    /// Default: 128
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Channel capacity must be positive");
        self.channel_capacity = capacity;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Names the stage hosted in the platform window.
    pub fn with_main_stage(mut self, name: impl Into<String>) -> Self {
        self.main_stage = name.into();
        self
    }

    pub fn build(self) -> Framework {
        info!(
            "Building framework (main stage: '{}', channel: {})",
            self.main_stage, self.channel_capacity
        );

        Framework {
            stage_config: self.stage_config,
            channel_capacity: self.channel_capacity,
            title: self.title,
            main_stage: self.main_stage,
        }
    }
}

impl Default for FrameworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== Framework ===========================================================

/// Stagecraft runtime. Create via [`FrameworkBuilder`].
///
/// ```text
/// Framework (Main Thread)
///   ├─► Framework Thread
///   │     └─► RunLoop, AppController, stages and scenes
///   │
///   └─► Platform (Event Loop)
///         └─► Window, key input, host commands
///
/// Communication: HostEvent (host → framework), HostCommand (framework → host)
/// ```
pub struct Framework {
    stage_config: StageConfig,
    channel_capacity: usize,
    title: String,
    main_stage: String,
}

impl Framework {
    /// Upper bound on how long the framework thread blocks for host events.
    const MAX_WAIT: Duration = Duration::from_millis(10);

    //--- Execution --------------------------------------------------------

    /// Starts the runtime and blocks until the application exits.
    ///
    /// `setup` runs on the framework thread. It registers scenes on the app
    /// and returns the assistant of the main stage, whose setup hook
    /// usually pushes the first scene.
    ///
    /// # Lifecycle
    ///
    /// 1. Creates the host event and host command channels
    /// 2. Spawns the framework thread
    /// 3. Runs the platform event loop (blocks here)
    /// 4. On window close: the main stage is torn down and the thread ends
    pub fn run<F>(self, setup: F)
    where
        F: FnOnce(&AppController) -> StageAssistant + Send + 'static,
    {
        info!("Starting framework runtime");

        //--- 1. Create communication channels ----------------------------
        let (event_tx, event_rx): (Sender<HostEvent>, Receiver<HostEvent>) = bounded(self.channel_capacity);
        let (command_tx, command_rx): (Sender<HostCommand>, Receiver<HostCommand>) =
            bounded(self.channel_capacity);

        info!("Host channels created (capacity: {})", self.channel_capacity);

        //--- 2. Spawn the framework thread --------------------------------
        let framework_handle = spawn_framework_thread(
            event_rx,
            command_tx,
            self.stage_config,
            self.main_stage.clone(),
            setup,
        );
        info!("Framework thread spawned");

        //--- 3. Launch the platform subsystem -----------------------------
        let platform = Platform::new(event_tx, command_rx, &self.title, &self.main_stage);
        info!("Platform initialized, entering event loop");

        if let Err(e) = platform.run() {
            error!("Platform error: {}", e);
        }

        info!("Platform event loop exited");

        //--- 4. Cleanup: Wait for the framework thread to terminate ------
        match framework_handle.join() {
            Ok(()) => info!("Framework thread terminated cleanly"),
            Err(e) => error!("Framework thread panicked: {:?}", e),
        }

        info!("Framework shutdown complete");
    }
}

//=== Framework Thread ====================================================

fn spawn_framework_thread<F>(
    events: Receiver<HostEvent>,
    commands: Sender<HostCommand>,
    config: StageConfig,
    main_stage: String,
    setup: F,
) -> JoinHandle<()>
where
    F: FnOnce(&AppController) -> StageAssistant + Send + 'static,
{
    thread::spawn(move || {
        let run_loop = RunLoop::new();
        let services = Services::headless(&run_loop).with_host(Rc::new(ChannelHost::new(commands)));
        let app = AppController::new(&run_loop, services, config);

        let assistant = setup(&app);
        if let Err(err) = app.create_stage(&main_stage, StageType::Card, assistant) {
            error!(target: "stage", "Main stage could not be created: {}", err);
            return;
        }

        let mut collector = EventCollector::new(events);
        drive(&app, &run_loop, &mut collector);
        app.close_all();
    })
}

/// Pumps host events and the run loop until the host goes away or the last
/// stage closes.
fn drive(app: &AppController, run_loop: &RunLoop, collector: &mut EventCollector) {
    let mut last_tick = Instant::now();
    run_loop.run_until_idle();

    loop {
        let wait = run_loop
            .next_deadline()
            .map_or(Framework::MAX_WAIT, |deadline| deadline.min(Framework::MAX_WAIT));
        let control = collector.collect_frame(wait);

        for event in collector.take_events() {
            if let Err(err) = app.handle_host_event(event) {
                warn!(target: "platform", "Host event dropped: {}", err);
            }
        }

        let now = Instant::now();
        run_loop.advance(now.duration_since(last_tick));
        last_tick = now;

        if control == TickControl::Exit {
            info!(target: "platform", "Host disconnected or shut down");
            break;
        }
        if app.stages().is_empty() {
            info!(target: "stage", "Last stage closed");
            break;
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
