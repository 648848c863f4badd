//=========================================================================
// Stage Controller
//=========================================================================
//
// One application window: a scene stack, a commander chain, and the
// deferred pipeline that turns push/pop requests into transitions.
//
// Pipeline:
//   enqueue  → push_scene / swap_scene / pop_scene / pop_scenes_to
//   schedule → one deferred dispatch per pass (never synchronous)
//   load     → sources of newly referenced scenes
//   execute  → deactivate top, run the batch FIFO, pick the transition
//   activate → about_to_activate under a synchronizer, run the
//              transition, activate the new top, re-enter the dispatcher
//
// At most one batch is in flight. Requests that arrive while a batch is
// loading, executing or transitioning wait for the next pass.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::rc::{Rc, Weak};

use log::{debug, error, info, trace, warn};

//=== Internal Dependencies ===============================================

use super::config::StageConfig;
use super::deferred_ops::{DeferredOpQueue, DeferredSceneOp, SceneOperation};
use super::stage_assistant::{StageAssistant, StageCommandHook};
use crate::core::commander::{
    Commander, CommanderRef, CommanderStack, Event, EventType, HELP_COMMAND, PREFS_COMMAND,
};
use crate::core::error::{CommandError, FrameworkError, HookError, HostError, LoadError};
use crate::core::input::{KeyEvent, Orientation};
use crate::core::run_loop::RunLoop;
use crate::core::scene::{
    call_isolated, run_isolated, Notification, PopOptions, ReturnValue, SceneArguments,
    SceneContext, SceneController, SceneRegistry, SceneStack, SceneTarget,
};
use crate::core::services::Services;
use crate::core::synchronizer::Synchronizer;
use crate::core::transition::Transition;

//=== Supporting Types ====================================================

/// Kind of window a stage occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StageType {
    #[default]
    Card,
    Dialog,
    Banner,
    Dashboard,
    Popup,
}

/// Where the deferred pipeline currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchPhase {
    Idle,
    Scheduled,
    Loading,
    Executing,
    Activating,
    Transitioning,
    Closed,
}

/// A legacy modal dialog that default `back` handling closes.
pub trait ModalDialog {
    fn close(&self);
}

/// What every stage of an application shares.
#[derive(Clone)]
pub struct StageEnvironment {
    pub run_loop: RunLoop,
    pub services: Services,
    pub registry: Rc<SceneRegistry>,
    pub config: StageConfig,
}

type ClosedCallback = Box<dyn FnOnce(&StageController)>;

//=== StageController =====================================================

pub struct StageController {
    this: Weak<StageController>,
    name: String,
    stage_type: StageType,
    run_loop: RunLoop,
    services: Services,
    registry: Rc<SceneRegistry>,
    config: StageConfig,
    assistant: RefCell<Option<Rc<StageAssistant>>>,
    assistant_state: Option<Rc<dyn Any>>,

    scene_stack: SceneStack,
    commanders: CommanderStack,
    deferred: RefCell<DeferredOpQueue>,
    phase: Cell<DispatchPhase>,
    transition: RefCell<Option<Rc<Transition>>>,
    synchronizer: RefCell<Option<Rc<Synchronizer>>>,
    loaded_sources: RefCell<HashSet<String>>,

    set_up: Cell<bool>,
    splash_hidden: Cell<bool>,
    active: Cell<bool>,
    focused: Cell<bool>,
    orientation: Cell<Orientation>,
    modal_dialog: RefCell<Option<Rc<dyn ModalDialog>>>,
    on_closed: RefCell<Option<ClosedCallback>>,
}

impl StageController {
    //--- Construction -----------------------------------------------------

    /// Creates an empty stage. Call [`setup`](Self::setup) before pushing
    /// scenes so the stage assistant sees the stage first.
    pub fn new(
        name: impl Into<String>,
        stage_type: StageType,
        environment: StageEnvironment,
        assistant: StageAssistant,
    ) -> Rc<Self> {
        let name = name.into();
        info!(target: "stage", "Creating stage '{}' ({:?})", name, stage_type);

        let stage = Rc::new_cyclic(|this: &Weak<StageController>| Self {
            this: this.clone(),
            name,
            stage_type,
            run_loop: environment.run_loop,
            services: environment.services,
            registry: environment.registry,
            config: environment.config,
            assistant_state: assistant.state.clone(),
            assistant: RefCell::new(Some(Rc::new(assistant))),
            scene_stack: SceneStack::new(),
            commanders: CommanderStack::new(),
            deferred: RefCell::new(DeferredOpQueue::new()),
            phase: Cell::new(DispatchPhase::Idle),
            transition: RefCell::new(None),
            synchronizer: RefCell::new(None),
            loaded_sources: RefCell::new(HashSet::new()),
            set_up: Cell::new(false),
            splash_hidden: Cell::new(false),
            active: Cell::new(false),
            focused: Cell::new(false),
            orientation: Cell::new(Orientation::default()),
            modal_dialog: RefCell::new(None),
            on_closed: RefCell::new(None),
        });

        stage.commanders.push_commander(Rc::new(StageCommander {
            stage: stage.this.clone(),
        }));
        if let Some(hook) = stage.assistant().and_then(|a| a.handle_command.clone()) {
            stage.commanders.push_commander(Rc::new(StageAssistantCommander {
                stage: stage.this.clone(),
                hook,
            }));
        }
        stage
    }

    /// Runs the stage assistant's setup hook once.
    pub fn setup(&self) {
        if self.set_up.replace(true) {
            return;
        }
        if let Some(hook) = self.assistant().and_then(|a| a.setup.clone()) {
            run_isolated("stage", &self.name, "setup", || hook(self));
        }
    }

    pub(crate) fn set_on_closed<F>(&self, callback: F)
    where
        F: FnOnce(&StageController) + 'static,
    {
        *self.on_closed.borrow_mut() = Some(Box::new(callback));
    }

    //--- Scene Operations -------------------------------------------------

    /// Queues a push. Nothing happens before the next dispatch pass.
    pub fn push_scene(&self, arguments: impl Into<SceneArguments>) {
        self.enqueue(DeferredSceneOp::push(arguments.into()));
    }

    /// Queues replacing the current scene.
    pub fn swap_scene(&self, arguments: impl Into<SceneArguments>) {
        self.enqueue(DeferredSceneOp::swap(arguments.into()));
    }

    /// Queues popping the current scene; `return_value` is handed to the
    /// scene that becomes current.
    pub fn pop_scene(&self, return_value: Option<ReturnValue>, options: PopOptions) {
        self.enqueue(DeferredSceneOp::pop(return_value, options));
    }

    /// Queues popping until `target` is current. An unknown target pops
    /// every scene.
    pub fn pop_scenes_to(
        &self,
        target: impl Into<SceneTarget>,
        return_value: Option<ReturnValue>,
        options: PopOptions,
    ) {
        self.enqueue(DeferredSceneOp::pop_to(target.into(), return_value, options));
    }

    fn enqueue(&self, op: DeferredSceneOp) {
        if self.phase.get() == DispatchPhase::Closed {
            warn!(target: "stage", "{}: {} ignored, stage is closed", self.name, op.operation.label());
            return;
        }
        trace!(target: "stage", "{}: queued {}", self.name, op.operation.label());
        self.deferred.borrow_mut().push(op);
        self.schedule_dispatch();
    }

    //--- Dispatch Pipeline ------------------------------------------------

    fn schedule_dispatch(&self) {
        if self.phase.get() != DispatchPhase::Idle || self.deferred.borrow().is_empty() {
            return;
        }
        self.set_phase(DispatchPhase::Scheduled);

        let stage = self.this.clone();
        self.run_loop.defer(move || {
            if let Some(stage) = stage.upgrade() {
                stage.run_loader();
            }
        });
    }

    /// Takes the batch and loads whatever sources it still needs.
    fn run_loader(&self) {
        if self.phase.get() != DispatchPhase::Scheduled {
            return;
        }
        let batch = self.deferred.borrow_mut().take_batch();
        if batch.is_empty() {
            self.set_phase(DispatchPhase::Idle);
            return;
        }
        self.set_phase(DispatchPhase::Loading);

        let sources = self.unloaded_sources(&batch.scenes_needing_sources);
        if sources.is_empty() {
            self.execute_batch(batch.ops);
            return;
        }

        debug!(target: "stage", "{}: loading {} source(s)", self.name, sources.len());
        let stage = self.this.clone();
        let requested = sources.clone();
        let ops = batch.ops;
        self.services.loader.load(
            sources,
            Box::new(move |result: Result<(), LoadError>| {
                let Some(stage) = stage.upgrade() else {
                    return;
                };
                if stage.phase.get() != DispatchPhase::Loading {
                    debug!(target: "stage", "{}: load finished after teardown", stage.name);
                    return;
                }
                match result {
                    Ok(()) => stage.loaded_sources.borrow_mut().extend(requested),
                    Err(err) => error!(target: "stage", "{}: {}", stage.name, err),
                }
                stage.execute_batch(ops);
            }),
        );
    }

    fn unloaded_sources(&self, scenes: &[String]) -> Vec<String> {
        let loaded = self.loaded_sources.borrow();
        let mut seen = HashSet::new();
        scenes
            .iter()
            .filter_map(|name| self.registry.get(name))
            .flat_map(|descriptor| descriptor.sources().to_vec())
            .filter(|source| !loaded.contains(source) && seen.insert(source.clone()))
            .collect()
    }

    fn execute_batch(&self, ops: Vec<DeferredSceneOp>) {
        if !self.set_phase(DispatchPhase::Executing) {
            return;
        }

        let previous_top = self.scene_stack.current_scene();
        let had_scenes = previous_top.is_some();
        let last_is_pop = ops.last().map(|op| op.is_pop).unwrap_or(false);
        let requested = ops.iter().rev().find_map(|op| op.transition.clone());

        //--- 1. Snapshot and deactivate the current scene ----------------
        let transition = (had_scenes && self.config.transitions_enabled()).then(|| {
            Transition::capture(self.services.transitions.as_ref(), &self.name, last_is_pop)
        });
        self.scene_stack.deactivate();
        if self.abandon_pass(transition.as_ref()) {
            return;
        }

        //--- 2. Run every operation in order -------------------------------
        debug!(target: "stage", "{}: executing {} operation(s)", self.name, ops.len());
        for op in ops {
            self.apply(op.operation);
            if self.abandon_pass(transition.as_ref()) {
                return;
            }
        }

        //--- 3. Decide what to activate ------------------------------------
        let Some(top) = self.scene_stack.current_scene() else {
            if let Some(transition) = transition {
                transition.cleanup();
            }
            if had_scenes {
                info!(target: "stage", "{}: last scene popped, closing window", self.name);
                self.host_call("close window", self.services.host.close_window(&self.name));
            }
            self.finish_pass();
            return;
        };

        if previous_top.as_ref().is_some_and(|previous| Rc::ptr_eq(previous, &top)) {
            if let Some(transition) = transition {
                transition.cleanup();
            }
            self.scene_stack.activate();
            self.finish_pass();
            return;
        }

        if let Some(transition) = transition {
            let kind = requested.unwrap_or_else(|| top.default_transition().clone());
            match transition.set_transition_type(kind, last_is_pop) {
                Ok(()) => *self.transition.borrow_mut() = Some(transition),
                Err(err) => {
                    error!(target: "stage", "{}: {}", self.name, err);
                    transition.cleanup();
                }
            }
        }

        //--- 4. Activate ---------------------------------------------------
        self.activate_top(&top);
    }

    fn apply(&self, operation: SceneOperation) {
        match operation {
            SceneOperation::Push(arguments) => match self.prepare_new_scene(arguments) {
                Ok(scene) => self.scene_stack.push_scene(scene),
                Err(err) => error!(target: "stage", "{}: push failed: {}", self.name, err),
            },
            SceneOperation::Swap(arguments) => match self.prepare_new_scene(arguments) {
                Ok(scene) => self.scene_stack.swap_scene(scene),
                Err(err) => error!(target: "stage", "{}: swap failed: {}", self.name, err),
            },
            SceneOperation::Pop { return_value } => {
                if self.scene_stack.pop_scene(return_value).is_none() {
                    warn!(target: "stage", "{}: pop with no scene", self.name);
                }
            }
            SceneOperation::PopTo {
                target,
                return_value,
            } => {
                let popped = self.scene_stack.pop_scenes_to(&target, return_value);
                debug!(target: "stage", "{}: popped {} scene(s) to {:?}", self.name, popped, target);
            }
        }
    }

    /// Materializes the element and assistant of a scene about to be
    /// pushed. The element is removed again if the assistant fails.
    fn prepare_new_scene(&self, arguments: SceneArguments) -> Result<Rc<SceneController>, FrameworkError> {
        let descriptor = self
            .registry
            .get(arguments.descriptor_name())
            .ok_or_else(|| FrameworkError::SceneNotRegistered(arguments.descriptor_name().to_string()))?;

        let view = &self.services.view;
        let markup = view
            .render(descriptor.template(), arguments.params.as_deref())
            .map_err(|source| FrameworkError::View {
                scene: arguments.name.clone(),
                source,
            })?;
        let element = view
            .convert_to_node(&markup)
            .map_err(|source| FrameworkError::View {
                scene: arguments.name.clone(),
                source,
            })?;

        let fallback = Err(HookError::Panicked("assistant factory panicked".into()));
        let assistant = call_isolated("stage", &self.name, "assistant factory", fallback, || {
            descriptor.build_assistant(&arguments)
        });
        let assistant = match assistant {
            Ok(assistant) => assistant,
            Err(source) => {
                element.remove();
                return Err(FrameworkError::AssistantConstruction {
                    scene: arguments.name.clone(),
                    source,
                });
            }
        };

        let context = SceneContext {
            stage: self.this.clone(),
            stage_name: self.name.clone(),
            run_loop: self.run_loop.clone(),
            services: self.services.clone(),
        };
        Ok(SceneController::new(context, arguments, &descriptor, assistant, element))
    }

    /// Runs the about-to-activate pass under a fresh synchronizer. A
    /// wrapped no-op holds the barrier until every hook has been offered it.
    fn activate_top(&self, top: &Rc<SceneController>) {
        if !self.set_phase(DispatchPhase::Activating) {
            return;
        }
        self.scene_stack.about_to_activate(top);

        if !top.has_about_to_activate() {
            top.request_full_screen();
            self.begin_transition();
            return;
        }

        let stage = self.this.clone();
        let sync = Synchronizer::new(&self.run_loop, self.config.sync_timeout(), move || {
            if let Some(stage) = stage.upgrade() {
                stage.begin_transition();
            }
        });
        *self.synchronizer.borrow_mut() = Some(Rc::clone(&sync));

        let safety = sync.wrap(|| {});
        top.about_to_activate(&sync);
        safety();
    }

    fn begin_transition(&self) {
        if self.phase.get() != DispatchPhase::Activating {
            return;
        }
        self.set_phase(DispatchPhase::Transitioning);
        self.synchronizer.borrow_mut().take();

        let transition = self.transition.borrow().clone();
        let Some(transition) = transition else {
            self.transition_complete();
            return;
        };

        let stage = self.this.clone();
        let started = transition.run(move || {
            if let Some(stage) = stage.upgrade() {
                stage.transition_complete();
            }
        });
        if let Err(err) = started {
            error!(target: "stage", "{}: {}", self.name, err);
            self.transition_complete();
        }
    }

    fn transition_complete(&self) {
        if self.phase.get() != DispatchPhase::Transitioning {
            return;
        }
        if let Some(transition) = self.transition.borrow_mut().take() {
            transition.cleanup();
        }

        self.scene_stack.activate();
        if self.is_closed() {
            return;
        }
        if !self.splash_hidden.replace(true) {
            self.host_call("hide splash screen", self.services.host.hide_splash_screen(&self.name));
        }
        self.finish_pass();
    }

    fn finish_pass(&self) {
        if !self.set_phase(DispatchPhase::Idle) {
            return;
        }
        trace!(target: "stage", "{}: pass complete", self.name);
        self.schedule_dispatch();
    }

    //--- Commander Chain --------------------------------------------------

    /// Sends `event` to the current scene's chain, then to the stage's own
    /// chain unless the scene stopped it.
    pub fn send_event_to_commanders(&self, event: &mut Event) -> Result<(), CommandError> {
        if let Some(top) = self.scene_stack.current_scene() {
            if event.is(&EventType::Back) {
                top.commit_changes();
            }
            top.send_event_to_commanders(event)?;
        }
        if !event.is_propagation_stopped() {
            self.commanders.send_event_to_commanders(event)?;
        }
        Ok(())
    }

    pub fn push_commander(&self, commander: CommanderRef) {
        self.commanders.push_commander(commander);
    }

    pub fn remove_commander(&self, commander: &CommanderRef) -> usize {
        self.commanders.remove_commander(commander)
    }

    //--- Input ------------------------------------------------------------

    /// Turns back keys into `back` events and forwards every other key to
    /// the current scene. Returns whether the key was consumed.
    pub fn handle_key_event(&self, event: &KeyEvent) -> Result<bool, CommandError> {
        if self.phase.get() == DispatchPhase::Closed || self.is_transitioning() {
            trace!(target: "stage", "{}: key {:?} dropped", self.name, event.key);
            return Ok(false);
        }

        if self.config.back_keys().is_back_key(event.key, event.modifiers) {
            if event.is_down() && !event.repeat {
                debug!(target: "stage", "{}: back key {:?}", self.name, event.key);
                self.send_event_to_commanders(&mut Event::back())?;
            }
            return Ok(true);
        }

        Ok(self
            .scene_stack
            .current_scene()
            .is_some_and(|scene| scene.handle_key(event)))
    }

    pub fn handle_tap(&self) {
        if self.phase.get() == DispatchPhase::Closed || self.is_transitioning() {
            return;
        }
        if let Some(scene) = self.scene_stack.current_scene() {
            scene.handle_tap();
        }
    }

    //--- Window State -----------------------------------------------------

    /// Brings the stage's window to the front.
    pub fn activate(&self) {
        self.active.set(true);
        self.host_call("activate window", self.services.host.activate_window(&self.name));
    }

    pub fn deactivate(&self) {
        self.active.set(false);
        self.host_call("deactivate window", self.services.host.deactivate_window(&self.name));
    }

    /// Records window focus and tells the commander chain.
    pub fn set_focused(&self, focused: bool) -> Result<(), CommandError> {
        if self.focused.replace(focused) == focused {
            return Ok(());
        }
        let mut event = if focused {
            Event::new(EventType::StageActivate)
        } else {
            Event::new(EventType::StageDeactivate)
        };
        self.send_event_to_commanders(&mut event)
    }

    pub fn set_orientation(&self, orientation: Orientation) {
        self.orientation.set(orientation);
        let remap = self
            .services
            .host
            .enable_landscape_key_remap(&self.name, orientation.is_landscape());
        self.host_call("landscape key remap", remap);

        if let Some(scene) = self.scene_stack.current_scene() {
            scene.orientation_changed(orientation);
        }
    }

    pub fn set_modal_dialog(&self, dialog: Option<Rc<dyn ModalDialog>>) {
        *self.modal_dialog.borrow_mut() = dialog;
    }

    pub fn show_new_content_indicator(&self) {
        self.host_call("new content indicator", self.services.host.show_new_content_indicator(&self.name));
    }

    pub fn set_clipboard(&self, text: &str) {
        self.host_call("clipboard", self.services.host.set_clipboard(&self.name, text));
    }

    //--- Delegation -------------------------------------------------------

    /// Runs `f` on the current scene's assistant state if it is a `T`.
    pub fn delegate_to_scene_assistant<T, R, F>(&self, f: F) -> Option<R>
    where
        T: Any,
        F: FnOnce(&T) -> R,
    {
        self.scene_stack.current_scene()?.delegate_to_assistant(f)
    }

    pub fn parent_scene_assistant(&self, scene: &Rc<SceneController>) -> Option<Rc<dyn Any>> {
        self.scene_stack.parent_scene_assistant(scene)
    }

    /// Offers `notification` to the current scene, then to the stage
    /// assistant. `None` means one of them consumed it.
    pub fn consider_for_notification(&self, notification: Notification) -> Option<Notification> {
        let notification = match self.scene_stack.current_scene() {
            Some(scene) => scene.consider_for_notification(notification)?,
            None => notification,
        };
        match self.assistant().and_then(|a| a.consider_for_notification.clone()) {
            Some(hook) => {
                let fallback = Some(Rc::clone(&notification));
                call_isolated("stage", &self.name, "considerForNotification", fallback, || {
                    hook(self, notification)
                })
            }
            None => Some(notification),
        }
    }

    //--- Teardown ---------------------------------------------------------

    /// Tears the stage down synchronously: pending work is dropped, every
    /// scene is deactivated and cleaned up, then the assistant and the
    /// close callback run. Later calls do nothing.
    pub fn cleanup(&self) {
        if self.phase.replace(DispatchPhase::Closed) == DispatchPhase::Closed {
            return;
        }
        info!(target: "stage", "Closing stage '{}'", self.name);

        self.deferred.borrow_mut().clear();
        if let Some(sync) = self.synchronizer.borrow_mut().take() {
            sync.cancel();
        }
        if let Some(transition) = self.transition.borrow_mut().take() {
            transition.cleanup();
        }

        let popped = self.scene_stack.pop_all();
        debug!(target: "stage", "{}: removed {} scene(s)", self.name, popped);

        if let Some(hook) = self.assistant().and_then(|a| a.cleanup.clone()) {
            run_isolated("stage", &self.name, "cleanup", || hook(self));
        }
        self.commanders.clear();
        self.modal_dialog.borrow_mut().take();
        self.assistant.borrow_mut().take();

        let on_closed = self.on_closed.borrow_mut().take();
        if let Some(on_closed) = on_closed {
            run_isolated("stage", &self.name, "closed callback", || {
                on_closed(self);
                Ok(())
            });
        }
    }

    //--- Query API --------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stage_type(&self) -> StageType {
        self.stage_type
    }

    pub fn top_scene(&self) -> Option<Rc<SceneController>> {
        self.scene_stack.current_scene()
    }

    /// Scenes bottom to top.
    pub fn get_scenes(&self) -> Vec<Rc<SceneController>> {
        self.scene_stack.scenes()
    }

    pub fn phase(&self) -> DispatchPhase {
        self.phase.get()
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.borrow().is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.phase.get() == DispatchPhase::Closed
    }

    pub fn pending_operations(&self) -> usize {
        self.deferred.borrow().len()
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    pub fn is_focused(&self) -> bool {
        self.focused.get()
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation.get()
    }

    pub fn assistant_state(&self) -> Option<Rc<dyn Any>> {
        self.assistant_state.clone()
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    //--- Internal Helpers -------------------------------------------------

    /// Moves the pipeline to `phase`. A closed stage stays closed.
    fn set_phase(&self, phase: DispatchPhase) -> bool {
        if self.phase.get() == DispatchPhase::Closed {
            return false;
        }
        self.phase.set(phase);
        true
    }

    /// Ends a pass whose stage was torn down by one of its hooks. Scenes
    /// pushed after the teardown are removed again.
    fn abandon_pass(&self, transition: Option<&Rc<Transition>>) -> bool {
        if !self.is_closed() {
            return false;
        }
        if let Some(transition) = transition {
            transition.cleanup();
        }
        let orphans = self.scene_stack.pop_all();
        debug!(target: "stage", "{}: pass abandoned, removed {} scene(s)", self.name, orphans);
        true
    }

    fn assistant(&self) -> Option<Rc<StageAssistant>> {
        self.assistant.borrow().clone()
    }

    fn host_call(&self, what: &str, result: Result<(), HostError>) {
        if let Err(err) = result {
            error!(target: "platform", "{}: {} failed: {}", self.name, what, err);
        }
    }
}

impl fmt::Debug for StageController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageController")
            .field("name", &self.name)
            .field("stage_type", &self.stage_type)
            .field("phase", &self.phase.get())
            .field("scenes", &self.scene_stack.len())
            .finish_non_exhaustive()
    }
}

//=== Stage Commanders ====================================================

/// Default handling at the bottom of the stage chain.
struct StageCommander {
    stage: Weak<StageController>,
}

impl Commander for StageCommander {
    fn handle_command(&self, event: &mut Event) -> Result<(), CommandError> {
        let Some(stage) = self.stage.upgrade() else {
            return Ok(());
        };

        match event.event_type() {
            EventType::Back => {
                let dialog = stage.modal_dialog.borrow_mut().take();
                if let Some(dialog) = dialog {
                    debug!(target: "commander", "{}: back closed the modal dialog", stage.name);
                    dialog.close();
                    event.stop_propagation();
                } else if stage.scene_stack.len() > 1 && !stage.is_transitioning() {
                    stage.pop_scene(None, PopOptions::default());
                    event.stop_propagation();
                }
            }
            EventType::CommandEnable => {
                if matches!(event.command_name(), Some(PREFS_COMMAND | HELP_COMMAND)) {
                    event.prevent_default();
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// Forwards events to the stage assistant's command hook.
struct StageAssistantCommander {
    stage: Weak<StageController>,
    hook: StageCommandHook,
}

impl Commander for StageAssistantCommander {
    fn handle_command(&self, event: &mut Event) -> Result<(), CommandError> {
        match self.stage.upgrade() {
            Some(stage) => (self.hook)(&stage, event),
            None => Ok(()),
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
