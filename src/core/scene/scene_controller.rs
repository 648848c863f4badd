//=========================================================================
// Scene Controller
//=========================================================================
//
// Framework side of one scene: lifecycle, commanders, containers, model
// watchers and in-flight requests.
//
// Lifecycle:
//   new → setup → (about_to_activate → activate ⇄ deactivate)* → cleanup
//
// Setup sequence:
//   scroller → commanders → body container → assistant setup → widgets
//   → menus → scroll position → assistant ready → initial focus (deferred)
//
// Each assistant hook is isolated; a failing hook never skips the
// framework steps after it.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use log::{debug, error, trace};

//=== Internal Dependencies ===============================================

use super::assistant::{
    call_isolated, run_isolated, HookResult, Notification, ReturnValue, SceneAssistant,
    SceneCommandHook,
};
use super::model_watch::{ChangeDetails, ModelRef, ModelWatchers, WatcherRef};
use super::registry::{SceneArguments, SceneDescriptor};
use super::requests::{RequestTracker, TrackedRequest};
use crate::core::commander::{Commander, CommanderRef, CommanderStack, Event, EventType};
use crate::core::container::{Container, ContainerOptions, ContainerStack, SCENE_LAYER};
use crate::core::error::{CommandError, FrameworkError};
use crate::core::input::{KeyCode, KeyEvent, Orientation};
use crate::core::run_loop::RunLoop;
use crate::core::services::{ElementRef, RequestOptions, Services};
use crate::core::stage::StageController;
use crate::core::synchronizer::Synchronizer;
use crate::core::transition::TransitionType;

//=== Supporting Types ====================================================

/// Where a scene lives and what it may call.
#[derive(Clone)]
pub struct SceneContext {
    pub stage: Weak<StageController>,
    pub stage_name: String,
    pub run_loop: RunLoop,
    pub services: Services,
}

/// Attributes and model recorded for a named widget of the scene.
#[derive(Clone, Default)]
pub struct WidgetSetup {
    pub attributes: Option<Rc<dyn Any>>,
    pub model: Option<ModelRef>,
}

/// Listener given the synchronizer before the scene's transition runs.
pub type AboutToActivateListener = Rc<dyn Fn(&Rc<Synchronizer>)>;

//=== SceneController =====================================================

pub struct SceneController {
    this: Weak<SceneController>,
    context: SceneContext,
    arguments: SceneArguments,
    name: String,
    id: String,
    element: ElementRef,
    assistant: RefCell<Option<Rc<SceneAssistant>>>,
    assistant_state: Option<Rc<dyn Any>>,
    has_about_to_activate_hook: bool,
    default_transition: TransitionType,
    full_screen: bool,
    scroller: bool,
    focus_advance: bool,

    set_up: Cell<bool>,
    cleaned_up: Cell<bool>,
    active: Cell<bool>,

    commanders: CommanderStack,
    containers: ContainerStack,
    watchers: ModelWatchers,
    requests: Rc<RequestTracker>,
    widgets: RefCell<HashMap<String, WidgetSetup>>,
    listeners: RefCell<Vec<AboutToActivateListener>>,
}

impl SceneController {
    //--- Construction -----------------------------------------------------

    /// Binds `assistant` to a new scene controller. Hook presence is read
    /// here, once.
    pub(crate) fn new(
        context: SceneContext,
        arguments: SceneArguments,
        descriptor: &SceneDescriptor,
        assistant: SceneAssistant,
        element: ElementRef,
    ) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            name: arguments.name.clone(),
            id: arguments.id.clone(),
            default_transition: descriptor.default_transition().clone(),
            full_screen: descriptor.is_full_screen(),
            scroller: descriptor.has_scroller() && !arguments.disable_scroller,
            focus_advance: descriptor.has_focus_advance(),
            has_about_to_activate_hook: assistant.has_about_to_activate(),
            assistant_state: assistant.state.clone(),
            assistant: RefCell::new(Some(Rc::new(assistant))),
            context,
            arguments,
            element,
            set_up: Cell::new(false),
            cleaned_up: Cell::new(false),
            active: Cell::new(false),
            commanders: CommanderStack::new(),
            containers: ContainerStack::new(),
            watchers: ModelWatchers::new(),
            requests: RequestTracker::new(),
            widgets: RefCell::new(HashMap::new()),
            listeners: RefCell::new(Vec::new()),
        })
    }

    //--- Lifecycle --------------------------------------------------------

    /// One-time initialization. Later calls do nothing.
    pub fn setup(&self) {
        if self.set_up.replace(true) {
            return;
        }
        debug!(target: "scene", "{}: setup", self.name);
        let widgets = Rc::clone(&self.context.services.widgets);

        if self.scroller {
            widgets.setup_scroller(&self.element);
        }

        self.commanders.push_commander(Rc::new(SceneCommander {
            scene: self.this.clone(),
        }));
        if let Some(hook) = self.assistant().and_then(|a| a.handle_command.clone()) {
            self.commanders.push_commander(Rc::new(AssistantCommander {
                scene: self.this.clone(),
                hook,
            }));
        }
        self.containers
            .push_container(Rc::clone(&self.element), SCENE_LAYER, ContainerOptions::new());

        if let Some(hook) = self.assistant().and_then(|a| a.setup.clone()) {
            self.run_hook("setup", || hook(self));
        }

        if let Err(err) = widgets.instantiate_child_widgets(self, &self.element) {
            error!(target: "scene", "{}: widget instantiation failed: {}", self.name, err);
        }
        if let Err(err) = widgets.install_menus(self) {
            error!(target: "scene", "{}: menu installation failed: {}", self.name, err);
        }
        if self.scroller {
            widgets.validate_scroll_position(&self.element);
        }

        if let Some(hook) = self.assistant().and_then(|a| a.ready.clone()) {
            self.run_hook("ready", || hook(self));
        }

        let scene = self.this.clone();
        self.context.run_loop.defer(move || {
            if let Some(scene) = scene.upgrade() {
                if !scene.cleaned_up.get() {
                    scene.context.services.widgets.focus_initial(&scene.element);
                }
            }
        });
    }

    /// Inverse of setup. Always runs to completion; later calls do nothing.
    pub fn cleanup(&self) {
        if self.cleaned_up.replace(true) {
            return;
        }
        debug!(target: "scene", "{}: cleanup", self.name);

        if let Some(hook) = self.assistant().and_then(|a| a.cleanup.clone()) {
            self.run_hook("cleanup", || hook(self));
        }

        let cancelled = self.requests.cancel_all();
        if cancelled > 0 {
            debug!(target: "scene", "{}: cancelled {} request(s)", self.name, cancelled);
        }
        self.watchers.clear();
        self.listeners.borrow_mut().clear();
        self.containers.cleanup();
        self.commanders.clear();
        self.context.services.widgets.remove_widgets(&self.element);
        self.element.remove();
        self.active.set(false);
        self.assistant.borrow_mut().take();
    }

    /// Gives the assistant and the registered listeners a chance to hold
    /// the transition with synchronizer-wrapped callbacks.
    pub fn about_to_activate(&self, synchronizer: &Rc<Synchronizer>) {
        if let Some(hook) = self.assistant().and_then(|a| a.about_to_activate.clone()) {
            self.run_hook("aboutToActivate", || hook(self, synchronizer));
        }

        let listeners = self.listeners.borrow().clone();
        for listener in listeners {
            self.run_hook("aboutToActivate listener", || {
                listener(synchronizer);
                Ok(())
            });
        }

        self.request_full_screen();
    }

    /// Applies the scene's full-screen flag to the stage window.
    pub(crate) fn request_full_screen(&self) {
        let host = &self.context.services.host;
        if let Err(err) = host.set_full_screen(&self.context.stage_name, self.full_screen) {
            error!(target: "platform", "{}: full screen request failed: {}", self.name, err);
        }
    }

    pub fn activate(&self, return_value: Option<ReturnValue>) {
        if self.active.get() || self.cleaned_up.get() {
            return;
        }
        self.active.set(true);
        debug!(target: "scene", "{}: activate", self.name);

        if let Some(hook) = self.assistant().and_then(|a| a.activate.clone()) {
            self.run_hook("activate", || hook(self, return_value.as_ref()));
        }
    }

    /// Dismisses open dialogs and submenus, then tells the assistant.
    pub fn deactivate(&self) {
        if !self.active.replace(false) {
            return;
        }
        debug!(target: "scene", "{}: deactivate", self.name);

        self.containers.cancel_all();
        if let Some(hook) = self.assistant().and_then(|a| a.deactivate.clone()) {
            self.run_hook("deactivate", || hook(self));
        }
    }

    //--- Commanders and Containers ----------------------------------------

    pub fn push_commander(&self, commander: CommanderRef) {
        self.commanders.push_commander(commander);
    }

    pub fn remove_commander(&self, commander: &CommanderRef) -> usize {
        self.commanders.remove_commander(commander)
    }

    /// Sends `event` through this scene's own commander chain.
    pub fn send_event_to_commanders(&self, event: &mut Event) -> Result<(), CommandError> {
        self.commanders.send_event_to_commanders(event)
    }

    pub fn push_container(&self, element: ElementRef, layer: i32, options: ContainerOptions) {
        self.containers.push_container(element, layer, options);
    }

    pub fn remove_container(&self, element: &ElementRef) -> bool {
        self.containers.remove_container(element)
    }

    pub fn top_container(&self) -> Option<Container> {
        self.containers.top_container()
    }

    //--- Models -----------------------------------------------------------

    pub fn watch_model<F>(&self, model: &ModelRef, who: &WatcherRef, callback: F)
    where
        F: Fn(&ModelRef, Option<&ChangeDetails>) + 'static,
    {
        self.watchers.watch_model(model, who, callback);
    }

    pub fn remove_watcher(&self, who: &WatcherRef, model: Option<&ModelRef>) -> usize {
        self.watchers.remove_watcher(who, model)
    }

    /// Notifies the watchers of `model` except those registered as `who`.
    pub fn model_changed(&self, model: &ModelRef, who: Option<&WatcherRef>) {
        self.watchers.model_changed(model, who, None);
    }

    pub fn model_changed_with(
        &self,
        model: &ModelRef,
        who: Option<&WatcherRef>,
        details: ChangeDetails,
    ) {
        self.watchers.model_changed(model, who, Some(details));
    }

    //--- Widgets ----------------------------------------------------------

    /// Records attributes and model for the widget named `widget`, read by
    /// the widget collaborator when it instantiates widgets.
    pub fn setup_widget(
        &self,
        widget: impl Into<String>,
        attributes: Option<Rc<dyn Any>>,
        model: Option<ModelRef>,
    ) {
        self.widgets
            .borrow_mut()
            .insert(widget.into(), WidgetSetup { attributes, model });
    }

    pub fn widget_setup(&self, widget: &str) -> Option<WidgetSetup> {
        self.widgets.borrow().get(widget).cloned()
    }

    /// Replaces the model of a widget set up earlier.
    pub fn set_widget_model(&self, widget: &str, model: Option<ModelRef>) -> Result<(), FrameworkError> {
        {
            let mut widgets = self.widgets.borrow_mut();
            let Some(setup) = widgets.get_mut(widget) else {
                return Err(FrameworkError::WidgetNotSetUp {
                    widget: widget.to_string(),
                    scene: self.name.clone(),
                });
            };
            setup.model = model.clone();
        }
        self.context
            .services
            .widgets
            .model_updated(self, widget, model.as_ref());
        Ok(())
    }

    pub fn listen_about_to_activate<F>(&self, listener: F)
    where
        F: Fn(&Rc<Synchronizer>) + 'static,
    {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    /// Commits edits pending in focused widgets.
    pub fn commit_changes(&self) {
        self.context.services.widgets.commit_changes(&self.element);
    }

    //--- Requests ---------------------------------------------------------

    pub fn service_request(
        &self,
        url: &str,
        options: RequestOptions,
        resubscribe: bool,
    ) -> TrackedRequest {
        let service = Rc::clone(&self.context.services.requests);
        self.requests.issue(service.as_ref(), url, options, resubscribe)
    }

    pub fn remove_request(&self, request: &TrackedRequest) -> bool {
        self.requests.remove(request.id())
    }

    pub fn active_request_count(&self) -> usize {
        self.requests.active_count()
    }

    //--- Input ------------------------------------------------------------

    /// Routes a non-command key event. Enter/Tab on the scene body advance
    /// focus; everything else goes to the topmost container.
    pub fn handle_key(&self, event: &KeyEvent) -> bool {
        if !self.active.get() {
            return false;
        }
        let Some(top) = self.containers.top_container() else {
            return false;
        };

        let on_body = Rc::ptr_eq(top.element(), &self.element);
        if self.focus_advance && on_body && event.is_down() {
            let backwards = match event.key {
                KeyCode::Enter => Some(false),
                KeyCode::Tab => Some(event.modifiers.shift),
                _ => None,
            };
            if let Some(backwards) = backwards {
                if self
                    .context
                    .services
                    .widgets
                    .advance_focus(&self.element, backwards)
                {
                    trace!(target: "scene", "{}: focus advanced (backwards: {})", self.name, backwards);
                    return true;
                }
            }
        }

        top.element().deliver_key(event)
    }

    /// Tap on the scene; blurs the focused widget while active.
    pub fn handle_tap(&self) {
        if self.active.get() {
            self.context.services.widgets.blur_focused(&self.element);
        }
    }

    pub fn orientation_changed(&self, orientation: Orientation) {
        if let Some(hook) = self.assistant().and_then(|a| a.orientation_changed.clone()) {
            self.run_hook("orientationChanged", || hook(self, orientation));
        }
    }

    /// Offers `notification` to the assistant; `None` means it was consumed.
    pub fn consider_for_notification(&self, notification: Notification) -> Option<Notification> {
        match self.assistant().and_then(|a| a.consider_for_notification.clone()) {
            Some(hook) => {
                let fallback = Some(Rc::clone(&notification));
                call_isolated("scene", &self.name, "considerForNotification", fallback, || {
                    hook(self, notification)
                })
            }
            None => Some(notification),
        }
    }

    //--- Accessors --------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn arguments(&self) -> &SceneArguments {
        &self.arguments
    }

    pub fn element(&self) -> &ElementRef {
        &self.element
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    pub fn is_set_up(&self) -> bool {
        self.set_up.get()
    }

    pub fn is_cleaned_up(&self) -> bool {
        self.cleaned_up.get()
    }

    pub fn default_transition(&self) -> &TransitionType {
        &self.default_transition
    }

    pub fn is_full_screen(&self) -> bool {
        self.full_screen
    }

    /// Whether activation must wait on an about-to-activate pass.
    pub fn has_about_to_activate(&self) -> bool {
        self.has_about_to_activate_hook || !self.listeners.borrow().is_empty()
    }

    pub fn stage_controller(&self) -> Option<Rc<StageController>> {
        self.context.stage.upgrade()
    }

    pub fn stage_name(&self) -> &str {
        &self.context.stage_name
    }

    pub fn commander_count(&self) -> usize {
        self.commanders.len()
    }

    pub fn container_count(&self) -> usize {
        self.containers.len()
    }

    pub fn watcher_count(&self) -> usize {
        self.watchers.len()
    }

    /// The state object the assistant was built with.
    pub fn assistant_state(&self) -> Option<Rc<dyn Any>> {
        self.assistant_state.clone()
    }

    /// Runs `f` on the assistant state if it is a `T`.
    pub fn delegate_to_assistant<T, R, F>(&self, f: F) -> Option<R>
    where
        T: Any,
        F: FnOnce(&T) -> R,
    {
        let state = self.assistant_state.as_ref()?;
        state.downcast_ref::<T>().map(f)
    }

    //--- Internal Helpers -------------------------------------------------

    fn assistant(&self) -> Option<Rc<SceneAssistant>> {
        self.assistant.borrow().clone()
    }

    fn run_hook<F>(&self, hook: &'static str, f: F)
    where
        F: FnOnce() -> HookResult,
    {
        run_isolated("scene", &self.name, hook, f);
    }
}

impl fmt::Debug for SceneController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneController")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("stage", &self.context.stage_name)
            .field("active", &self.active.get())
            .finish_non_exhaustive()
    }
}

//=== Scene Commanders ====================================================

/// The scene's own commander: `back` dismisses the topmost dialog or
/// submenu before it can reach the stage.
struct SceneCommander {
    scene: Weak<SceneController>,
}

impl Commander for SceneCommander {
    fn handle_command(&self, event: &mut Event) -> Result<(), CommandError> {
        let Some(scene) = self.scene.upgrade() else {
            return Ok(());
        };
        if event.is(&EventType::Back) && scene.containers.cancel_topmost_above(SCENE_LAYER) {
            debug!(target: "commander", "{}: back dismissed a container", scene.name);
            event.stop_propagation();
        }
        Ok(())
    }
}

/// Forwards events to the assistant's command hook.
struct AssistantCommander {
    scene: Weak<SceneController>,
    hook: SceneCommandHook,
}

impl Commander for AssistantCommander {
    fn handle_command(&self, event: &mut Event) -> Result<(), CommandError> {
        match self.scene.upgrade() {
            Some(scene) => (self.hook)(&scene, event),
            None => Ok(()),
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
