//=========================================================================
// Test Doubles
//=========================================================================
//
// Recording collaborators shared by the unit tests of the core.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

//=== Internal Dependencies ===============================================

use crate::core::error::{HostError, LoadError, WidgetError};
use crate::core::platform_bridge::PlatformHost;
use crate::core::run_loop::RunLoop;
use crate::core::scene::{
    HookResult, ModelRef, SceneArguments, SceneAssistant, SceneContext, SceneController,
    SceneDescriptor,
};
use crate::core::services::{DetachedElement, ElementRef, LoadCallback, Services, SourceLoader, WidgetHost};
use crate::core::transition::{EffectDone, TransitionEffect, TransitionEffects, TransitionType};

//=== CallLog =============================================================

/// Shared, ordered record of calls.
#[derive(Clone, Default)]
pub(crate) struct CallLog(Rc<RefCell<Vec<String>>>);

impl CallLog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, entry: &str) {
        self.0.borrow_mut().push(entry.to_string());
    }

    pub(crate) fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.borrow_mut())
    }
}

//=== Assistants ==========================================================

/// Assistant logging `"<name>:<hook>"` for its lifecycle hooks. An
/// activation value that is a `&'static str` is logged in parentheses.
pub(crate) fn named_assistant(name: &'static str, log: &CallLog) -> SceneAssistant {
    let hook = move |suffix: &'static str| {
        let log = log.clone();
        move |_: &SceneController| -> HookResult {
            log.push(&format!("{name}:{suffix}"));
            Ok(())
        }
    };
    let activate_log = log.clone();

    SceneAssistant::new()
        .on_setup(hook("setup"))
        .on_ready(hook("ready"))
        .on_cleanup(hook("cleanup"))
        .on_deactivate(hook("deactivate"))
        .on_activate(move |_, value| {
            match value.and_then(|v| v.downcast_ref::<&'static str>()) {
                Some(value) => activate_log.push(&format!("{name}:activate({value})")),
                None => activate_log.push(&format!("{name}:activate")),
            }
            Ok(())
        })
}

pub(crate) fn recording_assistant(log: &CallLog) -> SceneAssistant {
    named_assistant("assistant", log)
}

/// A set-up-ready scene on its own run loop, outside any stage.
pub(crate) fn detached_scene(name: &str, assistant: SceneAssistant) -> Rc<SceneController> {
    let run_loop = RunLoop::new();
    let context = SceneContext {
        stage: Weak::new(),
        stage_name: "test".into(),
        services: Services::headless(&run_loop),
        run_loop,
    };
    let descriptor = SceneDescriptor::new(name, |_| Ok(SceneAssistant::new()));
    SceneController::new(
        context,
        SceneArguments::new(name),
        &descriptor,
        assistant,
        DetachedElement::new(),
    )
}

//=== RecordingWidgets ====================================================

/// Widget host logging `"widgets:<call>"`.
pub(crate) struct RecordingWidgets {
    log: CallLog,
    focus_advances: Cell<bool>,
}

impl RecordingWidgets {
    pub(crate) fn new(log: &CallLog) -> Rc<Self> {
        Rc::new(Self {
            log: log.clone(),
            focus_advances: Cell::new(false),
        })
    }

    /// Whether `advance_focus` reports that focus moved.
    pub(crate) fn set_focus_advances(&self, advances: bool) {
        self.focus_advances.set(advances);
    }
}

impl WidgetHost for RecordingWidgets {
    fn instantiate_child_widgets(&self, _scene: &SceneController, _root: &ElementRef) -> Result<(), WidgetError> {
        self.log.push("widgets:instantiate");
        Ok(())
    }

    fn install_menus(&self, _scene: &SceneController) -> Result<(), WidgetError> {
        self.log.push("widgets:menus");
        Ok(())
    }

    fn setup_scroller(&self, _root: &ElementRef) {
        self.log.push("widgets:scroller");
    }

    fn validate_scroll_position(&self, _root: &ElementRef) {
        self.log.push("widgets:validate-scroll");
    }

    fn focus_initial(&self, _root: &ElementRef) {
        self.log.push("widgets:focus-initial");
    }

    fn advance_focus(&self, _root: &ElementRef, backwards: bool) -> bool {
        self.log.push(&format!("widgets:advance-focus:{backwards}"));
        self.focus_advances.get()
    }

    fn blur_focused(&self, _root: &ElementRef) {
        self.log.push("widgets:blur");
    }

    fn model_updated(&self, _scene: &SceneController, widget: &str, _model: Option<&ModelRef>) {
        self.log.push(&format!("widgets:model-updated:{widget}"));
    }

    fn remove_widgets(&self, _root: &ElementRef) {
        self.log.push("widgets:remove");
    }
}

//=== RecordingEffects ====================================================

/// Transition effects logging `"effect:<call>"` whose handoffs finish only
/// when the test says so. Pop preparations carry a `:pop` suffix.
pub(crate) struct RecordingEffects {
    log: CallLog,
    running: Rc<RefCell<Vec<EffectDone>>>,
}

impl RecordingEffects {
    pub(crate) fn new(log: &CallLog) -> Rc<Self> {
        Rc::new(Self {
            log: log.clone(),
            running: Rc::new(RefCell::new(Vec::new())),
        })
    }

    /// Completes every running handoff; returns how many there were.
    pub(crate) fn finish_all(&self) -> usize {
        let running = std::mem::take(&mut *self.running.borrow_mut());
        let count = running.len();
        for done in running {
            done();
        }
        count
    }

    pub(crate) fn pending(&self) -> usize {
        self.running.borrow().len()
    }
}

impl TransitionEffects for RecordingEffects {
    fn capture(&self, _stage: &str, is_pop: bool) -> Box<dyn TransitionEffect> {
        self.log
            .push(if is_pop { "effect:capture:pop" } else { "effect:capture:push" });
        Box::new(RecordingEffect {
            log: self.log.clone(),
            running: Rc::clone(&self.running),
        })
    }
}

struct RecordingEffect {
    log: CallLog,
    running: Rc<RefCell<Vec<EffectDone>>>,
}

impl TransitionEffect for RecordingEffect {
    fn prepare(&mut self, kind: &TransitionType, is_pop: bool) {
        let suffix = if is_pop { ":pop" } else { "" };
        self.log.push(&format!("effect:prepare:{}{suffix}", kind.as_str()));
    }

    fn run(self: Box<Self>, done: EffectDone) {
        self.log.push("effect:run");
        self.running.borrow_mut().push(done);
    }

    fn discard(self: Box<Self>) {
        self.log.push("effect:discard");
    }
}

//=== ManualLoader ========================================================

/// Loader whose loads complete when the test calls `complete_all`.
#[derive(Default)]
pub(crate) struct ManualLoader {
    requests: RefCell<Vec<Vec<String>>>,
    pending: RefCell<Vec<LoadCallback>>,
}

impl ManualLoader {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub(crate) fn requests(&self) -> Vec<Vec<String>> {
        self.requests.borrow().clone()
    }

    pub(crate) fn complete_all(&self, result: Result<(), LoadError>) {
        let pending = std::mem::take(&mut *self.pending.borrow_mut());
        for done in pending {
            done(result.clone());
        }
    }
}

impl SourceLoader for ManualLoader {
    fn load(&self, sources: Vec<String>, done: LoadCallback) {
        self.requests.borrow_mut().push(sources);
        self.pending.borrow_mut().push(done);
    }
}

//=== RecordingHost =======================================================

/// Host logging `"<call>:<stage>[:<arg>]"`.
#[derive(Default)]
pub(crate) struct RecordingHost {
    log: CallLog,
}

impl RecordingHost {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub(crate) fn take(&self) -> Vec<String> {
        self.log.take()
    }

    fn record(&self, entry: String) -> Result<(), HostError> {
        self.log.push(&entry);
        Ok(())
    }
}

impl PlatformHost for RecordingHost {
    fn set_full_screen(&self, stage: &str, enabled: bool) -> Result<(), HostError> {
        self.record(format!("set_full_screen:{stage}:{enabled}"))
    }

    fn enable_landscape_key_remap(&self, stage: &str, enabled: bool) -> Result<(), HostError> {
        self.record(format!("enable_landscape_key_remap:{stage}:{enabled}"))
    }

    fn show_new_content_indicator(&self, stage: &str) -> Result<(), HostError> {
        self.record(format!("show_new_content_indicator:{stage}"))
    }

    fn set_clipboard(&self, stage: &str, text: &str) -> Result<(), HostError> {
        self.record(format!("set_clipboard:{stage}:{text}"))
    }

    fn activate_window(&self, stage: &str) -> Result<(), HostError> {
        self.record(format!("activate_window:{stage}"))
    }

    fn deactivate_window(&self, stage: &str) -> Result<(), HostError> {
        self.record(format!("deactivate_window:{stage}"))
    }

    fn hide_splash_screen(&self, stage: &str) -> Result<(), HostError> {
        self.record(format!("hide_splash_screen:{stage}"))
    }

    fn close_window(&self, stage: &str) -> Result<(), HostError> {
        self.record(format!("close_window:{stage}"))
    }
}
