//=========================================================================
// Collaborator Services
//=========================================================================
//
// Narrow interfaces to the components the core calls but never
// implements: view materialization, widgets, source loading, service
// requests, the platform host and transition visuals.
//
// Architecture:
//   Services (cloneable bundle of Rc<dyn …>)
//     ├─ view:        ViewProvider       render + convert_to_node
//     ├─ widgets:     WidgetHost         instantiate, menus, focus, models
//     ├─ loader:      SourceLoader       scene sources before a batch runs
//     ├─ requests:    RequestService     cancellable service requests
//     ├─ host:        PlatformHost       fire-and-forget host bridge
//     └─ transitions: TransitionEffects  scripted visual handoff
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::cell::Cell;
use std::rc::Rc;

//=== Internal Dependencies ===============================================

use crate::core::error::{LoadError, ViewError, WidgetError};
use crate::core::input::KeyEvent;
use crate::core::platform_bridge::{NullHost, PlatformHost};
use crate::core::run_loop::RunLoop;
use crate::core::scene::{ModelRef, SceneController};
use crate::core::transition::{TimedEffects, TransitionEffects};

//=== Element =============================================================

/// Opaque handle to a rendered UI subtree.
pub trait Element {
    fn set_visible(&self, visible: bool);

    fn is_visible(&self) -> bool;

    /// Detaches the subtree from its document.
    fn remove(&self);

    /// Offers a forwarded key event; returns whether it was consumed.
    fn deliver_key(&self, _event: &KeyEvent) -> bool {
        false
    }
}

/// Shared element handle; identity is pointer identity.
pub type ElementRef = Rc<dyn Element>;

/// Element with no backing document, used by headless hosts.
#[derive(Debug)]
pub struct DetachedElement {
    visible: Cell<bool>,
    removed: Cell<bool>,
}

impl DetachedElement {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            visible: Cell::new(true),
            removed: Cell::new(false),
        })
    }

    pub fn is_removed(&self) -> bool {
        self.removed.get()
    }
}

impl Element for DetachedElement {
    fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
    }

    fn is_visible(&self) -> bool {
        self.visible.get()
    }

    fn remove(&self) {
        self.removed.set(true);
    }
}

//=== ViewProvider ========================================================

/// View/templating collaborator.
pub trait ViewProvider {
    fn render(&self, template: &str, data: Option<&dyn Any>) -> Result<String, ViewError>;

    fn convert_to_node(&self, markup: &str) -> Result<ElementRef, ViewError>;
}

/// Produces detached elements and empty markup.
pub struct NullView;

impl ViewProvider for NullView {
    fn render(&self, _template: &str, _data: Option<&dyn Any>) -> Result<String, ViewError> {
        Ok(String::new())
    }

    fn convert_to_node(&self, _markup: &str) -> Result<ElementRef, ViewError> {
        Ok(DetachedElement::new())
    }
}

//=== WidgetHost ==========================================================

/// Widget collaborator. Every method defaults to doing nothing.
pub trait WidgetHost {
    /// Scans `root` and activates the widgets declared in it.
    fn instantiate_child_widgets(
        &self,
        _scene: &SceneController,
        _root: &ElementRef,
    ) -> Result<(), WidgetError> {
        Ok(())
    }

    /// Installs the scene's application and command menus.
    fn install_menus(&self, _scene: &SceneController) -> Result<(), WidgetError> {
        Ok(())
    }

    fn setup_scroller(&self, _root: &ElementRef) {}

    fn validate_scroll_position(&self, _root: &ElementRef) {}

    fn focus_initial(&self, _root: &ElementRef) {}

    /// Commits edits pending in focused widgets to their models.
    fn commit_changes(&self, _root: &ElementRef) {}

    /// Moves focus to the next (or previous) focusable widget.
    fn advance_focus(&self, _root: &ElementRef, _backwards: bool) -> bool {
        false
    }

    fn blur_focused(&self, _root: &ElementRef) {}

    fn model_updated(&self, _scene: &SceneController, _widget: &str, _model: Option<&ModelRef>) {}

    /// Releases widget resources attached to `root`.
    fn remove_widgets(&self, _root: &ElementRef) {}
}

/// Widget host with no widgets.
pub struct NullWidgets;

impl WidgetHost for NullWidgets {}

//=== SourceLoader ========================================================

/// Completion callback of a source load.
pub type LoadCallback = Box<dyn FnOnce(Result<(), LoadError>)>;

/// Loads the source files a scene needs before it can be constructed.
pub trait SourceLoader {
    /// Loads `sources` and calls `done` exactly once, synchronously or later.
    fn load(&self, sources: Vec<String>, done: LoadCallback);
}

/// Loader for hosts where every source is already present.
pub struct ImmediateLoader;

impl SourceLoader for ImmediateLoader {
    fn load(&self, _sources: Vec<String>, done: LoadCallback) {
        done(Ok(()));
    }
}

//=== RequestService ======================================================

/// Outcome delivered to a request's completion callback.
#[derive(Clone)]
pub enum ServiceResponse {
    Success(Option<Rc<dyn Any>>),
    Failure(String),
}

/// Completion callback of a service request.
pub type ResponseCallback = Rc<dyn Fn(&ServiceResponse)>;

/// Parameters of one service request.
#[derive(Clone, Default)]
pub struct RequestOptions {
    pub method: String,
    pub parameters: Option<Rc<dyn Any>>,
    pub subscribe: bool,
    pub resubscribe: bool,
    pub on_complete: Option<ResponseCallback>,
}

impl RequestOptions {
    pub fn method(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            ..Self::default()
        }
    }

    pub fn with_parameters(mut self, parameters: Rc<dyn Any>) -> Self {
        self.parameters = Some(parameters);
        self
    }

    pub fn subscribed(mut self) -> Self {
        self.subscribe = true;
        self
    }

    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ServiceResponse) + 'static,
    {
        self.on_complete = Some(Rc::new(callback));
        self
    }
}

/// An in-flight request as issued by the request collaborator.
pub trait ServiceRequest {
    /// Best-effort cancellation.
    fn cancel(&self);
}

pub type RequestHandle = Rc<dyn ServiceRequest>;

/// Request collaborator.
pub trait RequestService {
    fn request(&self, url: &str, options: RequestOptions) -> RequestHandle;
}

struct InertRequest;

impl ServiceRequest for InertRequest {
    fn cancel(&self) {}
}

/// Request service whose requests never complete.
pub struct NullRequests;

impl RequestService for NullRequests {
    fn request(&self, _url: &str, _options: RequestOptions) -> RequestHandle {
        Rc::new(InertRequest)
    }
}

//=== Services ============================================================

/// The collaborator bundle shared by an application's stages and scenes.
#[derive(Clone)]
pub struct Services {
    pub view: Rc<dyn ViewProvider>,
    pub widgets: Rc<dyn WidgetHost>,
    pub loader: Rc<dyn SourceLoader>,
    pub requests: Rc<dyn RequestService>,
    pub host: Rc<dyn PlatformHost>,
    pub transitions: Rc<dyn TransitionEffects>,
}

impl Services {
    /// Collaborators that need no document: detached elements, no widgets,
    /// immediate loading, inert requests, a silent host, and timer-driven
    /// transitions on `run_loop`.
    pub fn headless(run_loop: &RunLoop) -> Self {
        Self {
            view: Rc::new(NullView),
            widgets: Rc::new(NullWidgets),
            loader: Rc::new(ImmediateLoader),
            requests: Rc::new(NullRequests),
            host: Rc::new(NullHost),
            transitions: Rc::new(TimedEffects::new(run_loop)),
        }
    }

    pub fn with_view(mut self, view: Rc<dyn ViewProvider>) -> Self {
        self.view = view;
        self
    }

    pub fn with_widgets(mut self, widgets: Rc<dyn WidgetHost>) -> Self {
        self.widgets = widgets;
        self
    }

    pub fn with_loader(mut self, loader: Rc<dyn SourceLoader>) -> Self {
        self.loader = loader;
        self
    }

    pub fn with_requests(mut self, requests: Rc<dyn RequestService>) -> Self {
        self.requests = requests;
        self
    }

    pub fn with_host(mut self, host: Rc<dyn PlatformHost>) -> Self {
        self.host = host;
        self
    }

    pub fn with_transitions(mut self, transitions: Rc<dyn TransitionEffects>) -> Self {
        self.transitions = transitions;
        self
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
