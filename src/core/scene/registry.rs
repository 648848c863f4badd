//=========================================================================
// Scene Registry
//=========================================================================
//
// Declarations of the scenes an application can push, and the arguments
// that name one of them.
//
// Architecture:
//   SceneRegistry: name → SceneDescriptor (factory, template, sources, …)
//   SceneArguments: what push_scene/swap_scene receive
//   SceneTarget:    what pop_scenes_to looks for
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use log::warn;

//=== Internal Dependencies ===============================================

use super::{SceneAssistant, SceneController};
use crate::core::error::HookError;
use crate::core::transition::TransitionType;

//=== SceneDescriptor =====================================================

/// Builds the assistant of a new scene instance.
pub type AssistantFactory = Rc<dyn Fn(&SceneArguments) -> Result<SceneAssistant, HookError>>;

/// Everything the framework needs to construct one kind of scene.
#[derive(Clone)]
pub struct SceneDescriptor {
    name: String,
    factory: AssistantFactory,
    template: String,
    sources: Vec<String>,
    default_transition: TransitionType,
    full_screen: bool,
    scroller: bool,
    focus_advance: bool,
}

impl SceneDescriptor {
    //--- Construction -----------------------------------------------------

    /// Declares scene `name`, whose template defaults to
    /// `"<name>/<name>-scene"`.
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&SceneArguments) -> Result<SceneAssistant, HookError> + 'static,
    {
        let name = name.into();
        Self {
            template: format!("{name}/{name}-scene"),
            name,
            factory: Rc::new(factory),
            sources: Vec::new(),
            default_transition: TransitionType::ZoomFade,
            full_screen: false,
            scroller: true,
            focus_advance: true,
        }
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    /// Source files that must be loaded before the scene can be built.
    pub fn with_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources = sources.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_default_transition(mut self, transition: TransitionType) -> Self {
        self.default_transition = transition;
        self
    }

    pub fn full_screen(mut self, enabled: bool) -> Self {
        self.full_screen = enabled;
        self
    }

    pub fn with_scroller(mut self, enabled: bool) -> Self {
        self.scroller = enabled;
        self
    }

    pub fn with_focus_advance(mut self, enabled: bool) -> Self {
        self.focus_advance = enabled;
        self
    }

    //--- Accessors --------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn default_transition(&self) -> &TransitionType {
        &self.default_transition
    }

    pub fn is_full_screen(&self) -> bool {
        self.full_screen
    }

    pub fn has_scroller(&self) -> bool {
        self.scroller
    }

    pub fn has_focus_advance(&self) -> bool {
        self.focus_advance
    }

    pub(crate) fn build_assistant(&self, arguments: &SceneArguments) -> Result<SceneAssistant, HookError> {
        (self.factory)(arguments)
    }
}

impl fmt::Debug for SceneDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneDescriptor")
            .field("name", &self.name)
            .field("template", &self.template)
            .field("sources", &self.sources)
            .field("default_transition", &self.default_transition)
            .finish_non_exhaustive()
    }
}

//=== SceneRegistry =======================================================

/// Scene declarations shared by every stage of an application.
#[derive(Default)]
pub struct SceneRegistry {
    scenes: RefCell<HashMap<String, Rc<SceneDescriptor>>>,
}

impl SceneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `descriptor` under its name, replacing an earlier one.
    pub fn register(&self, descriptor: SceneDescriptor) {
        let name = descriptor.name.clone();
        if self
            .scenes
            .borrow_mut()
            .insert(name.clone(), Rc::new(descriptor))
            .is_some()
        {
            warn!(target: "scene", "Scene '{}' was already registered and has been replaced", name);
        }
    }

    pub fn get(&self, name: &str) -> Option<Rc<SceneDescriptor>> {
        self.scenes.borrow().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.scenes.borrow().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.scenes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.borrow().is_empty()
    }
}

//=== SceneArguments ======================================================

/// Names the scene to push or swap in, with per-push options.
#[derive(Clone)]
pub struct SceneArguments {
    pub name: String,
    pub id: String,
    pub transition: Option<TransitionType>,

    /// Registry entry whose assistant to build, when not `name`.
    pub assistant_name: Option<String>,

    /// Parameters handed to the assistant factory.
    pub params: Option<Rc<dyn Any>>,

    pub disable_scroller: bool,
}

impl SceneArguments {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            transition: None,
            assistant_name: None,
            params: None,
            disable_scroller: false,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_transition(mut self, transition: TransitionType) -> Self {
        self.transition = Some(transition);
        self
    }

    pub fn with_assistant(mut self, assistant_name: impl Into<String>) -> Self {
        self.assistant_name = Some(assistant_name.into());
        self
    }

    pub fn with_params(mut self, params: Rc<dyn Any>) -> Self {
        self.params = Some(params);
        self
    }

    pub fn without_scroller(mut self) -> Self {
        self.disable_scroller = true;
        self
    }

    /// Registry key the scene is built from.
    pub fn descriptor_name(&self) -> &str {
        self.assistant_name.as_deref().unwrap_or(&self.name)
    }
}

impl From<&str> for SceneArguments {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for SceneArguments {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl fmt::Debug for SceneArguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneArguments")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("transition", &self.transition)
            .field("assistant_name", &self.assistant_name)
            .field("has_params", &self.params.is_some())
            .field("disable_scroller", &self.disable_scroller)
            .finish()
    }
}

//=== SceneTarget =========================================================

/// The scene `pop_scenes_to` stops at.
#[derive(Clone)]
pub enum SceneTarget {
    /// That exact scene instance.
    Scene(Rc<SceneController>),

    /// The first scene whose name or id equals the key.
    Key(String),
}

impl SceneTarget {
    pub fn matches(&self, scene: &Rc<SceneController>) -> bool {
        match self {
            Self::Scene(target) => Rc::ptr_eq(target, scene),
            Self::Key(key) => scene.name() == key || scene.id() == key,
        }
    }
}

impl From<&str> for SceneTarget {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for SceneTarget {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<&Rc<SceneController>> for SceneTarget {
    fn from(scene: &Rc<SceneController>) -> Self {
        Self::Scene(Rc::clone(scene))
    }
}

impl fmt::Debug for SceneTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scene(scene) => f.debug_tuple("Scene").field(&scene.name()).finish(),
            Self::Key(key) => f.debug_tuple("Key").field(key).finish(),
        }
    }
}

//=== PopOptions ==========================================================

/// Per-operation options of a pop.
#[derive(Debug, Clone, Default)]
pub struct PopOptions {
    pub transition: Option<TransitionType>,
}

impl PopOptions {
    pub fn with_transition(transition: TransitionType) -> Self {
        Self {
            transition: Some(transition),
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(_: &SceneArguments) -> Result<SceneAssistant, HookError> {
        Ok(SceneAssistant::new())
    }

    #[test]
    fn descriptor_defaults() {
        let descriptor = SceneDescriptor::new("main", plain);
        assert_eq!(descriptor.template(), "main/main-scene");
        assert_eq!(descriptor.default_transition(), &TransitionType::ZoomFade);
        assert!(descriptor.sources().is_empty());
        assert!(descriptor.has_scroller());
        assert!(!descriptor.is_full_screen());
    }

    #[test]
    fn registry_replaces_duplicates() {
        let registry = SceneRegistry::new();
        registry.register(SceneDescriptor::new("main", plain));
        registry.register(SceneDescriptor::new("main", plain).with_template("custom"));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("main").map(|d| d.template().to_string()), Some("custom".into()));
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn string_shorthand_defaults_id_to_name() {
        let args = SceneArguments::from("detail");
        assert_eq!(args.name, "detail");
        assert_eq!(args.id, "detail");
        assert_eq!(args.descriptor_name(), "detail");

        let args = SceneArguments::new("detail").with_id("detail-2").with_assistant("shared");
        assert_eq!(args.id, "detail-2");
        assert_eq!(args.descriptor_name(), "shared");
    }

    #[test]
    fn sources_accept_any_strings() {
        let descriptor = SceneDescriptor::new("list", plain)
            .with_sources(["app/assistants/list-assistant.js", "app/models/list.js"]);
        assert_eq!(descriptor.sources().len(), 2);
    }
}
