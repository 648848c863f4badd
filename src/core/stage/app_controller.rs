//=========================================================================
// App Controller
//=========================================================================
//
// Owner of an application's stages and of what they share: the run loop,
// the collaborator services, the scene registry and the stage config.
//
// Architecture:
//   AppController
//     ├─ SceneRegistry (shared by every stage)
//     └─ stages (creation order)
//          └─ StageController
//
// Host events enter through `handle_host_event` and are routed to the
// stage they name.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::{debug, error, info, warn};

//=== Internal Dependencies ===============================================

use super::config::StageConfig;
use super::stage_assistant::StageAssistant;
use super::stage_controller::{StageController, StageEnvironment, StageType};
use crate::core::commander::Event;
use crate::core::error::FrameworkError;
use crate::core::platform_bridge::HostEvent;
use crate::core::run_loop::RunLoop;
use crate::core::scene::{run_isolated, Notification, SceneDescriptor, SceneRegistry};
use crate::core::services::Services;

type StageClosedFn = Rc<dyn Fn(&StageController)>;

//=== AppController =======================================================

pub struct AppController {
    this: Weak<AppController>,
    environment: StageEnvironment,
    stages: RefCell<Vec<Rc<StageController>>>,
    on_stage_closed: RefCell<Option<StageClosedFn>>,
}

impl AppController {
    pub fn new(run_loop: &RunLoop, services: Services, config: StageConfig) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            environment: StageEnvironment {
                run_loop: run_loop.clone(),
                services,
                registry: Rc::new(SceneRegistry::new()),
                config,
            },
            stages: RefCell::new(Vec::new()),
            on_stage_closed: RefCell::new(None),
        })
    }

    //--- Scenes -----------------------------------------------------------

    pub fn registry(&self) -> &Rc<SceneRegistry> {
        &self.environment.registry
    }

    pub fn register_scene(&self, descriptor: SceneDescriptor) {
        self.environment.registry.register(descriptor);
    }

    //--- Stages -----------------------------------------------------------

    /// Creates and sets up a stage. Names are unique among open stages.
    pub fn create_stage(
        &self,
        name: &str,
        stage_type: StageType,
        assistant: StageAssistant,
    ) -> Result<Rc<StageController>, FrameworkError> {
        if self.get_stage_controller(name).is_some() {
            return Err(FrameworkError::StageExists(name.to_string()));
        }

        let stage = StageController::new(name, stage_type, self.environment.clone(), assistant);
        let app = self.this.clone();
        stage.set_on_closed(move |closed| {
            if let Some(app) = app.upgrade() {
                app.stage_closed(closed);
            }
        });

        self.stages.borrow_mut().push(Rc::clone(&stage));
        stage.setup();
        Ok(stage)
    }

    pub fn get_stage_controller(&self, name: &str) -> Option<Rc<StageController>> {
        self.stages
            .borrow()
            .iter()
            .find(|stage| stage.name() == name)
            .cloned()
    }

    /// Open stages in creation order.
    pub fn stages(&self) -> Vec<Rc<StageController>> {
        self.stages.borrow().clone()
    }

    /// Tears a stage down synchronously.
    pub fn close_stage(&self, name: &str) -> Result<(), FrameworkError> {
        let stage = self
            .get_stage_controller(name)
            .ok_or_else(|| FrameworkError::StageClosed(name.to_string()))?;
        stage.cleanup();
        Ok(())
    }

    /// Closes every stage, newest first.
    pub fn close_all(&self) {
        let stages = self.stages();
        for stage in stages.iter().rev() {
            stage.cleanup();
        }
    }

    /// Sets the callback run at the end of every stage teardown.
    pub fn on_stage_closed<F>(&self, callback: F)
    where
        F: Fn(&StageController) + 'static,
    {
        *self.on_stage_closed.borrow_mut() = Some(Rc::new(callback));
    }

    fn stage_closed(&self, stage: &StageController) {
        self.stages.borrow_mut().retain(|s| s.name() != stage.name());
        info!(target: "stage", "Stage '{}' closed, {} remaining", stage.name(), self.stages.borrow().len());

        let callback = self.on_stage_closed.borrow().clone();
        if let Some(callback) = callback {
            run_isolated("stage", stage.name(), "app cleanup", || {
                callback(stage);
                Ok(())
            });
        }
    }

    //--- Notifications ----------------------------------------------------

    /// Offers `notification` to each stage in turn; returns what is left
    /// once every stage has seen it, or `None` if one consumed it.
    pub fn send_to_notification_chain(&self, notification: Notification) -> Option<Notification> {
        let stages = self.stages();
        stages
            .iter()
            .try_fold(notification, |notification, stage| stage.consider_for_notification(notification))
    }

    //--- Host Events ------------------------------------------------------

    /// Routes one host event. Commander failures are logged here; an
    /// unknown stage is an error.
    pub fn handle_host_event(&self, event: HostEvent) -> Result<(), FrameworkError> {
        debug!(target: "platform", "Host event {:?}", event);
        match event {
            HostEvent::Key { stage, event } => {
                let stage = self.stage_for(&stage)?;
                if let Err(err) = stage.handle_key_event(&event) {
                    error!(target: "commander", "{}: key {:?} failed: {}", stage.name(), event.key, err);
                }
            }
            HostEvent::Tap { stage } => self.stage_for(&stage)?.handle_tap(),
            HostEvent::Focus { stage, focused } => {
                let stage = self.stage_for(&stage)?;
                if let Err(err) = stage.set_focused(focused) {
                    error!(target: "commander", "{}: focus change failed: {}", stage.name(), err);
                }
            }
            HostEvent::Orientation { stage, orientation } => {
                self.stage_for(&stage)?.set_orientation(orientation);
            }
            HostEvent::Command { stage, command } => {
                let stage = self.stage_for(&stage)?;
                if let Err(err) = stage.send_event_to_commanders(&mut Event::command(command.as_str())) {
                    error!(target: "commander", "{}: command '{}' failed: {}", stage.name(), command, err);
                }
            }
            HostEvent::WindowClosed { stage } => self.close_stage(&stage)?,
            HostEvent::Shutdown => {
                info!(target: "stage", "Shutdown requested");
                self.close_all();
            }
        }
        Ok(())
    }

    fn stage_for(&self, name: &str) -> Result<Rc<StageController>, FrameworkError> {
        self.get_stage_controller(name).ok_or_else(|| {
            warn!(target: "platform", "Host event for unknown stage '{}'", name);
            FrameworkError::StageClosed(name.to_string())
        })
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
