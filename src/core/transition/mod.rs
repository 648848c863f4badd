//=========================================================================
// Scene Transition
//=========================================================================
//
// State machine around one visual handoff between two scenes.
//
//   Created ──set_transition_type()──> Prepared ──run()──> Running ──> Complete
//      │                                  │                   │
//      └──────────── cleanup() ───────────┴───────────────────┴──> Discarded
//
// The snapshot is taken at construction; the stage drops input while a
// transition exists.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use log::debug;

//=== Internal Dependencies ===============================================

use crate::core::error::FrameworkError;

//=== Module Declarations =================================================

mod effects;

//=== Public API ==========================================================

pub use effects::{EffectDone, TimedEffects, TransitionEffect, TransitionEffects};

//=== TransitionType ======================================================

/// Which scripted handoff to play.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum TransitionType {
    #[default]
    None,
    CrossFade,
    ZoomFade,
    Custom(String),
}

impl TransitionType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::None => "none",
            Self::CrossFade => "crossFade",
            Self::ZoomFade => "zoomFade",
            Self::Custom(name) => name,
        }
    }
}

impl From<&str> for TransitionType {
    fn from(name: &str) -> Self {
        match name {
            "none" => Self::None,
            "crossFade" => Self::CrossFade,
            "zoomFade" => Self::ZoomFade,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl fmt::Display for TransitionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//=== TransitionState =====================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionState {
    Created,
    Prepared,
    Running,
    Complete,
    Discarded,
}

//=== Transition ==========================================================

/// One in-flight transition of a stage.
pub struct Transition {
    state: Cell<TransitionState>,
    kind: RefCell<TransitionType>,
    is_pop: Cell<bool>,
    effect: RefCell<Option<Box<dyn TransitionEffect>>>,
}

impl Transition {
    /// Captures the current contents of `stage`.
    pub fn capture(effects: &dyn TransitionEffects, stage: &str, is_pop: bool) -> Rc<Self> {
        Rc::new(Self {
            state: Cell::new(TransitionState::Created),
            kind: RefCell::new(TransitionType::None),
            is_pop: Cell::new(is_pop),
            effect: RefCell::new(Some(effects.capture(stage, is_pop))),
        })
    }

    /// Selects the handoff. Allowed until the transition starts running.
    pub fn set_transition_type(
        &self,
        kind: TransitionType,
        is_pop: bool,
    ) -> Result<(), FrameworkError> {
        match self.state.get() {
            TransitionState::Created | TransitionState::Prepared => {}
            state => {
                return Err(FrameworkError::TransitionState {
                    action: "change type",
                    state,
                })
            }
        }

        if let Some(effect) = self.effect.borrow_mut().as_mut() {
            effect.prepare(&kind, is_pop);
        }
        *self.kind.borrow_mut() = kind;
        self.is_pop.set(is_pop);
        self.state.set(TransitionState::Prepared);
        Ok(())
    }

    /// Plays the handoff; `on_complete` runs exactly once when it ends,
    /// unless the transition was discarded first.
    pub fn run<F>(self: &Rc<Self>, on_complete: F) -> Result<(), FrameworkError>
    where
        F: FnOnce() + 'static,
    {
        let state = self.state.get();
        if state != TransitionState::Prepared {
            return Err(FrameworkError::TransitionState { action: "run", state });
        }
        let Some(effect) = self.effect.borrow_mut().take() else {
            return Err(FrameworkError::TransitionState { action: "run", state });
        };

        debug!(target: "transition", "Running {} (pop: {})", self.kind.borrow(), self.is_pop.get());
        self.state.set(TransitionState::Running);

        let this = Rc::clone(self);
        effect.run(Box::new(move || {
            if this.state.get() != TransitionState::Running {
                debug!(target: "transition", "Completion after discard ignored");
                return;
            }
            this.state.set(TransitionState::Complete);
            on_complete();
        }));
        Ok(())
    }

    /// Releases the snapshot without playing it; a running handoff's
    /// completion is swallowed.
    pub fn cleanup(&self) {
        if let Some(effect) = self.effect.borrow_mut().take() {
            effect.discard();
        }
        if self.state.get() != TransitionState::Complete {
            self.state.set(TransitionState::Discarded);
        }
    }

    //--- Query API --------------------------------------------------------

    pub fn state(&self) -> TransitionState {
        self.state.get()
    }

    pub fn kind(&self) -> TransitionType {
        self.kind.borrow().clone()
    }

    pub fn is_pop(&self) -> bool {
        self.is_pop.get()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::run_loop::RunLoop;
    use std::time::Duration;

    fn timed(run_loop: &RunLoop) -> TimedEffects {
        TimedEffects::new(run_loop).with_duration(Duration::from_millis(50))
    }

    #[test]
    fn transition_type_parses_known_names() {
        assert_eq!(TransitionType::from("crossFade"), TransitionType::CrossFade);
        assert_eq!(TransitionType::from("zoomFade"), TransitionType::ZoomFade);
        assert_eq!(TransitionType::from("none"), TransitionType::None);
        assert_eq!(TransitionType::from("slide"), TransitionType::Custom("slide".into()));
        assert_eq!(TransitionType::CrossFade.to_string(), "crossFade");
    }

    #[test]
    fn run_requires_prepared_state() {
        let run_loop = RunLoop::new();
        let transition = Transition::capture(&timed(&run_loop), "main", false);
        assert_eq!(transition.state(), TransitionState::Created);

        let err = transition.run(|| {}).unwrap_err();
        assert!(matches!(
            err,
            FrameworkError::TransitionState { action: "run", state: TransitionState::Created }
        ));
    }

    #[test]
    fn full_lifecycle_invokes_completion_once() {
        let run_loop = RunLoop::new();
        let transition = Transition::capture(&timed(&run_loop), "main", false);
        transition.set_transition_type(TransitionType::CrossFade, false).unwrap();
        assert_eq!(transition.state(), TransitionState::Prepared);

        let count = Rc::new(Cell::new(0));
        let sink = Rc::clone(&count);
        transition.run(move || sink.set(sink.get() + 1)).unwrap();
        assert_eq!(transition.state(), TransitionState::Running);

        run_loop.advance(Duration::from_millis(50));
        assert_eq!(transition.state(), TransitionState::Complete);
        assert_eq!(count.get(), 1);

        assert!(transition.run(|| {}).is_err());
        assert!(transition.set_transition_type(TransitionType::None, false).is_err());
    }

    #[test]
    fn cleanup_before_run_discards_snapshot() {
        let run_loop = RunLoop::new();
        let transition = Transition::capture(&timed(&run_loop), "main", true);
        transition.set_transition_type(TransitionType::ZoomFade, true).unwrap();

        transition.cleanup();
        assert_eq!(transition.state(), TransitionState::Discarded);
        assert!(transition.run(|| {}).is_err());
    }

    #[test]
    fn cleanup_while_running_swallows_completion() {
        let run_loop = RunLoop::new();
        let transition = Transition::capture(&timed(&run_loop), "main", false);
        transition.set_transition_type(TransitionType::CrossFade, false).unwrap();

        let fired = Rc::new(Cell::new(false));
        let sink = Rc::clone(&fired);
        transition.run(move || sink.set(true)).unwrap();
        transition.cleanup();

        run_loop.advance(Duration::from_millis(100));
        assert!(!fired.get());
        assert_eq!(transition.state(), TransitionState::Discarded);
    }
}
