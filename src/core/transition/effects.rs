//=========================================================================
// Transition Effects
//=========================================================================
//
// The visual side of a scene transition, behind a collaborator trait.
//
// Architecture:
//   TransitionEffects::capture()  → Box<dyn TransitionEffect> (snapshot)
//   TransitionEffect::prepare()   → choose the scripted handoff
//   TransitionEffect::run(done)   → play it, call `done` once
//   TransitionEffect::discard()   → drop the snapshot unplayed
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

use log::trace;

//=== Internal Dependencies ===============================================

use super::TransitionType;
use crate::core::run_loop::RunLoop;

//=== Traits ==============================================================

/// Completion callback handed to [`TransitionEffect::run`].
pub type EffectDone = Box<dyn FnOnce()>;

/// One captured snapshot and the handoff that will be played from it.
pub trait TransitionEffect {
    fn prepare(&mut self, kind: &TransitionType, is_pop: bool);

    /// Plays the handoff and calls `done` exactly once when it finishes.
    fn run(self: Box<Self>, done: EffectDone);

    /// Releases the snapshot without playing anything.
    fn discard(self: Box<Self>);
}

/// Factory capturing a stage's current contents.
pub trait TransitionEffects {
    fn capture(&self, stage: &str, is_pop: bool) -> Box<dyn TransitionEffect>;
}

//=== TimedEffects ========================================================

/// Effects that only take time: each handoff completes from a run-loop
/// timer after its configured duration.
pub struct TimedEffects {
    run_loop: RunLoop,
    duration: Duration,
}

impl TimedEffects {
    /// Default handoff length for every type other than `None`.
    pub const DEFAULT_DURATION: Duration = Duration::from_millis(300);

    pub fn new(run_loop: &RunLoop) -> Self {
        Self {
            run_loop: run_loop.clone(),
            duration: Self::DEFAULT_DURATION,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

impl TransitionEffects for TimedEffects {
    fn capture(&self, stage: &str, is_pop: bool) -> Box<dyn TransitionEffect> {
        trace!(target: "transition", "Captured stage '{}' (pop: {})", stage, is_pop);
        Box::new(TimedEffect {
            run_loop: self.run_loop.clone(),
            duration: self.duration,
            length: Duration::ZERO,
        })
    }
}

struct TimedEffect {
    run_loop: RunLoop,
    duration: Duration,
    length: Duration,
}

impl TransitionEffect for TimedEffect {
    fn prepare(&mut self, kind: &TransitionType, _is_pop: bool) {
        self.length = match kind {
            TransitionType::None => Duration::ZERO,
            _ => self.duration,
        };
    }

    fn run(self: Box<Self>, done: EffectDone) {
        self.run_loop.set_timeout(self.length, done);
    }

    fn discard(self: Box<Self>) {}
}

//=========================================================================
// Unit Tests
//=========================================================================
