//=========================================================================
// Deferred Scene Operations
//=========================================================================
//
// Queue of scene operations waiting for the next dispatch pass.
//
// Push/pop/swap requests land here; the stage drains the whole queue as
// one batch at the start of a pass. Requests made while a batch runs stay
// queued for the pass after it.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::scene::{PopOptions, ReturnValue, SceneArguments, SceneTarget};
use crate::core::transition::TransitionType;

//=== Scene Operations ====================================================

/// One requested change to a scene stack.
#[derive(Clone)]
pub enum SceneOperation {
    Push(SceneArguments),
    Swap(SceneArguments),
    Pop {
        return_value: Option<ReturnValue>,
    },
    PopTo {
        target: SceneTarget,
        return_value: Option<ReturnValue>,
    },
}

impl SceneOperation {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Push(_) => "push",
            Self::Swap(_) => "swap",
            Self::Pop { .. } => "pop",
            Self::PopTo { .. } => "popTo",
        }
    }
}

/// A queued operation with the transition it asked for.
#[derive(Clone)]
pub struct DeferredSceneOp {
    pub operation: SceneOperation,
    pub is_pop: bool,
    pub transition: Option<TransitionType>,
}

impl DeferredSceneOp {
    pub fn push(arguments: SceneArguments) -> Self {
        Self {
            transition: arguments.transition.clone(),
            operation: SceneOperation::Push(arguments),
            is_pop: false,
        }
    }

    pub fn swap(arguments: SceneArguments) -> Self {
        Self {
            transition: arguments.transition.clone(),
            operation: SceneOperation::Swap(arguments),
            is_pop: false,
        }
    }

    pub fn pop(return_value: Option<ReturnValue>, options: PopOptions) -> Self {
        Self {
            operation: SceneOperation::Pop { return_value },
            is_pop: true,
            transition: options.transition,
        }
    }

    pub fn pop_to(target: SceneTarget, return_value: Option<ReturnValue>, options: PopOptions) -> Self {
        Self {
            operation: SceneOperation::PopTo {
                target,
                return_value,
            },
            is_pop: true,
            transition: options.transition,
        }
    }

    /// Registry name of the scene this operation constructs, if any.
    pub fn scene_to_build(&self) -> Option<&str> {
        match &self.operation {
            SceneOperation::Push(arguments) | SceneOperation::Swap(arguments) => {
                Some(arguments.descriptor_name())
            }
            _ => None,
        }
    }
}

//=== DeferredOpQueue =====================================================

/// A drained batch: the operations, and the scenes whose sources they need.
pub struct DeferredBatch {
    pub ops: Vec<DeferredSceneOp>,
    pub scenes_needing_sources: Vec<String>,
}

impl DeferredBatch {
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

#[derive(Default)]
pub struct DeferredOpQueue {
    ops: Vec<DeferredSceneOp>,
    scenes_needing_sources: Vec<String>,
}

impl DeferredOpQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: DeferredSceneOp) {
        if let Some(name) = op.scene_to_build() {
            self.scenes_needing_sources.push(name.to_string());
        }
        self.ops.push(op);
    }

    /// Takes everything queued so far, leaving the queue empty.
    pub fn take_batch(&mut self) -> DeferredBatch {
        DeferredBatch {
            ops: std::mem::take(&mut self.ops),
            scenes_needing_sources: std::mem::take(&mut self.scenes_needing_sources),
        }
    }

    pub fn clear(&mut self) {
        self.ops.clear();
        self.scenes_needing_sources.clear();
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operations_carry_their_transition() {
        let push = DeferredSceneOp::push(SceneArguments::new("b").with_transition(TransitionType::CrossFade));
        assert_eq!(push.transition, Some(TransitionType::CrossFade));
        assert!(!push.is_pop);

        let pop = DeferredSceneOp::pop(None, PopOptions::with_transition(TransitionType::None));
        assert_eq!(pop.transition, Some(TransitionType::None));
        assert!(pop.is_pop);
        assert_eq!(pop.operation.label(), "pop");
    }

    #[test]
    fn take_batch_drains_fifo_with_needed_scenes() {
        let mut queue = DeferredOpQueue::new();
        queue.push(DeferredSceneOp::push("a".into()));
        queue.push(DeferredSceneOp::pop(None, PopOptions::default()));
        queue.push(DeferredSceneOp::swap(SceneArguments::new("c").with_assistant("shared")));
        assert_eq!(queue.len(), 3);

        let batch = queue.take_batch();
        assert!(queue.is_empty());
        let labels: Vec<_> = batch.ops.iter().map(|op| op.operation.label()).collect();
        assert_eq!(labels, vec!["push", "pop", "swap"]);
        assert_eq!(batch.scenes_needing_sources, vec!["a".to_string(), "shared".to_string()]);
    }
}
