//! Step contract for pipeline execution.

use async_trait::async_trait;

use crate::state::BuildState;

/// Outcome of a step's `run`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction {
    /// Advance to the next step.
    Continue,
    /// Stop the pipeline. The step must already have recorded an error in
    /// the build state (or marked it cancelled) before returning this.
    Halt,
}

/// A unit of provisioning work.
///
/// A step that creates an external resource records it in a field of its own
/// only after creation is confirmed, so `cleanup` can remove exactly what
/// `run` made. `cleanup` is best-effort: failures are reported through the
/// UI sink and never alter the build's disposition.
#[async_trait]
pub trait Step: Send {
    async fn run(&mut self, state: &mut BuildState) -> StepAction;

    /// Tear down whatever `run` created. No-op by default.
    async fn cleanup(&mut self, state: &mut BuildState) {
        let _ = state;
    }

    /// Human-readable step name for logging.
    fn name(&self) -> &str;
}

pub type BoxedStep = Box<dyn Step>;
