//! Sequential step runner with cooperative cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

use super::step::{BoxedStep, StepAction};
use crate::state::BuildState;

/// Shared cancellation flag.
///
/// Cloneable; any clone can request cancellation. The runner observes the
/// flag between steps, and long waits observe it inside their sleeps.
#[derive(Clone, Default)]
pub struct CancelHandle {
    inner: Arc<CancelInner>,
}

#[derive(Default)]
struct CancelInner {
    flag: AtomicBool,
    notify: Notify,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.flag.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.flag.load(Ordering::SeqCst)
    }

    /// Resolve once cancellation has been requested.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

impl std::fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelHandle")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Where a debug pause happens relative to the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugPoint {
    AfterRun,
    AfterCleanup,
}

/// Callback invoked between steps when running in debug mode.
pub type PauseFn = Box<dyn Fn(DebugPoint, &str) + Send + Sync>;

/// Executes an ordered step list against one build state.
///
/// Before each step the cancellation flag is checked; a pending request
/// stops the pipeline without running further steps. A step returning
/// [`StepAction::Halt`] stops it as well. On every exit path, cleanup runs
/// for exactly the steps whose `run` was invoked, newest first.
pub struct StepRunner {
    cancel: CancelHandle,
    pause: Option<PauseFn>,
}

impl StepRunner {
    pub fn new(cancel: CancelHandle) -> Self {
        Self {
            cancel,
            pause: None,
        }
    }

    /// Debug variant: pause for inspection after each run and each cleanup.
    pub fn with_pause(cancel: CancelHandle, pause: PauseFn) -> Self {
        Self {
            cancel,
            pause: Some(pause),
        }
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub async fn run(&self, state: &mut BuildState, mut steps: Vec<BoxedStep>) {
        let mut ran = 0;

        for step in steps.iter_mut() {
            if self.cancel.is_cancelled() {
                tracing::info!("cancellation requested, stopping pipeline");
                state.mark_cancelled();
                break;
            }

            tracing::debug!(step = step.name(), "running step");
            let action = step.run(state).await;
            ran += 1;

            if let Some(pause) = &self.pause {
                pause(DebugPoint::AfterRun, step.name());
            }

            if action == StepAction::Halt {
                tracing::debug!(step = step.name(), "step halted pipeline");
                state.mark_halted();
                break;
            }
        }

        for step in steps[..ran].iter_mut().rev() {
            tracing::debug!(step = step.name(), "cleaning up step");
            step.cleanup(state).await;
            if let Some(pause) = &self.pause {
                pause(DebugPoint::AfterCleanup, step.name());
            }
        }
    }
}
