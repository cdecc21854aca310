//! Sequential step-pipeline execution framework.
//!
//! ```text
//! Runner → Steps → BuildState
//!
//! - Runner: executes a fixed, ordered step list against one build state
//! - Step: unit of work with run (may halt) and best-effort cleanup
//! - BuildState: shared typed context the steps communicate through
//! ```
//!
//! Steps run strictly in order on a single logical thread of control.
//! Whatever stops the pipeline (completion, halt, or cancellation), cleanup
//! runs for every step whose `run` was invoked, in reverse execution order.

mod runner;
mod step;
mod wait;

pub use runner::{CancelHandle, DebugPoint, PauseFn, StepRunner};
pub use step::{BoxedStep, Step, StepAction};
pub use wait::{DEFAULT_POLL_INTERVAL, DEFAULT_SETTLE_DELAY, WaitOptions, wait_for_condition};
