//! Progress reporting boundary.
//!
//! One-way, fire-and-forget. The pipeline never consumes a return value from
//! the sink, so implementations are free to buffer, drop, or reformat.

/// Sink for user-facing build progress and error messages.
pub trait Ui: Send + Sync {
    fn say(&self, message: &str);
    fn error(&self, message: &str);
}

/// Routes progress through the active `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingUi;

impl Ui for TracingUi {
    fn say(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!("{}", message);
    }
}
