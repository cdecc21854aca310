//! Crate-wide error and result types.

use std::time::Duration;
use thiserror::Error;

pub type ForgeResult<T> = std::result::Result<T, ForgeError>;

/// Errors surfaced by the build pipeline and its collaborators.
#[derive(Debug, Error)]
pub enum ForgeError {
    /// Invalid or incomplete build configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The hypervisor management channel failed or rejected a command.
    #[error("driver error: {0}")]
    Driver(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A bounded wait expired before the monitored condition became true.
    #[error("timed out after {timeout:?} waiting for condition: {condition}")]
    WaitTimeout { condition: String, timeout: Duration },

    /// The build was cancelled by an external request.
    #[error("build was cancelled")]
    Cancelled,

    /// A step halted the pipeline without recording a more specific error.
    #[error("build was halted")]
    Halted,

    #[error("internal error: {0}")]
    Internal(String),
}
