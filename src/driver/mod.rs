//! Hypervisor management channel.
//!
//! The pipeline treats command text as opaque: it is interpreted by the
//! external management layer, not by this crate. Each call is a single,
//! blocking external invocation with no internal retry; callers decide
//! whether a failure is fatal.

mod powershell;

pub use powershell::PowerShellDriver;

use async_trait::async_trait;

use crate::errors::ForgeResult;

/// Capability for issuing management commands to the virtualization host.
#[async_trait]
pub trait HypervDriver: Send + Sync {
    /// Run a management command and return its trimmed textual output.
    async fn execute(&self, command: &str) -> ForgeResult<String>;

    /// Run a management command, discarding any output.
    async fn manage(&self, command: &str) -> ForgeResult<()>;
}
