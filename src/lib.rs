//! Build Hyper-V machine images through a sequenced provisioning pipeline.
//!
//! ## Architecture
//!
//! ```text
//! ImageBuilder
//!   1. CreateTempDir             (scratch directory)
//!   2. OutputDir                 (export target)
//!   3. CreateSwitch              (ensure network attachment)
//!   4. CreateVm                  (New-VM with disk + switch)
//!   5. EnableIntegrationService  (guest service channel)
//!   6. MountDvd                  (attach install ISO)
//!   7. MountFloppy               (optional answer-file media)
//!   8. StartVm                   (power on)
//!   9. WaitForPowerOff           (poll until guest install finishes)
//!  10. ConfigureIp               (discover guest address)
//!  11. SetRemoting               (trust guest for remote management)
//!  12. Provision                 (user hook)
//!  13. ExportVm                  (write artifact)
//! ```
//!
//! Steps run strictly in order against one shared [`BuildState`]. Whatever
//! stops the pipeline (completion, a step halting, or cancellation), cleanup
//! runs for every started step in reverse order, and the builder maps the
//! terminal disposition into an [`Artifact`] or an error.
//!
//! The hypervisor is driven through the [`HypervDriver`] capability;
//! [`PowerShellDriver`] is the stock implementation.

pub mod artifact;
pub mod builder;
pub mod config;
pub mod driver;
pub mod errors;
pub mod hook;
pub mod pipeline;
pub mod state;
pub mod steps;
pub mod ui;

#[cfg(test)]
pub(crate) mod testing;

pub use artifact::Artifact;
pub use builder::ImageBuilder;
pub use config::BuildConfig;
pub use driver::{HypervDriver, PowerShellDriver};
pub use errors::{ForgeError, ForgeResult};
pub use hook::ProvisionHook;
pub use pipeline::{
    BoxedStep, CancelHandle, DebugPoint, PauseFn, Step, StepAction, StepRunner, WaitOptions,
    wait_for_condition,
};
pub use state::{BuildState, Disposition};
pub use ui::{TracingUi, Ui};
