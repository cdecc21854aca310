//! Concrete provisioning steps.
//!
//! Each step issues management commands through the driver and records any
//! resource it created in a field of its own, so its cleanup removes exactly
//! what it made. The order they run in is assembled by
//! [`ImageBuilder`](crate::builder::ImageBuilder).

mod configure_ip;
mod create_switch;
mod create_vm;
mod export_vm;
mod integration_service;
mod mount_dvd;
mod mount_floppy;
mod output_dir;
mod provision;
mod set_remoting;
mod start_vm;
mod temp_dir;
mod wait_power_off;

pub use configure_ip::StepConfigureIp;
pub use create_switch::StepCreateSwitch;
pub use create_vm::StepCreateVm;
pub use export_vm::StepExportVm;
pub use integration_service::StepEnableIntegrationService;
pub use mount_dvd::StepMountDvd;
pub use mount_floppy::StepMountFloppy;
pub use output_dir::StepOutputDir;
pub use provision::StepProvision;
pub use set_remoting::StepSetRemoting;
pub use start_vm::StepStartVm;
pub use temp_dir::StepCreateTempDir;
pub use wait_power_off::StepWaitForPowerOff;
