//! Step: create the virtual machine.

use async_trait::async_trait;

use crate::errors::ForgeError;
use crate::pipeline::{Step, StepAction};
use crate::state::BuildState;

/// Creates the virtual machine with its system disk, attached to the
/// configured switch.
///
/// Produces `vm_name` in build state.
#[derive(Default)]
pub struct StepCreateVm {
    vm_name: Option<String>,
}

impl StepCreateVm {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Step for StepCreateVm {
    async fn run(&mut self, state: &mut BuildState) -> StepAction {
        let ui = state.ui();
        let driver = state.driver();
        ui.say("Creating virtual machine...");

        let (vm_name, ram, disk, switch) = {
            let config = state.config();
            (
                config.vm_name.clone(),
                config.ram_size_mb,
                config.disk_size_mb,
                config.switch_name.clone(),
            )
        };
        let path = match state.temp_dir() {
            Ok(path) => path.to_path_buf(),
            Err(e) => {
                ui.error(&e.to_string());
                state.fail(e);
                return StepAction::Halt;
            }
        };

        let command = format!(
            "Invoke-Command -scriptblock {{New-VM -Name '{vm}' -Path '{path}' \
             -MemoryStartupBytes {ram}MB -NewVHDPath '{path}/{vm}.vhdx' \
             -NewVHDSizeBytes {disk}MB -SwitchName '{switch}'}}",
            vm = vm_name,
            path = path.display(),
            ram = ram,
            disk = disk,
            switch = switch,
        );

        if let Err(e) = driver.manage(&command).await {
            let err = ForgeError::Driver(format!("error creating virtual machine: {}", e));
            ui.error(&err.to_string());
            state.fail(err);
            return StepAction::Halt;
        }

        // Only now is the resource confirmed created.
        if self.vm_name.is_none() {
            self.vm_name = Some(vm_name.clone());
        }
        state.set_vm_name(vm_name);
        StepAction::Continue
    }

    async fn cleanup(&mut self, state: &mut BuildState) {
        let Some(vm_name) = &self.vm_name else {
            return;
        };

        let ui = state.ui();
        ui.say("Unregistering and deleting virtual machine...");

        let command = format!(
            "Invoke-Command -scriptblock {{Remove-VM -Name '{}' -Force}}",
            vm_name
        );
        if let Err(e) = state.driver().manage(&command).await {
            ui.error(&format!("error deleting virtual machine: {}", e));
        }
    }

    fn name(&self) -> &str {
        "create_vm"
    }
}
