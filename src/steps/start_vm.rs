//! Step: power the virtual machine on.

use async_trait::async_trait;

use crate::errors::ForgeError;
use crate::pipeline::{Step, StepAction};
use crate::state::BuildState;

/// Powers the VM on so the guest install can run.
///
/// Cleanup forces a power-off, but only for a VM this step started and only
/// when it is not already off (a successful build ends with the guest
/// shutting itself down).
#[derive(Default)]
pub struct StepStartVm {
    started: Option<String>,
}

impl StepStartVm {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Step for StepStartVm {
    async fn run(&mut self, state: &mut BuildState) -> StepAction {
        let ui = state.ui();
        let driver = state.driver();

        let vm_name = match state.vm_name() {
            Ok(name) => name.to_string(),
            Err(e) => {
                ui.error(&e.to_string());
                state.fail(e);
                return StepAction::Halt;
            }
        };

        ui.say("Starting the virtual machine...");
        let command = format!("Start-VM -Name {}", vm_name);
        if let Err(e) = driver.manage(&command).await {
            let err = ForgeError::Driver(format!("error starting virtual machine: {}", e));
            ui.error(&err.to_string());
            state.fail(err);
            return StepAction::Halt;
        }

        self.started = Some(vm_name);
        StepAction::Continue
    }

    async fn cleanup(&mut self, state: &mut BuildState) {
        let Some(vm_name) = &self.started else {
            return;
        };

        let ui = state.ui();
        let driver = state.driver();

        // Skip the forced stop when the guest already powered itself off.
        let check = format!(
            "(Get-VM -Name {}).State -eq [Microsoft.HyperV.PowerShell.VMState]::Off",
            vm_name
        );
        if let Ok(out) = driver.execute(&check).await
            && out.trim() == "True"
        {
            return;
        }

        ui.say("Forcing virtual machine to power off (cleanup)...");
        let command = format!("Stop-VM -Name {} -Force", vm_name);
        if let Err(e) = driver.manage(&command).await {
            ui.error(&format!("error stopping virtual machine: {}", e));
        }
    }

    fn name(&self) -> &str {
        "start_vm"
    }
}
