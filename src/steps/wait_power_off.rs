//! Step: wait for the guest install to power the VM off.

use async_trait::async_trait;

use crate::errors::ForgeError;
use crate::pipeline::{Step, StepAction, WaitOptions, wait_for_condition};
use crate::state::BuildState;

/// Blocks until the hypervisor reports the VM powered off, signalling that
/// the unattended guest install finished.
///
/// Creates no resource, so there is no cleanup.
pub struct StepWaitForPowerOff {
    opts: WaitOptions,
}

impl StepWaitForPowerOff {
    pub fn new(opts: WaitOptions) -> Self {
        Self { opts }
    }
}

#[async_trait]
impl Step for StepWaitForPowerOff {
    async fn run(&mut self, state: &mut BuildState) -> StepAction {
        let ui = state.ui();
        let driver = state.driver();
        let cancel = state.cancel_handle();

        let vm_name = match state.vm_name() {
            Ok(name) => name.to_string(),
            Err(e) => {
                ui.error(&e.to_string());
                state.fail(e);
                return StepAction::Halt;
            }
        };

        ui.say("Waiting for vm to be powered down...");
        let condition = format!(
            "(Get-VM -Name {}).State -eq [Microsoft.HyperV.PowerShell.VMState]::Off",
            vm_name
        );

        match wait_for_condition(driver.as_ref(), &condition, &self.opts, &cancel).await {
            Ok(()) => StepAction::Continue,
            Err(ForgeError::Cancelled) => {
                // The runner's cancel sentinel carries the disposition.
                state.mark_cancelled();
                StepAction::Halt
            }
            Err(err @ ForgeError::WaitTimeout { .. }) => {
                ui.error(&err.to_string());
                state.fail(err);
                StepAction::Halt
            }
            Err(e) => {
                let err = ForgeError::Driver(format!("error checking vm state: {}", e));
                ui.error(&err.to_string());
                state.fail(err);
                StepAction::Halt
            }
        }
    }

    fn name(&self) -> &str {
        "wait_power_off"
    }
}
