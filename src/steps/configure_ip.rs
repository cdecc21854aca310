//! Step: discover the guest's IP address.

use async_trait::async_trait;

use crate::errors::ForgeError;
use crate::pipeline::{Step, StepAction};
use crate::state::BuildState;

/// Queries the hypervisor for the address the guest's network adapter
/// reported and publishes it for the remoting setup and the provisioning
/// hook.
///
/// Produces `guest_ip` in build state. Queries only, so no cleanup.
#[derive(Default)]
pub struct StepConfigureIp;

impl StepConfigureIp {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Step for StepConfigureIp {
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

        ui.say("Configuring ip address...");
        let command = format!(
            "(Get-VMNetworkAdapter -VMName '{}').IpAddresses[0]",
            vm_name
        );
        let ip = match driver.execute(&command).await {
            Ok(out) => out.trim().to_string(),
            Err(e) => {
                let err = ForgeError::Driver(format!("error configuring ip address: {}", e));
                ui.error(&err.to_string());
                state.fail(err);
                return StepAction::Halt;
            }
        };
        if ip.is_empty() {
            let err = ForgeError::Driver(
                "error configuring ip address: no address reported for adapter".into(),
            );
            ui.error(&err.to_string());
            state.fail(err);
            return StepAction::Halt;
        }

        tracing::debug!(ip = %ip, "guest reported address");
        state.set_guest_ip(ip);
        StepAction::Continue
    }

    fn name(&self) -> &str {
        "configure_ip"
    }
}
