//! Step: trust the guest's address for remote management.

use async_trait::async_trait;

use crate::errors::ForgeError;
use crate::pipeline::{Step, StepAction};
use crate::state::BuildState;

/// Adds the guest's address to the host's trusted-hosts list so remote
/// management sessions (and the provisioning hook) can reach it.
#[derive(Default)]
pub struct StepSetRemoting;

impl StepSetRemoting {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Step for StepSetRemoting {
    async fn run(&mut self, state: &mut BuildState) -> StepAction {
        let ui = state.ui();
        let driver = state.driver();

        let ip = match state.guest_ip() {
            Ok(ip) => ip.to_string(),
            Err(e) => {
                ui.error(&e.to_string());
                state.fail(e);
                return StepAction::Halt;
            }
        };

        ui.say("Setting up remoting...");
        let command = format!(
            "Set-Item -Path WSMan:\\localhost\\Client\\TrustedHosts -Value '{}' -Force",
            ip
        );
        if let Err(e) = driver.manage(&command).await {
            let err = ForgeError::Driver(format!("error setting up remoting: {}", e));
            ui.error(&err.to_string());
            state.fail(err);
            return StepAction::Halt;
        }

        StepAction::Continue
    }

    fn name(&self) -> &str {
        "set_remoting"
    }
}
