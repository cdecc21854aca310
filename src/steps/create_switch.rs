//! Step: ensure the virtual switch exists.

use async_trait::async_trait;

use crate::errors::ForgeError;
use crate::pipeline::{Step, StepAction};
use crate::state::BuildState;

/// Ensures the configured virtual switch exists, creating an internal switch
/// when it does not.
///
/// Only a switch this build created is removed during cleanup; a
/// pre-existing switch is left alone.
#[derive(Default)]
pub struct StepCreateSwitch {
    created_name: Option<String>,
}

impl StepCreateSwitch {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Step for StepCreateSwitch {
    async fn run(&mut self, state: &mut BuildState) -> StepAction {
        let ui = state.ui();
        let driver = state.driver();
        let name = state.config().switch_name.clone();

        let check = format!(
            "(Get-VMSwitch -Name '{}' -ErrorAction SilentlyContinue) -ne $null",
            name
        );
        match driver.execute(&check).await {
            Ok(out) if out.trim() == "True" => {
                tracing::debug!(switch = %name, "virtual switch already exists");
                return StepAction::Continue;
            }
            Ok(_) => {}
            Err(e) => {
                let err = ForgeError::Driver(format!("error checking virtual switch: {}", e));
                ui.error(&err.to_string());
                state.fail(err);
                return StepAction::Halt;
            }
        }

        ui.say("Creating virtual switch...");
        let create = format!("New-VMSwitch -Name '{}' -SwitchType Internal", name);
        if let Err(e) = driver.manage(&create).await {
            let err = ForgeError::Driver(format!("error creating virtual switch: {}", e));
            ui.error(&err.to_string());
            state.fail(err);
            return StepAction::Halt;
        }

        self.created_name = Some(name);
        StepAction::Continue
    }

    async fn cleanup(&mut self, state: &mut BuildState) {
        let Some(name) = &self.created_name else {
            return;
        };

        let ui = state.ui();
        ui.say("Removing virtual switch...");
        let remove = format!("Remove-VMSwitch -Name '{}' -Force", name);
        if let Err(e) = state.driver().manage(&remove).await {
            ui.error(&format!("error removing virtual switch: {}", e));
        }
    }

    fn name(&self) -> &str {
        "create_switch"
    }
}
