//! Step: enable guest integration services on the VM.

use async_trait::async_trait;

use crate::errors::ForgeError;
use crate::pipeline::{Step, StepAction};
use crate::state::BuildState;

const SERVICE_NAME: &str = "Guest Service Interface";

/// Enables the guest service integration channel so the host can talk to the
/// guest once it boots.
///
/// The enablement lives and dies with the VM, so there is no cleanup of its
/// own.
#[derive(Default)]
pub struct StepEnableIntegrationService;

impl StepEnableIntegrationService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Step for StepEnableIntegrationService {
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

        ui.say("Enabling Integration Service...");
        let command = format!(
            "Enable-VMIntegrationService -VMName '{}' -Name '{}'",
            vm_name, SERVICE_NAME
        );
        if let Err(e) = driver.manage(&command).await {
            let err = ForgeError::Driver(format!("error enabling integration service: {}", e));
            ui.error(&err.to_string());
            state.fail(err);
            return StepAction::Halt;
        }

        StepAction::Continue
    }

    fn name(&self) -> &str {
        "enable_integration_service"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_state_with, FakeDriver};

    #[tokio::test]
    async fn enables_guest_service_interface() {
        let driver = FakeDriver::shared();
        let mut state = test_state_with(|_| {}, driver.clone());
        state.set_vm_name("builder-01".into());

        let mut step = StepEnableIntegrationService::new();
        assert_eq!(step.run(&mut state).await, StepAction::Continue);

        let managed = driver.managed();
        assert_eq!(managed.len(), 1);
        assert!(
            managed[0].contains(
                "Enable-VMIntegrationService -VMName 'builder-01' -Name 'Guest Service Interface'"
            )
        );
    }

    #[tokio::test]
    async fn enable_failure_halts_with_recorded_error() {
        let driver = FakeDriver::shared();
        driver.queue_manage(Err(ForgeError::Driver("service missing".into())));

        let mut state = test_state_with(|_| {}, driver.clone());
        state.set_vm_name("builder-01".into());

        let mut step = StepEnableIntegrationService::new();
        assert_eq!(step.run(&mut state).await, StepAction::Halt);
        assert!(
            state
                .error()
                .unwrap()
                .to_string()
                .contains("error enabling integration service")
        );
    }

    #[tokio::test]
    async fn missing_vm_is_an_ordering_error() {
        let driver = FakeDriver::shared();
        let mut state = test_state_with(|_| {}, driver.clone());

        let mut step = StepEnableIntegrationService::new();
        assert_eq!(step.run(&mut state).await, StepAction::Halt);
        assert!(driver.managed().is_empty());
    }
}
