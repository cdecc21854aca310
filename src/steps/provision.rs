//! Step: run the user-supplied provisioning hook.

use async_trait::async_trait;

use crate::pipeline::{Step, StepAction};
use crate::state::BuildState;

/// Invokes the provisioning hook, if one was supplied.
///
/// Without a hook this step continues without side effects. A hook error
/// halts the build with that error recorded.
#[derive(Default)]
pub struct StepProvision;

impl StepProvision {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Step for StepProvision {
    async fn run(&mut self, state: &mut BuildState) -> StepAction {
        let Some(hook) = state.hook() else {
            tracing::debug!("no provisioner configured, skipping");
            return StepAction::Continue;
        };

        let ui = state.ui();
        let driver = state.driver();

        ui.say("Provisioning the virtual machine...");
        if let Err(e) = hook.provision(ui.as_ref(), driver.as_ref()).await {
            ui.error(&format!("provisioning failed: {}", e));
            state.fail(e);
            return StepAction::Halt;
        }

        StepAction::Continue
    }

    fn name(&self) -> &str {
        "provision"
    }
}
