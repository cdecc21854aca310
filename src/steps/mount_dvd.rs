//! Step: attach the install ISO to the DVD drive.

use async_trait::async_trait;

use crate::errors::ForgeError;
use crate::pipeline::{Step, StepAction};
use crate::state::BuildState;

/// Attaches the configured install ISO to the VM's DVD drive.
///
/// Cleanup detaches the media by attaching `$null`.
#[derive(Default)]
pub struct StepMountDvd {
    mounted: bool,
}

impl StepMountDvd {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Step for StepMountDvd {
    async fn run(&mut self, state: &mut BuildState) -> StepAction {
        let ui = state.ui();
        let driver = state.driver();

        let Some(iso_path) = state.config().iso_path.clone() else {
            let err = ForgeError::Internal("iso_path missing after config prepare".into());
            ui.error(&err.to_string());
            state.fail(err);
            return StepAction::Halt;
        };
        let vm_name = match state.vm_name() {
            Ok(name) => name.to_string(),
            Err(e) => {
                ui.error(&e.to_string());
                state.fail(e);
                return StepAction::Halt;
            }
        };

        ui.say("Mounting dvd drive...");
        let command = format!(
            "Set-VMDvdDrive -VMName {} -Path {}",
            vm_name,
            iso_path.display()
        );
        if let Err(e) = driver.manage(&command).await {
            let err = ForgeError::Driver(format!("error mounting dvd drive: {}", e));
            ui.error(&err.to_string());
            state.fail(err);
            return StepAction::Halt;
        }

        self.mounted = true;
        StepAction::Continue
    }

    async fn cleanup(&mut self, state: &mut BuildState) {
        if !self.mounted {
            return;
        }
        let Ok(vm_name) = state.vm_name() else {
            return;
        };
        let vm_name = vm_name.to_string();

        let ui = state.ui();
        ui.say("Unmounting dvd drive (cleanup)...");
        let command = format!("Set-VMDvdDrive -VMName {} -Path $null", vm_name);
        if let Err(e) = state.driver().manage(&command).await {
            ui.error(&format!("error unmounting dvd drive: {}", e));
        }
    }

    fn name(&self) -> &str {
        "mount_dvd"
    }
}
