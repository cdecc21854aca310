//! Step: export the finished VM into the output directory.

use async_trait::async_trait;

use crate::errors::ForgeError;
use crate::pipeline::{Step, StepAction};
use crate::state::BuildState;

/// Exports the powered-off VM into the output directory.
///
/// The output directory itself is owned by [`StepOutputDir`], which removes
/// it on failure, so this step has no cleanup of its own.
///
/// [`StepOutputDir`]: crate::steps::StepOutputDir
#[derive(Default)]
pub struct StepExportVm;

impl StepExportVm {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Step for StepExportVm {
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
        let output_dir = match state.output_dir() {
            Ok(dir) => dir.to_path_buf(),
            Err(e) => {
                ui.error(&e.to_string());
                state.fail(e);
                return StepAction::Halt;
            }
        };

        ui.say("Exporting virtual machine...");
        let command = format!(
            "Export-VM -Name '{}' -Path '{}'",
            vm_name,
            output_dir.display()
        );
        if let Err(e) = driver.manage(&command).await {
            let err = ForgeError::Driver(format!("error exporting virtual machine: {}", e));
            ui.error(&err.to_string());
            state.fail(err);
            return StepAction::Halt;
        }

        StepAction::Continue
    }

    fn name(&self) -> &str {
        "export_vm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_state_with, FakeDriver};
    use std::path::PathBuf;

    #[tokio::test]
    async fn exports_vm_into_output_directory() {
        let driver = FakeDriver::shared();
        let mut state = test_state_with(|_| {}, driver.clone());
        state.set_vm_name("builder-01".into());
        state.set_output_dir(PathBuf::from("/builds/out"));

        let mut step = StepExportVm::new();
        assert_eq!(step.run(&mut state).await, StepAction::Continue);

        let managed = driver.managed();
        assert_eq!(managed.len(), 1);
        assert!(managed[0].contains("Export-VM -Name 'builder-01' -Path '/builds/out'"));
    }

    #[tokio::test]
    async fn export_failure_halts() {
        let driver = FakeDriver::shared();
        driver.queue_manage(Err(ForgeError::Driver("disk full".into())));

        let mut state = test_state_with(|_| {}, driver.clone());
        state.set_vm_name("builder-01".into());
        state.set_output_dir(PathBuf::from("/builds/out"));

        let mut step = StepExportVm::new();
        assert_eq!(step.run(&mut state).await, StepAction::Halt);
        assert!(state.error().unwrap().to_string().contains("disk full"));
    }
}
