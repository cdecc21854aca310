//! Step: attach optional media to the floppy drive.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::errors::{ForgeError, ForgeResult};
use crate::pipeline::{Step, StepAction};
use crate::state::BuildState;

/// Attaches the configured floppy media, if any.
///
/// When no floppy is configured this step is a deliberate no-op that still
/// continues the pipeline. The hypervisor infers the media format from the
/// file extension, so the source is first staged as a `.vfd` copy under the
/// build's scratch directory. Cleanup detaches by attaching `$null` and
/// deletes the staged copy.
#[derive(Default)]
pub struct StepMountFloppy {
    floppy_path: Option<PathBuf>,
}

impl StepMountFloppy {
    pub fn new() -> Self {
        Self::default()
    }

    async fn stage_copy(source: &Path, scratch: &Path) -> ForgeResult<PathBuf> {
        let staged = scratch.join("floppy.vfd");
        tracing::debug!(from = %source.display(), to = %staged.display(), "staging floppy copy");
        tokio::fs::copy(source, &staged).await?;
        Ok(staged)
    }
}

#[async_trait]
impl Step for StepMountFloppy {
    async fn run(&mut self, state: &mut BuildState) -> StepAction {
        let Some(source) = state.floppy_source().map(Path::to_path_buf) else {
            tracing::debug!("no floppy disk, not attaching");
            return StepAction::Continue;
        };

        let ui = state.ui();
        let driver = state.driver();

        let scratch = match state.temp_dir() {
            Ok(dir) => dir.to_path_buf(),
            Err(e) => {
                ui.error(&e.to_string());
                state.fail(e);
                return StepAction::Halt;
            }
        };
        let staged = match Self::stage_copy(&source, &scratch).await {
            Ok(path) => path,
            Err(e) => {
                let err = ForgeError::Driver(format!("error preparing floppy: {}", e));
                ui.error(&err.to_string());
                state.fail(err);
                return StepAction::Halt;
            }
        };

        let vm_name = match state.vm_name() {
            Ok(name) => name.to_string(),
            Err(e) => {
                ui.error(&e.to_string());
                state.fail(e);
                return StepAction::Halt;
            }
        };

        ui.say("Mounting floppy drive...");
        let command = format!(
            "Set-VMFloppyDiskDrive -VMName {} -Path {}",
            vm_name,
            staged.display()
        );
        if let Err(e) = driver.manage(&command).await {
            let err = ForgeError::Driver(format!("error mounting floppy drive: {}", e));
            ui.error(&err.to_string());
            state.fail(err);
            return StepAction::Halt;
        }

        self.floppy_path = Some(staged);
        StepAction::Continue
    }

    async fn cleanup(&mut self, state: &mut BuildState) {
        let Some(staged) = &self.floppy_path else {
            return;
        };

        let ui = state.ui();
        ui.say("Unmounting floppy drive (cleanup)...");

        if let Ok(vm_name) = state.vm_name() {
            let command = format!("Set-VMFloppyDiskDrive -VMName {} -Path $null", vm_name);
            if let Err(e) = state.driver().manage(&command).await {
                ui.error(&format!("error unmounting floppy drive: {}", e));
            }
        }

        if let Err(e) = tokio::fs::remove_file(staged).await {
            ui.error(&format!("error unmounting floppy drive: {}", e));
        }
    }

    fn name(&self) -> &str {
        "mount_floppy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_state_with, FakeDriver};

    #[tokio::test]
    async fn no_floppy_is_a_noop_that_continues() {
        let driver = FakeDriver::shared();
        let mut state = test_state_with(|_| {}, driver.clone());
        let mut step = StepMountFloppy::new();

        assert_eq!(step.run(&mut state).await, StepAction::Continue);
        assert!(driver.executed().is_empty());
        assert!(driver.managed().is_empty());
        assert!(step.floppy_path.is_none());

        // Nothing recorded, cleanup is a no-op too.
        step.cleanup(&mut state).await;
        assert!(driver.managed().is_empty());
    }

    #[tokio::test]
    async fn stages_vfd_copy_and_mounts_it() {
        let scratch = tempfile::tempdir().unwrap();
        let source = scratch.path().join("answer-files.img");
        std::fs::write(&source, b"boot data").unwrap();

        let driver = FakeDriver::shared();
        let mut state = test_state_with(
            |c| c.floppy_path = Some(source.clone()),
            driver.clone(),
        );
        state.set_temp_dir(scratch.path().to_path_buf());
        state.set_vm_name("builder-01".into());

        let mut step = StepMountFloppy::new();
        assert_eq!(step.run(&mut state).await, StepAction::Continue);

        let staged = step.floppy_path.clone().unwrap();
        assert_eq!(staged.extension().unwrap(), "vfd");
        assert!(staged.is_file());

        let managed = driver.managed();
        assert_eq!(managed.len(), 1);
        assert!(managed[0].contains("Set-VMFloppyDiskDrive -VMName builder-01"));
        assert!(managed[0].contains("floppy.vfd"));
    }

    #[tokio::test]
    async fn cleanup_detaches_and_deletes_staged_copy() {
        let scratch = tempfile::tempdir().unwrap();
        let source = scratch.path().join("answer-files.img");
        std::fs::write(&source, b"boot data").unwrap();

        let driver = FakeDriver::shared();
        let mut state = test_state_with(
            |c| c.floppy_path = Some(source.clone()),
            driver.clone(),
        );
        state.set_temp_dir(scratch.path().to_path_buf());
        state.set_vm_name("builder-01".into());

        let mut step = StepMountFloppy::new();
        step.run(&mut state).await;
        let staged = step.floppy_path.clone().unwrap();

        step.cleanup(&mut state).await;

        let managed = driver.managed();
        assert_eq!(managed.len(), 2);
        assert!(managed[1].contains("-Path $null"));
        assert!(!staged.exists());
    }

    #[tokio::test]
    async fn missing_source_file_halts() {
        let scratch = tempfile::tempdir().unwrap();

        let driver = FakeDriver::shared();
        let mut state = test_state_with(
            |c| c.floppy_path = Some(scratch.path().join("missing.img")),
            driver.clone(),
        );
        state.set_temp_dir(scratch.path().to_path_buf());
        state.set_vm_name("builder-01".into());

        let mut step = StepMountFloppy::new();
        assert_eq!(step.run(&mut state).await, StepAction::Halt);
        assert!(
            state
                .error()
                .unwrap()
                .to_string()
                .contains("error preparing floppy")
        );
        assert!(driver.managed().is_empty());
    }
}
