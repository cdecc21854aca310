//! Step: prepare the output directory.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::errors::ForgeError;
use crate::pipeline::{Step, StepAction};
use crate::state::{BuildState, Disposition};

/// Creates the directory the finished VM is exported into.
///
/// Fails when the directory already exists, unless `force` is set, in which
/// case the old contents are deleted first. Cleanup removes the directory
/// only when the build did not succeed, so a failed or cancelled build
/// leaves no half-written artifact behind.
pub struct StepOutputDir {
    force: bool,
    path: PathBuf,
    created: bool,
}

impl StepOutputDir {
    pub fn new(path: PathBuf, force: bool) -> Self {
        Self {
            force,
            path,
            created: false,
        }
    }
}

#[async_trait]
impl Step for StepOutputDir {
    async fn run(&mut self, state: &mut BuildState) -> StepAction {
        let ui = state.ui();

        if self.path.exists() {
            if !self.force {
                let err = ForgeError::Config(format!(
                    "output directory already exists: {}",
                    self.path.display()
                ));
                ui.error(&err.to_string());
                state.fail(err);
                return StepAction::Halt;
            }
            ui.say("Deleting previous output directory...");
            if let Err(e) = tokio::fs::remove_dir_all(&self.path).await {
                let err = ForgeError::Io(e);
                ui.error(&format!("error deleting output directory: {}", err));
                state.fail(err);
                return StepAction::Halt;
            }
        }

        if let Err(e) = tokio::fs::create_dir_all(&self.path).await {
            let err = ForgeError::Io(e);
            ui.error(&format!("error creating output directory: {}", err));
            state.fail(err);
            return StepAction::Halt;
        }

        self.created = true;
        state.set_output_dir(self.path.clone());
        StepAction::Continue
    }

    async fn cleanup(&mut self, state: &mut BuildState) {
        if !self.created || state.disposition() == Disposition::Succeeded {
            return;
        }

        let ui = state.ui();
        ui.say("Deleting output directory...");
        if let Err(e) = tokio::fs::remove_dir_all(&self.path).await {
            ui.error(&format!("error deleting output directory: {}", e));
        }
    }

    fn name(&self) -> &str {
        "output_dir"
    }
}
