//! Step: create the build's scratch directory.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::errors::ForgeError;
use crate::pipeline::{Step, StepAction};
use crate::state::BuildState;

/// Creates a scratch directory for files the build stages locally (the VM
/// home, staged floppy copies).
///
/// Produces `temp_dir` in build state.
#[derive(Default)]
pub struct StepCreateTempDir {
    path: Option<PathBuf>,
}

impl StepCreateTempDir {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Step for StepCreateTempDir {
    async fn run(&mut self, state: &mut BuildState) -> StepAction {
        let ui = state.ui();
        ui.say("Creating temporary directory...");

        let dir = match tempfile::Builder::new().prefix("hvforge").tempdir() {
            Ok(dir) => dir.keep(),
            Err(e) => {
                let err = ForgeError::Io(e);
                ui.error(&format!("error creating temporary directory: {}", err));
                state.fail(err);
                return StepAction::Halt;
            }
        };

        tracing::debug!(path = %dir.display(), "created scratch directory");
        self.path = Some(dir.clone());
        state.set_temp_dir(dir);
        StepAction::Continue
    }

    async fn cleanup(&mut self, state: &mut BuildState) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(e) = tokio::fs::remove_dir_all(path).await {
            state
                .ui()
                .error(&format!("error removing temporary directory: {}", e));
        }
    }

    fn name(&self) -> &str {
        "create_temp_dir"
    }
}
