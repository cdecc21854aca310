//! Top-level image build orchestration.
//!
//! Validates configuration, assembles the fixed step list, runs it through
//! the pipeline runner, and maps the terminal disposition into either an
//! [`Artifact`] or an error.

use std::sync::Arc;
use std::time::Duration;

use crate::artifact::Artifact;
use crate::config::{BuildConfig, LOW_RAM_MB};
use crate::driver::HypervDriver;
use crate::errors::{ForgeError, ForgeResult};
use crate::hook::ProvisionHook;
use crate::pipeline::{BoxedStep, CancelHandle, PauseFn, StepRunner, WaitOptions};
use crate::state::BuildState;
use crate::steps::{
    StepConfigureIp, StepCreateSwitch, StepCreateTempDir, StepCreateVm,
    StepEnableIntegrationService, StepExportVm, StepMountDvd, StepMountFloppy, StepOutputDir,
    StepProvision, StepSetRemoting, StepStartVm, StepWaitForPowerOff,
};
use crate::ui::Ui;

/// Builds one Hyper-V machine image per invocation.
///
/// # Example
///
/// ```ignore
/// let builder = ImageBuilder::new(config)?;
/// let cancel = builder.cancel_handle();
/// let artifact = builder.run(driver, ui, None).await?;
/// ```
#[derive(Debug)]
pub struct ImageBuilder {
    config: BuildConfig,
    warnings: Vec<String>,
    cancel: CancelHandle,
    wait: WaitOptions,
}

impl ImageBuilder {
    /// Validate the configuration and prepare a builder.
    pub fn new(mut config: BuildConfig) -> ForgeResult<Self> {
        let warnings = config.prepare()?;
        let wait = WaitOptions::new(Duration::from_secs(config.install_timeout_secs));
        Ok(Self {
            config,
            warnings,
            cancel: CancelHandle::new(),
            wait,
        })
    }

    /// Override the wait cadence for the power-off poll loop.
    pub fn with_wait_options(mut self, wait: WaitOptions) -> Self {
        self.wait = wait;
        self
    }

    /// Handle for requesting cancellation from another task. Observed
    /// between steps and inside the power-off wait loop.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Run the build to completion.
    pub async fn run(
        &self,
        driver: Arc<dyn HypervDriver>,
        ui: Arc<dyn Ui>,
        hook: Option<Arc<dyn ProvisionHook>>,
    ) -> ForgeResult<Artifact> {
        self.run_inner(driver, ui, hook, None).await
    }

    /// Debug variant: pause for inspection between steps.
    pub async fn run_debug(
        &self,
        driver: Arc<dyn HypervDriver>,
        ui: Arc<dyn Ui>,
        hook: Option<Arc<dyn ProvisionHook>>,
        pause: PauseFn,
    ) -> ForgeResult<Artifact> {
        self.run_inner(driver, ui, hook, Some(pause)).await
    }

    async fn run_inner(
        &self,
        driver: Arc<dyn HypervDriver>,
        ui: Arc<dyn Ui>,
        hook: Option<Arc<dyn ProvisionHook>>,
        pause: Option<PauseFn>,
    ) -> ForgeResult<Artifact> {
        for warning in &self.warnings {
            ui.say(&format!("warning: {}", warning));
        }
        if let Some(warning) = check_host_memory(driver.as_ref(), self.config.ram_size_mb).await {
            ui.say(&warning);
        }

        let mut state = BuildState::new(
            self.config.clone(),
            driver,
            ui,
            hook,
            self.cancel.clone(),
        );

        let runner = match pause {
            Some(pause) => StepRunner::with_pause(self.cancel.clone(), pause),
            None => StepRunner::new(self.cancel.clone()),
        };
        runner.run(&mut state, self.step_list()).await;

        // Error outranks cancellation outranks a bare halt.
        if let Some(err) = state.take_error() {
            return Err(err);
        }
        if state.is_cancelled() {
            return Err(ForgeError::Cancelled);
        }
        if state.is_halted() {
            return Err(ForgeError::Halted);
        }

        Artifact::from_dir(&self.config.output_dir)
    }

    /// The fixed, ordered step list for one build. Optional steps (floppy,
    /// provisioning) are always present and gate themselves on build state.
    fn step_list(&self) -> Vec<BoxedStep> {
        vec![
            Box::new(StepCreateTempDir::new()),
            Box::new(StepOutputDir::new(
                self.config.output_dir.clone(),
                self.config.force,
            )),
            Box::new(StepCreateSwitch::new()),
            Box::new(StepCreateVm::new()),
            Box::new(StepEnableIntegrationService::new()),
            Box::new(StepMountDvd::new()),
            Box::new(StepMountFloppy::new()),
            Box::new(StepStartVm::new()),
            Box::new(StepWaitForPowerOff::new(self.wait.clone())),
            Box::new(StepConfigureIp::new()),
            Box::new(StepSetRemoting::new()),
            Box::new(StepProvision::new()),
            Box::new(StepExportVm::new()),
        ]
    }
}

/// Warn when the host looks too low on free memory for the configured VM.
///
/// Best-effort: a failed query also produces the warning, since the check
/// could not rule the problem out.
async fn check_host_memory(driver: &dyn HypervDriver, ram_size_mb: u32) -> Option<String> {
    const QUERY: &str = "(Get-WmiObject Win32_OperatingSystem).FreePhysicalMemory / 1024";
    const WARNING: &str =
        "Hyper-V might fail to create the VM if the host is low on free memory.";

    let free_mb = match driver.execute(QUERY).await {
        Ok(out) => match out.trim().parse::<f64>() {
            Ok(free) => free,
            Err(_) => return Some(WARNING.to_string()),
        },
        Err(_) => return Some(WARNING.to_string()),
    };

    (free_mb - f64::from(ram_size_mb) < f64::from(LOW_RAM_MB)).then(|| WARNING.to_string())
}
