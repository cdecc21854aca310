//! Shared build state.
//!
//! One instance per build, owned by the runner's caller and lent mutably to
//! each step in turn. Slots follow a publish-once, read-many discipline: a
//! producing step sets a slot exactly once and later steps read it. Reading a
//! slot before its producer ran is an ordering bug and surfaces as an
//! internal error.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::BuildConfig;
use crate::driver::HypervDriver;
use crate::errors::{ForgeError, ForgeResult};
use crate::hook::ProvisionHook;
use crate::pipeline::CancelHandle;
use crate::ui::Ui;

/// Terminal outcome of a pipeline run.
///
/// Exactly one of these describes the build once the runner returns; a
/// recorded error takes priority over cancellation, which takes priority
/// over a bare halt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Succeeded,
    Failed,
    Cancelled,
    Halted,
}

pub struct BuildState {
    config: BuildConfig,
    driver: Arc<dyn HypervDriver>,
    ui: Arc<dyn Ui>,
    hook: Option<Arc<dyn ProvisionHook>>,
    cancel: CancelHandle,

    temp_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    vm_name: Option<String>,
    guest_ip: Option<String>,

    error: Option<ForgeError>,
    cancelled: bool,
    halted: bool,
}

impl BuildState {
    pub fn new(
        config: BuildConfig,
        driver: Arc<dyn HypervDriver>,
        ui: Arc<dyn Ui>,
        hook: Option<Arc<dyn ProvisionHook>>,
        cancel: CancelHandle,
    ) -> Self {
        Self {
            config,
            driver,
            ui,
            hook,
            cancel,
            temp_dir: None,
            output_dir: None,
            vm_name: None,
            guest_ip: None,
            error: None,
            cancelled: false,
            halted: false,
        }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn driver(&self) -> Arc<dyn HypervDriver> {
        Arc::clone(&self.driver)
    }

    pub fn ui(&self) -> Arc<dyn Ui> {
        Arc::clone(&self.ui)
    }

    pub fn hook(&self) -> Option<Arc<dyn ProvisionHook>> {
        self.hook.as_ref().map(Arc::clone)
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Optional install media for the floppy drive, if configured.
    pub fn floppy_source(&self) -> Option<&Path> {
        self.config.floppy_path.as_deref()
    }

    pub fn set_temp_dir(&mut self, path: PathBuf) {
        self.temp_dir = Some(path);
    }

    pub fn temp_dir(&self) -> ForgeResult<&Path> {
        self.temp_dir
            .as_deref()
            .ok_or_else(|| ForgeError::Internal("create_temp_dir step must run first".into()))
    }

    pub fn set_output_dir(&mut self, path: PathBuf) {
        self.output_dir = Some(path);
    }

    pub fn output_dir(&self) -> ForgeResult<&Path> {
        self.output_dir
            .as_deref()
            .ok_or_else(|| ForgeError::Internal("output_dir step must run first".into()))
    }

    pub fn set_vm_name(&mut self, name: String) {
        self.vm_name = Some(name);
    }

    pub fn vm_name(&self) -> ForgeResult<&str> {
        self.vm_name
            .as_deref()
            .ok_or_else(|| ForgeError::Internal("create_vm step must run first".into()))
    }

    pub fn set_guest_ip(&mut self, ip: String) {
        self.guest_ip = Some(ip);
    }

    pub fn guest_ip(&self) -> ForgeResult<&str> {
        self.guest_ip
            .as_deref()
            .ok_or_else(|| ForgeError::Internal("configure_ip step must run first".into()))
    }

    /// Record a fatal error. The first error wins; later failures are
    /// reported through the UI by the step that hit them.
    pub fn fail(&mut self, err: ForgeError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    pub fn error(&self) -> Option<&ForgeError> {
        self.error.as_ref()
    }

    pub fn take_error(&mut self) -> Option<ForgeError> {
        self.error.take()
    }

    pub fn mark_cancelled(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn mark_halted(&mut self) {
        self.halted = true;
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn disposition(&self) -> Disposition {
        if self.error.is_some() {
            Disposition::Failed
        } else if self.cancelled {
            Disposition::Cancelled
        } else if self.halted {
            Disposition::Halted
        } else {
            Disposition::Succeeded
        }
    }
}
