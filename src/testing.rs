//! Shared test doubles for driver, UI, and steps.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::config::BuildConfig;
use crate::driver::HypervDriver;
use crate::errors::ForgeResult;
use crate::hook::ProvisionHook;
use crate::pipeline::{CancelHandle, Step, StepAction};
use crate::state::BuildState;
use crate::ui::Ui;

/// Scripted driver: records every issued command and plays back queued
/// responses. An empty queue falls through to a configurable default.
#[derive(Default)]
pub(crate) struct FakeDriver {
    executed: Mutex<Vec<String>>,
    managed: Mutex<Vec<String>>,
    execute_responses: Mutex<VecDeque<ForgeResult<String>>>,
    manage_responses: Mutex<VecDeque<ForgeResult<()>>>,
    default_execute: Mutex<String>,
}

impl FakeDriver {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub(crate) fn queue_execute(&self, response: ForgeResult<String>) {
        self.execute_responses.lock().unwrap().push_back(response);
    }

    pub(crate) fn queue_manage(&self, response: ForgeResult<()>) {
        self.manage_responses.lock().unwrap().push_back(response);
    }

    /// Output returned by `execute` once the queue is drained.
    pub(crate) fn set_default_execute(&self, output: &str) {
        *self.default_execute.lock().unwrap() = output.to_string();
    }

    pub(crate) fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    pub(crate) fn managed(&self) -> Vec<String> {
        self.managed.lock().unwrap().clone()
    }
}

#[async_trait]
impl HypervDriver for FakeDriver {
    async fn execute(&self, command: &str) -> ForgeResult<String> {
        self.executed.lock().unwrap().push(command.to_string());
        match self.execute_responses.lock().unwrap().pop_front() {
            Some(response) => response,
            None => Ok(self.default_execute.lock().unwrap().clone()),
        }
    }

    async fn manage(&self, command: &str) -> ForgeResult<()> {
        self.managed.lock().unwrap().push(command.to_string());
        self.manage_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }
}

/// UI sink that captures everything for assertions.
#[derive(Default)]
pub(crate) struct CapturingUi {
    messages: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl CapturingUi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub(crate) fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    #[allow(dead_code)]
    pub(crate) fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl Ui for CapturingUi {
    fn say(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

/// Build state over a fresh fake driver and capturing UI.
pub(crate) fn test_state() -> BuildState {
    test_state_with(|_| {}, FakeDriver::shared())
}

/// Build state with a tweaked config and a caller-held driver.
pub(crate) fn test_state_with(
    configure: impl FnOnce(&mut BuildConfig),
    driver: Arc<FakeDriver>,
) -> BuildState {
    let mut config = BuildConfig::default();
    configure(&mut config);
    BuildState::new(
        config,
        driver,
        Arc::new(CapturingUi::new()),
        None,
        CancelHandle::new(),
    )
}

/// Build state with an optional provisioning hook.
pub(crate) fn test_state_with_hook(
    hook: Option<Arc<dyn ProvisionHook>>,
    driver: Arc<FakeDriver>,
) -> BuildState {
    BuildState::new(
        BuildConfig::default(),
        driver,
        Arc::new(CapturingUi::new()),
        hook,
        CancelHandle::new(),
    )
}

/// Ordered record of step run/cleanup invocations.
#[derive(Clone, Default)]
pub(crate) struct StepLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl StepLog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    fn push(&self, entry: String) {
        self.entries.lock().unwrap().push(entry);
    }
}

type OnRun = Box<dyn Fn(&mut BuildState) + Send>;

/// Step double that logs its invocations and returns a fixed action.
pub(crate) struct RecordingStep {
    name: String,
    action: StepAction,
    log: StepLog,
    on_run: Option<OnRun>,
}

impl RecordingStep {
    pub(crate) fn continuing(name: &str, log: &StepLog) -> Self {
        Self {
            name: name.to_string(),
            action: StepAction::Continue,
            log: log.clone(),
            on_run: None,
        }
    }

    /// Halting steps record an error first, as real steps must.
    pub(crate) fn halting(name: &str, log: &StepLog) -> Self {
        Self {
            name: name.to_string(),
            action: StepAction::Halt,
            log: log.clone(),
            on_run: None,
        }
    }

    pub(crate) fn on_run(mut self, f: impl Fn(&mut BuildState) + Send + 'static) -> Self {
        self.on_run = Some(Box::new(f));
        self
    }
}

#[async_trait]
impl Step for RecordingStep {
    async fn run(&mut self, state: &mut BuildState) -> StepAction {
        self.log.push(format!("run:{}", self.name));
        if let Some(f) = &self.on_run {
            f(state);
        }
        if self.action == StepAction::Halt {
            state.fail(crate::errors::ForgeError::Internal(format!(
                "step {} failed",
                self.name
            )));
        }
        self.action
    }

    async fn cleanup(&mut self, _state: &mut BuildState) {
        self.log.push(format!("cleanup:{}", self.name));
    }

    fn name(&self) -> &str {
        &self.name
    }
}
