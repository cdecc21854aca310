//! Bounded wait for an externally-observable condition.

use std::time::Duration;

use tokio::time::Instant;

use super::runner::CancelHandle;
use crate::driver::HypervDriver;
use crate::errors::{ForgeError, ForgeResult};

/// Expected output of a satisfied condition check.
const CONDITION_TRUE: &str = "True";

/// Wait before the first check. Sized so that no polling happens while the
/// monitored process is known to still be busy.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(300);

/// Wait between checks after the settle delay.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct WaitOptions {
    pub settle: Duration,
    pub poll_interval: Duration,
    /// Hard deadline over the whole wait, settle delay included.
    pub timeout: Duration,
}

impl WaitOptions {
    pub fn new(timeout: Duration) -> Self {
        Self {
            settle: DEFAULT_SETTLE_DELAY,
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout,
        }
    }
}

/// Block until `condition` evaluates to `"True"` on the management channel.
///
/// Sleeps the settle delay, then polls at a fixed interval with at most one
/// check in flight. A transport failure is fatal on first occurrence: the
/// raw error is returned with no retry. Returns [`ForgeError::WaitTimeout`]
/// when the deadline expires, settle delay included, and
/// [`ForgeError::Cancelled`] when cancellation is requested during either
/// sleep.
pub async fn wait_for_condition(
    driver: &dyn HypervDriver,
    condition: &str,
    opts: &WaitOptions,
    cancel: &CancelHandle,
) -> ForgeResult<()> {
    let deadline = Instant::now() + opts.timeout;

    tracing::debug!(condition, settle = ?opts.settle, "waiting for condition");
    tokio::select! {
        _ = tokio::time::sleep(opts.settle) => {}
        _ = tokio::time::sleep_until(deadline) => {
            return Err(timeout_error(condition, opts));
        }
        _ = cancel.cancelled() => return Err(ForgeError::Cancelled),
    }

    loop {
        if Instant::now() >= deadline {
            return Err(timeout_error(condition, opts));
        }

        let output = driver.execute(condition).await?;
        if output.trim() == CONDITION_TRUE {
            tracing::debug!(condition, "condition satisfied");
            return Ok(());
        }

        tokio::select! {
            _ = tokio::time::sleep(opts.poll_interval) => {}
            _ = tokio::time::sleep_until(deadline) => {
                return Err(timeout_error(condition, opts));
            }
            _ = cancel.cancelled() => return Err(ForgeError::Cancelled),
        }
    }
}

fn timeout_error(condition: &str, opts: &WaitOptions) -> ForgeError {
    ForgeError::WaitTimeout {
        condition: condition.to_string(),
        timeout: opts.timeout,
    }
}
