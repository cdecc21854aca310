//! PowerShell-backed management driver.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::driver::HypervDriver;
use crate::errors::{ForgeError, ForgeResult};

/// Drives the Hyper-V management layer by shelling out to `powershell`.
///
/// One subprocess per command. Non-zero exit status is mapped to
/// [`ForgeError::Driver`] with the command's stderr attached.
pub struct PowerShellDriver {
    binary: PathBuf,
}

impl PowerShellDriver {
    pub fn new() -> Self {
        Self::with_binary("powershell")
    }

    /// Use an explicit interpreter binary instead of `powershell` from PATH.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    async fn run(&self, command: &str) -> ForgeResult<std::process::Output> {
        tracing::debug!(command, "invoking management shell");

        let output = Command::new(&self.binary)
            .arg("-NoProfile")
            .arg("-Command")
            .arg(command)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                ForgeError::Driver(format!(
                    "failed to invoke {}: {}",
                    self.binary.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ForgeError::Driver(format!(
                "command exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(output)
    }
}

impl Default for PowerShellDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HypervDriver for PowerShellDriver {
    async fn execute(&self, command: &str) -> ForgeResult<String> {
        let output = self.run(command).await?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn manage(&self, command: &str) -> ForgeResult<()> {
        self.run(command).await.map(|_| ())
    }
}
