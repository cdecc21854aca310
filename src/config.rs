//! Build configuration.
//!
//! Set once before the build starts and treated as immutable afterwards.
//! `prepare()` applies defaults and validates bounds, returning non-fatal
//! warnings for the caller to surface.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ForgeError, ForgeResult};

pub const DEFAULT_DISK_SIZE_MB: u32 = 127 * 1024;
pub const MIN_DISK_SIZE_MB: u32 = 10 * 1024;
pub const MAX_DISK_SIZE_MB: u32 = 65536 * 1024;

pub const DEFAULT_RAM_SIZE_MB: u32 = 1024;
pub const MIN_RAM_SIZE_MB: u32 = 512;
pub const MAX_RAM_SIZE_MB: u32 = 32768;

/// Free host memory below which VM creation is likely to fail.
pub const LOW_RAM_MB: u32 = 512;

pub const DEFAULT_INSTALL_TIMEOUT_SECS: u64 = 4 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Name of the virtual machine. Generated when empty.
    pub vm_name: String,
    /// Startup memory in MB. Defaults to [`DEFAULT_RAM_SIZE_MB`] when zero.
    pub ram_size_mb: u32,
    /// System disk size in MB. Defaults to [`DEFAULT_DISK_SIZE_MB`] when zero.
    pub disk_size_mb: u32,
    /// Virtual switch to attach the VM to. Generated when empty.
    pub switch_name: String,
    /// Install media attached to the DVD drive. Required.
    pub iso_path: Option<PathBuf>,
    /// Optional media attached to the floppy drive.
    pub floppy_path: Option<PathBuf>,
    /// Directory the finished VM is exported into.
    pub output_dir: PathBuf,
    /// Delete a pre-existing output directory instead of failing.
    pub force: bool,
    /// Upper bound on waiting for the guest install to power the VM off.
    pub install_timeout_secs: u64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            vm_name: String::new(),
            ram_size_mb: 0,
            disk_size_mb: 0,
            switch_name: String::new(),
            iso_path: None,
            floppy_path: None,
            output_dir: PathBuf::from("output"),
            force: false,
            install_timeout_secs: 0,
        }
    }
}

impl BuildConfig {
    /// Decode a configuration from a raw JSON value.
    pub fn from_json(value: serde_json::Value) -> ForgeResult<Self> {
        serde_json::from_value(value).map_err(|e| ForgeError::Config(e.to_string()))
    }

    /// Apply defaults and validate.
    ///
    /// Collects every violation into a single [`ForgeError::Config`] so the
    /// user sees all problems at once. Returns non-fatal warnings.
    pub fn prepare(&mut self) -> ForgeResult<Vec<String>> {
        let mut errs: Vec<String> = Vec::new();
        let warnings: Vec<String> = Vec::new();

        if self.vm_name.is_empty() {
            self.vm_name = format!("hvforge-{}", Uuid::new_v4());
        }

        if self.switch_name.is_empty() {
            self.switch_name = format!("hvf-{}", Uuid::new_v4());
        }

        if self.ram_size_mb == 0 {
            self.ram_size_mb = DEFAULT_RAM_SIZE_MB;
        }
        if self.ram_size_mb < MIN_RAM_SIZE_MB {
            errs.push(format!(
                "ram_size_mb: memory size must be >= {} MB, but defined: {}",
                MIN_RAM_SIZE_MB, self.ram_size_mb
            ));
        } else if self.ram_size_mb > MAX_RAM_SIZE_MB {
            errs.push(format!(
                "ram_size_mb: memory size must be <= {} MB, but defined: {}",
                MAX_RAM_SIZE_MB, self.ram_size_mb
            ));
        }

        if self.disk_size_mb == 0 {
            self.disk_size_mb = DEFAULT_DISK_SIZE_MB;
        }
        if self.disk_size_mb < MIN_DISK_SIZE_MB {
            errs.push(format!(
                "disk_size_mb: disk space must be >= {} MB, but defined: {}",
                MIN_DISK_SIZE_MB, self.disk_size_mb
            ));
        } else if self.disk_size_mb > MAX_DISK_SIZE_MB {
            errs.push(format!(
                "disk_size_mb: disk space must be <= {} MB, but defined: {}",
                MAX_DISK_SIZE_MB, self.disk_size_mb
            ));
        }

        if self.iso_path.is_none() {
            errs.push("iso_path must be specified".to_string());
        }

        if self.install_timeout_secs == 0 {
            self.install_timeout_secs = DEFAULT_INSTALL_TIMEOUT_SECS;
        }

        if !errs.is_empty() {
            return Err(ForgeError::Config(errs.join("; ")));
        }

        Ok(warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> BuildConfig {
        BuildConfig {
            iso_path: Some(PathBuf::from("/isos/install.iso")),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_are_applied() {
        let mut config = minimal();
        config.prepare().unwrap();

        assert_eq!(config.ram_size_mb, DEFAULT_RAM_SIZE_MB);
        assert_eq!(config.disk_size_mb, DEFAULT_DISK_SIZE_MB);
        assert_eq!(config.install_timeout_secs, DEFAULT_INSTALL_TIMEOUT_SECS);
        assert!(config.vm_name.starts_with("hvforge-"));
        assert!(config.switch_name.starts_with("hvf-"));
    }

    #[test]
    fn explicit_values_are_kept() {
        let mut config = minimal();
        config.vm_name = "builder-01".into();
        config.switch_name = "sw0".into();
        config.ram_size_mb = 2048;
        config.prepare().unwrap();

        assert_eq!(config.vm_name, "builder-01");
        assert_eq!(config.switch_name, "sw0");
        assert_eq!(config.ram_size_mb, 2048);
    }

    #[test]
    fn missing_iso_is_rejected() {
        let mut config = BuildConfig::default();
        let err = config.prepare().unwrap_err();
        assert!(err.to_string().contains("iso_path"));
    }

    #[test]
    fn bounds_are_enforced_and_collected() {
        let mut config = minimal();
        config.ram_size_mb = 128;
        config.disk_size_mb = 1024;
        let err = config.prepare().unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("ram_size_mb"));
        assert!(msg.contains("disk_size_mb"));
    }

    #[test]
    fn decodes_from_json() {
        let config = BuildConfig::from_json(serde_json::json!({
            "vm_name": "builder-01",
            "iso_path": "/isos/install.iso",
            "ram_size_mb": 1024,
        }))
        .unwrap();

        assert_eq!(config.vm_name, "builder-01");
        assert_eq!(config.ram_size_mb, 1024);
        assert!(!config.force);
    }

    #[test]
    fn unknown_units_rejected_by_decode() {
        let err = BuildConfig::from_json(serde_json::json!({
            "ram_size_mb": "lots",
        }))
        .unwrap_err();
        assert!(matches!(err, ForgeError::Config(_)));
    }
}
