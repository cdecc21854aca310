//! Build artifact descriptor.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use walkdir::WalkDir;

use crate::errors::{ForgeError, ForgeResult};

/// Immutable descriptor for a completed build's output.
///
/// Produced once, after a fully successful run; never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Artifact {
    dir: PathBuf,
    files: Vec<PathBuf>,
    built_at: DateTime<Utc>,
}

impl Artifact {
    /// Snapshot the output directory into a descriptor.
    pub fn from_dir(dir: &Path) -> ForgeResult<Self> {
        let mut files = Vec::new();
        for entry in WalkDir::new(dir) {
            let entry = entry.map_err(|e| {
                ForgeError::Internal(format!("failed to scan output directory: {}", e))
            })?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }

        Ok(Self {
            dir: dir.to_path_buf(),
            files,
            built_at: Utc::now(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VM files in directory: {}", self.dir.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_exported_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("disk.vhdx"), b"disk").unwrap();
        std::fs::create_dir(dir.path().join("snapshots")).unwrap();
        std::fs::write(dir.path().join("snapshots").join("config.xml"), b"<vm/>").unwrap();

        let artifact = Artifact::from_dir(dir.path()).unwrap();
        assert_eq!(artifact.dir(), dir.path());
        assert_eq!(artifact.files().len(), 2);
        assert!(artifact.to_string().contains("VM files in directory"));
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(Artifact::from_dir(&missing).is_err());
    }
}
