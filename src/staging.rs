//! Temporary staging of nested archives
//!
//! A nested archive is extracted to a [`StagedCopy`] in the system temp
//! directory, mutated there, and written back into its parent. The staged file
//! is removed when the `StagedCopy` is dropped, on success and on every error
//! path alike.

use std::path::Path;

use log::{debug, warn};
use tempfile::TempPath;

use crate::error::Result;

/// A scoped temporary file holding one extracted nested archive.
#[derive(Debug)]
pub struct StagedCopy {
    path: Option<TempPath>,
}

impl StagedCopy {
    /// Allocate an empty temporary file.
    pub fn new() -> Result<Self> {
        let file = tempfile::Builder::new()
            .prefix("cpzip-")
            .suffix(".zip")
            .tempfile()?;
        Ok(Self {
            path: Some(file.into_temp_path()),
        })
    }

    pub fn path(&self) -> &Path {
        self.path.as_deref().unwrap_or(Path::new(""))
    }

    /// Give the staged file the permission bits recorded for its entry.
    ///
    /// The owner keeps read and write access so the copy can still be updated.
    #[cfg(unix)]
    pub fn apply_mode(&self, mode: Option<u32>) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;
        if let Some(mode) = mode {
            let permissions = std::fs::Permissions::from_mode((mode & 0o777) | 0o600);
            std::fs::set_permissions(self.path(), permissions)?;
        }
        Ok(())
    }

    #[cfg(not(unix))]
    pub fn apply_mode(&self, _mode: Option<u32>) -> Result<()> {
        Ok(())
    }
}

impl Drop for StagedCopy {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            debug!("Deleting {}...", path.display());
            let display = path.display().to_string();
            if let Err(e) = path.close() {
                warn!("Failed to delete temporary file {}: {}", display, e);
            }
        }
    }
}
