//! Filesystem housekeeping tasks.

use super::TaskError;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Recursively removes a path. A missing path is not an error.
#[derive(Debug, Clone)]
pub struct CleanupTask {
    path: PathBuf,
}

impl CleanupTask {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(super) fn run(&mut self) -> Result<(), TaskError> {
        let meta = match fs::symlink_metadata(&self.path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "nothing to clean");
                return Ok(());
            }
            Err(e) => return Err(TaskError::io(&self.path, e)),
        };
        let removed = if meta.is_dir() {
            fs::remove_dir_all(&self.path)
        } else {
            fs::remove_file(&self.path)
        };
        match removed {
            Ok(()) => {
                debug!(path = %self.path.display(), "removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TaskError::io(&self.path, e)),
        }
    }
}

/// Creates a directory and any missing parents. Existing directories are fine.
#[derive(Debug, Clone)]
pub struct CreateDirTask {
    path: PathBuf,
}

impl CreateDirTask {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(super) fn run(&mut self) -> Result<(), TaskError> {
        fs::create_dir_all(&self.path).map_err(|e| TaskError::io(&self.path, e))
    }
}
