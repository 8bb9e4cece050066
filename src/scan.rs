//! Input discovery.
//!
//! Every regular `*.png` file (extension case-insensitive) directly inside
//! the input directory is an input. Hidden files are ignored and
//! subdirectories are not descended into. Inputs are returned sorted by
//! filename so a run's plan is reproducible.
//!
//! Discovery does not check the naming convention; the
//! [plan builder](crate::plan) rejects names it cannot turn into prompts,
//! so a misnamed PNG fails the run instead of silently dropping out of it.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Input directory not found: {0}")]
    DirectoryNotFound(PathBuf),
}

pub fn discover_inputs(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    if !dir.is_dir() {
        return Err(ScanError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut inputs: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|e| e.path())
        .filter(|p| is_png(p) && !is_hidden(p))
        .collect();
    inputs.sort();
    Ok(inputs)
}

fn is_png(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"))
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}
