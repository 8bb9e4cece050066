//! Parameter type for resize operations.
//!
//! Describes *what* to produce, not *how*; the [`backend`](super::backend)
//! does the pixel work. Swapping in a recording mock for tests needs no
//! change on the task side.

use std::path::PathBuf;

/// Resize `source` to exactly `width`×`height` and write a PNG to `output`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl ResizeParams {
    pub fn new(source: impl Into<PathBuf>, output: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            source: source.into(),
            output: output.into(),
            width,
            height,
        }
    }
}
