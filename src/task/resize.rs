//! Thumbnail creation for one generated image.

use super::{SkipFlag, TaskError};
use crate::imaging::{ImageResizer, ResizeParams};
use std::path::PathBuf;
use tracing::debug;

/// Resizes one full image into its thumbnail.
///
/// When attached to a generation via [`after`](Self::after), the resize is
/// skipped whenever that generation was.
#[derive(Debug, Clone)]
pub struct ResizeTask {
    params: ResizeParams,
    upstream: Option<SkipFlag>,
    skipped: bool,
}

impl ResizeTask {
    pub fn new(source: impl Into<PathBuf>, output: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            params: ResizeParams::new(source, output, width, height),
            upstream: None,
            skipped: false,
        }
    }

    pub fn after(mut self, generation: SkipFlag) -> Self {
        self.upstream = Some(generation);
        self
    }

    pub fn params(&self) -> &ResizeParams {
        &self.params
    }

    pub fn skipped(&self) -> bool {
        self.skipped
    }

    pub(super) fn run(&mut self, resizer: &dyn ImageResizer) -> Result<(), TaskError> {
        if self.upstream.as_ref().is_some_and(SkipFlag::is_set) {
            self.skipped = true;
            debug!(output = %self.params.output.display(), "generation skipped, skipping resize");
            return Ok(());
        }
        resizer.resize(&self.params)?;
        Ok(())
    }
}
