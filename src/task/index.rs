//! Index page rendering.

use super::TaskError;
use crate::index::{IndexPage, IndexRenderer};
use crate::types::Gallery;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Renders the gallery accumulated so far into `dest`.
///
/// The gallery is read when the task runs, not when it is planned, so it
/// sees every image the driver recorded from earlier tasks.
#[derive(Debug, Clone)]
pub struct IndexTask {
    gallery: Gallery,
    dest: PathBuf,
    title: String,
}

impl IndexTask {
    pub fn new(gallery: Gallery, dest: impl Into<PathBuf>, title: impl Into<String>) -> Self {
        Self {
            gallery,
            dest: dest.into(),
            title: title.into(),
        }
    }

    pub fn dest(&self) -> &Path {
        &self.dest
    }

    pub(super) fn run(&mut self, renderer: &dyn IndexRenderer) -> Result<(), TaskError> {
        let images = self.gallery.snapshot();
        let base = self.dest.parent().unwrap_or(Path::new(""));
        let html = renderer.render(&IndexPage {
            title: &self.title,
            base,
            images: &images,
        })?;
        if !base.as_os_str().is_empty() {
            fs::create_dir_all(base).map_err(|e| TaskError::io(base, e))?;
        }
        fs::write(&self.dest, html).map_err(|e| TaskError::io(&self.dest, e))?;
        debug!(dest = %self.dest.display(), images = images.len(), "index written");
        Ok(())
    }
}
