//! Shared test doubles and fixture writers.
//!
//! The mocks record what they were asked to do behind a `Mutex` so tests can
//! assert on calls after handing out `&dyn` references.
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let backend = MockBackend::with_images(vec![b"png".to_vec()]);
//! let resizer = MockResizer::new();
//! let renderer = MaudIndex;
//! let tools = toolbox(&backend, &resizer, &renderer);
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::diffusion::{BackendError, GenerationBackend, ImageBytes};
use crate::imaging::{ImageResizer, ResizeError, ResizeParams};
use crate::index::IndexRenderer;
use crate::options::GenerationOptions;
use crate::task::Toolbox;

// =========================================================================
// Generation backend
// =========================================================================

/// Backend returning canned images, at most `options.outputs` per call.
#[derive(Default)]
pub struct MockBackend {
    images: Vec<ImageBytes>,
    fail_all: bool,
    fail_prompts: HashSet<String>,
    healthy: bool,
    pings: AtomicUsize,
    pub calls: Mutex<Vec<(String, GenerationOptions)>>,
}

impl MockBackend {
    pub fn with_images(images: Vec<ImageBytes>) -> Self {
        Self {
            images,
            healthy: true,
            ..Self::default()
        }
    }

    /// Every generation fails with a 500.
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            healthy: true,
            ..Self::default()
        }
    }

    /// Ping reports the backend as down.
    pub fn unreachable() -> Self {
        Self::default()
    }

    /// Generations for `prompt` fail; everything else succeeds.
    pub fn failing_on(mut self, prompt: &str) -> Self {
        self.fail_prompts.insert(prompt.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn ping_count(&self) -> usize {
        self.pings.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(p, _)| p.clone()).collect()
    }
}

impl GenerationBackend for MockBackend {
    fn ping(&self) -> bool {
        self.pings.fetch_add(1, Ordering::SeqCst);
        self.healthy
    }

    fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<Vec<ImageBytes>, BackendError> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), options.clone()));

        if self.fail_all || self.fail_prompts.contains(prompt) {
            return Err(BackendError::Status {
                status: 500,
                url: "mock://image".into(),
                body: "mock failure".into(),
            });
        }
        Ok(self
            .images
            .iter()
            .take(options.outputs as usize)
            .cloned()
            .collect())
    }
}

// =========================================================================
// Resizer
// =========================================================================

/// Resizer that records its parameters and optionally writes a placeholder
/// file at the output path.
#[derive(Default)]
pub struct MockResizer {
    fail: bool,
    write_outputs: bool,
    pub operations: Mutex<Vec<ResizeParams>>,
}

impl MockResizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn writing() -> Self {
        Self {
            write_outputs: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<ResizeParams> {
        self.operations.lock().unwrap().clone()
    }
}

impl ImageResizer for MockResizer {
    fn resize(&self, params: &ResizeParams) -> Result<(), ResizeError> {
        self.operations.lock().unwrap().push(params.clone());
        if self.fail {
            return Err(ResizeError::ProcessingFailed("mock failure".into()));
        }
        if self.write_outputs {
            std::fs::write(&params.output, b"thumb")?;
        }
        Ok(())
    }
}

// =========================================================================
// Fixtures
// =========================================================================

pub fn toolbox<'a>(
    backend: &'a dyn GenerationBackend,
    resizer: &'a dyn ImageResizer,
    renderer: &'a dyn IndexRenderer,
) -> Toolbox<'a> {
    Toolbox {
        backend,
        resizer,
        renderer,
    }
}

/// Write `contents` to `path`, creating parent directories.
pub fn write_fixture(path: &Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

/// Create empty input images named after `names` in `dir`.
pub fn write_inputs(dir: &Path, names: &[&str]) {
    for name in names {
        write_fixture(&dir.join(name), b"input");
    }
}
