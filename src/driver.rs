//! Runs a planned queue to completion and records what was generated.

use crate::diffusion::GenerationBackend;
use crate::output::RunSummary;
use crate::queue::TaskQueue;
use crate::task::{Task, Toolbox};
use crate::types::{Gallery, GeneratedImage};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PreflightError {
    #[error("No running back-end instance on {url}")]
    Unreachable { url: String },
}

/// Health-check the backend. Callers run this before building a plan, so an
/// unreachable backend costs nothing but the ping.
pub fn preflight(backend: &dyn GenerationBackend, url: &str) -> Result<(), PreflightError> {
    if backend.ping() {
        debug!(url, "backend is reachable");
        Ok(())
    } else {
        Err(PreflightError::Unreachable {
            url: url.to_string(),
        })
    }
}

/// Drain `queue`, folding every completed generation into `gallery` before
/// the next task runs, so the index task sees all of them.
pub fn drive(queue: &mut TaskQueue, tools: Toolbox<'_>, gallery: &Gallery) -> RunSummary {
    let mut summary = RunSummary::default();
    let mut process = queue.process(tools);

    for task in process.by_ref() {
        if task.was_skipped() {
            summary.skipped += 1;
        } else {
            summary.completed += 1;
        }
        if let Task::Generate(generate) = &task {
            if let Some(memento) = generate.memento() {
                let images = GeneratedImage::from_files(memento, generate.files());
                debug!(prompt = %memento.prompt, count = images.len(), "recorded generated images");
                gallery.extend(images);
            }
        }
    }

    summary.failed = process.failed();
    summary.halted = process.halted();
    drop(process);
    summary.images = gallery.len();
    summary
}
