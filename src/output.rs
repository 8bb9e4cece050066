//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Plan
//!
//! ```text
//! 001 cleanup   outputs
//! 002 mkdir     outputs/Color/red
//! 003 generate  "Cat, red"
//! 004 resize    Cat-0-full.png → Cat-0-thumb.png
//! ...
//! 010 index     outputs/index.html
//!
//! 10 tasks
//! ```
//!
//! ## Run
//!
//! ```text
//! Running 10 tasks
//! [001/010] cleanup   outputs
//! [002/010] mkdir     outputs/Color/red
//! [003/010] generate  "Cat, red"
//!     Failed: Generation failed for "Cat, red": ...
//! ...
//! Done: 8 completed, 1 skipped, 1 failed
//! Index: outputs/index.html (4 images)
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::queue::{QueueEvent, TaskSummary};
use std::path::Path;

/// Format a 1-based sequence number as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Task kind padded to a fixed column, then its label.
fn task_body(task: &TaskSummary) -> String {
    format!("{:<9} {}", task.kind.to_string(), task.label)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Plan output
// ============================================================================

/// Format the planned task list.
pub fn format_plan(tasks: &[TaskSummary]) -> Vec<String> {
    let mut lines: Vec<String> = tasks
        .iter()
        .map(|t| format!("{} {}", format_index(t.seq), task_body(t)))
        .collect();
    lines.push(String::new());
    lines.push(plural(tasks.len(), "task"));
    lines
}

pub fn print_plan(tasks: &[TaskSummary]) {
    for line in format_plan(tasks) {
        println!("{}", line);
    }
}

// ============================================================================
// Run progress
// ============================================================================

/// Format one queue event as progress lines. `total` is the number of tasks
/// enqueued for the run.
///
/// Enqueue and after-each events produce no output.
pub fn format_queue_event(event: &QueueEvent, total: usize) -> Vec<String> {
    match event {
        QueueEvent::BeforeAll => vec![format!("Running {}", plural(total, "task"))],
        QueueEvent::BeforeEach(task) => vec![format!(
            "[{}/{}] {}",
            format_index(task.seq),
            format_index(total),
            task_body(task)
        )],
        QueueEvent::TaskError { error, .. } => vec![format!("    Failed: {}", error)],
        QueueEvent::TaskEnqueued(_) | QueueEvent::AfterEach(_) | QueueEvent::AfterAll => {
            Vec::new()
        }
    }
}

/// Format a passed backend health check. Failures are reported through
/// [`crate::driver::PreflightError`].
pub fn format_backend_ready(url: &str) -> String {
    format!("Backend ready at {}", url)
}

// ============================================================================
// Run summary
// ============================================================================

/// Outcome counts of a run, collected by the driver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Tasks that ran and did their work.
    pub completed: usize,
    /// Tasks that completed without work because outputs already existed.
    pub skipped: usize,
    pub failed: usize,
    /// Whether a stop-on-error failure ended the run early.
    pub halted: bool,
    /// Images listed on the index page.
    pub images: usize,
}

pub fn format_run_summary(summary: &RunSummary, index: &Path) -> Vec<String> {
    let mut lines = vec![format!(
        "Done: {} completed, {} skipped, {} failed",
        summary.completed, summary.skipped, summary.failed
    )];
    if summary.halted {
        lines.push("Stopped early: remaining tasks were not run".to_string());
    } else {
        lines.push(format!(
            "Index: {} ({})",
            index.display(),
            plural(summary.images, "image")
        ));
    }
    lines
}

pub fn print_run_summary(summary: &RunSummary, index: &Path) {
    for line in format_run_summary(summary, index) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
