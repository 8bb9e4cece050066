//! Units of work executed by the [`TaskQueue`](crate::queue::TaskQueue).
//!
//! A run is a flat list of tasks of five kinds:
//!
//! | Kind | Does | Fails when |
//! |---|---|---|
//! | [`Cleanup`](CleanupTask) | removes the output root | the path exists and can't be removed |
//! | [`CreateDir`](CreateDirTask) | creates a style directory | creation fails |
//! | [`Generate`](GenerateTask) | asks the backend for N variants of one input | backend or write error |
//! | [`Resize`](ResizeTask) | thumbnails one generated image | decode/encode error |
//! | [`Index`](IndexTask) | renders `index.html` from the gallery | render or write error |
//!
//! Tasks never see each other directly. A resize learns that its generation
//! was skipped through a shared [`SkipFlag`]; the index learns what was
//! generated through the [`Gallery`](crate::types::Gallery) the driver fills.

mod fs;
mod generate;
mod index;
mod resize;

pub use fs::{CleanupTask, CreateDirTask};
pub use generate::{GenerateTask, GenerationState};
pub use index::IndexTask;
pub use resize::ResizeTask;

use crate::diffusion::{BackendError, GenerationBackend};
use crate::imaging::{ImageResizer, ResizeError};
use crate::index::{IndexRenderer, RenderError};
use crate::types::Memento;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaskError {
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Generation failed for {prompt:?}: {source}")]
    Backend {
        prompt: String,
        #[source]
        source: BackendError,
    },
    #[error(transparent)]
    Resize(#[from] ResizeError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl TaskError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Collaborators a task may need while running.
#[derive(Clone, Copy)]
pub struct Toolbox<'a> {
    pub backend: &'a dyn GenerationBackend,
    pub resizer: &'a dyn ImageResizer,
    pub renderer: &'a dyn IndexRenderer,
}

/// Set once by a generation that found its outputs already on disk; read by
/// the resizes derived from it.
#[derive(Debug, Clone, Default)]
pub struct SkipFlag(Arc<AtomicBool>);

impl SkipFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Cleanup,
    CreateDir,
    Generate,
    Resize,
    Index,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TaskKind::Cleanup => "cleanup",
            TaskKind::CreateDir => "mkdir",
            TaskKind::Generate => "generate",
            TaskKind::Resize => "resize",
            TaskKind::Index => "index",
        })
    }
}

#[derive(Debug)]
pub enum Task {
    Cleanup(CleanupTask),
    CreateDir(CreateDirTask),
    Generate(GenerateTask),
    Resize(ResizeTask),
    Index(IndexTask),
}

impl Task {
    pub fn kind(&self) -> TaskKind {
        match self {
            Task::Cleanup(_) => TaskKind::Cleanup,
            Task::CreateDir(_) => TaskKind::CreateDir,
            Task::Generate(_) => TaskKind::Generate,
            Task::Resize(_) => TaskKind::Resize,
            Task::Index(_) => TaskKind::Index,
        }
    }

    /// Default stop-on-error policy for this task's kind. The queue uses it
    /// unless the task was queued with
    /// [`TaskQueue::enqueue_with_policy`](crate::queue::TaskQueue::enqueue_with_policy).
    ///
    /// Only cleanup halts by default: generating into a half-cleaned tree
    /// would mix old and new outputs.
    pub fn stop_on_error(&self) -> bool {
        matches!(self, Task::Cleanup(_))
    }

    pub fn memento(&self) -> Option<&Memento> {
        match self {
            Task::Generate(task) => task.memento(),
            _ => None,
        }
    }

    /// Short human-readable description, used in progress output.
    pub fn label(&self) -> String {
        match self {
            Task::Cleanup(task) => task.path().display().to_string(),
            Task::CreateDir(task) => task.path().display().to_string(),
            Task::Generate(task) => format!("{:?}", task.prompt()),
            Task::Resize(task) => {
                let params = task.params();
                format!("{} → {}", file_name(&params.source), file_name(&params.output))
            }
            Task::Index(task) => task.dest().display().to_string(),
        }
    }

    /// Whether the task completed without doing its work because its
    /// outputs already existed.
    pub fn was_skipped(&self) -> bool {
        match self {
            Task::Generate(task) => task.state() == GenerationState::Skipped,
            Task::Resize(task) => task.skipped(),
            _ => false,
        }
    }

    pub fn run(&mut self, tools: &Toolbox<'_>) -> Result<(), TaskError> {
        match self {
            Task::Cleanup(task) => task.run(),
            Task::CreateDir(task) => task.run(),
            Task::Generate(task) => task.run(tools.backend),
            Task::Resize(task) => task.run(tools.resizer),
            Task::Index(task) => task.run(tools.renderer),
        }
    }
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl From<CleanupTask> for Task {
    fn from(task: CleanupTask) -> Self {
        Task::Cleanup(task)
    }
}

impl From<CreateDirTask> for Task {
    fn from(task: CreateDirTask) -> Self {
        Task::CreateDir(task)
    }
}

impl From<GenerateTask> for Task {
    fn from(task: GenerateTask) -> Self {
        Task::Generate(task)
    }
}

impl From<ResizeTask> for Task {
    fn from(task: ResizeTask) -> Self {
        Task::Resize(task)
    }
}

impl From<IndexTask> for Task {
    fn from(task: IndexTask) -> Self {
        Task::Index(task)
    }
}
