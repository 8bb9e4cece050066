//! Variant generation for one input under one style.

use super::{SkipFlag, TaskError};
use crate::diffusion::GenerationBackend;
use crate::naming::OutputNaming;
use crate::options::GenerationOptions;
use crate::types::Memento;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    Pending,
    Executed,
    Skipped,
}

/// Requests `options.outputs` images for `prompt` and writes them to the
/// paths given by `naming`.
///
/// With skip-if-exists set, the task first probes the index-0 output: if it
/// is a non-empty regular file the backend is not contacted, the task marks
/// itself skipped and reports every expected output path as its files. Only
/// index 0 is probed; a partially generated set is treated as complete.
#[derive(Debug, Clone)]
pub struct GenerateTask {
    prompt: String,
    options: GenerationOptions,
    naming: OutputNaming,
    skip_if_exists: bool,
    memento: Option<Memento>,
    state: GenerationState,
    skip: SkipFlag,
    files: Vec<PathBuf>,
}

impl GenerateTask {
    pub fn new(prompt: impl Into<String>, options: GenerationOptions, naming: OutputNaming) -> Self {
        Self {
            prompt: prompt.into(),
            options,
            naming,
            skip_if_exists: false,
            memento: None,
            state: GenerationState::Pending,
            skip: SkipFlag::new(),
            files: Vec::new(),
        }
    }

    pub fn skip_if_exists(mut self, skip: bool) -> Self {
        self.skip_if_exists = skip;
        self
    }

    pub fn with_memento(mut self, memento: Memento) -> Self {
        self.memento = Some(memento);
        self
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    pub fn naming(&self) -> &OutputNaming {
        &self.naming
    }

    pub fn memento(&self) -> Option<&Memento> {
        self.memento.as_ref()
    }

    pub fn state(&self) -> GenerationState {
        self.state
    }

    /// Handle that resizes derived from this generation watch.
    pub fn skip_flag(&self) -> SkipFlag {
        self.skip.clone()
    }

    /// Files this generation produced (or found, when skipped), in output
    /// index order. Empty until the task has run.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    fn outputs_exist(&self) -> bool {
        // Any probe error means "not there yet".
        fs::metadata(self.naming.full(0))
            .map(|meta| meta.is_file() && meta.len() > 0)
            .unwrap_or(false)
    }

    pub(super) fn run(&mut self, backend: &dyn GenerationBackend) -> Result<(), TaskError> {
        if self.skip_if_exists && self.outputs_exist() {
            self.files = (0..self.options.outputs).map(|i| self.naming.full(i)).collect();
            self.state = GenerationState::Skipped;
            self.skip.mark();
            debug!(prompt = %self.prompt, "outputs exist, skipping generation");
            return Ok(());
        }

        let images = backend
            .generate(&self.prompt, &self.options)
            .map_err(|source| TaskError::Backend {
                prompt: self.prompt.clone(),
                source,
            })?;
        debug!(prompt = %self.prompt, count = images.len(), "generated");

        self.files.clear();
        for (index, data) in (0u32..).zip(images.iter()) {
            let path = self.naming.full(index);
            fs::write(&path, data).map_err(|e| TaskError::io(&path, e))?;
            self.files.push(path);
        }
        self.state = GenerationState::Executed;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diffusion::BackendError;
    use crate::test_helpers::{MockBackend, write_fixture};
    use tempfile::TempDir;

    fn options(outputs: u32) -> GenerationOptions {
        GenerationOptions {
            outputs,
            ..GenerationOptions::default()
        }
    }

    #[test]
    fn writes_each_returned_image_in_order() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::with_images(vec![b"first".to_vec(), b"second".to_vec()]);
        let mut task = GenerateTask::new("Cat, red", options(2), OutputNaming::new(tmp.path(), "Cat"));

        task.run(&backend).unwrap();

        assert_eq!(task.state(), GenerationState::Executed);
        assert_eq!(
            task.files(),
            &[tmp.path().join("Cat-0-full.png"), tmp.path().join("Cat-1-full.png")]
        );
        assert_eq!(fs::read(tmp.path().join("Cat-1-full.png")).unwrap(), b"second");
        assert_eq!(backend.prompts(), vec!["Cat, red".to_string()]);
        assert!(!task.skip_flag().is_set());
    }

    #[test]
    fn skips_when_first_output_exists() {
        let tmp = TempDir::new().unwrap();
        write_fixture(&tmp.path().join("Cat-0-full.png"), b"png");
        let backend = MockBackend::with_images(vec![b"new".to_vec()]);
        let mut task = GenerateTask::new("Cat, red", options(3), OutputNaming::new(tmp.path(), "Cat"))
            .skip_if_exists(true);
        let flag = task.skip_flag();

        task.run(&backend).unwrap();

        assert_eq!(task.state(), GenerationState::Skipped);
        assert!(flag.is_set());
        assert_eq!(backend.call_count(), 0);
        // Expected paths are reported even though only index 0 exists.
        assert_eq!(task.files().len(), 3);
        assert_eq!(task.files()[2], tmp.path().join("Cat-2-full.png"));
        assert_eq!(fs::read(tmp.path().join("Cat-0-full.png")).unwrap(), b"png");
    }

    #[test]
    fn empty_first_output_does_not_count() {
        let tmp = TempDir::new().unwrap();
        write_fixture(&tmp.path().join("Cat-0-full.png"), b"");
        let backend = MockBackend::with_images(vec![b"new".to_vec()]);
        let mut task = GenerateTask::new("Cat, red", options(1), OutputNaming::new(tmp.path(), "Cat"))
            .skip_if_exists(true);

        task.run(&backend).unwrap();

        assert_eq!(task.state(), GenerationState::Executed);
        assert_eq!(backend.call_count(), 1);
    }

    #[test]
    fn directory_in_place_of_output_does_not_count() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("Cat-0-full.png")).unwrap();
        let backend = MockBackend::with_images(vec![]);
        let mut task = GenerateTask::new("Cat, red", options(1), OutputNaming::new(tmp.path(), "Cat"))
            .skip_if_exists(true);

        task.run(&backend).unwrap();
        assert_eq!(backend.call_count(), 1);
    }

    #[test]
    fn existing_outputs_are_regenerated_without_skip() {
        let tmp = TempDir::new().unwrap();
        write_fixture(&tmp.path().join("Cat-0-full.png"), b"old");
        let backend = MockBackend::with_images(vec![b"new".to_vec()]);
        let mut task = GenerateTask::new("Cat, red", options(1), OutputNaming::new(tmp.path(), "Cat"));

        task.run(&backend).unwrap();
        assert_eq!(fs::read(tmp.path().join("Cat-0-full.png")).unwrap(), b"new");
    }

    #[test]
    fn backend_failure_is_reported_with_prompt() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::failing();
        let mut task = GenerateTask::new("Cat, red", options(1), OutputNaming::new(tmp.path(), "Cat"));

        let err = task.run(&backend).unwrap_err();
        assert!(matches!(
            err,
            TaskError::Backend {
                source: BackendError::Status { .. },
                ..
            }
        ));
        assert!(err.to_string().contains("\"Cat, red\""));
        assert_eq!(task.state(), GenerationState::Pending);
        assert!(task.files().is_empty());
    }

    #[test]
    fn missing_output_directory_fails_the_write() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::with_images(vec![b"x".to_vec()]);
        let mut task = GenerateTask::new(
            "Cat, red",
            options(1),
            OutputNaming::new(tmp.path().join("missing"), "Cat"),
        );
        assert!(matches!(task.run(&backend), Err(TaskError::Io { .. })));
    }
}
