//! Expands inputs × categories × styles into an ordered task queue.
//!
//! For `{"Color": ["red", "blue"]}`, one input `Cat.png` and two outputs per
//! prompt, with cleaning enabled, the plan is:
//!
//! ```text
//! cleanup   outputs
//! mkdir     outputs/Color/red
//! generate  "Cat, red"      → Cat-0-full.png, Cat-1-full.png
//! resize    Cat-0-full.png → Cat-0-thumb.png
//! resize    Cat-1-full.png → Cat-1-thumb.png
//! mkdir     outputs/Color/blue
//! generate  "Cat, blue"
//! resize    ...
//! resize    ...
//! index     outputs/index.html
//! ```
//!
//! Every resize follows its generation and watches that generation's
//! [`SkipFlag`](crate::task::SkipFlag). The index goes last and reads the
//! shared [`Gallery`] when it runs.

use crate::modifiers::Modifiers;
use crate::naming::{OutputNaming, compose_prompt, prompt_name};
use crate::options::GenerationOptions;
use crate::queue::TaskQueue;
use crate::task::{CleanupTask, CreateDirTask, GenerateTask, IndexTask, ResizeTask};
use crate::types::{Gallery, Memento};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Invalid input filename {0:?}: expected letters and spaces followed by .png")]
    InvalidInputName(String),
}

/// Everything the builder needs besides the gallery.
#[derive(Debug, Clone)]
pub struct PlanInputs<'a> {
    pub modifiers: &'a Modifiers,
    pub options: &'a GenerationOptions,
    /// Input images in the order their tasks should run.
    pub inputs: &'a [PathBuf],
    pub output_root: &'a Path,
    pub clean: bool,
    pub skip_existing: bool,
    pub thumbnail_size: (u32, u32),
    pub index_title: &'a str,
}

/// A validated input: its path and the prompt name taken from its filename.
struct Input<'a> {
    path: &'a Path,
    name: &'a str,
}

fn validate_inputs<'a>(inputs: &'a [PathBuf]) -> Result<Vec<Input<'a>>, PlanError> {
    inputs
        .iter()
        .map(|path| {
            let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            prompt_name(file_name)
                .map(|name| Input { path, name })
                .ok_or_else(|| PlanError::InvalidInputName(path.display().to_string()))
        })
        .collect()
}

/// Build the run's task queue.
///
/// All input names are validated first; on error nothing is enqueued.
pub fn build_plan(plan: &PlanInputs<'_>, gallery: &Gallery) -> Result<TaskQueue, PlanError> {
    let mut queue = TaskQueue::new();
    build_into(&mut queue, plan, gallery)?;
    Ok(queue)
}

/// Like [`build_plan`], appending to an existing queue (e.g. one with an
/// event channel attached).
pub fn build_into(
    queue: &mut TaskQueue,
    plan: &PlanInputs<'_>,
    gallery: &Gallery,
) -> Result<(), PlanError> {
    let inputs = validate_inputs(plan.inputs)?;
    let (thumb_width, thumb_height) = plan.thumbnail_size;

    if plan.clean {
        queue.enqueue(CleanupTask::new(plan.output_root));
    }

    for (category, styles) in plan.modifiers.iter() {
        for style in styles {
            let dir = plan.output_root.join(category).join(style);
            queue.enqueue(CreateDirTask::new(&dir));

            for input in &inputs {
                let prompt = compose_prompt(input.name, style);
                let naming = OutputNaming::new(&dir, input.name);
                // An initial image set in the options file wins over the input.
                let options = match plan.options.initial_image_path {
                    Some(_) => plan.options.clone(),
                    None => plan.options.with_initial_image(input.path),
                };
                let generate = GenerateTask::new(prompt.clone(), options, naming.clone())
                    .skip_if_exists(plan.skip_existing)
                    .with_memento(Memento {
                        input: input.name.to_string(),
                        style: style.clone(),
                        category: category.to_string(),
                        prompt,
                    });
                let skip = generate.skip_flag();
                queue.enqueue(generate);

                for index in 0..plan.options.outputs {
                    queue.enqueue(
                        ResizeTask::new(naming.full(index), naming.thumb(index), thumb_width, thumb_height)
                            .after(skip.clone()),
                    );
                }
            }
        }
    }

    queue.enqueue(IndexTask::new(
        gallery.clone(),
        plan.output_root.join("index.html"),
        plan.index_title,
    ));
    Ok(())
}
