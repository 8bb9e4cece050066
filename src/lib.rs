//! # Style Forge
//!
//! Batch-generates styled variants of a set of input images through a
//! Stable Diffusion backend, thumbnails every result, and writes a browsable
//! index page.
//!
//! Inputs are named after their prompt (`Old Lighthouse.png`); a modifiers
//! file lists style tags by category. Every input is generated once per
//! style, into `outputs/<category>/<style>/`.
//!
//! # Architecture: Plan, then Drain
//!
//! ```text
//! 1. Plan    modifiers × inputs  →  TaskQueue   (cleanup, mkdir, generate, resize, index)
//! 2. Drain   TaskQueue           →  files       (one task at a time, events on a channel)
//! 3. Index   Gallery             →  index.html  (last task, reads what the driver recorded)
//! ```
//!
//! The plan is built in full before anything runs, so a misnamed input or
//! bad options file fails the run before a single request is sent. Tasks
//! then run strictly in order; a failing task is reported and skipped over,
//! except cleanup, whose failure stops the run.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`plan`] | Expands modifiers × inputs into the ordered task list |
//! | [`queue`] | FIFO execution with lifecycle events and stop-on-error |
//! | [`task`] | The five task kinds and the skip flag linking generate → resize |
//! | [`driver`] | Drains the queue, folding generation results into the gallery |
//! | [`diffusion`] | Generation backend trait + Stable Diffusion HTTP client |
//! | [`imaging`] | Thumbnail resizing with the `image` crate |
//! | [`index`] | Index page rendering with Maud |
//! | [`config`] | `config.toml` loading, merging, and validation |
//! | [`options`] | `options.json` generation options and their validation |
//! | [`modifiers`] | `modifiers.json` categories and styles |
//! | [`scan`] | Input image discovery |
//! | [`naming`] | Input and output filename conventions |
//! | [`types`] | Records shared between driver, tasks, and index |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Skip State Travels by Flag
//!
//! A resize needs to know whether its generation was skipped, but tasks are
//! owned by the queue and handed out one at a time. Instead of a reference
//! to the generation, each resize holds a clone of the generation's
//! [`task::SkipFlag`], which is read when the resize runs.
//!
//! ## Completed Tasks Come Back to the Caller
//!
//! [`queue::TaskQueue::process`] is an iterator over successfully completed
//! tasks. The driver inspects each generation as it comes back and appends
//! its images to the shared [`types::Gallery`] before the next task runs.

pub mod config;
pub mod diffusion;
pub mod driver;
pub mod imaging;
pub mod index;
pub mod modifiers;
pub mod naming;
pub mod options;
pub mod output;
pub mod plan;
pub mod queue;
pub mod scan;
pub mod task;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
