//! Stable Diffusion backend access.
//!
//! The pipeline only sees the [`GenerationBackend`] trait: a health check and
//! a `prompt + options → images` call. [`StableDiffusion`] is the production
//! implementation talking to a local Stable Diffusion UI server over HTTP.
//!
//! - **Backend**: [`GenerationBackend`] trait + [`BackendError`]
//! - **Payload**: request body shaping and data-URL image codec
//! - **Http**: blocking `reqwest` client

mod backend;
mod http;
pub(crate) mod payload;

pub use backend::{BackendError, GenerationBackend, ImageBytes};
pub use http::{DEFAULT_BACKEND_URL, StableDiffusion};
