//! Resizer trait and shared error type.
//!
//! The production implementation is
//! [`RustResizer`](super::rust_backend::RustResizer). Tests substitute a
//! recording mock (see `test_helpers`).

use super::params::ResizeParams;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResizeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Resize failed: {0}")]
    ProcessingFailed(String),
}

/// Produces a thumbnail from an existing image file.
pub trait ImageResizer {
    fn resize(&self, params: &ResizeParams) -> Result<(), ResizeError>;
}
