//! Generation backend trait and its error type.

use crate::options::GenerationOptions;
use thiserror::Error;

/// Encoded image returned by the backend (PNG).
pub type ImageBytes = Vec<u8>;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Backend returned {status} for {url}: {body}")]
    Status { status: u16, url: String, body: String },
    #[error("Unsupported image data (expected a PNG data URL)")]
    UnsupportedImageData,
    #[error("Invalid base64 image data: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// A service that turns a prompt into images.
///
/// Requests are never retried; a failure surfaces as a task error.
pub trait GenerationBackend {
    /// Health check. `false` when the backend is unreachable or unhealthy.
    fn ping(&self) -> bool;

    /// Generate `options.outputs` images for `prompt`.
    fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<Vec<ImageBytes>, BackendError>;
}
