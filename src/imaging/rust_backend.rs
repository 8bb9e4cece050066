//! Pure Rust resizer built on the `image` crate.

use super::backend::{ImageResizer, ResizeError};
use super::params::ResizeParams;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::path::Path;

/// Fill-resizes and center-crops to the exact target size, writing PNG.
#[derive(Debug, Default)]
pub struct RustResizer;

impl RustResizer {
    pub fn new() -> Self {
        Self
    }
}

fn load_image(path: &Path) -> Result<DynamicImage, ResizeError> {
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| {
            ResizeError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

impl ImageResizer for RustResizer {
    fn resize(&self, params: &ResizeParams) -> Result<(), ResizeError> {
        if params.width == 0 || params.height == 0 {
            return Err(ResizeError::ProcessingFailed(format!(
                "Invalid target size {}x{}",
                params.width, params.height
            )));
        }
        let img = load_image(&params.source)?;
        let filled = img.resize_to_fill(params.width, params.height, FilterType::Lanczos3);
        filled
            .save_with_format(&params.output, ImageFormat::Png)
            .map_err(|e| {
                ResizeError::ProcessingFailed(format!(
                    "Failed to write {}: {}",
                    params.output.display(),
                    e
                ))
            })
    }
}
