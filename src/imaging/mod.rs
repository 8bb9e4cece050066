//! Thumbnail resizing, pure Rust via the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (PNG, JPEG) | `image::ImageReader` |
//! | Fill + center crop | `image::DynamicImage::resize_to_fill` (Lanczos3) |
//! | Encode → PNG | `image::DynamicImage::save_with_format` |
//!
//! The module is split into:
//! - **Parameters**: [`ResizeParams`], what to resize where
//! - **Backend**: [`ImageResizer`] trait + [`ResizeError`]
//! - **Rust backend**: [`RustResizer`], the production implementation

pub mod backend;
mod params;
pub mod rust_backend;

pub use backend::{ImageResizer, ResizeError};
pub use params::ResizeParams;
pub use rust_backend::RustResizer;
