//! Image codec backend trait and shared types.
//!
//! The [`ImageBackend`] trait covers the two operations that touch encoded
//! bytes: decode (file → raster) and encode (raster → bytes with a DPI
//! stamp). Everything between them is the pure transform pipeline in
//! [`operations`](super::operations).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend).

use super::params::EncodeParams;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode {}: {}", .path.display(), .message)]
    Decode { path: PathBuf, message: String },
    #[error("failed to encode {format}: {message}")]
    Encode {
        format: &'static str,
        message: String,
    },
}

/// Trait for image codec backends.
pub trait ImageBackend {
    /// Read and decode an image file.
    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError>;

    /// Encode an image in memory, stamping the requested DPI where the
    /// format supports it.
    fn encode(&self, image: &DynamicImage, params: &EncodeParams) -> Result<Vec<u8>, BackendError>;
}
