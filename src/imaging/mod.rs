//! Image processing — pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (PNG, JPEG, GIF, WebP) |
//! | **Resize** | `imageops::resize`, Catmull-Rom or Lanczos3 |
//! | **Viz enhancement** | `imageops::contrast` + `imageops::unsharpen` |
//! | **Pad / border / flatten** | `RgbaImage` canvas operations |
//! | **Encode + DPI** | `png` (`pHYs`), `JpegEncoder` (JFIF density), `WebPEncoder` (EXIF) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing transforms and encodes
//! - **Operations**: The transform pipeline itself
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`] for decode/encode
//! - **Density**: DPI conversions and header readers

pub mod backend;
mod calculations;
pub mod density;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use calculations::{calculate_fit_width, calculate_padded_dimensions};
pub use operations::{TransformError, plan_encode, plan_transform, standardize};
pub use params::{
    EncodeParams, Enhancement, FrameRing, Quality, Resampling, Sharpening, TransformParams,
};
pub use rust_backend::{RustBackend, is_supported_input};
