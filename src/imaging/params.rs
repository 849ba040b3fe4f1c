//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between [`operations`](super::operations), which turns a
//! [`ProcessingConfig`](crate::config::ProcessingConfig) into pixel-level
//! parameters, and the code that executes them: the transform pipeline for
//! [`TransformParams`] and the [`backend`](super::backend) for
//! [`EncodeParams`].
//!
//! ## Types
//!
//! - [`Quality`] — Lossy encoding quality (1–100). Clamped on construction.
//! - [`Sharpening`] — Unsharp-mask parameters (sigma + threshold).
//! - [`Resampling`] — Standard or high-quality resize filter.
//! - [`Enhancement`] — Contrast boost + sharpening applied to viz screenshots.
//! - [`FrameRing`] — One band of the border frame.
//! - [`TransformParams`] — Everything the pipeline needs to standardize one image.
//! - [`EncodeParams`] — Output format, DPI stamp and encoder settings.

use crate::config::{OutputFormat, PngCompression};
use image::Rgba;
use image::imageops::FilterType;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

/// Sharpening parameters for unsharp mask.
///
/// - `sigma`: Standard deviation of the Gaussian blur (higher = more sharpening)
/// - `threshold`: Minimum brightness difference to sharpen (0 = sharpen all pixels)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sharpening {
    pub sigma: f32,
    pub threshold: i32,
}

impl Sharpening {
    /// Light sharpening that crisps chart labels after resampling.
    pub fn text() -> Self {
        Self {
            sigma: 0.8,
            threshold: 1,
        }
    }
}

/// Resize filter selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resampling {
    /// Catmull-Rom: sharp enough for UI chrome, noticeably faster.
    Standard,
    /// Lanczos3.
    HighQuality,
}

impl Resampling {
    pub fn filter(self) -> FilterType {
        match self {
            Resampling::Standard => FilterType::CatmullRom,
            Resampling::HighQuality => FilterType::Lanczos3,
        }
    }
}

/// Post-resize enhancement for data visualizations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Enhancement {
    /// Contrast change in percent, as taken by `image::imageops::contrast`.
    pub contrast: f32,
    pub sharpening: Sharpening,
}

impl Enhancement {
    /// About +8% perceived contrast plus light sharpening.
    pub fn viz() -> Self {
        Self {
            contrast: 4.0,
            sharpening: Sharpening::text(),
        }
    }
}

/// One band of the border frame, painted inward from the previous band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRing {
    pub width: u32,
    pub color: Rgba<u8>,
}

/// Everything needed to standardize one decoded image.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformParams {
    pub target_width: u32,
    pub resampling: Resampling,
    pub enhancement: Option<Enhancement>,
    /// Padding added on every side, in pixels.
    pub padding: u32,
    /// Padding fill, also the matte for alpha flattening.
    pub background: Rgba<u8>,
    /// Border bands, outermost first. Empty when the border is disabled.
    pub frame: Vec<FrameRing>,
    /// Composite alpha onto `background` (for formats without alpha).
    pub flatten_alpha: bool,
}

/// Everything needed to encode a standardized image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeParams {
    pub format: OutputFormat,
    pub dpi: u32,
    pub quality: Quality,
    pub png_compression: PngCompression,
}
