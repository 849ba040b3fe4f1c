//! # Screenshot Standardizer
//!
//! Batch-resizes and pads screenshots so documentation images share one
//! width, one DPI and one frame style.
//!
//! # Architecture
//!
//! ```text
//! CLI flags ─▶ config ─▶ plan ─▶ process ─┬─▶ imaging::standardize ─▶ backend.encode ─▶ file
//!                                         └─▶ output (per-file lines, summary)
//! ```
//!
//! Each image goes through the same pipeline, one at a time:
//!
//! 1. **Resize** to the preset width (1024 / 1440 / 1920), aspect preserved.
//! 2. **Enhance** (viz only): mild contrast boost and sharpening.
//! 3. **Pad** by a fixed number of pixels on every side.
//! 4. **Border**: a thin frame painted along the canvas edge.
//! 5. **DPI stamp** at encode time (PNG `pHYs`, JPEG JFIF density, WebP EXIF).
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | Presets, screenshot types, output formats, optional style file |
//! | [`imaging`] | Geometry, transform pipeline, codec backend, DPI metadata |
//! | [`plan`] | Input discovery, output naming, overwrite policy |
//! | [`process`] | Runs a plan file by file; skip-on-error-continue |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## The Border Is Painted, Not Added
//!
//! The frame is drawn inside the canvas, so the output width is exactly the
//! preset width (plus padding). Add `--padding` when the frame must not
//! overlap content.
//!
//! ## Never Overwrite by Accident
//!
//! Outputs are encoded fully in memory, then written with `create_new`
//! unless `--force` is given. An existing file is reported as skipped and
//! its bytes and mtime are left alone.

pub mod config;
pub mod imaging;
pub mod output;
pub mod plan;
pub mod process;

#[cfg(test)]
pub(crate) mod test_helpers;
