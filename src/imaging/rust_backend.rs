//! Pure Rust codec backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (PNG, JPEG, GIF, WebP) | `image::ImageReader` with content sniffing |
//! | Encode → PNG | `png::Encoder`, density in the `pHYs` chunk |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder`, density in JFIF `APP0` |
//! | Encode → WebP | `image::codecs::webp::WebPEncoder` (lossless), density in an `EXIF` chunk |

use super::backend::{BackendError, ImageBackend};
use super::density::{dpi_to_ppm, exif_resolution};
use super::params::{EncodeParams, Quality};
use crate::config::{OutputFormat, PngCompression};
use image::codecs::jpeg::{JpegEncoder, PixelDensity};
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, GenericImageView, ImageEncoder, ImageReader};
use std::path::Path;

/// Extensions picked up when scanning an input directory.
const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Case-insensitive extension check against the decoders compiled in.
pub fn is_supported_input(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| s.eq_ignore_ascii_case(e))
        })
}

/// Pure Rust backend using the `image` and `png` crates.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk.
///
/// The format is sniffed from content, so a PNG saved as `.jpg` still decodes.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| BackendError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

impl From<PngCompression> for png::Compression {
    fn from(value: PngCompression) -> Self {
        match value {
            PngCompression::Fast => png::Compression::Fast,
            PngCompression::Default => png::Compression::Default,
            PngCompression::Best => png::Compression::Best,
        }
    }
}

fn encode_error(format: OutputFormat, e: impl std::fmt::Display) -> BackendError {
    BackendError::Encode {
        format: format.extension(),
        message: e.to_string(),
    }
}

/// 8-bit PNG, RGBA only when the image has an alpha channel.
fn encode_png(
    img: &DynamicImage,
    dpi: u32,
    compression: PngCompression,
) -> Result<Vec<u8>, BackendError> {
    let (width, height) = img.dimensions();
    let (color, raw) = if img.color().has_alpha() {
        (png::ColorType::Rgba, img.to_rgba8().into_raw())
    } else {
        (png::ColorType::Rgb, img.to_rgb8().into_raw())
    };
    let ppm = dpi_to_ppm(dpi);

    let mut buf = Vec::new();
    let mut encoder = png::Encoder::new(&mut buf, width, height);
    encoder.set_color(color);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(compression.into());
    encoder.set_pixel_dims(Some(png::PixelDimensions {
        xppu: ppm,
        yppu: ppm,
        unit: png::Unit::Meter,
    }));
    let mut writer = encoder
        .write_header()
        .map_err(|e| encode_error(OutputFormat::Png, e))?;
    writer
        .write_image_data(&raw)
        .map_err(|e| encode_error(OutputFormat::Png, e))?;
    writer
        .finish()
        .map_err(|e| encode_error(OutputFormat::Png, e))?;
    Ok(buf)
}

/// Baseline JPEG with the density written to the JFIF header.
fn encode_jpeg(img: &DynamicImage, dpi: u32, quality: Quality) -> Result<Vec<u8>, BackendError> {
    let density = u16::try_from(dpi)
        .map_err(|_| encode_error(OutputFormat::Jpeg, format!("dpi {dpi} exceeds JFIF range")))?;
    let rgb = img.to_rgb8();

    let mut buf = Vec::new();
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality.value() as u8);
        encoder.set_pixel_density(PixelDensity::dpi(density));
        encoder
            .encode_image(&rgb)
            .map_err(|e| encode_error(OutputFormat::Jpeg, e))?;
    }
    Ok(buf)
}

/// Lossless WebP with the density carried as EXIF resolution tags.
fn encode_webp(img: &DynamicImage, dpi: u32) -> Result<Vec<u8>, BackendError> {
    let img = if img.color().has_alpha() {
        DynamicImage::ImageRgba8(img.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(img.to_rgb8())
    };
    let mut buf = Vec::new();
    {
        let mut encoder = WebPEncoder::new_lossless(&mut buf);
        encoder
            .set_exif_metadata(exif_resolution(dpi))
            .map_err(|e| encode_error(OutputFormat::Webp, e))?;
        img.write_with_encoder(encoder)
            .map_err(|e| encode_error(OutputFormat::Webp, e))?;
    }
    Ok(buf)
}

impl ImageBackend for RustBackend {
    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError> {
        load_image(path)
    }

    fn encode(&self, image: &DynamicImage, params: &EncodeParams) -> Result<Vec<u8>, BackendError> {
        match params.format {
            OutputFormat::Png => encode_png(image, params.dpi, params.png_compression),
            OutputFormat::Jpeg => encode_jpeg(image, params.dpi, params.quality),
            OutputFormat::Webp => encode_webp(image, params.dpi),
        }
    }
}
