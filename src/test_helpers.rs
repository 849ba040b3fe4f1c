//! Shared test utilities: synthetic screenshots on disk and in memory.

use image::{DynamicImage, ImageEncoder, RgbImage};
use std::path::Path;

/// Deterministic RGB gradient, enough structure for resampling to matter.
pub fn gradient_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    }))
}

/// Write a gradient PNG with the given dimensions.
pub fn write_test_png(path: &Path, width: u32, height: u32) {
    gradient_image(width, height).save(path).unwrap();
}

/// Write a gradient JPEG with the given dimensions, whatever the extension.
pub fn write_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = gradient_image(width, height).to_rgb8();
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write bytes that look like a PNG signature but are not a decodable image.
pub fn write_corrupt_file(path: &Path) {
    std::fs::write(path, b"\x89PNG\r\n\x1a\nthis is not really a png").unwrap();
}
