//! The transform pipeline.
//!
//! [`plan_transform`] and [`plan_encode`] turn the run configuration into
//! parameters; [`standardize`] applies them to one decoded image:
//!
//! ```text
//! resize → enhance (viz) → pad → border → flatten alpha
//! ```
//!
//! The DPI stamp is carried by [`EncodeParams`] and applied by the backend at
//! encode time, since it is metadata and never touches pixels.
//!
//! Canvases are sized before they are allocated. One larger than
//! [`MAX_CANVAS_PIXELS`] is a [`TransformError`] for that file only.

use super::calculations::{calculate_fit_width, calculate_padded_dimensions, fits_pixel_budget};
use super::params::{
    EncodeParams, Enhancement, FrameRing, Quality, Resampling, TransformParams,
};
use crate::config::{ConfigError, ProcessingConfig, ScreenshotType, StyleConfig};
use image::{DynamicImage, GenericImageView, Rgb, RgbImage, Rgba, RgbaImage, imageops};
use thiserror::Error;
use tracing::debug;

/// Largest canvas the pipeline allocates, 1 GiB as RGBA8.
pub const MAX_CANVAS_PIXELS: u64 = 1 << 28;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("output canvas {width}x{height} is larger than the pixel limit")]
    CanvasTooLarge { width: u32, height: u32 },
    #[error("padding of {padding}px does not fit the canvas size")]
    PaddingOverflow { padding: u32 },
}

fn check_canvas((width, height): (u32, u32)) -> Result<(), TransformError> {
    if fits_pixel_budget((width, height), MAX_CANVAS_PIXELS) {
        Ok(())
    } else {
        Err(TransformError::CanvasTooLarge { width, height })
    }
}

/// Outer rule width of the viz frame.
const VIZ_OUTER_RULE: u32 = 1;
/// Width of the mat between the viz frame's two rules.
const VIZ_MAT: u32 = 6;

fn opaque([r, g, b]: [u8; 3]) -> Rgba<u8> {
    Rgba([r, g, b, 255])
}

/// Compute the pixel-level parameters for a run.
pub fn plan_transform(
    config: &ProcessingConfig,
    style: &StyleConfig,
) -> Result<TransformParams, ConfigError> {
    let palette = style.palette()?;
    let border = opaque(palette.border);
    let is_viz = config.kind == ScreenshotType::Viz;

    let background = opaque(if is_viz {
        palette.viz_background
    } else {
        palette.background
    });

    let frame = match (config.border, is_viz) {
        (false, _) => Vec::new(),
        (true, false) => vec![FrameRing {
            width: style.border.width,
            color: border,
        }],
        (true, true) => vec![
            FrameRing {
                width: VIZ_OUTER_RULE,
                color: border,
            },
            FrameRing {
                width: VIZ_MAT,
                color: opaque(palette.viz_background),
            },
            FrameRing {
                width: style.border.width,
                color: border,
            },
        ],
    };

    Ok(TransformParams {
        target_width: config.target_width(),
        resampling: if is_viz {
            Resampling::HighQuality
        } else {
            Resampling::Standard
        },
        enhancement: is_viz.then(Enhancement::viz),
        padding: config.padding,
        background,
        frame,
        flatten_alpha: !config.format.supports_alpha(),
    })
}

pub fn plan_encode(config: &ProcessingConfig, style: &StyleConfig) -> EncodeParams {
    EncodeParams {
        format: config.format,
        dpi: config.dpi,
        quality: Quality::new(style.encoding.jpeg_quality),
        png_compression: style.encoding.png_compression,
    }
}

/// Run the pipeline on one image. The input is left untouched.
///
/// The result is RGBA8 when the source had alpha and the output format keeps
/// it, RGB8 otherwise.
pub fn standardize(
    image: &DynamicImage,
    params: &TransformParams,
) -> Result<DynamicImage, TransformError> {
    let keep_alpha = image.color().has_alpha() && !params.flatten_alpha;

    let canvas = resize(image, params.target_width, params.resampling)?;
    let canvas = match params.enhancement {
        Some(enhancement) => enhance(&canvas, enhancement),
        None => canvas,
    };
    let mut canvas = pad(canvas, params.padding, params.background)?;
    draw_frame(&mut canvas, &params.frame);

    debug!(
        width = canvas.width(),
        height = canvas.height(),
        keep_alpha,
        "standardized"
    );

    Ok(if keep_alpha {
        DynamicImage::ImageRgba8(canvas)
    } else {
        DynamicImage::ImageRgb8(flatten(&canvas, params.background))
    })
}

/// Scale to `target_width`, preserving aspect ratio.
pub fn resize(
    image: &DynamicImage,
    target_width: u32,
    resampling: Resampling,
) -> Result<RgbaImage, TransformError> {
    let source = image.dimensions();
    let (width, height) = calculate_fit_width(source, target_width);
    check_canvas((width, height))?;
    debug!(
        from = ?source,
        to = ?(width, height),
        filter = ?resampling.filter(),
        "resize"
    );
    Ok(imageops::resize(&image.to_rgba8(), width, height, resampling.filter()))
}

/// Contrast boost followed by an unsharp mask.
pub fn enhance(canvas: &RgbaImage, enhancement: Enhancement) -> RgbaImage {
    let contrasted = imageops::contrast(canvas, enhancement.contrast);
    imageops::unsharpen(
        &contrasted,
        enhancement.sharpening.sigma,
        enhancement.sharpening.threshold,
    )
}

/// Grow the canvas by `padding` on every side, content centered on `background`.
///
/// Zero padding returns the canvas unchanged.
pub fn pad(
    canvas: RgbaImage,
    padding: u32,
    background: Rgba<u8>,
) -> Result<RgbaImage, TransformError> {
    if padding == 0 {
        return Ok(canvas);
    }
    let (width, height) = calculate_padded_dimensions(canvas.dimensions(), padding)
        .ok_or(TransformError::PaddingOverflow { padding })?;
    check_canvas((width, height))?;
    debug!(padding, width, height, "pad");
    let mut padded = RgbaImage::from_pixel(width, height, background);
    imageops::replace(&mut padded, &canvas, padding as i64, padding as i64);
    Ok(padded)
}

/// Paint the frame bands along the canvas edge, outermost first.
///
/// The frame is drawn inside the canvas and never changes its dimensions.
/// Bands that would cross the center of a tiny canvas are dropped.
pub fn draw_frame(canvas: &mut RgbaImage, frame: &[FrameRing]) {
    let (width, height) = canvas.dimensions();
    let mut inset = 0;
    for ring in frame {
        for _ in 0..ring.width {
            if inset >= width.div_ceil(2) || inset >= height.div_ceil(2) {
                return;
            }
            draw_outline(canvas, inset, ring.color);
            inset += 1;
        }
    }
}

/// One-pixel rectangle outline `inset` pixels in from the edge.
fn draw_outline(canvas: &mut RgbaImage, inset: u32, color: Rgba<u8>) {
    let (width, height) = canvas.dimensions();
    let (left, top) = (inset, inset);
    let (right, bottom) = (width - 1 - inset, height - 1 - inset);
    for x in left..=right {
        canvas.put_pixel(x, top, color);
        canvas.put_pixel(x, bottom, color);
    }
    for y in top..=bottom {
        canvas.put_pixel(left, y, color);
        canvas.put_pixel(right, y, color);
    }
}

/// Composite onto an opaque background, dropping the alpha channel.
pub fn flatten(canvas: &RgbaImage, background: Rgba<u8>) -> RgbImage {
    RgbImage::from_fn(canvas.width(), canvas.height(), |x, y| {
        let Rgba([r, g, b, a]) = *canvas.get_pixel(x, y);
        let blend = |fg: u8, bg: u8| -> u8 {
            let a = a as u32;
            ((fg as u32 * a + bg as u32 * (255 - a) + 127) / 255) as u8
        };
        Rgb([
            blend(r, background[0]),
            blend(g, background[1]),
            blend(b, background[2]),
        ])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OutputFormat, SizePreset};
    use crate::imaging::calculations::ideal_height;
    use crate::test_helpers::gradient_image;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const GREY: Rgba<u8> = Rgba([0xe0, 0xe0, 0xe0, 255]);

    fn config(kind: ScreenshotType, padding: u32, border: bool) -> ProcessingConfig {
        ProcessingConfig {
            kind,
            padding,
            border,
            ..ProcessingConfig::default()
        }
    }

    fn params(kind: ScreenshotType, padding: u32, border: bool) -> TransformParams {
        plan_transform(&config(kind, padding, border), &StyleConfig::default()).unwrap()
    }

    // =========================================================================
    // Planning
    // =========================================================================

    #[test]
    fn default_type_plans_standard_resampling_and_single_rule() {
        let p = params(ScreenshotType::Standard, 0, true);
        assert_eq!(p.target_width, 1440);
        assert_eq!(p.resampling, Resampling::Standard);
        assert_eq!(p.enhancement, None);
        assert_eq!(p.frame, vec![FrameRing { width: 2, color: GREY }]);
        assert_eq!(p.background, WHITE);
    }

    #[test]
    fn viz_type_plans_lanczos_enhancement_and_framed_border() {
        let p = params(ScreenshotType::Viz, 0, true);
        assert_eq!(p.resampling, Resampling::HighQuality);
        assert_eq!(p.enhancement, Some(Enhancement::viz()));
        assert_eq!(p.frame.len(), 3);
        assert_eq!(p.frame[0], FrameRing { width: 1, color: GREY });
        assert_eq!(p.frame[1], FrameRing { width: 6, color: WHITE });
        assert_eq!(p.frame[2], FrameRing { width: 2, color: GREY });
        assert_eq!(p.frame.iter().map(|r| r.width).sum::<u32>(), 9);
    }

    #[test]
    fn no_border_plans_empty_frame() {
        assert!(params(ScreenshotType::Standard, 0, false).frame.is_empty());
        assert!(params(ScreenshotType::Viz, 0, false).frame.is_empty());
    }

    #[test]
    fn viz_uses_its_own_background() {
        let mut style = StyleConfig::default();
        style.colors.viz_background = "#f5f5f5".to_string();
        let p = plan_transform(&config(ScreenshotType::Viz, 4, true), &style).unwrap();
        assert_eq!(p.background, Rgba([0xf5, 0xf5, 0xf5, 255]));
        assert_eq!(p.frame[1].color, Rgba([0xf5, 0xf5, 0xf5, 255]));
    }

    #[test]
    fn plan_transform_rejects_bad_colours() {
        let mut style = StyleConfig::default();
        style.colors.border = "grey".to_string();
        assert!(plan_transform(&ProcessingConfig::default(), &style).is_err());
    }

    #[test]
    fn jpeg_plans_alpha_flattening() {
        let cfg = ProcessingConfig {
            format: OutputFormat::Jpeg,
            ..ProcessingConfig::default()
        };
        assert!(plan_transform(&cfg, &StyleConfig::default()).unwrap().flatten_alpha);
        assert!(!params(ScreenshotType::Standard, 0, true).flatten_alpha);
    }

    #[test]
    fn plan_encode_carries_dpi_and_quality() {
        let cfg = ProcessingConfig {
            dpi: 300,
            format: OutputFormat::Jpeg,
            ..ProcessingConfig::default()
        };
        let p = plan_encode(&cfg, &StyleConfig::default());
        assert_eq!(p.dpi, 300);
        assert_eq!(p.format, OutputFormat::Jpeg);
        assert_eq!(p.quality.value(), 95);
    }

    // =========================================================================
    // Pipeline
    // =========================================================================

    #[test]
    fn output_width_matches_every_preset() {
        let source = gradient_image(1366, 768);
        for preset in SizePreset::ALL {
            for border in [true, false] {
                let cfg = ProcessingConfig {
                    size: preset,
                    border,
                    ..ProcessingConfig::default()
                };
                let p = plan_transform(&cfg, &StyleConfig::default()).unwrap();
                let out = standardize(&source, &p).unwrap();
                assert_eq!(out.width(), preset.width());
                let deviation = (out.height() as f64 - ideal_height((1366, 768), out.width())).abs();
                assert!(deviation <= 1.0, "{preset:?}: height {}", out.height());
            }
        }
    }

    #[test]
    fn zero_padding_matches_unpadded_geometry() {
        let source = gradient_image(800, 500);
        let unpadded = standardize(&source, &params(ScreenshotType::Standard, 0, false)).unwrap();
        let resized = resize(&source, 1440, Resampling::Standard).unwrap();
        assert_eq!(unpadded.dimensions(), resized.dimensions());
        assert_eq!(unpadded.to_rgba8().as_raw(), resized.as_raw());
    }

    #[test]
    fn padding_grows_canvas_on_all_sides() {
        let source = gradient_image(800, 500);
        let out = standardize(&source, &params(ScreenshotType::Standard, 20, false)).unwrap();
        // 800x500 → 1440x900, plus 20px each side
        assert_eq!(out.dimensions(), (1480, 940));

        let rgb = out.to_rgb8();
        assert_eq!(*rgb.get_pixel(0, 0), Rgb([255, 255, 255]));
        assert_eq!(*rgb.get_pixel(19, 470), Rgb([255, 255, 255]));
        assert_eq!(*rgb.get_pixel(1479, 939), Rgb([255, 255, 255]));
    }

    #[test]
    fn pad_centers_content() {
        let content = RgbaImage::from_pixel(4, 3, Rgba([10, 20, 30, 255]));
        let padded = pad(content, 2, WHITE).unwrap();
        assert_eq!(padded.dimensions(), (8, 7));
        assert_eq!(*padded.get_pixel(1, 1), WHITE);
        assert_eq!(*padded.get_pixel(2, 2), Rgba([10, 20, 30, 255]));
        assert_eq!(*padded.get_pixel(5, 4), Rgba([10, 20, 30, 255]));
        assert_eq!(*padded.get_pixel(6, 5), WHITE);
    }

    #[test]
    fn oversized_padding_is_an_error_not_an_allocation() {
        let content = RgbaImage::from_pixel(4, 3, WHITE);
        assert!(matches!(
            pad(content.clone(), 2_000_000_000, WHITE),
            Err(TransformError::PaddingOverflow { padding: 2_000_000_000 })
        ));
        // fits in u32 but not in memory
        assert!(matches!(
            pad(content, 100_000, WHITE),
            Err(TransformError::CanvasTooLarge { width: 200_004, height: 200_003 })
        ));
    }

    #[test]
    fn extreme_aspect_source_fails_before_resizing() {
        // 1px wide strip scaled to 1440 wide would need ~288M rows
        let strip = gradient_image(1, 200_000);
        let err = standardize(&strip, &params(ScreenshotType::Standard, 0, true)).unwrap_err();
        assert!(matches!(err, TransformError::CanvasTooLarge { width: 1440, .. }));
    }

    #[test]
    fn border_paints_edge_without_resizing() {
        let mut canvas = RgbaImage::from_pixel(10, 8, WHITE);
        let black = Rgba([0, 0, 0, 255]);
        draw_frame(&mut canvas, &[FrameRing { width: 2, color: black }]);

        assert_eq!(canvas.dimensions(), (10, 8));
        assert_eq!(*canvas.get_pixel(0, 0), black);
        assert_eq!(*canvas.get_pixel(1, 4), black);
        assert_eq!(*canvas.get_pixel(9, 7), black);
        assert_eq!(*canvas.get_pixel(8, 6), black);
        assert_eq!(*canvas.get_pixel(2, 2), WHITE);
        assert_eq!(*canvas.get_pixel(7, 5), WHITE);
    }

    #[test]
    fn frame_bands_stack_inward() {
        let mut canvas = RgbaImage::from_pixel(40, 40, Rgba([1, 2, 3, 255]));
        let black = Rgba([0, 0, 0, 255]);
        draw_frame(
            &mut canvas,
            &[
                FrameRing { width: 1, color: GREY },
                FrameRing { width: 6, color: WHITE },
                FrameRing { width: 2, color: black },
            ],
        );
        assert_eq!(*canvas.get_pixel(0, 20), GREY);
        assert_eq!(*canvas.get_pixel(1, 20), WHITE);
        assert_eq!(*canvas.get_pixel(6, 20), WHITE);
        assert_eq!(*canvas.get_pixel(7, 20), black);
        assert_eq!(*canvas.get_pixel(8, 20), black);
        assert_eq!(*canvas.get_pixel(9, 20), Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn frame_on_tiny_canvas_stops_at_center() {
        let mut canvas = RgbaImage::from_pixel(3, 3, WHITE);
        let black = Rgba([0, 0, 0, 255]);
        draw_frame(&mut canvas, &[FrameRing { width: 10, color: black }]);
        assert_eq!(*canvas.get_pixel(0, 0), black);
        assert_eq!(*canvas.get_pixel(1, 1), black);
    }

    #[test]
    fn viz_enhancement_keeps_dimensions() {
        let source = gradient_image(640, 360);
        let out = standardize(&source, &params(ScreenshotType::Viz, 0, true)).unwrap();
        assert_eq!(out.dimensions(), (1440, 810));
    }

    #[test]
    fn input_is_not_mutated() {
        let source = gradient_image(300, 200);
        let before = source.clone();
        standardize(&source, &params(ScreenshotType::Viz, 10, true)).unwrap();
        assert_eq!(source, before);
    }

    #[test]
    fn opaque_source_yields_rgb() {
        let source = gradient_image(100, 50);
        let out = standardize(&source, &params(ScreenshotType::Standard, 0, true)).unwrap();
        assert!(!out.color().has_alpha());
    }

    #[test]
    fn transparent_source_keeps_alpha_for_png() {
        let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(100, 50, Rgba([0, 0, 0, 0])));
        let out = standardize(&source, &params(ScreenshotType::Standard, 0, false)).unwrap();
        assert!(out.color().has_alpha());
    }

    #[test]
    fn transparent_source_flattens_onto_background_for_jpeg() {
        let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(100, 50, Rgba([0, 0, 0, 0])));
        let cfg = ProcessingConfig {
            format: OutputFormat::Jpeg,
            border: false,
            ..ProcessingConfig::default()
        };
        let p = plan_transform(&cfg, &StyleConfig::default()).unwrap();
        let out = standardize(&source, &p).unwrap();
        assert!(!out.color().has_alpha());
        assert_eq!(*out.to_rgb8().get_pixel(700, 300), Rgb([255, 255, 255]));
    }

    #[test]
    fn flatten_blends_partial_alpha() {
        let canvas = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 128]));
        let flat = flatten(&canvas, WHITE);
        // 255 * 127 / 255 ≈ 127
        assert_eq!(*flat.get_pixel(0, 0), Rgb([127, 127, 127]));
    }
}
