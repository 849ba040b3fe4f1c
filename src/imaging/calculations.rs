//! Pure calculation functions for image geometry.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate output dimensions for a fixed target width.
///
/// The height follows the source aspect ratio, rounded to the nearest pixel
/// and never below 1. Sources narrower than the target are scaled up.
///
/// # Examples
/// ```
/// # use screenshot_standardizer::imaging::calculate_fit_width;
/// assert_eq!(calculate_fit_width((2880, 1800), 1440), (1440, 900));
/// assert_eq!(calculate_fit_width((800, 600), 1024), (1024, 768));
/// ```
pub fn calculate_fit_width(source: (u32, u32), target_width: u32) -> (u32, u32) {
    let (src_w, src_h) = source;
    if src_w == 0 {
        return (target_width, src_h.max(1));
    }
    let h = (src_h as f64 * target_width as f64 / src_w as f64).round();
    (target_width, (h as u32).max(1))
}

/// Canvas dimensions after adding `padding` on every side.
///
/// `None` when either side would not fit in a `u32`.
pub fn calculate_padded_dimensions(content: (u32, u32), padding: u32) -> Option<(u32, u32)> {
    let extra = padding.checked_mul(2)?;
    Some((content.0.checked_add(extra)?, content.1.checked_add(extra)?))
}

/// Whether a canvas of `dimensions` stays within `max_pixels`.
pub fn fits_pixel_budget(dimensions: (u32, u32), max_pixels: u64) -> bool {
    dimensions.0 as u64 * dimensions.1 as u64 <= max_pixels
}

/// Height the output would have with exact (unrounded) aspect preservation.
///
/// Used to check that resizing stays within one pixel of the source ratio.
#[cfg(test)]
pub fn ideal_height(source: (u32, u32), width: u32) -> f64 {
    let (src_w, src_h) = source;
    src_h as f64 * width as f64 / src_w.max(1) as f64
}
