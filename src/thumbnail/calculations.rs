//! Pure calculation functions for thumbnail dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the size of an image scaled down to fit inside a bounding box.
///
/// The aspect ratio is preserved and the result never exceeds either bound.
/// Images that already fit are returned unchanged (no upscaling). Each side
/// is at least 1px.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `bound` - Maximum allowed dimensions (width, height)
///
/// # Returns
/// * `(width, height)` - Output dimensions
pub fn fit_within(source: (u32, u32), bound: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bound;

    if src_w <= max_w && src_h <= max_h {
        return source;
    }

    let scale = (max_w as f64 / src_w as f64).min(max_h as f64 / src_h as f64);
    let w = ((src_w as f64 * scale).round() as u32).clamp(1, max_w.max(1));
    let h = ((src_h as f64 * scale).round() as u32).clamp(1, max_h.max(1));
    (w, h)
}
