//! Image resizing to exact dimensions.
//!
//! Resampling uses the `image` crate's algorithms. Keeping the aspect ratio
//! is the caller's decision; the helpers at the bottom compute proportional
//! targets for the resize tool's "lock aspect ratio" mode.

use tracing::{debug, trace};

use super::{InterpolationFilter, TransformError};
use crate::buffer::{byte_len, PixelBuffer};

/// Resize an image to exact dimensions.
///
/// # Errors
///
/// Returns `TransformError::InvalidDimension` if `width` or `height` is zero
/// or the target is too large to allocate. Nothing is allocated in that case.
pub fn resize(
    image: &PixelBuffer,
    width: u32,
    height: u32,
    filter: InterpolationFilter,
) -> Result<PixelBuffer, TransformError> {
    if width == 0 || height == 0 || byte_len(width, height).is_none() {
        return Err(TransformError::InvalidDimension { width, height });
    }

    if image.dimensions() == (width, height) {
        trace!(width, height, "Resize to same dimensions");
        return Ok(image.clone());
    }

    debug!(
        src_width = image.width(),
        src_height = image.height(),
        width,
        height,
        ?filter,
        "Resizing image"
    );

    let resized = image::imageops::resize(
        &image.to_rgba_image(),
        width,
        height,
        filter.to_image_filter(),
    );

    Ok(PixelBuffer::from_parts(width, height, resized.into_raw()))
}

/// Dimensions that fit within `max_edge` while preserving aspect ratio.
///
/// Images that already fit are returned unchanged (no upscaling).
pub fn fit_within(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }
    if width <= max_edge && height <= max_edge {
        return (width, height);
    }

    let ratio = width as f64 / height as f64;

    if width >= height {
        let new_height = (max_edge as f64 / ratio).round() as u32;
        (max_edge, new_height.max(1))
    } else {
        let new_width = (max_edge as f64 * ratio).round() as u32;
        (new_width.max(1), max_edge)
    }
}

/// Height that keeps the `width x height` aspect ratio at `new_width`.
pub fn height_for_width(width: u32, height: u32, new_width: u32) -> u32 {
    if width == 0 {
        return 0;
    }
    ((new_width as f64 * height as f64 / width as f64).round() as u32).max(1)
}

/// Width that keeps the `width x height` aspect ratio at `new_height`.
pub fn width_for_height(width: u32, height: u32, new_height: u32) -> u32 {
    if height == 0 {
        return 0;
    }
    ((new_height as f64 * width as f64 / height as f64).round() as u32).max(1)
}
