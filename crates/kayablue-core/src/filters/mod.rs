//! Color and tone filters.
//!
//! [`apply_filters`] runs the per-pixel color steps followed by the blur
//! pass and returns a new buffer of the same size.

mod blur;
mod color;

pub use blur::{gaussian_blur, gaussian_kernel};
pub use color::apply_color_filters;

use tracing::{debug, trace};

use crate::buffer::PixelBuffer;
use crate::FilterParameters;

/// Apply `params` to `image`, returning a new buffer.
///
/// Identity parameters return a byte-identical copy without visiting any
/// pixel. Out-of-range parameters are clamped first.
pub fn apply_filters(image: &PixelBuffer, params: &FilterParameters) -> PixelBuffer {
    let params = params.clamped();
    if params.is_identity() {
        trace!("Identity filters, copying buffer");
        return image.clone();
    }

    let (width, height) = image.dimensions();
    debug!(
        width,
        height,
        brightness = params.brightness,
        contrast = params.contrast,
        saturation = params.saturation,
        grayscale = params.grayscale,
        sepia = params.sepia,
        blur = params.blur,
        "Applying filters"
    );

    let mut pixels = image.pixels().to_vec();
    apply_color_filters(&mut pixels, &params);
    gaussian_blur(&mut pixels, width, height, params.blur);

    PixelBuffer::from_parts(width, height, pixels)
}
