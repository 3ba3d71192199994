//! Per-pixel color filters.
//!
//! ## Filter Order
//! 1. Brightness
//! 2. Contrast
//! 3. Saturation
//! 4. Grayscale
//! 5. Sepia
//!
//! Channels are carried as `f64` in 0-255 space through all five steps and
//! clamped once at the end; clamping between steps would change the result.
//! The final store rounds half to even. Alpha is never touched.

use crate::luminance::{luma, sepia_tone};
use crate::FilterParameters;

/// Apply the color steps of `params` to RGBA pixel data in place.
///
/// Steps at their identity value are skipped, so identity parameters leave
/// the bytes untouched.
///
/// # Example
/// ```
/// use kayablue_core::{FilterParameters, filters::apply_color_filters};
///
/// let mut pixels = vec![100, 100, 100, 255];
/// let mut params = FilterParameters::default();
/// params.brightness = 150.0;
///
/// apply_color_filters(&mut pixels, &params);
/// assert_eq!(pixels, vec![150, 150, 150, 255]);
/// ```
pub fn apply_color_filters(pixels: &mut [u8], params: &FilterParameters) {
    let params = params.clamped();
    if params.is_color_identity() {
        return;
    }

    for chunk in pixels.chunks_exact_mut(4) {
        let mut r = chunk[0] as f64;
        let mut g = chunk[1] as f64;
        let mut b = chunk[2] as f64;

        (r, g, b) = apply_brightness(r, g, b, params.brightness);
        (r, g, b) = apply_contrast(r, g, b, params.contrast);
        (r, g, b) = apply_saturation(r, g, b, params.saturation);
        (r, g, b) = apply_grayscale(r, g, b, params.grayscale);
        (r, g, b) = apply_sepia(r, g, b, params.sepia);

        chunk[0] = store(r);
        chunk[1] = store(g);
        chunk[2] = store(b);
    }
}

/// Clamp to the byte range and round half to even.
#[inline]
fn store(value: f64) -> u8 {
    value.clamp(0.0, 255.0).round_ties_even() as u8
}

/// Formula: `output = input * brightness/100`
#[inline]
fn apply_brightness(r: f64, g: f64, b: f64, brightness: f64) -> (f64, f64, f64) {
    if brightness == 100.0 {
        return (r, g, b);
    }
    let factor = brightness / 100.0;
    (r * factor, g * factor, b * factor)
}

/// Formula: `output = ((input/255 - 0.5) * contrast/100 + 0.5) * 255`
#[inline]
fn apply_contrast(r: f64, g: f64, b: f64, contrast: f64) -> (f64, f64, f64) {
    if contrast == 100.0 {
        return (r, g, b);
    }
    let factor = contrast / 100.0;
    let stretch = |c: f64| ((c / 255.0 - 0.5) * factor + 0.5) * 255.0;
    (stretch(r), stretch(g), stretch(b))
}

/// Scale each channel's distance from luma by `saturation/100`.
#[inline]
fn apply_saturation(r: f64, g: f64, b: f64, saturation: f64) -> (f64, f64, f64) {
    if saturation == 100.0 {
        return (r, g, b);
    }
    let gray = luma(r, g, b);
    let factor = saturation / 100.0;
    (
        gray + factor * (r - gray),
        gray + factor * (g - gray),
        gray + factor * (b - gray),
    )
}

/// Blend toward luma by `grayscale/100`.
#[inline]
fn apply_grayscale(r: f64, g: f64, b: f64, grayscale: f64) -> (f64, f64, f64) {
    if grayscale <= 0.0 {
        return (r, g, b);
    }
    let gray = luma(r, g, b);
    let factor = grayscale / 100.0;
    (
        r + factor * (gray - r),
        g + factor * (gray - g),
        b + factor * (gray - b),
    )
}

/// Blend toward the sepia tone by `sepia/100`.
#[inline]
fn apply_sepia(r: f64, g: f64, b: f64, sepia: f64) -> (f64, f64, f64) {
    if sepia <= 0.0 {
        return (r, g, b);
    }
    let factor = sepia / 100.0;
    let (tr, tg, tb) = sepia_tone(r, g, b);
    (
        r + factor * (tr - r),
        g + factor * (tg - g),
        b + factor * (tb - b),
    )
}
